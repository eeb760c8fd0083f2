use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::banners::{BannerResolver, BannerStore, ReadMode};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::banner::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/banner",
    tag = "Banners",
    operation_id = "listBanners",
    summary = "List banners filtered by feature and/or tag",
    description = "Returns banners matching every given filter, ordered by id. `limit` and `offset` are optional and unbounded when omitted. Requires admin.",
    params(BannerListQuery),
    responses(
        (status = 200, description = "List of banners", body = Vec<BannerResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_banners(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<BannerListQuery>,
) -> Result<Json<Vec<BannerResponse>>, AppError> {
    auth_user.require_admin()?;

    let banners = BannerStore::new(&state.db).list(query.into()).await?;

    Ok(Json(banners.into_iter().map(BannerResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/banner",
    tag = "Banners",
    operation_id = "createBanner",
    summary = "Create a new banner",
    description = "Creates a banner and registers any tags it references that do not exist yet. Requires admin.",
    request_body = CreateBannerRequest,
    responses(
        (status = 201, description = "Banner created", body = CreateBannerResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(
    skip(state, auth_user, payload),
    fields(user_id = auth_user.user_id, feature_id = payload.feature_id)
)]
pub async fn create_banner(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateBannerRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_banner(&payload)?;

    let mut session = state.session();
    let banner = BannerStore::new(session.tx().await?)
        .create(payload.into())
        .await?;
    session.flush().await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBannerResponse {
            banner_id: banner.id,
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/banner/{id}",
    tag = "Banners",
    operation_id = "updateBanner",
    summary = "Partially update a banner",
    description = "Updates the given fields only. A non-empty `tag_ids` replaces the banner's whole tag set. `updated_at` is refreshed even when the payload is empty. Requires admin.",
    params(("id" = i32, Path, description = "Banner ID")),
    request_body = UpdateBannerRequest,
    responses(
        (status = 200, description = "Banner updated"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Banner not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = auth_user.user_id))]
pub async fn update_banner(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateBannerRequest>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin()?;
    validate_update_banner(&payload)?;

    let mut session = state.session();
    let updated = BannerStore::new(session.tx().await?)
        .update(id, payload.into())
        .await?;
    if !updated {
        return Err(AppError::NotFound("Banner not found".into()));
    }
    session.flush().await?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/banner/{id}",
    tag = "Banners",
    operation_id = "deleteBanner",
    summary = "Delete a banner by ID",
    description = "Permanently deletes a banner together with its tag links. Tags themselves are kept. Requires admin.",
    params(("id" = i32, Path, description = "Banner ID")),
    responses(
        (status = 204, description = "Banner deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Banner not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn delete_banner(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin()?;

    let mut session = state.session();
    let removed = BannerStore::new(session.tx().await?).delete(id).await?;
    if removed == 0 {
        return Err(AppError::NotFound("Banner not found".into()));
    }
    session.flush().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/user_banner",
    tag = "User Banners",
    operation_id = "getUserBanner",
    summary = "Get the banner shown for a feature and tag",
    description = "Returns the `title`, `text` and `url` of the banner matching the feature and tag. Results may be served from a short-lived cache; pass `use_last_revision=true` to read the latest committed revision. When several banners match, the one with the lowest id is returned.",
    params(UserBannerQuery),
    responses(
        (status = 200, description = "Banner content", body = UserBannerResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No banner for this feature and tag (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_user_banner(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserBannerQuery>,
) -> Result<Json<UserBannerResponse>, AppError> {
    let mode = ReadMode::from_last_revision(query.use_last_revision.unwrap_or(false));

    let mut session = state.session();
    let content = BannerResolver::new(&state.banner_cache)
        .resolve(&mut session, query.feature_id, query.tag_id, mode)
        .await?
        .ok_or_else(|| AppError::NotFound("Banner not found".into()))?;

    Ok(Json(UserBannerResponse::from(content)))
}
