use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::user::{CreateUserRequest, CreateUserResponse};
use crate::state::AppState;
use crate::utils::jwt;

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    operation_id = "createUser",
    summary = "Provision a user",
    description = "Creates a user and returns a bearer token for it. Anyone may create a regular user. Creating an admin requires an admin token, except for the very first admin, which may be created anonymously while no admin exists.",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Admin requested without a token (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Admin requested by a non-admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(
    skip(state, caller, payload),
    fields(is_admin = payload.is_admin, caller_id = caller.as_ref().map(|c| c.user_id))
)]
pub async fn create_user(
    caller: Option<AuthUser>,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.session();
    let txn = session.tx().await?;

    if payload.is_admin && !caller.as_ref().is_some_and(|c| c.is_admin) {
        let admins = user::Entity::find()
            .filter(user::Column::IsAdmin.eq(true))
            .count(txn)
            .await?;
        if admins > 0 {
            return Err(match caller {
                Some(_) => AppError::PermissionDenied,
                None => AppError::TokenMissing,
            });
        }
        info!("No admin exists yet, provisioning the first one");
    }

    let new_user = user::ActiveModel {
        is_admin: Set(payload.is_admin),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let user = new_user.insert(txn).await?;
    session.flush().await?;

    let auth = &state.config.auth;
    let token = jwt::sign(&auth.jwt_secret, user.id, auth.token_ttl_hours)
        .map_err(|e| AppError::Internal(format!("Token signing error: {}", e)))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            id: user.id,
            is_admin: user.is_admin,
            token,
        }),
    ))
}
