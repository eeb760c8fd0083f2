use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::banners::{Banner, BannerFilter, BannerPatch, NewBanner};
use crate::error::AppError;

/// Request body for creating a banner.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateBannerRequest {
    /// Tags the banner is shown under. Duplicates are ignored.
    #[schema(example = json!([1, 2]))]
    pub tag_ids: Vec<i32>,
    #[schema(example = 3)]
    pub feature_id: i32,
    /// Arbitrary JSON object; user-facing reads return its `title`, `text` and `url`.
    #[schema(value_type = Object, example = json!({"title": "some_title", "text": "some_text", "url": "some_url"}))]
    pub content: serde_json::Value,
    /// Defaults to `true`.
    #[schema(example = true)]
    pub is_active: Option<bool>,
}

impl From<CreateBannerRequest> for NewBanner {
    fn from(req: CreateBannerRequest) -> Self {
        Self {
            feature_id: req.feature_id,
            tag_ids: req.tag_ids,
            content: req.content,
            is_active: req.is_active.unwrap_or(true),
        }
    }
}

pub fn validate_create_banner(payload: &CreateBannerRequest) -> Result<(), AppError> {
    validate_content(&payload.content)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateBannerResponse {
    #[schema(example = 1)]
    pub banner_id: i32,
}

/// Request body for a partial banner update. Omitted fields are left unchanged.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateBannerRequest {
    /// Replaces the whole tag set when non-empty.
    #[schema(example = json!([4]))]
    pub tag_ids: Option<Vec<i32>>,
    pub feature_id: Option<i32>,
    #[schema(value_type = Option<Object>)]
    pub content: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

impl From<UpdateBannerRequest> for BannerPatch {
    fn from(req: UpdateBannerRequest) -> Self {
        Self {
            feature_id: req.feature_id,
            tag_ids: req.tag_ids,
            content: req.content,
            is_active: req.is_active,
        }
    }
}

pub fn validate_update_banner(payload: &UpdateBannerRequest) -> Result<(), AppError> {
    match &payload.content {
        Some(content) => validate_content(content),
        None => Ok(()),
    }
}

fn validate_content(content: &serde_json::Value) -> Result<(), AppError> {
    if !content.is_object() {
        return Err(AppError::Validation(
            "content must be a JSON object".into(),
        ));
    }
    Ok(())
}

/// Query parameters for the admin banner listing.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BannerListQuery {
    /// Only banners of this feature.
    #[param(example = 3)]
    pub feature_id: Option<i32>,
    /// Only banners carrying this tag.
    #[param(example = 1)]
    pub tag_id: Option<i32>,
    /// Maximum number of banners returned. Unbounded when omitted.
    #[param(example = 20)]
    pub limit: Option<u64>,
    /// Number of banners skipped.
    #[param(example = 0)]
    pub offset: Option<u64>,
}

impl From<BannerListQuery> for BannerFilter {
    fn from(q: BannerListQuery) -> Self {
        Self {
            feature_id: q.feature_id,
            tag_id: q.tag_id,
            limit: q.limit,
            offset: q.offset,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BannerResponse {
    #[schema(example = 1)]
    pub banner_id: i32,
    #[schema(example = json!([1, 2]))]
    pub tag_ids: Vec<i32>,
    #[schema(example = 3)]
    pub feature_id: i32,
    #[schema(value_type = Object)]
    pub content: serde_json::Value,
    pub is_active: bool,
    #[schema(example = "2025-09-01T08:00:00Z")]
    pub created_at: DateTime<Utc>,
    #[schema(example = "2025-09-01T08:05:00Z")]
    pub updated_at: DateTime<Utc>,
}

impl From<Banner> for BannerResponse {
    fn from(b: Banner) -> Self {
        Self {
            banner_id: b.id,
            tag_ids: b.tag_ids,
            feature_id: b.feature_id,
            content: b.content,
            is_active: b.is_active,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// Query parameters for the user-facing banner read.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserBannerQuery {
    #[param(example = 1)]
    pub tag_id: i32,
    #[param(example = 3)]
    pub feature_id: i32,
    /// Bypass the cache and read the latest committed revision.
    #[param(example = false)]
    pub use_last_revision: Option<bool>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserBannerResponse {
    #[schema(example = "some_title")]
    pub title: Option<String>,
    #[schema(example = "some_text")]
    pub text: Option<String>,
    #[schema(example = "some_url")]
    pub url: Option<String>,
}

impl From<serde_json::Value> for UserBannerResponse {
    fn from(content: serde_json::Value) -> Self {
        let field = |name: &str| {
            content
                .get(name)
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        };
        Self {
            title: field("title"),
            text: field("text"),
            url: field("url"),
        }
    }
}
