use serde::{Deserialize, Serialize};

/// Request body for provisioning a user.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    /// Grants access to the banner management endpoints.
    #[schema(example = false)]
    pub is_admin: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateUserResponse {
    /// ID of the newly created user.
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = false)]
    pub is_admin: bool,
    /// JWT bearer token for this user.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
}
