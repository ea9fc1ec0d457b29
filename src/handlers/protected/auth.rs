use axum::Extension;
use serde::Serialize;

use crate::access::CurrentUser;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
}

/// GET /api/auth/user - the user behind the bearer token
pub async fn user(Extension(current): Extension<CurrentUser>) -> ApiResult<AuthenticatedUser> {
    Ok(ApiResponse::success(AuthenticatedUser {
        user: current.user,
        teacher_id: current.teacher_id,
    }))
}
