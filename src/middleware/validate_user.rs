use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::access::CurrentUser;
use crate::app::AppState;
use crate::error::ApiError;
use crate::types::Role;

/// Resolves the token subject to a stored user and its role.
///
/// Runs after [`jwt_auth_middleware`](super::jwt_auth_middleware). A subject
/// with no user row is rejected as unauthenticated. Teachers also get their
/// teacher profile id so ownership checks need no further lookup.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let user = state.storage.get_user(&auth_user.user_id).await?.ok_or_else(|| {
        tracing::warn!("User validation failed: user {} not found", auth_user.user_id);
        ApiError::unauthorized("User no longer exists")
    })?;

    let teacher_id = match user.role {
        Role::Teacher => state
            .storage
            .get_teacher_by_user_id(&user.id)
            .await?
            .map(|t| t.id),
        _ => None,
    };

    tracing::debug!("Authenticated {} ({}) as {}", user.display_name(), user.id, user.role);

    request.extensions_mut().insert(CurrentUser { user, teacher_id });

    Ok(next.run(request).await)
}
