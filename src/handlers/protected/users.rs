use axum::extract::{Path, State};
use axum::Extension;

use crate::access::{forbidden, CurrentUser};
use crate::app::AppState;
use crate::database::models::{NewUser, User, UserPatch};
use crate::handlers::{found, payload, JsonBody};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/users
pub async fn list(State(state): State<AppState>, Extension(current): Extension<CurrentUser>) -> ApiResult<Vec<User>> {
    current.require_admin()?;
    Ok(ApiResponse::success(state.storage.list_users().await?))
}

/// GET /api/users/:id - admins, or the user themselves
pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    if !current.is_admin() && current.id() != id {
        return Err(forbidden());
    }
    let user = found(state.storage.get_user(&id).await?, &id)?;
    Ok(ApiResponse::success(user))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    body: JsonBody,
) -> ApiResult<User> {
    current.require_admin()?;
    let new: NewUser = payload(body)?;
    let user = state.storage.create_user(new).await?;
    tracing::info!("Created user {} ({})", user.id, user.role);
    Ok(ApiResponse::created(user))
}

/// PUT|PATCH /api/users/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<User> {
    current.require_admin()?;
    let patch: UserPatch = payload(body)?;
    let user = found(state.storage.update_user(&id, patch).await?, &id)?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/users/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    current.require_admin()?;
    state.storage.delete_user(&id).await?;
    Ok(ApiResponse::no_content())
}
