use axum::extract::{Path, State};
use axum::Extension;

use crate::access::CurrentUser;
use crate::app::AppState;
use crate::database::models::{NewTeacher, Teacher, TeacherPatch};
use crate::handlers::{found, payload, JsonBody};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/teachers - staff only; parents get 403
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<Teacher>> {
    current.require_staff()?;
    Ok(ApiResponse::success(state.storage.list_teachers().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Teacher> {
    current.require_staff()?;
    let teacher = found(state.storage.get_teacher(&id).await?, &id)?;
    Ok(ApiResponse::success(teacher))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    body: JsonBody,
) -> ApiResult<Teacher> {
    current.require_admin()?;
    let new: NewTeacher = payload(body)?;
    let teacher = state.storage.create_teacher(new).await?;
    tracing::info!("Created teacher {} for user {}", teacher.employee_id, teacher.user_id);
    Ok(ApiResponse::created(teacher))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Teacher> {
    current.require_admin()?;
    let patch: TeacherPatch = payload(body)?;
    let teacher = found(state.storage.update_teacher(&id, patch).await?, &id)?;
    Ok(ApiResponse::success(teacher))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    current.require_admin()?;
    state.storage.delete_teacher(&id).await?;
    Ok(ApiResponse::no_content())
}
