use axum::extract::{Path, State};
use axum::Extension;

use crate::access::{forbidden, CurrentUser};
use crate::app::AppState;
use crate::database::models::{NewStudent, Student, StudentPatch};
use crate::handlers::{found, payload, JsonBody};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Role;

/// GET /api/students - parents see only their own children
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<Student>> {
    if current.role() == Role::Parent {
        return Ok(ApiResponse::success(state.storage.list_students_by_parent(current.id()).await?));
    }
    Ok(ApiResponse::success(state.storage.list_students().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Student> {
    let student = found(state.storage.get_student(&id).await?, &id)?;
    current.scope(&*state.storage).await?.require_student(&student.id)?;
    Ok(ApiResponse::success(student))
}

/// GET /api/students/parent/:parentId
pub async fn by_parent(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(parent_id): Path<String>,
) -> ApiResult<Vec<Student>> {
    if current.role() == Role::Parent && current.id() != parent_id {
        return Err(forbidden());
    }
    Ok(ApiResponse::success(state.storage.list_students_by_parent(&parent_id).await?))
}

/// GET /api/students/class/:classId
pub async fn by_class(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(class_id): Path<String>,
) -> ApiResult<Vec<Student>> {
    let scope = current.scope(&*state.storage).await?;
    scope.require_class(&class_id)?;
    let students = state.storage.list_students_by_class(&class_id).await?;
    Ok(ApiResponse::success(scope.students(students, |s| s.id.as_str())))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    body: JsonBody,
) -> ApiResult<Student> {
    current.require_admin()?;
    let new: NewStudent = payload(body)?;
    let student = state.storage.create_student(new).await?;
    tracing::info!("Enrolled student {} ({})", student.student_id, student.id);
    Ok(ApiResponse::created(student))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Student> {
    current.require_admin()?;
    let patch: StudentPatch = payload(body)?;
    let student = found(state.storage.update_student(&id, patch).await?, &id)?;
    Ok(ApiResponse::success(student))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    current.require_admin()?;
    state.storage.delete_student(&id).await?;
    Ok(ApiResponse::no_content())
}
