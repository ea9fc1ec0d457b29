use axum::extract::{Path, State};
use axum::Extension;

use crate::access::CurrentUser;
use crate::app::AppState;
use crate::database::models::{Assignment, AssignmentPatch, NewAssignment, NewSubmission, Submission};
use crate::handlers::{found, payload, payload_with, JsonBody};
use crate::middleware::{ApiResponse, ApiResult};

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<Assignment>> {
    let scope = current.scope(&*state.storage).await?;
    let rows = state.storage.list_assignments().await?;
    Ok(ApiResponse::success(scope.classes(rows, |a| a.class_id.as_str())))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Assignment> {
    let assignment = found(state.storage.get_assignment(&id).await?, &id)?;
    current.scope(&*state.storage).await?.require_class(&assignment.class_id)?;
    Ok(ApiResponse::success(assignment))
}

/// GET /api/assignments/class/:classId
pub async fn by_class(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(class_id): Path<String>,
) -> ApiResult<Vec<Assignment>> {
    current.scope(&*state.storage).await?.require_class(&class_id)?;
    Ok(ApiResponse::success(state.storage.list_assignments_by_class(&class_id).await?))
}

/// GET /api/assignments/teacher/:teacherId
pub async fn by_teacher(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(teacher_id): Path<String>,
) -> ApiResult<Vec<Assignment>> {
    let scope = current.scope(&*state.storage).await?;
    let rows = state.storage.list_assignments_by_teacher(&teacher_id).await?;
    Ok(ApiResponse::success(scope.classes(rows, |a| a.class_id.as_str())))
}

/// POST /api/assignments - teachers may only set themselves as `teacherId`
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    body: JsonBody,
) -> ApiResult<Assignment> {
    current.require_staff()?;
    let new: NewAssignment = payload(body)?;
    current.require_teacher(&new.teacher_id)?;

    let assignment = state.storage.create_assignment(new).await?;
    tracing::info!("Created assignment '{}' for class {}", assignment.title, assignment.class_id);
    Ok(ApiResponse::created(assignment))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Assignment> {
    current.require_staff()?;
    let patch: AssignmentPatch = payload(body)?;

    if !current.is_admin() {
        let existing = found(state.storage.get_assignment(&id).await?, &id)?;
        current.require_teacher(&existing.teacher_id)?;
        if let Some(teacher_id) = &patch.teacher_id {
            current.require_teacher(teacher_id)?;
        }
    }

    let assignment = found(state.storage.update_assignment(&id, patch).await?, &id)?;
    Ok(ApiResponse::success(assignment))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    current.require_staff()?;
    if let Some(existing) = state.storage.get_assignment(&id).await? {
        current.require_teacher(&existing.teacher_id)?;
    }
    state.storage.delete_assignment(&id).await?;
    Ok(ApiResponse::no_content())
}

/// GET /api/assignments/:id/submissions
pub async fn submissions(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Submission>> {
    let assignment = found(state.storage.get_assignment(&id).await?, &id)?;
    let scope = current.scope(&*state.storage).await?;
    scope.require_class(&assignment.class_id)?;

    let rows = state.storage.list_submissions_by_assignment(&id).await?;
    Ok(ApiResponse::success(scope.students(rows, |s| s.student_id.as_str())))
}

/// POST /api/assignments/:id/submissions - `assignmentId` comes from the path
pub async fn submit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Submission> {
    current.require_staff()?;
    let new: NewSubmission = payload_with(body, "assignmentId", &id)?;

    let assignment = found(state.storage.get_assignment(&id).await?, &id)?;
    current.require_teacher(&assignment.teacher_id)?;

    let submission = state.storage.create_submission(new).await?;
    tracing::debug!("Recorded submission {} for assignment {}", submission.id, id);
    Ok(ApiResponse::created(submission))
}
