use axum::extract::{Path, State};
use axum::Extension;

use crate::access::CurrentUser;
use crate::app::AppState;
use crate::database::models::{Submission, SubmissionPatch};
use crate::error::ApiError;
use crate::handlers::{found, payload, JsonBody};
use crate::middleware::{ApiResponse, ApiResult};

/// Admins pass; teachers only for submissions against their assignments
async fn require_assignment_teacher(
    state: &AppState,
    current: &CurrentUser,
    assignment_id: &str,
) -> Result<(), ApiError> {
    if current.is_admin() {
        return Ok(());
    }
    let assignment = state
        .storage
        .get_assignment(assignment_id)
        .await?
        .ok_or_else(|| ApiError::invalid_field("assignmentId", "does not reference an existing record"))?;
    current.require_teacher(&assignment.teacher_id)
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<Submission>> {
    let scope = current.scope(&*state.storage).await?;
    let rows = state.storage.list_submissions().await?;
    Ok(ApiResponse::success(scope.students(rows, |s| s.student_id.as_str())))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Submission> {
    let submission = found(state.storage.get_submission(&id).await?, &id)?;
    current.scope(&*state.storage).await?.require_student(&submission.student_id)?;
    Ok(ApiResponse::success(submission))
}

/// GET /api/submissions/student/:studentId
pub async fn by_student(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(student_id): Path<String>,
) -> ApiResult<Vec<Submission>> {
    current.scope(&*state.storage).await?.require_student(&student_id)?;
    Ok(ApiResponse::success(state.storage.list_submissions_by_student(&student_id).await?))
}

/// PUT|PATCH /api/submissions/:id - grading
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Submission> {
    current.require_staff()?;
    let patch: SubmissionPatch = payload(body)?;

    if !current.is_admin() {
        let existing = found(state.storage.get_submission(&id).await?, &id)?;
        require_assignment_teacher(&state, &current, &existing.assignment_id).await?;
        if let Some(assignment_id) = &patch.assignment_id {
            require_assignment_teacher(&state, &current, assignment_id).await?;
        }
    }

    let submission = found(state.storage.update_submission(&id, patch).await?, &id)?;
    Ok(ApiResponse::success(submission))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    current.require_staff()?;
    if let Some(existing) = state.storage.get_submission(&id).await? {
        require_assignment_teacher(&state, &current, &existing.assignment_id).await?;
    }
    state.storage.delete_submission(&id).await?;
    Ok(ApiResponse::no_content())
}
