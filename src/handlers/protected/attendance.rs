use axum::extract::{Path, State};
use axum::Extension;

use crate::access::{forbidden, CurrentUser};
use crate::app::AppState;
use crate::database::models::{Attendance, AttendancePatch, NewAttendance};
use crate::error::ApiError;
use crate::handlers::{found, path_date, payload, JsonBody};
use crate::middleware::{ApiResponse, ApiResult};

/// Teachers only mark students enrolled in the class they name
async fn require_enrolled(state: &AppState, student_id: &str, class_id: &str) -> Result<(), ApiError> {
    let student = state
        .storage
        .get_student(student_id)
        .await?
        .ok_or_else(|| ApiError::invalid_field("studentId", "does not reference an existing record"))?;
    if student.class_id.as_deref() == Some(class_id) {
        Ok(())
    } else {
        Err(forbidden())
    }
}

/// Non-admins mark under their own name
fn require_self_marked(current: &CurrentUser, marked_by: Option<&str>) -> Result<(), ApiError> {
    match marked_by {
        Some(id) if id != current.id() => Err(forbidden()),
        _ => Ok(()),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<Attendance>> {
    let scope = current.scope(&*state.storage).await?;
    let rows = state.storage.list_attendance().await?;
    Ok(ApiResponse::success(scope.students(rows, |a| a.student_id.as_str())))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Attendance> {
    let record = found(state.storage.get_attendance(&id).await?, &id)?;
    current.scope(&*state.storage).await?.require_student(&record.student_id)?;
    Ok(ApiResponse::success(record))
}

/// GET /api/attendance/class/:classId/:date
pub async fn by_class_and_date(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((class_id, date)): Path<(String, String)>,
) -> ApiResult<Vec<Attendance>> {
    let date = path_date("date", &date)?;
    let scope = current.scope(&*state.storage).await?;
    let rows = state.storage.list_attendance_by_class_and_date(&class_id, date).await?;
    Ok(ApiResponse::success(scope.students(rows, |a| a.student_id.as_str())))
}

/// GET /api/attendance/student/:studentId - newest date first
pub async fn by_student(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(student_id): Path<String>,
) -> ApiResult<Vec<Attendance>> {
    current.scope(&*state.storage).await?.require_student(&student_id)?;
    Ok(ApiResponse::success(state.storage.list_attendance_by_student(&student_id).await?))
}

/// POST /api/attendance - mark a student for a date. Marking the same
/// student and date again overwrites the earlier mark.
pub async fn mark(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    body: JsonBody,
) -> ApiResult<Attendance> {
    current.require_staff()?;
    let mut new: NewAttendance = payload(body)?;

    if !current.is_admin() {
        current.require_class_teacher(&*state.storage, &new.class_id).await?;
        require_enrolled(&state, &new.student_id, &new.class_id).await?;
        let earlier = state
            .storage
            .list_attendance_by_student(&new.student_id)
            .await?
            .into_iter()
            .find(|a| a.date == new.date);
        if let Some(earlier) = earlier {
            current.require_class_teacher(&*state.storage, &earlier.class_id).await?;
        }
        require_self_marked(&current, new.marked_by.as_deref())?;
    }

    if new.marked_by.is_none() {
        new.marked_by = Some(current.id().to_string());
    }

    let record = state.storage.mark_attendance(new).await?;
    tracing::debug!("Marked {} {} as {}", record.student_id, record.date, record.status);
    Ok(ApiResponse::created(record))
}

/// PUT|PATCH /api/attendance/:id - admins, or the teacher of the class
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Attendance> {
    current.require_staff()?;
    let patch: AttendancePatch = payload(body)?;

    if !current.is_admin() {
        let existing = found(state.storage.get_attendance(&id).await?, &id)?;
        current.require_class_teacher(&*state.storage, &existing.class_id).await?;
        if let Some(class_id) = &patch.class_id {
            current.require_class_teacher(&*state.storage, class_id).await?;
        }
        if patch.student_id.is_some() || patch.class_id.is_some() {
            let student_id = patch.student_id.as_deref().unwrap_or(&existing.student_id);
            let class_id = patch.class_id.as_deref().unwrap_or(&existing.class_id);
            require_enrolled(&state, student_id, class_id).await?;
        }
        if let Some(marked_by) = &patch.marked_by {
            require_self_marked(&current, marked_by.as_deref())?;
        }
    }

    let record = found(state.storage.update_attendance(&id, patch).await?, &id)?;
    Ok(ApiResponse::success(record))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    current.require_staff()?;
    if !current.is_admin() {
        if let Some(existing) = state.storage.get_attendance(&id).await? {
            current.require_class_teacher(&*state.storage, &existing.class_id).await?;
        }
    }
    state.storage.delete_attendance(&id).await?;
    Ok(ApiResponse::no_content())
}
