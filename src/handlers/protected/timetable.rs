use axum::extract::{Path, State};
use axum::Extension;

use crate::access::CurrentUser;
use crate::app::AppState;
use crate::database::models::timetable::check_slot;
use crate::database::models::{NewTimetableEntry, TimetableEntry, TimetablePatch};
use crate::handlers::{found, payload, JsonBody};
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::ValidationErrors;

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<TimetableEntry>> {
    let scope = current.scope(&*state.storage).await?;
    let rows = state.storage.list_timetable().await?;
    Ok(ApiResponse::success(scope.classes(rows, |t| t.class_id.as_str())))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<TimetableEntry> {
    let entry = found(state.storage.get_timetable_entry(&id).await?, &id)?;
    current.scope(&*state.storage).await?.require_class(&entry.class_id)?;
    Ok(ApiResponse::success(entry))
}

/// GET /api/timetable/class/:classId - ordered by day, then start time
pub async fn by_class(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(class_id): Path<String>,
) -> ApiResult<Vec<TimetableEntry>> {
    current.scope(&*state.storage).await?.require_class(&class_id)?;
    Ok(ApiResponse::success(state.storage.list_timetable_by_class(&class_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    body: JsonBody,
) -> ApiResult<TimetableEntry> {
    current.require_admin()?;
    let new: NewTimetableEntry = payload(body)?;
    let entry = state.storage.create_timetable_entry(new).await?;
    Ok(ApiResponse::created(entry))
}

/// PUT|PATCH /api/timetable/:id - a patch moving only one end of the slot
/// is checked against the stored other end.
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<TimetableEntry> {
    current.require_admin()?;
    let patch: TimetablePatch = payload(body)?;

    let existing = found(state.storage.get_timetable_entry(&id).await?, &id)?;
    let mut errors = ValidationErrors::default();
    check_slot(
        patch.start_time.as_deref().unwrap_or(&existing.start_time),
        patch.end_time.as_deref().unwrap_or(&existing.end_time),
        &mut errors,
    );
    errors.into_result()?;

    let entry = found(state.storage.update_timetable_entry(&id, patch).await?, &id)?;
    Ok(ApiResponse::success(entry))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    current.require_admin()?;
    state.storage.delete_timetable_entry(&id).await?;
    Ok(ApiResponse::no_content())
}
