use axum::extract::{Path, State};
use axum::Extension;

use crate::access::{forbidden, CurrentUser};
use crate::app::AppState;
use crate::database::models::{ClassPatch, NewClass, SchoolClass};
use crate::handlers::{found, payload, JsonBody};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/classes - parents see the classes their children attend
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<SchoolClass>> {
    let scope = current.scope(&*state.storage).await?;
    let classes = state.storage.list_classes().await?;
    Ok(ApiResponse::success(scope.classes(classes, |c| c.id.as_str())))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<SchoolClass> {
    let class = found(state.storage.get_class(&id).await?, &id)?;
    current.scope(&*state.storage).await?.require_class(&class.id)?;
    Ok(ApiResponse::success(class))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    body: JsonBody,
) -> ApiResult<SchoolClass> {
    current.require_admin()?;
    let new: NewClass = payload(body)?;
    let class = state.storage.create_class(new).await?;
    tracing::info!("Created class {} ({})", class.name, class.academic_year);
    Ok(ApiResponse::created(class))
}

/// PUT|PATCH /api/classes/:id - admins, or the class teacher. Only admins
/// may reassign the class to another teacher.
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<SchoolClass> {
    current.require_staff()?;
    let patch: ClassPatch = payload(body)?;

    if !current.is_admin() {
        let existing = found(state.storage.get_class(&id).await?, &id)?;
        current.require_class_owner(&existing)?;
        if patch.teacher_id.is_some() && patch.teacher_id != Some(current.teacher_id.clone()) {
            return Err(forbidden());
        }
    }

    let class = found(state.storage.update_class(&id, patch).await?, &id)?;
    Ok(ApiResponse::success(class))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    current.require_admin()?;
    state.storage.delete_class(&id).await?;
    Ok(ApiResponse::no_content())
}
