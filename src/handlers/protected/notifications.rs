use axum::extract::{Path, Query, State};
use axum::Extension;
use serde::Deserialize;

use crate::access::{forbidden, CurrentUser};
use crate::app::AppState;
use crate::database::models::{NewNotification, Notification, NotificationPatch};
use crate::database::NotificationFilter;
use crate::error::ApiError;
use crate::handlers::{found, payload, JsonBody};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Role;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    pub recipient_id: Option<String>,
    pub role: Option<String>,
}

impl NotificationQuery {
    fn into_filter(self) -> Result<NotificationFilter, ApiError> {
        let role = self
            .role
            .map(|r| r.parse::<Role>())
            .transpose()
            .map_err(|e| ApiError::invalid_field("role", e))?;
        Ok(NotificationFilter {
            recipient_id: self.recipient_id,
            role,
        })
    }
}

fn require_visible(current: &CurrentUser, notification: &Notification) -> Result<(), ApiError> {
    if current.is_admin() || notification.is_visible_to(current.id(), current.role()) {
        Ok(())
    } else {
        Err(forbidden())
    }
}

/// GET /api/notifications?recipientId=&role=
///
/// Admins may filter freely. Everyone else only sees notifications addressed
/// to them or broadcast to their role, and may only narrow to those.
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<Vec<Notification>> {
    let filter = query.into_filter()?;
    if current.is_admin() {
        return Ok(ApiResponse::success(state.storage.list_notifications(&filter).await?));
    }

    if filter.recipient_id.as_deref().is_some_and(|id| id != current.id())
        || filter.role.is_some_and(|role| role != current.role())
    {
        return Err(forbidden());
    }

    let mut rows = state.storage.list_notifications(&filter).await?;
    rows.retain(|n| n.is_visible_to(current.id(), current.role()));
    Ok(ApiResponse::success(rows))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Notification> {
    let notification = found(state.storage.get_notification(&id).await?, &id)?;
    require_visible(&current, &notification)?;
    Ok(ApiResponse::success(notification))
}

/// POST /api/notifications - admins and teachers
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    body: JsonBody,
) -> ApiResult<Notification> {
    current.require_staff()?;
    let new: NewNotification = payload(body)?;
    let notification = state.storage.create_notification(new).await?;
    tracing::info!("Created {} notification {}", notification.kind, notification.id);
    Ok(ApiResponse::created(notification))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Notification> {
    current.require_admin()?;
    let patch: NotificationPatch = payload(body)?;
    let notification = found(state.storage.update_notification(&id, patch).await?, &id)?;
    Ok(ApiResponse::success(notification))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    current.require_admin()?;
    state.storage.delete_notification(&id).await?;
    Ok(ApiResponse::no_content())
}

/// PUT /api/notifications/:id/read - idempotent
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Notification> {
    let existing = found(state.storage.get_notification(&id).await?, &id)?;
    require_visible(&current, &existing)?;
    let notification = found(state.storage.mark_notification_read(&id).await?, &id)?;
    Ok(ApiResponse::success(notification))
}
