use axum::extract::State;
use axum::Extension;

use crate::access::CurrentUser;
use crate::app::AppState;
use crate::database::models::DashboardStats;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/dashboard/stats - admins and teachers
pub async fn stats(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<DashboardStats> {
    current.require_staff()?;
    Ok(ApiResponse::success(state.storage.dashboard_stats().await?))
}
