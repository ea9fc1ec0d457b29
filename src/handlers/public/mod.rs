// handlers/public/mod.rs - Public handlers (no authentication)

use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - service description
pub async fn root() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": "School API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Role-scoped school management backend",
        "endpoints": {
            "health": "/health (public)",
            "auth": "/api/auth/user",
            "dashboard": "/api/dashboard/stats",
            "directory": "/api/users, /api/teachers, /api/classes, /api/students",
            "academics": "/api/attendance, /api/assignments, /api/submissions, /api/timetable",
            "fees": "/api/fee-structures, /api/fee-payments",
            "notifications": "/api/notifications",
        }
    })))
}

/// GET /health - storage reachability
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    if let Err(e) = state.storage.health_check().await {
        tracing::error!("Health check failed: {}", e);
        return Err(ApiError::service_unavailable("Database unavailable"));
    }

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok"
    })))
}
