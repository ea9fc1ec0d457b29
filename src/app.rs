use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::auth::AuthSettings;
use crate::database::Storage;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, validate_user_middleware};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub auth: AuthSettings,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, auth: AuthSettings) -> Self {
        Self { storage, auth }
    }
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected API
        .merge(protected_routes(state.clone()))
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .map_response(|res: axum::response::Response<_>| res.map(axum::body::Body::new))
                .layer(RequestBodyLimitLayer::new(max_body_bytes))
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .with_state(state)
}

/// Everything under /api. The last layer added runs first, so the token is
/// verified before the user lookup.
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/user", get(protected::auth::user))
        .route("/api/dashboard/stats", get(protected::dashboard::stats))
        .merge(directory_routes())
        .merge(academic_routes())
        .merge(fee_routes())
        .merge(notification_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn directory_routes() -> Router<AppState> {
    use protected::{classes, students, teachers, users};

    Router::new()
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/:id",
            get(users::get).put(users::update).patch(users::update).delete(users::delete),
        )
        .route("/api/teachers", get(teachers::list).post(teachers::create))
        .route(
            "/api/teachers/:id",
            get(teachers::get)
                .put(teachers::update)
                .patch(teachers::update)
                .delete(teachers::delete),
        )
        .route("/api/classes", get(classes::list).post(classes::create))
        .route(
            "/api/classes/:id",
            get(classes::get).put(classes::update).patch(classes::update).delete(classes::delete),
        )
        .route("/api/students", get(students::list).post(students::create))
        .route(
            "/api/students/:id",
            get(students::get)
                .put(students::update)
                .patch(students::update)
                .delete(students::delete),
        )
        .route("/api/students/parent/:parentId", get(students::by_parent))
        .route("/api/students/class/:classId", get(students::by_class))
}

fn academic_routes() -> Router<AppState> {
    use protected::{assignments, attendance, submissions, timetable};

    Router::new()
        .route("/api/attendance", get(attendance::list).post(attendance::mark))
        .route(
            "/api/attendance/:id",
            get(attendance::get)
                .put(attendance::update)
                .patch(attendance::update)
                .delete(attendance::delete),
        )
        .route("/api/attendance/class/:classId/:date", get(attendance::by_class_and_date))
        .route("/api/attendance/student/:studentId", get(attendance::by_student))
        .route("/api/assignments", get(assignments::list).post(assignments::create))
        .route(
            "/api/assignments/:id",
            get(assignments::get)
                .put(assignments::update)
                .patch(assignments::update)
                .delete(assignments::delete),
        )
        .route("/api/assignments/class/:classId", get(assignments::by_class))
        .route("/api/assignments/teacher/:teacherId", get(assignments::by_teacher))
        .route(
            "/api/assignments/:id/submissions",
            get(assignments::submissions).post(assignments::submit),
        )
        .route("/api/submissions", get(submissions::list))
        .route(
            "/api/submissions/:id",
            get(submissions::get)
                .put(submissions::update)
                .patch(submissions::update)
                .delete(submissions::delete),
        )
        .route("/api/submissions/student/:studentId", get(submissions::by_student))
        .route("/api/timetable", get(timetable::list).post(timetable::create))
        .route(
            "/api/timetable/:id",
            get(timetable::get)
                .put(timetable::update)
                .patch(timetable::update)
                .delete(timetable::delete),
        )
        .route("/api/timetable/class/:classId", get(timetable::by_class))
}

fn fee_routes() -> Router<AppState> {
    use protected::fees;

    Router::new()
        .route("/api/fee-structures", get(fees::list_structures).post(fees::create_structure))
        .route(
            "/api/fee-structures/:id",
            get(fees::get_structure)
                .put(fees::update_structure)
                .patch(fees::update_structure)
                .delete(fees::delete_structure),
        )
        .route("/api/fee-structures/class/:classId", get(fees::structures_by_class))
        .route("/api/fee-payments", get(fees::list_payments).post(fees::create_payment))
        .route(
            "/api/fee-payments/:id",
            get(fees::get_payment)
                .put(fees::update_payment)
                .patch(fees::update_payment)
                .delete(fees::delete_payment),
        )
        .route("/api/fee-payments/student/:studentId", get(fees::payments_by_student))
        // Legacy aliases
        .route("/api/fees/structure", post(fees::create_structure))
        .route("/api/fees/structure/:classId", get(fees::structures_by_class))
        .route("/api/fees/payments", post(fees::create_payment))
        .route("/api/fees/payments/:studentId", get(fees::payments_by_student))
}

fn notification_routes() -> Router<AppState> {
    use protected::notifications;

    Router::new()
        .route(
            "/api/notifications",
            get(notifications::list).post(notifications::create),
        )
        .route(
            "/api/notifications/:id",
            get(notifications::get)
                .put(notifications::update)
                .patch(notifications::update)
                .delete(notifications::delete),
        )
        .route("/api/notifications/:id/read", put(notifications::mark_read))
}

/// Serve until ctrl-c
pub async fn serve(listener: tokio::net::TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down");
        })
        .await
}
