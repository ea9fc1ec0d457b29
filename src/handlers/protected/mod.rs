// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Route prefix: /api/*
// Middleware: jwt_auth_middleware → validate_user_middleware
//
// Every handler checks in the same order: role gate, payload validation,
// ownership (which may read storage), then the one storage call.

pub mod assignments;
pub mod attendance;
pub mod auth;
pub mod classes;
pub mod dashboard;
pub mod fees;
pub mod notifications;
pub mod students;
pub mod submissions;
pub mod teachers;
pub mod timetable;
pub mod users;
