//! Row, insert and patch types for every table.
//!
//! Rows derive `sqlx::FromRow` and serialize as camelCase JSON. Insert
//! payloads (`New*`) carry resolved defaults; patch payloads (`*Patch`) hold
//! only the fields a request supplied, with `Option<Option<_>>` for nullable
//! columns so an explicit `null` clears the value.

pub mod assignment;
pub mod attendance;
pub mod class;
pub mod dashboard;
pub mod fee;
pub mod notification;
pub mod student;
pub mod submission;
pub mod teacher;
pub mod timetable;
pub mod user;

use chrono::{DateTime, Utc};

pub use assignment::{Assignment, AssignmentPatch, NewAssignment};
pub use attendance::{Attendance, AttendancePatch, NewAttendance};
pub use class::{ClassPatch, NewClass, SchoolClass};
pub use dashboard::DashboardStats;
pub use fee::{FeePayment, FeePaymentPatch, FeeStructure, FeeStructurePatch, NewFeePayment, NewFeeStructure};
pub use notification::{NewNotification, Notification, NotificationPatch};
pub use student::{NewStudent, Student, StudentPatch};
pub use submission::{NewSubmission, Submission, SubmissionPatch};
pub use teacher::{NewTeacher, Teacher, TeacherPatch};
pub use timetable::{NewTimetableEntry, TimetableEntry, TimetablePatch};
pub use user::{NewUser, User, UserPatch};

/// Common accessors for persisted rows
pub trait Entity: Clone + Send + Sync + Unpin + 'static {
    /// Table the rows live in
    const TABLE: &'static str;
    /// Singular label used in client messages
    const LABEL: &'static str;

    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Generate a fresh opaque identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

macro_rules! impl_entity {
    ($ty:ty, $table:literal, $label:literal) => {
        impl $crate::database::models::Entity for $ty {
            const TABLE: &'static str = $table;
            const LABEL: &'static str = $label;

            fn id(&self) -> &str {
                &self.id
            }

            fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
                self.created_at
            }
        }
    };
}

pub(crate) use impl_entity;
