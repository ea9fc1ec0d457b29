//! The persistence seam.
//!
//! Handlers only ever talk to `dyn Storage`. [`PgStorage`](super::PgStorage)
//! is the production implementation; [`MemoryStorage`](super::MemoryStorage)
//! keeps the same integrity rules in process for tests and `--memory` runs.
//!
//! Conventions shared by both implementations:
//! - lists are newest first (`created_at` descending) unless noted;
//! - `update_*` merges the patch, refreshes `updated_at` and returns `None`
//!   when the id does not exist;
//! - `delete_*` of a missing id succeeds, and deleting a row other rows
//!   still reference fails with [`DatabaseError::Referenced`].

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::database::error::DatabaseError;
use crate::database::models::*;
use crate::types::Role;

pub type StorageResult<T> = Result<T, DatabaseError>;

/// Audience selector for notification listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationFilter {
    pub recipient_id: Option<String>,
    pub role: Option<Role>,
}

impl NotificationFilter {
    pub fn matches(&self, n: &Notification) -> bool {
        match (&self.recipient_id, self.role) {
            (Some(id), Some(role)) => {
                n.recipient_id.as_deref() == Some(id.as_str()) && n.recipient_role == Some(role)
            }
            (None, Some(role)) => n.recipient_id.is_none() && n.recipient_role == Some(role),
            (Some(id), None) => n.recipient_id.as_deref() == Some(id.as_str()),
            (None, None) => true,
        }
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    // Users
    async fn list_users(&self) -> StorageResult<Vec<User>>;
    async fn get_user(&self, id: &str) -> StorageResult<Option<User>>;
    async fn create_user(&self, new: NewUser) -> StorageResult<User>;
    async fn update_user(&self, id: &str, patch: UserPatch) -> StorageResult<Option<User>>;
    async fn delete_user(&self, id: &str) -> StorageResult<()>;
    /// Insert a user under a known id, or overwrite the profile if it exists
    async fn upsert_user(&self, id: &str, user: NewUser) -> StorageResult<User>;

    // Teachers
    async fn list_teachers(&self) -> StorageResult<Vec<Teacher>>;
    async fn get_teacher(&self, id: &str) -> StorageResult<Option<Teacher>>;
    async fn get_teacher_by_user_id(&self, user_id: &str) -> StorageResult<Option<Teacher>>;
    async fn create_teacher(&self, new: NewTeacher) -> StorageResult<Teacher>;
    async fn update_teacher(&self, id: &str, patch: TeacherPatch) -> StorageResult<Option<Teacher>>;
    async fn delete_teacher(&self, id: &str) -> StorageResult<()>;

    // Classes
    async fn list_classes(&self) -> StorageResult<Vec<SchoolClass>>;
    async fn get_class(&self, id: &str) -> StorageResult<Option<SchoolClass>>;
    async fn create_class(&self, new: NewClass) -> StorageResult<SchoolClass>;
    async fn update_class(&self, id: &str, patch: ClassPatch) -> StorageResult<Option<SchoolClass>>;
    async fn delete_class(&self, id: &str) -> StorageResult<()>;

    // Students
    async fn list_students(&self) -> StorageResult<Vec<Student>>;
    async fn list_students_by_parent(&self, parent_id: &str) -> StorageResult<Vec<Student>>;
    async fn list_students_by_class(&self, class_id: &str) -> StorageResult<Vec<Student>>;
    async fn get_student(&self, id: &str) -> StorageResult<Option<Student>>;
    async fn create_student(&self, new: NewStudent) -> StorageResult<Student>;
    async fn update_student(&self, id: &str, patch: StudentPatch) -> StorageResult<Option<Student>>;
    async fn delete_student(&self, id: &str) -> StorageResult<()>;

    // Attendance
    async fn list_attendance(&self) -> StorageResult<Vec<Attendance>>;
    async fn list_attendance_by_class_and_date(
        &self,
        class_id: &str,
        date: NaiveDate,
    ) -> StorageResult<Vec<Attendance>>;
    /// Ordered by `date` descending
    async fn list_attendance_by_student(&self, student_id: &str) -> StorageResult<Vec<Attendance>>;
    async fn get_attendance(&self, id: &str) -> StorageResult<Option<Attendance>>;
    /// Record a mark; a second mark for the same student and date replaces
    /// the first in place, keeping its id
    async fn mark_attendance(&self, new: NewAttendance) -> StorageResult<Attendance>;
    async fn update_attendance(&self, id: &str, patch: AttendancePatch) -> StorageResult<Option<Attendance>>;
    async fn delete_attendance(&self, id: &str) -> StorageResult<()>;

    // Assignments
    async fn list_assignments(&self) -> StorageResult<Vec<Assignment>>;
    async fn list_assignments_by_class(&self, class_id: &str) -> StorageResult<Vec<Assignment>>;
    async fn list_assignments_by_teacher(&self, teacher_id: &str) -> StorageResult<Vec<Assignment>>;
    async fn get_assignment(&self, id: &str) -> StorageResult<Option<Assignment>>;
    async fn create_assignment(&self, new: NewAssignment) -> StorageResult<Assignment>;
    async fn update_assignment(&self, id: &str, patch: AssignmentPatch) -> StorageResult<Option<Assignment>>;
    async fn delete_assignment(&self, id: &str) -> StorageResult<()>;

    // Submissions
    async fn list_submissions(&self) -> StorageResult<Vec<Submission>>;
    async fn list_submissions_by_assignment(&self, assignment_id: &str) -> StorageResult<Vec<Submission>>;
    async fn list_submissions_by_student(&self, student_id: &str) -> StorageResult<Vec<Submission>>;
    async fn get_submission(&self, id: &str) -> StorageResult<Option<Submission>>;
    async fn create_submission(&self, new: NewSubmission) -> StorageResult<Submission>;
    async fn update_submission(&self, id: &str, patch: SubmissionPatch) -> StorageResult<Option<Submission>>;
    async fn delete_submission(&self, id: &str) -> StorageResult<()>;

    // Fee structures
    async fn list_fee_structures(&self) -> StorageResult<Vec<FeeStructure>>;
    async fn list_fee_structures_by_class(&self, class_id: &str) -> StorageResult<Vec<FeeStructure>>;
    async fn get_fee_structure(&self, id: &str) -> StorageResult<Option<FeeStructure>>;
    async fn create_fee_structure(&self, new: NewFeeStructure) -> StorageResult<FeeStructure>;
    async fn update_fee_structure(
        &self,
        id: &str,
        patch: FeeStructurePatch,
    ) -> StorageResult<Option<FeeStructure>>;
    async fn delete_fee_structure(&self, id: &str) -> StorageResult<()>;

    // Fee payments
    async fn list_fee_payments(&self) -> StorageResult<Vec<FeePayment>>;
    /// Ordered by `payment_date` descending
    async fn list_fee_payments_by_student(&self, student_id: &str) -> StorageResult<Vec<FeePayment>>;
    async fn get_fee_payment(&self, id: &str) -> StorageResult<Option<FeePayment>>;
    async fn create_fee_payment(&self, new: NewFeePayment) -> StorageResult<FeePayment>;
    async fn update_fee_payment(&self, id: &str, patch: FeePaymentPatch) -> StorageResult<Option<FeePayment>>;
    async fn delete_fee_payment(&self, id: &str) -> StorageResult<()>;

    // Notifications
    async fn list_notifications(&self, filter: &NotificationFilter) -> StorageResult<Vec<Notification>>;
    async fn get_notification(&self, id: &str) -> StorageResult<Option<Notification>>;
    async fn create_notification(&self, new: NewNotification) -> StorageResult<Notification>;
    async fn update_notification(
        &self,
        id: &str,
        patch: NotificationPatch,
    ) -> StorageResult<Option<Notification>>;
    async fn delete_notification(&self, id: &str) -> StorageResult<()>;
    /// Idempotent; `None` when the id does not exist
    async fn mark_notification_read(&self, id: &str) -> StorageResult<Option<Notification>>;

    // Timetable
    async fn list_timetable(&self) -> StorageResult<Vec<TimetableEntry>>;
    /// Ordered by `day_of_week`, then `start_time`
    async fn list_timetable_by_class(&self, class_id: &str) -> StorageResult<Vec<TimetableEntry>>;
    async fn get_timetable_entry(&self, id: &str) -> StorageResult<Option<TimetableEntry>>;
    async fn create_timetable_entry(&self, new: NewTimetableEntry) -> StorageResult<TimetableEntry>;
    async fn update_timetable_entry(
        &self,
        id: &str,
        patch: TimetablePatch,
    ) -> StorageResult<Option<TimetableEntry>>;
    async fn delete_timetable_entry(&self, id: &str) -> StorageResult<()>;

    async fn dashboard_stats(&self) -> StorageResult<DashboardStats>;

    async fn health_check(&self) -> StorageResult<()>;
}
