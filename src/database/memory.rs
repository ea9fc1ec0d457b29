use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::database::error::DatabaseError;
use crate::database::models::*;
use crate::database::storage::{NotificationFilter, Storage, StorageResult};
use crate::types::{PaymentStatus, StudentStatus};

/// Fractional digits of the `NUMERIC(10, 2)` money columns
const MONEY_SCALE: u32 = 2;

/// In-process storage with the same integrity rules as the Postgres schema:
/// foreign keys must resolve, unique columns stay unique, and referenced
/// rows cannot be deleted.
#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    teachers: Vec<Teacher>,
    classes: Vec<SchoolClass>,
    students: Vec<Student>,
    attendance: Vec<Attendance>,
    assignments: Vec<Assignment>,
    submissions: Vec<Submission>,
    fee_structures: Vec<FeeStructure>,
    fee_payments: Vec<FeePayment>,
    notifications: Vec<Notification>,
    timetable: Vec<TimetableEntry>,
}

/// A foreign key held by a row: (field, referenced table, referenced id)
type Reference<'a> = (&'static str, &'static str, &'a str);

trait Stored: Entity {
    fn rows(tables: &Tables) -> &Vec<Self>;
    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self>;

    fn references(&self) -> Vec<Reference<'_>> {
        Vec::new()
    }

    /// (field, key) pairs that must not repeat across rows
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

fn refs<'a>(pairs: &[(&'static str, &'static str, Option<&'a str>)]) -> Vec<Reference<'a>> {
    pairs
        .iter()
        .filter_map(|(field, table, id)| id.map(|id| (*field, *table, id)))
        .collect()
}

impl Stored for User {
    fn rows(t: &Tables) -> &Vec<Self> {
        &t.users
    }
    fn rows_mut(t: &mut Tables) -> &mut Vec<Self> {
        &mut t.users
    }
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        self.email.iter().map(|e| ("email", e.clone())).collect()
    }
}

impl Stored for Teacher {
    fn rows(t: &Tables) -> &Vec<Self> {
        &t.teachers
    }
    fn rows_mut(t: &mut Tables) -> &mut Vec<Self> {
        &mut t.teachers
    }
    fn references(&self) -> Vec<Reference<'_>> {
        refs(&[("userId", User::TABLE, Some(self.user_id.as_str()))])
    }
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("employeeId", self.employee_id.clone())]
    }
}

impl Stored for SchoolClass {
    fn rows(t: &Tables) -> &Vec<Self> {
        &t.classes
    }
    fn rows_mut(t: &mut Tables) -> &mut Vec<Self> {
        &mut t.classes
    }
    fn references(&self) -> Vec<Reference<'_>> {
        refs(&[("teacherId", Teacher::TABLE, self.teacher_id.as_deref())])
    }
}

impl Stored for Student {
    fn rows(t: &Tables) -> &Vec<Self> {
        &t.students
    }
    fn rows_mut(t: &mut Tables) -> &mut Vec<Self> {
        &mut t.students
    }
    fn references(&self) -> Vec<Reference<'_>> {
        refs(&[
            ("classId", SchoolClass::TABLE, self.class_id.as_deref()),
            ("parentId", User::TABLE, self.parent_id.as_deref()),
        ])
    }
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("studentId", self.student_id.clone())]
    }
}

impl Stored for Attendance {
    fn rows(t: &Tables) -> &Vec<Self> {
        &t.attendance
    }
    fn rows_mut(t: &mut Tables) -> &mut Vec<Self> {
        &mut t.attendance
    }
    fn references(&self) -> Vec<Reference<'_>> {
        refs(&[
            ("studentId", Student::TABLE, Some(self.student_id.as_str())),
            ("classId", SchoolClass::TABLE, Some(self.class_id.as_str())),
            ("markedBy", User::TABLE, self.marked_by.as_deref()),
        ])
    }
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("date", format!("{}/{}", self.student_id, self.date))]
    }
}

impl Stored for Assignment {
    fn rows(t: &Tables) -> &Vec<Self> {
        &t.assignments
    }
    fn rows_mut(t: &mut Tables) -> &mut Vec<Self> {
        &mut t.assignments
    }
    fn references(&self) -> Vec<Reference<'_>> {
        refs(&[
            ("classId", SchoolClass::TABLE, Some(self.class_id.as_str())),
            ("teacherId", Teacher::TABLE, Some(self.teacher_id.as_str())),
        ])
    }
}

impl Stored for Submission {
    fn rows(t: &Tables) -> &Vec<Self> {
        &t.submissions
    }
    fn rows_mut(t: &mut Tables) -> &mut Vec<Self> {
        &mut t.submissions
    }
    fn references(&self) -> Vec<Reference<'_>> {
        refs(&[
            ("assignmentId", Assignment::TABLE, Some(self.assignment_id.as_str())),
            ("studentId", Student::TABLE, Some(self.student_id.as_str())),
        ])
    }
}

impl Stored for FeeStructure {
    fn rows(t: &Tables) -> &Vec<Self> {
        &t.fee_structures
    }
    fn rows_mut(t: &mut Tables) -> &mut Vec<Self> {
        &mut t.fee_structures
    }
    fn references(&self) -> Vec<Reference<'_>> {
        refs(&[("classId", SchoolClass::TABLE, Some(self.class_id.as_str()))])
    }
}

impl Stored for FeePayment {
    fn rows(t: &Tables) -> &Vec<Self> {
        &t.fee_payments
    }
    fn rows_mut(t: &mut Tables) -> &mut Vec<Self> {
        &mut t.fee_payments
    }
    fn references(&self) -> Vec<Reference<'_>> {
        refs(&[
            ("studentId", Student::TABLE, Some(self.student_id.as_str())),
            ("feeStructureId", FeeStructure::TABLE, Some(self.fee_structure_id.as_str())),
        ])
    }
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("receiptNumber", self.receipt_number.clone())]
    }
}

impl Stored for Notification {
    fn rows(t: &Tables) -> &Vec<Self> {
        &t.notifications
    }
    fn rows_mut(t: &mut Tables) -> &mut Vec<Self> {
        &mut t.notifications
    }
    fn references(&self) -> Vec<Reference<'_>> {
        refs(&[("recipientId", User::TABLE, self.recipient_id.as_deref())])
    }
}

impl Stored for TimetableEntry {
    fn rows(t: &Tables) -> &Vec<Self> {
        &t.timetable
    }
    fn rows_mut(t: &mut Tables) -> &mut Vec<Self> {
        &mut t.timetable
    }
    fn references(&self) -> Vec<Reference<'_>> {
        refs(&[
            ("classId", SchoolClass::TABLE, Some(self.class_id.as_str())),
            ("teacherId", Teacher::TABLE, Some(self.teacher_id.as_str())),
        ])
    }
}

impl Tables {
    fn contains<T: Stored>(&self, id: &str) -> bool {
        T::rows(self).iter().any(|r| r.id() == id)
    }

    fn exists(&self, table: &str, id: &str) -> bool {
        match table {
            User::TABLE => self.contains::<User>(id),
            Teacher::TABLE => self.contains::<Teacher>(id),
            SchoolClass::TABLE => self.contains::<SchoolClass>(id),
            Student::TABLE => self.contains::<Student>(id),
            FeeStructure::TABLE => self.contains::<FeeStructure>(id),
            Assignment::TABLE => self.contains::<Assignment>(id),
            _ => false,
        }
    }

    fn points_at<T: Stored>(&self, table: &str, id: &str) -> bool {
        T::rows(self)
            .iter()
            .any(|r| r.references().iter().any(|(_, t, rid)| *t == table && *rid == id))
    }

    /// Table of the first row that still references `table`/`id`
    fn referrer(&self, table: &str, id: &str) -> Option<&'static str> {
        [
            (Teacher::TABLE, self.points_at::<Teacher>(table, id)),
            (SchoolClass::TABLE, self.points_at::<SchoolClass>(table, id)),
            (Student::TABLE, self.points_at::<Student>(table, id)),
            (Attendance::TABLE, self.points_at::<Attendance>(table, id)),
            (Assignment::TABLE, self.points_at::<Assignment>(table, id)),
            (Submission::TABLE, self.points_at::<Submission>(table, id)),
            (FeeStructure::TABLE, self.points_at::<FeeStructure>(table, id)),
            (FeePayment::TABLE, self.points_at::<FeePayment>(table, id)),
            (Notification::TABLE, self.points_at::<Notification>(table, id)),
            (TimetableEntry::TABLE, self.points_at::<TimetableEntry>(table, id)),
        ]
        .into_iter()
        .find_map(|(name, hit)| hit.then_some(name))
    }

    /// Enforce foreign keys and unique columns for `row` about to be written
    fn check<T: Stored>(&self, row: &T) -> Result<(), DatabaseError> {
        for (field, table, id) in row.references() {
            if !self.exists(table, id) {
                return Err(DatabaseError::MissingReference { field: field.to_string() });
            }
        }
        for (field, key) in row.unique_keys() {
            let taken = T::rows(self)
                .iter()
                .filter(|other| other.id() != row.id())
                .any(|other| other.unique_keys().iter().any(|(f, k)| *f == field && *k == key));
            if taken {
                return Err(DatabaseError::Conflict { field: field.to_string() });
            }
        }
        Ok(())
    }

    fn insert<T: Stored>(&mut self, row: T) -> Result<T, DatabaseError> {
        self.check(&row)?;
        T::rows_mut(self).push(row.clone());
        Ok(row)
    }

    fn replace<T: Stored>(&mut self, row: T) -> Result<T, DatabaseError> {
        self.check(&row)?;
        if let Some(slot) = T::rows_mut(self).iter_mut().find(|r| r.id() == row.id()) {
            *slot = row.clone();
        }
        Ok(row)
    }
}

fn newest_first<T: Entity>(rows: impl DoubleEndedIterator<Item = T>) -> Vec<T> {
    let mut rows: Vec<T> = rows.rev().collect();
    rows.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    rows
}

impl MemoryStorage {
    async fn list<T: Stored>(&self) -> StorageResult<Vec<T>> {
        self.list_by(|_: &T| true).await
    }

    async fn list_by<T, P>(&self, predicate: P) -> StorageResult<Vec<T>>
    where
        T: Stored,
        P: Fn(&T) -> bool + Send,
    {
        let tables = self.tables.read().await;
        Ok(newest_first(
            T::rows(&tables).iter().filter(|&r| predicate(r)).cloned(),
        ))
    }

    async fn get<T: Stored>(&self, id: &str) -> StorageResult<Option<T>> {
        let tables = self.tables.read().await;
        Ok(T::rows(&tables).iter().find(|r| r.id() == id).cloned())
    }

    async fn insert<T: Stored>(&self, row: T) -> StorageResult<T> {
        self.tables.write().await.insert(row)
    }

    async fn update_with<T, F>(&self, id: &str, apply: F) -> StorageResult<Option<T>>
    where
        T: Stored,
        F: FnOnce(&mut T, DateTime<Utc>) + Send,
    {
        let mut tables = self.tables.write().await;
        let Some(mut row) = T::rows(&tables).iter().find(|r| r.id() == id).cloned() else {
            return Ok(None);
        };
        apply(&mut row, Utc::now());
        tables.replace(row).map(Some)
    }

    async fn delete<T: Stored>(&self, id: &str) -> StorageResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.contains::<T>(id) {
            return Ok(());
        }
        if let Some(by) = tables.referrer(T::TABLE, id) {
            return Err(DatabaseError::Referenced { entity: T::LABEL, by: by.to_string() });
        }
        T::rows_mut(&mut tables).retain(|r| r.id() != id);
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn list_users(&self) -> StorageResult<Vec<User>> {
        self.list().await
    }

    async fn get_user(&self, id: &str) -> StorageResult<Option<User>> {
        self.get(id).await
    }

    async fn create_user(&self, new: NewUser) -> StorageResult<User> {
        self.insert(new.into_row(new_id(), Utc::now())).await
    }

    async fn update_user(&self, id: &str, patch: UserPatch) -> StorageResult<Option<User>> {
        self.update_with(id, |row, now| patch.apply(row, now)).await
    }

    async fn delete_user(&self, id: &str) -> StorageResult<()> {
        self.delete::<User>(id).await
    }

    async fn upsert_user(&self, id: &str, user: NewUser) -> StorageResult<User> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let existing = tables.users.iter().find(|u| u.id == id).map(|u| u.created_at);
        match existing {
            Some(created_at) => {
                let mut row = user.into_row(id.to_string(), now);
                row.created_at = created_at;
                tables.replace(row)
            }
            None => tables.insert(user.into_row(id.to_string(), now)),
        }
    }

    async fn list_teachers(&self) -> StorageResult<Vec<Teacher>> {
        self.list().await
    }

    async fn get_teacher(&self, id: &str) -> StorageResult<Option<Teacher>> {
        self.get(id).await
    }

    async fn get_teacher_by_user_id(&self, user_id: &str) -> StorageResult<Option<Teacher>> {
        Ok(self
            .list_by(|t: &Teacher| t.user_id == user_id)
            .await?
            .into_iter()
            .next())
    }

    async fn create_teacher(&self, new: NewTeacher) -> StorageResult<Teacher> {
        self.insert(new.into_row(new_id(), Utc::now())).await
    }

    async fn update_teacher(&self, id: &str, patch: TeacherPatch) -> StorageResult<Option<Teacher>> {
        self.update_with(id, |row, now| patch.apply(row, now)).await
    }

    async fn delete_teacher(&self, id: &str) -> StorageResult<()> {
        self.delete::<Teacher>(id).await
    }

    async fn list_classes(&self) -> StorageResult<Vec<SchoolClass>> {
        self.list().await
    }

    async fn get_class(&self, id: &str) -> StorageResult<Option<SchoolClass>> {
        self.get(id).await
    }

    async fn create_class(&self, new: NewClass) -> StorageResult<SchoolClass> {
        self.insert(new.into_row(new_id(), Utc::now())).await
    }

    async fn update_class(&self, id: &str, patch: ClassPatch) -> StorageResult<Option<SchoolClass>> {
        self.update_with(id, |row, now| patch.apply(row, now)).await
    }

    async fn delete_class(&self, id: &str) -> StorageResult<()> {
        self.delete::<SchoolClass>(id).await
    }

    async fn list_students(&self) -> StorageResult<Vec<Student>> {
        self.list().await
    }

    async fn list_students_by_parent(&self, parent_id: &str) -> StorageResult<Vec<Student>> {
        self.list_by(|s: &Student| s.parent_id.as_deref() == Some(parent_id))
            .await
    }

    async fn list_students_by_class(&self, class_id: &str) -> StorageResult<Vec<Student>> {
        self.list_by(|s: &Student| s.class_id.as_deref() == Some(class_id))
            .await
    }

    async fn get_student(&self, id: &str) -> StorageResult<Option<Student>> {
        self.get(id).await
    }

    async fn create_student(&self, new: NewStudent) -> StorageResult<Student> {
        self.insert(new.into_row(new_id(), Utc::now())).await
    }

    async fn update_student(&self, id: &str, patch: StudentPatch) -> StorageResult<Option<Student>> {
        self.update_with(id, |row, now| patch.apply(row, now)).await
    }

    async fn delete_student(&self, id: &str) -> StorageResult<()> {
        self.delete::<Student>(id).await
    }

    async fn list_attendance(&self) -> StorageResult<Vec<Attendance>> {
        self.list().await
    }

    async fn list_attendance_by_class_and_date(
        &self,
        class_id: &str,
        date: NaiveDate,
    ) -> StorageResult<Vec<Attendance>> {
        self.list_by(|a: &Attendance| a.class_id == class_id && a.date == date)
            .await
    }

    async fn list_attendance_by_student(&self, student_id: &str) -> StorageResult<Vec<Attendance>> {
        let mut rows = self
            .list_by(|a: &Attendance| a.student_id == student_id)
            .await?;
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn get_attendance(&self, id: &str) -> StorageResult<Option<Attendance>> {
        self.get(id).await
    }

    async fn mark_attendance(&self, new: NewAttendance) -> StorageResult<Attendance> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let existing = tables
            .attendance
            .iter()
            .find(|a| a.student_id == new.student_id && a.date == new.date)
            .cloned();
        match existing {
            Some(mut row) => {
                row.class_id = new.class_id;
                row.status = new.status;
                row.marked_by = new.marked_by;
                row.updated_at = now;
                tables.replace(row)
            }
            None => tables.insert(new.into_row(new_id(), now)),
        }
    }

    async fn update_attendance(&self, id: &str, patch: AttendancePatch) -> StorageResult<Option<Attendance>> {
        self.update_with(id, |row, now| patch.apply(row, now)).await
    }

    async fn delete_attendance(&self, id: &str) -> StorageResult<()> {
        self.delete::<Attendance>(id).await
    }

    async fn list_assignments(&self) -> StorageResult<Vec<Assignment>> {
        self.list().await
    }

    async fn list_assignments_by_class(&self, class_id: &str) -> StorageResult<Vec<Assignment>> {
        self.list_by(|a: &Assignment| a.class_id == class_id).await
    }

    async fn list_assignments_by_teacher(&self, teacher_id: &str) -> StorageResult<Vec<Assignment>> {
        self.list_by(|a: &Assignment| a.teacher_id == teacher_id).await
    }

    async fn get_assignment(&self, id: &str) -> StorageResult<Option<Assignment>> {
        self.get(id).await
    }

    async fn create_assignment(&self, new: NewAssignment) -> StorageResult<Assignment> {
        self.insert(new.into_row(new_id(), Utc::now())).await
    }

    async fn update_assignment(&self, id: &str, patch: AssignmentPatch) -> StorageResult<Option<Assignment>> {
        self.update_with(id, |row, now| patch.apply(row, now)).await
    }

    async fn delete_assignment(&self, id: &str) -> StorageResult<()> {
        self.delete::<Assignment>(id).await
    }

    async fn list_submissions(&self) -> StorageResult<Vec<Submission>> {
        self.list().await
    }

    async fn list_submissions_by_assignment(&self, assignment_id: &str) -> StorageResult<Vec<Submission>> {
        self.list_by(|s: &Submission| s.assignment_id == assignment_id)
            .await
    }

    async fn list_submissions_by_student(&self, student_id: &str) -> StorageResult<Vec<Submission>> {
        self.list_by(|s: &Submission| s.student_id == student_id).await
    }

    async fn get_submission(&self, id: &str) -> StorageResult<Option<Submission>> {
        self.get(id).await
    }

    async fn create_submission(&self, new: NewSubmission) -> StorageResult<Submission> {
        self.insert(new.into_row(new_id(), Utc::now())).await
    }

    async fn update_submission(&self, id: &str, patch: SubmissionPatch) -> StorageResult<Option<Submission>> {
        self.update_with(id, |row, now| patch.apply(row, now)).await
    }

    async fn delete_submission(&self, id: &str) -> StorageResult<()> {
        self.delete::<Submission>(id).await
    }

    async fn list_fee_structures(&self) -> StorageResult<Vec<FeeStructure>> {
        self.list().await
    }

    async fn list_fee_structures_by_class(&self, class_id: &str) -> StorageResult<Vec<FeeStructure>> {
        self.list_by(|f: &FeeStructure| f.class_id == class_id).await
    }

    async fn get_fee_structure(&self, id: &str) -> StorageResult<Option<FeeStructure>> {
        self.get(id).await
    }

    async fn create_fee_structure(&self, new: NewFeeStructure) -> StorageResult<FeeStructure> {
        let mut row = new.into_row(new_id(), Utc::now());
        row.amount.rescale(MONEY_SCALE);
        self.insert(row).await
    }

    async fn update_fee_structure(
        &self,
        id: &str,
        patch: FeeStructurePatch,
    ) -> StorageResult<Option<FeeStructure>> {
        self.update_with(id, |row: &mut FeeStructure, now| {
            patch.apply(row, now);
            row.amount.rescale(MONEY_SCALE);
        })
        .await
    }

    async fn delete_fee_structure(&self, id: &str) -> StorageResult<()> {
        self.delete::<FeeStructure>(id).await
    }

    async fn list_fee_payments(&self) -> StorageResult<Vec<FeePayment>> {
        self.list().await
    }

    async fn list_fee_payments_by_student(&self, student_id: &str) -> StorageResult<Vec<FeePayment>> {
        let mut rows = self
            .list_by(|p: &FeePayment| p.student_id == student_id)
            .await?;
        rows.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        Ok(rows)
    }

    async fn get_fee_payment(&self, id: &str) -> StorageResult<Option<FeePayment>> {
        self.get(id).await
    }

    async fn create_fee_payment(&self, new: NewFeePayment) -> StorageResult<FeePayment> {
        let mut row = new.into_row(new_id(), Utc::now());
        row.amount.rescale(MONEY_SCALE);
        self.insert(row).await
    }

    async fn update_fee_payment(&self, id: &str, patch: FeePaymentPatch) -> StorageResult<Option<FeePayment>> {
        self.update_with(id, |row: &mut FeePayment, now| {
            patch.apply(row, now);
            row.amount.rescale(MONEY_SCALE);
        })
        .await
    }

    async fn delete_fee_payment(&self, id: &str) -> StorageResult<()> {
        self.delete::<FeePayment>(id).await
    }

    async fn list_notifications(&self, filter: &NotificationFilter) -> StorageResult<Vec<Notification>> {
        self.list_by(|n: &Notification| filter.matches(n)).await
    }

    async fn get_notification(&self, id: &str) -> StorageResult<Option<Notification>> {
        self.get(id).await
    }

    async fn create_notification(&self, new: NewNotification) -> StorageResult<Notification> {
        self.insert(new.into_row(new_id(), Utc::now())).await
    }

    async fn update_notification(
        &self,
        id: &str,
        patch: NotificationPatch,
    ) -> StorageResult<Option<Notification>> {
        self.update_with(id, |row, now| patch.apply(row, now)).await
    }

    async fn delete_notification(&self, id: &str) -> StorageResult<()> {
        self.delete::<Notification>(id).await
    }

    async fn mark_notification_read(&self, id: &str) -> StorageResult<Option<Notification>> {
        let mut tables = self.tables.write().await;
        Ok(tables.notifications.iter_mut().find(|n| n.id == id).map(|n| {
            if !n.is_read {
                n.is_read = true;
                n.updated_at = Utc::now();
            }
            n.clone()
        }))
    }

    async fn list_timetable(&self) -> StorageResult<Vec<TimetableEntry>> {
        self.list().await
    }

    async fn list_timetable_by_class(&self, class_id: &str) -> StorageResult<Vec<TimetableEntry>> {
        let mut rows = self
            .list_by(|t: &TimetableEntry| t.class_id == class_id)
            .await?;
        rows.sort_by(|a, b| {
            (a.day_of_week, &a.start_time).cmp(&(b.day_of_week, &b.start_time))
        });
        Ok(rows)
    }

    async fn get_timetable_entry(&self, id: &str) -> StorageResult<Option<TimetableEntry>> {
        self.get(id).await
    }

    async fn create_timetable_entry(&self, new: NewTimetableEntry) -> StorageResult<TimetableEntry> {
        self.insert(new.into_row(new_id(), Utc::now())).await
    }

    async fn update_timetable_entry(
        &self,
        id: &str,
        patch: TimetablePatch,
    ) -> StorageResult<Option<TimetableEntry>> {
        self.update_with(id, |row, now| patch.apply(row, now)).await
    }

    async fn delete_timetable_entry(&self, id: &str) -> StorageResult<()> {
        self.delete::<TimetableEntry>(id).await
    }

    async fn dashboard_stats(&self) -> StorageResult<DashboardStats> {
        let tables = self.tables.read().await;
        Ok(DashboardStats {
            total_students: tables
                .students
                .iter()
                .filter(|s| s.status == StudentStatus::Active)
                .count() as i64,
            total_teachers: tables.teachers.len() as i64,
            active_classes: tables.classes.len() as i64,
            total_fee_collection: tables
                .fee_payments
                .iter()
                .filter(|p| p.status == PaymentStatus::Completed)
                .fold(Decimal::ZERO, |sum, p| sum + p.amount),
        })
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
