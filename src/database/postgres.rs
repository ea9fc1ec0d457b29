use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::Postgres;
use sqlx::query_builder::Separated;
use sqlx::{PgPool, QueryBuilder};
use tracing::debug;

use crate::database::manager::DatabaseManager;
use crate::database::models::*;
use crate::database::repository::{Columns, Repository};
use crate::database::storage::{NotificationFilter, Storage, StorageResult};

const NEWEST_FIRST: &str = "created_at DESC";

/// PostgreSQL-backed storage
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repo<T: Columns>(&self) -> Repository<'_, T> {
        Repository::new(&self.pool)
    }

    async fn list<T: Columns>(&self) -> StorageResult<Vec<T>> {
        self.repo::<T>().select_all(NEWEST_FIRST).await
    }

    async fn list_where<T: Columns>(&self, column: &str, value: &str) -> StorageResult<Vec<T>> {
        self.repo::<T>().select_where(column, value, NEWEST_FIRST).await
    }

    async fn get<T: Columns>(&self, id: &str) -> StorageResult<Option<T>> {
        self.repo::<T>().select_id(id).await
    }

    async fn insert<T: Columns>(&self, row: T) -> StorageResult<T> {
        let created = self.repo::<T>().insert(&row).await?;
        debug!("Inserted {} {}", T::LABEL, created.id());
        Ok(created)
    }

    /// Read, merge in Rust, write the whole row back
    async fn update_with<T, F>(&self, id: &str, apply: F) -> StorageResult<Option<T>>
    where
        T: Columns,
        F: FnOnce(&mut T, DateTime<Utc>) + Send,
    {
        let repo = self.repo::<T>();
        let Some(mut row) = repo.select_id(id).await? else {
            return Ok(None);
        };
        apply(&mut row, Utc::now());
        repo.save(&row).await
    }

    async fn delete<T: Columns>(&self, id: &str) -> StorageResult<()> {
        self.repo::<T>().delete_id(id).await
    }
}

#[async_trait]
impl Storage for PgStorage {
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
        let row = user.into_row(id.to_string(), Utc::now());
        self.repo::<User>()
            .upsert(
                &row,
                &["id"],
                &["email", "first_name", "last_name", "profile_image_url", "role", "updated_at"],
            )
            .await
    }

    async fn list_teachers(&self) -> StorageResult<Vec<Teacher>> {
        self.list().await
    }

    async fn get_teacher(&self, id: &str) -> StorageResult<Option<Teacher>> {
        self.get(id).await
    }

    async fn get_teacher_by_user_id(&self, user_id: &str) -> StorageResult<Option<Teacher>> {
        Ok(self
            .list_where::<Teacher>("user_id", user_id)
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
        self.list_where("parent_id", parent_id).await
    }

    async fn list_students_by_class(&self, class_id: &str) -> StorageResult<Vec<Student>> {
        self.list_where("class_id", class_id).await
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
        Ok(sqlx::query_as::<_, Attendance>(
            "SELECT * FROM attendance WHERE class_id = $1 AND date = $2 ORDER BY created_at DESC",
        )
        .bind(class_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_attendance_by_student(&self, student_id: &str) -> StorageResult<Vec<Attendance>> {
        self.repo::<Attendance>()
            .select_where("student_id", student_id, "date DESC, created_at DESC")
            .await
    }

    async fn get_attendance(&self, id: &str) -> StorageResult<Option<Attendance>> {
        self.get(id).await
    }

    async fn mark_attendance(&self, new: NewAttendance) -> StorageResult<Attendance> {
        let row = new.into_row(new_id(), Utc::now());
        self.repo::<Attendance>()
            .upsert(
                &row,
                &["student_id", "date"],
                &["class_id", "status", "marked_by", "updated_at"],
            )
            .await
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
        self.list_where("class_id", class_id).await
    }

    async fn list_assignments_by_teacher(&self, teacher_id: &str) -> StorageResult<Vec<Assignment>> {
        self.list_where("teacher_id", teacher_id).await
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
        self.list_where("assignment_id", assignment_id).await
    }

    async fn list_submissions_by_student(&self, student_id: &str) -> StorageResult<Vec<Submission>> {
        self.list_where("student_id", student_id).await
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
        self.list_where("class_id", class_id).await
    }

    async fn get_fee_structure(&self, id: &str) -> StorageResult<Option<FeeStructure>> {
        self.get(id).await
    }

    async fn create_fee_structure(&self, new: NewFeeStructure) -> StorageResult<FeeStructure> {
        self.insert(new.into_row(new_id(), Utc::now())).await
    }

    async fn update_fee_structure(
        &self,
        id: &str,
        patch: FeeStructurePatch,
    ) -> StorageResult<Option<FeeStructure>> {
        self.update_with(id, |row, now| patch.apply(row, now)).await
    }

    async fn delete_fee_structure(&self, id: &str) -> StorageResult<()> {
        self.delete::<FeeStructure>(id).await
    }

    async fn list_fee_payments(&self) -> StorageResult<Vec<FeePayment>> {
        self.list().await
    }

    async fn list_fee_payments_by_student(&self, student_id: &str) -> StorageResult<Vec<FeePayment>> {
        self.repo::<FeePayment>()
            .select_where("student_id", student_id, "payment_date DESC, created_at DESC")
            .await
    }

    async fn get_fee_payment(&self, id: &str) -> StorageResult<Option<FeePayment>> {
        self.get(id).await
    }

    async fn create_fee_payment(&self, new: NewFeePayment) -> StorageResult<FeePayment> {
        self.insert(new.into_row(new_id(), Utc::now())).await
    }

    async fn update_fee_payment(&self, id: &str, patch: FeePaymentPatch) -> StorageResult<Option<FeePayment>> {
        self.update_with(id, |row, now| patch.apply(row, now)).await
    }

    async fn delete_fee_payment(&self, id: &str) -> StorageResult<()> {
        self.delete::<FeePayment>(id).await
    }

    async fn list_notifications(&self, filter: &NotificationFilter) -> StorageResult<Vec<Notification>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM notifications WHERE TRUE");
        match (&filter.recipient_id, filter.role) {
            (Some(id), Some(role)) => {
                qb.push(" AND recipient_id = ").push_bind(id.clone());
                qb.push(" AND recipient_role = ").push_bind(role);
            }
            (None, Some(role)) => {
                qb.push(" AND recipient_id IS NULL AND recipient_role = ").push_bind(role);
            }
            (Some(id), None) => {
                qb.push(" AND recipient_id = ").push_bind(id.clone());
            }
            (None, None) => {}
        }
        qb.push(" ORDER BY created_at DESC");

        Ok(qb.build_query_as::<Notification>().fetch_all(&self.pool).await?)
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
        Ok(sqlx::query_as::<_, Notification>(
            "UPDATE notifications \
             SET updated_at = CASE WHEN is_read THEN updated_at ELSE NOW() END, is_read = TRUE \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_timetable(&self) -> StorageResult<Vec<TimetableEntry>> {
        self.list().await
    }

    async fn list_timetable_by_class(&self, class_id: &str) -> StorageResult<Vec<TimetableEntry>> {
        self.repo::<TimetableEntry>()
            .select_where("class_id", class_id, "day_of_week ASC, start_time ASC")
            .await
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
        let (total_students, total_teachers, active_classes, total_fee_collection) = futures::try_join!(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students WHERE status = 'active'")
                .fetch_one(&self.pool),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM teachers").fetch_one(&self.pool),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM classes").fetch_one(&self.pool),
            sqlx::query_scalar::<_, Decimal>(
                "SELECT COALESCE(SUM(amount), 0) FROM fee_payments WHERE status = 'completed'",
            )
            .fetch_one(&self.pool),
        )?;

        Ok(DashboardStats {
            total_students,
            total_teachers,
            active_classes,
            total_fee_collection,
        })
    }

    async fn health_check(&self) -> StorageResult<()> {
        DatabaseManager::health_check(&self.pool).await
    }
}

type Values<'a, 'b> = Separated<'a, 'static, Postgres, &'b str>;

impl Columns for User {
    const COLUMNS: &'static [&'static str] = &[
        "id", "email", "first_name", "last_name", "profile_image_url", "role", "created_at",
        "updated_at",
    ];

    fn bind_values(&self, v: &mut Values<'_, 'static>) {
        v.push_bind(self.id.clone())
            .push_bind(self.email.clone())
            .push_bind(self.first_name.clone())
            .push_bind(self.last_name.clone())
            .push_bind(self.profile_image_url.clone())
            .push_bind(self.role)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Columns for Teacher {
    const COLUMNS: &'static [&'static str] = &[
        "id", "user_id", "employee_id", "subject", "years_experience", "phone", "qualifications",
        "created_at", "updated_at",
    ];

    fn bind_values(&self, v: &mut Values<'_, 'static>) {
        v.push_bind(self.id.clone())
            .push_bind(self.user_id.clone())
            .push_bind(self.employee_id.clone())
            .push_bind(self.subject.clone())
            .push_bind(self.years_experience)
            .push_bind(self.phone.clone())
            .push_bind(self.qualifications.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Columns for SchoolClass {
    const COLUMNS: &'static [&'static str] = &[
        "id", "name", "grade", "section", "teacher_id", "academic_year", "max_students",
        "created_at", "updated_at",
    ];

    fn bind_values(&self, v: &mut Values<'_, 'static>) {
        v.push_bind(self.id.clone())
            .push_bind(self.name.clone())
            .push_bind(self.grade)
            .push_bind(self.section.clone())
            .push_bind(self.teacher_id.clone())
            .push_bind(self.academic_year.clone())
            .push_bind(self.max_students)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Columns for Student {
    const COLUMNS: &'static [&'static str] = &[
        "id", "student_id", "first_name", "last_name", "date_of_birth", "class_id", "parent_id",
        "admission_date", "status", "roll_number", "created_at", "updated_at",
    ];

    fn bind_values(&self, v: &mut Values<'_, 'static>) {
        v.push_bind(self.id.clone())
            .push_bind(self.student_id.clone())
            .push_bind(self.first_name.clone())
            .push_bind(self.last_name.clone())
            .push_bind(self.date_of_birth)
            .push_bind(self.class_id.clone())
            .push_bind(self.parent_id.clone())
            .push_bind(self.admission_date)
            .push_bind(self.status)
            .push_bind(self.roll_number)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Columns for Attendance {
    const COLUMNS: &'static [&'static str] = &[
        "id", "student_id", "class_id", "date", "status", "marked_by", "created_at", "updated_at",
    ];

    fn bind_values(&self, v: &mut Values<'_, 'static>) {
        v.push_bind(self.id.clone())
            .push_bind(self.student_id.clone())
            .push_bind(self.class_id.clone())
            .push_bind(self.date)
            .push_bind(self.status)
            .push_bind(self.marked_by.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Columns for Assignment {
    const COLUMNS: &'static [&'static str] = &[
        "id", "title", "description", "class_id", "teacher_id", "subject", "due_date",
        "max_marks", "status", "created_at", "updated_at",
    ];

    fn bind_values(&self, v: &mut Values<'_, 'static>) {
        v.push_bind(self.id.clone())
            .push_bind(self.title.clone())
            .push_bind(self.description.clone())
            .push_bind(self.class_id.clone())
            .push_bind(self.teacher_id.clone())
            .push_bind(self.subject.clone())
            .push_bind(self.due_date)
            .push_bind(self.max_marks)
            .push_bind(self.status)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Columns for Submission {
    const COLUMNS: &'static [&'static str] = &[
        "id", "assignment_id", "student_id", "submission_text", "marks_obtained", "feedback",
        "submitted_at", "graded_at", "status", "created_at", "updated_at",
    ];

    fn bind_values(&self, v: &mut Values<'_, 'static>) {
        v.push_bind(self.id.clone())
            .push_bind(self.assignment_id.clone())
            .push_bind(self.student_id.clone())
            .push_bind(self.submission_text.clone())
            .push_bind(self.marks_obtained)
            .push_bind(self.feedback.clone())
            .push_bind(self.submitted_at)
            .push_bind(self.graded_at)
            .push_bind(self.status)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Columns for FeeStructure {
    const COLUMNS: &'static [&'static str] = &[
        "id", "class_id", "fee_type", "amount", "frequency", "academic_year", "created_at",
        "updated_at",
    ];

    fn bind_values(&self, v: &mut Values<'_, 'static>) {
        v.push_bind(self.id.clone())
            .push_bind(self.class_id.clone())
            .push_bind(self.fee_type.clone())
            .push_bind(self.amount)
            .push_bind(self.frequency)
            .push_bind(self.academic_year.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Columns for FeePayment {
    const COLUMNS: &'static [&'static str] = &[
        "id", "student_id", "fee_structure_id", "amount", "payment_date", "payment_method",
        "status", "receipt_number", "created_at", "updated_at",
    ];

    fn bind_values(&self, v: &mut Values<'_, 'static>) {
        v.push_bind(self.id.clone())
            .push_bind(self.student_id.clone())
            .push_bind(self.fee_structure_id.clone())
            .push_bind(self.amount)
            .push_bind(self.payment_date)
            .push_bind(self.payment_method)
            .push_bind(self.status)
            .push_bind(self.receipt_number.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Columns for Notification {
    const COLUMNS: &'static [&'static str] = &[
        "id", "title", "message", "recipient_id", "recipient_role", "type", "is_read",
        "created_at", "updated_at",
    ];

    fn bind_values(&self, v: &mut Values<'_, 'static>) {
        v.push_bind(self.id.clone())
            .push_bind(self.title.clone())
            .push_bind(self.message.clone())
            .push_bind(self.recipient_id.clone())
            .push_bind(self.recipient_role)
            .push_bind(self.kind)
            .push_bind(self.is_read)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl Columns for TimetableEntry {
    const COLUMNS: &'static [&'static str] = &[
        "id", "class_id", "teacher_id", "subject", "day_of_week", "start_time", "end_time", "room",
        "academic_year", "created_at", "updated_at",
    ];

    fn bind_values(&self, v: &mut Values<'_, 'static>) {
        v.push_bind(self.id.clone())
            .push_bind(self.class_id.clone())
            .push_bind(self.teacher_id.clone())
            .push_bind(self.subject.clone())
            .push_bind(self.day_of_week)
            .push_bind(self.start_time.clone())
            .push_bind(self.end_time.clone())
            .push_bind(self.room.clone())
            .push_bind(self.academic_year.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}
