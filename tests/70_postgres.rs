//! `PgStorage` against a live database.
//!
//! Each test migrates a throwaway schema and drops it afterwards. Tests
//! return early when `DATABASE_URL` is unset.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};

use school_api::database::models::*;
use school_api::database::{DatabaseError, DatabaseManager, NotificationFilter, PgStorage, Storage};
use school_api::types::*;

struct TestDb {
    admin: PgPool,
    schema: String,
    storage: PgStorage,
}

impl TestDb {
    async fn create() -> Result<Option<Self>> {
        dotenvy::dotenv().ok();
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping Postgres storage test");
            return Ok(None);
        };

        let schema = format!("school_test_{}", uuid::Uuid::new_v4().simple());
        let admin = PgPool::connect(&url).await.context("connect")?;
        admin.execute(format!("CREATE SCHEMA {}", schema).as_str()).await?;

        let search_path = format!("SET search_path TO {}", schema);
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    conn.execute(search_path.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&url)
            .await?;
        DatabaseManager::migrate(&pool).await?;

        Ok(Some(Self {
            admin,
            schema,
            storage: PgStorage::new(pool),
        }))
    }

    async fn drop(self) -> Result<()> {
        self.admin
            .execute(format!("DROP SCHEMA {} CASCADE", self.schema).as_str())
            .await?;
        Ok(())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed_teacher(storage: &PgStorage) -> Result<Teacher> {
    let user = storage
        .create_user(NewUser {
            email: Some(format!("{}@school.test", new_id())),
            first_name: Some("Sarah".into()),
            last_name: Some("Johnson".into()),
            profile_image_url: None,
            role: Role::Teacher,
        })
        .await?;
    Ok(storage
        .create_teacher(NewTeacher {
            user_id: user.id,
            employee_id: format!("EMP-{}", new_id()),
            subject: "Mathematics".into(),
            years_experience: 8,
            phone: None,
            qualifications: Some("M.Sc.".into()),
        })
        .await?)
}

async fn seed_class(storage: &PgStorage, teacher_id: Option<&str>) -> Result<SchoolClass> {
    Ok(storage
        .create_class(NewClass {
            name: "Grade 10-A".into(),
            grade: 10,
            section: "A".into(),
            teacher_id: teacher_id.map(String::from),
            academic_year: "2024-2025".into(),
            max_students: 30,
        })
        .await?)
}

fn new_student(student_id: &str, class_id: Option<&str>) -> NewStudent {
    NewStudent {
        student_id: student_id.into(),
        first_name: "Emma".into(),
        last_name: "Thompson".into(),
        date_of_birth: date(2009, 3, 14),
        class_id: class_id.map(String::from),
        parent_id: None,
        admission_date: date(2024, 4, 1),
        status: StudentStatus::Active,
        roll_number: Some(7),
    }
}

fn new_structure(class_id: &str, amount: Decimal) -> NewFeeStructure {
    NewFeeStructure {
        class_id: class_id.into(),
        fee_type: "Tuition".into(),
        amount,
        frequency: FeeFrequency::Monthly,
        academic_year: "2024-2025".into(),
    }
}

fn new_payment(student_id: &str, structure_id: &str, amount: Decimal, status: PaymentStatus) -> NewFeePayment {
    NewFeePayment {
        student_id: student_id.into(),
        fee_structure_id: structure_id.into(),
        amount,
        payment_date: date(2024, 6, 1),
        payment_method: PaymentMethod::Cash,
        status,
        receipt_number: format!("RCP-{}", new_id()),
    }
}

#[tokio::test]
async fn directory_round_trip() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let storage = &db.storage;

    let teacher = seed_teacher(storage).await?;
    assert_eq!(storage.get_teacher(&teacher.id).await?, Some(teacher.clone()));
    assert_eq!(storage.get_teacher_by_user_id(&teacher.user_id).await?, Some(teacher.clone()));

    let class = seed_class(storage, Some(&teacher.id)).await?;
    assert_eq!(storage.get_class(&class.id).await?, Some(class.clone()));
    assert_eq!(class.max_students, 30);

    let student = storage.create_student(new_student("STU-2024-001", Some(&class.id))).await?;
    assert_eq!(storage.get_student(&student.id).await?, Some(student.clone()));
    assert_eq!(storage.list_students_by_class(&class.id).await?, vec![student.clone()]);

    let patched = storage
        .update_student(
            &student.id,
            StudentPatch {
                status: Some(StudentStatus::Inactive),
                roll_number: Some(None),
                ..Default::default()
            },
        )
        .await?
        .context("student")?;
    assert_eq!(patched.status, StudentStatus::Inactive);
    assert_eq!(patched.roll_number, None);
    assert_eq!(patched.first_name, "Emma");
    assert_eq!(patched.created_at, student.created_at);
    assert!(patched.updated_at >= student.updated_at);

    let teacher_patch = TeacherPatch {
        years_experience: Some(9),
        ..Default::default()
    };
    let teacher_after = storage.update_teacher(&teacher.id, teacher_patch).await?.context("teacher")?;
    assert_eq!(teacher_after.years_experience, 9);
    assert_eq!(teacher_after.employee_id, teacher.employee_id);

    assert!(storage.update_class("missing", ClassPatch::default()).await?.is_none());

    storage.delete_student(&student.id).await?;
    storage.delete_student(&student.id).await?;
    assert!(storage.get_student(&student.id).await?.is_none());

    storage.delete_class(&class.id).await?;
    storage.delete_teacher(&teacher.id).await?;
    storage.delete_user(&teacher.user_id).await?;
    assert!(storage.list_users().await?.is_empty());

    db.drop().await
}

#[tokio::test]
async fn upsert_user_keeps_id() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let storage = &db.storage;

    let profile = |role| NewUser {
        email: Some("admin@school.test".into()),
        first_name: Some("Ada".into()),
        last_name: None,
        profile_image_url: None,
        role,
    };
    let first = storage.upsert_user("user-1", profile(Role::Parent)).await?;
    let second = storage.upsert_user("user-1", profile(Role::Admin)).await?;
    assert_eq!(first.id, second.id);
    assert_eq!(second.role, Role::Admin);
    assert_eq!(storage.list_users().await?.len(), 1);

    db.drop().await
}

#[tokio::test]
async fn constraint_violations_name_the_field() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let storage = &db.storage;

    let class = seed_class(storage, None).await?;
    storage.create_student(new_student("STU-2024-001", Some(&class.id))).await?;

    let err = storage
        .create_student(new_student("STU-2024-001", Some(&class.id)))
        .await
        .unwrap_err();
    assert!(matches!(&err, DatabaseError::Conflict { field } if field == "studentId"), "{:?}", err);

    let err = storage
        .create_student(new_student("STU-2024-002", Some("no-such-class")))
        .await
        .unwrap_err();
    assert!(matches!(&err, DatabaseError::MissingReference { field } if field == "classId"), "{:?}", err);

    let err = storage.delete_class(&class.id).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Referenced { by, .. } if by == "students"));

    db.drop().await
}

#[tokio::test]
async fn attendance_mark_upserts_on_student_and_date() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let storage = &db.storage;

    let class = seed_class(storage, None).await?;
    let student = storage.create_student(new_student("STU-2024-001", Some(&class.id))).await?;

    let mark = |status, day| NewAttendance {
        student_id: student.id.clone(),
        class_id: class.id.clone(),
        date: date(2024, 6, day),
        status,
        marked_by: None,
    };

    let first = storage.mark_attendance(mark(AttendanceStatus::Present, 3)).await?;
    let second = storage.mark_attendance(mark(AttendanceStatus::Late, 3)).await?;
    assert_eq!(first.id, second.id);
    assert_eq!(second.status, AttendanceStatus::Late);
    assert_eq!(second.created_at, first.created_at);

    storage.mark_attendance(mark(AttendanceStatus::Absent, 4)).await?;

    let by_day = storage.list_attendance_by_class_and_date(&class.id, date(2024, 6, 3)).await?;
    assert_eq!(by_day.len(), 1);
    assert_eq!(by_day[0].status, AttendanceStatus::Late);

    let history = storage.list_attendance_by_student(&student.id).await?;
    let days: Vec<NaiveDate> = history.iter().map(|a| a.date).collect();
    assert_eq!(days, vec![date(2024, 6, 4), date(2024, 6, 3)]);

    // A patch colliding with another day's mark is a conflict on the pair
    let err = storage
        .update_attendance(
            &history[0].id,
            AttendancePatch {
                date: Some(date(2024, 6, 3)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict { .. }));

    db.drop().await
}

#[tokio::test]
async fn coursework_and_timetable_round_trip() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let storage = &db.storage;

    let teacher = seed_teacher(storage).await?;
    let class = seed_class(storage, Some(&teacher.id)).await?;
    let student = storage.create_student(new_student("STU-2024-001", Some(&class.id))).await?;

    let assignment = storage
        .create_assignment(NewAssignment {
            title: "Quadratic equations".into(),
            description: None,
            class_id: class.id.clone(),
            teacher_id: teacher.id.clone(),
            subject: "Mathematics".into(),
            due_date: date(2024, 6, 14),
            max_marks: 50,
            status: AssignmentStatus::Active,
        })
        .await?;
    assert_eq!(storage.get_assignment(&assignment.id).await?, Some(assignment.clone()));
    assert_eq!(storage.list_assignments_by_teacher(&teacher.id).await?.len(), 1);

    let submission = storage
        .create_submission(NewSubmission {
            assignment_id: assignment.id.clone(),
            student_id: student.id.clone(),
            submission_text: Some("x = 2 or x = 3".into()),
            marks_obtained: None,
            feedback: None,
            submitted_at: None,
            graded_at: None,
            status: SubmissionStatus::Submitted,
        })
        .await?;
    let graded = storage
        .update_submission(
            &submission.id,
            SubmissionPatch {
                marks_obtained: Some(Some(45)),
                status: Some(SubmissionStatus::Graded),
                ..Default::default()
            },
        )
        .await?
        .context("submission")?;
    assert_eq!(graded.marks_obtained, Some(45));
    assert_eq!(graded.submission_text.as_deref(), Some("x = 2 or x = 3"));
    assert_eq!(storage.list_submissions_by_assignment(&assignment.id).await?, vec![graded]);

    let err = storage.delete_assignment(&assignment.id).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Referenced { .. }));

    let slot = |day, start: &str, end: &str| NewTimetableEntry {
        class_id: class.id.clone(),
        teacher_id: teacher.id.clone(),
        subject: "Mathematics".into(),
        day_of_week: day,
        start_time: start.into(),
        end_time: end.into(),
        room: Some("101".into()),
        academic_year: "2024-2025".into(),
    };
    storage.create_timetable_entry(slot(2, "09:00", "09:45")).await?;
    storage.create_timetable_entry(slot(1, "10:00", "10:45")).await?;
    let monday = storage.create_timetable_entry(slot(1, "08:00", "08:45")).await?;

    let ordered = storage.list_timetable_by_class(&class.id).await?;
    let keys: Vec<(i32, &str)> = ordered.iter().map(|t| (t.day_of_week, t.start_time.as_str())).collect();
    assert_eq!(keys, vec![(1, "08:00"), (1, "10:00"), (2, "09:00")]);

    let moved = storage
        .update_timetable_entry(
            &monday.id,
            TimetablePatch {
                room: Some(None),
                ..Default::default()
            },
        )
        .await?
        .context("timetable")?;
    assert_eq!(moved.room, None);
    assert_eq!(moved.start_time, "08:00");

    db.drop().await
}

#[tokio::test]
async fn fees_keep_two_decimal_places() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let storage = &db.storage;

    let class = seed_class(storage, None).await?;
    let student = storage.create_student(new_student("STU-2024-001", Some(&class.id))).await?;

    let structure = storage.create_fee_structure(new_structure(&class.id, Decimal::new(125, 1))).await?;
    assert_eq!(structure.amount.to_string(), "12.50");
    assert_eq!(storage.list_fee_structures_by_class(&class.id).await?, vec![structure.clone()]);

    let payment = storage
        .create_fee_payment(new_payment(&student.id, &structure.id, Decimal::new(25000, 2), PaymentStatus::Completed))
        .await?;
    assert_eq!(storage.get_fee_payment(&payment.id).await?, Some(payment.clone()));

    let duplicate = NewFeePayment {
        receipt_number: payment.receipt_number.clone(),
        ..new_payment(&student.id, &structure.id, Decimal::ONE, PaymentStatus::Completed)
    };
    let err = storage.create_fee_payment(duplicate).await.unwrap_err();
    assert!(matches!(&err, DatabaseError::Conflict { field } if field == "receiptNumber"), "{:?}", err);

    let updated = storage
        .update_fee_payment(
            &payment.id,
            FeePaymentPatch {
                status: Some(PaymentStatus::Failed),
                ..Default::default()
            },
        )
        .await?
        .context("payment")?;
    assert_eq!(updated.status, PaymentStatus::Failed);
    assert_eq!(updated.amount, payment.amount);

    db.drop().await
}

#[tokio::test]
async fn dashboard_counts_and_sums() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let storage = &db.storage;

    let empty = storage.dashboard_stats().await?;
    assert_eq!(empty.total_students, 0);
    assert_eq!(empty.total_teachers, 0);
    assert_eq!(empty.active_classes, 0);
    assert_eq!(empty.total_fee_collection, Decimal::ZERO);

    seed_teacher(storage).await?;
    let class = seed_class(storage, None).await?;
    let active = storage.create_student(new_student("STU-2024-001", Some(&class.id))).await?;
    storage
        .create_student(NewStudent {
            status: StudentStatus::Transferred,
            ..new_student("STU-2024-002", Some(&class.id))
        })
        .await?;
    let structure = storage.create_fee_structure(new_structure(&class.id, Decimal::new(25000, 2))).await?;
    for (amount, status) in [
        (Decimal::new(25000, 2), PaymentStatus::Completed),
        (Decimal::new(20000, 2), PaymentStatus::Completed),
        (Decimal::new(9999, 2), PaymentStatus::Pending),
    ] {
        storage
            .create_fee_payment(new_payment(&active.id, &structure.id, amount, status))
            .await?;
    }

    let stats = storage.dashboard_stats().await?;
    assert_eq!(stats.total_students, 1);
    assert_eq!(stats.total_teachers, 1);
    assert_eq!(stats.active_classes, 1);
    assert_eq!(stats.total_fee_collection, Decimal::new(45000, 2));

    db.drop().await
}

#[tokio::test]
async fn notifications_filter_and_read_once() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let storage = &db.storage;

    let parent = storage
        .create_user(NewUser {
            role: Role::Parent,
            ..Default::default()
        })
        .await?;
    let notice = |recipient_id: Option<&str>, recipient_role| NewNotification {
        title: "Parent evening".into(),
        message: "Thursday 6pm".into(),
        recipient_id: recipient_id.map(String::from),
        recipient_role,
        kind: NotificationType::General,
        is_read: false,
    };
    let direct = storage.create_notification(notice(Some(&parent.id), None)).await?;
    let broadcast = storage.create_notification(notice(None, Some(Role::Parent))).await?;
    storage.create_notification(notice(None, Some(Role::Teacher))).await?;

    let to_parent = NotificationFilter {
        recipient_id: Some(parent.id.clone()),
        role: None,
    };
    assert_eq!(storage.list_notifications(&to_parent).await?, vec![direct.clone()]);

    let parents = NotificationFilter {
        recipient_id: None,
        role: Some(Role::Parent),
    };
    assert_eq!(storage.list_notifications(&parents).await?, vec![broadcast]);
    assert_eq!(storage.list_notifications(&NotificationFilter::default()).await?.len(), 3);

    let read = storage.mark_notification_read(&direct.id).await?.context("notification")?;
    assert!(read.is_read);
    let again = storage.mark_notification_read(&direct.id).await?.context("notification")?;
    assert!(again.is_read);
    assert_eq!(again.updated_at, read.updated_at);
    assert!(storage.mark_notification_read("missing").await?.is_none());

    db.drop().await
}
