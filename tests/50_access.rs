mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use school_api::types::Role;

#[tokio::test]
async fn parent_cannot_list_teachers_or_payments_of_others() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (_, parent) = server.login(Role::Parent).await?;

    let (status, body) = server.get("/api/teachers", &parent).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = server.get("/api/dashboard/stats", &parent).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server.get("/api/users", &parent).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn parent_sees_only_own_children() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (parent, token) = server.login(Role::Parent).await?;
    let (other_parent, _) = server.login(Role::Parent).await?;
    let class = server.seed_class(None).await?;
    let other_class = server.seed_class(None).await?;
    let mine = server.seed_student(Some(&class.id), Some(&parent.id)).await?;
    let theirs = server.seed_student(Some(&other_class.id), Some(&other_parent.id)).await?;

    let (status, body) = server.get("/api/students", &token).await?;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], mine.id.as_str());

    let (status, _) = server.get(&format!("/api/students/{}", theirs.id), &token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server.get(&format!("/api/students/parent/{}", other_parent.id), &token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = server.get("/api/classes", &token).await?;
    let classes = body["data"].as_array().unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0]["id"], class.id.as_str());

    let (status, _) = server.get(&format!("/api/timetable/class/{}", other_class.id), &token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server.get(&format!("/api/fee-payments/student/{}", mine.id), &token).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn teacher_marks_only_own_class() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (teacher, token) = server.login_teacher().await?;
    let (colleague, _) = server.login_teacher().await?;
    let own = server.seed_class(Some(&teacher.id)).await?;
    let foreign = server.seed_class(Some(&colleague.id)).await?;
    let student = server.seed_student(Some(&own.id), None).await?;

    let mark = |class_id: &str| {
        json!({ "studentId": student.id, "classId": class_id, "date": "2024-06-03", "status": "present" })
    };

    let (status, body) = server.post("/api/attendance", &token, mark(&foreign.id)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);

    let (status, body) = server.post("/api/attendance", &token, mark(&own.id)).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    Ok(())
}

#[tokio::test]
async fn teacher_cannot_overwrite_another_class_mark() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (colleague, colleague_token) = server.login_teacher().await?;
    let (outsider, outsider_token) = server.login_teacher().await?;
    let colleague_class = server.seed_class(Some(&colleague.id)).await?;
    let outsider_class = server.seed_class(Some(&outsider.id)).await?;
    let student = server.seed_student(Some(&colleague_class.id), None).await?;
    let outsider_student = server.seed_student(Some(&outsider_class.id), None).await?;

    let (status, body) = server
        .post(
            "/api/attendance",
            &colleague_token,
            json!({ "studentId": student.id, "classId": colleague_class.id, "date": "2024-06-03", "status": "present" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let record_id = body["data"]["id"].as_str().unwrap().to_string();

    // The student is not enrolled in the outsider's class
    let (status, body) = server
        .post(
            "/api/attendance",
            &outsider_token,
            json!({ "studentId": student.id, "classId": outsider_class.id, "date": "2024-06-03", "status": "absent" }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);

    let (status, body) = server
        .patch(
            &format!("/api/attendance/{}", record_id),
            &outsider_token,
            json!({ "status": "absent" }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);

    let (_, body) = server
        .get(&format!("/api/attendance/class/{}/2024-06-03", colleague_class.id), &colleague_token)
        .await?;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], record_id.as_str());
    assert_eq!(rows[0]["status"], "present");
    assert_eq!(rows[0]["markedBy"], colleague.user_id.as_str());

    // Own student, own class still works
    let (status, body) = server
        .post(
            "/api/attendance",
            &outsider_token,
            json!({ "studentId": outsider_student.id, "classId": outsider_class.id, "date": "2024-06-03", "status": "late" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    Ok(())
}

#[tokio::test]
async fn teacher_marks_under_own_name() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (teacher, token) = server.login_teacher().await?;
    let (other, _) = server.login(Role::Admin).await?;
    let class = server.seed_class(Some(&teacher.id)).await?;
    let student = server.seed_student(Some(&class.id), None).await?;

    let mark = |marked_by: &str| {
        json!({ "studentId": student.id, "classId": class.id, "date": "2024-06-03", "status": "present", "markedBy": marked_by })
    };

    let (status, body) = server.post("/api/attendance", &token, mark(&other.id)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);

    let (status, body) = server.post("/api/attendance", &token, mark(&teacher.user_id)).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let record_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = server
        .patch(&format!("/api/attendance/{}", record_id), &token, json!({ "markedBy": other.id }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn teacher_owns_assignments_and_grading() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (teacher, token) = server.login_teacher().await?;
    let (colleague, colleague_token) = server.login_teacher().await?;
    let class = server.seed_class(Some(&teacher.id)).await?;
    let student = server.seed_student(Some(&class.id), None).await?;

    let assignment = |teacher_id: &str| {
        json!({
            "title": "Fractions worksheet",
            "classId": class.id,
            "teacherId": teacher_id,
            "subject": "Mathematics",
            "dueDate": "2024-06-14",
            "maxMarks": 20
        })
    };

    let (status, _) = server.post("/api/assignments", &token, assignment(&colleague.id)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server.post("/api/assignments", &token, assignment(&teacher.id)).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let assignment_id = body["data"]["id"].as_str().unwrap().to_string();

    let path = format!("/api/assignments/{}/submissions", assignment_id);
    let (status, body) = server
        .post(&path, &token, json!({ "studentId": student.id, "submissionText": "1/2 + 1/4 = 3/4" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["assignmentId"], assignment_id.as_str());
    assert_eq!(body["data"]["status"], "pending");
    let submission_id = body["data"]["id"].as_str().unwrap().to_string();

    let grade = json!({ "marksObtained": 18, "status": "graded", "feedback": "Good work" });
    let (status, _) = server
        .patch(&format!("/api/submissions/{}", submission_id), &colleague_token, grade.clone())
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server
        .patch(&format!("/api/submissions/{}", submission_id), &token, grade)
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["marksObtained"], 18);

    let (_, body) = server.get(&path, &token).await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn teachers_have_no_fee_payment_access() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (_, token) = server.login_teacher().await?;

    let (status, _) = server.get("/api/fee-payments", &token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server.get("/api/fee-structures", &token).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
