mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use school_api::types::Role;

fn student_body(student_id: &str, class_id: &str) -> serde_json::Value {
    json!({
        "studentId": student_id,
        "firstName": "Emma",
        "lastName": "Thompson",
        "dateOfBirth": "2014-04-02",
        "classId": class_id,
        "admissionDate": "2024-06-01"
    })
}

#[tokio::test]
async fn create_class_and_enrol_student() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (_, admin) = server.login(Role::Admin).await?;

    let (status, body) = server
        .post(
            "/api/classes",
            &admin,
            json!({ "name": "Grade 10-A", "grade": 10, "section": "A", "academicYear": "2024-2025" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["name"], "Grade 10-A");
    assert_eq!(body["data"]["grade"], 10);
    assert_eq!(body["data"]["maxStudents"], 30);
    let class_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, created) = server.post("/api/students", &admin, student_body("STU-2024-001", &class_id)).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["data"]["status"], "active");
    assert_eq!(created["data"]["dateOfBirth"], "2014-04-02");
    assert_eq!(created["data"]["classId"], class_id.as_str());
    let student_id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = server.get(&format!("/api/students/{}", student_id), &admin).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], created["data"]);

    let (status, body) = server.get("/api/students/parent/unrelated-parent", &admin).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = server.get(&format!("/api/students/class/{}", class_id), &admin).await?;
    assert_eq!(status, StatusCode::OK);
    let students = body["data"].as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["studentId"], "STU-2024-001");
    Ok(())
}

#[tokio::test]
async fn patch_merges_and_put_behaves_the_same() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (_, admin) = server.login(Role::Admin).await?;
    let class = server.seed_class(None).await?;

    let (status, body) = server
        .patch(&format!("/api/classes/{}", class.id), &admin, json!({ "section": "B" }))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["section"], "B");
    assert_eq!(body["data"]["name"], "Grade 5A");
    assert_eq!(body["data"]["grade"], 5);

    let (status, body) = server
        .put(&format!("/api/classes/{}", class.id), &admin, json!({ "maxStudents": 25 }))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["section"], "B");
    assert_eq!(body["data"]["maxStudents"], 25);
    Ok(())
}

#[tokio::test]
async fn missing_rows_are_not_found() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (_, admin) = server.login(Role::Admin).await?;

    let (status, body) = server.get("/api/classes/nope", &admin).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = server.patch("/api/classes/nope", &admin, json!({ "section": "C" })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_is_idempotent() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (_, admin) = server.login(Role::Admin).await?;
    let class = server.seed_class(None).await?;
    let path = format!("/api/classes/{}", class.id);

    let (status, body) = server.delete(&path, &admin).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = server.delete(&path, &admin).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = server.get(&path, &admin).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = server.delete("/api/students/no-such-student", &admin).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
    Ok(())
}

#[tokio::test]
async fn referenced_rows_cannot_be_deleted() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (_, admin) = server.login(Role::Admin).await?;
    let class = server.seed_class(None).await?;
    server.seed_student(Some(&class.id), None).await?;

    let (status, body) = server.delete(&format!("/api/classes/{}", class.id), &admin).await?;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _) = server.get(&format!("/api/classes/{}", class.id), &admin).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn duplicate_unique_field_conflicts() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (_, admin) = server.login(Role::Admin).await?;
    let class = server.seed_class(None).await?;

    let (status, _) = server.post("/api/students", &admin, student_body("STU-1", &class.id)).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = server.post("/api/students", &admin, student_body("STU-1", &class.id)).await?;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);
    assert!(body["error"].as_str().unwrap().contains("studentId"), "{}", body);

    let (status, body) = server.get("/api/students", &admin).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn validation_failures_report_every_field() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (_, admin) = server.login(Role::Admin).await?;

    let (status, body) = server
        .post("/api/classes", &admin, json!({ "name": "X", "grade": 13, "id": "mine" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let fields = body["fieldErrors"].as_object().unwrap();
    assert!(fields.contains_key("grade"), "{}", body);
    assert!(fields.contains_key("section"), "{}", body);
    assert!(fields.contains_key("academicYear"), "{}", body);
    assert!(fields.contains_key("id"), "{}", body);

    let (status, body) = server.get("/api/classes", &admin).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn missing_parent_row_is_a_field_error() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (_, admin) = server.login(Role::Admin).await?;

    let (status, body) = server.post("/api/students", &admin, student_body("STU-9", "no-such-class")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(body["fieldErrors"]["classId"], "does not reference an existing record");
    Ok(())
}

#[tokio::test]
async fn malformed_bodies_are_invalid_json() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (_, admin) = server.login(Role::Admin).await?;

    let res = server
        .client
        .post(server.url("/api/classes"))
        .bearer_auth(&admin)
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "INVALID_JSON");

    let (status, body) = server.post("/api/classes", &admin, json!(["grade", 5])).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn timetable_patch_checks_against_stored_slot() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (_, admin) = server.login(Role::Admin).await?;
    let (teacher, _) = server.login_teacher().await?;
    let class = server.seed_class(Some(&teacher.id)).await?;

    let (status, body) = server
        .post(
            "/api/timetable",
            &admin,
            json!({
                "classId": class.id,
                "teacherId": teacher.id,
                "subject": "Mathematics",
                "dayOfWeek": 1,
                "startTime": "09:00",
                "endTime": "09:45",
                "academicYear": "2024-2025"
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = server
        .patch(&format!("/api/timetable/{}", id), &admin, json!({ "startTime": "10:00" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(body["fieldErrors"]["endTime"], "must be later than startTime");
    Ok(())
}
