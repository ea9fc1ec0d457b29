#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

use school_api::app::{self, AppState};
use school_api::auth::{generate_jwt, AuthSettings};
use school_api::database::models::{new_id, NewClass, NewStudent, NewTeacher, NewUser, SchoolClass, Student, Teacher, User};
use school_api::database::{MemoryStorage, Storage};
use school_api::types::{Role, StudentStatus};

pub const TEST_SECRET: &str = "school-api-test-secret";

/// An in-process server over a fresh in-memory store
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub storage: Arc<MemoryStorage>,
    auth: AuthSettings,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let storage = Arc::new(MemoryStorage::new());
        let auth = AuthSettings::new(TEST_SECRET, 1);
        let state = AppState::new(storage.clone(), auth.clone());
        let router = app::router(state, 64 * 1024);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind {}", port))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            base_url,
            client: reqwest::Client::new(),
            storage,
            auth,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn token_for(&self, user_id: &str) -> String {
        generate_jwt(user_id, &self.auth).expect("token")
    }

    /// Store a user with `role` and return it with a bearer token
    pub async fn login(&self, role: Role) -> Result<(User, String)> {
        let user = self
            .storage
            .create_user(NewUser {
                email: Some(format!("{}@school.test", new_id())),
                first_name: Some("Test".into()),
                last_name: Some(role.to_string()),
                profile_image_url: None,
                role,
            })
            .await?;
        let token = self.token_for(&user.id);
        Ok((user, token))
    }

    /// A teacher user with a teacher profile
    pub async fn login_teacher(&self) -> Result<(Teacher, String)> {
        let (user, token) = self.login(Role::Teacher).await?;
        let teacher = self
            .storage
            .create_teacher(NewTeacher {
                user_id: user.id,
                employee_id: format!("EMP-{}", new_id()),
                subject: "Mathematics".into(),
                years_experience: 5,
                phone: None,
                qualifications: None,
            })
            .await?;
        Ok((teacher, token))
    }

    pub async fn seed_class(&self, teacher_id: Option<&str>) -> Result<SchoolClass> {
        Ok(self
            .storage
            .create_class(NewClass {
                name: "Grade 5A".into(),
                grade: 5,
                section: "A".into(),
                teacher_id: teacher_id.map(String::from),
                academic_year: "2024-2025".into(),
                max_students: 30,
            })
            .await?)
    }

    pub async fn seed_student(&self, class_id: Option<&str>, parent_id: Option<&str>) -> Result<Student> {
        let date = chrono::NaiveDate::from_ymd_opt(2014, 4, 2).context("date")?;
        Ok(self
            .storage
            .create_student(NewStudent {
                student_id: format!("STU-{}", new_id()),
                first_name: "Emma".into(),
                last_name: "Thompson".into(),
                date_of_birth: date,
                class_id: class_id.map(String::from),
                parent_id: parent_id.map(String::from),
                admission_date: date,
                status: StudentStatus::Active,
                roll_number: None,
            })
            .await?)
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        send(self.client.get(self.url(path)).bearer_auth(token)).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        send(self.client.post(self.url(path)).bearer_auth(token).json(&body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        send(self.client.put(self.url(path)).bearer_auth(token).json(&body)).await
    }

    pub async fn patch(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        send(self.client.patch(self.url(path)).bearer_auth(token).json(&body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        send(self.client.delete(self.url(path)).bearer_auth(token)).await
    }
}

/// Send and decode; an empty body decodes as `null`
async fn send(request: reqwest::RequestBuilder) -> Result<(StatusCode, Value)> {
    let res = request.send().await?;
    let status = res.status();
    let text = res.text().await?;
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).with_context(|| format!("non-JSON body ({}): {}", status, text))?
    };
    Ok((status, body))
}
