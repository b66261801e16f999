//! Fakes and request helpers for router-level tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use recruit_forms::{FormSchema, JobStatus};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::auth::{Actor, Role, TokenVerifier};
use crate::config::Config;
use crate::errors::AppError;
use crate::idempotency::{Reservation, SubmissionGuard};
use crate::models::application::{ApplicationRow, NewApplication};
use crate::models::job::{JobRow, NewJob};
use crate::notify::{Email, Notifier, NotifyError};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{ResumeStorage, ResumeUpload};
use crate::store::memory::MemoryStore;
use crate::store::{ApplicationStore, JobStore};

pub const SIGNING_KEY: &str = "test-signing-key";
pub const BOUNDARY: &str = "recruit-test-boundary";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/recruit_test".into(),
        redis_url: "redis://localhost".into(),
        s3_bucket: "resumes".into(),
        s3_endpoint: "http://localhost:9000".into(),
        s3_public_url: "http://localhost:9000/resumes".into(),
        aws_access_key_id: "test".into(),
        aws_secret_access_key: "test".into(),
        auth_signing_key: SIGNING_KEY.into(),
        mail_api_url: None,
        mail_api_key: None,
        mail_from: "Acme <no-reply@acme.test>".into(),
        company_name: "Acme".into(),
        server_url: "http://api.acme.test".into(),
        client_url: "http://jobs.acme.test".into(),
        submission_key_ttl_secs: 60,
        port: 0,
        rust_log: "debug".into(),
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Email>>,
    pub fail: bool,
    /// Records the email, then never finishes the send.
    pub stall: bool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(email.clone());
        if self.fail {
            return Err(NotifyError::Exhausted { retries: 3 });
        }
        if self.stall {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryResumes {
    pub stored: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl ResumeStorage for MemoryResumes {
    async fn store(&self, upload: &ResumeUpload) -> Result<String, AppError> {
        if self.fail {
            return Err(AppError::Storage("bucket unavailable".into()));
        }
        let url = format!("http://files.test/{}", upload.file_name);
        self.stored.lock().unwrap().push(url.clone());
        Ok(url)
    }
}

#[derive(Default)]
pub struct MemoryGuard {
    keys: Mutex<HashMap<String, Reservation>>,
}

impl MemoryGuard {
    pub fn hold(&self, key: &str) {
        self.keys
            .lock()
            .unwrap()
            .insert(key.to_string(), Reservation::Pending);
    }
}

#[async_trait]
impl SubmissionGuard for MemoryGuard {
    async fn reserve(&self, key: &str) -> Result<Reservation, AppError> {
        let mut keys = self.keys.lock().unwrap();
        match keys.get(key) {
            Some(existing) => Ok(*existing),
            None => {
                keys.insert(key.to_string(), Reservation::Pending);
                Ok(Reservation::Fresh)
            }
        }
    }

    async fn complete(&self, key: &str, application_id: Uuid) -> Result<(), AppError> {
        self.keys
            .lock()
            .unwrap()
            .insert(key.to_string(), Reservation::Completed(application_id));
        Ok(())
    }

    async fn release(&self, key: &str) -> Result<(), AppError> {
        self.keys.lock().unwrap().remove(key);
        Ok(())
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub text: String,
    pub json: Value,
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub resumes: Arc<MemoryResumes>,
    pub guard: Arc<MemoryGuard>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(RecordingNotifier::default(), MemoryResumes::default())
    }

    pub fn with_failing_notifier() -> Self {
        Self::build(
            RecordingNotifier {
                fail: true,
                ..Default::default()
            },
            MemoryResumes::default(),
        )
    }

    pub fn with_stalled_notifier() -> Self {
        Self::build(
            RecordingNotifier {
                stall: true,
                ..Default::default()
            },
            MemoryResumes::default(),
        )
    }

    pub fn with_failing_storage() -> Self {
        Self::build(
            RecordingNotifier::default(),
            MemoryResumes {
                fail: true,
                ..Default::default()
            },
        )
    }

    fn build(notifier: RecordingNotifier, resumes: MemoryResumes) -> Self {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(notifier);
        let resumes = Arc::new(resumes);
        let guard = Arc::new(MemoryGuard::default());
        let state = AppState {
            jobs: store.clone(),
            applications: store.clone(),
            interviews: store.clone(),
            offers: store.clone(),
            resumes: resumes.clone(),
            notifier: notifier.clone(),
            submissions: guard.clone(),
            tokens: TokenVerifier::new(SIGNING_KEY),
            config: test_config(),
        };
        Self {
            state,
            store,
            notifier,
            resumes,
            guard,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn token(&self, role: Role) -> String {
        let actor = Actor {
            user_id: Uuid::new_v4(),
            role,
        };
        self.state
            .tokens
            .issue(actor, chrono::Duration::hours(1))
            .unwrap()
    }

    pub async fn seed_job(&self, status: JobStatus, schema: FormSchema) -> JobRow {
        let job = self
            .store
            .create_job(NewJob {
                title: "Backend Engineer".into(),
                department: "Platform".into(),
                description: "Build the API".into(),
                form_schema: schema,
                created_by: Uuid::new_v4(),
            })
            .await
            .unwrap();
        if status == JobStatus::Active {
            return job;
        }
        self.store
            .set_job_status(job.id, status)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn seed_application(&self, job: &JobRow, name: &str) -> ApplicationRow {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        let application = self
            .store
            .create_application(NewApplication {
                job_id: job.id,
                candidate_name: name.into(),
                candidate_email: email,
                resume_url: None,
                answers: Default::default(),
                score: 0,
                idempotency_key: None,
            })
            .await
            .unwrap();
        self.store
            .find_application(application.id)
            .await
            .unwrap()
            .unwrap()
    }

    /// Serves the router on an ephemeral local port and returns its base URL.
    pub async fn serve(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = self.router();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    /// Emails handed to the notifier so far. Sends run on spawned tasks, so
    /// those get a chance to run first.
    pub async fn sent_emails(&self) -> Vec<Email> {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        self.notifier.sent()
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let json = serde_json::from_str(&text).unwrap_or(Value::Null);
        TestResponse { status, text, json }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> TestResponse {
        self.send(request(method, uri, token, Some(body))).await
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        bytes: Vec<u8>,
    },
}

pub fn multipart_request(uri: &str, parts: Vec<Part<'_>>) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
