//! In-memory stores and request helpers for API tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use strix_core::database::{ScanJobStore, UserStore};
use strix_core::scan::{ScanWorkflow, ScannerConfig};
use strix_core::user::User;
use strix_core::{Error, Result};
use strix_model::ScanJob;
use strix_server::infra::{
    app_state::AppState,
    config::{AuthConfig, Config, CorsConfig, DatabaseConfig, ServerConfig},
};
use strix_server::routes;

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
    credentials: Mutex<HashMap<Uuid, String>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, user: &User, password_hash: &str) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(Error::Conflict("Email already registered".to_string()));
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(Error::Conflict("Username already exists".to_string()));
        }
        users.insert(user.id, user.clone());
        self.credentials
            .lock()
            .unwrap()
            .insert(user.id, password_hash.to_string());
        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>> {
        Ok(self.credentials.lock().unwrap().get(&user_id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<Uuid, ScanJob>>,
}

#[async_trait]
impl ScanJobStore for MemoryJobStore {
    async fn create_job(&self, domain: &str, owner_id: Uuid) -> Result<ScanJob> {
        let job = ScanJob::pending(Uuid::now_v7(), domain, owner_id, Utc::now());
        self.jobs.lock().unwrap().insert(job.id, job.clone());
        Ok(job)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<ScanJob>> {
        Ok(self.jobs.lock().unwrap().get(&id).cloned())
    }

    async fn get_job_for_owner(&self, id: Uuid, owner_id: Uuid) -> Result<Option<ScanJob>> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .get(&id)
            .filter(|job| job.owner_id == owner_id)
            .cloned())
    }

    async fn list_jobs(&self, owner_id: Uuid, offset: i64, limit: i64) -> Result<Vec<ScanJob>> {
        let mut jobs: Vec<ScanJob> = self
            .jobs
            .lock()
            .unwrap()
            .values()
            .filter(|job| job.owner_id == owner_id)
            .cloned()
            .collect();
        jobs.sort_by_key(|job| job.created_at);
        Ok(jobs
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn save_job(&self, job: &ScanJob) -> Result<()> {
        let mut updated = job.clone();
        updated.updated_at = Utc::now();
        self.jobs.lock().unwrap().insert(job.id, updated);
        Ok(())
    }
}

fn test_config(results_dir: &Path) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig { url: None },
        auth: AuthConfig {
            jwt_secret: "integration-test-secret".to_string(),
            token_ttl_secs: 1800,
        },
        cors: CorsConfig::default(),
        scanner: ScannerConfig {
            results_dir: results_dir.to_path_buf(),
            subfinder_path: "/nonexistent/bin/subfinder".to_string(),
            httpx_path: "/nonexistent/bin/httpx".to_string(),
            nuclei_path: "/nonexistent/bin/nuclei".to_string(),
            katana_path: "/nonexistent/bin/katana".to_string(),
            uro_path: "/nonexistent/bin/uro".to_string(),
            dalfox_path: "/nonexistent/bin/dalfox".to_string(),
            nuclei_template_dirs: vec![PathBuf::from("/nonexistent/nuclei-templates")],
            ..ScannerConfig::default()
        },
    }
}

#[allow(unused)]
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _tempdir: TempDir,
}

pub fn build_test_app() -> TestApp {
    let tempdir = TempDir::new().expect("failed to create temporary directory");
    let config = Arc::new(test_config(tempdir.path()));

    let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::default());
    let jobs: Arc<dyn ScanJobStore> = Arc::new(MemoryJobStore::default());
    let workflow = Arc::new(ScanWorkflow::new(jobs.clone(), config.scanner.clone()));

    let state = AppState::new(config, users, jobs, workflow);
    let router = routes::create_api_router(state.clone());

    TestApp {
        router,
        state,
        _tempdir: tempdir,
    }
}

pub async fn post_json(
    router: &Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = request.body(Body::from(body.to_string())).unwrap();

    send(router, request).await
}

pub async fn get_json(
    router: &Router,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = request.body(Body::empty()).unwrap();

    send(router, request).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body was not JSON")
    };
    (status, value)
}

/// Register an account through the API and return its bearer token.
pub async fn register_user(router: &Router, username: &str, email: &str) -> String {
    let (status, body) = post_json(
        router,
        "/api/v1/auth/register",
        None,
        serde_json::json!({
            "username": username,
            "email": email,
            "password": "hunter2",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    body["data"]["access_token"]
        .as_str()
        .expect("missing access token")
        .to_string()
}
