//! Behavior of the PostgreSQL repositories against a live database.
//!
//! Requires `DATABASE_URL`; run with `cargo test --features e2e`.

#![cfg(feature = "e2e")]

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use strix_core::ScanStatus;
use strix_core::database::{PostgresScanJobStore, PostgresUserStore, ScanJobStore, UserStore};
use strix_core::user::User;

fn test_user() -> User {
    let id = Uuid::now_v7();
    User {
        id,
        username: format!("analyst-{id}"),
        email: format!("analyst-{id}@example.com"),
        created_at: Utc::now(),
    }
}

#[sqlx::test(migrations = "../strix-server/migrations")]
async fn job_roundtrip_and_ownership_scoping(pool: PgPool) {
    let users = PostgresUserStore::new(pool.clone());
    let jobs = PostgresScanJobStore::new(pool);

    let owner = test_user();
    users.create_user(&owner, "hash").await.expect("create user");

    let job = jobs
        .create_job("example.com", owner.id)
        .await
        .expect("create job");
    assert_eq!(job.status, ScanStatus::Pending);

    let loaded = jobs.get_job(job.id).await.expect("get").expect("exists");
    assert_eq!(loaded.domain, "example.com");
    assert_eq!(loaded.progress, 0);

    // Another account cannot see the job through the scoped read.
    let stranger = Uuid::now_v7();
    assert!(
        jobs.get_job_for_owner(job.id, stranger)
            .await
            .expect("scoped get")
            .is_none()
    );
}

#[sqlx::test(migrations = "../strix-server/migrations")]
async fn save_persists_progress_and_results(pool: PgPool) {
    let users = PostgresUserStore::new(pool.clone());
    let jobs = PostgresScanJobStore::new(pool);

    let owner = test_user();
    users.create_user(&owner, "hash").await.expect("create user");

    let mut job = jobs
        .create_job("example.com", owner.id)
        .await
        .expect("create job");

    job.status = ScanStatus::Running;
    job.current_step = "Running Subfinder...".to_string();
    job.progress = 10;
    job.subfinder_results = Some("a.example.com".to_string());
    jobs.save_job(&job).await.expect("save");

    let loaded = jobs.get_job(job.id).await.expect("get").expect("exists");
    assert_eq!(loaded.status, ScanStatus::Running);
    assert_eq!(loaded.progress, 10);
    assert_eq!(loaded.subfinder_results.as_deref(), Some("a.example.com"));
    assert!(loaded.updated_at >= loaded.created_at);
}

#[sqlx::test(migrations = "../strix-server/migrations")]
async fn duplicate_email_is_a_conflict(pool: PgPool) {
    let users = PostgresUserStore::new(pool);

    let first = test_user();
    users.create_user(&first, "hash").await.expect("create user");

    let mut second = test_user();
    second.email = first.email.clone();
    let err = users.create_user(&second, "hash").await.unwrap_err();
    assert!(matches!(err, strix_core::Error::Conflict(_)), "{err}");
}
