use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::database::ports::jobs::ScanJobStore;
use crate::error::{Error, Result};
use strix_model::ScanJob;

/// PostgreSQL-backed implementation of the `ScanJobStore` port.
#[derive(Clone, Debug)]
pub struct PostgresScanJobStore {
    pool: PgPool,
}

impl PostgresScanJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn row_to_job(row: &PgRow) -> sqlx::Result<ScanJob> {
    Ok(ScanJob {
        id: row.try_get("id")?,
        domain: row.try_get("domain")?,
        owner_id: row.try_get("owner_id")?,
        status: row.try_get("status")?,
        current_step: row.try_get("current_step")?,
        progress: row.try_get("progress")?,
        subfinder_results: row.try_get("subfinder_results")?,
        httpx_results: row.try_get("httpx_results")?,
        nuclei_results: row.try_get("nuclei_results")?,
        katana_results: row.try_get("katana_results")?,
        xss_results: row.try_get("xss_results")?,
        dalfox_results: row.try_get("dalfox_results")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

const JOB_COLUMNS: &str = "id, domain, owner_id, status, current_step, progress, \
     subfinder_results, httpx_results, nuclei_results, katana_results, \
     xss_results, dalfox_results, created_at, updated_at";

#[async_trait]
impl ScanJobStore for PostgresScanJobStore {
    async fn create_job(&self, domain: &str, owner_id: Uuid) -> Result<ScanJob> {
        let job = ScanJob::pending(Uuid::now_v7(), domain, owner_id, Utc::now());

        sqlx::query(
            r#"
            INSERT INTO scan_jobs (
                id, domain, owner_id, status, current_step, progress,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(job.id)
        .bind(&job.domain)
        .bind(job.owner_id)
        .bind(job.status)
        .bind(&job.current_step)
        .bind(job.progress)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| Error::Internal(format!("Failed to create scan job: {}", e)))?;

        info!("Created scan job {} for domain {}", job.id, job.domain);
        Ok(job)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<ScanJob>> {
        let row = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM scan_jobs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| Error::Internal(format!("Failed to get scan job: {}", e)))?;

        row.as_ref()
            .map(row_to_job)
            .transpose()
            .map_err(|e| Error::Internal(format!("Failed to decode scan job row: {}", e)))
    }

    async fn get_job_for_owner(&self, id: Uuid, owner_id: Uuid) -> Result<Option<ScanJob>> {
        let row = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM scan_jobs WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| Error::Internal(format!("Failed to get scan job: {}", e)))?;

        row.as_ref()
            .map(row_to_job)
            .transpose()
            .map_err(|e| Error::Internal(format!("Failed to decode scan job row: {}", e)))
    }

    async fn list_jobs(&self, owner_id: Uuid, offset: i64, limit: i64) -> Result<Vec<ScanJob>> {
        let rows = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM scan_jobs \
             WHERE owner_id = $1 ORDER BY created_at DESC OFFSET $2 LIMIT $3"
        ))
        .bind(owner_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(|e| Error::Internal(format!("Failed to list scan jobs: {}", e)))?;

        rows.iter()
            .map(row_to_job)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| Error::Internal(format!("Failed to decode scan job row: {}", e)))
    }

    async fn save_job(&self, job: &ScanJob) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE scan_jobs
            SET status = $2, current_step = $3, progress = $4,
                subfinder_results = $5, httpx_results = $6, nuclei_results = $7,
                katana_results = $8, xss_results = $9, dalfox_results = $10,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(job.id)
        .bind(job.status)
        .bind(&job.current_step)
        .bind(job.progress)
        .bind(&job.subfinder_results)
        .bind(&job.httpx_results)
        .bind(&job.nuclei_results)
        .bind(&job.katana_results)
        .bind(&job.xss_results)
        .bind(&job.dalfox_results)
        .execute(self.pool())
        .await
        .map_err(|e| Error::Internal(format!("Failed to save scan job: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Scan job not found".to_string()));
        }

        Ok(())
    }
}
