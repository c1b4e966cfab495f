//! Test doubles for the scan job store.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use strix_core::database::ScanJobStore;
use strix_core::{Error, Result};
use strix_model::ScanJob;

/// In-memory `ScanJobStore` that records a snapshot of every save, so tests
/// can assert on the exact sequence of persisted states.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<Uuid, ScanJob>>,
    saves: Mutex<Vec<ScanJob>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved_snapshots(&self) -> Vec<ScanJob> {
        self.saves.lock().unwrap().clone()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }
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
        self.jobs.lock().unwrap().insert(job.id, updated.clone());
        self.saves.lock().unwrap().push(updated);
        Ok(())
    }
}

/// Store that fails exactly one `save_job` call (1-indexed) and behaves
/// normally otherwise, for exercising pipeline-fatal persistence errors.
#[derive(Debug)]
pub struct FlakySaveStore {
    inner: MemoryJobStore,
    fail_on_save: usize,
    save_calls: AtomicUsize,
}

impl FlakySaveStore {
    pub fn failing_on(fail_on_save: usize) -> Self {
        Self {
            inner: MemoryJobStore::new(),
            fail_on_save,
            save_calls: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &MemoryJobStore {
        &self.inner
    }
}

#[async_trait]
impl ScanJobStore for FlakySaveStore {
    async fn create_job(&self, domain: &str, owner_id: Uuid) -> Result<ScanJob> {
        self.inner.create_job(domain, owner_id).await
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<ScanJob>> {
        self.inner.get_job(id).await
    }

    async fn get_job_for_owner(&self, id: Uuid, owner_id: Uuid) -> Result<Option<ScanJob>> {
        self.inner.get_job_for_owner(id, owner_id).await
    }

    async fn list_jobs(&self, owner_id: Uuid, offset: i64, limit: i64) -> Result<Vec<ScanJob>> {
        self.inner.list_jobs(owner_id, offset, limit).await
    }

    async fn save_job(&self, job: &ScanJob) -> Result<()> {
        let call = self.save_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on_save {
            return Err(Error::Internal("simulated storage outage".to_string()));
        }
        self.inner.save_job(job).await
    }
}
