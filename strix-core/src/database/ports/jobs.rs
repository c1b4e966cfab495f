//! Persistence contract for scan job storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::Result;
use strix_model::ScanJob;

/// Durable store for [`ScanJob`] records.
///
/// The workflow calls [`save_job`](ScanJobStore::save_job) after every field
/// mutation so that polling clients observe progress in near-real-time; each
/// save is an independent durable write, there is no batching. Only the
/// workflow task owning a job ever mutates its record, so implementations do
/// not need cross-job locking.
#[async_trait]
pub trait ScanJobStore: Send + Sync {
    /// Insert a Pending record for `domain` and return it with its
    /// store-assigned id.
    async fn create_job(&self, domain: &str, owner_id: Uuid) -> Result<ScanJob>;

    async fn get_job(&self, id: Uuid) -> Result<Option<ScanJob>>;

    /// Ownership-scoped read used by the API layer.
    async fn get_job_for_owner(&self, id: Uuid, owner_id: Uuid) -> Result<Option<ScanJob>>;

    async fn list_jobs(&self, owner_id: Uuid, offset: i64, limit: i64) -> Result<Vec<ScanJob>>;

    /// Persist the full current state of `job`, refreshing `updated_at`.
    async fn save_job(&self, job: &ScanJob) -> Result<()>;
}
