//! The pipeline orchestrator: drives a job through the six stages.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::Result;
use crate::database::ports::jobs::ScanJobStore;
use strix_model::{ScanJob, ScanStatus};

use super::{ScannerConfig, StageRunner};

/// Sequences the six scan stages for one job at a time.
///
/// Each running job is a single sequential pipeline; concurrency comes from
/// spawning one `run` task per job. Progress moves through fixed checkpoints
/// (two per stage: one when the stage begins, one when its result lands) and
/// is persisted after every mutation so polling clients see it immediately.
///
/// Stage failures are not pipeline failures: a stage that cannot run records
/// a diagnostic string as its result and the pipeline continues. Only errors
/// from the orchestration scaffolding itself (the job store) transition the
/// job to `Failed`, with the message surfaced in `current_step`.
///
/// There is no timeout on tool invocations and no way to cancel a running
/// job; a stuck tool holds its pipeline open indefinitely. A per-stage
/// timeout would belong in [`ScannerConfig`] as an explicit opt-in.
pub struct ScanWorkflow {
    store: Arc<dyn ScanJobStore>,
    runner: StageRunner,
    results_dir: PathBuf,
}

impl std::fmt::Debug for ScanWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanWorkflow")
            .field("results_dir", &self.results_dir)
            .finish_non_exhaustive()
    }
}

impl ScanWorkflow {
    pub fn new(store: Arc<dyn ScanJobStore>, config: ScannerConfig) -> Self {
        let results_dir = config.results_dir.clone();
        Self {
            store,
            runner: StageRunner::new(config),
            results_dir,
        }
    }

    /// Run the full pipeline for `job_id`.
    ///
    /// A job id the store does not know is a silent no-op: the caller
    /// already holds the authoritative id and there is nothing to update.
    pub async fn run(&self, job_id: Uuid, domain: &str) {
        let mut job = match self.store.get_job(job_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                warn!("scan job {job_id} not found; nothing to run");
                return;
            }
            Err(err) => {
                error!("failed to load scan job {job_id}: {err}");
                return;
            }
        };

        if let Err(err) = self.execute(&mut job, domain).await {
            job.status = ScanStatus::Failed;
            job.current_step = format!("Error: {err}");
            if let Err(save_err) = self.store.save_job(&job).await {
                error!("failed to record failure for scan job {job_id}: {save_err}");
            }
        }
    }

    async fn execute(&self, job: &mut ScanJob, domain: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.results_dir).await?;

        job.status = ScanStatus::Running;
        job.current_step = "Starting scan...".to_string();
        job.progress = 0;
        self.store.save_job(job).await?;

        // Stage 1: subdomain enumeration
        self.advance(job, "Running Subfinder...", 10).await?;
        let subs_file = self.stage_file(job.id, "subs.txt");
        job.subfinder_results = Some(self.runner.run_subfinder(domain, &subs_file).await);
        job.progress = 20;
        self.store.save_job(job).await?;

        // Stage 2: live host filtering
        self.advance(job, "Checking live subdomains with httpx...", 30)
            .await?;
        let httpx_file = self.stage_file(job.id, "httpx.txt");
        job.httpx_results = Some(self.runner.run_httpx(&subs_file, &httpx_file).await);
        job.progress = 40;
        self.store.save_job(job).await?;

        // Stage 3: vulnerability scan over the live hosts
        self.advance(job, "Running Nuclei vulnerability scan...", 50)
            .await?;
        let nuclei_file = self.stage_file(job.id, "nuclei.txt");
        job.nuclei_results = Some(self.runner.run_nuclei(&httpx_file, &nuclei_file).await);
        job.progress = 60;
        self.store.save_job(job).await?;

        // Stage 4: crawl the live hosts for URLs
        self.advance(job, "Crawling with Katana...", 70).await?;
        let katana_file = self.stage_file(job.id, "katana.txt");
        job.katana_results = Some(self.runner.run_katana(&httpx_file, &katana_file).await);
        job.progress = 80;
        self.store.save_job(job).await?;

        // Stage 5: XSS candidate discovery over the crawl output
        self.advance(job, "Discovering XSS parameters...", 85).await?;
        let xss_file = self.stage_file(job.id, "xss.txt");
        job.xss_results = Some(self.runner.run_xss_discovery(&katana_file, &xss_file).await);
        job.progress = 90;
        self.store.save_job(job).await?;

        // Stage 6: active XSS testing
        self.advance(job, "Testing XSS vulnerabilities with Dalfox...", 95)
            .await?;
        let dalfox_file = self.stage_file(job.id, "dalfox.json");
        job.dalfox_results = Some(self.runner.run_dalfox(&xss_file, &dalfox_file).await);
        job.progress = 100;
        job.current_step = "Scan completed!".to_string();
        job.status = ScanStatus::Completed;
        self.store.save_job(job).await?;

        info!("scan job {} for {} completed", job.id, domain);
        Ok(())
    }

    async fn advance(&self, job: &mut ScanJob, step: &str, progress: i32) -> Result<()> {
        job.current_step = step.to_string();
        job.progress = progress;
        self.store.save_job(job).await
    }

    /// Stage files are keyed by job id, so concurrent jobs never collide.
    fn stage_file(&self, job_id: Uuid, suffix: &str) -> PathBuf {
        self.results_dir.join(format!("scan_{job_id}_{suffix}"))
    }
}
