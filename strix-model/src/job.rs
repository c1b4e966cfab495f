//! Scan job records.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lifecycle state of a scan job.
///
/// `Pending -> Running -> {Completed, Failed}`; the two right-hand states
/// are terminal and a record in one of them is never mutated again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum ScanStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ScanStatus {
    /// Stable lowercase name, matching the persisted representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Running => "running",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }

    /// Whether the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Failed)
    }
}

/// One reconnaissance scan of a target domain.
///
/// The six result fields are populated left-to-right as the pipeline
/// advances; `progress` is a 0-100 percentage that never decreases within
/// a single run. `current_step` is a human-readable label for polling
/// clients and doubles as the error channel when the job fails.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanJob {
    pub id: Uuid,
    pub domain: String,
    pub owner_id: Uuid,
    pub status: ScanStatus,
    pub current_step: String,
    pub progress: i32,

    pub subfinder_results: Option<String>,
    pub httpx_results: Option<String>,
    pub nuclei_results: Option<String>,
    pub katana_results: Option<String>,
    pub xss_results: Option<String>,
    pub dalfox_results: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScanJob {
    /// A freshly created job, before the pipeline has touched it.
    pub fn pending(id: Uuid, domain: impl Into<String>, owner_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            domain: domain.into(),
            owner_id,
            status: ScanStatus::Pending,
            current_step: String::new(),
            progress: 0,
            subfinder_results: None,
            httpx_results: None,
            nuclei_results: None,
            katana_results: None,
            xss_results: None,
            dalfox_results: None,
            created_at: now,
            updated_at: now,
        }
    }
}
