//! The scan workflow core.
//!
//! A scan is a fixed six-stage pipeline over external tools, chained through
//! files on disk: subdomain enumeration, live-host filtering, vulnerability
//! scanning, crawling, XSS parameter discovery and XSS testing. The
//! [`ScanWorkflow`] orchestrator drives the stages and persists job progress
//! after every transition; the [`StageRunner`] owns the individual tool
//! invocations and never lets a stage failure escape as anything but
//! diagnostic text.

pub mod stages;
pub mod workflow;

pub use stages::StageRunner;
pub use workflow::ScanWorkflow;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default upper bound on stored stage output, in characters.
///
/// Stage outputs can be arbitrarily large (a crawl of a big site easily
/// produces megabytes); results persisted on the job record are truncated to
/// this many characters to bound row and payload size.
pub const DEFAULT_MAX_RESULT_CHARS: usize = 10_000;

/// Tool locations and scan tuning knobs.
///
/// Tool paths default to the bare binary names, resolved on `PATH`. A
/// missing binary is not an error: the affected stage records a diagnostic
/// pointing at the tool's install instructions and the pipeline moves on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ScannerConfig {
    /// Directory receiving per-stage output files (`scan_<job>_<suffix>`).
    pub results_dir: PathBuf,
    pub subfinder_path: String,
    pub httpx_path: String,
    pub nuclei_path: String,
    pub katana_path: String,
    pub uro_path: String,
    pub dalfox_path: String,
    /// Candidate template directories probed in order; `~` expands to the
    /// home directory.
    pub nuclei_template_dirs: Vec<PathBuf>,
    pub max_result_chars: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("./scan_results"),
            subfinder_path: "subfinder".to_string(),
            httpx_path: "httpx".to_string(),
            nuclei_path: "nuclei".to_string(),
            katana_path: "katana".to_string(),
            uro_path: "uro".to_string(),
            dalfox_path: "dalfox".to_string(),
            nuclei_template_dirs: vec![
                PathBuf::from("~/nuclei-templates"),
                PathBuf::from("/opt/nuclei-templates"),
                PathBuf::from("./nuclei-templates"),
            ],
            max_result_chars: DEFAULT_MAX_RESULT_CHARS,
        }
    }
}
