use std::{fmt, sync::Arc};

use strix_core::database::{ScanJobStore, UserStore};
use strix_core::scan::ScanWorkflow;

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<dyn UserStore>,
    pub jobs: Arc<dyn ScanJobStore>,
    pub workflow: Arc<ScanWorkflow>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        users: Arc<dyn UserStore>,
        jobs: Arc<dyn ScanJobStore>,
        workflow: Arc<ScanWorkflow>,
    ) -> Self {
        Self {
            config,
            users,
            jobs,
            workflow,
        }
    }
}
