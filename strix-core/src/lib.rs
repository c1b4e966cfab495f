//! Core library for the Strix reconnaissance platform.
//!
//! Strix runs multi-stage reconnaissance scans against a target domain by
//! chaining external scanning tools into a fixed pipeline. This crate holds
//! everything below the HTTP surface:
//!
//! - the scan workflow core: the [`scan::ScanWorkflow`] orchestrator and the
//!   per-tool [`scan::StageRunner`]
//! - persistence ports and their PostgreSQL implementations
//! - the user/auth domain types shared with the server

pub mod api_types;
pub mod database;
pub mod error;
pub mod scan;
pub mod user;

pub use error::{Error, Result};
pub use strix_model::{ScanJob, ScanStatus};
