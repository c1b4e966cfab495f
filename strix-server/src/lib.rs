//! HTTP surface of the Strix reconnaissance platform.
//!
//! The server accepts scan jobs over an axum API, launches each job's
//! pipeline as a detached tokio task and exposes the persisted job record as
//! the progress-polling channel for clients.

pub mod auth;
pub mod db;
pub mod errors;
pub mod infra;
pub mod routes;
pub mod scan_handlers;
