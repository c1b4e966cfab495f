//! Repository abstractions consumed by the scan workflow and the server.

pub mod jobs;
pub mod users;
