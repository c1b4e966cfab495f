//! Persistence ports and their PostgreSQL implementations.

pub mod ports;
pub mod postgres;

pub use ports::jobs::ScanJobStore;
pub use ports::users::UserStore;
pub use postgres::jobs::PostgresScanJobStore;
pub use postgres::users::PostgresUserStore;
