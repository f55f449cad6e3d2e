//! Database schema and queries
//!
//! Every record-table statement binds the owning user, so ownership is part of
//! the query rather than a post-filter.

pub mod breeds;
pub mod init;
pub mod prediction_logs;
pub mod profiles;
pub mod records;

pub use init::{init_database, init_memory_database, init_schema};
