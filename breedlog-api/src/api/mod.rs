//! HTTP API handlers for breedlog-api

pub mod breeds;
pub mod classify;
pub mod health;
pub mod images;
pub mod profile;
pub mod records;
pub mod storage;

pub use breeds::list_breeds;
pub use classify::classify;
pub use health::health_routes;
pub use images::upload_image;
pub use profile::{get_profile, update_profile};
pub use records::{get_record, list_records, records_summary, update_record};
pub use storage::get_object;
