//! MongoDB connector, health probe and write-error helpers.

mod config;
mod connector;
mod errors;
mod health;
mod values;

pub use config::MongoConfig;
pub use connector::{connect, connect_with_retry};
pub use errors::{DUPLICATE_KEY_CODE, is_duplicate_key};
pub use health::{HealthStatus, check_health, check_health_detailed};
pub use values::{timestamp_bson, uuid_bson, uuids_bson};

pub use mongodb::{Client, Collection, Database};
