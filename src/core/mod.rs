pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigError, SupplyConfig};
pub use types::{Quantity, ResourceAmount, ResourceEntry, ResourceId};
