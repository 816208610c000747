pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, RejectPolicy};
pub use error::FraudScoutError;
pub use types::*;
