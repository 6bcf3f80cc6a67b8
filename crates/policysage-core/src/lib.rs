//! PolicySage Core: shared types, errors and service configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use types::{
    ComparisonPrompt, ComparisonResult, NormalizedFragment, UserPreferences, COMMENTARY_FIELD,
    TABLE_FIELD,
};
