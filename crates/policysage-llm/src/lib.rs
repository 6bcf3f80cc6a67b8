//! Generative text service client.
//!
//! Sends the composed comparison prompt to Google Gemini and returns the
//! raw reply. Decoding happens in `policysage-compare`.

pub mod config;
pub mod providers;
pub mod types;

pub use config::GeminiConfig;
pub use providers::{GeminiClient, GenerativeService};
