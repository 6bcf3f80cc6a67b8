//! Shared application state.

use policysage_compare::Comparator;
use policysage_core::ServiceConfig;
use policysage_ingest::Normalizer;

/// Read-only state shared by all route handlers.
pub struct AppState {
    pub config: ServiceConfig,
    pub normalizer: Normalizer,
    pub comparator: Comparator,
    /// Whether an API key for the generative service is present.
    pub llm_configured: bool,
}

impl AppState {
    pub fn new(
        config: ServiceConfig,
        normalizer: Normalizer,
        comparator: Comparator,
        llm_configured: bool,
    ) -> Self {
        Self {
            config,
            normalizer,
            comparator,
            llm_configured,
        }
    }

    pub fn model(&self) -> &str {
        self.comparator.model()
    }
}
