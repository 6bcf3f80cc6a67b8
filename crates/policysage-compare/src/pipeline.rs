//! Comparison pipeline: Composer → Invoker → Decoder → Validator.

use std::sync::Arc;

use policysage_core::{ComparisonResult, Error, NormalizedFragment, Result, UserPreferences};
use policysage_llm::GenerativeService;
use tracing::{debug, info};

use crate::decode::decode_response;
use crate::prompt::{compose_with_branch, Branch, TargetInsurer};
use crate::validate::validate_result;

/// Fewest fragments a comparison can run on.
pub const MIN_FRAGMENTS: usize = 2;

/// Runs one comparison per call. Holds only read-only configuration and
/// the shared service handle.
#[derive(Clone)]
pub struct Comparator {
    service: Arc<dyn GenerativeService>,
    target: TargetInsurer,
}

impl Comparator {
    pub fn new(service: Arc<dyn GenerativeService>) -> Self {
        Self::with_target(service, TargetInsurer::default())
    }

    pub fn with_target(service: Arc<dyn GenerativeService>, target: TargetInsurer) -> Self {
        Self { service, target }
    }

    pub fn model(&self) -> &str {
        self.service.model()
    }

    /// Compare normalized fragments. Fails with `Error::Input` before any
    /// prompt is built when fewer than two fragments are available.
    pub async fn compare(
        &self,
        fragments: &[NormalizedFragment],
        preferences: &UserPreferences,
    ) -> Result<ComparisonResult> {
        if fragments.len() < MIN_FRAGMENTS {
            return Err(Error::Input(
                "At least 2 valid PDF files are required.".into(),
            ));
        }

        let branch = Branch::select(&self.target, fragments);
        match branch {
            Branch::Targeted { index } => info!(
                "{} detected in policy {}; using targeted instructions",
                self.target.name,
                index + 1
            ),
            Branch::Balanced => info!("No target insurer detected; using balanced instructions"),
        }

        let prompt = compose_with_branch(branch, &self.target, fragments, preferences);
        debug!("Composed prompt for {} policies", fragments.len());

        let raw = self.service.generate(&prompt).await?;
        let value = decode_response(&raw)?;
        validate_result(value)
    }
}
