//! Short supportive reframing text for a child's description.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::ai::{CompletionRequest, CompletionService};

/// Returned when the provider call fails.
pub const REAPPRAISAL_UNAVAILABLE: &str = "Could not generate reappraisal text.";
/// Returned when the provider answers without usable text.
pub const REAPPRAISAL_EMPTY: &str =
    "Failed to generate meaningful output. Please refine the prompt.";

const REAPPRAISAL_MAX_TOKENS: u32 = 80;

pub fn reappraisal_prompt(description: &str) -> String {
    format!(
        "Generate a short positive cognitive reappraisal advice for a child's description, \
         less than three sentences: {}",
        description
    )
}

/// Generates reappraisal text. Always yields something displayable.
#[derive(Clone)]
pub struct ReappraisalGenerator {
    completion: Arc<dyn CompletionService>,
}

impl ReappraisalGenerator {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    pub async fn reappraise(&self, description: &str) -> String {
        let request = CompletionRequest::new(reappraisal_prompt(description), REAPPRAISAL_MAX_TOKENS);

        match self.completion.complete(request).await {
            Ok(choices) => {
                let text = choices
                    .first()
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty());
                match text {
                    Some(text) => {
                        debug!(len = text.len(), "reappraise: generated");
                        text.to_string()
                    }
                    None => {
                        warn!("Reappraisal completion returned no usable text");
                        REAPPRAISAL_EMPTY.to_string()
                    }
                }
            }
            Err(e) => {
                warn!("Error generating reappraisal text: {}", e);
                REAPPRAISAL_UNAVAILABLE.to_string()
            }
        }
    }
}
