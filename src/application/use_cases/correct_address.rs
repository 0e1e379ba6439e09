use std::sync::Arc;

use crate::infrastructure::llm_clients::LlmClient;
use crate::infrastructure::response::clean_llm_response;

const CORRECTION_INSTRUCTION: &str =
    "Correct the following address into a precise, standardized postal address. \
     Reply with the corrected address only:";

/// Optional pre-step that rewrites an address into a precise format via the
/// text-generation service.
pub struct AddressCorrector {
    llm_client: Arc<dyn LlmClient + Send + Sync>,
}

impl AddressCorrector {
    pub fn new(llm_client: Arc<dyn LlmClient + Send + Sync>) -> Self {
        Self { llm_client }
    }

    /// Returns the corrected address, or the original one untouched when
    /// the service fails or replies with nothing usable. Never errors: a
    /// broken enrichment step must not block geocoding.
    pub async fn correct(&self, address: &str) -> String {
        let prompt = format!("{} {}", CORRECTION_INSTRUCTION, address);
        match self.llm_client.generate(&prompt).await {
            Ok(completion) => {
                let corrected = clean_llm_response(&completion);
                if corrected.is_empty() {
                    address.to_string()
                } else {
                    corrected
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "address correction failed, keeping original address");
                address.to_string()
            }
        }
    }
}
