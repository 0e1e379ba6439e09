use std::sync::Arc;

use serde::Deserialize;

use crate::domain::geocode::Coordinate;
use crate::infrastructure::llm_clients::LlmClient;
use crate::infrastructure::response::clean_llm_response;

#[derive(Deserialize)]
struct RefinedCoordinate {
    lat: f64,
    lng: f64,
}

/// Optional post-step that asks the text-generation service for a more
/// accurate coordinate, given both address forms and the geocoded result.
pub struct CoordinateRefiner {
    llm_client: Arc<dyn LlmClient + Send + Sync>,
}

impl CoordinateRefiner {
    pub fn new(llm_client: Arc<dyn LlmClient + Send + Sync>) -> Self {
        Self { llm_client }
    }

    /// Returns the refined coordinate, or `current` unchanged when the
    /// service fails or replies with anything but the requested JSON.
    pub async fn refine(
        &self,
        original_address: &str,
        effective_address: &str,
        current: Coordinate,
    ) -> Coordinate {
        let prompt = format!(
            "Based on the following information, reply with a more accurate \
             latitude and longitude for this place.\n\
             Original address: {}\n\
             Corrected address: {}\n\
             Current result: latitude {}, longitude {}\n\
             Reply exactly in the form {{\"lat\": <number>, \"lng\": <number>}} \
             with no other text.",
            original_address, effective_address, current.latitude, current.longitude
        );

        let completion = match self.llm_client.generate(&prompt).await {
            Ok(completion) => completion,
            Err(err) => {
                tracing::warn!(error = %err, "coordinate refinement failed, keeping geocoded coordinate");
                return current;
            }
        };

        match serde_json::from_str::<RefinedCoordinate>(&clean_llm_response(&completion)) {
            Ok(refined) => Coordinate {
                latitude: refined.lat,
                longitude: refined.lng,
            },
            Err(err) => {
                tracing::warn!(error = %err, "unusable refinement reply, keeping geocoded coordinate");
                current
            }
        }
    }
}
