use std::sync::Arc;

use crate::domain::geocode::{select_candidate, Coordinate, GeocodeError};
use crate::infrastructure::geocoding::GeocodingGateway;

use super::correct_address::AddressCorrector;
use super::refine_coordinate::CoordinateRefiner;

/// Outcome of resolving a single address.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The address actually submitted for geocoding, after the optional
    /// correction step.
    pub effective_address: String,
    pub coordinate: Option<Coordinate>,
}

/// Maps one address string to a best-effort coordinate pair.
///
/// The correction and refinement steps are optional and fail soft; the
/// geocoding call itself is the only fallible part, and its errors are
/// the per-row recoverable kind.
pub struct AddressResolver {
    geocoder: Arc<dyn GeocodingGateway + Send + Sync>,
    corrector: Option<AddressCorrector>,
    refiner: Option<CoordinateRefiner>,
    country: String,
}

impl AddressResolver {
    pub fn new(geocoder: Arc<dyn GeocodingGateway + Send + Sync>, country: String) -> Self {
        Self {
            geocoder,
            corrector: None,
            refiner: None,
            country,
        }
    }

    pub fn with_corrector(mut self, corrector: AddressCorrector) -> Self {
        self.corrector = Some(corrector);
        self
    }

    pub fn with_refiner(mut self, refiner: CoordinateRefiner) -> Self {
        self.refiner = Some(refiner);
        self
    }

    /// One correction call at most, one geocoding call at most, no retries.
    pub async fn resolve(&self, address: &str) -> Result<Resolution, GeocodeError> {
        let effective_address = match &self.corrector {
            Some(corrector) => corrector.correct(address).await,
            None => address.to_string(),
        };

        let candidates = self
            .geocoder
            .geocode(&effective_address, &self.country)
            .await?;

        let coordinate = match select_candidate(&candidates) {
            Some(candidate) => {
                let coordinate = candidate.coordinate;
                Some(match &self.refiner {
                    Some(refiner) => {
                        refiner
                            .refine(address, &effective_address, coordinate)
                            .await
                    }
                    None => coordinate,
                })
            }
            None => None,
        };

        Ok(Resolution {
            effective_address,
            coordinate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{AppError, Result as DomainResult};
    use crate::domain::geocode::{GeocodeCandidate, LocationPrecision};
    use crate::infrastructure::llm_clients::LlmClient;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Gateway stub that records every submitted address.
    struct StubGateway {
        candidates: Vec<GeocodeCandidate>,
        seen: Mutex<Vec<String>>,
    }

    impl StubGateway {
        fn returning(candidates: Vec<GeocodeCandidate>) -> Arc<Self> {
            Arc::new(Self {
                candidates,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl GeocodingGateway for StubGateway {
        async fn geocode(
            &self,
            address: &str,
            _country: &str,
        ) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
            self.seen.lock().unwrap().push(address.to_string());
            Ok(self.candidates.clone())
        }
    }

    struct FailingClient;

    #[async_trait]
    impl LlmClient for FailingClient {
        async fn generate(&self, _prompt: &str) -> DomainResult<String> {
            Err(AppError::LLMError("service unavailable".to_string()))
        }
    }

    fn candidate(precision: LocationPrecision, latitude: f64, longitude: f64) -> GeocodeCandidate {
        GeocodeCandidate {
            precision,
            coordinate: Coordinate {
                latitude,
                longitude,
            },
        }
    }

    #[tokio::test]
    async fn test_rooftop_candidate_wins() {
        let gateway = StubGateway::returning(vec![
            candidate(LocationPrecision::Approximate, 35.0, 139.0),
            candidate(LocationPrecision::Rooftop, 35.6586, 139.7454),
        ]);
        let resolver = AddressResolver::new(gateway, "JP".to_string());

        let resolution = resolver.resolve("Tokyo Tower").await.unwrap();
        let coordinate = resolution.coordinate.unwrap();
        assert_eq!(coordinate.latitude, 35.6586);
        assert_eq!(coordinate.longitude, 139.7454);
    }

    #[tokio::test]
    async fn test_zero_candidates_leave_address_unresolved() {
        let gateway = StubGateway::returning(Vec::new());
        let resolver = AddressResolver::new(gateway, "JP".to_string());

        let resolution = resolver.resolve("???invalid???").await.unwrap();
        assert!(resolution.coordinate.is_none());
        assert_eq!(resolution.effective_address, "???invalid???");
    }

    #[tokio::test]
    async fn test_correction_failure_still_geocodes_original_address() {
        let gateway = StubGateway::returning(vec![candidate(
            LocationPrecision::Rooftop,
            35.6586,
            139.7454,
        )]);
        let resolver = AddressResolver::new(gateway.clone(), "JP".to_string())
            .with_corrector(AddressCorrector::new(Arc::new(FailingClient)));

        let resolution = resolver.resolve("Tokyo Tower").await.unwrap();
        assert!(resolution.coordinate.is_some());
        assert_eq!(resolution.effective_address, "Tokyo Tower");
        assert_eq!(*gateway.seen.lock().unwrap(), vec!["Tokyo Tower".to_string()]);
    }

    #[tokio::test]
    async fn test_refinement_failure_keeps_geocoded_coordinate() {
        let gateway = StubGateway::returning(vec![candidate(
            LocationPrecision::Rooftop,
            35.6586,
            139.7454,
        )]);
        let resolver = AddressResolver::new(gateway, "JP".to_string())
            .with_refiner(CoordinateRefiner::new(Arc::new(FailingClient)));

        let resolution = resolver.resolve("Tokyo Tower").await.unwrap();
        let coordinate = resolution.coordinate.unwrap();
        assert_eq!(coordinate.latitude, 35.6586);
    }
}
