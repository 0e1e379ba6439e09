pub mod google;

use async_trait::async_trait;

use crate::domain::geocode::{GeocodeCandidate, GeocodeError};

pub use google::GoogleMapsClient;

/// Forward-geocoding backend: one address in, zero or more candidates out,
/// restricted to a single country.
#[async_trait]
pub trait GeocodingGateway {
    async fn geocode(
        &self,
        address: &str,
        country: &str,
    ) -> std::result::Result<Vec<GeocodeCandidate>, GeocodeError>;
}
