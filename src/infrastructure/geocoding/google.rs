use async_trait::async_trait;
use serde::Deserialize;

use super::GeocodingGateway;
use crate::domain::geocode::{Coordinate, GeocodeCandidate, GeocodeError, LocationPrecision};

const GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
    location_type: String,
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Client for the Google Maps Geocoding API.
pub struct GoogleMapsClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GoogleMapsClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_key,
            endpoint: GEOCODE_ENDPOINT.to_string(),
        }
    }
}

#[async_trait]
impl GeocodingGateway for GoogleMapsClient {
    async fn geocode(
        &self,
        address: &str,
        country: &str,
    ) -> std::result::Result<Vec<GeocodeCandidate>, GeocodeError> {
        let components = format!("country:{}", country);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("address", address),
                ("components", components.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(GeocodeError::Service(format!("HTTP {}", response.status())));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Transport(format!("invalid response body: {}", e)))?;
        candidates_from(body)
    }
}

fn transport_error(err: reqwest::Error) -> GeocodeError {
    if err.is_timeout() {
        GeocodeError::Timeout
    } else {
        GeocodeError::Transport(err.to_string())
    }
}

/// Map the service's status field onto candidates or a per-row error.
/// `ZERO_RESULTS` is not an error: the address simply stays unresolved.
fn candidates_from(
    response: GeocodeResponse,
) -> std::result::Result<Vec<GeocodeCandidate>, GeocodeError> {
    match response.status.as_str() {
        "OK" => Ok(response
            .results
            .into_iter()
            .map(|result| GeocodeCandidate {
                precision: precision_from(&result.geometry.location_type),
                coordinate: Coordinate {
                    latitude: result.geometry.location.lat,
                    longitude: result.geometry.location.lng,
                },
            })
            .collect()),
        "ZERO_RESULTS" => Ok(Vec::new()),
        "OVER_QUERY_LIMIT" => Err(GeocodeError::RateLimited),
        "INVALID_REQUEST" => Err(GeocodeError::InvalidRequest(
            response.error_message.unwrap_or_default(),
        )),
        other => Err(GeocodeError::Service(format!(
            "{}: {}",
            other,
            response.error_message.unwrap_or_default()
        ))),
    }
}

fn precision_from(location_type: &str) -> LocationPrecision {
    match location_type {
        "ROOFTOP" => LocationPrecision::Rooftop,
        "RANGE_INTERPOLATED" => LocationPrecision::RangeInterpolated,
        "GEOMETRIC_CENTER" => LocationPrecision::GeometricCenter,
        _ => LocationPrecision::Approximate,
    }
}
