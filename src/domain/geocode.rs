use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// How precisely a geocode result matched the queried address.
///
/// `Rooftop` means the coordinate was matched to a specific building or
/// parcel; everything else is interpolated or approximate to some degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationPrecision {
    Rooftop,
    RangeInterpolated,
    GeometricCenter,
    Approximate,
}

impl LocationPrecision {
    pub fn is_rooftop(&self) -> bool {
        matches!(self, LocationPrecision::Rooftop)
    }
}

/// One result returned by the geocoding service for a single address.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    pub precision: LocationPrecision,
    pub coordinate: Coordinate,
}

/// Pick the best candidate: the first rooftop-precision one in service
/// order, falling back to the first candidate overall. Zero candidates
/// means the address stays unresolved.
pub fn select_candidate(candidates: &[GeocodeCandidate]) -> Option<&GeocodeCandidate> {
    candidates
        .iter()
        .find(|c| c.precision.is_rooftop())
        .or_else(|| candidates.first())
}

/// Service-level failures of a single geocoding call. These are recoverable
/// per row: the batch logs them and leaves the row unresolved instead of
/// aborting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    /// Rate limit or monthly quota rejected the request.
    RateLimited,
    /// The request did not complete within the client timeout.
    Timeout,
    /// The request never reached the service or the connection broke.
    Transport(String),
    /// The service rejected the request as malformed.
    InvalidRequest(String),
    /// Any other rejection reported by the service.
    Service(String),
}

impl fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeocodeError::RateLimited => write!(f, "rate limit or quota exceeded"),
            GeocodeError::Timeout => write!(f, "request timed out"),
            GeocodeError::Transport(msg) => write!(f, "transport failure: {}", msg),
            GeocodeError::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
            GeocodeError::Service(msg) => write!(f, "service error: {}", msg),
        }
    }
}

impl std::error::Error for GeocodeError {}
