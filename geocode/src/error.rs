//! Outcome classification for provider lookups.

use thiserror::Error;

/// Why a single provider round trip did not yield a coordinate.
///
/// Every variant is terminal for the request that produced it: nothing is
/// retried and nothing is cached. Callers of the scheduler only observe `None`;
/// the variant is logged and returned by [`crate::Geocoder::fetch`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeocodeError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("transport error: {0}")]
    Transport(String),
    /// The provider answered with a non-success HTTP status.
    #[error("provider returned status {0}")]
    Status(u16),
    /// The response body did not match the provider's shape.
    #[error("malformed provider response: {0}")]
    Parse(String),
    /// The provider answered successfully with zero candidates.
    #[error("geocode result is empty")]
    Empty,
}

impl From<serde_json::Error> for GeocodeError {
    fn from(e: serde_json::Error) -> Self {
        GeocodeError::Parse(e.to_string())
    }
}
