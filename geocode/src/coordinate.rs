//! Resolved coordinate type shared by every resolution source.

use serde::{Deserialize, Serialize};

/// A resolved location.
///
/// `address` carries the query text the coordinate was handed out for. The
/// scheduler always stamps it on a copy, so the stored value is never mutated
/// by a lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// Place type reported by the provider (e.g. `city`, `house`).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub place_type: Option<String>,
    /// Display name reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            place_type: None,
            name: None,
            address: None,
        }
    }

    /// Returns a copy with `address` set to `query`.
    pub fn stamped(&self, query: &str) -> Self {
        Self {
            address: Some(query.to_string()),
            ..self.clone()
        }
    }
}
