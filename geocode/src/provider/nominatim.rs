//! Nominatim response shape: `[{"lat": "..", "lon": "..", "type": .., "display_name": ..}]`.

use serde::Deserialize;

use crate::coordinate::Coordinate;
use crate::error::GeocodeError;

#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default, rename = "type")]
    place_type: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

/// Takes the first candidate. `[]` and `null` are both empty.
pub(crate) fn parse(body: &str) -> Result<Coordinate, GeocodeError> {
    let places: Option<Vec<Place>> = serde_json::from_str(body)?;
    let place = places
        .and_then(|p| p.into_iter().next())
        .ok_or(GeocodeError::Empty)?;
    Ok(Coordinate {
        latitude: parse_degrees("lat", &place.lat)?,
        longitude: parse_degrees("lon", &place.lon)?,
        place_type: place.place_type,
        name: place.display_name,
        address: None,
    })
}

fn parse_degrees(field: &str, raw: &str) -> Result<f64, GeocodeError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| GeocodeError::Parse(format!("invalid {field} {raw:?}: {e}")))
}
