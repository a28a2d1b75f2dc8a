//! Photon response shape: a GeoJSON feature collection with `[lon, lat]` points.

use serde::Deserialize;

use crate::coordinate::Coordinate;
use crate::error::GeocodeError;

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Geometry,
    #[serde(default)]
    properties: Properties,
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: Vec<f64>,
}

#[derive(Deserialize, Default)]
struct Properties {
    #[serde(default, rename = "type")]
    place_type: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    street: Option<String>,
}

/// Takes the first feature. A missing or empty `features` list is empty.
pub(crate) fn parse(body: &str) -> Result<Coordinate, GeocodeError> {
    let collection: Option<FeatureCollection> = serde_json::from_str(body)?;
    let feature = collection
        .and_then(|c| c.features.into_iter().next())
        .ok_or(GeocodeError::Empty)?;
    let (longitude, latitude) = match feature.geometry.coordinates.as_slice() {
        [lon, lat, ..] => (*lon, *lat),
        other => {
            return Err(GeocodeError::Parse(format!(
                "expected [lon, lat], got {} values",
                other.len()
            )))
        }
    };
    let props = feature.properties;
    Ok(Coordinate {
        latitude,
        longitude,
        place_type: props.place_type,
        name: props.name.or(props.street),
        address: None,
    })
}
