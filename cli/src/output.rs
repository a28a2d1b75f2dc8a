//! Result rendering: one tab-separated line or one JSON object per address.

use geocode::Coordinate;
use serde_json::json;

pub fn text_line(address: &str, coordinate: Option<&Coordinate>) -> String {
    match coordinate {
        Some(c) => format!(
            "{}\t{}\t{}\t{}",
            address,
            c.latitude,
            c.longitude,
            c.name.as_deref().unwrap_or("")
        ),
        None => format!("{}\tnot found", address),
    }
}

pub fn json_line(address: &str, coordinate: Option<&Coordinate>) -> serde_json::Value {
    match coordinate {
        Some(c) => json!({
            "address": address,
            "found": true,
            "latitude": c.latitude,
            "longitude": c.longitude,
            "type": c.place_type,
            "name": c.name,
        }),
        None => json!({ "address": address, "found": false }),
    }
}
