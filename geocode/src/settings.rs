//! Scheduler settings: limits, cache bounds, provider selection.
//!
//! Settings are read once at startup and never mutated by the scheduler.
//! [`Settings::from_env`] overlays `GEOCODE_*` variables on the defaults; the
//! `config` crate is what fills those variables from `.env` and the XDG file.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search?";
pub const DEFAULT_PHOTON_URL: &str = "https://photon.komoot.io/api/?";
pub const DEFAULT_USER_AGENT: &str = concat!("geocode-rs/", env!("CARGO_PKG_VERSION"));

pub const ENV_MAX_CONCURRENT_REQUESTS: &str = "GEOCODE_MAX_CONCURRENT_REQUESTS";
pub const ENV_MIN_REQUEST_INTERVAL_MS: &str = "GEOCODE_MIN_REQUEST_INTERVAL_MS";
pub const ENV_MAX_CACHE_SIZE: &str = "GEOCODE_MAX_CACHE_SIZE";
pub const ENV_MAX_CACHE_OVERFLOW: &str = "GEOCODE_MAX_CACHE_OVERFLOW";
pub const ENV_PROVIDER: &str = "GEOCODE_PROVIDER";
pub const ENV_NOMINATIM_URL: &str = "GEOCODE_NOMINATIM_URL";
pub const ENV_PHOTON_URL: &str = "GEOCODE_PHOTON_URL";
pub const ENV_USER_AGENT: &str = "GEOCODE_USER_AGENT";
pub const ENV_TIMEOUT_SECS: &str = "GEOCODE_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("{key}: expected a non-negative integer, got {value:?}")]
    InvalidNumber { key: String, value: String },
    #[error("{key}: must be at least 1")]
    Zero { key: String },
    #[error("unknown geocoding provider: {0:?} (expected nominatim or photon)")]
    UnknownProvider(String),
}

/// Upstream geocoding service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenStreetMap Nominatim: JSON array response, requires a User-Agent.
    Nominatim,
    /// Komoot Photon: GeoJSON feature collection response.
    #[default]
    Photon,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Nominatim => f.write_str("nominatim"),
            Provider::Photon => f.write_str("photon"),
        }
    }
}

impl FromStr for Provider {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nominatim" => Ok(Provider::Nominatim),
            "photon" => Ok(Provider::Photon),
            _ => Err(SettingsError::UnknownProvider(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_concurrent_requests: usize,
    pub min_request_interval_ms: u64,
    pub max_cache_size: usize,
    /// Entries tolerated above `max_cache_size` before an eviction pass runs.
    pub max_cache_overflow: usize,
    pub provider: Provider,
    pub nominatim_url: String,
    pub photon_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 1,
            min_request_interval_ms: 1000,
            max_cache_size: 3000,
            max_cache_overflow: 1000,
            provider: Provider::default(),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            photon_url: DEFAULT_PHOTON_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 15,
        }
    }
}

impl Settings {
    /// Defaults overlaid with `GEOCODE_*` process environment variables.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each `GEOCODE_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = Self::default();
        if let Some(v) = parse_count(&lookup, ENV_MAX_CONCURRENT_REQUESTS)? {
            if v == 0 {
                return Err(SettingsError::Zero {
                    key: ENV_MAX_CONCURRENT_REQUESTS.to_string(),
                });
            }
            s.max_concurrent_requests = v;
        }
        if let Some(v) = parse_number(&lookup, ENV_MIN_REQUEST_INTERVAL_MS)? {
            s.min_request_interval_ms = v;
        }
        if let Some(v) = parse_count(&lookup, ENV_MAX_CACHE_SIZE)? {
            s.max_cache_size = v;
        }
        if let Some(v) = parse_count(&lookup, ENV_MAX_CACHE_OVERFLOW)? {
            s.max_cache_overflow = v;
        }
        if let Some(v) = parse_number(&lookup, ENV_TIMEOUT_SECS)? {
            s.timeout_secs = v;
        }
        if let Some(v) = lookup(ENV_PROVIDER) {
            s.provider = v.parse()?;
        }
        if let Some(v) = lookup(ENV_NOMINATIM_URL) {
            s.nominatim_url = v;
        }
        if let Some(v) = lookup(ENV_PHOTON_URL) {
            s.photon_url = v;
        }
        if let Some(v) = lookup(ENV_USER_AGENT) {
            s.user_agent = v;
        }
        Ok(s)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL of the active provider, ending where the query string begins.
    pub fn provider_url(&self) -> &str {
        match self.provider {
            Provider::Nominatim => &self.nominatim_url,
            Provider::Photon => &self.photon_url,
        }
    }
}

fn parse_number<F>(lookup: &F, key: &str) -> Result<Option<u64>, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| SettingsError::InvalidNumber {
                key: key.to_string(),
                value: raw,
            }),
    }
}

fn parse_count<F>(lookup: &F, key: &str) -> Result<Option<usize>, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(v) = parse_number(lookup, key)? else {
        return Ok(None);
    };
    usize::try_from(v)
        .map(Some)
        .map_err(|_| SettingsError::InvalidNumber {
            key: key.to_string(),
            value: v.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_match_provider_contract() {
        let s = Settings::default();
        assert_eq!(s.max_concurrent_requests, 1);
        assert_eq!(s.min_request_interval(), Duration::from_secs(1));
        assert_eq!(s.max_cache_size, 3000);
        assert_eq!(s.max_cache_overflow, 1000);
        assert_eq!(s.provider, Provider::Photon);
        assert_eq!(s.provider_url(), DEFAULT_PHOTON_URL);
    }

    #[test]
    fn lookup_overrides_defaults() {
        let s = Settings::from_lookup(lookup_from(&[
            (ENV_MAX_CONCURRENT_REQUESTS, "3"),
            (ENV_MIN_REQUEST_INTERVAL_MS, " 250 "),
            (ENV_PROVIDER, "Nominatim"),
            (ENV_NOMINATIM_URL, "http://localhost:9/search?"),
        ]))
        .unwrap();
        assert_eq!(s.max_concurrent_requests, 3);
        assert_eq!(s.min_request_interval_ms, 250);
        assert_eq!(s.provider, Provider::Nominatim);
        assert_eq!(s.provider_url(), "http://localhost:9/search?");
        assert_eq!(s.max_cache_size, 3000);
    }

    #[test]
    fn invalid_number_is_reported_with_key() {
        let err = Settings::from_lookup(lookup_from(&[(ENV_MAX_CACHE_SIZE, "lots")])).unwrap_err();
        assert_eq!(
            err,
            SettingsError::InvalidNumber {
                key: ENV_MAX_CACHE_SIZE.to_string(),
                value: "lots".to_string()
            }
        );
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = Settings::from_lookup(lookup_from(&[(ENV_MAX_CONCURRENT_REQUESTS, "0")]))
            .unwrap_err();
        assert_eq!(
            err,
            SettingsError::Zero {
                key: ENV_MAX_CONCURRENT_REQUESTS.to_string()
            }
        );
    }

    #[test]
    fn counts_accept_the_full_usize_range() {
        let max = usize::MAX.to_string();
        let s = Settings::from_lookup(lookup_from(&[
            (ENV_MAX_CACHE_SIZE, max.as_str()),
            (ENV_MAX_CACHE_OVERFLOW, max.as_str()),
        ]))
        .unwrap();
        assert_eq!(s.max_cache_size, usize::MAX);
        assert_eq!(s.max_cache_overflow, usize::MAX);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = Settings::from_lookup(lookup_from(&[(ENV_PROVIDER, "google")])).unwrap_err();
        assert!(matches!(err, SettingsError::UnknownProvider(p) if p == "google"));
    }

    #[test]
    fn partial_toml_style_deserialization_keeps_defaults() {
        let s: Settings = serde_json::from_str(r#"{"provider":"nominatim","max_cache_size":10}"#)
            .unwrap();
        assert_eq!(s.provider, Provider::Nominatim);
        assert_eq!(s.max_cache_size, 10);
        assert_eq!(s.max_cache_overflow, 1000);
    }
}
