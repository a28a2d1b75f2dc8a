//! geocode CLI: resolve addresses through the rate-limited geocoder.
//!
//! All addresses are queued up front, so they are dispatched back to back at
//! the configured rate; results are printed in argument order.

mod output;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::Parser;
use geocode::{Coordinate, Geocoder, Provider, Settings};
use serde::de::DeserializeOwned;

#[derive(Parser, Debug)]
#[command(name = "geocode")]
#[command(about = "Resolve place names to coordinates within the provider's rate limits")]
struct Args {
    /// Addresses to resolve
    #[arg(required = true, value_name = "ADDRESS")]
    addresses: Vec<String>,

    /// Geocoding provider: nominatim or photon (default: GEOCODE_PROVIDER, else photon)
    #[arg(long, value_name = "NAME")]
    provider: Option<Provider>,

    /// Minimum milliseconds between provider requests
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Maximum concurrent provider requests
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// JSON object of address -> coordinate pinned ahead of every other source
    #[arg(long, value_name = "PATH")]
    overrides: Option<PathBuf>,

    /// JSON object of address -> coordinate served before the network
    #[arg(long, value_name = "PATH")]
    init_cache: Option<PathBuf>,

    /// Print one JSON object per address instead of tab-separated lines
    #[arg(long)]
    json: bool,
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("parse {}: {}", path.display(), e).into())
}

fn settings_from(args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = Settings::from_env()?;
    if let Some(p) = args.provider {
        settings.provider = p;
    }
    if let Some(ms) = args.interval_ms {
        settings.min_request_interval_ms = ms;
    }
    if let Some(n) = args.concurrency {
        settings.max_concurrent_requests = n.max(1);
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_and_apply("geocode", None::<&Path>).ok();
    let log_guard = config::tracing_init::init()?;

    let args = Args::parse();
    let settings = settings_from(&args)?;
    tracing::debug!(provider = %settings.provider, "starting geocoder");
    let geocoder = Geocoder::new(settings)?;

    if let Some(path) = &args.overrides {
        let map: HashMap<String, Option<Coordinate>> = load_json(path)?;
        geocoder.inject_overrides(map, true);
    }
    if let Some(path) = &args.init_cache {
        let map: HashMap<String, Coordinate> = load_json(path)?;
        geocoder.seed_init_cache(map);
    }

    let pending: Vec<_> = args
        .addresses
        .iter()
        .map(|a| (a.as_str(), geocoder.resolve(a)))
        .collect();

    let mut missing = 0usize;
    for (address, resolution) in pending {
        let coordinate = resolution.await;
        if coordinate.is_none() {
            missing += 1;
        }
        if args.json {
            println!("{}", output::json_line(address, coordinate.as_ref()));
        } else {
            println!("{}", output::text_line(address, coordinate.as_ref()));
        }
    }

    if missing > 0 {
        tracing::warn!(missing, "some addresses did not resolve");
        drop(log_guard);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_settings() {
        let args = Args::parse_from([
            "geocode",
            "--provider",
            "nominatim",
            "--interval-ms",
            "1500",
            "--concurrency",
            "0",
            "Paris",
        ]);
        let s = settings_from(&args).unwrap();
        assert_eq!(s.provider, Provider::Nominatim);
        assert_eq!(s.min_request_interval_ms, 1500);
        assert_eq!(s.max_concurrent_requests, 1);
        assert_eq!(args.addresses, ["Paris"]);
    }

    #[test]
    fn load_json_reads_override_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(
            &path,
            r#"{"HQ": {"latitude": 47.6, "longitude": -122.3}, "Old HQ": null}"#,
        )
        .unwrap();
        let map: HashMap<String, Option<Coordinate>> = load_json(&path).unwrap();
        assert_eq!(map["HQ"].as_ref().unwrap().latitude, 47.6);
        assert!(map["Old HQ"].is_none());
    }

    #[test]
    fn load_json_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{").unwrap();
        let err = load_json::<HashMap<String, Coordinate>>(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
