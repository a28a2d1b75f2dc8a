//! # geocode
//!
//! Resolves free-text place names to coordinates while staying inside an
//! upstream provider's rate contract. The [`Geocoder`] is a request scheduler
//! with an integrated cache:
//!
//! - **Sources, by priority**: host overrides ([`OverrideStore`]), a startup
//!   snapshot ([`InitCache`]), the runtime [`GeocodeCache`], then the network.
//! - **Cache**: keyed by the lowercased query, bounded by
//!   `max_cache_size + max_cache_overflow`, trimmed back to `max_cache_size`
//!   by dropping the least-hit entries.
//! - **Admission**: a FIFO queue drained under a concurrency cap and a single
//!   shared minimum spacing between dispatches.
//! - **Providers**: Nominatim and Photon ([`Provider`]) behind the
//!   [`HttpClient`] seam ([`ReqwestHttpClient`] by default).
//!
//! Failures (transport, bad status, malformed body, zero candidates) resolve
//! to `None`, are never cached and never retried.
//!
//! ```rust,no_run
//! use geocode::{Geocoder, Settings};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let geocoder = Geocoder::new(Settings::from_env()?)?;
//! if let Some(c) = geocoder.resolve("Paris").await {
//!     println!("{} {}", c.latitude, c.longitude);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod coordinate;
pub mod error;
pub mod provider;
pub mod query;
pub mod scheduler;
pub mod settings;
pub mod sources;

pub use cache::{CacheEntry, GeocodeCache};
pub use coordinate::Coordinate;
pub use error::GeocodeError;
pub use provider::{build_request, parse_response, HttpClient, ProviderRequest, ReqwestHttpClient};
pub use query::{normalize, Query};
pub use scheduler::{Geocoder, Resolution, SchedulerStats};
pub use settings::{Provider, Settings, SettingsError};
pub use sources::{InitCache, OverrideStore};

/// When running `cargo test -p geocode`, initializes tracing from `RUST_LOG` so
/// unit tests can print logs with `--nocapture`.
#[cfg(test)]
mod test_logging {
    use ctor::ctor;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::Layer;

    #[ctor]
    fn init() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_filter(filter),
            )
            .try_init();
    }
}
