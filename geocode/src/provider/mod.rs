//! Network adapter: one provider-specific HTTP GET per admitted query.
//!
//! [`build_request`] turns a query into the active provider's URL and headers,
//! [`HttpClient`] performs the GET (swappable for tests), and [`parse_response`]
//! classifies the body into a coordinate or a [`GeocodeError`].

mod nominatim;
mod photon;

use std::time::Duration;

use async_trait::async_trait;

use crate::coordinate::Coordinate;
use crate::error::GeocodeError;
use crate::query::Query;
use crate::settings::{Provider, Settings};

/// A fully built provider request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// Performs a GET and returns the body of a successful response.
///
/// Implementations map a non-success status to [`GeocodeError::Status`] and any
/// failure to get a response to [`GeocodeError::Transport`].
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, request: &ProviderRequest) -> Result<String, GeocodeError>;
}

/// Reqwest-based HTTP client.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, request: &ProviderRequest) -> Result<String, GeocodeError> {
        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let res = builder
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;
        let status = res.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }
        res.text()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))
    }
}

/// Builds the GET for `query` against the provider selected in `settings`.
///
/// The normalized key is what goes on the wire, so differently-cased queries
/// produce the same request.
pub fn build_request(settings: &Settings, query: &Query) -> ProviderRequest {
    let q: String = url::form_urlencoded::byte_serialize(query.key().as_bytes()).collect();
    match settings.provider {
        Provider::Nominatim => ProviderRequest {
            url: format!("{}q={}&format=json&limit=1", settings.nominatim_url, q),
            headers: vec![("User-Agent".to_string(), settings.user_agent.clone())],
        },
        Provider::Photon => ProviderRequest {
            url: format!("{}q={}&limit=1", settings.photon_url, q),
            headers: Vec::new(),
        },
    }
}

/// Extracts the first candidate from a provider response body.
pub fn parse_response(provider: Provider, body: &str) -> Result<Coordinate, GeocodeError> {
    match provider {
        Provider::Nominatim => nominatim::parse(body),
        Provider::Photon => photon::parse(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nominatim_request_has_format_and_user_agent() {
        let settings = Settings {
            provider: Provider::Nominatim,
            user_agent: "test-agent/1".to_string(),
            ..Settings::default()
        };
        let req = build_request(&settings, &Query::new("São Paulo"));
        assert_eq!(
            req.url,
            "https://nominatim.openstreetmap.org/search?q=s%C3%A3o+paulo&format=json&limit=1"
        );
        assert_eq!(
            req.headers,
            vec![("User-Agent".to_string(), "test-agent/1".to_string())]
        );
    }

    #[test]
    fn photon_request_has_no_extra_headers() {
        let req = build_request(&Settings::default(), &Query::new("Rue de Rivoli & Co"));
        assert_eq!(
            req.url,
            "https://photon.komoot.io/api/?q=rue+de+rivoli+%26+co&limit=1"
        );
        assert!(req.headers.is_empty());
    }

    #[test]
    fn parse_response_dispatches_on_provider() {
        let nominatim = r#"[{"lat": "1.5", "lon": "2.5"}]"#;
        let photon = r#"{"features": [{"geometry": {"coordinates": [2.5, 1.5]}}]}"#;
        let a = parse_response(Provider::Nominatim, nominatim).unwrap();
        let b = parse_response(Provider::Photon, photon).unwrap();
        assert_eq!((a.latitude, a.longitude), (b.latitude, b.longitude));
        assert!(parse_response(Provider::Photon, nominatim).is_err());
    }
}
