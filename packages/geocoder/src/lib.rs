#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reverse geocoding for pin placement.
//!
//! Resolves a clicked map coordinate to a street address using a
//! multi-provider strategy configured via TOML files in `services/`:
//!
//! 1. **Google Geocoding API** (priority 1): needs an API key from the
//!    environment variable named in its config; skipped when unset.
//! 2. **Nominatim / OpenStreetMap** (priority 2): free, 1 req/sec rate
//!    limit.
//!
//! Providers are tried in priority order by [`FallbackGeocoder`]. A
//! provider that errors is logged and skipped; a provider that answers
//! "no address here" ends the search.

pub mod google;
pub mod nominatim;
pub mod service_registry;

use async_trait::async_trait;
use roofing_geometry::LatLng;
use thiserror::Error;

use crate::service_registry::{GeocodingService, ProviderConfig};

/// A reverse geocoding result.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseGeocoded {
    /// Latitude of the matched feature (WGS84).
    pub latitude: f64,
    /// Longitude of the matched feature (WGS84).
    pub longitude: f64,
    /// Formatted address.
    pub address: String,
    /// Which provider resolved this coordinate.
    pub provider: GeocodingProvider,
}

/// Which geocoding provider resolved a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingProvider {
    /// Google Geocoding API.
    Google,
    /// Nominatim / OpenStreetMap.
    Nominatim,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Provider is misconfigured (e.g. missing API key).
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// Anything that can turn a coordinate into an address.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Resolves `point` to an address, or `None` if nothing is there.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the provider could not be queried.
    async fn reverse(&self, point: LatLng) -> Result<Option<ReverseGeocoded>, GeocodeError>;
}

/// A configured provider ready to be queried.
#[derive(Debug, Clone)]
enum Provider {
    Google { base_url: String, api_key: String },
    Nominatim { base_url: String },
}

/// Tries every enabled provider in priority order.
pub struct FallbackGeocoder {
    client: reqwest::Client,
    providers: Vec<(String, Provider)>,
}

impl FallbackGeocoder {
    /// Builds the chain from the embedded service registry.
    ///
    /// Providers whose API key variable is unset are left out.
    #[must_use]
    pub fn from_registry(client: reqwest::Client) -> Self {
        Self::from_services(
            client,
            &service_registry::enabled_services(),
            |name| std::env::var(name).ok(),
        )
    }

    /// Builds the chain from explicit service definitions, resolving API
    /// key variables through `lookup_env`.
    #[must_use]
    pub fn from_services(
        client: reqwest::Client,
        services: &[GeocodingService],
        lookup_env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let providers = services
            .iter()
            .filter_map(|svc| {
                let provider = match &svc.provider {
                    ProviderConfig::Google {
                        base_url,
                        api_key_env,
                    } => {
                        let Some(api_key) = lookup_env(api_key_env).filter(|k| !k.is_empty())
                        else {
                            log::debug!("Skipping geocoder {}: {api_key_env} is not set", svc.id);
                            return None;
                        };
                        Provider::Google {
                            base_url: base_url.clone(),
                            api_key,
                        }
                    }
                    ProviderConfig::Nominatim { base_url, .. } => Provider::Nominatim {
                        base_url: base_url.clone(),
                    },
                };
                Some((svc.id.clone(), provider))
            })
            .collect();

        Self { client, providers }
    }

    /// IDs of the providers that will be tried, in order.
    #[must_use]
    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.iter().map(|(id, _)| id.as_str()).collect()
    }
}

#[async_trait]
impl ReverseGeocoder for FallbackGeocoder {
    async fn reverse(&self, point: LatLng) -> Result<Option<ReverseGeocoded>, GeocodeError> {
        let mut last_error = None;

        for (id, provider) in &self.providers {
            let result = match provider {
                Provider::Google { base_url, api_key } => {
                    google::reverse(&self.client, base_url, api_key, point).await
                }
                Provider::Nominatim { base_url } => {
                    nominatim::reverse(&self.client, base_url, point).await
                }
            };

            match result {
                Ok(found) => return Ok(found),
                Err(e) => {
                    log::warn!("Reverse geocoder {id} failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        last_error.map_or(Ok(None), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_is_skipped_without_key() {
        let geocoder = FallbackGeocoder::from_services(
            reqwest::Client::new(),
            &service_registry::enabled_services(),
            |_| None,
        );
        assert_eq!(geocoder.provider_ids(), vec!["nominatim"]);
    }

    #[test]
    fn google_runs_first_when_keyed() {
        let geocoder = FallbackGeocoder::from_services(
            reqwest::Client::new(),
            &service_registry::enabled_services(),
            |name| (name == "GOOGLE_MAPS_API_KEY").then(|| "test-key".to_string()),
        );
        assert_eq!(geocoder.provider_ids(), vec!["google", "nominatim"]);
    }

    #[tokio::test]
    async fn empty_chain_resolves_to_nothing() {
        let geocoder = FallbackGeocoder::from_services(reqwest::Client::new(), &[], |_| None);
        let found = geocoder.reverse(LatLng::new(53.5, -113.5)).await.unwrap();
        assert!(found.is_none());
    }
}
