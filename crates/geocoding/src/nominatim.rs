use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::{Coordinates, GeocodeError, GeocodeResolver, Resolution, UnresolvedReason};

/// Settings for [`NominatimResolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct NominatimConfig {
    /// Base URL of the Nominatim instance (default: public OSM instance)
    pub base_url: String,

    /// User agent sent with every request; Nominatim's usage policy requires one
    pub user_agent: String,

    /// Upper bound on a single lookup, connection included (default: 10 seconds)
    pub timeout: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "tsra-secours".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// A single place from the Nominatim search response.
/// Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    /// Latitude as a decimal string
    pub lat: String,
    /// Longitude as a decimal string
    pub lon: String,
    /// Human-readable name of the match
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Geocode resolver backed by the Nominatim `/search` endpoint.
pub struct NominatimResolver {
    client: Client,
    config: NominatimConfig,
}

impl NominatimResolver {
    /// Create a new Nominatim resolver
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeocodeError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    async fn search(&self, query: &str) -> Resolution {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let params = [("q", query), ("format", "jsonv2"), ("limit", "1")];

        let response = match self.client.get(&url).query(&params).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Resolution::Unresolved(UnresolvedReason::Timeout),
            Err(e) => {
                return Resolution::Unresolved(UnresolvedReason::Upstream(format!(
                    "HTTP request failed: {}",
                    e
                )));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            return match status.as_u16() {
                429 => Resolution::Unresolved(UnresolvedReason::RateLimited),
                _ => Resolution::Unresolved(UnresolvedReason::Upstream(format!("HTTP {}", status))),
            };
        }

        match response.json::<Vec<NominatimPlace>>().await {
            Ok(places) => first_match(&places),
            Err(e) if e.is_timeout() => Resolution::Unresolved(UnresolvedReason::Timeout),
            Err(e) => Resolution::Unresolved(UnresolvedReason::Malformed(e.to_string())),
        }
    }
}

#[async_trait]
impl GeocodeResolver for NominatimResolver {
    async fn resolve(&self, location: &str) -> Resolution {
        let query = location.trim();
        if query.is_empty() {
            return Resolution::Unresolved(UnresolvedReason::EmptyQuery);
        }

        debug!("Geocoding location: {}", query);

        // reqwest's timeout covers the transfer; this one also covers DNS and body decoding
        let resolution = match tokio::time::timeout(self.config.timeout, self.search(query)).await
        {
            Ok(resolution) => resolution,
            Err(_) => Resolution::Unresolved(UnresolvedReason::Timeout),
        };

        if let Resolution::Unresolved(ref reason) = resolution {
            warn!("Could not geocode {:?}: {}", query, reason);
        }

        resolution
    }
}

/// Picks the first place of a search response and parses its coordinates.
pub fn first_match(places: &[NominatimPlace]) -> Resolution {
    let Some(place) = places.first() else {
        return Resolution::Unresolved(UnresolvedReason::NoMatch);
    };

    let latitude = place.lat.trim().parse::<f64>();
    let longitude = place.lon.trim().parse::<f64>();

    match (latitude, longitude) {
        (Ok(latitude), Ok(longitude))
            if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) =>
        {
            debug!(
                "Resolved to {:?} ({}, {})",
                place.display_name, latitude, longitude
            );
            Resolution::Resolved(Coordinates::new(latitude, longitude))
        }
        _ => Resolution::Unresolved(UnresolvedReason::Malformed(format!(
            "invalid coordinates ({}, {})",
            place.lat, place.lon
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(lat: &str, lon: &str) -> NominatimPlace {
        NominatimPlace {
            lat: lat.to_string(),
            lon: lon.to_string(),
            display_name: None,
        }
    }

    #[test]
    fn test_first_match_parses_string_coordinates() {
        let places = vec![place("47.2173", "-1.5534"), place("0", "0")];

        assert_eq!(
            first_match(&places),
            Resolution::Resolved(Coordinates::new(47.2173, -1.5534))
        );
    }

    #[test]
    fn test_first_match_without_places_is_no_match() {
        assert_eq!(
            first_match(&[]),
            Resolution::Unresolved(UnresolvedReason::NoMatch)
        );
    }

    #[test]
    fn test_first_match_rejects_garbage_and_out_of_range() {
        assert!(matches!(
            first_match(&[place("north", "-1.5")]),
            Resolution::Unresolved(UnresolvedReason::Malformed(_))
        ));
        assert!(matches!(
            first_match(&[place("91.0", "2.0")]),
            Resolution::Unresolved(UnresolvedReason::Malformed(_))
        ));
    }

    #[test]
    fn test_search_response_deserializes() {
        let body = r#"[{"place_id":1,"lat":"48.8566","lon":"2.3522","display_name":"Paris"}]"#;
        let places: Vec<NominatimPlace> = serde_json::from_str(body).unwrap();

        assert_eq!(places.len(), 1);
        assert_eq!(places[0].display_name.as_deref(), Some("Paris"));
        assert_eq!(
            first_match(&places).coordinates(),
            Some(Coordinates::new(48.8566, 2.3522))
        );
    }

    #[tokio::test]
    async fn test_blank_location_is_not_sent_upstream() {
        let resolver = NominatimResolver::new(NominatimConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..NominatimConfig::default()
        })
        .unwrap();

        assert_eq!(
            resolver.resolve("   ").await,
            Resolution::Unresolved(UnresolvedReason::EmptyQuery)
        );
    }

    #[tokio::test]
    async fn test_unreachable_geocoder_is_unresolved() {
        let resolver = NominatimResolver::new(NominatimConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
            ..NominatimConfig::default()
        })
        .unwrap();

        let resolution = resolver.resolve("10 Rue de Nantes").await;

        assert!(matches!(
            resolution,
            Resolution::Unresolved(UnresolvedReason::Upstream(_) | UnresolvedReason::Timeout)
        ));
    }
}
