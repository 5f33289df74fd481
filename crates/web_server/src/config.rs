use std::str::FromStr;
use std::time::Duration;

use chat_services::ChatConfig;
use emergency_services::GeocodePolicy;
use geocoding::{Coordinates, NominatimConfig};

/// Where campaigns, emergencies and volunteers are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL at `DATABASE_URL`
    Postgres,
    /// Process memory; lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("expected 'postgres' or 'memory', got '{}'", other)),
        }
    }
}

/// Which geocoder resolves emergency locations
#[derive(Debug, Clone, PartialEq)]
pub enum GeocoderChoice {
    /// A Nominatim HTTP instance
    Nominatim(NominatimConfig),
    /// A fixed table of places
    Fixed(Vec<(String, Coordinates)>),
}

/// Configuration errors, reported before the server starts
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable holds a value that cannot be used
    #[error("Invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Server settings read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server listens on (default: 0.0.0.0:8080)
    pub bind_address: String,
    /// Storage backend (default: postgres)
    pub store_backend: StoreBackend,
    /// PostgreSQL connection string
    pub database_url: String,
    /// Geocoder used at intake (default: nominatim)
    pub geocoder: GeocoderChoice,
    /// Handling of unresolved locations (default: lenient)
    pub geocode_policy: GeocodePolicy,
    /// Secret used to sign access tokens
    pub jwt_secret: String,
    /// bcrypt cost for password hashes
    pub bcrypt_cost: u32,
    /// Require a bearer token to create campaigns (default: false)
    pub protect_campaign_writes: bool,
    /// Chat channel settings
    pub chat: ChatConfig,
}

const DEFAULT_JWT_SECRET: &str = "change-this-secret-in-production";

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let geocoder = match var("GEOCODER").as_deref().map(str::trim) {
            None | Some("nominatim") => {
                let defaults = NominatimConfig::default();
                GeocoderChoice::Nominatim(NominatimConfig {
                    base_url: var("GEOCODER_URL").unwrap_or(defaults.base_url),
                    user_agent: var("GEOCODER_USER_AGENT").unwrap_or(defaults.user_agent),
                    timeout: Duration::from_secs(parse_or(
                        &var,
                        "GEOCODE_TIMEOUT_SECS",
                        defaults.timeout.as_secs(),
                    )?),
                })
            }
            Some("fixed") => GeocoderChoice::Fixed(parse_places(
                var("GEOCODER_FIXED_PLACES").as_deref().unwrap_or(""),
            )?),
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "GEOCODER",
                    reason: format!("expected 'nominatim' or 'fixed', got '{}'", other),
                });
            }
        };

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            log::warn!("⚠️ JWT_SECRET not set, using the development secret");
            DEFAULT_JWT_SECRET.to_string()
        });

        let chat_defaults = ChatConfig::default();

        Ok(Self {
            bind_address: var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            store_backend: parse_or(&var, "STORE_BACKEND", StoreBackend::Postgres)?,
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost/animal_rescue".to_string()),
            geocoder,
            geocode_policy: parse_or(&var, "GEOCODE_POLICY", GeocodePolicy::default())?,
            jwt_secret,
            bcrypt_cost: parse_or(&var, "BCRYPT_COST", auth_services::DEFAULT_BCRYPT_COST)?,
            protect_campaign_writes: parse_or(&var, "PROTECT_CAMPAIGN_WRITES", false)?,
            chat: ChatConfig {
                queue_capacity: parse_or(
                    &var,
                    "CHAT_QUEUE_CAPACITY",
                    chat_defaults.queue_capacity,
                )?,
                max_body_len: parse_or(&var, "CHAT_MAX_BODY_LEN", chat_defaults.max_body_len)?,
                ..chat_defaults
            },
        })
    }
}

fn parse_or<T>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    match var(name) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Parses `Name=lat,lon;Other=lat,lon`.
fn parse_places(value: &str) -> Result<Vec<(String, Coordinates)>, ConfigError> {
    let invalid = |entry: &str| ConfigError::Invalid {
        name: "GEOCODER_FIXED_PLACES",
        reason: format!("expected 'Name=lat,lon', got '{}'", entry),
    };

    value.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, coords) = entry.split_once('=').ok_or_else(|| invalid(entry))?;
            let (lat, lon) = coords.split_once(',').ok_or_else(|| invalid(entry))?;
            let latitude = lat.trim().parse().map_err(|_| invalid(entry))?;
            let longitude = lon.trim().parse().map_err(|_| invalid(entry))?;
            Ok((name.trim().to_string(), Coordinates::new(latitude, longitude)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.geocode_policy, GeocodePolicy::Lenient);
        assert!(!config.protect_campaign_writes);
        assert_eq!(config.chat.queue_capacity, 64);
        match config.geocoder {
            GeocoderChoice::Nominatim(nominatim) => {
                assert_eq!(nominatim.user_agent, "tsra-secours");
                assert_eq!(nominatim.timeout, Duration::from_secs(10));
            }
            other => panic!("unexpected geocoder {:?}", other),
        }
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("STORE_BACKEND", "memory"),
            ("GEOCODE_POLICY", "strict"),
            ("GEOCODER", "fixed"),
            ("GEOCODER_FIXED_PLACES", "Paris=48.8566,2.3522; Lyon = 45.764, 4.8357"),
            ("PROTECT_CAMPAIGN_WRITES", "true"),
            ("CHAT_QUEUE_CAPACITY", "8"),
            ("BCRYPT_COST", "6"),
        ])
        .unwrap();

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.geocode_policy, GeocodePolicy::Strict);
        assert!(config.protect_campaign_writes);
        assert_eq!(config.chat.queue_capacity, 8);
        assert_eq!(config.bcrypt_cost, 6);
        assert_eq!(
            config.geocoder,
            GeocoderChoice::Fixed(vec![
                ("Paris".to_string(), Coordinates::new(48.8566, 2.3522)),
                ("Lyon".to_string(), Coordinates::new(45.764, 4.8357)),
            ])
        );
    }

    #[test]
    fn test_invalid_values_are_reported() {
        for vars in [
            vec![("STORE_BACKEND", "mongo")],
            vec![("GEOCODE_POLICY", "sometimes")],
            vec![("GEOCODER", "google")],
            vec![("CHAT_QUEUE_CAPACITY", "lots")],
            vec![("GEOCODER", "fixed"), ("GEOCODER_FIXED_PLACES", "Paris")],
        ] {
            assert!(config(&vars).is_err(), "{:?} should be rejected", vars);
        }
    }
}
