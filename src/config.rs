//! Configuration for the ancillary service endpoints.
//!
//! The core consumes but does not own this configuration: the hosting
//! environment supplies the base URL and bearer token.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Environment variable holding the ancillary service base URL.
pub const ENV_BASE_URL: &str = "TRIP_EXTRAS_BASE_URL";
/// Environment variable holding the bearer token.
pub const ENV_API_TOKEN: &str = "TRIP_EXTRAS_API_TOKEN";

/// Connection settings for the recommendation and order endpoints.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the ancillary service, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    /// Bearer token presented on every request.
    pub api_token: SecretString,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: SecretString::from(api_token.into()),
        }
    }

    /// Load the configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var(ENV_BASE_URL)
            .map_err(|_| ConfigError::MissingEnvVar(ENV_BASE_URL.to_string()))?;
        if base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: ENV_BASE_URL.to_string(),
                message: "base URL must not be empty".to_string(),
            });
        }

        let api_token = std::env::var(ENV_API_TOKEN)
            .map_err(|_| ConfigError::MissingEnvVar(ENV_API_TOKEN.to_string()))?;
        if api_token.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: ENV_API_TOKEN.to_string(),
                message: "bearer token must not be empty".to_string(),
            });
        }

        Ok(Self::new(base_url, api_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn new_wraps_token() {
        let config = ApiConfig::new("https://api.example.com", "secret-token");
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.api_token.expose_secret(), "secret-token");
    }

    #[test]
    fn token_is_not_debug_printed() {
        let config = ApiConfig::new("https://api.example.com", "secret-token");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
    }
}
