use std::env;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("environment variable {name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Runtime configuration for the lookup sources.
/// Values are sourced from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub genderize_url: String,
    pub nationalize_url: String,
    pub agify_url: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub http_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - GENDERIZE_URL, NATIONALIZE_URL, AGIFY_URL [required]
    /// - ENRICHER_TOKEN (optional API token passed as `apikey`)
    /// - ENRICHER_HTTP_TIMEOUT_SECS (default: 10)
    /// - ENRICHER_REQUEST_TIMEOUT_SECS (default: 3)
    /// - ENRICHER_USER_AGENT (default: person-enricher/<version>)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let seconds = |name: &'static str, default: u64| match lookup(name) {
            None => Ok(default),
            Some(value) => match value.trim().parse::<u64>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(ConfigError::InvalidNumber { name, value }),
            },
        };

        let genderize_url = required("GENDERIZE_URL")?;
        let nationalize_url = required("NATIONALIZE_URL")?;
        let agify_url = required("AGIFY_URL")?;
        let token = lookup("ENRICHER_TOKEN").filter(|t| !t.is_empty());
        let http_timeout_secs = seconds("ENRICHER_HTTP_TIMEOUT_SECS", 10)?;
        let request_timeout_secs = seconds("ENRICHER_REQUEST_TIMEOUT_SECS", 3)?;
        let user_agent = lookup("ENRICHER_USER_AGENT")
            .unwrap_or_else(|| format!("person-enricher/{}", env!("CARGO_PKG_VERSION")));

        Ok(Self {
            genderize_url,
            nationalize_url,
            agify_url,
            token,
            user_agent,
            http_timeout_secs,
            request_timeout_secs,
        })
    }

    /// Same base URL for all three sources; handy for tests and local stubs.
    pub fn with_base_urls(genderize: &str, nationalize: &str, agify: &str) -> Self {
        Self {
            genderize_url: genderize.to_string(),
            nationalize_url: nationalize.to_string(),
            agify_url: agify.to_string(),
            token: None,
            user_agent: format!("person-enricher/{}", env!("CARGO_PKG_VERSION")),
            http_timeout_secs: 10,
            request_timeout_secs: 3,
        }
    }
}
