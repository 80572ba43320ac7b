//! Session configuration read from the environment.

use crate::board::DEFAULT_MAX_ELEMENTS;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::sync::DEFAULT_POLL_INTERVAL;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8787";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Invalid configuration value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name}: invalid url {value:?}: {reason}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("{name}: expected a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name}: must not be empty")]
    Empty { name: &'static str },
}

/// Settings for one whiteboard session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Base URL of the room service. `None` uses [`DEFAULT_SERVICE_URL`].
    pub service_url: Option<Url>,
    pub poll_interval: Duration,
    /// Upper bound on every create, pull and push call.
    pub request_timeout: Duration,
    pub history_capacity: usize,
    pub max_elements: usize,
    /// Name sent with every push.
    pub display_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            service_url: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_elements: DEFAULT_MAX_ELEMENTS,
            display_name: guest_name(),
        }
    }
}

impl SessionConfig {
    /// Build a config from environment variables.
    ///
    /// - `CHALKROOM_SERVICE_URL`
    /// - `CHALKROOM_POLL_INTERVAL_MS`
    /// - `CHALKROOM_REQUEST_TIMEOUT_SECS`
    /// - `CHALKROOM_HISTORY_CAPACITY`
    /// - `CHALKROOM_MAX_ELEMENTS`
    /// - `CHALKROOM_DISPLAY_NAME`
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`SessionConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("CHALKROOM_SERVICE_URL") {
            config.service_url = Some(parse_url("CHALKROOM_SERVICE_URL", &value)?);
        }
        if let Some(value) = lookup("CHALKROOM_POLL_INTERVAL_MS") {
            config.poll_interval =
                Duration::from_millis(parse_positive("CHALKROOM_POLL_INTERVAL_MS", &value)?);
        }
        if let Some(value) = lookup("CHALKROOM_REQUEST_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_positive("CHALKROOM_REQUEST_TIMEOUT_SECS", &value)?);
        }
        if let Some(value) = lookup("CHALKROOM_HISTORY_CAPACITY") {
            config.history_capacity = to_usize(parse_positive("CHALKROOM_HISTORY_CAPACITY", &value)?);
        }
        if let Some(value) = lookup("CHALKROOM_MAX_ELEMENTS") {
            config.max_elements = to_usize(parse_positive("CHALKROOM_MAX_ELEMENTS", &value)?);
        }
        if let Some(value) = lookup("CHALKROOM_DISPLAY_NAME") {
            let value = value.trim();
            if value.is_empty() {
                return Err(ConfigError::Empty {
                    name: "CHALKROOM_DISPLAY_NAME",
                });
            }
            config.display_name = value.to_string();
        }

        Ok(config)
    }

    /// The configured room service, or the default one.
    pub fn service_url(&self) -> Result<Url, ConfigError> {
        match &self.service_url {
            Some(url) => Ok(url.clone()),
            None => parse_url("DEFAULT_SERVICE_URL", DEFAULT_SERVICE_URL),
        }
    }
}

/// Random participant name, e.g. `guest-3f2a9c1e`.
pub fn guest_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("guest-{}", &id[..8])
}

pub(crate) fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        reason,
    };
    let url = Url::parse(value.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a base url".to_string()));
    }
    Ok(url)
}

fn parse_positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        }),
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}
