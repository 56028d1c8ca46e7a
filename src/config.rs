//! Environment configuration.
//!
//! Missing variables fall back to defaults; malformed values are errors.
//! Every `from_env` constructor has a `from_source` twin that reads from an
//! arbitrary lookup, which is what the tests use.

use std::env::VarError;
use std::time::Duration;

use thiserror::Error;

use crate::http::{RetryEligibility, RetryPolicy};

/// Base URL of the finance backend when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Username used when a call does not name one.
pub const DEFAULT_USERNAME: &str = "johndoe";

// =============================================================================
// Client Config
// =============================================================================

/// Configuration of the finance API client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_base_url: String,
    /// Username used when a call does not name one.
    pub default_username: String,
    /// Attempts for GET calls, including the first.
    pub retry_max_attempts: usize,
    /// Backoff unit.
    pub retry_base_delay: Duration,
    /// Which failures are retried.
    pub retry_eligibility: RetryEligibility,
    /// Time limit of a single attempt, if any.
    pub attempt_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            default_username: DEFAULT_USERNAME.to_string(),
            retry_max_attempts: RetryPolicy::DEFAULT_MAX_ATTEMPTS,
            retry_base_delay: RetryPolicy::DEFAULT_BASE_DELAY,
            retry_eligibility: RetryEligibility::default(),
            attempt_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MOLIYACHI_API_BASE_URL`: backend base URL (default `http://localhost:5000`)
    /// - `MOLIYACHI_DEFAULT_USERNAME`: default username (default `johndoe`)
    /// - `MOLIYACHI_RETRY_MAX_ATTEMPTS`: attempts for GET calls (default 3)
    /// - `MOLIYACHI_RETRY_BASE_DELAY_MS`: backoff unit (default 150)
    /// - `MOLIYACHI_RETRY_ELIGIBILITY`: `all` or `transient` (default `all`)
    /// - `MOLIYACHI_ATTEMPT_TIMEOUT_MS`: per-attempt limit (default none)
    ///
    /// # Errors
    ///
    /// Returns an error if any variable holds an invalid value or the
    /// configuration fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|name| std::env::var(name))
    }

    /// Creates a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_source<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Result<String, VarError>,
    {
        let base_url = parse_env_string(&lookup, "MOLIYACHI_API_BASE_URL", DEFAULT_API_BASE_URL)?;
        let config = Self {
            api_base_url: base_url.trim_end_matches('/').to_string(),
            default_username: parse_env_string(
                &lookup,
                "MOLIYACHI_DEFAULT_USERNAME",
                DEFAULT_USERNAME,
            )?,
            retry_max_attempts: usize::try_from(parse_env_u64(
                &lookup,
                "MOLIYACHI_RETRY_MAX_ATTEMPTS",
                RetryPolicy::DEFAULT_MAX_ATTEMPTS as u64,
            )?)
            .unwrap_or(usize::MAX),
            retry_base_delay: Duration::from_millis(parse_env_u64(
                &lookup,
                "MOLIYACHI_RETRY_BASE_DELAY_MS",
                150,
            )?),
            retry_eligibility: parse_eligibility(&lookup, "MOLIYACHI_RETRY_ELIGIBILITY")?,
            attempt_timeout: parse_env_optional_u64(&lookup, "MOLIYACHI_ATTEMPT_TIMEOUT_MS")?
                .map(Duration::from_millis),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `api_base_url` is empty
    /// - `default_username` is empty
    /// - `retry_max_attempts` is zero
    /// - `attempt_timeout` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Empty("MOLIYACHI_API_BASE_URL"));
        }
        if self.default_username.trim().is_empty() {
            return Err(ConfigError::Empty("MOLIYACHI_DEFAULT_USERNAME"));
        }
        if self.retry_max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts);
        }
        if self.attempt_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidAttemptTimeout);
        }
        Ok(())
    }

    /// The retry policy described by this configuration.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_max_attempts, self.retry_base_delay)
            .with_eligibility(self.retry_eligibility)
    }
}

// =============================================================================
// Chat Config
// =============================================================================

/// Configuration of the landing chat endpoint.
#[derive(Clone, PartialEq)]
pub struct ChatConfig {
    /// Provider API key. Requests fail with a configuration error while unset.
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API.
    pub api_base_url: String,
    /// Completion model.
    pub model: String,
    /// Sampling temperature (0.0 - 2.0).
    pub temperature: f64,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Address the server binds to.
    pub host: String,
    /// Port the server listens on.
    pub port: u16,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ChatConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl ChatConfig {
    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENAI_API_KEY`: provider key (optional)
    /// - `OPENAI_BASE_URL`: provider base URL (default `https://api.openai.com/v1`)
    /// - `CHAT_MODEL`: model (default `gpt-4o-mini`)
    /// - `CHAT_TEMPERATURE`: temperature (default 0.7)
    /// - `CHAT_MAX_TOKENS`: token limit (default 500)
    /// - `HOST`: bind address (default `0.0.0.0`)
    /// - `PORT`: listen port (default 3000)
    ///
    /// # Errors
    ///
    /// Returns an error if any variable holds an invalid value or the
    /// configuration fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|name| std::env::var(name))
    }

    /// Creates a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_source<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Result<String, VarError>,
    {
        let defaults = Self::default();
        let port = parse_env_u64(&lookup, "PORT", u64::from(defaults.port))?;
        let max_tokens = parse_env_u64(&lookup, "CHAT_MAX_TOKENS", u64::from(defaults.max_tokens))?;

        let config = Self {
            api_key: parse_env_optional_string(&lookup, "OPENAI_API_KEY")?,
            api_base_url: parse_env_string(&lookup, "OPENAI_BASE_URL", &defaults.api_base_url)?
                .trim_end_matches('/')
                .to_string(),
            model: parse_env_string(&lookup, "CHAT_MODEL", &defaults.model)?,
            temperature: parse_env_f64(&lookup, "CHAT_TEMPERATURE", defaults.temperature)?,
            max_tokens: u32::try_from(max_tokens).map_err(|_| ConfigError::OutOfRange {
                name: "CHAT_MAX_TOKENS",
                value: max_tokens,
            })?,
            host: parse_env_string(&lookup, "HOST", &defaults.host)?,
            port: u16::try_from(port).map_err(|_| ConfigError::OutOfRange {
                name: "PORT",
                value: port,
            })?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `temperature` is not in range `0.0..=2.0`
    /// - `max_tokens` is zero
    /// - `model` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::OutOfRange {
                name: "CHAT_MAX_TOKENS",
                value: 0,
            });
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Empty("CHAT_MODEL"));
        }
        Ok(())
    }

    /// `host:port` for binding the listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Error type for configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable could not be parsed.
    #[error(transparent)]
    EnvParse(#[from] EnvParseError),

    /// A required value is blank.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// `MOLIYACHI_RETRY_MAX_ATTEMPTS` is zero.
    #[error("MOLIYACHI_RETRY_MAX_ATTEMPTS must be at least 1")]
    InvalidMaxAttempts,

    /// `MOLIYACHI_ATTEMPT_TIMEOUT_MS` is zero.
    #[error("MOLIYACHI_ATTEMPT_TIMEOUT_MS must be greater than 0")]
    InvalidAttemptTimeout,

    /// Temperature outside `0.0..=2.0`.
    #[error("CHAT_TEMPERATURE must be in range 0.0..=2.0, got {0}")]
    InvalidTemperature(f64),

    /// A number that does not fit its target type.
    #[error("{name} is out of range: {value}")]
    OutOfRange {
        /// Variable name.
        name: &'static str,
        /// Parsed value.
        value: u64,
    },
}

/// Error type for environment variable parsing.
#[derive(Debug, Error)]
pub enum EnvParseError {
    /// Invalid f64 value.
    #[error("Invalid f64 value for {name}: {message} (got '{value}')")]
    InvalidF64 {
        /// Variable name.
        name: String,
        /// Error message.
        message: String,
        /// Actual value.
        value: String,
    },

    /// Invalid u64 value.
    #[error("Invalid u64 value for {name}: {message} (got '{value}')")]
    InvalidU64 {
        /// Variable name.
        name: String,
        /// Error message.
        message: String,
        /// Actual value.
        value: String,
    },

    /// Invalid text value.
    #[error("Invalid value for {name}: {message} (got '{value}')")]
    InvalidText {
        /// Variable name.
        name: String,
        /// Error message.
        message: String,
        /// Actual value.
        value: String,
    },
}

// =============================================================================
// Environment Variable Parsing
// =============================================================================

fn read<L>(lookup: &L, name: &str) -> Result<Option<String>, EnvParseError>
where
    L: Fn(&str) -> Result<String, VarError>,
{
    match lookup(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(VarError::NotPresent) => Ok(None),
        Err(error) => Err(EnvParseError::InvalidText {
            name: name.to_string(),
            message: error.to_string(),
            value: String::new(),
        }),
    }
}

fn parse_env_string<L>(lookup: &L, name: &str, default: &str) -> Result<String, EnvParseError>
where
    L: Fn(&str) -> Result<String, VarError>,
{
    Ok(read(lookup, name)?.unwrap_or_else(|| default.to_string()))
}

fn parse_env_optional_string<L>(lookup: &L, name: &str) -> Result<Option<String>, EnvParseError>
where
    L: Fn(&str) -> Result<String, VarError>,
{
    read(lookup, name)
}

/// Returns the default value if the variable is not set.
/// Returns an error if the variable is set but contains an invalid value.
fn parse_env_f64<L>(lookup: &L, name: &str, default: f64) -> Result<f64, EnvParseError>
where
    L: Fn(&str) -> Result<String, VarError>,
{
    let Some(value) = read(lookup, name)? else {
        return Ok(default);
    };
    value
        .parse()
        .map_err(|e: std::num::ParseFloatError| EnvParseError::InvalidF64 {
            name: name.to_string(),
            message: e.to_string(),
            value,
        })
}

fn parse_env_optional_u64<L>(lookup: &L, name: &str) -> Result<Option<u64>, EnvParseError>
where
    L: Fn(&str) -> Result<String, VarError>,
{
    let Some(value) = read(lookup, name)? else {
        return Ok(None);
    };
    value
        .parse()
        .map(Some)
        .map_err(|e: std::num::ParseIntError| EnvParseError::InvalidU64 {
            name: name.to_string(),
            message: e.to_string(),
            value,
        })
}

fn parse_env_u64<L>(lookup: &L, name: &str, default: u64) -> Result<u64, EnvParseError>
where
    L: Fn(&str) -> Result<String, VarError>,
{
    Ok(parse_env_optional_u64(lookup, name)?.unwrap_or(default))
}

fn parse_eligibility<L>(lookup: &L, name: &str) -> Result<RetryEligibility, EnvParseError>
where
    L: Fn(&str) -> Result<String, VarError>,
{
    let Some(value) = read(lookup, name)? else {
        return Ok(RetryEligibility::default());
    };
    value.parse().map_err(|message| EnvParseError::InvalidText {
        name: name.to_string(),
        message,
        value,
    })
}
