use std::time::Duration;

use thiserror::Error;

use crate::config::env_provider::EnvironmentProvider;

const DEFAULT_DATABASE_URL: &str = "sqlite://pulsestream.db?mode=rwc";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/0";
const DEFAULT_SECRET_KEY: &str = "dev-secret-key-change-in-production";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Service configuration resolved from the environment
///
/// Exact variable names are this crate's choice; the semantics (deadline,
/// skew tolerance, retention horizon, fail-open flag, batch and payload
/// maxima) are part of the service contract.
#[derive(Debug, Clone)]
pub struct ApplicationSettings {
    pub database_url: String,
    pub redis_url: String,
    pub secret_key: String,
    pub host: String,
    pub port: u16,

    /// Overall per-request deadline
    pub request_timeout: Duration,

    /// How far in the future a client-supplied occurrence timestamp may lie
    pub clock_skew_tolerance_secs: i64,

    /// How far in the past a client-supplied occurrence timestamp may lie
    pub retention_horizon_days: i64,

    /// Whether the rate limiter admits requests when the cache is down
    pub rate_limiter_fail_open: bool,

    pub max_batch_size: usize,
    pub max_payload_size_bytes: usize,

    /// Session token lifetime for the human auth surface
    pub access_token_ttl_secs: i64,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout: Duration::from_secs(30),
            clock_skew_tolerance_secs: 300,
            retention_horizon_days: 30,
            rate_limiter_fail_open: true,
            max_batch_size: 1000,
            max_payload_size_bytes: 10 * 1024 * 1024,
            access_token_ttl_secs: 30 * 60,
        }
    }
}

impl ApplicationSettings {
    /// Load settings from the given environment, falling back to defaults
    /// for anything unset. A present-but-unparseable value is an error, not
    /// a silent default.
    pub fn from_env(env: &impl EnvironmentProvider) -> Result<Self, SettingsError> {
        let defaults = Self::default();

        let settings = Self {
            database_url: env
                .get_var("DATABASE_URL")
                .unwrap_or(defaults.database_url),
            redis_url: env.get_var("REDIS_URL").unwrap_or(defaults.redis_url),
            secret_key: env.get_var("SECRET_KEY").unwrap_or(defaults.secret_key),
            host: env.get_var("HOST").unwrap_or(defaults.host),
            port: parse_var(env, "PORT", defaults.port)?,
            request_timeout: Duration::from_secs(parse_var(
                env,
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            clock_skew_tolerance_secs: parse_var(
                env,
                "CLOCK_SKEW_TOLERANCE_SECS",
                defaults.clock_skew_tolerance_secs,
            )?,
            retention_horizon_days: parse_var(
                env,
                "RETENTION_HORIZON_DAYS",
                defaults.retention_horizon_days,
            )?,
            rate_limiter_fail_open: parse_var(
                env,
                "RATE_LIMITER_FAIL_OPEN",
                defaults.rate_limiter_fail_open,
            )?,
            max_batch_size: parse_var(env, "MAX_BATCH_SIZE", defaults.max_batch_size)?,
            max_payload_size_bytes: parse_var(
                env,
                "MAX_PAYLOAD_SIZE_BYTES",
                defaults.max_payload_size_bytes,
            )?,
            access_token_ttl_secs: parse_var(
                env,
                "ACCESS_TOKEN_TTL_SECS",
                defaults.access_token_ttl_secs,
            )?,
        };

        if settings.secret_key == DEFAULT_SECRET_KEY {
            tracing::warn!("SECRET_KEY not set, using the development default");
        }

        Ok(settings)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(
    env: &impl EnvironmentProvider,
    key: &str,
    default: T,
) -> Result<T, SettingsError> {
    match env.get_var(key) {
        Some(raw) => raw.parse().map_err(|_| SettingsError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env_provider::MockEnvironment;

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let settings = ApplicationSettings::from_env(&MockEnvironment::empty()).unwrap();

        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.clock_skew_tolerance_secs, 300);
        assert_eq!(settings.retention_horizon_days, 30);
        assert!(settings.rate_limiter_fail_open);
        assert_eq!(settings.max_batch_size, 1000);
        assert_eq!(settings.max_payload_size_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn environment_overrides_defaults() {
        let env = MockEnvironment::empty()
            .with_var("REQUEST_TIMEOUT_SECS", "5")
            .with_var("RATE_LIMITER_FAIL_OPEN", "false")
            .with_var("MAX_BATCH_SIZE", "50");
        let settings = ApplicationSettings::from_env(&env).unwrap();

        assert_eq!(settings.request_timeout, Duration::from_secs(5));
        assert!(!settings.rate_limiter_fail_open);
        assert_eq!(settings.max_batch_size, 50);
    }

    #[test]
    fn unparseable_value_is_an_error() {
        let env = MockEnvironment::empty().with_var("PORT", "not-a-port");

        assert!(ApplicationSettings::from_env(&env).is_err());
    }
}
