//! Typed configuration over the closed key set persisted in the Store
//! (spec §3/§4.5). Mirrors the "parse from a string, validate, reject
//! unknown keys" shape of `hook_worker::config`, but backed by the Store's
//! `config` table instead of environment variables, since these values
//! must be mutable at runtime via `config set`.

use std::fmt;
use std::str::FromStr;

/// The closed set of configuration keys. Any other key is rejected with
/// `UnknownConfigKey`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    MaxRetries,
    BackoffBase,
    PollIntervalSeconds,
    StuckTimeoutSeconds,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 4] = [
        ConfigKey::MaxRetries,
        ConfigKey::BackoffBase,
        ConfigKey::PollIntervalSeconds,
        ConfigKey::StuckTimeoutSeconds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::MaxRetries => "max-retries",
            ConfigKey::BackoffBase => "backoff-base",
            ConfigKey::PollIntervalSeconds => "poll-interval-seconds",
            ConfigKey::StuckTimeoutSeconds => "stuck-timeout-seconds",
        }
    }

    pub fn default_value(&self) -> &'static str {
        match self {
            ConfigKey::MaxRetries => "3",
            ConfigKey::BackoffBase => "2",
            ConfigKey::PollIntervalSeconds => "1.0",
            ConfigKey::StuckTimeoutSeconds => "3600",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown config key {0:?}")]
pub struct UnknownConfigKey(pub String);

impl FromStr for ConfigKey {
    type Err = UnknownConfigKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max-retries" => Ok(ConfigKey::MaxRetries),
            "backoff-base" => Ok(ConfigKey::BackoffBase),
            "poll-interval-seconds" => Ok(ConfigKey::PollIntervalSeconds),
            "stuck-timeout-seconds" => Ok(ConfigKey::StuckTimeoutSeconds),
            other => Err(UnknownConfigKey(other.to_owned())),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InvalidConfigValue {
    #[error("{key} expects an integer, got {value:?}")]
    NotAnInteger { key: ConfigKey, value: String },
    #[error("{key} expects a number, got {value:?}")]
    NotANumber { key: ConfigKey, value: String },
    #[error("{key} must be >= 0, got {value}")]
    NegativeInteger { key: ConfigKey, value: i64 },
    #[error("backoff-base must be >= 1, got {value}")]
    BackoffBaseTooSmall { value: i64 },
    #[error("poll-interval-seconds must be > 0, got {value}")]
    NonPositivePollInterval { value: f64 },
}

impl fmt::Debug for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validate and normalize a raw string value for `key`, returning the
/// canonical string form to persist (so `config_get` always reads back a
/// value that already passed validation).
pub fn validate_config_value(key: ConfigKey, raw: &str) -> Result<String, InvalidConfigValue> {
    match key {
        ConfigKey::MaxRetries | ConfigKey::StuckTimeoutSeconds => {
            let parsed: i64 =
                raw.trim()
                    .parse()
                    .map_err(|_| InvalidConfigValue::NotAnInteger {
                        key,
                        value: raw.to_owned(),
                    })?;
            if parsed < 0 {
                return Err(InvalidConfigValue::NegativeInteger { key, value: parsed });
            }
            Ok(parsed.to_string())
        }
        ConfigKey::BackoffBase => {
            let parsed: i64 =
                raw.trim()
                    .parse()
                    .map_err(|_| InvalidConfigValue::NotAnInteger {
                        key,
                        value: raw.to_owned(),
                    })?;
            if parsed < 1 {
                return Err(InvalidConfigValue::BackoffBaseTooSmall { value: parsed });
            }
            Ok(parsed.to_string())
        }
        ConfigKey::PollIntervalSeconds => {
            let parsed: f64 =
                raw.trim()
                    .parse()
                    .map_err(|_| InvalidConfigValue::NotANumber {
                        key,
                        value: raw.to_owned(),
                    })?;
            if parsed <= 0.0 {
                return Err(InvalidConfigValue::NonPositivePollInterval { value: parsed });
            }
            Ok(parsed.to_string())
        }
    }
}

/// A fully-resolved snapshot of all persisted tunables, with the defaults
/// from spec §3 applied for any key never written by `config set`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub max_retries: i64,
    pub backoff_base: i64,
    pub poll_interval_seconds: f64,
    pub stuck_timeout_seconds: i64,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            max_retries: ConfigKey::MaxRetries.default_value().parse().unwrap(),
            backoff_base: ConfigKey::BackoffBase.default_value().parse().unwrap(),
            poll_interval_seconds: ConfigKey::PollIntervalSeconds
                .default_value()
                .parse()
                .unwrap(),
            stuck_timeout_seconds: ConfigKey::StuckTimeoutSeconds
                .default_value()
                .parse()
                .unwrap(),
        }
    }
}
