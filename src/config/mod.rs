//! Configuration system (layered: defaults < TOML file < env).

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::classify::RetryFamily;
use crate::error::ErrataError;
use crate::provider::ProviderKey;
use crate::recovery::LogTier;
use crate::util::retry::RetryConfig;

pub const ENV_LOG_TIER: &str = "ERRATA_LOG_TIER";
pub const ENV_ATTEMPT_TIMEOUT_MS: &str = "ERRATA_ATTEMPT_TIMEOUT_MS";
pub const ENV_MAX_REQUESTS_PER_SECOND: &str = "ERRATA_MAX_REQUESTS_PER_SECOND";
pub const ENV_SLOW_DOWN_COOLDOWN_MS: &str = "ERRATA_SLOW_DOWN_COOLDOWN_MS";
pub const ENV_MAX_RETRIES: &str = "ERRATA_MAX_RETRIES";

/// Retry presets, one per failure family.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicies {
    pub rate_limit: RetryConfig,
    pub server_error: RetryConfig,
    pub connection: RetryConfig,
}

impl Default for RetryPolicies {
    fn default() -> Self {
        Self {
            rate_limit: RetryConfig::rate_limit(),
            server_error: RetryConfig::server_error(),
            connection: RetryConfig::connection(),
        }
    }
}

impl RetryPolicies {
    pub fn for_family(&self, family: RetryFamily) -> &RetryConfig {
        match family {
            RetryFamily::RateLimit => &self.rate_limit,
            RetryFamily::ServerError => &self.server_error,
            RetryFamily::Connection => &self.connection,
        }
    }

    fn for_each_mut(&mut self, mut f: impl FnMut(&mut RetryConfig)) {
        f(&mut self.rate_limit);
        f(&mut self.server_error);
        f(&mut self.connection);
    }
}

/// Runtime settings for a [`RecoveryFacade`](crate::recovery::RecoveryFacade).
#[derive(Clone, PartialEq)]
pub struct ErrataConfig {
    pub log_tier: LogTier,
    /// Deadline for a single attempt, separate from the retry budget.
    pub attempt_timeout: Duration,
    pub max_requests_per_second: u32,
    /// How long the throttler stays derated after a slow-down signal.
    pub slow_down_cooldown: Duration,
    pub retry: RetryPolicies,
    api_keys: HashMap<ProviderKey, String>,
}

impl fmt::Debug for ErrataConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut providers: Vec<&str> = self.api_keys.keys().map(|k| k.as_str()).collect();
        providers.sort_unstable();
        f.debug_struct("ErrataConfig")
            .field("log_tier", &self.log_tier)
            .field("attempt_timeout", &self.attempt_timeout)
            .field("max_requests_per_second", &self.max_requests_per_second)
            .field("slow_down_cooldown", &self.slow_down_cooldown)
            .field("retry", &self.retry)
            .field("api_keys_for", &providers)
            .finish()
    }
}

impl Default for ErrataConfig {
    fn default() -> Self {
        Self {
            log_tier: LogTier::Production,
            attempt_timeout: Duration::from_secs(60),
            max_requests_per_second: 10,
            slow_down_cooldown: Duration::from_secs(5),
            retry: RetryPolicies::default(),
            api_keys: HashMap::new(),
        }
    }
}

impl ErrataConfig {
    /// Defaults overlaid with environment variables.
    ///
    /// Loads `.env` if present. Provider API keys are read from each
    /// provider's conventional variable (`OPENAI_API_KEY`, ...).
    pub fn from_env() -> Result<Self, ErrataError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Defaults overlaid with a TOML document. Environment is not consulted.
    pub fn from_toml_str(raw: &str) -> Result<Self, ErrataError> {
        let file: FileConfig = toml::from_str(raw)
            .map_err(|e| ErrataError::Configuration(format!("invalid config file: {e}")))?;
        let mut config = Self::default();
        file.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Full layering: defaults, then the file at `path` (or the default
    /// location when it exists), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ErrataError> {
        let default_path = Self::default_path();
        let path = match path {
            Some(path) => Some(path),
            None => default_path.exists().then_some(default_path.as_path()),
        };

        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                tracing::debug!(path = %path.display(), "Loaded config file");
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };

        let _ = dotenvy::dotenv();
        config.apply_env()?;
        Ok(config)
    }

    /// `~/.errata/config.toml`, or `.errata/config.toml` without a home dir.
    pub fn default_path() -> PathBuf {
        directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().join(".errata"))
            .unwrap_or_else(|| PathBuf::from(".errata"))
            .join("config.toml")
    }

    pub fn retry_policy(&self, family: RetryFamily) -> &RetryConfig {
        self.retry.for_family(family)
    }

    pub fn set_api_key(&mut self, provider: ProviderKey, key: impl Into<String>) {
        self.api_keys.insert(provider, key.into());
    }

    pub fn api_key(&self, provider: ProviderKey) -> Option<&str> {
        self.api_keys.get(&provider).map(String::as_str)
    }

    fn apply_env(&mut self) -> Result<(), ErrataError> {
        if let Some(tier) = env_parse::<LogTier>(ENV_LOG_TIER)? {
            self.log_tier = tier;
        }
        if let Some(ms) = env_parse::<u64>(ENV_ATTEMPT_TIMEOUT_MS)? {
            self.attempt_timeout = Duration::from_millis(ms);
        }
        if let Some(rate) = env_parse::<u32>(ENV_MAX_REQUESTS_PER_SECOND)? {
            self.max_requests_per_second = rate;
        }
        if let Some(ms) = env_parse::<u64>(ENV_SLOW_DOWN_COOLDOWN_MS)? {
            self.slow_down_cooldown = Duration::from_millis(ms);
        }
        if let Some(max_retries) = env_parse::<u32>(ENV_MAX_RETRIES)? {
            self.retry.for_each_mut(|policy| policy.max_retries = max_retries);
        }

        for provider in ProviderKey::ALL {
            let Some(var) = provider.api_key_env() else {
                continue;
            };
            if let Ok(key) = std::env::var(var) {
                if !key.trim().is_empty() {
                    self.api_keys.insert(provider, key);
                }
            }
        }

        self.validate()
    }

    /// Reject settings that would make the facade misbehave.
    pub fn validate(&self) -> Result<(), ErrataError> {
        if self.max_requests_per_second == 0 {
            return Err(ErrataError::Configuration(
                "max_requests_per_second must be at least 1".into(),
            ));
        }
        if self.attempt_timeout.is_zero() {
            return Err(ErrataError::Configuration(
                "attempt_timeout must be positive".into(),
            ));
        }
        for (name, policy) in [
            ("rate_limit", &self.retry.rate_limit),
            ("server_error", &self.retry.server_error),
            ("connection", &self.retry.connection),
        ] {
            if !(policy.backoff_multiplier.is_finite() && policy.backoff_multiplier >= 1.0) {
                return Err(ErrataError::Configuration(format!(
                    "retry.{name}.backoff_multiplier must be >= 1"
                )));
            }
            // Growth between consecutive steps must cover the jitter, or
            // delays can shrink from one retry to the next.
            let first_step = policy.base_delay.as_secs_f64() * (policy.backoff_multiplier - 1.0);
            if first_step < policy.jitter.as_secs_f64() {
                return Err(ErrataError::Configuration(format!(
                    "retry.{name}.jitter_ms exceeds the first backoff step \
                     (base_delay_ms * (backoff_multiplier - 1))"
                )));
            }
            if policy.base_delay > policy.max_delay {
                return Err(ErrataError::Configuration(format!(
                    "retry.{name}.base_delay_ms exceeds max_delay_ms"
                )));
            }
        }
        Ok(())
    }
}

fn env_parse<T>(var: &str) -> Result<Option<T>, ErrataError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ErrataError::Configuration(format!("{var}={raw:?}: {e}"))),
        _ => Ok(None),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    log_tier: Option<LogTier>,
    attempt_timeout_ms: Option<u64>,
    max_requests_per_second: Option<u32>,
    slow_down_cooldown_ms: Option<u64>,
    #[serde(default)]
    retry: FileRetryPolicies,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileRetryPolicies {
    rate_limit: Option<FileRetryConfig>,
    server_error: Option<FileRetryConfig>,
    connection: Option<FileRetryConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileRetryConfig {
    max_retries: Option<u32>,
    base_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
    backoff_multiplier: Option<f64>,
    jitter_ms: Option<u64>,
}

impl FileConfig {
    fn apply(self, config: &mut ErrataConfig) {
        if let Some(tier) = self.log_tier {
            config.log_tier = tier;
        }
        if let Some(ms) = self.attempt_timeout_ms {
            config.attempt_timeout = Duration::from_millis(ms);
        }
        if let Some(rate) = self.max_requests_per_second {
            config.max_requests_per_second = rate;
        }
        if let Some(ms) = self.slow_down_cooldown_ms {
            config.slow_down_cooldown = Duration::from_millis(ms);
        }
        let retry = self.retry;
        for (file, policy) in [
            (retry.rate_limit, &mut config.retry.rate_limit),
            (retry.server_error, &mut config.retry.server_error),
            (retry.connection, &mut config.retry.connection),
        ] {
            if let Some(file) = file {
                file.apply(policy);
            }
        }
    }
}

impl FileRetryConfig {
    fn apply(self, policy: &mut RetryConfig) {
        if let Some(n) = self.max_retries {
            policy.max_retries = n;
        }
        if let Some(ms) = self.base_delay_ms {
            policy.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.max_delay_ms {
            policy.max_delay = Duration::from_millis(ms);
        }
        if let Some(m) = self.backoff_multiplier {
            policy.backoff_multiplier = m;
        }
        if let Some(ms) = self.jitter_ms {
            policy.jitter = Duration::from_millis(ms);
        }
    }
}
