//! Runtime configuration loading from environment variables.
//!
//! All configuration values are loaded from `FORGE_*` environment variables
//! with sensible defaults. Invalid values fall back to defaults without crashing.
//! A TOML file with the same keys (lowercase, without the prefix) can be
//! layered on top with [`from_toml_str`].
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `FORGE_CHUNK_SIZE` | 5 | Prompts per chunk (in-chunk concurrency) |
//! | `FORGE_IDLE_INTERVAL_MS` | 1000 | Idle wait on an empty queue (ms) |
//! | `FORGE_YIELD_INTERVAL_MS` | 10 | Pause between worker iterations (ms) |
//! | `FORGE_JOB_RETENTION_SECS` | 3600 | Retention of terminal jobs (secs) |
//! | `FORGE_GENERATION_COST` | 1 | Credits per generation attempt |
//! | `FORGE_CACHE_TTL_SECS` | 86400 | TTL of cached generation results (secs) |
//! | `FORGE_LOCAL_CACHE_MAX_ENTRIES` | 10000 | Local fallback cache capacity |
//! | `FORGE_TRIAL_DAYS` | 7 | Free-plan trial window (days) |
//! | `FORGE_SHUTDOWN_TIMEOUT` | 30 | Graceful shutdown timeout (secs) |
//! | `FORGE_LOG_LEVEL` | info | Tracing filter |
//! | `FORGE_LOG_FORMAT` | json | `json` or `pretty` |

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::LocalCacheConfig;
use crate::ledger::CreditLedgerConfig;
use crate::scheduler::SchedulerConfig;
use crate::telemetry::{LogConfig, LogFormat};
use crate::workflow::OrchestratorConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config file: {0}")]
    Parse(String),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Effective runtime configuration summary (serializable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub chunk_size: usize,
    pub idle_interval_ms: u64,
    pub yield_interval_ms: u64,
    pub job_retention_secs: u64,
    pub generation_cost: i64,
    pub cache_ttl_secs: u64,
    pub local_cache_max_entries: usize,
    pub trial_days: i64,
    pub shutdown_timeout_secs: u64,
    pub log_level: String,
    pub log_format: String,
}

/// All runtime configuration.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub scheduler: SchedulerConfig,
    pub orchestrator: OrchestratorConfig,
    pub local_cache: LocalCacheConfig,
    pub ledger: CreditLedgerConfig,
    pub log: LogConfig,
    pub shutdown_timeout: Duration,
}

/// Upper bound on cache TTLs (one year).
const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Raw values before floors and clamps are applied.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    chunk_size: usize,
    idle_interval_ms: u64,
    yield_interval_ms: u64,
    job_retention_secs: u64,
    generation_cost: i64,
    cache_ttl_secs: u64,
    local_cache_max_entries: usize,
    trial_days: i64,
    shutdown_timeout_secs: u64,
    log_level: String,
    log_format: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            chunk_size: 5,
            idle_interval_ms: 1000,
            yield_interval_ms: 10,
            job_retention_secs: 3600,
            generation_cost: 1,
            cache_ttl_secs: 24 * 60 * 60,
            local_cache_max_entries: 10_000,
            trial_days: 7,
            shutdown_timeout_secs: 30,
            log_level: "info".to_string(),
            log_format: "json".to_string(),
        }
    }
}

impl RawConfig {
    fn from_env() -> Self {
        let d = Self::default();
        Self {
            chunk_size: parse_env("FORGE_CHUNK_SIZE", d.chunk_size),
            idle_interval_ms: parse_env("FORGE_IDLE_INTERVAL_MS", d.idle_interval_ms),
            yield_interval_ms: parse_env("FORGE_YIELD_INTERVAL_MS", d.yield_interval_ms),
            job_retention_secs: parse_env("FORGE_JOB_RETENTION_SECS", d.job_retention_secs),
            generation_cost: parse_env("FORGE_GENERATION_COST", d.generation_cost),
            cache_ttl_secs: parse_env("FORGE_CACHE_TTL_SECS", d.cache_ttl_secs),
            local_cache_max_entries: parse_env("FORGE_LOCAL_CACHE_MAX_ENTRIES", d.local_cache_max_entries),
            trial_days: parse_env("FORGE_TRIAL_DAYS", d.trial_days),
            shutdown_timeout_secs: parse_env("FORGE_SHUTDOWN_TIMEOUT", d.shutdown_timeout_secs),
            log_level: std::env::var("FORGE_LOG_LEVEL").unwrap_or(d.log_level),
            log_format: std::env::var("FORGE_LOG_FORMAT").unwrap_or(d.log_format),
        }
    }

    fn finish(self) -> EnvConfig {
        let chunk_size = self.chunk_size.max(1);
        let idle_ms = self.idle_interval_ms.max(1);
        let retention_secs = self.job_retention_secs.max(1);
        let generation_cost = self.generation_cost.max(0);
        let cache_ttl_secs = self.cache_ttl_secs.clamp(1, MAX_CACHE_TTL_SECS);
        let max_entries = self.local_cache_max_entries.max(1);
        let trial_days = self.trial_days.clamp(0, 3650);
        let shutdown_secs = self.shutdown_timeout_secs.max(1);
        let format = self.log_format.parse::<LogFormat>().unwrap_or_default();

        EnvConfig {
            scheduler: SchedulerConfig {
                chunk_size,
                idle_interval: Duration::from_millis(idle_ms),
                yield_interval: Duration::from_millis(self.yield_interval_ms),
                retention: Duration::from_secs(retention_secs),
            },
            orchestrator: OrchestratorConfig {
                generation_cost,
                cache_ttl: Duration::from_secs(cache_ttl_secs),
            },
            local_cache: LocalCacheConfig { max_entries },
            ledger: CreditLedgerConfig {
                trial_window: chrono::Duration::days(trial_days),
            },
            log: LogConfig {
                format,
                level: self.log_level,
                output_path: None,
            },
            shutdown_timeout: Duration::from_secs(shutdown_secs),
        }
    }
}

/// Parse an env var, returning `default` on missing or invalid.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    RawConfig::from_env().finish()
}

/// Parse configuration from a TOML document. Absent keys take defaults.
pub fn from_toml_str(source: &str) -> Result<EnvConfig, ConfigError> {
    let raw: RawConfig = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
    if raw.log_format.parse::<LogFormat>().is_err() {
        return Err(ConfigError::InvalidValue {
            key: "log_format",
            value: raw.log_format,
        });
    }
    Ok(raw.finish())
}

impl EnvConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            chunk_size: self.scheduler.chunk_size,
            idle_interval_ms: self.scheduler.idle_interval.as_millis() as u64,
            yield_interval_ms: self.scheduler.yield_interval.as_millis() as u64,
            job_retention_secs: self.scheduler.retention.as_secs(),
            generation_cost: self.orchestrator.generation_cost,
            cache_ttl_secs: self.orchestrator.cache_ttl.as_secs(),
            local_cache_max_entries: self.local_cache.max_entries,
            trial_days: self.ledger.trial_window.num_days(),
            shutdown_timeout_secs: self.shutdown_timeout.as_secs(),
            log_level: self.log.level.clone(),
            log_format: match self.log.format {
                LogFormat::Json => "json".to_string(),
                LogFormat::Pretty => "pretty".to_string(),
            },
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        RawConfig::default().finish()
    }
}
