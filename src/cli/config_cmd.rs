//! Config CLI subcommands: show, defaults, validate.

use crate::config::{EffectiveConfig, EnvConfig};

/// Print effective config as key-value pairs to stdout.
pub fn run_show(config: &EnvConfig) {
    print_config(&config.effective_config());
}

/// Print default config values (no env overrides) to stdout.
pub fn run_defaults() {
    print_config(&EnvConfig::default().effective_config());
}

/// Validate configuration for obvious misconfigurations.
///
/// Returns 0 if valid, 1 if any warnings are found.
pub fn run_validate(config: &EnvConfig) -> i32 {
    let warnings = validate(&config.effective_config());
    for w in &warnings {
        eprintln!("WARNING: {w}");
    }
    if warnings.is_empty() {
        println!("Configuration is valid.");
        0
    } else {
        1
    }
}

fn validate(cfg: &EffectiveConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    if cfg.generation_cost == 0 {
        warnings.push("FORGE_GENERATION_COST is 0; generations are free".to_string());
    }
    if cfg.cache_ttl_secs > cfg.job_retention_secs.saturating_mul(24 * 30) {
        warnings.push(format!(
            "FORGE_CACHE_TTL_SECS ({}) is far beyond the job retention window ({})",
            cfg.cache_ttl_secs, cfg.job_retention_secs
        ));
    }
    if cfg.idle_interval_ms < cfg.yield_interval_ms {
        warnings.push(format!(
            "FORGE_IDLE_INTERVAL_MS ({}) < FORGE_YIELD_INTERVAL_MS ({})",
            cfg.idle_interval_ms, cfg.yield_interval_ms
        ));
    }
    warnings
}

fn print_config(cfg: &EffectiveConfig) {
    println!("FORGE_CHUNK_SIZE={}", cfg.chunk_size);
    println!("FORGE_IDLE_INTERVAL_MS={}", cfg.idle_interval_ms);
    println!("FORGE_YIELD_INTERVAL_MS={}", cfg.yield_interval_ms);
    println!("FORGE_JOB_RETENTION_SECS={}", cfg.job_retention_secs);
    println!("FORGE_GENERATION_COST={}", cfg.generation_cost);
    println!("FORGE_CACHE_TTL_SECS={}", cfg.cache_ttl_secs);
    println!("FORGE_LOCAL_CACHE_MAX_ENTRIES={}", cfg.local_cache_max_entries);
    println!("FORGE_TRIAL_DAYS={}", cfg.trial_days);
    println!("FORGE_SHUTDOWN_TIMEOUT={}", cfg.shutdown_timeout_secs);
    println!("FORGE_LOG_LEVEL={}", cfg.log_level);
    println!("FORGE_LOG_FORMAT={}", cfg.log_format);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_clean() {
        assert!(validate(&EnvConfig::default().effective_config()).is_empty());
    }

    #[test]
    fn free_generation_warns() {
        let mut cfg = EnvConfig::default().effective_config();
        cfg.generation_cost = 0;
        assert_eq!(validate(&cfg).len(), 1);
    }

    #[test]
    fn inverted_intervals_warn() {
        let mut cfg = EnvConfig::default().effective_config();
        cfg.idle_interval_ms = 1;
        cfg.yield_interval_ms = 50;
        assert_eq!(validate(&cfg).len(), 1);
    }
}
