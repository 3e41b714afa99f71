//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "ORDINAL_TRACKER";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Run stamp from ORDINAL_TRACKER_RUN_STAMP
    pub run_stamp: Option<u64>,
    /// Concurrency limit from ORDINAL_TRACKER_CONCURRENT
    pub concurrent: Option<usize>,
    /// Jitter from ORDINAL_TRACKER_JITTER_MS
    pub jitter_ms: Option<u64>,
    /// Output format from ORDINAL_TRACKER_FORMAT
    pub format: Option<String>,
    /// Log level from ORDINAL_TRACKER_LOG
    pub log: Option<String>,
    /// Plan file from ORDINAL_TRACKER_PLAN
    pub plan: Option<String>,
    /// Config file from ORDINAL_TRACKER_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            run_stamp: get_env_parse("RUN_STAMP"),
            concurrent: get_env_parse("CONCURRENT"),
            jitter_ms: get_env_parse("JITTER_MS"),
            format: get_env("FORMAT"),
            log: get_env("LOG"),
            plan: get_env("PLAN"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.run_stamp.is_some()
            || self.concurrent.is_some()
            || self.jitter_ms.is_some()
            || self.format.is_some()
            || self.log.is_some()
            || self.plan.is_some()
            || self.config_file.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_RUN_STAMP:  {:?}", ENV_PREFIX, self.run_stamp);
        println!("  {}_CONCURRENT: {:?}", ENV_PREFIX, self.concurrent);
        println!("  {}_JITTER_MS:  {:?}", ENV_PREFIX, self.jitter_ms);
        println!("  {}_FORMAT:     {:?}", ENV_PREFIX, self.format);
        println!("  {}_LOG:        {:?}", ENV_PREFIX, self.log);
        println!("  {}_PLAN:       {:?}", ENV_PREFIX, self.plan);
        println!("  {}_CONFIG:     {:?}", ENV_PREFIX, self.config_file);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|v| !v.is_empty())
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.trim().parse().ok())
}

/// Builder for setting environment variables (useful for testing)
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    /// Create a new environment builder
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Set run stamp
    pub fn run_stamp(mut self, run_stamp: u64) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_RUN_STAMP"), run_stamp.to_string()));
        self
    }

    /// Set concurrency limit
    pub fn concurrent(mut self, concurrent: usize) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_CONCURRENT"), concurrent.to_string()));
        self
    }

    /// Set jitter
    pub fn jitter_ms(mut self, ms: u64) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_JITTER_MS"), ms.to_string()));
        self
    }

    /// Set output format
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_FORMAT"), format.into()));
        self
    }

    /// Set log level
    pub fn log(mut self, level: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_LOG"), level.into()));
        self
    }

    /// Set plan file
    pub fn plan(mut self, plan: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_PLAN"), plan.into()));
        self
    }

    /// Apply environment variables
    pub fn apply(self) {
        for (key, value) in self.vars {
            env::set_var(key, value);
        }
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        self.apply();

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all ORDINAL_TRACKER environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_RUN_STAMP   Leading ordinal component of the first run");
    println!("  {ENV_PREFIX}_CONCURRENT  Maximum test bodies running at once");
    println!("  {ENV_PREFIX}_JITTER_MS   Random delay added to each test (ms)");
    println!("  {ENV_PREFIX}_FORMAT      Output format (table, json, json-pretty, csv, summary)");
    println!("  {ENV_PREFIX}_LOG         Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_PLAN        Path to a suite plan (YAML or JSON)");
    println!("  {ENV_PREFIX}_CONFIG      Path to configuration file");
    println!("  RUST_LOG                    Overrides the log filter entirely");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_CONCURRENT=8");
    println!("  export {ENV_PREFIX}_JITTER_MS=25");
    println!("  ordinal-tracker run --rounds 3");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.run_stamp.is_none());
        assert!(config.format.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_env_builder() {
        let _guard = EnvBuilder::new()
            .run_stamp(9)
            .concurrent(12)
            .format("csv")
            .apply_scoped();

        let config = EnvConfig::load();
        assert_eq!(config.run_stamp, Some(9));
        assert_eq!(config.concurrent, Some(12));
        assert_eq!(config.format, Some("csv".to_string()));
        assert!(config.has_any());
    }

    #[test]
    fn test_env_unparsable_number_ignored() {
        let _guard = EnvBuilder::new()
            .jitter_ms(4)
            .log("debug")
            .apply_scoped();
        assert_eq!(EnvConfig::load().jitter_ms, Some(4));
        assert_eq!(EnvConfig::load().log, Some("debug".to_string()));

        let _guard = EnvBuilder {
            vars: vec![(format!("{ENV_PREFIX}_JITTER_MS"), "lots".to_string())],
        }
        .apply_scoped();
        assert_eq!(EnvConfig::load().jitter_ms, None);
    }
}
