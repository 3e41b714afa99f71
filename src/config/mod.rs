//! Configuration module
//!
//! Handles loading and managing configuration.

mod env;
mod file;

pub use env::{print_env_help, EnvBuilder, EnvConfig, EnvGuard};
pub use file::{config_locations, find_config, resolve};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;
use crate::utils::LogLevel;

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Leading ordinal component of the first run
    pub run_stamp: u64,

    /// Maximum test bodies running at once
    pub max_concurrent: usize,

    /// Upper bound of random delay added to each test
    pub jitter_ms: u64,

    /// Output format name
    pub format: String,

    /// Log level name
    pub log_level: String,

    /// Suite plan to run instead of the built-in demo
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            run_stamp: 0,
            max_concurrent: 4,
            jitter_ms: 0,
            format: "table".to_string(),
            log_level: "info".to_string(),
            plan: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            anyhow::bail!("max_concurrent must be at least 1");
        }
        if OutputFormat::from_str(&self.format).is_none() {
            anyhow::bail!(
                "Unknown output format '{}'. Valid formats: {}",
                self.format,
                OutputFormat::names().join(", ")
            );
        }
        if LogLevel::from_str(&self.log_level).is_none() {
            anyhow::bail!(
                "Unknown log level '{}'. Valid levels: trace, debug, info, warn, error",
                self.log_level
            );
        }
        Ok(())
    }

    /// Apply environment overrides (set variables take precedence)
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(run_stamp) = env.run_stamp {
            self.run_stamp = run_stamp;
        }
        if let Some(concurrent) = env.concurrent {
            self.max_concurrent = concurrent;
        }
        if let Some(jitter_ms) = env.jitter_ms {
            self.jitter_ms = jitter_ms;
        }
        if let Some(format) = &env.format {
            self.format = format.clone();
        }
        if let Some(level) = &env.log {
            self.log_level = level.clone();
        }
        if let Some(plan) = &env.plan {
            self.plan = Some(PathBuf::from(plan));
        }
    }

    /// Parsed output format, falling back to table
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_str(&self.format).unwrap_or(OutputFormat::Table)
    }

    /// Parsed log level, falling back to info
    pub fn level(&self) -> LogLevel {
        LogLevel::from_str(&self.log_level).unwrap_or(LogLevel::Info)
    }

    /// Generate example configuration
    pub fn example() -> Self {
        Self {
            run_stamp: 0,
            max_concurrent: 4,
            jitter_ms: 20,
            format: "table".to_string(),
            log_level: "info".to_string(),
            plan: Some(PathBuf::from("suites.yaml")),
        }
    }
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
