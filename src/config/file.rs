//! Configuration file discovery
//!
//! Finds the configuration file and layers environment overrides on top.

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::{AppConfig, EnvConfig};

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./ordinal-tracker.yaml",
    "./ordinal-tracker.yml",
    "./.ordinal-tracker.yaml",
    "~/.config/ordinal-tracker/config.yaml",
];

/// Expanded search locations
pub fn config_locations() -> Vec<PathBuf> {
    CONFIG_LOCATIONS.iter().map(|l| expand_path(l)).collect()
}

/// Find configuration file in standard locations
pub fn find_config() -> Option<PathBuf> {
    config_locations().into_iter().find(|path| path.exists())
}

/// Build the effective configuration.
///
/// An explicit path wins over `ORDINAL_TRACKER_CONFIG`, which wins over the
/// standard locations. Environment overrides are applied on top of whatever
/// file was loaded, and the result is validated.
pub fn resolve(explicit: Option<&Path>, env: &EnvConfig) -> Result<(AppConfig, Option<PathBuf>)> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| env.config_file.as_deref().map(expand_path))
        .or_else(find_config);

    let mut config = match &path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    config.apply_env(env);
    config.validate()?;
    Ok((config, path))
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
