use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::llm::Provider;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub system: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Option<u64>,
    pub seed: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    profiles: Option<HashMap<String, ProfileConfig>>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot resolve config path: set FNKIT_CONFIG or HOME/XDG_CONFIG_HOME.")]
    NoPath,
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("Config file '{}' does not contain a [profiles] section.", path.display())]
    NoProfiles { path: PathBuf },
    #[error("Profile '{name}' not found in config file '{}'.", path.display())]
    ProfileNotFound { name: String, path: PathBuf },
    #[error("Invalid profile provider '{value}' in profile '{name}'.")]
    InvalidProvider { name: String, value: String },
}

fn read_config() -> Result<(PathBuf, ConfigFile), ConfigError> {
    let path = config_path()?;
    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = toml::from_str(&raw).map_err(|err: toml::de::Error| ConfigError::Parse {
        path: path.clone(),
        message: err.to_string(),
    })?;
    Ok((path, config))
}

pub fn load_profile(name: &str) -> Result<ProfileConfig, ConfigError> {
    let (path, config) = read_config()?;
    let profiles = config
        .profiles
        .ok_or_else(|| ConfigError::NoProfiles { path: path.clone() })?;

    let profile = profiles
        .get(name)
        .cloned()
        .ok_or_else(|| ConfigError::ProfileNotFound {
            name: name.to_string(),
            path,
        })?;
    check_profile(name, &profile)?;
    Ok(profile)
}

/// Parses the config file and checks every profile (or only `profile`).
pub fn validate_config(profile: Option<&str>) -> Result<PathBuf, ConfigError> {
    if let Some(name) = profile {
        load_profile(name)?;
        return config_path();
    }

    let (path, config) = read_config()?;
    let profiles = config
        .profiles
        .ok_or_else(|| ConfigError::NoProfiles { path: path.clone() })?;
    for (name, profile) in &profiles {
        check_profile(name, profile)?;
    }
    Ok(path)
}

fn check_profile(name: &str, profile: &ProfileConfig) -> Result<(), ConfigError> {
    if let Some(value) = &profile.provider {
        value
            .parse::<Provider>()
            .map_err(|_| ConfigError::InvalidProvider {
                name: name.to_string(),
                value: value.clone(),
            })?;
    }
    Ok(())
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = env::var("FNKIT_CONFIG") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed).join("fnkit").join("config.toml"));
        }
    }

    let home = env::var("HOME").map_err(|_| ConfigError::NoPath)?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("fnkit")
        .join("config.toml"))
}
