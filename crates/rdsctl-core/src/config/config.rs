//! Configuration management for rdsctl
//!
//! Configuration is stored in TOML format with support for multiple named
//! profiles. Each profile points at one control-plane endpoint and may carry
//! waiter tuning per resource kind.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, Result};
use super::waiters::WaiterConfig;

/// Overrides the resolved profile's API URL
pub const API_URL_ENV: &str = "RDSCTL_API_URL";
/// Overrides the resolved profile's API key
pub const API_KEY_ENV: &str = "RDSCTL_API_KEY";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Individual profile configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    /// Base URL of the control-plane API
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Waiter tuning per resource kind
    #[serde(default, skip_serializing_if = "WaiterConfig::is_empty")]
    pub waiters: WaiterConfig,
}

/// Everything needed to talk to one control plane
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// Name of the profile this came from, if any
    pub profile: Option<String>,
    pub api_url: String,
    pub api_key: Option<String>,
    pub region: Option<String>,
    pub waiters: WaiterConfig,
}

impl Config {
    /// Resolve which profile to use
    ///
    /// Order: explicit name, `default_profile`, then the first profile by
    /// name.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<String> {
        if let Some(name) = explicit_profile {
            if self.profiles.contains_key(name) {
                return Ok(name.to_string());
            }
            return Err(ConfigError::ProfileNotFound {
                name: name.to_string(),
            });
        }

        if let Some(name) = &self.default_profile {
            if self.profiles.contains_key(name) {
                return Ok(name.clone());
            }
            return Err(ConfigError::ProfileNotFound { name: name.clone() });
        }

        self.list_profiles()
            .first()
            .map(|(name, _)| (*name).clone())
            .ok_or(ConfigError::NoProfiles { env: API_URL_ENV })
    }

    /// Get a profile by name
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Build the connection for a command
    ///
    /// `api_url_override` (from the command line) wins over
    /// `RDSCTL_API_URL`, which wins over the profile. Without any profile an
    /// API URL from either override is enough.
    pub fn resolve_connection(
        &self,
        explicit_profile: Option<&str>,
        api_url_override: Option<&str>,
    ) -> Result<Connection> {
        let env_url = std::env::var(API_URL_ENV).ok().filter(|v| !v.is_empty());
        let env_key = std::env::var(API_KEY_ENV).ok().filter(|v| !v.is_empty());
        let url_override = api_url_override.map(str::to_string).or(env_url);

        let resolved = match self.resolve_profile(explicit_profile) {
            Ok(name) => {
                let profile = self.profile(&name)?;
                profile.waiters.validate()?;
                Connection {
                    profile: Some(name),
                    api_url: profile.api_url.clone(),
                    api_key: profile.api_key.clone(),
                    region: profile.region.clone(),
                    waiters: profile.waiters.clone(),
                }
            }
            Err(ConfigError::NoProfiles { .. }) if url_override.is_some() => Connection {
                profile: None,
                api_url: String::new(),
                api_key: None,
                region: None,
                waiters: WaiterConfig::default(),
            },
            Err(e) => return Err(e),
        };

        Ok(Connection {
            api_url: url_override.unwrap_or(resolved.api_url),
            api_key: env_key.or(resolved.api_key),
            ..resolved
        })
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    ///
    /// A missing file yields an empty configuration.
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let config: Config = toml::from_str(&Self::expand_env_vars(&content))?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Get the path to the configuration file
    ///
    /// On Linux: ~/.config/rdsctl/config.toml
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("dev", "rdsctl", "rdsctl").ok_or(ConfigError::ConfigDirError)?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand `${VAR}` and `${VAR:-default}` references
    ///
    /// Unset variables without a default are left as-is so profiles that are
    /// not used do not need their variables set.
    fn expand_env_vars(content: &str) -> String {
        shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok()).to_string()
    }
}
