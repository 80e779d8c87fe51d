//! Configuration loading
//!
//! A TOML file (`teamup.toml` by default) supplies the store connection,
//! admin PIN and tuning knobs; `TEAMUP_*` environment variables override the
//! file so deployments can keep credentials out of it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "teamup.toml";
pub const DEFAULT_GROUP_SIZE: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    /// Shared admin PIN; admin commands are unavailable when unset.
    #[serde(default)]
    pub admin_pin: Option<String>,
    #[serde(default = "default_group_size")]
    pub default_group_size: usize,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            admin_pin: None,
            default_group_size: DEFAULT_GROUP_SIZE,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the hosted backend project.
    #[serde(default)]
    pub url: String,
    /// API key sent as both `apikey` and bearer token.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_registrations_table")]
    pub registrations_table: String,
    #[serde(default = "default_groups_table")]
    pub groups_table: String,
    #[serde(default = "default_applications_table")]
    pub applications_table: String,
    #[serde(default = "default_team_members_table")]
    pub team_members_table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            registrations_table: default_registrations_table(),
            groups_table: default_groups_table(),
            applications_table: default_applications_table(),
            team_members_table: default_team_members_table(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window_secs: 60,
        }
    }
}

fn default_group_size() -> usize {
    DEFAULT_GROUP_SIZE
}

fn default_registrations_table() -> String {
    "registrations".into()
}

fn default_groups_table() -> String {
    "groups".into()
}

fn default_applications_table() -> String {
    "project_applications".into()
}

fn default_team_members_table() -> String {
    "team_members".into()
}

impl Config {
    /// Load configuration from an explicit path, or `teamup.toml` in the
    /// working directory if present, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Config::default()
                }
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("TEAMUP_STORE_URL") {
            self.store.url = url;
        }
        if let Ok(key) = std::env::var("TEAMUP_STORE_KEY") {
            self.store.api_key = key;
        }
        if let Ok(pin) = std::env::var("TEAMUP_ADMIN_PIN") {
            self.admin_pin = Some(pin);
        }
    }

    /// Fail early when the hosted store is not configured.
    pub fn require_store(&self) -> Result<&StoreConfig> {
        if self.store.url.is_empty() || self.store.api_key.is_empty() {
            return Err(Error::Config(
                "store URL and API key must be set (teamup.toml or TEAMUP_STORE_URL/TEAMUP_STORE_KEY)"
                    .into(),
            ));
        }
        Ok(&self.store)
    }
}
