//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (CAIRN_*)
//! 2. TOML config file (if CAIRN_CONFIG_FILE set)
//! 3. Built-in defaults

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::access::{AccessTokens, TokenGrant};
use crate::instance::InstanceDirectory;

mod validation;

pub use validation::ConfigError;

/// Which surface the binary serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// HTTP admin and note routes.
    #[default]
    Http,
    /// MCP tools over stdin/stdout.
    Stdio,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (CAIRN_*)
/// 2. TOML config file (if CAIRN_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding the persistent cache and notes.
    ///
    /// Set via CAIRN_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Socket address for the HTTP transport.
    ///
    /// Set via CAIRN_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Served surface: `http` or `stdio`.
    ///
    /// Set via CAIRN_TRANSPORT environment variable.
    #[serde(default)]
    pub transport: Transport,

    /// Maximum entries held by the in-memory cache.
    ///
    /// Set via CAIRN_MEMORY_CACHE_CAPACITY environment variable.
    #[serde(default = "default_memory_cache_capacity")]
    pub memory_cache_capacity: usize,

    /// Id of this instance.
    ///
    /// Set via CAIRN_INSTANCE_ID environment variable.
    #[serde(default = "default_instance_id")]
    pub instance_id: String,

    /// Peer instances: id to base URL.
    ///
    /// Set in the TOML file under `[instances]`, or via CAIRN_INSTANCES__<ID>.
    #[serde(default)]
    pub instances: BTreeMap<String, String>,

    /// Timeout for requests forwarded to peer instances, in milliseconds.
    ///
    /// Set via CAIRN_INSTANCE_TIMEOUT_MS environment variable.
    #[serde(default = "default_instance_timeout_ms")]
    pub instance_timeout_ms: u64,

    /// User the stdio transport acts as (with admin rights).
    ///
    /// Set via CAIRN_OPERATOR_ID environment variable.
    #[serde(default = "default_operator_id")]
    pub operator_id: String,

    /// Bearer token presented to peers when the caller has none (stdio transport).
    ///
    /// Set via CAIRN_PEER_TOKEN environment variable.
    #[serde(default)]
    pub peer_token: Option<String>,

    /// Bearer tokens accepted by the HTTP transport.
    ///
    /// Set in the TOML file under `[tokens.<token>]`.
    #[serde(default)]
    pub tokens: BTreeMap<String, TokenGrant>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./cairn.sqlite")
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".into()
}

fn default_memory_cache_capacity() -> usize {
    5_000
}

fn default_instance_id() -> String {
    "local".into()
}

fn default_instance_timeout_ms() -> u64 {
    5_000
}

fn default_operator_id() -> String {
    "operator".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind_addr: default_bind_addr(),
            transport: Transport::default(),
            memory_cache_capacity: default_memory_cache_capacity(),
            instance_id: default_instance_id(),
            instances: BTreeMap::new(),
            instance_timeout_ms: default_instance_timeout_ms(),
            operator_id: default_operator_id(),
            peer_token: None,
            tokens: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Peer request timeout as Duration for use with reqwest/tokio.
    pub fn instance_timeout(&self) -> Duration {
        Duration::from_millis(self.instance_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `CAIRN_`
    /// 2. TOML file from `CAIRN_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("CAIRN_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("CAIRN_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Directory of this instance and its peers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a peer URL does not parse.
    pub fn instance_directory(&self) -> Result<InstanceDirectory, ConfigError> {
        InstanceDirectory::new(self.instance_id.clone(), &self.instances)
            .map_err(|e| ConfigError::Invalid { field: "instances".into(), reason: e.to_string() })
    }

    /// Token table for the HTTP transport.
    pub fn access_tokens(&self) -> AccessTokens {
        AccessTokens::new(self.tokens.clone())
    }
}
