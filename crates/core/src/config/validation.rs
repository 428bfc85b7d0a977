//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::net::SocketAddr;

use crate::config::{AppConfig, Transport};
use thiserror::Error;
use url::Url;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `memory_cache_capacity` is 0 or exceeds 1,000,000
    /// - `instance_id` or `operator_id` is empty
    /// - an `instances` URL is not an absolute http(s) URL
    /// - `instance_timeout_ms` is less than 100ms or exceeds 1 minute
    /// - `bind_addr` is not a socket address
    /// - a token grant has an empty `user_id`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_cache_capacity == 0 {
            return Err(invalid("memory_cache_capacity", "must be greater than 0"));
        }
        if self.memory_cache_capacity > 1_000_000 {
            return Err(invalid("memory_cache_capacity", "must not exceed 1000000"));
        }

        if self.instance_id.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "instance_id".into(),
                hint: "Set CAIRN_INSTANCE_ID environment variable".into(),
            });
        }

        for (id, raw) in &self.instances {
            let url = Url::parse(raw).map_err(|e| invalid(format!("instances.{id}"), e.to_string()))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(invalid(format!("instances.{id}"), "must be an http or https URL"));
            }
        }

        if self.instance_timeout_ms < 100 {
            return Err(invalid("instance_timeout_ms", "must be at least 100ms"));
        }
        if self.instance_timeout_ms > 60_000 {
            return Err(invalid("instance_timeout_ms", "must not exceed 1 minute (60000ms)"));
        }

        if self.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(invalid("bind_addr", format!("`{}` is not a socket address", self.bind_addr)));
        }

        if self.operator_id.trim().is_empty() {
            return Err(invalid("operator_id", "must not be empty"));
        }

        if let Some(token) = self.tokens.iter().find(|(_, grant)| grant.user_id.trim().is_empty()).map(|(t, _)| t) {
            let shown: String = token.chars().take(4).collect();
            return Err(invalid("tokens", format!("grant for token `{shown}…` has an empty user_id")));
        }

        if self.transport == Transport::Http && self.tokens.is_empty() {
            tracing::warn!("no tokens configured; every HTTP request will be rejected as unauthorized");
        }

        Ok(())
    }
}
