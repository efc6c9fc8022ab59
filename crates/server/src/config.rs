//! Environment-driven server configuration.

use std::{net::SocketAddr, str::FromStr};

use services::services::recipients::RecipientPolicy;
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://casefeed.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub bind_address: SocketAddr,
    pub recipient_policy: RecipientPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_raw = lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = SocketAddr::from_str(bind_raw.trim()).map_err(|e| ConfigError::InvalidValue {
            name: "BIND_ADDRESS",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let drop_unknown_recipients = match lookup("CASEFEED_DROP_UNKNOWN_RECIPIENTS") {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                name: "CASEFEED_DROP_UNKNOWN_RECIPIENTS",
                value: raw.clone(),
                reason: "expected true/false".to_string(),
            })?,
        };

        Ok(Config {
            database_url,
            bind_address,
            recipient_policy: RecipientPolicy {
                drop_unknown_recipients,
            },
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
