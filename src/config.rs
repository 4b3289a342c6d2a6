use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Inbox capacity of the inventory and order store.
    pub store_buffer: usize,
    pub customer_buffer: usize,
    /// Pending notifications beyond this are dropped, never waited on.
    pub notification_queue: usize,
    pub max_commit_retries: u32,
    pub admin_email: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_buffer: 64,
            customer_buffer: 32,
            notification_queue: 128,
            max_commit_retries: 5,
            admin_email: "admin@localhost".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup, falling back to the defaults for
    /// keys it does not know.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            store_buffer: load_capacity(&lookup, "CHECKOUT_STORE_BUFFER", defaults.store_buffer)?,
            customer_buffer: load_capacity(&lookup, "CHECKOUT_CUSTOMER_BUFFER", defaults.customer_buffer)?,
            notification_queue: load_capacity(&lookup, "CHECKOUT_NOTIFY_QUEUE", defaults.notification_queue)?,
            max_commit_retries: try_load(&lookup, "CHECKOUT_MAX_COMMIT_RETRIES", defaults.max_commit_retries)?,
            admin_email: try_load(&lookup, "CHECKOUT_ADMIN_EMAIL", defaults.admin_email)?,
        };

        if config.admin_email.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "CHECKOUT_ADMIN_EMAIL",
                value: config.admin_email,
                reason: "must not be blank".to_string(),
            });
        }
        Ok(config)
    }
}

fn try_load<T>(lookup: impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                value,
                reason: e.to_string(),
            }
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

/// Channel capacities of zero are rejected by tokio.
fn load_capacity(
    lookup: impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: usize,
) -> Result<usize, ConfigError> {
    let value = try_load(lookup, key, default)?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}
