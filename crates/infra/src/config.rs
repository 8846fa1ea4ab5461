//! Process configuration from `PLEDGE_*` environment variables.
//!
//! | Variable                        | Default |
//! |---------------------------------|---------|
//! | `PLEDGE_LOG_FORMAT`             | `json`  |
//! | `PLEDGE_DELIVERY_FEE`           | `25.00` |
//! | `PLEDGE_FREE_DELIVERY_THRESHOLD`| `500.00`|
//! | `PLEDGE_MIN_QTY_PER_ORDER`      | `5`     |
//! | `PLEDGE_MAX_QTY_PER_ORDER`      | `1000`  |
//! | `PLEDGE_MIN_ORDER_PRICE`        | `100.00`|

use core::str::FromStr;

use thiserror::Error;

use pledge_core::DomainError;
use pledge_observability::LogFormat;
use pledge_sales::OrderSettings;

pub const LOG_FORMAT: &str = "PLEDGE_LOG_FORMAT";
pub const DELIVERY_FEE: &str = "PLEDGE_DELIVERY_FEE";
pub const FREE_DELIVERY_THRESHOLD: &str = "PLEDGE_FREE_DELIVERY_THRESHOLD";
pub const MIN_QTY_PER_ORDER: &str = "PLEDGE_MIN_QTY_PER_ORDER";
pub const MAX_QTY_PER_ORDER: &str = "PLEDGE_MAX_QTY_PER_ORDER";
pub const MIN_ORDER_PRICE: &str = "PLEDGE_MIN_ORDER_PRICE";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("inconsistent order settings: {0}")]
    Settings(#[from] DomainError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub log_format: LogFormat,
    pub order_settings: OrderSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; unset keys keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();
        let settings = &mut config.order_settings;

        if let Some(v) = parse(&lookup, LOG_FORMAT)? {
            config.log_format = v;
        }
        if let Some(v) = parse(&lookup, DELIVERY_FEE)? {
            settings.delivery.flat_fee = v;
        }
        if let Some(v) = parse(&lookup, FREE_DELIVERY_THRESHOLD)? {
            settings.delivery.free_threshold = v;
        }
        if let Some(v) = parse(&lookup, MIN_QTY_PER_ORDER)? {
            settings.min_qty_per_order = v;
        }
        if let Some(v) = parse(&lookup, MAX_QTY_PER_ORDER)? {
            settings.max_qty_per_order = v;
        }
        if let Some(v) = parse(&lookup, MIN_ORDER_PRICE)? {
            settings.min_order_price = v;
        }

        config.order_settings.validate()?;
        Ok(config)
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse().map(Some).map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })
}
