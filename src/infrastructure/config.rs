//! Notifier configuration.
//!
//! [`NotifierConfig`] is the data half of the configuration: everything that
//! can live in a host's settings file. Behavior (the capability strategy and
//! the sender) is supplied to the builder in code.

use crate::domain::template::{TemplateError, DEFAULT_TEMPLATE};
use crate::domain::window::{ClockRegression, DEFAULT_WINDOW_MS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when building a notifier fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Dedup window must be greater than zero
    #[error("dedup window must be greater than 0 ms")]
    ZeroWindow,

    /// Message template is unusable
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Serializable notifier settings.
///
/// Every field has a default, so partial documents deserialize:
///
/// ```
/// use quern_notify::NotifierConfig;
///
/// let config: NotifierConfig = serde_json::from_str(r#"{ "window_ms": 1000 }"#).unwrap();
/// assert_eq!(config.window_ms, 1000);
/// assert_eq!(config.message_template, "'{label}' cannot be ground in a quern.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Dedup window in milliseconds
    pub window_ms: u64,
    /// Message template containing `{label}`
    pub message_template: String,
    /// Handling of timestamps earlier than the last send
    pub clock_regression: ClockRegression,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            message_template: DEFAULT_TEMPLATE.to_string(),
            clock_regression: ClockRegression::default(),
        }
    }
}
