//! Notification message template.

use std::fmt;
use thiserror::Error;

/// Placeholder replaced by the notification label.
pub const LABEL_PLACEHOLDER: &str = "{label}";

/// Template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "'{label}' cannot be ground in a quern.";

/// Error returned when a template is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template never mentions the label
    #[error("message template {0:?} does not contain the {{label}} placeholder")]
    MissingLabelPlaceholder(String),
}

/// Message text with a `{label}` placeholder.
///
/// # Example
/// ```
/// use quern_notify::MessageTemplate;
///
/// let template = MessageTemplate::default();
/// assert_eq!(template.render("Flint"), "'Flint' cannot be ground in a quern.");
///
/// assert!(MessageTemplate::new("nothing to see").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    text: String,
}

impl MessageTemplate {
    /// Create a template. It must contain `{label}` at least once.
    pub fn new(text: impl Into<String>) -> Result<Self, TemplateError> {
        let text = text.into();
        if !text.contains(LABEL_PLACEHOLDER) {
            return Err(TemplateError::MissingLabelPlaceholder(text));
        }
        Ok(Self { text })
    }

    /// Substitute `label` verbatim for every placeholder.
    pub fn render(&self, label: &str) -> String {
        self.text.replace(LABEL_PLACEHOLDER, label)
    }

    /// The raw template text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
