//! Subjects under validation.
//!
//! The dedup store and the dispatcher never look inside a subject; only
//! capability strategies and rules do, through the [`Subject`] trait.

use crate::domain::capability::{Capability, CapabilityDescriptor, ValidationError};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::Debug;

/// An object whose capability is checked before notifying.
///
/// Hosts implement this for their own item or resource types.
pub trait Subject: Debug + Send + Sync {
    /// Stable identifier used by rule matchers, e.g. `game:grain-spelt`.
    fn code(&self) -> &str;

    /// Human-readable name used as the notification label.
    fn display_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.code())
    }

    /// The capability this subject declares.
    ///
    /// Returns an error when the underlying data cannot be interpreted.
    fn capability(&self) -> Result<Capability<'_>, ValidationError> {
        Ok(Capability::None)
    }
}

/// Plain-data subject.
///
/// Suitable for hosts that already flatten their items into codes and for
/// tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item code
    pub code: String,
    /// Display name; falls back to the code
    #[serde(default)]
    pub name: Option<String>,
    /// Declared capability
    #[serde(default)]
    pub capability: Option<CapabilityDescriptor>,
}

impl ItemStack {
    /// Create a stack with no name and no capability.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: None,
            capability: None,
        }
    }

    /// Set the display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a capability descriptor.
    pub fn with_capability(mut self, descriptor: CapabilityDescriptor) -> Self {
        self.capability = Some(descriptor);
        self
    }
}

impl Subject for ItemStack {
    fn code(&self) -> &str {
        &self.code
    }

    fn display_name(&self) -> Cow<'_, str> {
        match &self.name {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Borrowed(self.code.as_str()),
        }
    }

    fn capability(&self) -> Result<Capability<'_>, ValidationError> {
        Ok(Capability::from_descriptor(self.capability.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_code() {
        let stack = ItemStack::new("game:flint");
        assert_eq!(stack.display_name(), "game:flint");

        let stack = stack.named("Flint");
        assert_eq!(stack.display_name(), "Flint");
    }

    #[test]
    fn test_capability_reflects_descriptor() {
        let plain = ItemStack::new("game:flint");
        assert_eq!(plain.capability(), Ok(Capability::None));

        let grain = ItemStack::new("game:grain-spelt")
            .with_capability(CapabilityDescriptor::with_result("game:flour-spelt"));
        assert!(grain.capability().unwrap().is_complete());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let stack: ItemStack = serde_json::from_str(r#"{"code":"game:bone"}"#).unwrap();
        assert_eq!(stack, ItemStack::new("game:bone"));

        let stack: ItemStack = serde_json::from_str(
            r#"{"code":"game:grain-rye","name":"Rye","capability":{"result":"game:flour-rye"}}"#,
        )
        .unwrap();
        assert_eq!(stack.display_name(), "Rye");
        assert_eq!(
            stack.capability.and_then(|c| c.result).as_deref(),
            Some("game:flour-rye")
        );
    }
}
