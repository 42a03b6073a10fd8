//! Capability descriptors declared by subjects.
//!
//! A subject either declares nothing, or declares a descriptor naming the
//! result it can be turned into. A declared descriptor without a result is
//! incomplete and does not count as a capability.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured capability data carried by a subject.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    /// Code of the result produced by the transformation, if any
    #[serde(default)]
    pub result: Option<String>,
}

impl CapabilityDescriptor {
    /// Descriptor naming a result.
    pub fn with_result(result: impl Into<String>) -> Self {
        Self {
            result: Some(result.into()),
        }
    }

    /// Descriptor that is declared but names no result.
    pub fn empty() -> Self {
        Self { result: None }
    }
}

/// What a subject declares about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability<'a> {
    /// No descriptor at all
    None,
    /// A descriptor is present; it may still lack a result
    Declared(&'a CapabilityDescriptor),
}

impl<'a> Capability<'a> {
    /// Build from an optional descriptor.
    pub fn from_descriptor(descriptor: Option<&'a CapabilityDescriptor>) -> Self {
        match descriptor {
            Some(d) => Capability::Declared(d),
            None => Capability::None,
        }
    }

    /// The declared result, when both descriptor and result are present.
    pub fn result(&self) -> Option<&'a str> {
        match self {
            Capability::Declared(d) => d.result.as_deref(),
            Capability::None => None,
        }
    }

    /// Whether both the descriptor and its result are present.
    pub fn is_complete(&self) -> bool {
        self.result().is_some()
    }
}

/// Failure while inspecting a subject.
///
/// These never reach callers of the validator; they are logged and treated
/// as "cannot proceed".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The subject's capability data could not be interpreted
    #[error("malformed capability data on '{code}': {reason}")]
    MalformedCapability {
        /// Subject code
        code: String,
        /// What was wrong
        reason: String,
    },

    /// The subject could not be inspected at all
    #[error("subject '{code}' could not be inspected: {reason}")]
    Uninspectable {
        /// Subject code
        code: String,
        /// Why inspection failed
        reason: String,
    },

    /// A strategy or rule panicked
    #[error("validation panicked: {0}")]
    Panicked(String),
}
