//! Capability strategies.
//!
//! A strategy answers "can this subject proceed?". Two built-in strategies
//! exist and are interchangeable behind [`CapabilityStrategy`]:
//!
//! - [`DeclaredCapability`]: trust what the subject declares about itself.
//! - [`RegistryScan`]: look the subject up in an ordered list of rules.
//!
//! Strategies may fail. Turning failures into a safe answer is the
//! validator's job, not the strategy's.

use crate::domain::capability::ValidationError;
use crate::domain::rule::Rule;
use crate::domain::subject::Subject;
use std::fmt::Debug;
use std::sync::Arc;

/// Trait for implementing capability checks.
pub trait CapabilityStrategy: Send + Sync + Debug {
    /// Decide whether `subject` is acceptable.
    ///
    /// # Returns
    /// `Ok(true)` if the subject can proceed, `Ok(false)` if it cannot, and an
    /// error if the subject could not be assessed.
    fn evaluate(&self, subject: &dyn Subject) -> Result<bool, ValidationError>;
}

/// Accepts subjects that declare a capability with a result.
///
/// # Example
/// ```
/// use quern_notify::{CapabilityDescriptor, CapabilityStrategy, DeclaredCapability, ItemStack};
///
/// let strategy = DeclaredCapability;
///
/// let flint = ItemStack::new("game:flint");
/// let spelt = ItemStack::new("game:grain-spelt")
///     .with_capability(CapabilityDescriptor::with_result("game:flour-spelt"));
///
/// assert_eq!(strategy.evaluate(&flint), Ok(false));
/// assert_eq!(strategy.evaluate(&spelt), Ok(true));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredCapability;

impl CapabilityStrategy for DeclaredCapability {
    fn evaluate(&self, subject: &dyn Subject) -> Result<bool, ValidationError> {
        Ok(subject.capability()?.is_complete())
    }
}

/// Accepts subjects matched by any rule of a registry.
///
/// Rules are tried in order and the scan stops at the first match. Order
/// affects only how long the scan takes.
#[derive(Debug, Clone, Default)]
pub struct RegistryScan {
    rules: Vec<Arc<dyn Rule>>,
}

impl RegistryScan {
    /// Create a scan over `rules`.
    pub fn new(rules: Vec<Arc<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Number of rules in the registry.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the registry has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Index of the first rule matching `subject`.
    pub fn position(&self, subject: &dyn Subject) -> Option<usize> {
        self.rules.iter().position(|rule| rule.matches(subject))
    }
}

impl CapabilityStrategy for RegistryScan {
    fn evaluate(&self, subject: &dyn Subject) -> Result<bool, ValidationError> {
        Ok(self.position(subject).is_some())
    }
}

/// Convenience enum over the available strategies.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Declared-capability strategy
    Declared(DeclaredCapability),
    /// Registry-scan strategy
    Registry(RegistryScan),
    /// User-provided strategy
    Custom(Arc<dyn CapabilityStrategy>),
}

impl Strategy {
    /// Create a declared-capability strategy.
    pub fn declared() -> Self {
        Strategy::Declared(DeclaredCapability)
    }

    /// Create a registry-scan strategy over `rules`.
    pub fn registry(rules: Vec<Arc<dyn Rule>>) -> Self {
        Strategy::Registry(RegistryScan::new(rules))
    }

    /// Wrap a custom strategy.
    pub fn custom(strategy: impl CapabilityStrategy + 'static) -> Self {
        Strategy::Custom(Arc::new(strategy))
    }

    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Declared(_) => "declared",
            Strategy::Registry(_) => "registry",
            Strategy::Custom(_) => "custom",
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::declared()
    }
}

impl CapabilityStrategy for Strategy {
    fn evaluate(&self, subject: &dyn Subject) -> Result<bool, ValidationError> {
        match self {
            Strategy::Declared(s) => s.evaluate(subject),
            Strategy::Registry(s) => s.evaluate(subject),
            Strategy::Custom(s) => s.evaluate(subject),
        }
    }
}
