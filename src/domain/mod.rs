//! Domain layer - pure decision logic with no external dependencies.
//!
//! This layer contains the core concepts and invariants of the notifier:
//! - Location keys and the dedup window rule
//! - Subjects, capability descriptors and registry rules
//! - Capability strategies
//! - The notification message template
//!
//! All types in this layer are pure and easily testable.

pub mod capability;
pub mod location;
pub mod rule;
pub mod strategy;
pub mod subject;
pub mod template;
pub mod window;
