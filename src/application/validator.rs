//! Fail-closed capability validation.
//!
//! The validator wraps a [`Strategy`] and guarantees a plain boolean answer:
//! a missing subject, an inspection error and a panic inside the strategy all
//! become "cannot proceed". Faults are reported through `tracing`, never to
//! the caller.

use crate::domain::capability::ValidationError;
use crate::domain::strategy::{CapabilityStrategy, Strategy};
use crate::domain::subject::Subject;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, warn};

/// Detailed outcome of a validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The subject is acceptable
    Proceed,
    /// The subject was assessed and is not acceptable
    Reject,
    /// The subject could not be assessed; treated as not acceptable
    Fault(ValidationError),
}

impl Verdict {
    /// Whether the subject may proceed.
    pub fn can_proceed(&self) -> bool {
        matches!(self, Verdict::Proceed)
    }
}

/// Capability predicate with a fail-closed contract.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    strategy: Strategy,
}

impl Validator {
    /// Create a validator using `strategy`.
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    /// The active strategy.
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// `true` only if `subject` is present and acceptable.
    pub fn can_proceed(&self, subject: Option<&dyn Subject>) -> bool {
        self.assess(subject).can_proceed()
    }

    /// Assess `subject`, reporting why it cannot proceed.
    pub fn assess(&self, subject: Option<&dyn Subject>) -> Verdict {
        let Some(subject) = subject else {
            debug!(strategy = self.strategy.name(), "no subject to validate");
            return Verdict::Reject;
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.strategy.evaluate(subject)));

        match outcome {
            Ok(Ok(true)) => Verdict::Proceed,
            Ok(Ok(false)) => {
                debug!(
                    code = subject.code(),
                    strategy = self.strategy.name(),
                    "subject cannot proceed"
                );
                Verdict::Reject
            }
            Ok(Err(e)) => {
                warn!(
                    code = subject.code(),
                    strategy = self.strategy.name(),
                    error = %e,
                    "could not validate subject; treating as unable to proceed"
                );
                Verdict::Fault(e)
            }
            Err(payload) => {
                let e = ValidationError::Panicked(panic_message(payload.as_ref()));
                error!(
                    strategy = self.strategy.name(),
                    error = %e,
                    "validation strategy panicked; treating as unable to proceed"
                );
                Verdict::Fault(e)
            }
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
