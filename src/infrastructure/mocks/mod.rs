//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling controlled testing of dispatch logic.

pub mod layer;
pub mod sender;

pub use layer::{CapturedEvent, MockCaptureLayer};
pub use sender::{MockSender, SendBehavior};
