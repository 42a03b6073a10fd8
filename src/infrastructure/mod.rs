//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - Storage implementations (sharded and single-lock maps)
//! - Senders (tracing, null, in-memory recording)
//! - Configuration and the `Notifier` facade

pub mod config;
pub mod notifier;
pub mod sender;
pub mod storage;

/// Mock implementations for testing.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds. It provides a capturing tracing layer and a
/// scriptable sender.
///
/// To use these mocks in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// quern-notify = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
