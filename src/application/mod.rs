//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages the runtime behavior:
//! - Dedup store (per-location window state)
//! - Validator (fail-closed capability check)
//! - Dispatcher (the notify pipeline)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod dispatcher;
pub mod metrics;
pub mod ports;
pub mod store;
pub mod validator;
