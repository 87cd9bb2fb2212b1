//! HTTP surface for taskdeck.
//!
//! The binary in `main.rs` wires configuration and startup sequencing; the
//! router, handlers, and error mapping live in [`http`] so the integration
//! tests can drive the service in-process.

/// Router, state, extractors, and handlers.
pub mod http;

pub use http::{AppState, build_router};
