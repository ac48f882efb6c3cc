//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - hosted chat and embedding clients, plus test mocks
//! - `http` - axum REST API

pub mod ai;
pub mod http;
