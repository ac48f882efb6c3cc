//! HTTP adapters for the chat API

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::ChatAppState;
pub use routes::routes;
