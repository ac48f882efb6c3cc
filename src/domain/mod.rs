//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (validation errors, state machine)
//! - `conversation` - Phases, turns, language detection, prompts
//! - `profile` - Validated user profile and its extraction schema
//! - `retrieval` - Corpus store, cosine similarity, relevance ranking
//! - `metrics` - Running statistics over calls, retrieval and turns

pub mod conversation;
pub mod foundation;
pub mod metrics;
pub mod profile;
pub mod retrieval;
