//! HMO Assistant - conversational profile collection and retrieval-augmented QA.
//!
//! A turn either gathers the member profile through a structured-output
//! completion, or answers a question from the pre-embedded service corpus.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
