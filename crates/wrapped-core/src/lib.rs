//! Core domain types for the streaming-history report generator.
//!
//! Holds the play-event model, the error taxonomy, the CLI configuration and
//! the pure numeric helpers shared by the data and render crates.

pub mod calculations;
pub mod config;
pub mod error;
pub mod models;
