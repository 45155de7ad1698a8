//! Data layer for the streaming-history report generator.
//!
//! Discovers and parses export files, normalizes both export schemas into
//! [`wrapped_core::models::PlayEvent`] records, and computes every aggregate
//! the report sections consume.

pub mod aggregator;
pub mod loader;
pub mod normalizer;
