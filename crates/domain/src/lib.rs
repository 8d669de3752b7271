//! # Stride Domain
//!
//! Business domain types and models for Stride.
//!
//! This crate contains:
//! - Run telemetry types (sessions, samples, splits)
//! - Sync bookkeeping types and the wire DTOs for the remote endpoint
//! - Domain error types and Result definitions
//! - Domain constants and display formatting helpers
//!
//! ## Architecture
//! - No dependencies on other Stride crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod constants;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
