//! # Configuration Module
//!
//! Centralizes the numeric constants of the file format and the engine.
//! Several of these values are interdependent (the node header must fit in
//! front of the cell-pointer array, the 100-byte file header must leave
//! room for a node on page 1), so they live in one place with compile-time
//! checks instead of being scattered across the codebase.
//!
//! ## Module Organization
//!
//! - [`constants`]: all numeric configuration values with dependency
//!   documentation

pub mod constants;
pub use constants::*;
