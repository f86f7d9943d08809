//! Core type-system components
//!
//! This module contains the result-type lattice shared by every pass that
//! reasons about what an expression produces.

pub mod types;

pub use types::ResultType;
