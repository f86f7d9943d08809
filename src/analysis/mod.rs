//! Passes over expression trees.
//!
//! `checker` is the static type analyzer built on the rule families in
//! `rules`. `substitute` rewrites trees by binding free variables.

pub mod checker;
pub mod rules;
pub mod substitute;

pub use checker::{analyze, TypeAnalyzer, DEFAULT_MAX_DEPTH};
pub use substitute::{substitute, Bindings, Scope, Substituter};
