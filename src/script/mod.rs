//! Authored scene scripts.

/// Scene records and script loading/validation.
pub mod model;
