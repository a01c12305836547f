//! Shared primitives: frame timing, canvas geometry, pixel math and the crate error type.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod math;
