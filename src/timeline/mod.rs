//! Fitting nominal scene weights to the narration, and pacing frames against it.

/// Fixed-rate frame clock.
pub mod clock;
/// Proportional timeline scaling.
pub mod scaler;
