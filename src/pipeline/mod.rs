//! Run orchestration: options, the progress surface and the scene-by-scene driver.

/// Pipeline options and their defaults.
pub mod opts;
/// The orchestrator that sequences narration, capture, composition and encoding.
pub mod orchestrator;
/// Observable run state and the caller-side handle.
pub mod state;
