//! Encoding sinks.
//!
//! Sinks consume composed frames in timeline order and are driven by [`crate::Pipeline::run`].

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait, run artifact and the in-memory sink.
pub mod sink;
