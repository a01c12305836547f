//! Narration: decoding, duration measurement, and the playback clock the pipeline paces against.

/// ffmpeg-backed PCM decoding.
pub mod decode;
/// Audio driver contract, playback clock and the silent driver.
pub mod driver;
/// Narration asset driver.
pub mod narration;
