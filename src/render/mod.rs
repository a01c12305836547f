//! CPU frame composition: scene snapshot background plus title, caption, progress and fade overlay.

/// Per-frame compositor.
pub mod compositor;
/// Frame and snapshot pixel containers.
pub mod frame;
/// Overlay style and geometry.
pub mod style;
pub(crate) mod text;
