use crate::foundation::core::{Canvas, Point, Rect};
use std::path::PathBuf;

/// Colors, proportions and font for the per-frame overlay.
///
/// Colors are straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Height of the header band as a fraction of frame height.
    pub header_fraction: f64,
    /// Header gradient color at the top edge.
    pub header_top_rgba: [u8; 4],
    /// Header gradient color at the bottom edge of the band.
    pub header_bottom_rgba: [u8; 4],
    /// Solid background used when a scene has no snapshot.
    pub background_rgba: [u8; 4],
    /// Fade color; its alpha is driven by the fade ramp.
    pub fade_rgb: [u8; 3],
    /// Progress bar background track.
    pub track_rgba: [u8; 4],
    /// Progress bar filled portion.
    pub fill_rgba: [u8; 4],
    /// Title text.
    pub title_rgba: [u8; 4],
    /// Caption text.
    pub caption_rgba: [u8; 4],
    /// Scene counter text.
    pub counter_rgba: [u8; 4],
    /// TrueType/OpenType font used for all overlay text. Unset means the system sans-serif family.
    pub font_path: Option<PathBuf>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            header_fraction: 0.07,
            header_top_rgba: [0, 0, 0, 200],
            header_bottom_rgba: [0, 0, 0, 70],
            background_rgba: [17, 24, 39, 255],
            fade_rgb: [0, 0, 0],
            track_rgba: [255, 255, 255, 64],
            fill_rgba: [99, 102, 241, 255],
            title_rgba: [255, 255, 255, 255],
            caption_rgba: [226, 232, 240, 230],
            counter_rgba: [255, 255, 255, 220],
            font_path: None,
        }
    }
}

/// Overlay geometry for one canvas size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayLayout {
    /// Header gradient band across the top.
    pub header: Rect,
    /// Top-left of the title text box.
    pub title_origin: Point,
    /// Title font size in pixels.
    pub title_px: f32,
    /// Top-left of the caption text box.
    pub caption_origin: Point,
    /// Caption font size in pixels.
    pub caption_px: f32,
    /// Full-width progress track.
    pub track: Rect,
    /// Right edge the scene counter is aligned to.
    pub counter_right: f64,
    /// Top of the scene counter text box.
    pub counter_top: f64,
    /// Counter font size in pixels.
    pub counter_px: f32,
}

impl OverlayLayout {
    /// Compute the layout for `canvas`.
    pub fn new(canvas: Canvas, style: &OverlayStyle) -> Self {
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let margin_x = w * 0.02;
        let margin_y = h * 0.012;

        let header = Rect::new(0.0, 0.0, w, h * style.header_fraction.clamp(0.0, 1.0));
        let title_px = (h * 0.028) as f32;
        let caption_px = (h * 0.018) as f32;
        let title_origin = Point::new(margin_x, margin_y);
        let caption_origin = Point::new(margin_x, margin_y + f64::from(title_px) * 1.2);

        let bar_h = (h * 0.006).max(2.0);
        let bar_y = h - h * 0.035 - bar_h;
        let counter_reserve = w * 0.08;
        let track = Rect::new(margin_x, bar_y, w - margin_x - counter_reserve, bar_y + bar_h);

        let counter_px = (h * 0.02) as f32;
        Self {
            header,
            title_origin,
            title_px,
            caption_origin,
            caption_px,
            track,
            counter_right: w - margin_x,
            counter_top: bar_y + bar_h * 0.5 - f64::from(counter_px) * 0.6,
            counter_px,
        }
    }

    /// Filled portion of the track for a progress fraction (clamped to `[0, 1]`).
    pub fn progress_fill(&self, fraction: f64) -> Rect {
        let f = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Rect::new(
            self.track.x0,
            self.track.y0,
            self.track.x0 + self.track.width() * f,
            self.track.y1,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/style.rs"]
mod tests;
