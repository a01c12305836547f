use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::render::frame::{Frame, Snapshot, vertical_gradient_paint};
use crate::render::style::{OverlayLayout, OverlayStyle};
use crate::render::text::TextPainter;
use crate::script::model::SceneSpec;

/// Opacity of the fade overlay at `elapsed` seconds into a scene of `duration` seconds.
///
/// Ramps linearly from 1 to 0 over the first `fade` seconds and from 0 back to 1 over the last
/// `fade` seconds. Scenes shorter than two fade windows split their length between the ramps.
pub fn fade_opacity(elapsed: f64, duration: f64, fade: f64) -> f32 {
    if duration.is_nan() || duration <= 0.0 || fade.is_nan() || fade <= 0.0 {
        return 0.0;
    }
    let window = fade.min(duration / 2.0);
    let t = elapsed.clamp(0.0, duration);
    let fade_in = (1.0 - t / window).max(0.0);
    let fade_out = ((t - (duration - window)) / window).max(0.0);
    fade_in.max(fade_out).clamp(0.0, 1.0) as f32
}

/// Fraction of the scene already shown, clamped to `[0, 1]`.
pub fn progress_fraction(elapsed: f64, duration: f64) -> f64 {
    if duration.is_nan() || duration <= 0.0 || !elapsed.is_finite() {
        return 0.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

/// Renders one output frame from a scene snapshot plus a time-dependent overlay.
///
/// Output depends only on the arguments of [`FrameCompositor::compose`]; the render context,
/// target surface and text layouts held here are reusable scratch.
pub struct FrameCompositor {
    canvas: Canvas,
    style: OverlayStyle,
    layout: OverlayLayout,
    fade_secs: f64,

    ctx: Option<vello_cpu::RenderContext>,
    target: vello_cpu::Pixmap,
    header_paint: vello_cpu::Image,
    text: TextPainter,
}

impl FrameCompositor {
    /// Create a compositor for `canvas`.
    ///
    /// Overlay text uses the style's font file when set and the system sans-serif family
    /// otherwise; finding neither is a configuration error.
    pub fn new(canvas: Canvas, style: OverlayStyle, fade_secs: f64) -> PipelineResult<Self> {
        canvas.validate()?;
        if !fade_secs.is_finite() || fade_secs < 0.0 {
            return Err(PipelineError::configuration(
                "fade duration must be finite and >= 0",
            ));
        }
        let text = match style.font_path.as_deref() {
            Some(path) => TextPainter::from_path(path)?,
            None => TextPainter::system_default()?,
        };
        let layout = OverlayLayout::new(canvas, &style);
        let header_h = layout.header.height().ceil().max(1.0) as u32;
        let header_paint = vertical_gradient_paint(
            style.header_top_rgba,
            style.header_bottom_rgba,
            canvas.width,
            header_h,
        )?;
        let (w, h) = canvas_u16(canvas);

        Ok(Self {
            canvas,
            style,
            layout,
            fade_secs,
            ctx: None,
            target: vello_cpu::Pixmap::new(w, h),
            header_paint,
            text,
        })
    }

    /// Output canvas; every composed frame has exactly these dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Font family overlay text is shaped with.
    pub fn font_family(&self) -> &str {
        self.text.family_name()
    }

    /// Overlay geometry used for every frame.
    pub fn layout(&self) -> &OverlayLayout {
        &self.layout
    }

    /// Compose one frame of `scene` at `elapsed` seconds into a scene lasting `duration` seconds.
    ///
    /// A missing snapshot renders the overlay on the style's solid background.
    pub fn compose(
        &mut self,
        snapshot: Option<&Snapshot>,
        scene: &SceneSpec,
        elapsed: f64,
        duration: f64,
        scene_index: usize,
        scene_count: usize,
    ) -> PipelineResult<Frame> {
        let (w, h) = canvas_u16(self.canvas);
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        let drawn = self.draw(
            &mut ctx,
            snapshot,
            scene,
            elapsed,
            duration,
            scene_index,
            scene_count,
        );
        if drawn.is_ok() {
            ctx.flush();
            ctx.render_to_pixmap(&mut self.target);
        }
        self.ctx = Some(ctx);
        drawn?;

        Ok(Frame {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.target.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        snapshot: Option<&Snapshot>,
        scene: &SceneSpec,
        elapsed: f64,
        duration: f64,
        scene_index: usize,
        scene_count: usize,
    ) -> PipelineResult<()> {
        let full = self.canvas.rect();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        // Background: always laid down so partially transparent captures stay deterministic.
        fill_solid(ctx, full, self.style.background_rgba);
        if let Some(snap) = snapshot {
            let sx = f64::from(self.canvas.width) / f64::from(snap.width());
            let sy = f64::from(self.canvas.height) / f64::from(snap.height());
            ctx.set_transform(vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy));
            ctx.set_paint(snap.paint());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(snap.width()),
                f64::from(snap.height()),
            ));
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        }

        let header = self.layout.header;
        if header.height() > 0.0 {
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((header.x0, header.y0)));
            ctx.set_paint(self.header_paint.clone());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                header.width(),
                header.height(),
            ));
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        }

        let text = &mut self.text;
        if !scene.title.is_empty() {
            let title = text.layout(
                &scene.title,
                self.layout.title_px,
                self.style.title_rgba.into(),
                true,
            )?;
            text.draw(ctx, &title, self.layout.title_origin);
        }
        if !scene.caption.is_empty() {
            let caption = text.layout(
                &scene.caption,
                self.layout.caption_px,
                self.style.caption_rgba.into(),
                false,
            )?;
            text.draw(ctx, &caption, self.layout.caption_origin);
        }

        fill_solid(ctx, self.layout.track, self.style.track_rgba);
        let fill = self
            .layout
            .progress_fill(progress_fraction(elapsed, duration));
        if fill.width() > 0.0 {
            fill_solid(ctx, fill, self.style.fill_rgba);
        }

        let label = format!("{} / {}", scene_index + 1, scene_count);
        let counter = self.text.layout(
            &label,
            self.layout.counter_px,
            self.style.counter_rgba.into(),
            false,
        )?;
        let x = self.layout.counter_right - f64::from(counter.width());
        self.text.draw(
            ctx,
            &counter,
            crate::foundation::core::Point::new(x, self.layout.counter_top),
        );

        let opacity = fade_opacity(elapsed, duration, self.fade_secs);
        if opacity > 0.0 {
            let [r, g, b] = self.style.fade_rgb;
            let a = (opacity * 255.0).round().clamp(0.0, 255.0) as u8;
            fill_solid(ctx, full, [r, g, b, a]);
        }
        Ok(())
    }
}

fn fill_solid(ctx: &mut vello_cpu::RenderContext, rect: Rect, rgba: [u8; 4]) {
    if rgba[3] == 0 {
        return;
    }
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        rgba[0], rgba[1], rgba[2], rgba[3],
    ));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        rect.x0, rect.y0, rect.x1, rect.y1,
    ));
}

fn canvas_u16(canvas: Canvas) -> (u16, u16) {
    // `Canvas::validate` guarantees both dimensions fit.
    (canvas.width as u16, canvas.height as u16)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
