use crate::foundation::core::Point;
use crate::foundation::error::{PipelineError, PipelineResult};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const LAYOUT_CACHE_CAP: usize = 64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<[u8; 4]> for TextBrushRgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LayoutKey {
    text: String,
    size_bits: u32,
    brush: [u8; 4],
    bold: bool,
}

/// Shapes overlay strings with Parley and draws them with `vello_cpu`.
///
/// One family is chosen up front, either registered from a font file or resolved from the
/// system's sans-serif generic family. Layouts are cached by text and style since titles repeat on
/// every frame of a scene.
pub(crate) struct TextPainter {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    cache: HashMap<LayoutKey, Arc<parley::Layout<TextBrushRgba8>>>,
}

impl TextPainter {
    /// Load a font file from disk.
    pub(crate) fn from_path(path: &Path) -> PipelineResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            PipelineError::configuration(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Self::from_font_bytes(bytes)
    }

    /// Register raw font bytes.
    pub(crate) fn from_font_bytes(font_bytes: Vec<u8>) -> PipelineResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            PipelineError::configuration("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PipelineError::configuration("registered font family has no name"))?
            .to_string();

        Ok(Self::with_family(font_ctx, family_name))
    }

    /// Resolve the system's default sans-serif family.
    ///
    /// Fails when the platform font collection has no loadable sans-serif face.
    pub(crate) fn system_default() -> PipelineResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let candidates: Vec<_> = font_ctx
            .collection
            .generic_families(parley::fontique::GenericFamily::SansSerif)
            .collect();

        for id in candidates {
            let Some(family) = font_ctx.collection.family(id) else {
                continue;
            };
            let Some(face) = family.default_font() else {
                continue;
            };
            if face.load(Some(&mut font_ctx.source_cache)).is_none() {
                tracing::debug!(family = family.name(), "sans-serif face failed to load");
                continue;
            }
            let family_name = family.name().to_string();
            tracing::debug!(family = %family_name, "resolved system overlay font");
            return Ok(Self::with_family(font_ctx, family_name));
        }

        Err(PipelineError::configuration(
            "no system sans-serif font found; set the overlay font_path",
        ))
    }

    fn with_family(font_ctx: parley::FontContext, family_name: String) -> Self {
        Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            cache: HashMap::new(),
        }
    }

    /// Family every layout is shaped with.
    pub(crate) fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape a single unwrapped line of text.
    pub(crate) fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
        bold: bool,
    ) -> PipelineResult<Arc<parley::Layout<TextBrushRgba8>>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(PipelineError::configuration(
                "text size_px must be finite and > 0",
            ));
        }
        let key = LayoutKey {
            text: text.to_owned(),
            size_bits: size_px.to_bits(),
            brush: [brush.r, brush.g, brush.b, brush.a],
            bold,
        };
        if let Some(layout) = self.cache.get(&key) {
            return Ok(layout.clone());
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        if bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        if self.cache.len() >= LAYOUT_CACHE_CAP {
            self.cache.clear();
        }
        let layout = Arc::new(layout);
        self.cache.insert(key, layout.clone());
        Ok(layout)
    }

    /// Draw a laid-out text block with its top-left at `origin`.
    pub(crate) fn draw(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        layout: &parley::Layout<TextBrushRgba8>,
        origin: Point,
    ) {
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                // Bold and fallback runs may land on a different face than the family default.
                let font = run.run().font();
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}
