use crate::foundation::core::Canvas;
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use std::sync::Arc;

/// A composed output frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**; the `premultiplied` flag makes this explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl Frame {
    /// RGBA of the pixel at `(x, y)`.
    ///
    /// Panics when the coordinate is outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

/// One still capture of a scene's view, already sized to the output canvas.
///
/// Captured exactly once per scene and shared read-only by every frame of that scene.
#[derive(Clone)]
pub struct Snapshot {
    width: u32,
    height: u32,
    paint: vello_cpu::Image,
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Snapshot {
    /// Build a snapshot from a straight-alpha RGBA image, resampling it to `canvas`.
    pub fn from_rgba_image(img: &image::RgbaImage, canvas: Canvas) -> PipelineResult<Self> {
        if img.width() == 0 || img.height() == 0 {
            return Err(PipelineError::configuration("snapshot image is empty"));
        }
        let mut bytes = if img.dimensions() == (canvas.width, canvas.height) {
            img.as_raw().clone()
        } else {
            image::imageops::resize(
                img,
                canvas.width,
                canvas.height,
                image::imageops::FilterType::Triangle,
            )
            .into_raw()
        };
        premultiply_rgba8_in_place(&mut bytes);
        Self::from_premul_bytes(&bytes, canvas.width, canvas.height)
    }

    /// Build a snapshot from premultiplied RGBA8 bytes without resampling.
    pub fn from_premul_bytes(bytes: &[u8], width: u32, height: u32) -> PipelineResult<Self> {
        let pixmap = pixmap_from_premul_bytes(bytes, width, height)?;
        Ok(Self {
            width,
            height,
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        self.paint.clone()
    }
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> PipelineResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PipelineError::configuration("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PipelineError::configuration("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(PipelineError::configuration("pixmap byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    let opaque = bytes.chunks_exact(4).all(|px| px[3] == 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, !opaque,
    ))
}

/// Vertical two-stop gradient as a premultiplied image paint (straight-alpha stops).
pub(crate) fn vertical_gradient_paint(
    top: [u8; 4],
    bottom: [u8; 4],
    width: u32,
    height: u32,
) -> PipelineResult<vello_cpu::Image> {
    let (width, height) = (width.max(1), height.max(1));
    let mut bytes = vec![0u8; (width as usize) * (height as usize) * 4];
    let h1 = (height - 1) as f32;
    for y in 0..height {
        let t = if h1 <= 0.0 { 0.0 } else { (y as f32) / h1 };
        let lerp = |a: u8, b: u8| -> u8 {
            let af = a as f32;
            let bf = b as f32;
            (af + (bf - af) * t).round().clamp(0.0, 255.0) as u8
        };
        let c = [
            lerp(top[0], bottom[0]),
            lerp(top[1], bottom[1]),
            lerp(top[2], bottom[2]),
            lerp(top[3], bottom[3]),
        ];
        let row = (y as usize) * (width as usize) * 4;
        for x in 0..width as usize {
            bytes[row + x * 4..row + x * 4 + 4].copy_from_slice(&c);
        }
    }
    premultiply_rgba8_in_place(&mut bytes);
    let pixmap = pixmap_from_premul_bytes(&bytes, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
