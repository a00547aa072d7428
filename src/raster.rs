// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Support for rastering outline glyphs
//!
//! [`RasterContext`] is the process-wide rasterization service: it owns
//! the parameters shared by every outline face load (DPI, atlas page
//! bounds). A lazily constructed singleton is available via [`context`],
//! but loaders always receive an explicit `&RasterContext` rather than
//! reaching for global state. Font operations are expected to run on a
//! single owning thread; no internal locking is performed beyond the
//! one-time construction of the singleton.

use crate::conv::DPU;
use crate::{FONT_DPI, FONT_TEXTURE_MAX_SIZE, FONT_TEXTURE_MIN_SIZE};
use ab_glyph::Font;
use easy_cast::*;
use std::sync::LazyLock;
use ttf_parser::{Face, GlyphId};

/// Process-wide rasterization parameters
#[derive(Clone, Debug, PartialEq)]
pub struct RasterContext {
    dpi: f32,
    page_min: i32,
    page_max: i32,
}

impl RasterContext {
    /// Construct with explicit parameters
    ///
    /// `page_min`/`page_max` bound the atlas page extent on both axes.
    pub fn new(dpi: f32, page_min: i32, page_max: i32) -> Self {
        RasterContext {
            dpi,
            page_min,
            page_max,
        }
    }

    /// Pixels per Em for a point size at this context's DPI
    #[inline]
    pub fn dpem(&self, point_size: i32) -> f32 {
        point_size as f32 * self.dpi / 72.0
    }

    /// Initial atlas page extent
    #[inline]
    pub fn page_min(&self) -> i32 {
        self.page_min
    }

    /// Maximum atlas page extent
    #[inline]
    pub fn page_max(&self) -> i32 {
        self.page_max
    }
}

impl Default for RasterContext {
    fn default() -> Self {
        RasterContext::new(FONT_DPI, FONT_TEXTURE_MIN_SIZE, FONT_TEXTURE_MAX_SIZE)
    }
}

static CONTEXT: LazyLock<RasterContext> = LazyLock::new(RasterContext::default);

/// Access the [`RasterContext`] singleton
///
/// Constructed on first use and live until process exit.
pub fn context() -> &'static RasterContext {
    &CONTEXT
}

/// Metrics access for a parsed face at a fixed scale
#[derive(Copy, Clone, Debug)]
pub(crate) struct ScaledFace<'a> {
    face: &'a Face<'a>,
    dpu: DPU,
}

impl<'a> ScaledFace<'a> {
    /// Construct, given pixels per Em
    pub fn new(face: &'a Face<'a>, dpem: f32) -> Self {
        let dpu = DPU(dpem / f32::from(face.units_per_em()));
        ScaledFace { face, dpu }
    }

    /// Horizontal advance, without shaping or kerning
    ///
    /// `None` indicates a glyph without horizontal metrics.
    #[inline]
    pub fn h_advance(&self, id: GlyphId) -> Option<f32> {
        let x = self.face.glyph_hor_advance(id)?;
        Some(self.dpu.u16_to_px(x))
    }

    /// Ascender in pixels
    #[inline]
    pub fn ascent(&self) -> f32 {
        self.dpu.i16_to_px(self.face.ascender())
    }

    /// Line pitch (ascender − descender + line gap) in pixels
    #[inline]
    pub fn line_height(&self) -> f32 {
        self.dpu.i16_to_px(self.face.height()) + self.dpu.i16_to_px(self.face.line_gap())
    }

    /// Convert a font-unit kerning value to pixels
    #[inline]
    pub fn kerning_to_px(&self, value: i16) -> i16 {
        self.dpu.i16_to_px(value).cast_nearest()
    }
}

/// A rastered glyph image
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Sprite {
    /// Placement relative to the pen position (x right, y down from baseline)
    pub offset: (i32, i32),
    /// Size of the sprite in pixels
    pub size: (u32, u32),
    /// Grayscale coverage, row major order, length `size.0 * size.1`
    pub data: Vec<u8>,
}

/// `ab_glyph` scale equivalent to `dpem` pixels per Em
pub(crate) fn px_scale(font: &ab_glyph::FontRef, units_per_em: u16, dpem: f32) -> ab_glyph::PxScale {
    (dpem * font.height_unscaled() / f32::from(units_per_em)).into()
}

/// Raster a single glyph
///
/// Returns `None` if the glyph has no outline or covers no pixels
/// (whitespace).
pub(crate) fn raster_glyph(
    font: &ab_glyph::FontRef,
    id: u16,
    scale: ab_glyph::PxScale,
) -> Option<Sprite> {
    let glyph = ab_glyph::Glyph {
        id: ab_glyph::GlyphId(id),
        scale,
        position: ab_glyph::point(0.0, 0.0),
    };
    let outline = font.outline_glyph(glyph)?;

    let bounds = outline.px_bounds();
    let offset = (bounds.min.x.cast_trunc(), bounds.min.y.cast_trunc());
    let size = bounds.max - bounds.min;
    let size = (u32::conv_trunc(size.x), u32::conv_trunc(size.y));
    if size.0 == 0 || size.1 == 0 {
        return None; // nothing to draw
    }

    let mut data = vec![0; usize::conv(size.0 * size.1)];
    outline.draw(|x, y, c| {
        // Convert to u8 with saturating conversion, rounding down:
        data[usize::conv((y * size.0) + x)] = (c * 256.0) as u8;
    });

    Some(Sprite { offset, size, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpem_at_default_dpi() {
        let ctx = RasterContext::default();
        // 96 DPI: one point is 4/3 pixels
        assert_eq!(ctx.dpem(12), 16.0);
        assert_eq!(ctx.dpem(96), 128.0);
    }

    #[test]
    fn singleton_uses_defaults() {
        let ctx = context();
        assert_eq!(*ctx, RasterContext::default());
        assert_eq!(ctx.page_min(), FONT_TEXTURE_MIN_SIZE);
        assert_eq!(ctx.page_max(), FONT_TEXTURE_MAX_SIZE);
    }
}
