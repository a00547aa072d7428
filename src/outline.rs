// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Outline (vector) font face loading
//!
//! Drives the rasterizer over every glyph reachable from the font's
//! character map, packs the resulting bitmaps into atlas pages via
//! [`AreaAllocator`], normalizes opacity across the face and harvests
//! kerning pairs from the `kern` table.

use crate::alloc::AreaAllocator;
use crate::conv::{to_u32, to_usize};
use crate::env::{PageImage, Texture, TextureProvider};
use crate::face::{FaceLoadError, FontFace};
use crate::glyph::{FontGlyph, GlyphTable};
use crate::raster::{self, RasterContext, ScaledFace, Sprite};
use ab_glyph::Font as _;
use easy_cast::{Cast, CastFloat, Conv, ConvFloat};
use smallvec::SmallVec;
use std::collections::HashMap;
use ttf_parser::{kern, Face, GlyphId};

/// Load an outline face at `point_size`
pub(crate) fn load(
    ctx: &RasterContext,
    data: &[u8],
    point_size: i32,
    gfx: &mut dyn TextureProvider,
) -> Result<FontFace, FaceLoadError> {
    if point_size <= 0 {
        return Err(FaceLoadError::InvalidPointSize);
    }
    if data.is_empty() {
        return Err(FaceLoadError::EmptyData);
    }

    let face = Face::parse(data, 0)?;
    let font = ab_glyph::FontRef::try_from_slice(data)?;

    let dpem = ctx.dpem(point_size);
    let scaled = ScaledFace::new(&face, dpem);
    let scale = raster::px_scale(&font, face.units_per_em(), dpem);

    // Build the code → glyph index mapping. The glyph count is the
    // maximum index encountered + 1; a font with sparse or high indices
    // wastes table space (accepted inefficiency, do not "fix" silently).
    let mut mapping = HashMap::new();
    let mut num_glyphs: u32 = 0;
    if let Some(cmap) = face.tables().cmap {
        for subtable in cmap.subtables {
            if !subtable.is_unicode() {
                continue;
            }
            subtable.codepoints(|code| {
                if let Some(id) = subtable.glyph_index(code) {
                    if id.0 != 0 {
                        num_glyphs = num_glyphs.max(u32::from(id.0) + 1);
                        mapping.insert(code, u32::from(id.0));
                    }
                }
            });
        }
    }

    log::debug!("Outline face ({point_size}pt) has {num_glyphs} glyphs");

    // Metrics pass: per-glyph failures degrade to empty glyphs
    let ascent = scaled.ascent();
    let mut max_height: i32 = 0;
    let mut glyphs = Vec::with_capacity(to_usize(num_glyphs));
    for index in 0..num_glyphs {
        let id = GlyphId(index.cast());
        let mut glyph = FontGlyph::default();
        if let Some(advance) = scaled.h_advance(id) {
            glyph.advance_x = advance.cast_nearest();
            let outlined = font.outline_glyph(ab_glyph::Glyph {
                id: ab_glyph::GlyphId(id.0),
                scale,
                position: ab_glyph::point(0.0, 0.0),
            });
            if let Some(outlined) = outlined {
                let bounds = outlined.px_bounds();
                glyph.width = (bounds.max.x - bounds.min.x).cast_trunc();
                glyph.height = (bounds.max.y - bounds.min.y).cast_trunc();
                glyph.offset_x = bounds.min.x.cast_trunc();
                glyph.offset_y = (ascent + bounds.min.y).cast_trunc();
                max_height = max_height.max(i32::from(glyph.height));
            }
        }
        glyphs.push(glyph);
    }

    // Kerning pairs from the kern table. O(N²) over the glyph count;
    // acceptable at typical glyph counts, a scaling limit beyond that.
    let mut has_kerning = false;
    if let Some(table) = face.tables().kern {
        if table
            .subtables
            .into_iter()
            .any(|st| st.horizontal && !st.variable)
        {
            has_kerning = true;
            for i in 0..num_glyphs {
                for j in 0..num_glyphs {
                    let left = GlyphId(i.cast());
                    let right = GlyphId(j.cast());
                    if let Some(units) = kerning_units(&table, left, right) {
                        let px = scaled.kerning_to_px(units);
                        if px != 0 {
                            glyphs[to_usize(i)].kerning.insert(j.cast(), px);
                        }
                    }
                }
            }
        }
    }

    // Use the tallest observed glyph if taller than the reported pitch
    let row_height = i32::conv_ceil(scaled.line_height()).max(max_height);

    // Atlas packing, then render each page's glyphs into its pixel buffer
    let pages = pack_glyphs(&mut glyphs, ctx.page_min(), ctx.page_max());
    let mut images: Vec<PageImage> = pages
        .iter()
        .map(|&(w, h)| PageImage::new_alpha(w.cast(), h.cast()))
        .collect();

    let mut sum_opacity: u32 = 0;
    let mut samples: u32 = 0;
    for (index, glyph) in glyphs.iter().enumerate() {
        if glyph.width <= 0 || glyph.height <= 0 {
            continue;
        }
        let image = &mut images[to_usize(glyph.page)];
        if let Some(sprite) = raster::raster_glyph(&font, to_u32(index).cast(), scale) {
            let peak = blit(&sprite, glyph, image);
            if peak > 0 {
                sum_opacity += u32::from(peak);
                samples += 1;
            }
        }
    }

    // Rescale if the face renders at less than full opacity (thin outlines)
    if let Some(factor) = opacity_scale(sum_opacity, samples) {
        for glyph in &glyphs {
            if glyph.width <= 0 || glyph.height <= 0 {
                continue;
            }
            rescale(&mut images[to_usize(glyph.page)], glyph, factor);
        }
    }

    let mut textures: SmallVec<[Box<dyn Texture>; 1]> = SmallVec::with_capacity(images.len());
    let mut texture_memory: u32 = 0;
    for image in &images {
        let texture = gfx.create_texture(image)?;
        texture_memory += image.byte_size();
        textures.push(texture);
    }

    let table = GlyphTable::new(glyphs, mapping, has_kerning);
    Ok(FontFace::new(
        point_size,
        row_height,
        table,
        textures,
        texture_memory,
    ))
}

fn kerning_units(table: &kern::Table, left: GlyphId, right: GlyphId) -> Option<i16> {
    table
        .subtables
        .into_iter()
        .filter(|st| st.horizontal && !st.variable)
        .find_map(|st| st.glyphs_kerning(left, right))
}

/// Assign atlas positions and page indices to `glyphs`
///
/// Packs glyphs in index order, one allocator per page, reserving a
/// 1-pixel border around each glyph against filter bleed. When a glyph
/// fails to pack the page is finished and the next page starts at that
/// glyph. Returns the (width, height) of every produced page.
pub(crate) fn pack_glyphs(
    glyphs: &mut [FontGlyph],
    page_min: i32,
    page_max: i32,
) -> Vec<(i32, i32)> {
    let mut pages = Vec::new();
    let mut start = 0;
    while start < glyphs.len() {
        let page = to_u32(pages.len());
        let mut alloc = AreaAllocator::new(page_min, page_min, page_max, page_max);
        let mut end = glyphs.len();
        for index in start..glyphs.len() {
            let glyph = &mut glyphs[index];
            if glyph.width > 0 && glyph.height > 0 {
                match alloc.allocate(i32::from(glyph.width) + 1, i32::from(glyph.height) + 1) {
                    Some((x, y)) => {
                        glyph.x = x;
                        glyph.y = y;
                        glyph.page = page;
                    }
                    None => {
                        end = index;
                        break;
                    }
                }
            } else {
                glyph.x = 0;
                glyph.y = 0;
                glyph.page = 0;
            }
        }

        if end == start {
            // Does not fit even in an empty maximum-size page
            let glyph = &mut glyphs[start];
            log::warn!(
                "Glyph {start} ({}×{}) exceeds the maximum page size",
                glyph.width,
                glyph.height
            );
            glyph.width = 0;
            glyph.height = 0;
            glyph.offset_x = 0;
            glyph.offset_y = 0;
            glyph.x = 0;
            glyph.y = 0;
            glyph.page = 0;
            start += 1;
            continue;
        }

        pages.push((alloc.width(), alloc.height()));
        start = end;
    }
    pages
}

/// Copy a rastered sprite into a page at the glyph's atlas position
///
/// Returns the peak coverage value encountered.
fn blit(sprite: &Sprite, glyph: &FontGlyph, image: &mut PageImage) -> u8 {
    let width = to_usize(sprite.size.0).min(usize::conv(glyph.width));
    let height = to_usize(sprite.size.1).min(usize::conv(glyph.height));
    let stride = to_usize(image.width);
    let (x, y) = (usize::conv(glyph.x), usize::conv(glyph.y));

    let mut peak = 0;
    for row in 0..height {
        let src = &sprite.data[row * to_usize(sprite.size.0)..][..width];
        let dest = &mut image.data[(y + row) * stride + x..][..width];
        for (d, s) in dest.iter_mut().zip(src) {
            *d = *s;
            peak = peak.max(*s);
        }
    }
    peak
}

/// Opacity rescaling factor, if one is needed
///
/// `sum` accumulates the peak coverage of each sampled glyph. The mean
/// is floored at 128 to avoid over-brightening faint faces; a mean at
/// full scale needs no rescale. The returned factor is always > 1.
pub(crate) fn opacity_scale(sum: u32, samples: u32) -> Option<f32> {
    if samples == 0 {
        return None;
    }
    let mean = (sum / samples).max(128);
    if mean < 255 {
        Some(255.0 / mean as f32)
    } else {
        None
    }
}

fn rescale(image: &mut PageImage, glyph: &FontGlyph, factor: f32) {
    let stride = to_usize(image.width);
    let (x, y) = (usize::conv(glyph.x), usize::conv(glyph.y));
    for row in 0..usize::conv(glyph.height) {
        let dest = &mut image.data[(y + row) * stride + x..][..usize::conv(glyph.width)];
        for value in dest {
            *value = (f32::from(*value) * factor).min(255.0) as u8;
        }
    }
}
