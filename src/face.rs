// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Font face: the rendering description for one (font, point size) pair

use crate::env::{Texture, TextureError};
use crate::glyph::{FontGlyph, GlyphTable};
use smallvec::SmallVec;
use thiserror::Error;

/// Face loading errors
///
/// None of these are fatal: a failed load yields no renderable face for
/// the requested size and the font remains usable otherwise.
#[derive(Error, Debug)]
pub enum FaceLoadError {
    /// Invalid configuration (point size must be positive)
    #[error("zero or negative point size")]
    InvalidPointSize,
    /// Empty font payload
    #[error("empty font data")]
    EmptyData,
    /// The outline rasterizer rejected the payload
    #[error("could not parse font face")]
    Parse(#[from] ttf_parser::FaceParsingError),
    /// The outline rasterizer could not prepare the payload for rendering
    #[error("could not prepare outline font")]
    Outline(#[from] ab_glyph::InvalidFont),
    /// Malformed glyph-sheet descriptor
    #[error("malformed glyph sheet: {0}")]
    Sheet(String),
    /// Required glyph-sheet section is absent
    #[error("could not find {0} element")]
    MissingElement(&'static str),
    /// Missing or undecodable companion page image
    #[error("could not load page image: {0}")]
    PageImage(String),
    /// Page texture realization failed
    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Complete rendering description for one (font, point size) pair
///
/// Built by one of two loaders (outline or bitmap) sharing this contract.
/// Immutable after loading; replaced wholesale when its backing textures
/// are lost.
pub struct FontFace {
    point_size: i32,
    row_height: i32,
    table: GlyphTable,
    textures: SmallVec<[Box<dyn Texture>; 1]>,
    texture_memory: u32,
}

impl FontFace {
    pub(crate) fn new(
        point_size: i32,
        row_height: i32,
        table: GlyphTable,
        textures: SmallVec<[Box<dyn Texture>; 1]>,
        texture_memory: u32,
    ) -> Self {
        FontFace {
            point_size,
            row_height,
            table,
            textures,
            texture_memory,
        }
    }

    /// Point size this face was built for
    #[inline]
    pub fn point_size(&self) -> i32 {
        self.point_size
    }

    /// Line pitch in pixels
    #[inline]
    pub fn row_height(&self) -> i32 {
        self.row_height
    }

    /// Access the glyph table
    #[inline]
    pub fn glyphs(&self) -> &GlyphTable {
        &self.table
    }

    /// Look up the glyph for a character
    #[inline]
    pub fn glyph(&self, c: char) -> Option<&FontGlyph> {
        self.table.glyph(c)
    }

    /// Kerning adjustment for the ordered pair `(first, second)`
    #[inline]
    pub fn kerning(&self, first: char, second: char) -> i16 {
        self.table.kerning(first, second)
    }

    /// Ordered atlas page textures
    #[inline]
    pub fn textures(&self) -> &[Box<dyn Texture>] {
        &self.textures
    }

    /// Total pixel-area memory estimate over all pages, in bytes
    #[inline]
    pub fn texture_memory(&self) -> u32 {
        self.texture_memory
    }

    /// Whether any backing page texture has lost its data
    pub fn is_lost(&self) -> bool {
        self.textures.iter().any(|t| t.is_lost())
    }
}
