// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Glyph metrics and lookup tables

#![allow(clippy::len_without_is_empty)]

use crate::conv::to_usize;
use std::collections::HashMap;

/// One rastered or pre-baked character image descriptor
///
/// `width == 0` or `height == 0` marks a whitespace/invisible glyph; the
/// position fields are then meaningless (zeroed), though `advance_x` may
/// still be significant.
#[derive(Clone, Debug, Default)]
pub struct FontGlyph {
    /// Pixel width
    pub width: i16,
    /// Pixel height
    pub height: i16,
    /// Pen-relative horizontal placement
    pub offset_x: i16,
    /// Placement below the text-row top
    pub offset_y: i16,
    /// Horizontal advance to the next pen position
    pub advance_x: i16,
    /// Index of the atlas page holding this glyph's pixels
    pub page: u32,
    /// Atlas x origin
    pub x: i32,
    /// Atlas y origin
    pub y: i32,
    /// Kerning adjustment keyed by the following glyph's table index
    ///
    /// Sparse: absent pairs are neutral (zero).
    pub(crate) kerning: HashMap<u16, i16>,
}

/// Per-face mapping from character code to glyph metrics
///
/// Glyph indices are contiguous in `0..len()`; every mapping value is a
/// valid index. The table is immutable after the load pass that built it.
#[derive(Debug, Default)]
pub struct GlyphTable {
    glyphs: Vec<FontGlyph>,
    mapping: HashMap<u32, u32>,
    has_kerning: bool,
}

impl GlyphTable {
    pub(crate) fn new(glyphs: Vec<FontGlyph>, mapping: HashMap<u32, u32>, has_kerning: bool) -> Self {
        debug_assert!(mapping.values().all(|i| to_usize(*i) < glyphs.len()));
        GlyphTable {
            glyphs,
            mapping,
            has_kerning,
        }
    }

    /// Number of glyphs in the table
    #[inline]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Number of characters with a mapped glyph
    #[inline]
    pub fn num_mapped(&self) -> usize {
        self.mapping.len()
    }

    /// Whether the face carries kerning data
    #[inline]
    pub fn has_kerning(&self) -> bool {
        self.has_kerning
    }

    /// Look up the glyph for a character
    pub fn glyph(&self, c: char) -> Option<&FontGlyph> {
        let index = *self.mapping.get(&u32::from(c))?;
        Some(&self.glyphs[to_usize(index)])
    }

    /// Access a glyph by table index
    #[inline]
    pub fn glyph_by_index(&self, index: usize) -> Option<&FontGlyph> {
        self.glyphs.get(index)
    }

    /// Kerning adjustment for the ordered pair `(first, second)`
    ///
    /// Returns 0 for any pair not present in the table and for any pair
    /// involving a line break.
    pub fn kerning(&self, first: char, second: char) -> i16 {
        if !self.has_kerning || first == '\n' || second == '\n' {
            return 0;
        }
        let Some(left) = self.mapping.get(&u32::from(first)) else {
            return 0;
        };
        let Some(right) = self.mapping.get(&u32::from(second)) else {
            return 0;
        };
        // Kerning keys are u16; an index beyond that range cannot have an entry
        let Ok(right) = u16::try_from(*right) else {
            return 0;
        };
        self.glyphs[to_usize(*left)]
            .kerning
            .get(&right)
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> GlyphTable {
        let mut a = FontGlyph {
            width: 4,
            height: 6,
            advance_x: 5,
            ..Default::default()
        };
        a.kerning.insert(1, -2);
        let b = FontGlyph {
            advance_x: 3,
            ..Default::default()
        };
        let mut mapping = HashMap::new();
        mapping.insert(u32::from('A'), 0);
        mapping.insert(u32::from('V'), 1);
        GlyphTable::new(vec![a, b], mapping, true)
    }

    #[test]
    fn lookup() {
        let table = table();
        assert_eq!(table.len(), 2);
        assert_eq!(table.num_mapped(), 2);
        assert_eq!(table.glyph('A').unwrap().width, 4);
        assert_eq!(table.glyph('V').unwrap().advance_x, 3);
        assert!(table.glyph('x').is_none());
    }

    #[test]
    fn kerning_pairs() {
        let table = table();
        assert_eq!(table.kerning('A', 'V'), -2);
        // Reversed pair is not in the table
        assert_eq!(table.kerning('V', 'A'), 0);
        // Unknown characters are neutral
        assert_eq!(table.kerning('A', 'x'), 0);
        assert_eq!(table.kerning('x', 'V'), 0);
    }

    #[test]
    fn kerning_ignores_line_breaks() {
        let mut a = FontGlyph::default();
        a.kerning.insert(1, 7);
        let b = FontGlyph::default();
        let mut mapping = HashMap::new();
        mapping.insert(u32::from('A'), 0);
        mapping.insert(u32::from('\n'), 1);
        let table = GlyphTable::new(vec![a, b], mapping, true);
        assert_eq!(table.kerning('A', '\n'), 0);
        assert_eq!(table.kerning('\n', 'A'), 0);
    }

    #[test]
    fn kerning_index_out_of_range_is_neutral() {
        let mut glyphs = vec![FontGlyph::default(); usize::from(u16::MAX) + 2];
        glyphs[0].kerning.insert(u16::MAX, -5);
        let mut mapping = HashMap::new();
        mapping.insert(u32::from('A'), 0);
        mapping.insert(u32::from('Z'), u32::from(u16::MAX));
        mapping.insert(u32::from('B'), u32::from(u16::MAX) + 1);
        let table = GlyphTable::new(glyphs, mapping, true);
        assert_eq!(table.kerning('A', 'Z'), -5);
        // An index beyond u16 must not alias the entry keyed u16::MAX
        assert_eq!(table.kerning('A', 'B'), 0);
    }

    #[test]
    fn kerning_disabled() {
        let mut a = FontGlyph::default();
        a.kerning.insert(1, 7);
        let mut mapping = HashMap::new();
        mapping.insert(u32::from('A'), 0);
        mapping.insert(u32::from('V'), 1);
        let table = GlyphTable::new(vec![a, FontGlyph::default()], mapping, false);
        assert_eq!(table.kerning('A', 'V'), 0);
    }
}
