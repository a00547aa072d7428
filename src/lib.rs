// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Font face rastering and glyph-atlas packing
//!
//! This library turns a raw font payload, either a binary outline font
//! (`.ttf`/`.otf`) or a pre-baked glyph-sheet descriptor (`.xml`/`.fnt`
//! with companion page images), into a [`FontFace`]: a glyph table with
//! kerning data plus one or more packed atlas page textures.
//!
//! GPU upload, text layout and shaping are out of scope. The caller
//! supplies small collaborator traits ([`TextureProvider`], [`Resources`])
//! and receives pixel buffers and geometric placement data back.
//!
//! All work is synchronous and single-threaded: a face is rastered and
//! packed to completion within the [`Font::get_face`] call that requested
//! it. Backing textures may be invalidated out-of-band (device reset);
//! this is detected lazily on the next face request, which rebuilds the
//! face from the retained payload.

mod alloc;
pub use alloc::AreaAllocator;

pub(crate) mod conv;

mod env;
pub use env::*;

mod face;
pub use face::{FaceLoadError, FontFace};

mod font;
pub use font::{Font, FontKind};

mod glyph;
pub use glyph::{FontGlyph, GlyphTable};

pub mod raster;

mod bitmap;
mod outline;

#[cfg(test)]
pub(crate) mod testutil;

/// Smallest accepted outline point size
pub const MIN_POINT_SIZE: i32 = 1;

/// Largest accepted outline point size
pub const MAX_POINT_SIZE: i32 = 96;

/// Rastering DPI: `dpem = point_size × FONT_DPI / 72`
pub const FONT_DPI: f32 = 96.0;

/// Initial extent (both axes) of an atlas page
pub const FONT_TEXTURE_MIN_SIZE: i32 = 128;

/// Maximum extent (both axes) of an atlas page
pub const FONT_TEXTURE_MAX_SIZE: i32 = 2048;
