// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! External collaborators
//!
//! The library produces pixel buffers and placement data; everything on
//! the far side of that boundary (GPU textures, the resource cache and
//! file system) is reached through the traits defined here.

use crate::conv::to_usize;
use thiserror::Error;

/// Pixel buffer for one atlas page
///
/// Outline faces produce single-channel (alpha) pages; bitmap faces keep
/// the channel count of the decoded page image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageImage {
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel (1 = alpha, 4 = RGBA)
    pub components: u32,
    /// Row-major pixel data, length `width × height × components`
    pub data: Vec<u8>,
}

impl PageImage {
    /// Construct a zero-filled single-channel page
    pub fn new_alpha(width: u32, height: u32) -> Self {
        let data = vec![0; to_usize(width) * to_usize(height)];
        PageImage {
            width,
            height,
            components: 1,
            data,
        }
    }

    /// Pixel-area memory estimate in bytes, saturating at `u32::MAX`
    #[inline]
    pub fn byte_size(&self) -> u32 {
        let size = u64::from(self.width) * u64::from(self.height) * u64::from(self.components);
        u32::try_from(size).unwrap_or(u32::MAX)
    }
}

/// Failure to realize a page texture
#[derive(Error, Debug)]
#[error("could not realize page texture")]
pub struct TextureError;

/// Failure to supply companion-file bytes
#[derive(Error, Debug)]
#[error("could not read resource: {0}")]
pub struct ResourceError(pub String);

/// A realized GPU page texture
///
/// Liveness is an out-of-band property: the graphics device may drop
/// texture contents at any time (device reset). The cache polls
/// [`Texture::is_lost`] lazily on the next face request.
pub trait Texture {
    /// Texture width in pixels
    fn width(&self) -> u32;
    /// Texture height in pixels
    fn height(&self) -> u32;
    /// Whether the backing data has been lost
    fn is_lost(&self) -> bool;
}

/// Creates page textures from pixel buffers
///
/// Absence of a provider means headless operation: no face is ever
/// loaded.
pub trait TextureProvider {
    /// Realize a texture from `image`
    fn create_texture(&mut self, image: &PageImage) -> Result<Box<dyn Texture>, TextureError>;
}

/// Supplies bytes for companion files (bitmap-font page images)
///
/// Paths are resolved by the collaborator; the library passes paths
/// relative to the owning font's own path.
pub trait Resources {
    /// Read the full contents of the resource at `path`
    fn read(&mut self, path: &str) -> Result<Vec<u8>, ResourceError>;
}

/// Collaborator bundle passed into [`crate::Font::get_face`]
///
/// `gfx: None` indicates headless operation. `resources` is only needed
/// for bitmap-font faces.
pub struct FontEnv<'a> {
    pub gfx: Option<&'a mut dyn TextureProvider>,
    pub resources: Option<&'a mut dyn Resources>,
}
