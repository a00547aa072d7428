// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Mock collaborators shared between unit tests

use crate::env::{PageImage, ResourceError, Resources, Texture, TextureError, TextureProvider};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct MockTexture {
    width: u32,
    height: u32,
    lost: Arc<AtomicBool>,
}

impl Texture for MockTexture {
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
    fn is_lost(&self) -> bool {
        self.lost.load(Ordering::Relaxed)
    }
}

/// Texture provider counting realizations, with controllable data loss
#[derive(Default)]
pub struct MockGfx {
    pub(crate) created: usize,
    pub fail: bool,
    pub(crate) lost: Arc<AtomicBool>,
}

impl MockGfx {
    /// Number of textures realized so far
    pub fn created(&self) -> usize {
        self.created
    }

    /// Mark all textures created so far as lost
    ///
    /// Textures created afterwards are live again.
    pub fn lose_textures(&mut self) {
        self.lost.store(true, Ordering::Relaxed);
        self.lost = Arc::new(AtomicBool::new(false));
    }
}

impl TextureProvider for MockGfx {
    fn create_texture(&mut self, image: &PageImage) -> Result<Box<dyn Texture>, TextureError> {
        if self.fail {
            return Err(TextureError);
        }
        self.created += 1;
        Ok(Box::new(MockTexture {
            width: image.width,
            height: image.height,
            lost: self.lost.clone(),
        }))
    }
}

/// In-memory resource store
#[derive(Default)]
pub struct MemResources(HashMap<String, Vec<u8>>);

impl MemResources {
    pub fn insert(&mut self, path: &str, data: Vec<u8>) {
        self.0.insert(path.to_string(), data);
    }
}

impl Resources for MemResources {
    fn read(&mut self, path: &str) -> Result<Vec<u8>, ResourceError> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError(path.to_string()))
    }
}

/// Encode a small opaque PNG for use as a page image
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
    image
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
    bytes
}
