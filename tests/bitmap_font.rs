// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! End-to-end bitmap font loading through the public API

use fontpage::{
    AreaAllocator, Font, FontEnv, PageImage, ResourceError, Resources, Texture, TextureError,
    TextureProvider,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct TestTexture {
    width: u32,
    height: u32,
    lost: Arc<AtomicBool>,
}

impl Texture for TestTexture {
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

#[derive(Default)]
struct TestGfx {
    created: usize,
    lost: Arc<AtomicBool>,
}

impl TestGfx {
    fn lose_textures(&mut self) {
        self.lost.store(true, Ordering::Relaxed);
        self.lost = Arc::new(AtomicBool::new(false));
    }
}

impl TextureProvider for TestGfx {
    fn create_texture(&mut self, image: &PageImage) -> Result<Box<dyn Texture>, TextureError> {
        self.created += 1;
        Ok(Box::new(TestTexture {
            width: image.width,
            height: image.height,
            lost: self.lost.clone(),
        }))
    }
}

#[derive(Default)]
struct TestResources(HashMap<String, Vec<u8>>);

impl Resources for TestResources {
    fn read(&mut self, path: &str) -> Result<Vec<u8>, ResourceError> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError(path.to_string()))
    }
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]))
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
    bytes
}

const SHEET: &str = r#"<?xml version="1.0"?>
<font>
  <info face="demo" size="24"/>
  <common lineHeight="28" pages="2"/>
  <pages>
    <page id="0" file="demo_0.png"/>
    <page id="1" file="demo_1.png"/>
  </pages>
  <chars count="3">
    <char id="65" x="2" y="2" width="14" height="18" xoffset="1" yoffset="4" xadvance="15" page="0"/>
    <char id="86" x="20" y="2" width="14" height="18" xoffset="0" yoffset="4" xadvance="14" page="1"/>
    <char id="32" x="0" y="0" width="0" height="0" xoffset="0" yoffset="0" xadvance="7" page="0"/>
  </chars>
  <kernings count="2">
    <kerning first="65" second="86" amount="-3"/>
    <kerning first="86" second="65" amount="-2"/>
  </kernings>
</font>"#;

fn test_env() -> (TestGfx, TestResources) {
    let mut resources = TestResources::default();
    resources.0.insert("ui/demo_0.png".to_string(), png_bytes(64, 64));
    resources.0.insert("ui/demo_1.png".to_string(), png_bytes(32, 32));
    (TestGfx::default(), resources)
}

#[test]
fn multi_page_face() {
    let mut font = Font::load("ui/demo.fnt", SHEET.as_bytes().to_vec()).unwrap();
    let (mut gfx, mut resources) = test_env();
    let mut env = FontEnv {
        gfx: Some(&mut gfx),
        resources: Some(&mut resources),
    };

    let face = font.get_face(&mut env, 99).unwrap();
    assert_eq!(face.point_size(), 24);
    assert_eq!(face.row_height(), 28);
    assert_eq!(face.glyphs().len(), 3);
    assert_eq!(face.textures().len(), 2);
    assert_eq!(face.textures()[0].width(), 64);
    assert_eq!(face.textures()[1].width(), 32);
    assert_eq!(face.texture_memory(), 64 * 64 * 4 + 32 * 32 * 4);

    let a = face.glyph('A').unwrap();
    assert_eq!((a.x, a.y, a.page), (2, 2, 0));
    let v = face.glyph('V').unwrap();
    assert_eq!((v.x, v.y, v.page), (20, 2, 1));

    // Whitespace: zero extents, meaningful advance
    let space = face.glyph(' ').unwrap();
    assert_eq!((space.width, space.height), (0, 0));
    assert_eq!(space.advance_x, 7);

    assert!(face.glyphs().has_kerning());
    assert_eq!(face.kerning('A', 'V'), -3);
    assert_eq!(face.kerning('V', 'A'), -2);
    assert_eq!(face.kerning('A', 'A'), 0);
    assert_eq!(face.kerning('A', '\n'), 0);
}

#[test]
fn device_reset_rebuilds_face() {
    let mut font = Font::load("ui/demo.fnt", SHEET.as_bytes().to_vec()).unwrap();
    let (mut gfx, mut resources) = test_env();

    {
        let mut env = FontEnv {
            gfx: Some(&mut gfx),
            resources: Some(&mut resources),
        };
        assert!(font.get_face(&mut env, 24).is_some());
        assert!(font.get_face(&mut env, 24).is_some());
    }
    assert_eq!(gfx.created, 2, "two pages, one load");

    gfx.lose_textures();
    let mut env = FontEnv {
        gfx: Some(&mut gfx),
        resources: Some(&mut resources),
    };
    let face = font.get_face(&mut env, 24).unwrap();
    assert!(!face.is_lost());
    assert_eq!(gfx.created, 4, "rebuild realizes both pages again");
}

#[test]
fn packing_is_disjoint_across_random_rects() {
    // Deterministic pseudo-random extents
    let mut state: u32 = 0x2545_f491;
    let mut next = move |range: i32| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        ((state >> 16) as i32 % range) + 1
    };

    let mut alloc = AreaAllocator::new(64, 64, 512, 512);
    let mut placed: Vec<(i32, i32, i32, i32)> = Vec::new();
    for _ in 0..200 {
        let (w, h) = (next(40), next(40));
        match alloc.allocate(w, h) {
            Some((x, y)) => {
                assert!(x >= 0 && y >= 0);
                assert!(x + w <= alloc.width() && y + h <= alloc.height());
                for (px, py, pw, ph) in &placed {
                    let overlap = x < px + pw && *px < x + w && y < py + ph && *py < y + h;
                    assert!(!overlap);
                }
                placed.push((x, y, w, h));
            }
            None => {
                // Page full: a fresh allocator takes over (next page)
                alloc = AreaAllocator::new(64, 64, 512, 512);
                placed.clear();
            }
        }
    }
}
