// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Font resource: raw payload plus a cache of loaded faces
//!
//! A [`Font`] owns its payload bytes and lazily builds one [`FontFace`]
//! per effective point size. Faces whose backing textures were lost
//! (device reset) are evicted and rebuilt on the next request; load
//! failures are logged and yield no face, without caching the failure.

use crate::conv::to_u32;
use crate::env::FontEnv;
use crate::face::{FaceLoadError, FontFace};
use crate::{bitmap, outline, raster, MAX_POINT_SIZE, MIN_POINT_SIZE};
use std::collections::HashMap;

/// Font kind, detected from the resource's file extension at load time
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FontKind {
    /// Vector font requiring rasterization (`.ttf`, `.otf`)
    Outline,
    /// Pre-baked glyph sheet (`.xml`, `.fnt`)
    Bitmap,
    /// Unrecognized extension: payload is held but no face can be loaded
    Unknown,
}

/// A font resource
pub struct Font {
    name: String,
    data: Vec<u8>,
    kind: FontKind,
    faces: HashMap<i32, FontFace>,
    memory_use: u32,
}

impl Font {
    /// Construct from a resource name and raw payload
    ///
    /// The kind is detected once, here, from the name's extension. An
    /// unrecognized extension leaves the font usable for byte storage
    /// only: [`Font::get_face`] will always fail.
    pub fn load(name: impl Into<String>, data: Vec<u8>) -> Result<Self, FaceLoadError> {
        if data.is_empty() {
            return Err(FaceLoadError::EmptyData);
        }
        let name = name.into();
        let kind = detect_kind(&name);
        let memory_use = to_u32(data.len());
        Ok(Font {
            name,
            data,
            kind,
            faces: HashMap::new(),
            memory_use,
        })
    }

    /// Resource name this font was loaded from
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Detected font kind
    #[inline]
    pub fn kind(&self) -> FontKind {
        self.kind
    }

    /// Number of currently cached faces
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Memory estimate: payload bytes plus all cached page textures
    #[inline]
    pub fn memory_use(&self) -> u32 {
        self.memory_use
    }

    /// Get or load the face for `point_size`
    ///
    /// Headless operation (`env.gfx == None`) never loads and returns
    /// `None` unconditionally. Bitmap fonts ignore the requested size
    /// and always resolve the single fixed-size face; outline sizes are
    /// clamped into `[MIN_POINT_SIZE, MAX_POINT_SIZE]`.
    pub fn get_face(&mut self, env: &mut FontEnv<'_>, point_size: i32) -> Option<&FontFace> {
        if env.gfx.is_none() {
            return None;
        }
        if self.kind == FontKind::Unknown {
            return None;
        }
        let key = cache_key(self.kind, point_size);

        match self.faces.get(&key).map(|face| face.is_lost()) {
            Some(false) => return self.faces.get(&key),
            Some(true) => {
                // Texture data lost: evict and fall through to reload
                if let Some(face) = self.faces.remove(&key) {
                    self.memory_use = self.memory_use.saturating_sub(face.texture_memory());
                }
            }
            None => (),
        }

        let gfx = match env.gfx.as_mut() {
            Some(gfx) => &mut **gfx,
            None => return None,
        };
        let result = match self.kind {
            FontKind::Outline => outline::load(raster::context(), &self.data, key, gfx),
            FontKind::Bitmap => match env.resources.as_mut() {
                Some(resources) => {
                    bitmap::load(&self.data, path_prefix(&self.name), gfx, &mut **resources)
                }
                None => Err(FaceLoadError::PageImage("no resource access".into())),
            },
            FontKind::Unknown => unreachable!(),
        };

        match result {
            Ok(face) => {
                self.memory_use += face.texture_memory();
                self.faces.insert(key, face);
                self.faces.get(&key)
            }
            Err(err) => {
                log::error!("Could not load font face '{}' ({key}pt): {err}", self.name);
                None
            }
        }
    }
}

/// Effective cache key for a requested point size
pub(crate) fn cache_key(kind: FontKind, point_size: i32) -> i32 {
    match kind {
        // A bitmap font provides one fixed-size face regardless of the
        // requested size
        FontKind::Bitmap => 0,
        _ => point_size.clamp(MIN_POINT_SIZE, MAX_POINT_SIZE),
    }
}

fn detect_kind(name: &str) -> FontKind {
    let ext = name.rfind('.').map(|i| &name[i + 1..]).unwrap_or("");
    if ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf") {
        FontKind::Outline
    } else if ext.eq_ignore_ascii_case("xml") || ext.eq_ignore_ascii_case("fnt") {
        FontKind::Bitmap
    } else {
        FontKind::Unknown
    }
}

/// Directory part of a resource name, including the trailing separator
fn path_prefix(name: &str) -> &str {
    match name.rfind('/') {
        Some(i) => &name[..=i],
        None => "",
    }
}
