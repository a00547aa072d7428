// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Bitmap (pre-baked glyph sheet) font face loading
//!
//! Parses a glyph-sheet descriptor (the XML `font` format with `info`,
//! `common`, `pages`, `chars` and optional `kernings` sections) and
//! wraps the referenced page images as textures. No rasterization or
//! packing is performed; point size and row height come straight from
//! the descriptor.

use crate::conv::{to_u32, to_usize};
use crate::env::{PageImage, Resources, Texture, TextureProvider};
use crate::face::{FaceLoadError, FontFace};
use crate::glyph::{FontGlyph, GlyphTable};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::str::FromStr;
use xml::attribute::OwnedAttribute;
use xml::reader::{EventReader, XmlEvent};

#[derive(Clone, Debug, Default)]
pub(crate) struct SheetChar {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub width: i16,
    pub height: i16,
    pub offset_x: i16,
    pub offset_y: i16,
    pub advance_x: i16,
    pub page: u32,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct SheetKerning {
    pub first: u32,
    pub second: u32,
    pub amount: i16,
}

/// Parsed glyph-sheet descriptor
#[derive(Debug, Default)]
pub(crate) struct Sheet {
    pub size: i32,
    pub line_height: i32,
    pub page_files: Vec<String>,
    pub chars: Vec<SheetChar>,
    pub kernings: Vec<SheetKerning>,
    pub has_kernings: bool,
}

fn attr<'a>(attributes: &'a [OwnedAttribute], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| a.name.local_name == name)
        .map(|a| a.value.as_str())
}

/// Numeric attribute; absent or malformed values read as zero
fn num_attr<T: FromStr + Default>(attributes: &[OwnedAttribute], name: &str) -> T {
    attr(attributes, name)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}

/// Parse a glyph-sheet descriptor
///
/// The `font` root and its `info`, `common`, `pages` and `chars`
/// sections are required; `kernings` is optional.
pub(crate) fn parse_sheet(data: &[u8]) -> Result<Sheet, FaceLoadError> {
    let mut sheet = Sheet::default();
    let mut page_count: u32 = 0;
    let (mut font, mut info, mut common, mut pages, mut chars) = (false, false, false, false, false);

    for event in EventReader::new(data) {
        let event = event.map_err(|e| FaceLoadError::Sheet(e.to_string()))?;
        let XmlEvent::StartElement {
            name, attributes, ..
        } = event
        else {
            continue;
        };
        match name.local_name.as_str() {
            "font" => font = true,
            "info" => {
                info = true;
                sheet.size = num_attr(&attributes, "size");
            }
            "common" => {
                common = true;
                sheet.line_height = num_attr(&attributes, "lineHeight");
                page_count = num_attr(&attributes, "pages");
            }
            "pages" => pages = true,
            "page" => {
                let file = attr(&attributes, "file").ok_or_else(|| {
                    FaceLoadError::Sheet("page element without file attribute".into())
                })?;
                sheet.page_files.push(file.to_string());
            }
            "chars" => chars = true,
            "char" => sheet.chars.push(SheetChar {
                id: num_attr(&attributes, "id"),
                x: num_attr(&attributes, "x"),
                y: num_attr(&attributes, "y"),
                width: num_attr(&attributes, "width"),
                height: num_attr(&attributes, "height"),
                offset_x: num_attr(&attributes, "xoffset"),
                offset_y: num_attr(&attributes, "yoffset"),
                advance_x: num_attr(&attributes, "xadvance"),
                page: num_attr(&attributes, "page"),
            }),
            "kernings" => sheet.has_kernings = true,
            "kerning" => sheet.kernings.push(SheetKerning {
                first: num_attr(&attributes, "first"),
                second: num_attr(&attributes, "second"),
                amount: num_attr(&attributes, "amount"),
            }),
            _ => (),
        }
    }

    if !font {
        return Err(FaceLoadError::MissingElement("font"));
    }
    if !pages {
        return Err(FaceLoadError::MissingElement("pages"));
    }
    if !info {
        return Err(FaceLoadError::MissingElement("info"));
    }
    if !common {
        return Err(FaceLoadError::MissingElement("common"));
    }
    if !chars {
        return Err(FaceLoadError::MissingElement("chars"));
    }
    if to_usize(page_count) > sheet.page_files.len() {
        return Err(FaceLoadError::Sheet(format!(
            "missing page element for page {}",
            sheet.page_files.len()
        )));
    }
    // The declared count is authoritative; surplus page elements are ignored
    sheet.page_files.truncate(to_usize(page_count));

    Ok(sheet)
}

/// Load a bitmap face from a glyph-sheet descriptor
///
/// Page image files are resolved relative to the owning font's own path
/// (`path_prefix`).
pub(crate) fn load(
    data: &[u8],
    path_prefix: &str,
    gfx: &mut dyn TextureProvider,
    resources: &mut dyn Resources,
) -> Result<FontFace, FaceLoadError> {
    if data.is_empty() {
        return Err(FaceLoadError::EmptyData);
    }
    let sheet = parse_sheet(data)?;

    let mut textures: SmallVec<[Box<dyn Texture>; 1]> =
        SmallVec::with_capacity(sheet.page_files.len());
    let mut texture_memory: u32 = 0;
    for file in &sheet.page_files {
        let path = format!("{path_prefix}{file}");
        let bytes = resources
            .read(&path)
            .map_err(|e| FaceLoadError::PageImage(e.to_string()))?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| FaceLoadError::PageImage(format!("{path}: {e}")))?
            .to_rgba8();
        let image = PageImage {
            width: decoded.width(),
            height: decoded.height(),
            components: 4,
            data: decoded.into_raw(),
        };
        let texture = gfx.create_texture(&image)?;
        texture_memory += image.byte_size();
        textures.push(texture);
    }

    // Duplicate char ids are tolerated: the mapping is last-write-wins
    let mut glyphs = Vec::with_capacity(sheet.chars.len());
    let mut mapping = HashMap::new();
    for (index, c) in sheet.chars.iter().enumerate() {
        glyphs.push(FontGlyph {
            width: c.width,
            height: c.height,
            offset_x: c.offset_x,
            offset_y: c.offset_y,
            advance_x: c.advance_x,
            page: c.page,
            x: c.x,
            y: c.y,
            kerning: HashMap::new(),
        });
        mapping.insert(c.id, to_u32(index));
    }

    // Kerning adjustments are keyed by the second glyph's table index;
    // entries referencing an unmapped code are skipped
    for k in &sheet.kernings {
        let Some(first) = mapping.get(&k.first) else {
            continue;
        };
        let Some(second) = mapping.get(&k.second) else {
            continue;
        };
        let Ok(second) = u16::try_from(*second) else {
            continue;
        };
        glyphs[to_usize(*first)].kerning.insert(second, k.amount);
    }

    log::debug!("Bitmap face has {} glyphs", glyphs.len());

    let table = GlyphTable::new(glyphs, mapping, sheet.has_kernings);
    Ok(FontFace::new(
        sheet.size,
        sheet.line_height,
        table,
        textures,
        texture_memory,
    ))
}
