//! Unicode typeface loading and PDF font embedding
//!
//! The stamped text may be in any script (the original use case was
//! Chinese), so overlays cannot rely on the standard 14 PDF fonts or a
//! single-byte encoding. Instead one TrueType font is loaded into a
//! [`FontRegistry`] at startup and embedded into each output document as a
//! composite font: Type0 → CIDFontType2 → FontDescriptor/FontFile2, with
//! Identity-H encoding so content streams address glyphs directly by
//! glyph ID. A ToUnicode CMap is included so stamped text stays
//! copy-pasteable.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use ttf_parser::Face;

use crate::error::{Error, Result};

/// Well-known TrueType font locations tried by [`FontRegistry::discover`],
/// in order. Any font with broad Unicode coverage works; these are the
/// usual suspects on Linux, macOS and Windows.
const FONT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Environment variable overriding the font search path.
const FONT_ENV_VAR: &str = "PDF_STAMP_FONT";

/// One registered typeface, loaded once at process start and read-only
/// thereafter.
pub struct FontRegistry {
    /// PDF-safe font name used for BaseFont/FontName entries
    name: String,
    /// Raw TrueType data, embedded verbatim as FontFile2
    data: Vec<u8>,
}

impl FontRegistry {
    /// Load a TrueType font from an explicit path.
    ///
    /// Fails with [`Error::Font`] if the file is missing or not a
    /// parseable TrueType font.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| Error::Font(format!("cannot read {}: {}", path.display(), e)))?;

        // Validate up front so later face() calls cannot fail
        Face::parse(&data, 0)
            .map_err(|e| Error::Font(format!("cannot parse {}: {:?}", path.display(), e)))?;

        Ok(Self {
            name: pdf_font_name(path),
            data,
        })
    }

    /// Locate a usable TrueType font: the `PDF_STAMP_FONT` environment
    /// variable if set, otherwise the first hit among well-known system
    /// font locations.
    pub fn discover() -> Result<Self> {
        if let Ok(path) = std::env::var(FONT_ENV_VAR) {
            return Self::from_file(&PathBuf::from(path));
        }

        for candidate in FONT_SEARCH_PATHS {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Err(Error::Font(format!(
            "no TrueType font found; set {} or pass an explicit font file",
            FONT_ENV_VAR
        )))
    }

    /// The PDF-safe name this font is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn face(&self) -> Result<Face<'_>> {
        Face::parse(&self.data, 0)
            .map_err(|e| Error::Font(format!("font data no longer parseable: {:?}", e)))
    }

    /// Encode `text` as an Identity-H hex string of glyph IDs, without the
    /// surrounding angle brackets.
    ///
    /// Fails with [`Error::Unencodable`] on the first character the
    /// typeface has no glyph for.
    pub fn encode_text(&self, text: &str) -> Result<String> {
        let face = self.face()?;
        let mut hex = String::with_capacity(text.chars().count() * 4);

        for c in text.chars() {
            let gid = face
                .glyph_index(c)
                .map(|g| g.0)
                .filter(|&g| g != 0)
                .ok_or(Error::Unencodable { ch: c })?;
            let _ = write!(hex, "{:04X}", gid);
        }

        Ok(hex)
    }

    /// Embed the typeface into `doc` and return the Type0 font object ID.
    ///
    /// `used_text` is the full corpus of text that will be stamped with
    /// this font; the /W widths array and the ToUnicode CMap only cover
    /// the characters actually used.
    pub fn embed(&self, doc: &mut Document, used_text: &str) -> Result<ObjectId> {
        let face = self.face()?;

        let used_chars: BTreeSet<char> = used_text.chars().collect();

        // FontFile2: the raw TrueType program
        let mut file_dict = Dictionary::new();
        file_dict.set("Length1", Object::Integer(self.data.len() as i64));
        let font_file_id =
            doc.add_object(Object::Stream(Stream::new(file_dict, self.data.clone())));

        // FontDescriptor with metrics taken from the face
        let bbox = face.global_bounding_box();
        let descriptor = Dictionary::from_iter([
            ("Type", Object::Name(b"FontDescriptor".to_vec())),
            ("FontName", Object::Name(self.name.as_bytes().to_vec())),
            (
                "FontFamily",
                Object::String(self.name.as_bytes().to_vec(), StringFormat::Literal),
            ),
            ("Flags", Object::Integer(4)), // Symbolic
            (
                "FontBBox",
                Object::Array(vec![
                    Object::Integer(i64::from(bbox.x_min)),
                    Object::Integer(i64::from(bbox.y_min)),
                    Object::Integer(i64::from(bbox.x_max)),
                    Object::Integer(i64::from(bbox.y_max)),
                ]),
            ),
            ("ItalicAngle", Object::Integer(0)),
            ("Ascent", Object::Integer(i64::from(face.ascender()))),
            ("Descent", Object::Integer(i64::from(face.descender()))),
            (
                "CapHeight",
                Object::Integer(i64::from(
                    face.capital_height().unwrap_or_else(|| face.ascender()),
                )),
            ),
            ("StemV", Object::Integer(80)),
            ("FontFile2", Object::Reference(font_file_id)),
        ]);
        let descriptor_id = doc.add_object(Object::Dictionary(descriptor));

        // ToUnicode CMap covering the used characters
        let cmap = tounicode_cmap(&face, &used_chars);
        let tounicode_id = doc.add_object(Object::Stream(Stream::new(
            Dictionary::new(),
            cmap.into_bytes(),
        )));

        // CIDFontType2 with per-glyph widths for the used characters
        let default_width = face
            .glyph_index(' ')
            .and_then(|g| face.glyph_hor_advance(g))
            .map(|w| scale_width(&face, w))
            .unwrap_or(1000);

        let cid_font = Dictionary::from_iter([
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"CIDFontType2".to_vec())),
            ("BaseFont", Object::Name(self.name.as_bytes().to_vec())),
            (
                "CIDSystemInfo",
                Object::Dictionary(Dictionary::from_iter([
                    (
                        "Registry",
                        Object::String(b"Adobe".to_vec(), StringFormat::Literal),
                    ),
                    (
                        "Ordering",
                        Object::String(b"Identity".to_vec(), StringFormat::Literal),
                    ),
                    ("Supplement", Object::Integer(0)),
                ])),
            ),
            ("FontDescriptor", Object::Reference(descriptor_id)),
            ("DW", Object::Integer(default_width)),
            ("W", Object::Array(widths_array(&face, &used_chars))),
            ("CIDToGIDMap", Object::Name(b"Identity".to_vec())),
        ]);
        let cid_font_id = doc.add_object(Object::Dictionary(cid_font));

        // Type0 composite font addressed with Identity-H glyph IDs
        let type0 = Dictionary::from_iter([
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type0".to_vec())),
            ("BaseFont", Object::Name(self.name.as_bytes().to_vec())),
            ("Encoding", Object::Name(b"Identity-H".to_vec())),
            (
                "DescendantFonts",
                Object::Array(vec![Object::Reference(cid_font_id)]),
            ),
            ("ToUnicode", Object::Reference(tounicode_id)),
        ]);

        Ok(doc.add_object(Object::Dictionary(type0)))
    }
}

/// Scale an advance width from font design units to PDF's 1000/em space.
fn scale_width(face: &Face, width: u16) -> i64 {
    (i64::from(width) * 1000) / i64::from(face.units_per_em())
}

/// Build the CIDFont /W array: `[gid [w] gid [w] ...]` for each used glyph.
fn widths_array(face: &Face, used_chars: &BTreeSet<char>) -> Vec<Object> {
    let mut gid_widths: Vec<(u16, i64)> = used_chars
        .iter()
        .filter_map(|&c| {
            let gid = face.glyph_index(c)?;
            let advance = face.glyph_hor_advance(gid)?;
            Some((gid.0, scale_width(face, advance)))
        })
        .collect();
    gid_widths.sort_unstable();
    gid_widths.dedup();

    let mut result = Vec::with_capacity(gid_widths.len() * 2);
    for (gid, width) in gid_widths {
        result.push(Object::Integer(i64::from(gid)));
        result.push(Object::Array(vec![Object::Integer(width)]));
    }
    result
}

/// Generate a ToUnicode CMap mapping used glyph IDs back to codepoints.
fn tounicode_cmap(face: &Face, used_chars: &BTreeSet<char>) -> String {
    let mut cmap = String::new();

    cmap.push_str("/CIDInit /ProcSet findresource begin\n");
    cmap.push_str("12 dict begin\n");
    cmap.push_str("begincmap\n");
    cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
    cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
    cmap.push_str("/CMapType 2 def\n");
    cmap.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

    let entries: Vec<(u16, u32)> = used_chars
        .iter()
        .filter_map(|&c| face.glyph_index(c).map(|g| (g.0, c as u32)))
        .collect();

    // bfchar sections are capped at 100 entries by the PDF spec
    for chunk in entries.chunks(100) {
        let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
        for (gid, codepoint) in chunk {
            // Codepoints above the BMP need a UTF-16 surrogate pair
            let c = char::from_u32(*codepoint).unwrap_or('\u{FFFD}');
            let mut units = [0u16; 2];
            let encoded = c.encode_utf16(&mut units);
            let _ = write!(cmap, "<{:04X}> <", gid);
            for unit in encoded {
                let _ = write!(cmap, "{:04X}", unit);
            }
            cmap.push_str(">\n");
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str("endcmap\n");
    cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
    cmap.push_str("end\nend\n");

    cmap
}

/// Derive a PDF name from the font file stem (PDF names cannot contain
/// whitespace or delimiters).
fn pdf_font_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name: String = stem.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if name.is_empty() {
        "StampFont".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_font_name_sanitizes() {
        assert_eq!(
            pdf_font_name(Path::new("/fonts/DejaVu Sans-Regular.ttf")),
            "DejaVuSansRegular"
        );
        assert_eq!(pdf_font_name(Path::new("...")), "StampFont");
    }

    #[test]
    fn test_from_file_missing() {
        let result = FontRegistry::from_file(Path::new("nonexistent-font.ttf"));
        assert!(matches!(result, Err(Error::Font(_))));
    }

    #[test]
    fn test_encode_text_hex() {
        // Needs a real system font; skip quietly when none is installed
        let Ok(font) = FontRegistry::discover() else {
            eprintln!("Skipping test_encode_text_hex: no system font found");
            return;
        };

        let hex = font.encode_text("Hi").expect("ASCII must encode");
        assert_eq!(hex.len(), 8);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));

        // Two identical characters encode to the same glyph ID
        let double = font.encode_text("HH").unwrap();
        assert_eq!(&double[..4], &double[4..]);
    }
}
