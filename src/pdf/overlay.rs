//! Overlay construction
//!
//! An overlay is a transient single-page canvas holding exactly one
//! positioned text run. It only exists in memory; the composer turns it
//! into a Form XObject inside the output document.

use crate::error::Result;
use crate::font::FontRegistry;

/// US Letter page size in points, the default canvas when the caller does
/// not supply the target page's own MediaBox.
pub const LETTER: (f32, f32) = (612.0, 792.0);

/// Resource name the overlay content stream uses for its typeface.
pub(crate) const OVERLAY_FONT_NAME: &str = "F0";

/// A single-text overlay sized to a page canvas.
///
/// The canvas size must match the target page's MediaBox at merge time;
/// the composer rejects mismatches.
#[derive(Debug, Clone)]
pub struct OverlayPage {
    /// Canvas width in points
    pub width: f32,
    /// Canvas height in points
    pub height: f32,
    content: Vec<u8>,
}

impl OverlayPage {
    /// The overlay's content stream operators.
    pub(crate) fn content(&self) -> &[u8] {
        &self.content
    }
}

/// Build an overlay drawing `text` at (x, y) points from the bottom-left
/// corner, in the registered typeface at `font_size` points.
///
/// `canvas` should be the target page's MediaBox size; when `None`, a US
/// Letter canvas is used and any mismatch with the target page is the
/// caller's responsibility.
///
/// Fails if the typeface cannot encode `text`. No I/O happens here.
pub fn build_overlay(
    font: &FontRegistry,
    text: &str,
    x: i32,
    y: i32,
    font_size: i32,
    canvas: Option<(f32, f32)>,
) -> Result<OverlayPage> {
    let (width, height) = canvas.unwrap_or(LETTER);
    let hex = font.encode_text(text)?;

    let mut content = String::new();
    content.push_str("0 g\n"); // black fill
    content.push_str("BT\n");
    content.push_str(&format!("/{} {} Tf\n", OVERLAY_FONT_NAME, font_size));
    content.push_str(&format!("1 0 0 1 {} {} Tm\n", x, y));
    content.push_str(&format!("<{}> Tj\n", hex));
    content.push_str("ET\n");

    Ok(OverlayPage {
        width,
        height,
        content: content.into_bytes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_build_overlay_defaults_to_letter() {
        let Ok(font) = FontRegistry::discover() else {
            eprintln!("Skipping test_build_overlay_defaults_to_letter: no system font found");
            return;
        };

        let overlay = build_overlay(&font, "Hello", 100, 700, 12, None).unwrap();
        assert_eq!((overlay.width, overlay.height), LETTER);

        let content = String::from_utf8(overlay.content().to_vec()).unwrap();
        assert!(content.contains("/F0 12 Tf"));
        assert!(content.contains("1 0 0 1 100 700 Tm"));
        // Exactly one text-drawing operation
        assert_eq!(content.matches("Tj").count(), 1);
    }

    #[test]
    fn test_build_overlay_uses_supplied_canvas() {
        let Ok(font) = FontRegistry::discover() else {
            eprintln!("Skipping test_build_overlay_uses_supplied_canvas: no system font found");
            return;
        };

        let overlay = build_overlay(&font, "x", 0, 0, 9, Some((595.0, 842.0))).unwrap();
        assert_eq!(overlay.width, 595.0);
        assert_eq!(overlay.height, 842.0);
    }

    #[test]
    fn test_build_overlay_rejects_missing_glyph() {
        let Ok(font) = FontRegistry::discover() else {
            eprintln!("Skipping test_build_overlay_rejects_missing_glyph: no system font found");
            return;
        };

        // No general-purpose text font maps unassigned plane-15 codepoints
        let result = build_overlay(&font, "\u{F0000}", 0, 0, 12, None);
        assert!(matches!(result.unwrap_err(), Error::Unencodable { .. }));
    }
}
