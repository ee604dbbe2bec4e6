//! Page composition: merging a text overlay onto a page of an existing
//! document
//!
//! The overlay becomes a Form XObject with its own resources, registered
//! on the target page and invoked by a small content stream appended after
//! the original content. Original content streams are never rewritten, so
//! every other page passes through untouched and the same primitives are
//! safe to reuse against fresh page clones in batch mode.

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::font::FontRegistry;
use crate::spec::TargetSpec;

use super::metadata::page_media_box;
use super::overlay::{build_overlay, OverlayPage, OVERLAY_FONT_NAME};

/// Tolerance when comparing overlay canvas to page MediaBox, in points.
const MEDIA_BOX_EPSILON: f32 = 0.1;

/// Stamp `text` onto one page of `source` and write the result to `output`.
///
/// The page at `spec.page_number` (1-based) gets the overlay drawn on top
/// of its existing content; all other pages are carried over unchanged and
/// in original order. Nothing is written to `output` unless the whole
/// document composed successfully.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use pdf_stamp::{FontRegistry, TargetSpec};
/// use pdf_stamp::pdf::apply_text;
///
/// let font = FontRegistry::discover().expect("no usable font");
/// let spec = TargetSpec::parse("2", "100", "700", "12").expect("bad spec");
///
/// apply_text(
///     Path::new("input.pdf"),
///     Path::new("output.pdf"),
///     "Hello",
///     &spec,
///     &font,
/// ).expect("failed to stamp");
/// ```
pub fn apply_text(
    source: &Path,
    output: &Path,
    text: &str,
    spec: &TargetSpec,
    font: &FontRegistry,
) -> Result<()> {
    if !source.exists() {
        return Err(Error::FileNotFound(source.to_path_buf()));
    }

    let mut doc = Document::load(source)?;

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(Error::EmptyPdf(source.to_path_buf()));
    }
    spec.check_page_bounds(pages.len())?;

    let page_id = *pages
        .get(&(spec.page_number as u32))
        .ok_or(Error::PageOutOfRange {
            page: spec.page_number,
            page_count: pages.len(),
        })?;

    // Size the overlay to the target page's own MediaBox
    let canvas = page_media_box(&doc, page_id)?;
    let overlay = build_overlay(font, text, spec.x, spec.y, spec.font_size, Some(canvas))?;

    let font_id = font.embed(&mut doc, text)?;
    stamp_page(&mut doc, page_id, &overlay, font_id)?;

    save_document(&mut doc, output)
}

/// Merge an overlay onto an existing page of `doc`.
///
/// Rejects the merge when the overlay canvas does not match the page's
/// MediaBox. The overlay is drawn after (on top of) the page's original
/// content.
pub(crate) fn stamp_page(
    doc: &mut Document,
    page_id: ObjectId,
    overlay: &OverlayPage,
    font_id: ObjectId,
) -> Result<()> {
    let (page_w, page_h) = page_media_box(doc, page_id)?;
    if (overlay.width - page_w).abs() > MEDIA_BOX_EPSILON
        || (overlay.height - page_h).abs() > MEDIA_BOX_EPSILON
    {
        return Err(Error::General(format!(
            "overlay canvas {}x{} does not match page MediaBox {}x{}",
            overlay.width, overlay.height, page_w, page_h
        )));
    }

    let xobject_id = overlay_xobject(doc, overlay, font_id);
    let name = register_xobject(doc, page_id, xobject_id)?;

    let invoke = format!("q\n/{} Do\nQ\n", name);
    let invoke_id = doc.add_object(Object::Stream(Stream::new(
        Dictionary::new(),
        invoke.into_bytes(),
    )));

    append_content_to_page(doc, page_id, invoke_id)
}

/// Wrap an overlay into a Form XObject carrying its own font resources.
/// The BBox equals the overlay canvas, so overlay coordinates stay in the
/// page's own point space.
pub(crate) fn overlay_xobject(
    doc: &mut Document,
    overlay: &OverlayPage,
    font_id: ObjectId,
) -> ObjectId {
    let mut fonts = Dictionary::new();
    fonts.set(OVERLAY_FONT_NAME, Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set(
        "BBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(overlay.width),
            Object::Real(overlay.height),
        ]),
    );
    xobject_dict.set(
        "Matrix",
        Object::Array(vec![
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
        ]),
    );
    xobject_dict.set("Resources", Object::Dictionary(resources));

    // Stream::new records the Length entry; without it the stream reads
    // back empty after a save/load round trip
    doc.add_object(Object::Stream(Stream::new(
        xobject_dict,
        overlay.content().to_vec(),
    )))
}

/// Resolve a page's Resources dictionary to an owned copy, following
/// indirect references and the Parent inheritance chain.
pub(crate) fn resolve_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut current_id = page_id;

    for _ in 0..10 {
        let dict = match doc.get_object(current_id)? {
            Object::Dictionary(dict) => dict,
            _ => return Err(Error::General("page node is not a dictionary".to_string())),
        };

        if let Ok(res) = dict.get(b"Resources") {
            return Ok(match res {
                Object::Dictionary(d) => d.clone(),
                Object::Reference(res_id) => match doc.get_object(*res_id) {
                    Ok(Object::Dictionary(d)) => d.clone(),
                    _ => Dictionary::new(),
                },
                _ => Dictionary::new(),
            });
        }

        if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
            current_id = *parent_id;
            continue;
        }

        break;
    }

    Ok(Dictionary::new())
}

/// Register `xobject_id` in the page's Resources under a name that does
/// not collide with any existing XObject entry, and return that name.
fn register_xobject(doc: &mut Document, page_id: ObjectId, xobject_id: ObjectId) -> Result<String> {
    let mut resources = resolve_resources(doc, page_id)?;

    let mut xobjects = match resources.get(b"XObject") {
        Ok(Object::Dictionary(d)) => d.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Dictionary(d)) => d.clone(),
            _ => Dictionary::new(),
        },
        _ => Dictionary::new(),
    };

    let mut n = 0;
    let name = loop {
        let candidate = format!("TxOv{}", n);
        if !xobjects.has(candidate.as_bytes()) {
            break candidate;
        }
        n += 1;
    };

    xobjects.set(name.as_bytes().to_vec(), Object::Reference(xobject_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    // Set the Resources inline on the page so our copy takes effect even
    // when the original was shared or inherited
    let page_obj = doc.get_object_mut(page_id)?;
    if let Object::Dictionary(ref mut page_dict) = page_obj {
        page_dict.set("Resources", Object::Dictionary(resources));
    }

    Ok(name)
}

/// Append a content stream to a page's Contents so the overlay is drawn
/// on top of the existing content.
fn append_content_to_page(doc: &mut Document, page_id: ObjectId, new_content_id: ObjectId) -> Result<()> {
    let page_obj = doc.get_object_mut(page_id)?;

    let page_dict = match page_obj {
        Object::Dictionary(ref mut dict) => dict,
        _ => return Err(Error::General("page node is not a dictionary".to_string())),
    };

    let existing_content = page_dict.get(b"Contents").ok().cloned();

    match existing_content {
        Some(Object::Reference(content_id)) => {
            let new_contents = vec![
                Object::Reference(content_id),
                Object::Reference(new_content_id),
            ];
            page_dict.set("Contents", Object::Array(new_contents));
        }
        Some(Object::Array(mut content_array)) => {
            content_array.push(Object::Reference(new_content_id));
            page_dict.set("Contents", Object::Array(content_array));
        }
        _ => {
            page_dict.set("Contents", Object::Array(vec![Object::Reference(new_content_id)]));
        }
    }

    Ok(())
}

/// Serialize the whole document to memory, then write the destination in
/// one step. The output file is never created from a partially built
/// document.
pub(crate) fn save_document(doc: &mut Document, output: &Path) -> Result<()> {
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    std::fs::write(output, buffer)?;

    Ok(())
}
