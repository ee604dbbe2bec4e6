//! Mail-merge replication: one output page per table row
//!
//! Every output page is a fresh composite of the same template page plus
//! one row's overlay. The template page dictionary is cloned per row (its
//! content streams are shared but never rewritten), so no row can see a
//! previous row's overlay. The whole batch either produces a complete
//! output document or nothing.

use std::path::Path;

use lopdf::{Document, Object, Stream};

use crate::error::{Error, Result};
use crate::font::FontRegistry;
use crate::spec::TargetSpec;
use crate::table::read_text_rows;

use super::compose::{resolve_resources, save_document, stamp_page};
use super::metadata::{page_media_box, page_media_box_array, pages_root_id};
use super::overlay::{build_overlay, OverlayPage};

/// Stamp each first-column value of `table` onto its own copy of the
/// template page (`spec.page_number` of `source`, 1-based) and write the
/// assembled document to `output`.
///
/// The output has exactly one page per table row, in table order, each
/// sized to the template page's MediaBox. Fails fast: any bad row aborts
/// the whole batch before anything is written.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use pdf_stamp::{FontRegistry, TargetSpec};
/// use pdf_stamp::pdf::replicate_with_text;
///
/// let font = FontRegistry::discover().expect("no usable font");
/// let spec = TargetSpec::parse("1", "100", "700", "12").expect("bad spec");
///
/// replicate_with_text(
///     Path::new("badge-template.pdf"),
///     Path::new("badges.pdf"),
///     Path::new("names.csv"),
///     &spec,
///     &font,
/// ).expect("failed to mail-merge");
/// ```
pub fn replicate_with_text(
    source: &Path,
    output: &Path,
    table: &Path,
    spec: &TargetSpec,
    font: &FontRegistry,
) -> Result<()> {
    let rows = read_text_rows(table)?;

    if !source.exists() {
        return Err(Error::FileNotFound(source.to_path_buf()));
    }

    let mut doc = Document::load(source)?;

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(Error::EmptyPdf(source.to_path_buf()));
    }
    spec.check_page_bounds(pages.len())?;

    let template_id = *pages
        .get(&(spec.page_number as u32))
        .ok_or(Error::PageOutOfRange {
            page: spec.page_number,
            page_count: pages.len(),
        })?;

    let canvas = page_media_box(&doc, template_id)?;

    // Build every overlay up front so a row that cannot be rendered aborts
    // the batch before the page tree is touched
    let overlays: Vec<OverlayPage> = rows
        .iter()
        .map(|row| build_overlay(font, row, spec.x, spec.y, spec.font_size, Some(canvas)))
        .collect::<Result<_>>()?;

    let corpus: String = rows.concat();
    let font_id = font.embed(&mut doc, &corpus)?;

    // Snapshot the template pieces the clones will share
    let template_dict = match doc.get_object(template_id)? {
        Object::Dictionary(dict) => dict.clone(),
        _ => return Err(Error::General("template page is not a dictionary".to_string())),
    };
    let media_box = page_media_box_array(&doc, template_id)?;
    let base_resources = resolve_resources(&doc, template_id)?;

    let content_refs: Vec<Object> = match template_dict.get(b"Contents") {
        Ok(Object::Reference(id)) => vec![Object::Reference(*id)],
        Ok(Object::Array(arr)) => arr.clone(),
        Ok(Object::Stream(stream)) => {
            // Contents embedded directly in the page dictionary; lift it
            // out so clones can share it by reference
            let id = doc.add_object(Object::Stream(Stream {
                dict: stream.dict.clone(),
                content: stream.content.clone(),
                allows_compression: stream.allows_compression,
                start_position: stream.start_position,
            }));
            vec![Object::Reference(id)]
        }
        _ => vec![],
    };

    let pages_root = pages_root_id(&doc)?;

    // One pristine clone of the template per row, each with the row's
    // overlay stamped on top
    let mut new_page_ids = Vec::with_capacity(rows.len());
    for overlay in &overlays {
        let mut page_dict = template_dict.clone();
        page_dict.set("Contents", Object::Array(content_refs.clone()));
        page_dict.set("Resources", Object::Dictionary(base_resources.clone()));
        page_dict.set("MediaBox", Object::Array(media_box.clone()));
        page_dict.set("Parent", Object::Reference(pages_root));

        let page_id = doc.add_object(Object::Dictionary(page_dict));
        stamp_page(&mut doc, page_id, overlay, font_id)?;
        new_page_ids.push(page_id);
    }

    // Rewire the page tree around the clones, in table order
    let kids: Vec<Object> = new_page_ids
        .iter()
        .map(|&id| Object::Reference(id))
        .collect();

    let pages_obj = doc.get_object_mut(pages_root)?;
    if let Object::Dictionary(ref mut pages_dict) = pages_obj {
        pages_dict.set("Kids", Object::Array(kids));
        pages_dict.set("Count", Object::Integer(new_page_ids.len() as i64));
    }

    // The original pages are now unreachable; drop them before saving
    doc.renumber_objects();
    let _ = doc.prune_objects();

    save_document(&mut doc, output)
}
