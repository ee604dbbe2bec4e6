//! PDF metadata and geometry helpers

use std::path::Path;

use lopdf::{Document, Object, ObjectId};

use crate::error::{Error, Result};

/// Resolve the root Pages node from the document catalog.
pub(crate) fn pages_root_id(doc: &Document) -> Result<ObjectId> {
    let catalog_ref = doc
        .trailer
        .get(b"Root")
        .map_err(|_| Error::General("No Root in trailer".to_string()))?;

    let catalog_id = match catalog_ref {
        Object::Reference(id) => *id,
        _ => return Err(Error::General("Root is not a reference".to_string())),
    };

    let catalog = doc.get_object(catalog_id)?;
    let catalog_dict = match catalog {
        Object::Dictionary(dict) => dict,
        _ => return Err(Error::General("Catalog is not a dictionary".to_string())),
    };

    let pages_ref = catalog_dict
        .get(b"Pages")
        .map_err(|_| Error::General("No Pages in catalog".to_string()))?;

    match pages_ref {
        Object::Reference(id) => Ok(*id),
        _ => Err(Error::General("Pages is not a reference".to_string())),
    }
}

/// Count pages by reading the Count field from the Pages dictionary.
/// This is more reliable than get_pages() which doesn't handle nested page trees
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let pages_id = pages_root_id(doc)?;

    let pages_obj = doc.get_object(pages_id)?;
    let pages_dict = match pages_obj {
        Object::Dictionary(dict) => dict,
        _ => return Err(Error::General("Pages is not a dictionary".to_string())),
    };

    let count = pages_dict
        .get(b"Count")
        .map_err(|_| Error::General("No Count in Pages".to_string()))?;

    match count {
        Object::Integer(n) => Ok(*n as usize),
        _ => Err(Error::General("Count is not an integer".to_string())),
    }
}

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    let mut title = None;
    let mut author = None;

    if let Ok(Object::Reference(info_id)) = doc.trailer.get(b"Info") {
        if let Ok(Object::Dictionary(info_dict)) = doc.get_object(*info_id) {
            if let Ok(title_obj) = info_dict.get(b"Title") {
                if let Ok(bytes) = title_obj.as_str() {
                    title = String::from_utf8(bytes.to_vec()).ok();
                }
            }
            if let Ok(author_obj) = info_dict.get(b"Author") {
                if let Ok(bytes) = author_obj.as_str() {
                    author = String::from_utf8(bytes.to_vec()).ok();
                }
            }
        }
    }

    Ok(PdfMetadata {
        page_count,
        title,
        author,
    })
}

/// Count the number of pages in a PDF file
///
/// This is a quick operation that reads the Count field from the Pages dictionary.
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(page_count)
}

/// Resolve a page's raw MediaBox array, following the Parent inheritance
/// chain when the page dictionary has no MediaBox of its own.
pub(crate) fn page_media_box_array(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let mut current_id = page_id;

    // Parent chains are shallow in practice; cap the walk for safety
    for _ in 0..10 {
        let dict = match doc.get_object(current_id)? {
            Object::Dictionary(dict) => dict,
            _ => return Err(Error::General("page node is not a dictionary".to_string())),
        };

        if let Ok(media_box) = dict.get(b"MediaBox") {
            let array = match media_box {
                Object::Array(arr) => arr.clone(),
                Object::Reference(ref_id) => match doc.get_object(*ref_id)? {
                    Object::Array(arr) => arr.clone(),
                    _ => {
                        return Err(Error::General(
                            "MediaBox reference is not an array".to_string(),
                        ))
                    }
                },
                _ => return Err(Error::General("MediaBox is not an array".to_string())),
            };

            if array.len() < 4 {
                return Err(Error::General("MediaBox has fewer than 4 entries".to_string()));
            }

            return Ok(array);
        }

        if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
            current_id = *parent_id;
            continue;
        }

        break;
    }

    Err(Error::General("page has no MediaBox".to_string()))
}

/// Resolve a page's MediaBox as (width, height) in points.
pub(crate) fn page_media_box(doc: &Document, page_id: ObjectId) -> Result<(f32, f32)> {
    let array = page_media_box_array(doc, page_id)?;

    let coords: Vec<f32> = array
        .iter()
        .take(4)
        .map(number)
        .collect::<Option<Vec<f32>>>()
        .ok_or_else(|| Error::General("MediaBox entry is not numeric".to_string()))?;

    Ok((coords[2] - coords[0], coords[3] - coords[1]))
}

/// Read an Integer or Real PDF object as f32.
fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(n) => Some(*n as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_pages_nonexistent_file() {
        let result = count_pages(Path::new("nonexistent.pdf"));
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_extract_metadata_nonexistent_file() {
        let result = extract_metadata(Path::new("nonexistent.pdf"));
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    // Integration tests with generated PDFs live in tests/integration.rs
}
