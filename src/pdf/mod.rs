//! PDF manipulation module

pub mod compose;
pub mod metadata;
pub mod overlay;
pub mod replicate;

// Re-export commonly used items
pub use compose::apply_text;
pub use metadata::{count_pages, extract_metadata, PdfMetadata};
pub use overlay::{build_overlay, OverlayPage, LETTER};
pub use replicate::replicate_with_text;
