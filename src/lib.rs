//! PDF Stamp Library
//!
//! A cross-platform library for overlaying text onto existing PDF pages.
//! This library provides functionality to:
//! - Stamp a single text run onto one page of a document, leaving every
//!   other page untouched
//! - Mail-merge: replicate one template page once per row of a CSV table,
//!   stamping each row's first-column value onto its own copy
//! - Embed a Unicode TrueType typeface so non-Latin scripts render
//! - Extract metadata (page counts, title, author)
//!
//! # Example
//!
//! ```no_run
//! use pdf_stamp::{FontRegistry, TargetSpec};
//! use pdf_stamp::pdf::apply_text;
//! use std::path::Path;
//!
//! let font = FontRegistry::discover().expect("no usable font");
//! let spec = TargetSpec::parse("2", "100", "700", "12").expect("bad spec");
//!
//! apply_text(
//!     Path::new("input.pdf"),
//!     Path::new("stamped.pdf"),
//!     "Hello",
//!     &spec,
//!     &font,
//! ).expect("Failed to stamp PDF");
//! ```

pub mod error;
pub mod font;
pub mod pdf;
pub mod spec;
pub mod table;

// Re-export commonly used items
pub use error::{Error, Result};
pub use font::FontRegistry;
pub use spec::TargetSpec;
