//! Error types for the pdf-stamp library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the pdf-stamp library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV table error
    #[error("table error: {0}")]
    Csv(#[from] csv::Error),

    /// A numeric field did not parse as an integer
    #[error("invalid {field}: {value:?} is not a valid integer")]
    InvalidNumber { field: &'static str, value: String },

    /// Page number outside [1, page count]
    #[error("page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    /// Table has no data rows
    #[error("table has no data rows: {}", .0.display())]
    EmptyTable(PathBuf),

    /// Malformed table
    #[error("malformed table: {0}")]
    Table(String),

    /// Font error
    #[error("font error: {0}")]
    Font(String),

    /// Text contains a character the registered typeface cannot render
    #[error("typeface has no glyph for {ch:?}")]
    Unencodable { ch: char },

    /// File not found
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// General error
    #[error("{0}")]
    General(String),
}
