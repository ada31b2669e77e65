//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening template documents or creating empty ones
//! - Appending blank pages and reading page geometry
//! - Embedding subset TrueType fonts, or falling back to a built-in base font
//! - Inserting text at specific coordinates
//! - Drawing filled and stroked rectangles and rules
//!
//! All coordinates are PDF page space: the origin is the bottom-left corner
//! of the page and y grows upward.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{PdfDocument, Color, Rect};
//!
//! let mut doc = PdfDocument::open("template.pdf")?;
//! doc.add_font("noto", &std::fs::read("fonts/NotoSansKR-Regular.ttf")?)?;
//! doc.set_font("noto", 12.0)?;
//! doc.fill_rect(8, Rect::new(20.0, 20.0, 555.0, 772.0), Color::white())?;
//! doc.insert_text("Hello, World!", 8, 100.0, 700.0)?;
//! doc.save("output.pdf")?;
//! ```

mod document;
mod font;
mod graphics;
mod text;

pub use document::{Color, PdfDocument, A4_HEIGHT, A4_WIDTH};
pub use font::{BuiltinFont, FontData, LoadedFont};
pub use graphics::{
    fill_rect_operators, line_operators, stroke_rect_operators, Rect, DEFAULT_LINE_WIDTH,
};
pub use text::{generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font already exists: {0}")]
    FontAlreadyExists(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Failed to subset font: {0}")]
    FontSubsetError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Compress bytes with zlib for a `/FlateDecode` stream
pub(crate) fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
