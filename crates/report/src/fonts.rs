//! Report font registration with a built-in fallback

use std::fs;
use std::path::{Path, PathBuf};

use pdf_core::{BuiltinFont, PdfDocument, PdfError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Document font name of the embedded TrueType font
pub const REPORT_FONT_NAME: &str = "report";
/// Document font name of the built-in fallback
pub const BUILTIN_FONT_NAME: &str = "report-builtin";

/// How report text is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontKind {
    /// TrueType font embedded in the document; renders Hangul
    Embedded,
    /// Helvetica base font; non-Latin text renders as `?`
    Builtin,
}

/// Handle to the font registered for a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFont {
    pub name: &'static str,
    pub kind: FontKind,
}

impl ReportFont {
    fn embedded() -> Self {
        Self {
            name: REPORT_FONT_NAME,
            kind: FontKind::Embedded,
        }
    }

    fn builtin() -> Self {
        Self {
            name: BUILTIN_FONT_NAME,
            kind: FontKind::Builtin,
        }
    }
}

/// Why the TrueType font could not be used
#[derive(Debug, Error)]
pub enum FontEmbedError {
    #[error("failed to read font {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("font file {0} is empty")]
    Empty(PathBuf),

    #[error("failed to embed font: {0}")]
    Embed(#[from] PdfError),
}

/// Register the TrueType font at `font_path`
pub fn try_embed_font(
    doc: &mut PdfDocument,
    font_path: &Path,
) -> std::result::Result<ReportFont, FontEmbedError> {
    if doc.has_font(REPORT_FONT_NAME) {
        return Ok(ReportFont::embedded());
    }

    let data = fs::read(font_path).map_err(|source| FontEmbedError::Read {
        path: font_path.to_path_buf(),
        source,
    })?;
    if data.is_empty() {
        return Err(FontEmbedError::Empty(font_path.to_path_buf()));
    }

    doc.add_font(REPORT_FONT_NAME, &data)?;
    Ok(ReportFont::embedded())
}

/// Register the report font, falling back to Helvetica
///
/// Never fails; the outcome is visible in the returned [`FontKind`].
pub fn embed_report_font(doc: &mut PdfDocument, font_path: &Path) -> ReportFont {
    match try_embed_font(doc, font_path) {
        Ok(font) => {
            info!(path = %font_path.display(), "embedded report font");
            font
        }
        Err(err) => {
            warn!(error = %err, "using built-in font; Korean text will not render");
            if !doc.has_font(BUILTIN_FONT_NAME) {
                if let Err(err) = doc.add_builtin_font(BUILTIN_FONT_NAME, BuiltinFont::Helvetica)
                {
                    debug!(error = %err, "built-in font registration");
                }
            }
            ReportFont::builtin()
        }
    }
}
