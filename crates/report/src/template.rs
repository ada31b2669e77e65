//! Template document loading

use std::path::{Path, PathBuf};

use pdf_core::PdfDocument;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// How the report pages are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Tables overlaid onto template pages
    Template,
    /// Tables drawn on freshly appended blank pages
    DataOnly,
}

/// Why a template cannot be used
#[derive(Debug, Error)]
pub enum TemplateUnusable {
    #[error("template {0} does not exist")]
    Missing(PathBuf),

    #[error("template {path} could not be read: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("template {0} is encrypted")]
    Encrypted(PathBuf),

    #[error("template has {found} pages, at least {required} required")]
    TooFewPages { found: usize, required: usize },
}

/// Outcome of loading the template
#[derive(Debug)]
pub enum TemplateLoad {
    Template(PdfDocument),
    DataOnly(TemplateUnusable),
}

impl TemplateLoad {
    pub fn mode(&self) -> RenderMode {
        match self {
            TemplateLoad::Template(_) => RenderMode::Template,
            TemplateLoad::DataOnly(_) => RenderMode::DataOnly,
        }
    }
}

/// Open the template and check it can host every slot
pub fn try_load_template(
    path: &Path,
    required_pages: usize,
) -> std::result::Result<PdfDocument, TemplateUnusable> {
    if !path.is_file() {
        return Err(TemplateUnusable::Missing(path.to_path_buf()));
    }

    let doc = PdfDocument::open(path).map_err(|err| TemplateUnusable::Unreadable {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    if doc.is_encrypted() {
        return Err(TemplateUnusable::Encrypted(path.to_path_buf()));
    }

    let found = doc.page_count();
    if found < required_pages {
        return Err(TemplateUnusable::TooFewPages {
            found,
            required: required_pages,
        });
    }

    Ok(doc)
}

/// Load the template, degrading to data-only mode on any problem
pub fn load_template(path: &Path, required_pages: usize) -> TemplateLoad {
    match try_load_template(path, required_pages) {
        Ok(doc) => {
            info!(
                path = %path.display(),
                pages = doc.page_count(),
                "loaded report template"
            );
            TemplateLoad::Template(doc)
        }
        Err(reason) => {
            warn!(reason = %reason, "template unusable, rendering data-only report");
            TemplateLoad::DataOnly(reason)
        }
    }
}
