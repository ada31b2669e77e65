//! Final Report - inspection report generation
//!
//! This crate provides:
//! - Inspection data model (visual, thermal, air quality, radon, level gauge)
//! - Table layout definitions and the table layout engine
//! - Template loading with fallback to blank pages
//! - Report font embedding with fallback to a built-in font
//! - Report assembly and output to disk
//!
//! # Example
//!
//! ```ignore
//! use report::{ReportConfig, ReportData, ReportGenerator, ReportOptions};
//!
//! let data: ReportData = serde_json::from_str(data_json)?;
//! let generator = ReportGenerator::new(ReportConfig::from_file("report.json")?);
//! let generated = generator.generate(&data, &ReportOptions::default())?;
//! println!("{}", generated.url);
//! ```

mod assembler;
pub mod compositor;
mod config;
pub mod fonts;
pub mod layout;
pub mod mappers;
mod model;
pub mod table;
pub mod template;

pub use assembler::{
    report_filename, GeneratedReport, RenderedReport, ReportGenerator, ReportOptions,
    SectionSummary,
};
pub use config::{ReportConfig, ReportPaths};
pub use fonts::{FontKind, ReportFont};
pub use layout::{LayoutConfig, Section, TableDefinition, MIN_TEMPLATE_PAGES};
pub use model::*;
pub use template::{RenderMode, TemplateLoad, TemplateUnusable};

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during report generation
///
/// Template and font problems are not errors; they degrade the output and
/// are reported in [`GeneratedReport`].
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Generate a report with the default paths and layout
pub fn generate_final_report(
    report: &ReportData,
    options: &ReportOptions,
) -> Result<GeneratedReport> {
    ReportGenerator::default().generate(report, options)
}
