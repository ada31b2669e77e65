//! Report assembly: mode selection, per-slot drawing, output file

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use pdf_core::PdfDocument;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::compositor::cover_page_body;
use crate::config::ReportConfig;
use crate::fonts::{embed_report_font, FontKind, ReportFont};
use crate::layout::{Section, TableDefinition, TextSizes};
use crate::mappers::zip_air_radon;
use crate::model::ReportData;
use crate::table::{draw_table_page, CellSource};
use crate::template::{load_template, RenderMode, TemplateLoad};
use crate::{ReportError, Result};

/// Per-call options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    /// Output file name; generated from dong/ho and time when absent
    pub filename: Option<String>,
}

/// Metadata of a written report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedReport {
    pub filename: String,
    pub path: PathBuf,
    /// Public URL, `{url_prefix}{filename}`
    pub url: String,
    /// File size in bytes
    pub size: u64,
    pub mode: RenderMode,
    pub font: FontKind,
}

/// Rows drawn for one section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    pub section: Section,
    /// 1-indexed page the table was drawn on
    pub page: usize,
    pub rows_drawn: usize,
    /// Items not drawn because of the per-page row cap
    pub overflow: usize,
}

/// Serialized report before it is written to disk
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub mode: RenderMode,
    pub font: FontKind,
    pub sections: Vec<SectionSummary>,
}

/// Builds final reports with a fixed configuration
///
/// Holds no per-report state; one generator can serve any number of calls.
#[derive(Debug, Clone, Default)]
pub struct ReportGenerator {
    config: ReportConfig,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Render, write to the output directory and describe the result
    pub fn generate(&self, report: &ReportData, options: &ReportOptions) -> Result<GeneratedReport> {
        let paths = &self.config.paths;
        let filename = report_filename(report, options, Local::now().naive_local());

        let rendered = self.render(report)?;
        let path = write_report(&paths.output_dir, &filename, &rendered.bytes)?;
        let size = fs::metadata(&path)
            .map_err(|source| ReportError::Io {
                path: path.clone(),
                source,
            })?
            .len();

        info!(
            path = %path.display(),
            size,
            mode = ?rendered.mode,
            font = ?rendered.font,
            "final report written"
        );

        Ok(GeneratedReport {
            url: paths.url_for(&filename),
            filename,
            path,
            size,
            mode: rendered.mode,
            font: rendered.font,
        })
    }

    /// Build the report document in memory
    pub fn render(&self, report: &ReportData) -> Result<RenderedReport> {
        let paths = &self.config.paths;
        let layout = &self.config.layout;

        let load = load_template(&paths.template_path, layout.required_template_pages());
        let mode = load.mode();
        let mut doc = match load {
            TemplateLoad::Template(doc) => doc,
            TemplateLoad::DataOnly(_) => PdfDocument::new(),
        };

        let font = embed_report_font(&mut doc, &paths.font_path);
        let air_rows = zip_air_radon(&report.air_measurements, &report.radon_measurements);

        let mut sections = Vec::with_capacity(layout.slots.len());
        for slot in &layout.slots {
            let page = match mode {
                RenderMode::Template => {
                    let page = slot.page_index + 1;
                    cover_page_body(&mut doc, page, &layout.cover)?;
                    page
                }
                RenderMode::DataOnly => {
                    doc.add_blank_page(layout.page_width, layout.page_height)?
                }
            };

            let section = SectionDraw {
                page,
                font: &font,
                def: layout.table(slot.section),
                sizes: &layout.text_sizes,
                report,
            };
            let (rows_drawn, overflow) = match slot.section {
                Section::Visual => section.draw(&mut doc, &report.visual_inspections)?,
                Section::Thermal => section.draw(&mut doc, &report.thermal_inspections)?,
                Section::Air => section.draw(&mut doc, &air_rows)?,
                Section::Level => section.draw(&mut doc, &report.level_measurements)?,
            };

            if overflow > 0 {
                warn!(
                    section = slot.section.name(),
                    rows_drawn,
                    dropped = overflow,
                    "section exceeds one page; extra rows not rendered"
                );
            }

            sections.push(SectionSummary {
                section: slot.section,
                page,
                rows_drawn,
                overflow,
            });
        }

        let bytes = doc.to_bytes()?;
        debug!(bytes = bytes.len(), ?mode, "rendered report");

        Ok(RenderedReport {
            bytes,
            mode,
            font: font.kind,
            sections,
        })
    }
}

struct SectionDraw<'a> {
    page: usize,
    font: &'a ReportFont,
    def: &'a TableDefinition,
    sizes: &'a TextSizes,
    report: &'a ReportData,
}

impl SectionDraw<'_> {
    fn draw<R: CellSource>(&self, doc: &mut PdfDocument, items: &[R]) -> Result<(usize, usize)> {
        let render = draw_table_page(
            doc,
            self.page,
            self.font,
            self.def,
            self.sizes,
            self.report,
            items,
        )?;
        Ok((render.rows_drawn, render.overflow.len()))
    }
}

/// Reduce a value to characters safe in a file name
fn sanitize_component(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

/// Output file name for a report
///
/// A caller-supplied name is reduced to its last path component and gets a
/// `.pdf` extension if it lacks one. Otherwise the name is
/// `final_report_{dong}-{ho}_{YYYYMMDDHHMMSS}.pdf`.
pub fn report_filename(report: &ReportData, options: &ReportOptions, now: NaiveDateTime) -> String {
    let requested = options
        .filename
        .as_deref()
        .and_then(|name| Path::new(name.trim()).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty());

    if let Some(name) = requested {
        if name.to_ascii_lowercase().ends_with(".pdf") {
            return name.to_string();
        }
        return format!("{name}.pdf");
    }

    format!(
        "final_report_{}-{}_{}.pdf",
        sanitize_component(&report.dong),
        sanitize_component(&report.ho),
        now.format("%Y%m%d%H%M%S")
    )
}

/// Write through a uniquely named temporary sibling
///
/// The final path is never partial, and concurrent writers of the same name
/// each rename a complete file into place.
fn write_report(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| ReportError::Io { path, source }
    };

    fs::create_dir_all(dir).map_err(io_error(dir))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".final_report")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_error(dir))?;
    tmp.write_all(bytes).map_err(io_error(tmp.path()))?;
    tmp.as_file().sync_all().map_err(io_error(tmp.path()))?;

    // Temp files are created owner-only; reports are served to others
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(io_error(tmp.path()))?;
    }

    let path = dir.join(filename);
    tmp.persist(&path).map_err(|err| ReportError::Io {
        path: path.clone(),
        source: err.error,
    })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|d| d.and_hms_opt(14, 7, 9))
            .unwrap()
    }

    fn household(dong: &str, ho: &str) -> ReportData {
        ReportData {
            dong: dong.to_string(),
            ho: ho.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_generated_filename() {
        let name = report_filename(
            &household("12", "305"),
            &ReportOptions::default(),
            fixed_time(),
        );
        assert_eq!(name, "final_report_12-305_20240305140709.pdf");
    }

    #[test]
    fn test_generated_filename_sanitized() {
        let name = report_filename(
            &household("101/B", ""),
            &ReportOptions::default(),
            fixed_time(),
        );
        assert_eq!(name, "final_report_101_B-unknown_20240305140709.pdf");
    }

    #[test]
    fn test_requested_filename() {
        let report = household("1", "2");
        let named = |name: &str| {
            report_filename(
                &report,
                &ReportOptions {
                    filename: Some(name.to_string()),
                },
                fixed_time(),
            )
        };

        assert_eq!(named("custom.pdf"), "custom.pdf");
        assert_eq!(named("custom"), "custom.pdf");
        assert_eq!(named("SCAN.PDF"), "SCAN.PDF");
        assert_eq!(named("../../etc/passwd"), "passwd.pdf");
        assert_eq!(named(""), "final_report_1-2_20240305140709.pdf");
    }

    #[test]
    fn test_write_report_creates_dir_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("reports");

        let path = write_report(&out, "a.pdf", b"%PDF-1.5 test").unwrap();
        assert_eq!(path, out.join("a.pdf"));
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.5 test");

        let entries: Vec<_> = fs::read_dir(&out).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_concurrent_writes_to_same_name() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8u8)
                .map(|writer| {
                    let out = &out;
                    scope.spawn(move || {
                        let payload = vec![b'a' + writer; 64 * 1024];
                        for _ in 0..10 {
                            write_report(out, "same.pdf", &payload)?;
                        }
                        Ok::<_, ReportError>(())
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap().unwrap();
            }
        });

        // One writer's payload, whole
        let written = fs::read(out.join("same.pdf")).unwrap();
        assert_eq!(written.len(), 64 * 1024);
        assert!(written.iter().all(|&b| b == written[0]));

        let entries: Vec<_> = fs::read_dir(&out).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_written_report_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = write_report(dir.path(), "a.pdf", b"%PDF").unwrap();
        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o644, 0o644);
    }

    #[test]
    fn test_generated_report_json_shape() {
        let report = GeneratedReport {
            filename: "a.pdf".to_string(),
            path: PathBuf::from("reports/a.pdf"),
            url: "/reports/a.pdf".to_string(),
            size: 10,
            mode: RenderMode::DataOnly,
            font: FontKind::Builtin,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "data_only");
        assert_eq!(json["font"], "builtin");
        assert_eq!(json["url"], "/reports/a.pdf");
    }
}
