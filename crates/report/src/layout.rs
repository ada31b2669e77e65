//! Table and page layout definitions
//!
//! All coordinates are PDF page space (origin bottom-left, y grows upward).
//! The defaults reproduce the fixed A4 layout of the final report template.

use serde::{Deserialize, Serialize};

use crate::{ReportError, Result};

/// Minimum page count of a usable template document
pub const MIN_TEMPLATE_PAGES: usize = 13;

/// Report section rendered as one table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Visual,
    Thermal,
    Air,
    Level,
}

impl Section {
    pub fn name(&self) -> &'static str {
        match self {
            Section::Visual => "visual",
            Section::Thermal => "thermal",
            Section::Air => "air",
            Section::Level => "level",
        }
    }
}

/// Which template page (0-based) receives which section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMapping {
    #[serde(rename = "pageIndex")]
    pub page_index: usize,
    pub section: Section,
}

impl SlotMapping {
    pub fn new(page_index: usize, section: Section) -> Self {
        Self {
            page_index,
            section,
        }
    }
}

/// Point in page space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One table column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Field name passed to the row's cell accessor
    pub field: String,
    /// Column width in points
    pub width: f64,
    /// Maximum characters shown before truncation
    #[serde(rename = "maxChars")]
    pub max_chars: usize,
}

impl ColumnDef {
    pub fn new(field: &str, width: f64, max_chars: usize) -> Self {
        Self {
            field: field.to_string(),
            width,
            max_chars,
        }
    }
}

/// Declarative geometry of one section table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub title: String,
    #[serde(rename = "headerLabels")]
    pub header_labels: Vec<String>,
    pub columns: Vec<ColumnDef>,
    /// Top-left corner of the header band
    pub origin: Point,
    #[serde(rename = "headerHeight", default = "default_header_height")]
    pub header_height: f64,
    #[serde(rename = "rowHeight", default = "default_row_height")]
    pub row_height: f64,
    #[serde(rename = "maxRowsPerPage", default = "default_max_rows")]
    pub max_rows_per_page: usize,
}

fn default_header_height() -> f64 {
    28.0
}

fn default_row_height() -> f64 {
    26.0
}

fn default_max_rows() -> usize {
    22
}

const TABLE_ORIGIN: Point = Point { x: 50.0, y: 760.0 };

impl TableDefinition {
    fn standard(title: &str, header_labels: &[&str], columns: Vec<ColumnDef>) -> Self {
        Self {
            title: title.to_string(),
            header_labels: header_labels.iter().map(|s| s.to_string()).collect(),
            columns,
            origin: TABLE_ORIGIN,
            header_height: default_header_height(),
            row_height: default_row_height(),
            max_rows_per_page: default_max_rows(),
        }
    }

    /// Sum of column widths; the width of the header band, grid and border
    pub fn total_width(&self) -> f64 {
        self.columns.iter().map(|c| c.width).sum()
    }

    pub fn visual() -> Self {
        Self::standard(
            "육안 점검 결과",
            &["위치", "공종", "내용", "결과"],
            inspection_columns(),
        )
    }

    pub fn thermal() -> Self {
        Self::standard(
            "열화상 점검 결과",
            &["위치", "공종", "내용", "결과"],
            inspection_columns(),
        )
    }

    pub fn air() -> Self {
        Self::standard(
            "공기질 측정 결과",
            &["위치", "공정", "TVOC", "HCHO", "라돈", "결과"],
            vec![
                ColumnDef::new("location", 110.0, 12),
                ColumnDef::new("process_type", 80.0, 10),
                ColumnDef::new("tvoc", 70.0, 8),
                ColumnDef::new("hcho", 70.0, 8),
                ColumnDef::new("radon", 90.0, 12),
                ColumnDef::new("result", 75.0, 8),
            ],
        )
    }

    pub fn level() -> Self {
        Self::standard(
            "레벨기 측정 결과",
            &["위치", "기준(mm)", "측정값", "결과"],
            vec![
                ColumnDef::new("location", 70.0, 8),
                ColumnDef::new("reference_mm", 45.0, 5),
                // Eight signed decimal readings plus the reference suffix
                ColumnDef::new("points", 320.0, 72),
                ColumnDef::new("result", 60.0, 6),
            ],
        )
    }

    /// Check the definition can be drawn
    pub fn validate(&self) -> Result<()> {
        if self.columns.len() != self.header_labels.len() {
            return Err(ReportError::Config(format!(
                "table '{}' has {} columns but {} header labels",
                self.title,
                self.columns.len(),
                self.header_labels.len()
            )));
        }
        if self.columns.is_empty() {
            return Err(ReportError::Config(format!(
                "table '{}' has no columns",
                self.title
            )));
        }
        if self.max_rows_per_page == 0 {
            return Err(ReportError::Config(format!(
                "table '{}' must allow at least one row per page",
                self.title
            )));
        }
        if self.row_height <= 0.0 || self.header_height <= 0.0 {
            return Err(ReportError::Config(format!(
                "table '{}' has a non-positive row or header height",
                self.title
            )));
        }
        if let Some(col) = self
            .columns
            .iter()
            .find(|c| c.width <= 0.0 || c.max_chars == 0)
        {
            return Err(ReportError::Config(format!(
                "column '{}' of table '{}' needs a positive width and character limit",
                col.field, self.title
            )));
        }
        Ok(())
    }
}

fn inspection_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("location", 110.0, 14),
        ColumnDef::new("trade", 90.0, 10),
        ColumnDef::new("note", 220.0, 28),
        ColumnDef::new("result", 75.0, 8),
    ]
}

/// Area of a template page left untouched by the white cover
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverMargins {
    /// Outer margin on every side
    pub margin: f64,
    /// Extra band kept at the top for the template banner
    #[serde(rename = "topMargin")]
    pub top_margin: f64,
}

impl Default for CoverMargins {
    fn default() -> Self {
        Self {
            margin: 24.0,
            top_margin: 30.0,
        }
    }
}

/// Font sizes used by the table engine, in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextSizes {
    pub title: f32,
    pub subtitle: f32,
    pub header: f32,
    pub cell: f32,
}

impl Default for TextSizes {
    fn default() -> Self {
        Self {
            title: 14.0,
            subtitle: 10.0,
            header: 9.0,
            cell: 8.0,
        }
    }
}

/// Full page layout of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Size of pages appended in data-only mode
    #[serde(rename = "pageWidth")]
    pub page_width: f64,
    #[serde(rename = "pageHeight")]
    pub page_height: f64,
    pub cover: CoverMargins,
    #[serde(rename = "textSizes")]
    pub text_sizes: TextSizes,
    pub visual: TableDefinition,
    pub thermal: TableDefinition,
    pub air: TableDefinition,
    pub level: TableDefinition,
    /// Drawing order of the sections and their template pages
    pub slots: Vec<SlotMapping>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: pdf_core::A4_WIDTH,
            page_height: pdf_core::A4_HEIGHT,
            cover: CoverMargins::default(),
            text_sizes: TextSizes::default(),
            visual: TableDefinition::visual(),
            thermal: TableDefinition::thermal(),
            air: TableDefinition::air(),
            level: TableDefinition::level(),
            slots: vec![
                SlotMapping::new(7, Section::Visual),
                SlotMapping::new(9, Section::Thermal),
                SlotMapping::new(11, Section::Air),
                SlotMapping::new(12, Section::Level),
            ],
        }
    }
}

impl LayoutConfig {
    pub fn table(&self, section: Section) -> &TableDefinition {
        match section {
            Section::Visual => &self.visual,
            Section::Thermal => &self.thermal,
            Section::Air => &self.air,
            Section::Level => &self.level,
        }
    }

    /// Pages a template needs to host every slot
    pub fn required_template_pages(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| slot.page_index + 1)
            .max()
            .unwrap_or(0)
            .max(MIN_TEMPLATE_PAGES)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_width <= 0.0 || self.page_height <= 0.0 {
            return Err(ReportError::Config(
                "page size must be positive".to_string(),
            ));
        }
        if self.slots.is_empty() {
            return Err(ReportError::Config("no slots configured".to_string()));
        }
        for section in [Section::Visual, Section::Thermal, Section::Air, Section::Level] {
            self.table(section).validate()?;
        }
        Ok(())
    }
}
