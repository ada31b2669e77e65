//! Table layout engine
//!
//! Draws one section table on one page: title and subject line above the
//! origin, a shaded header band, then one bordered box per row with the cell
//! text left-aligned in each column.
//!
//! ```text
//!   Title
//!   101동 1203호  최종점검결과
//!  +--------+------+----------------+------+  <- origin.y
//!  | 위치   | 공종 | 내용           | 결과 |  header_height
//!  +--------+------+----------------+------+
//!  | row 0                                 |  row_height
//!  | row 1                                 |
//!  +---------------------------------------+
//! ```

use pdf_core::{Color, PdfDocument, Rect, DEFAULT_LINE_WIDTH};
use tracing::debug;

use crate::fonts::ReportFont;
use crate::layout::{TableDefinition, TextSizes};
use crate::model::ReportData;
use crate::Result;

/// Header labels longer than this are truncated
pub const HEADER_MAX_CHARS: usize = 30;
/// Left inset of cell text inside its column
pub const CELL_PADDING: f64 = 4.0;
/// Placeholder for absent values
pub const EMPTY_CELL: &str = "-";

const ROW_BOX_LINE_WIDTH: f64 = 0.6;
const BORDER_LINE_WIDTH: f64 = 0.8;

/// A row that can be rendered by field name
pub trait CellSource {
    /// Display value of `field`, `None` when absent
    fn cell_value(&self, field: &str) -> Option<String>;
}

/// What was drawn for one table
#[derive(Debug)]
pub struct TableRender<'a, R> {
    pub rows_drawn: usize,
    /// Items past the per-page row cap, not drawn
    pub overflow: &'a [R],
}

/// Fit a cell value into `max_chars` characters
///
/// Absent, empty and whitespace-only values become `-`. Longer values keep
/// their first `max_chars - 1` characters followed by `…`. Lengths count
/// Unicode scalar values.
pub fn text_for_cell(value: Option<&str>, max_chars: usize) -> String {
    let value = match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => return EMPTY_CELL.to_string(),
    };

    if value.chars().count() <= max_chars {
        return value.to_string();
    }

    let mut truncated: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        EMPTY_CELL
    } else {
        value
    }
}

/// Subject line shown under every table title
pub fn subject_line(report: &ReportData) -> String {
    format!(
        "{}동 {}호  최종점검결과",
        or_dash(&report.dong),
        or_dash(&report.ho)
    )
}

/// Baseline that vertically centers text of `size` in a band
fn centered_baseline(band_bottom: f64, band_height: f64, size: f32) -> f64 {
    band_bottom + band_height / 2.0 - size as f64 * 0.35
}

/// Draw a complete table on a 1-indexed page
///
/// At most `def.max_rows_per_page` items are drawn; the rest are returned as
/// overflow.
pub fn draw_table_page<'a, R: CellSource>(
    doc: &mut PdfDocument,
    page: usize,
    font: &ReportFont,
    def: &TableDefinition,
    sizes: &TextSizes,
    report: &ReportData,
    items: &'a [R],
) -> Result<TableRender<'a, R>> {
    let x = def.origin.x;
    let top = def.origin.y;
    let total_width = def.total_width();
    let header_bottom = top - def.header_height;

    doc.set_text_color(Color::black());

    doc.set_font(font.name, sizes.title)?;
    doc.insert_text(&def.title, page, x, top + 20.0)?;
    doc.set_font(font.name, sizes.subtitle)?;
    doc.insert_text(&subject_line(report), page, x, top + 6.0)?;

    // Header band
    doc.fill_rect(
        page,
        Rect::new(x, header_bottom, total_width, def.header_height),
        Color::gray(0.92),
    )?;
    doc.set_font(font.name, sizes.header)?;
    let header_y = centered_baseline(header_bottom, def.header_height, sizes.header);
    let mut col_x = x;
    for (label, col) in def.header_labels.iter().zip(&def.columns) {
        let label = text_for_cell(Some(label), HEADER_MAX_CHARS);
        doc.insert_text(&label, page, col_x + CELL_PADDING, header_y)?;
        col_x += col.width;
    }
    doc.draw_line(
        page,
        (x, header_bottom),
        (x + total_width, header_bottom),
        Color::black(),
        DEFAULT_LINE_WIDTH,
    )?;

    let split = items.len().min(def.max_rows_per_page);
    let (visible, overflow) = items.split_at(split);

    doc.set_font(font.name, sizes.cell)?;
    let row_color = Color::from_rgb(200, 30, 30);
    let separator_color = Color::gray(0.6);
    let last = def.columns.len().saturating_sub(1);

    for (r, item) in visible.iter().enumerate() {
        let row_y = header_bottom - (r as f64 + 1.0) * def.row_height;
        doc.stroke_rect(
            page,
            Rect::new(x, row_y, total_width, def.row_height),
            row_color,
            ROW_BOX_LINE_WIDTH,
        )?;

        let text_y = centered_baseline(row_y, def.row_height, sizes.cell);
        let mut col_x = x;
        for (i, col) in def.columns.iter().enumerate() {
            let value = item.cell_value(&col.field);
            let text = text_for_cell(value.as_deref(), col.max_chars);
            doc.insert_text(&text, page, col_x + CELL_PADDING, text_y)?;

            col_x += col.width;
            if i < last {
                doc.draw_line(
                    page,
                    (col_x, row_y),
                    (col_x, row_y + def.row_height),
                    separator_color,
                    DEFAULT_LINE_WIDTH,
                )?;
            }
        }
    }

    let body_height = visible.len() as f64 * def.row_height;
    doc.stroke_rect(
        page,
        Rect::new(
            x,
            header_bottom - body_height,
            total_width,
            def.header_height + body_height,
        ),
        Color::black(),
        BORDER_LINE_WIDTH,
    )?;

    debug!(
        page,
        table = %def.title,
        rows = visible.len(),
        overflow = overflow.len(),
        "drew table"
    );

    Ok(TableRender {
        rows_drawn: visible.len(),
        overflow,
    })
}
