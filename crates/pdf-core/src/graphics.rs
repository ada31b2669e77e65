//! Vector graphics operators (rectangles and rules)

use crate::document::Color;

/// Default stroke width for borders and grid lines, in points
pub const DEFAULT_LINE_WIDTH: f64 = 0.5;

/// Axis-aligned rectangle in PDF page space
///
/// `(x, y)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from two opposite corners
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        }
    }
}

/// Generate operators that paint an opaque filled rectangle
///
/// The graphics state is saved and restored so the fill color does not leak
/// into later content.
pub fn fill_rect_operators(rect: Rect, color: Color) -> Vec<u8> {
    format!(
        "q\n{} {} {} rg\n{} {} {} {} re\nf\nQ\n",
        color.r, color.g, color.b, rect.x, rect.y, rect.width, rect.height
    )
    .into_bytes()
}

/// Generate operators that stroke the outline of a rectangle
pub fn stroke_rect_operators(rect: Rect, color: Color, line_width: f64) -> Vec<u8> {
    format!(
        "q\n{} {} {} RG\n{} w\n{} {} {} {} re\nS\nQ\n",
        color.r, color.g, color.b, line_width, rect.x, rect.y, rect.width, rect.height
    )
    .into_bytes()
}

/// Generate operators for a straight line from `(x1, y1)` to `(x2, y2)`
pub fn line_operators(x1: f64, y1: f64, x2: f64, y2: f64, color: Color, line_width: f64) -> Vec<u8> {
    format!(
        "q\n{} {} {} RG\n{} w\n{x1} {y1} m\n{x2} {y2} l\nS\nQ\n",
        color.r, color.g, color.b, line_width
    )
    .into_bytes()
}
