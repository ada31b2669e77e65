//! Erasing template placeholders before tables are drawn

use pdf_core::{Color, PdfDocument, Rect};
use tracing::debug;

use crate::layout::CoverMargins;
use crate::Result;

/// Paint the page body white, keeping the top banner and outer margins
///
/// `page` is 1-indexed. Anything meant to be visible on the page must be
/// drawn after this call.
pub fn cover_page_body(doc: &mut PdfDocument, page: usize, cover: &CoverMargins) -> Result<Rect> {
    let (width, height) = doc.page_size(page)?;
    let rect = Rect::from_corners(
        cover.margin,
        cover.margin,
        width - cover.margin,
        height - cover.margin - cover.top_margin,
    );

    doc.fill_rect(page, rect, Color::white())?;
    debug!(page, ?rect, "covered template page body");

    Ok(rect)
}
