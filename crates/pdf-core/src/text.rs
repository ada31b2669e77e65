//! Text rendering utilities

use crate::document::Color;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text color (RGB)
    pub color: Color,
}

/// Generate PDF operators for text insertion
///
/// Creates the PDF text operators (BT, Tf, Td, Tj, ET) to render text with
/// its baseline starting at the given position.
///
/// # Arguments
/// * `operand` - Encoded string operand, hex (`<0041>`) for embedded fonts
///   or literal (`(A)`) for built-in fonts
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Y coordinate in points (PDF coordinates, from bottom)
/// * `ctx` - Text rendering context
pub fn generate_text_operators(operand: &str, x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    let mut ops = String::new();

    ops.push_str("BT\n");

    // Non-stroking color applies to glyph fill
    ops.push_str(&format!(
        "{} {} {} rg\n",
        ctx.color.r, ctx.color.g, ctx.color.b
    ));

    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));
    ops.push_str(&format!("{x} {y} Td\n"));
    ops.push_str(&format!("{operand} Tj\n"));

    ops.push_str("ET\n");

    ops.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_text_operators() {
        let ctx = TextRenderContext {
            font_name: "F1".to_string(),
            font_size: 12.0,
            color: Color::black(),
        };

        let ops = generate_text_operators("<00480065006C006C006F>", 100.0, 700.0, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("BT"));
        assert!(ops_str.contains("/F1 12 Tf"));
        assert!(ops_str.contains("100 700 Td"));
        assert!(ops_str.contains("<00480065006C006C006F> Tj"));
        assert!(ops_str.contains("ET"));
    }

    #[test]
    fn test_generate_text_operators_fractional_position() {
        let ctx = TextRenderContext {
            font_name: "F2".to_string(),
            font_size: 8.5,
            color: Color::black(),
        };

        let ops = generate_text_operators("(Test)", 54.5, 600.25, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("/F2 8.5 Tf"));
        assert!(ops_str.contains("54.5 600.25 Td"));
        assert!(ops_str.contains("(Test) Tj"));
    }

    #[test]
    fn test_generate_text_operators_with_color() {
        let ctx = TextRenderContext {
            font_name: "F1".to_string(),
            font_size: 12.0,
            color: Color::rgb(1.0, 0.0, 0.0),
        };

        let ops = generate_text_operators("<0041>", 100.0, 700.0, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("1 0 0 rg"));
    }
}
