//! Rasterization helpers for 2D primitives
//!
//! Pure span/point generators used by the framebuffer, plus a tiny 3x5
//! bitmap font for gate labels.

use glam::Vec2;

/// Corners of a thick line as a quad (for scanline filling)
pub fn line_quad(from: Vec2, to: Vec2, width: f32) -> [Vec2; 4] {
    let dir = (to - from).normalize_or_zero();
    let perp = Vec2::new(-dir.y, dir.x) * (width.max(1.0) / 2.0);
    [from + perp, to + perp, to - perp, from - perp]
}

/// Horizontal spans covering a convex polygon
pub fn convex_spans(points: &[Vec2]) -> Vec<(i32, i32, i32)> {
    if points.len() < 3 {
        return Vec::new();
    }
    let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
    if !min_y.is_finite() || !max_y.is_finite() {
        return Vec::new();
    }

    let mut spans = Vec::new();
    for y in min_y.floor() as i32..=max_y.ceil() as i32 {
        let sy = y as f32 + 0.5;
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            if (a.y <= sy && b.y > sy) || (b.y <= sy && a.y > sy) {
                let t = (sy - a.y) / (b.y - a.y);
                let x = a.x + (b.x - a.x) * t;
                lo = lo.min(x);
                hi = hi.max(x);
            }
        }
        if hi > lo {
            let xs = lo.round() as i32;
            let xe = hi.round() as i32;
            // Keep hairlines visible
            let xe = if xe == xs { xs + 1 } else { xe };
            spans.push((y, xs, xe));
        }
    }
    spans
}

/// Glyph cell size of the label font
pub const GLYPH_W: u32 = 3;
pub const GLYPH_H: u32 = 5;

/// 3x5 glyph rows (bit 2 = left column) for label characters
pub fn glyph(c: char) -> Option<[u8; 5]> {
    let rows = match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        'x' | 'X' => [0b000, 0b101, 0b010, 0b101, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ' ' => [0; 5],
        _ => return None,
    };
    Some(rows)
}

/// Lit cells of `text` in glyph-grid units, with one empty column between glyphs
pub fn text_cells(text: &str) -> Vec<(u32, u32)> {
    let mut cells = Vec::new();
    let mut cursor = 0;
    for c in text.chars() {
        let Some(rows) = glyph(c) else {
            continue;
        };
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - col)) != 0 {
                    cells.push((cursor + col, row as u32));
                }
            }
        }
        cursor += GLYPH_W + 1;
    }
    cells
}

/// Width of `text` in glyph-grid units
pub fn text_width(text: &str) -> u32 {
    let n = text.chars().filter(|c| glyph(*c).is_some()).count() as u32;
    if n == 0 { 0 } else { n * (GLYPH_W + 1) - 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convex_spans_rectangle() {
        let quad = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 4.0),
            Vec2::new(0.0, 4.0),
        ];
        let spans = convex_spans(&quad);
        assert_eq!(spans.len(), 4);
        assert!(spans.iter().all(|&(_, xs, xe)| xs == 0 && xe == 10));
    }

    #[test]
    fn test_text_layout() {
        assert_eq!(text_width("x2"), 7);
        assert_eq!(text_width(""), 0);
        // '-' lights the middle row only
        assert_eq!(text_cells("-"), vec![(0, 2), (1, 2), (2, 2)]);
        // Unknown glyphs are skipped
        assert_eq!(text_width("?1"), 3);
    }
}
