//! Draw surface
//!
//! Entities draw straight onto a [`Surface`]; nothing is retained between
//! frames. [`Framebuffer`] is the software implementation that the web host
//! blits into a canvas.

use glam::Vec2;

use super::color::Rgba;
use super::projection::ScreenRect;
use super::shapes;
use crate::assets::Sprite;

/// 2D raster target
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Fill the whole surface
    fn clear(&mut self, color: Rgba);

    /// Blend `color` over one horizontal run of pixels `[x_start, x_end)`
    fn blend_span(&mut self, y: i32, x_start: i32, x_end: i32, color: Rgba);

    /// Draw `sprite` stretched into `rect`
    ///
    /// Alpha is multiplied by `opacity`, RGB by `brightness`.
    fn draw_sprite(&mut self, sprite: &Sprite, rect: ScreenRect, opacity: f32, brightness: f32);

    /// View center, the origin of projected coordinates
    fn center(&self) -> Vec2 {
        Vec2::new(self.width() as f32 / 2.0, self.height() as f32 / 2.0)
    }

    fn fill_rect(&mut self, rect: ScreenRect, color: Rgba) {
        if rect.is_empty() {
            return;
        }
        let x0 = rect.x.round() as i32;
        let x1 = rect.right().round() as i32;
        for y in rect.y.round() as i32..rect.bottom().round() as i32 {
            self.blend_span(y, x0, x1, color);
        }
    }

    /// Rectangle outline `thickness` pixels wide, drawn inside `rect`
    fn stroke_rect(&mut self, rect: ScreenRect, thickness: f32, color: Rgba) {
        let t = thickness.max(1.0).min(rect.w / 2.0).min(rect.h / 2.0);
        if t <= 0.0 {
            return;
        }
        self.fill_rect(ScreenRect::new(rect.x, rect.y, rect.w, t), color);
        self.fill_rect(ScreenRect::new(rect.x, rect.bottom() - t, rect.w, t), color);
        self.fill_rect(ScreenRect::new(rect.x, rect.y + t, t, rect.h - 2.0 * t), color);
        self.fill_rect(ScreenRect::new(rect.right() - t, rect.y + t, t, rect.h - 2.0 * t), color);
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        if !from.is_finite() || !to.is_finite() {
            return;
        }
        let quad = shapes::line_quad(from, to, width);
        for (y, xs, xe) in shapes::convex_spans(&quad) {
            self.blend_span(y, xs, xe, color);
        }
    }

    /// Bitmap-font text, `cell` pixels per glyph cell, centered on `center`
    fn draw_text(&mut self, text: &str, center: Vec2, cell: f32, color: Rgba) {
        if cell < 0.5 {
            return;
        }
        let w = shapes::text_width(text) as f32 * cell;
        let h = shapes::GLYPH_H as f32 * cell;
        let origin = center - Vec2::new(w, h) / 2.0;
        for (cx, cy) in shapes::text_cells(text) {
            let r = ScreenRect::new(origin.x + cx as f32 * cell, origin.y + cy as f32 * cell, cell, cell);
            self.fill_rect(r, color);
        }
    }
}

/// RGBA software framebuffer
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::BLACK; (width * height) as usize],
        }
    }

    /// Resize, discarding contents
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![Rgba::BLACK; (width * height) as usize];
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        if x >= self.width || y >= self.height {
            return Rgba::TRANSPARENT;
        }
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA8 bytes, ready for canvas `ImageData`
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

impl Surface for Framebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    fn blend_span(&mut self, y: i32, x_start: i32, x_end: i32, color: Rgba) {
        if y < 0 || y >= self.height as i32 || color.a == 0 {
            return;
        }
        let xs = x_start.max(0);
        let xe = x_end.min(self.width as i32);
        if xe <= xs {
            return;
        }
        let row = (y as u32 * self.width) as usize;
        for px in &mut self.pixels[row + xs as usize..row + xe as usize] {
            *px = color.blend_over(*px);
        }
    }

    fn draw_sprite(&mut self, sprite: &Sprite, rect: ScreenRect, opacity: f32, brightness: f32) {
        if rect.is_empty() || opacity <= 0.0 {
            return;
        }
        let x0 = rect.x.round().max(0.0) as i32;
        let y0 = rect.y.round().max(0.0) as i32;
        let x1 = rect.right().round().min(self.width as f32) as i32;
        let y1 = rect.bottom().round().min(self.height as f32) as i32;

        for y in y0..y1 {
            let v = (y as f32 + 0.5 - rect.y) / rect.h;
            let row = (y as u32 * self.width) as usize;
            for x in x0..x1 {
                let u = (x as f32 + 0.5 - rect.x) / rect.w;
                let src = sprite.sample(u, v);
                if src.a == 0 {
                    continue;
                }
                let px = &mut self.pixels[row + x as usize];
                let src = if brightness < 1.0 { src.darken(brightness) } else { src };
                *px = src.with_alpha(opacity).blend_over(*px);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_and_bytes() {
        let mut fb = Framebuffer::new(4, 3);
        fb.clear(Rgba::rgb(1, 2, 3));
        assert_eq!(fb.as_bytes().len(), 4 * 3 * 4);
        assert_eq!(&fb.as_bytes()[0..4], &[1, 2, 3, 255]);
    }

    #[test]
    fn test_resize_discards_contents() {
        let mut fb = Framebuffer::new(4, 4);
        fb.clear(Rgba::WHITE);
        fb.resize(4, 4);
        assert_eq!(fb.pixel(0, 0), Rgba::WHITE);

        fb.resize(6, 2);
        assert_eq!((fb.width(), fb.height()), (6, 2));
        assert_eq!(fb.pixels().len(), 12);
        assert_eq!(fb.pixel(5, 1), Rgba::BLACK);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut fb = Framebuffer::new(8, 8);
        fb.clear(Rgba::BLACK);
        fb.fill_rect(ScreenRect::new(-4.0, -4.0, 8.0, 8.0), Rgba::WHITE);
        assert_eq!(fb.pixel(0, 0), Rgba::WHITE);
        assert_eq!(fb.pixel(3, 3), Rgba::WHITE);
        assert_eq!(fb.pixel(4, 4), Rgba::BLACK);
    }

    #[test]
    fn test_later_draw_overpaints() {
        let mut fb = Framebuffer::new(8, 8);
        fb.clear(Rgba::BLACK);
        fb.fill_rect(ScreenRect::new(1.0, 1.0, 6.0, 6.0), Rgba::rgb(255, 0, 0));
        fb.fill_rect(ScreenRect::new(3.0, 3.0, 2.0, 2.0), Rgba::rgb(0, 255, 0));
        assert_eq!(fb.pixel(4, 4), Rgba::rgb(0, 255, 0));
        assert_eq!(fb.pixel(2, 2), Rgba::rgb(255, 0, 0));
    }

    #[test]
    fn test_draw_sprite_respects_alpha() {
        let mut fb = Framebuffer::new(16, 16);
        fb.clear(Rgba::BLACK);
        let sprite = Sprite::disc(16, Rgba::rgb(255, 255, 255));
        fb.draw_sprite(&sprite, ScreenRect::new(0.0, 0.0, 16.0, 16.0), 1.0, 1.0);
        assert_ne!(fb.pixel(8, 8), Rgba::BLACK);
        assert_eq!(fb.pixel(0, 0), Rgba::BLACK);
    }

    #[test]
    fn test_horizontal_line() {
        let mut fb = Framebuffer::new(10, 10);
        fb.clear(Rgba::BLACK);
        fb.draw_line(Vec2::new(1.0, 5.0), Vec2::new(9.0, 5.0), 2.0, Rgba::WHITE);
        assert_eq!(fb.pixel(5, 4), Rgba::WHITE);
        assert_eq!(fb.pixel(5, 8), Rgba::BLACK);
    }
}
