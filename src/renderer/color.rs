//! Packed RGBA colors for the software framebuffer

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 8-bit RGBA color, laid out exactly as canvas `ImageData` expects
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with alpha multiplied by `factor` (0-1)
    pub fn with_alpha(self, factor: f32) -> Self {
        let a = (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Scale RGB toward black; `factor` 1.0 keeps the color, 0.0 is black
    pub fn darken(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f32 * f).round() as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: self.a,
        }
    }

    /// Source-over blend of `self` onto `dst`
    #[inline]
    pub fn blend_over(self, dst: Rgba) -> Rgba {
        match self.a {
            0 => dst,
            255 => self,
            a => {
                let a = a as u16;
                let mix = |s: u8, d: u8| -> u8 {
                    let v = s as u16 * a + d as u16 * (255 - a);
                    ((v + 1 + (v >> 8)) >> 8) as u8
                };
                let out_a = a + (dst.a as u16 * (255 - a) + 127) / 255;
                Rgba {
                    r: mix(self.r, dst.r),
                    g: mix(self.g, dst.g),
                    b: mix(self.b, dst.b),
                    a: out_a.min(255) as u8,
                }
            }
        }
    }
}

/// Colors for game elements
pub mod palette {
    use super::Rgba;

    pub const BACKGROUND: Rgba = Rgba::rgb(12, 10, 28);
    pub const WALLPAPER_TOP: Rgba = Rgba::rgb(30, 18, 58);
    pub const WALLPAPER_BOTTOM: Rgba = Rgba::rgb(12, 10, 28);
    pub const MARKER: Rgba = Rgba::rgb(90, 200, 255);
    pub const LANE_LINE: Rgba = Rgba::rgb(140, 140, 190);
    pub const BLOB: Rgba = Rgba::rgb(80, 170, 255);
    pub const ENEMY: Rgba = Rgba::rgb(230, 60, 70);
    pub const GATE_ADD: Rgba = Rgba::rgb(60, 200, 120);
    pub const GATE_SUBTRACT: Rgba = Rgba::rgb(220, 70, 70);
    pub const GATE_MULTIPLY: Rgba = Rgba::rgb(90, 140, 255);
    pub const GATE_LABEL: Rgba = Rgba::WHITE;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_darken_toward_black() {
        let c = Rgba::rgb(200, 100, 50);
        assert_eq!(c.darken(1.0), c);
        assert_eq!(c.darken(0.0), Rgba::BLACK);
        assert_eq!(c.darken(0.5), Rgba::rgb(100, 50, 25));
    }

    #[test]
    fn test_blend_over_extremes() {
        let dst = Rgba::rgb(10, 20, 30);
        assert_eq!(Rgba::TRANSPARENT.blend_over(dst), dst);
        assert_eq!(Rgba::WHITE.blend_over(dst), Rgba::WHITE);

        let half = Rgba::new(255, 255, 255, 128).blend_over(Rgba::BLACK);
        assert!(half.r > 120 && half.r < 135);
        assert_eq!(half.a, 255);
    }
}
