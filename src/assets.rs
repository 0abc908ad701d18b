//! Sprite assets with an explicit load state
//!
//! Each slot is `Loading`, `Ready` or `Failed`. Drawing and pixel-mask
//! collision only ever see `Ready` sprites; everything else is a soft
//! "not ready" that is retried next frame.

use glam::Vec2;

use crate::renderer::color::Rgba;

/// RGBA sprite kept in memory for drawing and alpha sampling
#[derive(Debug, Clone)]
pub struct Sprite {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Sprite {
    /// Wrap raw RGBA8 bytes; `None` if the length does not match
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Option<Self> {
        if width == 0 || height == 0 || bytes.len() != (width * height * 4) as usize {
            return None;
        }
        let pixels: &[Rgba] = bytemuck::try_cast_slice(bytes).ok()?;
        Some(Self {
            width,
            height,
            pixels: pixels.to_vec(),
        })
    }

    /// Soft-edged filled disc with a lighter core
    pub fn disc(diameter: u32, color: Rgba) -> Self {
        let size = diameter.max(2);
        let r = size as f32 / 2.0;
        let center = Vec2::splat(r);
        let mut pixels = Vec::with_capacity((size * size) as usize);
        for y in 0..size {
            for x in 0..size {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = p.distance(center) / r;
                let px = if d > 1.0 {
                    Rgba::TRANSPARENT
                } else {
                    // Highlight toward the upper left
                    let hl = (1.0 - p.distance(center - Vec2::splat(r * 0.35)) / r).max(0.0);
                    let lift = |c: u8| (c as f32 + (255.0 - c as f32) * hl * 0.6) as u8;
                    let edge = ((1.0 - d) * r).clamp(0.0, 1.0);
                    Rgba::new(lift(color.r), lift(color.g), lift(color.b), (255.0 * edge) as u8)
                };
                pixels.push(px);
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    /// Spiky "virus" silhouette used for enemies
    pub fn spiky(diameter: u32, color: Rgba, spikes: u32) -> Self {
        let size = diameter.max(4);
        let r = size as f32 / 2.0;
        let center = Vec2::splat(r);
        let spikes = spikes.max(3) as f32;
        let mut pixels = Vec::with_capacity((size * size) as usize);
        for y in 0..size {
            for x in 0..size {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
                let angle = p.y.atan2(p.x);
                let limit = r * (0.72 + 0.28 * (angle * spikes).cos().max(0.0));
                let px = if p.length() <= limit {
                    let inner = p.length() < r * 0.3;
                    if inner { color.darken(0.6) } else { color }
                } else {
                    Rgba::TRANSPARENT
                };
                pixels.push(px);
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Pixel at integer coordinates, transparent outside the sprite
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        if x >= self.width || y >= self.height {
            return Rgba::TRANSPARENT;
        }
        self.pixels[(y * self.width + x) as usize]
    }

    /// Nearest-neighbour sample at normalized `(u, v)` in [0, 1)
    pub fn sample(&self, u: f32, v: f32) -> Rgba {
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return Rgba::TRANSPARENT;
        }
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        self.pixel(x, y)
    }

    /// Alpha at normalized coordinates
    pub fn alpha_at(&self, u: f32, v: f32) -> u8 {
        self.sample(u, v).a
    }
}

/// Load state of one asset slot
#[derive(Debug, Clone, Default)]
pub enum AssetState {
    #[default]
    Loading,
    Ready(Sprite),
    Failed,
}

/// Sprites the runner knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteId {
    Blob,
    Enemy,
    Wallpaper,
}

/// All sprite slots
#[derive(Debug, Clone, Default)]
pub struct Assets {
    blob: AssetState,
    enemy: AssetState,
    wallpaper: AssetState,
}

impl Assets {
    /// Every slot starts out loading
    pub fn new() -> Self {
        Self::default()
    }

    /// Procedural sprites, ready immediately
    pub fn procedural(blob_color: Rgba, enemy_color: Rgba) -> Self {
        let mut assets = Self::new();
        assets.set_ready(SpriteId::Blob, Sprite::disc(32, blob_color));
        assets.set_ready(SpriteId::Enemy, Sprite::spiky(48, enemy_color, 9));
        assets
    }

    fn slot(&self, id: SpriteId) -> &AssetState {
        match id {
            SpriteId::Blob => &self.blob,
            SpriteId::Enemy => &self.enemy,
            SpriteId::Wallpaper => &self.wallpaper,
        }
    }

    fn slot_mut(&mut self, id: SpriteId) -> &mut AssetState {
        match id {
            SpriteId::Blob => &mut self.blob,
            SpriteId::Enemy => &mut self.enemy,
            SpriteId::Wallpaper => &mut self.wallpaper,
        }
    }

    pub fn state(&self, id: SpriteId) -> &AssetState {
        self.slot(id)
    }

    /// Sprite if (and only if) its slot is ready
    pub fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        match self.slot(id) {
            AssetState::Ready(sprite) => Some(sprite),
            _ => None,
        }
    }

    pub fn set_ready(&mut self, id: SpriteId, sprite: Sprite) {
        log::debug!("Sprite {:?} ready ({}x{})", id, sprite.width(), sprite.height());
        *self.slot_mut(id) = AssetState::Ready(sprite);
    }

    pub fn set_failed(&mut self, id: SpriteId) {
        log::warn!("Sprite {:?} failed to load", id);
        *self.slot_mut(id) = AssetState::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba8_checks_length() {
        assert!(Sprite::from_rgba8(2, 2, &[0; 16]).is_some());
        assert!(Sprite::from_rgba8(2, 2, &[0; 15]).is_none());
        assert!(Sprite::from_rgba8(0, 2, &[]).is_none());
    }

    #[test]
    fn test_disc_alpha() {
        let s = Sprite::disc(16, Rgba::rgb(255, 0, 0));
        assert_eq!(s.alpha_at(0.5, 0.5), 255);
        assert_eq!(s.alpha_at(0.01, 0.01), 0);
        assert_eq!(s.alpha_at(1.5, 0.5), 0);
    }

    #[test]
    fn test_slots_start_loading() {
        let mut assets = Assets::new();
        assert!(assets.sprite(SpriteId::Blob).is_none());
        assert!(matches!(assets.state(SpriteId::Enemy), AssetState::Loading));

        assets.set_ready(SpriteId::Blob, Sprite::disc(8, Rgba::WHITE));
        assert!(assets.sprite(SpriteId::Blob).is_some());

        assets.set_failed(SpriteId::Enemy);
        assert!(matches!(assets.state(SpriteId::Enemy), AssetState::Failed));
        assert!(assets.sprite(SpriteId::Enemy).is_none());
    }
}
