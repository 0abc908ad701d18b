//! Frame timing
//!
//! Turns host timestamps (milliseconds, e.g. `requestAnimationFrame`) into a
//! capped delta in seconds. The cap bounds the catch-up step after a stall
//! such as a hidden tab.

use crate::consts::MAX_FRAME_DT;

#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
    frames: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT)
    }
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt: max_dt.max(0.0),
            frames: 0,
        }
    }

    /// Seconds since the previous call; 0 on the first frame or if time ran backwards
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        self.frames += 1;
        let dt = match self.last_ms.replace(now_ms) {
            Some(last) if now_ms > last => ((now_ms - last) / 1000.0) as f32,
            _ => 0.0,
        };
        dt.min(self.max_dt)
    }

    /// Next tick starts from zero again
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
