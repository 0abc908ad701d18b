//! Platform glue
//!
//! Level-triggered input state and frame timing, shared by the wasm host and
//! the native demo.

pub mod input;
pub mod time;

pub use input::{InputSource, KeyState};
pub use time::FrameClock;
