//! Software rendering
//!
//! Perspective projection, the chase camera, the recycled track and the
//! depth-sorted scene, all drawn onto a [`Surface`].

pub mod camera;
pub mod color;
pub mod projection;
pub mod scene;
pub mod shapes;
pub mod surface;
pub mod track;

pub use camera::Camera;
pub use color::Rgba;
pub use projection::{CameraPose, ProjectedPoint, ScreenRect, project};
pub use scene::{Renderer, depth_order};
pub use surface::{Framebuffer, Surface};
pub use track::{Track, TrackState};
