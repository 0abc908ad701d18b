//! Chase camera
//!
//! Holds the pose that every projection in a frame reads. The pose is
//! snapshotted once per frame via [`Camera::pose`] before any draw call.

use glam::Vec3;

use super::projection::{CameraPose, ProjectedPoint, project};
use crate::consts::{MAX_PITCH_DEGREES, MIN_PITCH_DEGREES};
use crate::settings::CameraSettings;

#[derive(Debug, Clone)]
pub struct Camera {
    x: f32,
    y: f32,
    z: f32,
    angle_degrees: f32,
    /// Fixed height held while following
    follow_height: f32,
    /// Trailing Z offset while following
    follow_distance: f32,
}

impl Camera {
    pub fn new(settings: &CameraSettings) -> Self {
        let mut camera = Self {
            x: 0.0,
            y: settings.height,
            z: -settings.follow_distance,
            angle_degrees: 0.0,
            follow_height: settings.height,
            follow_distance: settings.follow_distance,
        };
        camera.set_angle(settings.pitch_degrees);
        camera
    }

    /// Track the target laterally with no smoothing, trail it by a fixed Z
    pub fn follow_target(&mut self, target: Vec3) {
        self.x = target.x;
        self.y = self.follow_height;
        self.z = target.z - self.follow_distance;
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.x = x;
        self.y = y;
        self.z = z;
    }

    /// Set pitch, silently clamped to [1, 89] degrees
    pub fn set_angle(&mut self, degrees: f32) {
        self.angle_degrees = if degrees.is_nan() {
            MIN_PITCH_DEGREES
        } else {
            degrees.clamp(MIN_PITCH_DEGREES, MAX_PITCH_DEGREES)
        };
    }

    pub fn angle(&self) -> f32 {
        self.angle_degrees
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Snapshot for this frame
    pub fn pose(&self) -> CameraPose {
        CameraPose {
            x: self.x,
            y: self.y,
            z: self.z,
            angle_degrees: self.angle_degrees,
        }
    }

    pub fn project(&self, point: Vec3) -> ProjectedPoint {
        project(point, &self.pose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::CAMERA_FOLLOW_DISTANCE;

    #[test]
    fn test_follow_target() {
        let mut cam = Camera::new(&CameraSettings::default());
        cam.follow_target(Vec3::new(40.0, 12.0, 1000.0));
        let pose = cam.pose();
        assert_eq!(pose.x, 40.0);
        assert_eq!(pose.y, 280.0);
        assert_eq!(pose.z, 1000.0 - CAMERA_FOLLOW_DISTANCE);

        // Idempotent
        cam.follow_target(Vec3::new(40.0, 12.0, 1000.0));
        assert_eq!(cam.pose(), pose);
    }

    #[test]
    fn test_angle_clamp() {
        let mut cam = Camera::new(&CameraSettings::default());
        assert_eq!(cam.angle(), 15.0);
        cam.set_angle(0.0);
        assert_eq!(cam.angle(), MIN_PITCH_DEGREES);
        cam.set_angle(90.0);
        assert_eq!(cam.angle(), MAX_PITCH_DEGREES);
        cam.set_angle(-45.0);
        assert_eq!(cam.angle(), MIN_PITCH_DEGREES);
        cam.set_angle(f32::NAN);
        assert_eq!(cam.angle(), MIN_PITCH_DEGREES);
        cam.set_angle(45.0);
        assert_eq!(cam.angle(), 45.0);
    }

    #[test]
    fn test_set_position() {
        let mut cam = Camera::new(&CameraSettings::default());
        cam.set_position(0.0, 280.0, -133.0);
        let p = cam.project(Vec3::new(0.0, 0.0, 1000.0));
        assert!((p.depth - 1133.0).abs() < 1e-3);
        assert_eq!(cam.position(), Vec3::new(0.0, 280.0, -133.0));
    }
}
