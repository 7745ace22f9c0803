//! Per-frame scene motion: pointer smoothing, rotation and camera drift.

use glam::{EulerRot, Mat4, Vec2, Vec3};

pub const CAMERA_DISTANCE: f32 = 60.0;
pub const FOV_DEGREES: f32 = 85.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;

const POINTER_EASE: f32 = 0.05;
const ROTATION_EASE: f32 = 0.02;
const CAMERA_EASE: f32 = 0.01;
const SPIN_PER_FRAME: f32 = 0.0005;

/// Pointer in normalized device coordinates, eased toward the last event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerTracker {
    pub target: Vec2,
    pub current: Vec2,
}

impl PointerTracker {
    /// Client pixels to NDC, y up.
    pub fn aim(&mut self, client_x: f64, client_y: f64, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.target = Vec2::new(
            ((client_x / width) * 2.0 - 1.0) as f32,
            (-(client_y / height) * 2.0 + 1.0) as f32,
        );
    }

    pub fn step(&mut self) -> Vec2 {
        self.current += (self.target - self.current) * POINTER_EASE;
        self.current
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneMotion {
    pub rotation: Vec3,
    pub camera: Vec3,
}

impl Default for SceneMotion {
    fn default() -> Self {
        Self { rotation: Vec3::ZERO, camera: Vec3::new(0.0, 0.0, CAMERA_DISTANCE) }
    }
}

impl SceneMotion {
    pub fn step(&mut self, pointer: Vec2) {
        self.rotation.y += (pointer.x * 0.15 - self.rotation.y) * ROTATION_EASE;
        self.rotation.x += (pointer.y * 0.1 - self.rotation.x) * ROTATION_EASE;
        self.rotation.z += SPIN_PER_FRAME;

        self.camera.x += (pointer.x * 5.0 - self.camera.x) * CAMERA_EASE;
        self.camera.y += (pointer.y * 3.0 - self.camera.y) * CAMERA_EASE;
    }

    /// Shared by the points and the connection lines.
    pub fn model(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.camera, Vec3::ZERO, Vec3::Y)
    }
}

pub fn projection(aspect: f32) -> Mat4 {
    let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
    Mat4::perspective_rh_gl(FOV_DEGREES.to_radians(), aspect, NEAR, FAR)
}

pub fn pixel_ratio(device_pixel_ratio: f64) -> f32 {
    device_pixel_ratio.min(2.0) as f32
}

/// How far a section has scrolled into view: 0 while below the fold, 1 once
/// its top reaches the top of the viewport.
pub fn section_reveal(section_top: f64, viewport_height: f64) -> f64 {
    if viewport_height <= 0.0 {
        return 0.0;
    }
    (1.0 - section_top / viewport_height).clamp(0.0, 1.0)
}

/// Everything the particle shader reads per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub time: f32,
    pub pixel_ratio: f32,
    pub pointer: Vec2,
    pub scroll: f32,
    pub convergence: f32,
    pub explosion: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aim_maps_corners_to_ndc() {
        let mut p = PointerTracker::default();
        p.aim(0.0, 0.0, 800.0, 600.0);
        assert_eq!(p.target, Vec2::new(-1.0, 1.0));
        p.aim(800.0, 600.0, 800.0, 600.0);
        assert_eq!(p.target, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn pointer_eases() {
        let mut p = PointerTracker { target: Vec2::new(1.0, 0.0), current: Vec2::ZERO };
        let first = p.step();
        assert!((first.x - 0.05).abs() < 1e-6);
        for _ in 0..400 {
            p.step();
        }
        assert!((p.current.x - 1.0).abs() < 1e-3);
    }

    #[test]
    fn scene_spins_without_pointer() {
        let mut s = SceneMotion::default();
        for _ in 0..10 {
            s.step(Vec2::ZERO);
        }
        assert!((s.rotation.z - 0.005).abs() < 1e-6);
        assert_eq!(s.camera.z, CAMERA_DISTANCE);
    }

    #[test]
    fn reveal_is_clamped() {
        assert_eq!(section_reveal(1200.0, 800.0), 0.0);
        assert_eq!(section_reveal(400.0, 800.0), 0.5);
        assert_eq!(section_reveal(-50.0, 800.0), 1.0);
        assert_eq!(section_reveal(10.0, 0.0), 0.0);
    }

    #[test]
    fn pixel_ratio_capped() {
        assert_eq!(pixel_ratio(3.0), 2.0);
        assert_eq!(pixel_ratio(1.5), 1.5);
    }
}
