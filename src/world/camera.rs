use glam::{Vec2, Vec3};

use crate::engine::{angle::Angle, types::Viewpoint};

/// Player view-point in world space.
///
/// * Only **yaw** (heading) is simulated – Doom never tilts up/down.
/// * `z` holds absolute eye height in map units.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pos: Vec3, // x,y in map-units; z = eye height
    yaw: f32,  // radians (0 = east, counter-clockwise)
    fov: f32,  // horizontal FoV (radians, typical 90–110°)
}

impl Camera {
    /// Create a new camera at `pos`, facing `yaw`, with horizontal FoV `fov`.
    pub fn new(pos: Vec3, yaw: f32, fov: f32) -> Self {
        Self { pos, yaw, fov }
    }

    #[inline]
    pub fn pos(&self) -> Vec3 {
        self.pos
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
    }

    /// Frozen per-frame view state consumed by the visibility core.
    pub fn viewpoint(&self) -> Viewpoint {
        Viewpoint::new(
            self.pos.x as f64,
            self.pos.y as f64,
            self.pos.z as f64,
            Angle::from_radians(self.yaw as f64),
        )
    }

    #[inline]
    pub fn fov_angle(&self) -> Angle {
        Angle::from_radians(self.fov as f64)
    }

    /*──────────────────────── derived vectors ───────────────────────*/

    /// Unit vector pointing where the camera looks on the X-Y plane.
    #[inline(always)]
    pub fn forward(self) -> Vec2 {
        let (s, c) = self.yaw.sin_cos();
        Vec2::new(c, s) // 0 rad = +X (east), CCW positive
    }

    /// Unit vector pointing to the camera's right on the X-Y plane.
    #[inline(always)]
    pub fn right(self) -> Vec2 {
        let f = self.forward();
        Vec2::new(f.y, -f.x)
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Move by `forward` units and `side` (strafe right), preserving eye-height.
    pub fn step(&mut self, forward: f32, side: f32) {
        let f = self.forward();
        let r = self.right();
        self.pos.x += f.x * forward + r.x * side;
        self.pos.y += f.y * forward + r.y * side;
    }

    /// Rotate around Z-axis (positive = turn left).
    pub fn turn(&mut self, delta_yaw: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f32::consts::TAU);
    }

    pub fn set_eye_z(&mut self, z: f32) {
        self.pos.z = z;
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::angle::{ANG90, ANG180};
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn forward_and_right_are_orthonormal() {
        let cam = Camera::new(Vec3::ZERO, 0.3, 1.57);
        let f = cam.forward();
        let r = cam.right();
        assert!((f.length() - 1.0).abs() < 1e-5);
        assert!((r.length() - 1.0).abs() < 1e-5);
        assert!((f.dot(r)).abs() < 1e-5);
        // right is clockwise from forward
        assert!(f.perp_dot(r) < 0.0);
    }

    #[test]
    fn step_and_turn() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, 41.0), 0.0, FRAC_PI_2);
        cam.step(10.0, 0.0);
        assert!((cam.pos().truncate() - Vec2::new(10.0, 0.0)).length() < 1e-5);
        cam.step(0.0, 5.0);
        assert!((cam.pos().truncate() - Vec2::new(10.0, -5.0)).length() < 1e-5);
        assert_eq!(cam.pos().z, 41.0);

        cam.turn(-FRAC_PI_2);
        assert!((cam.yaw() - 3.0 * FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn viewpoint_carries_position_and_heading() {
        let cam = Camera::new(Vec3::new(32.0, -16.0, 41.0), PI, FRAC_PI_2);
        let view = cam.viewpoint();
        assert_eq!((view.x, view.y, view.z), (32.0, -16.0, 41.0));
        let diff = view.angle.0.wrapping_sub(ANG180.0);
        assert!(diff < 256 || diff > u32::MAX - 256);

        let fov = cam.fov_angle().0;
        assert!(fov.abs_diff(ANG90.0) < 256);
    }
}
