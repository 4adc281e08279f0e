use crate::engine::angle::{ANG90, Angle, point_to_pseudo};

/// Viewer state frozen for one frame.
///
/// Every angle the core produces is relative to this: straight ahead is
/// pseudo-angle 0 and angles grow counter-clockwise (to the viewer's left).
#[derive(Clone, Copy, Debug)]
pub struct Viewpoint {
    pub x: f64,
    pub y: f64,
    pub z: f64, // absolute eye height
    pub angle: Angle,
    sin: f64, // pre-derived once per frame
    cos: f64,
}

impl Viewpoint {
    pub fn new(x: f64, y: f64, z: f64, angle: Angle) -> Self {
        let (sin, cos) = angle.to_radians().sin_cos();
        Self {
            x,
            y,
            z,
            angle,
            sin,
            cos,
        }
    }

    /// World offset → view frame: `(forward, left)`.
    #[inline]
    pub fn to_view(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.x;
        let dy = y - self.y;
        (dx * self.cos + dy * self.sin, dy * self.cos - dx * self.sin)
    }

    /// View-relative pseudo-angle of a world point.
    #[inline]
    pub fn pseudo_angle_to(&self, x: f64, y: f64) -> Angle {
        let (fwd, left) = self.to_view(x, y);
        point_to_pseudo(fwd, left)
    }
}

/// Per-context knobs, fixed for the lifetime of a `RenderFrameContext`.
#[derive(Clone, Copy, Debug)]
pub struct FrameConfig {
    /// Horizontal field of view.
    pub fov: Angle,
    /// Occlude everything outside the field of view before the walk starts.
    pub frustum_clip: bool,
    /// Distance covered by one LOD step, in map units.
    pub lod_base_cube: f64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            fov: ANG90,
            frustum_clip: true,
            lod_base_cube: 256.0,
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::angle::{ANG180, ANG270};

    #[test]
    fn forward_is_zero_and_left_is_positive() {
        // facing north
        let view = Viewpoint::new(100.0, 100.0, 41.0, ANG90);
        assert_eq!(view.pseudo_angle_to(100.0, 200.0).0 >> 24, 0);
        assert_eq!(view.pseudo_angle_to(0.0, 100.0).0 >> 24, ANG90.0 >> 24);
        assert_eq!(view.pseudo_angle_to(100.0, 0.0).0 >> 24, ANG180.0 >> 24);
        assert_eq!(view.pseudo_angle_to(200.0, 100.0).0 >> 24, ANG270.0 >> 24);
    }

    #[test]
    fn eye_maps_to_zero() {
        let view = Viewpoint::new(3.0, 4.0, 0.0, Angle::from_degrees(33.0));
        assert_eq!(view.pseudo_angle_to(3.0, 4.0), Angle::ZERO);
    }
}
