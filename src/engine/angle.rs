//! Binary angles and pseudo-angles.
//!
//! An [`Angle`] is a `u32` on a circular domain: a full turn is 2^32 and all
//! arithmetic wraps.  Pseudo-angles keep the same domain and the same order as
//! true angles but come from a single division instead of `atan2`; they are
//! only ever compared, never used as a metric.

use std::f64::consts::TAU;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Largest representable angle; the clipper's default domain is `0..=ANGLE_MAX`.
pub const ANGLE_MAX: u32 = 0xFFFF_FFFF;

pub const ANG45: Angle = Angle(0x2000_0000);
pub const ANG90: Angle = Angle(0x4000_0000);
pub const ANG180: Angle = Angle(0x8000_0000);
pub const ANG270: Angle = Angle(0xC000_0000);

const FULL_TURN: f64 = 4_294_967_296.0; // 2^32
const PSEUDO_SCALE: f64 = 1_073_741_824.0; // 2^30: one pseudo unit per quadrant

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Angle(pub u32);

impl Angle {
    pub const ZERO: Angle = Angle(0);

    /// Any real angle, folded into one turn.
    pub fn from_radians(rad: f64) -> Self {
        let turns = (rad / TAU).rem_euclid(1.0);
        // rounding can reach exactly 2^32; the u64 hop lets that wrap to 0
        Angle((turns * FULL_TURN).round() as u64 as u32)
    }

    #[inline]
    pub fn from_degrees(deg: f64) -> Self {
        Self::from_radians(deg.to_radians())
    }

    #[inline]
    pub fn to_radians(self) -> f64 {
        self.0 as f64 / FULL_TURN * TAU
    }

    /// Pseudo-angle with the same direction as this true angle.
    pub fn to_pseudo(self) -> Angle {
        let (s, c) = self.to_radians().sin_cos();
        point_to_pseudo(c, s)
    }
}

/// Pseudo-angle of the direction `(dx, dy)`.
///
/// `v = dy / (|dx| + |dy|)` runs −1‥1 over the right half-plane; the left
/// half-plane uses `2 − v`, giving a value in −1‥3 that is scaled by 2^30.
/// The negative part (fourth quadrant) wraps to the top of the `u32` range,
/// so the result is monotonic in the true angle over the whole turn and
/// antipodal directions differ by exactly [`ANG180`].  `(0, 0)` maps to 0.
pub fn point_to_pseudo(dx: f64, dy: f64) -> Angle {
    let sum = dx.abs() + dy.abs();
    if sum == 0.0 {
        return Angle::ZERO;
    }
    let v = dy / sum;
    let v = if dx < 0.0 { 2.0 - v } else { v };
    Angle((v * PSEUDO_SCALE) as i64 as u32)
}

/*──────────────────────── wrapping arithmetic ─────────────────────*/

impl Add for Angle {
    type Output = Angle;
    #[inline]
    fn add(self, rhs: Angle) -> Angle {
        Angle(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Angle {
    type Output = Angle;
    #[inline]
    fn sub(self, rhs: Angle) -> Angle {
        Angle(self.0.wrapping_sub(rhs.0))
    }
}

impl Neg for Angle {
    type Output = Angle;
    #[inline]
    fn neg(self) -> Angle {
        Angle(self.0.wrapping_neg())
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Angle) {
        *self = *self + rhs;
    }
}

impl SubAssign for Angle {
    fn sub_assign(&mut self, rhs: Angle) {
        *self = *self - rhs;
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
