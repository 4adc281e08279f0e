//! Angular occlusion clipper.
//!
//! Holds the view-relative angle ranges already hidden behind solid walls
//! this frame.  The set is sorted by `start`, disjoint and non-adjacent:
//! `intervals[i].end < intervals[i + 1].start` always holds.
//!
//! Ranges are inclusive on both ends.  The unchecked entry points take
//! `start <= end`; ranges that cross angle 0 go through the `safe_*` wrappers,
//! which split them at the top of the domain.

use thiserror::Error;

use crate::engine::angle::{ANGLE_MAX, Angle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AngleInterval {
    pub start: Angle,
    pub end: Angle,
}

impl AngleInterval {
    #[inline]
    fn covers(&self, a: Angle, b: Angle) -> bool {
        self.start <= a && b <= self.end
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClipError {
    #[error("inverted range {start:?}..{end:?}; wrapping ranges need the safe_* calls")]
    Inverted { start: Angle, end: Angle },

    #[error("angle {angle:?} is past the clipper domain 0..={max}")]
    OutOfDomain { angle: Angle, max: u32 },
}

#[derive(Clone, Debug)]
pub struct Clipper {
    intervals: Vec<AngleInterval>,
    max: Angle,
}

impl Default for Clipper {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipper {
    /// Clipper over the full binary-angle turn.
    pub fn new() -> Self {
        Self::with_max(ANGLE_MAX)
    }

    /// Clipper over `0..=max`.
    pub fn with_max(max: u32) -> Self {
        Self {
            intervals: Vec::with_capacity(64),
            max: Angle(max),
        }
    }

    #[inline]
    pub fn max(&self) -> Angle {
        self.max
    }

    /// Forget every range.  Capacity is kept for the next frame.
    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    #[inline]
    pub fn intervals(&self) -> &[AngleInterval] {
        &self.intervals
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Every direction is hidden; nothing further can become visible.
    pub fn is_fully_occluded(&self) -> bool {
        matches!(self.intervals.first(), Some(iv) if iv.start == Angle::ZERO && iv.end == self.max)
    }

    /// Sorted, disjoint, non-adjacent and inside the domain.
    pub fn is_well_formed(&self) -> bool {
        self.intervals
            .iter()
            .all(|iv| iv.start <= iv.end && iv.end <= self.max)
            && self
                .intervals
                .windows(2)
                .all(|w| w[0].end < w[1].start)
    }

    /*──────────────────────── queries ─────────────────────────*/

    /// `false` only when one interval swallows the whole of `start..=end`.
    /// Partly covered ranges stay visible.
    pub fn is_range_visible(&self, start: Angle, end: Angle) -> Result<bool, ClipError> {
        self.check(start, end)?;
        Ok(self.visible(start, end))
    }

    /// Like [`Self::is_range_visible`], but `start > end` means the range
    /// crosses angle 0.  Visible if either half is.
    pub fn safe_check_range(&self, start: Angle, end: Angle) -> bool {
        let (start, end) = (self.clamp(start), self.clamp(end));
        if start > end {
            self.visible(start, self.max) || self.visible(Angle::ZERO, end)
        } else {
            self.visible(start, end)
        }
    }

    fn visible(&self, a: Angle, b: Angle) -> bool {
        if b == Angle::ZERO && matches!(self.intervals.first(), Some(iv) if iv.start == Angle::ZERO)
        {
            return false;
        }
        !self
            .intervals
            .iter()
            .take_while(|iv| iv.start <= a)
            .any(|iv| iv.covers(a, b))
    }

    /*──────────────────────── insertion ───────────────────────*/

    /// Mark `start..=end` as occluded, merging with every interval it
    /// overlaps or touches.
    pub fn add_range(&mut self, start: Angle, end: Angle) -> Result<(), ClipError> {
        self.check(start, end)?;
        self.insert(start, end);
        Ok(())
    }

    /// Like [`Self::add_range`], splitting a range that crosses angle 0 into
    /// `start..=max` and `0..=end`.
    pub fn safe_add_range(&mut self, start: Angle, end: Angle) {
        let (start, end) = (self.clamp(start), self.clamp(end));
        if start > end {
            self.insert(start, self.max);
            self.insert(Angle::ZERO, end);
        } else {
            self.insert(start, end);
        }
    }

    /// Occlude the arc between two true angles, `start` counter-clockwise
    /// to `end`.  Used for the view frustum.
    pub fn add_range_true_angles(&mut self, start: Angle, end: Angle) {
        self.safe_add_range(start.to_pseudo(), end.to_pseudo());
    }

    fn insert(&mut self, a: Angle, b: Angle) {
        // 1. drop everything the new range swallows
        self.intervals.retain(|iv| !(a <= iv.start && iv.end <= b));

        // 2. the first survivor with end >= a overlaps iff it starts by b
        let i = self.intervals.partition_point(|iv| iv.end < a);
        if i < self.intervals.len() && self.intervals[i].start <= b {
            let iv = &mut self.intervals[i];
            iv.start = iv.start.min(a);
            iv.end = iv.end.max(b);

            let mut end = iv.end;
            let mut j = i + 1;
            while j < self.intervals.len() && self.intervals[j].start <= end {
                end = end.max(self.intervals[j].end);
                j += 1;
            }
            self.intervals[i].end = end;
            self.intervals.drain(i + 1..j);
        } else {
            // 3. no neighbour: sorted insert
            self.intervals.insert(i, AngleInterval { start: a, end: b });
        }

        debug_assert!(self.is_well_formed(), "clipper broken: {:?}", self.intervals);
    }

    /*──────────────────────── helpers ─────────────────────────*/

    fn check(&self, start: Angle, end: Angle) -> Result<(), ClipError> {
        if start > end {
            return Err(ClipError::Inverted { start, end });
        }
        if end > self.max {
            return Err(ClipError::OutOfDomain {
                angle: end,
                max: self.max.0,
            });
        }
        Ok(())
    }

    #[inline]
    fn clamp(&self, a: Angle) -> Angle {
        a.min(self.max)
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn a(v: u32) -> Angle {
        Angle(v)
    }

    fn spans(c: &Clipper) -> Vec<(u32, u32)> {
        c.intervals().iter().map(|iv| (iv.start.0, iv.end.0)).collect()
    }

    #[test]
    fn merge_scenario() {
        let mut c = Clipper::with_max(1000);
        c.add_range(a(100), a(200)).unwrap();
        assert_eq!(spans(&c), [(100, 200)]);
        c.add_range(a(150), a(250)).unwrap();
        assert_eq!(spans(&c), [(100, 250)]);
        c.add_range(a(400), a(450)).unwrap();
        assert_eq!(spans(&c), [(100, 250), (400, 450)]);
        c.add_range(a(250), a(400)).unwrap();
        assert_eq!(spans(&c), [(100, 450)]);

        assert!(!c.is_range_visible(a(120), a(140)).unwrap());
        assert!(c.is_range_visible(a(90), a(120)).unwrap());
        assert!(c.is_range_visible(a(500), a(600)).unwrap());
    }

    #[test]
    fn partial_cover_by_two_blockers_is_visible() {
        let mut c = Clipper::with_max(1000);
        c.add_range(a(100), a(200)).unwrap();
        c.add_range(a(201), a(300)).unwrap();
        // adjacent integers, but no shared endpoint: stays two intervals
        assert_eq!(c.len(), 2);
        assert!(c.is_range_visible(a(150), a(250)).unwrap());
    }

    #[test]
    fn new_range_swallows_several() {
        let mut c = Clipper::with_max(1000);
        for (s, e) in [(10, 20), (30, 40), (50, 60), (70, 80)] {
            c.add_range(a(s), a(e)).unwrap();
        }
        c.add_range(a(25), a(65)).unwrap();
        assert_eq!(spans(&c), [(10, 20), (25, 65), (70, 80)]);
        c.add_range(a(0), a(1000)).unwrap();
        assert_eq!(spans(&c), [(0, 1000)]);
        assert!(c.is_fully_occluded());
    }

    #[test]
    fn wrap_around_equals_two_halves() {
        let mut wrapped = Clipper::with_max(1000);
        wrapped.add_range(a(300), a(320)).unwrap();
        wrapped.safe_add_range(a(950), a(50));

        let mut split = Clipper::with_max(1000);
        split.add_range(a(300), a(320)).unwrap();
        split.add_range(a(950), a(1000)).unwrap();
        split.add_range(a(0), a(50)).unwrap();

        assert_eq!(wrapped.intervals(), split.intervals());
        assert_eq!(spans(&wrapped), [(0, 50), (300, 320), (950, 1000)]);
    }

    #[test]
    fn safe_check_is_visible_if_either_half_is() {
        let mut c = Clipper::with_max(1000);
        c.add_range(a(900), a(1000)).unwrap();
        assert!(c.safe_check_range(a(950), a(10)));
        c.add_range(a(0), a(20)).unwrap();
        assert!(!c.safe_check_range(a(950), a(10)));
        assert!(c.safe_check_range(a(950), a(30)));
    }

    #[test]
    fn add_is_idempotent() {
        let mut once = Clipper::with_max(1000);
        let mut twice = Clipper::with_max(1000);
        for (s, e) in [(5, 9), (100, 300), (250, 260), (301, 400)] {
            once.add_range(a(s), a(e)).unwrap();
            twice.add_range(a(s), a(e)).unwrap();
            twice.add_range(a(s), a(e)).unwrap();
        }
        assert_eq!(once.intervals(), twice.intervals());
    }

    #[test]
    fn zero_width_query_at_origin() {
        let mut c = Clipper::with_max(1000);
        c.add_range(a(0), a(5)).unwrap();
        assert!(!c.is_range_visible(a(0), a(0)).unwrap());
        assert!(c.is_range_visible(a(6), a(6)).unwrap());
    }

    #[test]
    fn rejects_contract_violations() {
        let mut c = Clipper::with_max(1000);
        assert_eq!(
            c.add_range(a(20), a(10)),
            Err(ClipError::Inverted {
                start: a(20),
                end: a(10)
            })
        );
        assert_eq!(
            c.is_range_visible(a(10), a(2000)),
            Err(ClipError::OutOfDomain {
                angle: a(2000),
                max: 1000
            })
        );
        assert!(c.is_empty());
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut c = Clipper::new();
        for i in 0..100u32 {
            c.add_range(a(i * 1000), a(i * 1000 + 10)).unwrap();
        }
        let cap = c.intervals.capacity();
        c.clear();
        assert!(c.is_empty());
        assert_eq!(c.intervals.capacity(), cap);
    }

    #[test]
    fn frustum_leaves_the_view_cone_open() {
        let half = Angle::from_degrees(47.0);
        let mut c = Clipper::new();
        c.add_range_true_angles(half, -half);
        assert_eq!(c.len(), 1);

        let ahead = Angle::from_degrees(10.0).to_pseudo();
        let behind = Angle::from_degrees(180.0).to_pseudo();
        assert!(c.safe_check_range(-ahead, ahead));
        assert!(!c.safe_check_range(behind, behind));
    }

    /// Random adds keep the set well formed, and its coverage equals the
    /// union of every range added.
    #[test]
    fn random_adds_keep_invariants() {
        const MAX: u32 = 200;
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..200 {
            let mut c = Clipper::with_max(MAX);
            let mut covered = [false; MAX as usize + 1];

            for _ in 0..rng.gen_range(1..24) {
                let s = rng.gen_range(0..=MAX);
                let e = rng.gen_range(0..=MAX);
                c.safe_add_range(a(s), a(e));
                let mut mark = |lo: u32, hi: u32| {
                    for p in lo..=hi {
                        covered[p as usize] = true;
                    }
                };
                if s <= e {
                    mark(s, e);
                } else {
                    mark(s, MAX);
                    mark(0, e);
                }
                assert!(c.is_well_formed());
            }

            let mut from_set = [false; MAX as usize + 1];
            for iv in c.intervals() {
                for p in iv.start.0..=iv.end.0 {
                    from_set[p as usize] = true;
                }
            }
            assert_eq!(from_set, covered);

            // hidden exactly when one interval holds the whole range
            for _ in 0..32 {
                let s = rng.gen_range(0..=MAX);
                let e = rng.gen_range(s..=MAX);
                let hidden = !c.is_range_visible(a(s), a(e)).unwrap();
                let inside_one = c
                    .intervals()
                    .iter()
                    .any(|iv| iv.start.0 <= s && e <= iv.end.0);
                assert_eq!(hidden, inside_one, "range {s}..={e}");
                if hidden {
                    assert!((s..=e).all(|p| covered[p as usize]));
                }
            }
        }
    }
}
