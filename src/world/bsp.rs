use crate::world::geometry::{Level, Node, SubsectorId};
use glam::Vec2;

pub const CHILD_MASK: u16 = 0x7FFF;

pub const SUBSECTOR_BIT: u16 = 0x8000;

// ──────────────────────────────────────────────────────────────────────────
//                       Level – public helpers
// ──────────────────────────────────────────────────────────────────────────
impl Level {
    /// Index of the BSP root (`nodes.len()-1` in Doom).
    #[inline(always)]
    pub fn bsp_root(&self) -> u16 {
        assert!(!self.nodes.is_empty());
        (self.nodes.len() - 1) as u16
    }

    /// Child reference to start a walk from.  A map with a single convex
    /// leaf has no nodes at all; the walk then starts at leaf 0.
    #[inline]
    pub fn root_child(&self) -> u16 {
        if self.nodes.is_empty() {
            SUBSECTOR_BIT
        } else {
            self.bsp_root()
        }
    }

    /// Walk the BSP and return the subsector id containing `p`.
    pub fn locate_subsector(&self, p: Vec2) -> SubsectorId {
        let mut child = self.root_child();
        while child & SUBSECTOR_BIT == 0 {
            let node = &self.nodes[child as usize];
            child = node.child[node.point_side(p) as usize];
        }
        child & CHILD_MASK
    }

    /// Place every thing into the leaf that contains it.
    pub fn finalise_bsp(&mut self) {
        let ss_for_thing: Vec<SubsectorId> = self
            .things
            .iter()
            .map(|t| self.locate_subsector(t.pos))
            .collect();

        for ss in self.subsectors.iter_mut() {
            ss.things.clear();
        }
        for (thing_idx, (thing, ss)) in self.things.iter_mut().zip(ss_for_thing).enumerate() {
            thing.sub_sector = ss;
            self.subsectors[ss as usize].things.push(thing_idx as u16);
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       Node geometry helpers
// ──────────────────────────────────────────────────────────────────────────
impl Node {
    /// 0 = *front* of splitter, 1 = *back*.
    #[inline(always)]
    pub fn point_side(&self, p: Vec2) -> i32 {
        let d = (p.x - self.x) * self.dy - (p.y - self.y) * self.dx;
        if d >= 0.0 { 0 } else { 1 }
    }
}
