use bitflags::bitflags;
use glam::Vec2;
use smallvec::SmallVec;

pub type SubsectorId = u16;
pub type LinedefId = u16;
pub type SegmentId = u16;
pub type VertexId = u16;
pub type SidedefId = u16;
pub type SectorId = u16;
pub type ThingId = u16;

/// Opaque texture handle.  Resolving it to pixels is the rasteriser's job.
pub type TextureId = u16;

/// "No texture on this part of the wall".
pub const NO_TEXTURE: TextureId = 0;

/// Editor number of the player 1 start.
pub const PLAYER_START_TYPE: u16 = 1;

/// Runtime snapshot of one map (immutable while frames are built).
#[derive(Debug, Default)]
pub struct Level {
    pub name: String,
    pub things: Vec<Thing>,
    pub linedefs: Vec<Linedef>,
    pub sidedefs: Vec<Sidedef>,
    pub vertices: Vec<Vertex>,
    pub segs: Vec<Seg>,
    pub subsectors: Vec<Subsector>,
    pub nodes: Vec<Node>,
    pub sectors: Vec<Sector>,
}

/*------------------------- game objects -----------------------------*/

#[derive(Clone, Debug)]
pub struct Thing {
    pub pos: Vec2,
    pub angle: f32,   // radians
    pub type_id: u16, // editor number
    pub radius: f32,
    pub height: f32,
    /// Leaf containing `pos` (filled by `Level::finalise_bsp`).
    pub sub_sector: SubsectorId,
}

/*--------------------------- linedefs -------------------------------*/

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LinedefFlags: u16 {
        const IMPASSABLE      = 0x0001;
        const BLOCK_MONSTERS  = 0x0002;
        const TWO_SIDED       = 0x0004;
        const UPPER_UNPEGGED  = 0x0010;
        const LOWER_UNPEGGED  = 0x0020;
        const SECRET          = 0x0040;
        const BLOCK_SOUND     = 0x0080;
        const NOT_ON_MAP      = 0x0200;
    }
}

#[derive(Clone, Debug)]
pub struct Linedef {
    pub v1: VertexId,
    pub v2: VertexId,
    pub flags: LinedefFlags,
    pub right_sidedef: Option<SidedefId>,
    pub left_sidedef: Option<SidedefId>,
}

/*--------------------------- sidedefs -------------------------------*/

#[derive(Clone, Debug)]
pub struct Sidedef {
    pub x_off: f32,
    pub y_off: f32,
    pub upper: TextureId,
    pub lower: TextureId,
    pub middle: TextureId,
    pub sector: SectorId,
}

/*----------------------- simple primitives --------------------------*/

#[derive(Clone, Copy, Debug)]
pub struct Vertex {
    pub pos: Vec2,
}

#[derive(Clone, Debug)]
pub struct Seg {
    pub v1: VertexId,
    pub v2: VertexId,
    pub linedef: LinedefId,
    /// 0 = runs along the linedef (right side in front), 1 = reversed.
    pub dir: u16,
    pub offset: f32,
}

#[derive(Clone, Debug, Default)]
pub struct Subsector {
    pub seg_count: u16,
    pub first_seg: SegmentId,
    pub sector: SectorId,
    /// Things standing in this leaf (filled by `Level::finalise_bsp`).
    pub things: SmallVec<[ThingId; 4]>,
    pub bbox: BoundingBox,
}

/// Axis-aligned box in map units, stored the way node lumps store it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl BoundingBox {
    /// An inverted box that any `add_point` call will snap onto.
    pub const EMPTY: BoundingBox = BoundingBox {
        top: f32::MIN,
        bottom: f32::MAX,
        left: f32::MAX,
        right: f32::MIN,
    };

    pub fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    pub fn add_point(&mut self, p: Vec2) {
        self.left = self.left.min(p.x);
        self.right = self.right.max(p.x);
        self.bottom = self.bottom.min(p.y);
        self.top = self.top.max(p.y);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            top: self.top.max(other.top),
            bottom: self.bottom.min(other.bottom),
            left: self.left.min(other.left),
            right: self.right.max(other.right),
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.bottom && p.y <= self.top
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.left, self.bottom)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.right, self.top)
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub bbox: [BoundingBox; 2],
    pub child: [u16; 2],
}

#[derive(Clone, Debug)]
pub struct Sector {
    pub floor_h: f32,
    pub ceil_h: f32,
    pub floor_tex: TextureId,
    pub ceil_tex: TextureId,
    pub light: u8,
}

impl Sector {
    /// A sector whose ceiling meets its floor (closed door, crusher).
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.ceil_h <= self.floor_h
    }
}

/*--------------------------- seg helpers -----------------------------*/

impl Level {
    /// Front sidedef of a seg, and the back sidedef if the line is two-sided.
    pub fn seg_sides(&self, seg: &Seg) -> (Option<&Sidedef>, Option<&Sidedef>) {
        let ld = &self.linedefs[seg.linedef as usize];
        let (front, back) = if seg.dir == 0 {
            (ld.right_sidedef, ld.left_sidedef)
        } else {
            (ld.left_sidedef, ld.right_sidedef)
        };
        let side = |idx: Option<SidedefId>| idx.and_then(|i| self.sidedefs.get(i as usize));
        (side(front), side(back))
    }

    /// Sector behind a seg, if the seg's linedef has a back side.
    pub fn back_sector(&self, seg: &Seg) -> Option<&Sector> {
        let ld = &self.linedefs[seg.linedef as usize];
        if !ld.flags.contains(LinedefFlags::TWO_SIDED) {
            return None;
        }
        self.seg_sides(seg)
            .1
            .and_then(|sd| self.sectors.get(sd.sector as usize))
    }

    /// Seg index range of one leaf.
    pub fn segs_of_subsector(&self, ss: SubsectorId) -> std::ops::Range<SegmentId> {
        let ss = &self.subsectors[ss as usize];
        ss.first_seg..ss.first_seg + ss.seg_count
    }

    pub fn player_start(&self) -> Option<&Thing> {
        self.things.iter().find(|t| t.type_id == PLAYER_START_TYPE)
    }

    /// Bounding box of every vertex in the map.
    pub fn bounds(&self) -> BoundingBox {
        self.vertices
            .iter()
            .fold(BoundingBox::EMPTY, |mut bb, v| {
                bb.add_point(v.pos);
                bb
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    #[test]
    fn bbox_accumulates_points() {
        let mut bb = BoundingBox::EMPTY;
        bb.add_point(vec2(10.0, -4.0));
        bb.add_point(vec2(-2.0, 8.0));
        assert_eq!(bb, BoundingBox::new(-2.0, -4.0, 10.0, 8.0));
        assert!(bb.contains(vec2(0.0, 0.0)));
        assert!(!bb.contains(vec2(11.0, 0.0)));
    }

    #[test]
    fn union_covers_both() {
        let a = BoundingBox::new(0.0, 0.0, 64.0, 64.0);
        let b = BoundingBox::new(64.0, -64.0, 128.0, 0.0);
        assert_eq!(a.union(&b), BoundingBox::new(0.0, -64.0, 128.0, 64.0));
    }
}
