use bitflags::bitflags;

use crate::{
    engine::{
        angle::Angle,
        arena::{DrawRecord, Link, RecordKind, RecordList},
    },
    world::geometry::{SectorId, SegmentId, SubsectorId, TextureId, ThingId},
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WallFlags: u8 {
        /// Blocks everything behind it; its range went into the clipper.
        const SOLID  = 0x01;
        /// Two-sided with a middle texture (grates, fences).
        const MASKED = 0x02;
        /// Back ceiling is lower: an upper part is drawn.
        const UPPER  = 0x04;
        /// Back floor is higher: a lower part is drawn.
        const LOWER  = 0x08;
    }
}

/// One visible seg.  `right..=left` is its view-relative pseudo-angle range.
#[derive(Debug, Default)]
pub struct DrawWall {
    pub seg: SegmentId,
    pub sector: SectorId,
    pub middle: TextureId,
    pub upper: TextureId,
    pub lower: TextureId,
    pub light: u8,
    pub left: Angle,
    pub right: Angle,
    /// Distance from the eye to the nearest point of the seg.
    pub dist: f32,
    pub lod: u32,
    pub flags: WallFlags,
    pub link: Link<DrawWall>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaneFace {
    #[default]
    Floor,
    Ceiling,
}

#[derive(Debug, Default)]
pub struct DrawPlane {
    pub face: PlaneFace,
    pub h: f32,
    pub tex: TextureId,
    pub light: u8,
    pub lod: u32,
    pub link: Link<DrawPlane>,
}

/// A sprite that survived the clipper.
#[derive(Debug, Default)]
pub struct DrawThing {
    pub thing: ThingId,
    pub bottom: f32,
    pub top: f32,
    /// Distance along the view direction.
    pub depth: f32,
    pub left: Angle,
    pub right: Angle,
    pub lod: u32,
    pub link: Link<DrawThing>,
}

/// One floor/ceiling pair of a leaf, and what is drawn between them.
#[derive(Debug, Default)]
pub struct DrawFloor {
    pub sub: SubsectorId,
    pub floor_h: f32,
    pub ceil_h: f32,
    pub light: u8,
    pub lod: u32,
    pub walls: RecordList<DrawWall>,
    pub planes: RecordList<DrawPlane>,
    pub things: RecordList<DrawThing>,
    pub link: Link<DrawFloor>,
}

/// A visited leaf, in front-to-back order.
#[derive(Debug, Default)]
pub struct DrawSub {
    pub sub: SubsectorId,
    pub floors: RecordList<DrawFloor>,
    /// Some seg or sprite of the leaf made it past the clipper.
    pub visible: bool,
}

macro_rules! draw_record {
    ($ty:ty, $kind:expr) => {
        impl DrawRecord for $ty {
            const KIND: RecordKind = $kind;

            #[inline]
            fn link(&self) -> &Link<Self> {
                &self.link
            }

            #[inline]
            fn link_mut(&mut self) -> &mut Link<Self> {
                &mut self.link
            }
        }
    };
}

draw_record!(DrawWall, RecordKind::Wall);
draw_record!(DrawPlane, RecordKind::Plane);
draw_record!(DrawThing, RecordKind::Thing);
draw_record!(DrawFloor, RecordKind::Floor);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::arena::ArenaPool;

    #[test]
    fn reused_slots_come_back_zeroed() {
        let mut walls = ArenaPool::<DrawWall>::new();
        let h = walls.get_new();
        walls[h].flags = WallFlags::SOLID | WallFlags::UPPER;
        walls[h].dist = 12.5;
        walls.commit();

        walls.init();
        let h = walls.get_new();
        assert!(walls[h].flags.is_empty());
        assert_eq!(walls[h].dist, 0.0);
        assert!(walls[h].link.next.is_none());
    }

    #[test]
    fn floor_collects_its_records() {
        let mut floors = ArenaPool::<DrawFloor>::new();
        let mut planes = ArenaPool::<DrawPlane>::new();

        floors.get_new();
        let df = floors.commit();

        for face in [PlaneFace::Floor, PlaneFace::Ceiling] {
            let h = planes.get_new();
            planes[h].face = face;
            let h = planes.commit();
            planes.append(&mut floors[df].planes, h);
        }

        let faces: Vec<_> = planes
            .iter_list(&floors[df].planes)
            .map(|(_, p)| p.face)
            .collect();
        assert_eq!(faces, [PlaneFace::Floor, PlaneFace::Ceiling]);
        assert_eq!(DrawFloor::KIND, RecordKind::Floor);
    }
}
