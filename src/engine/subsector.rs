use glam::Vec2;
use log::trace;

use crate::{
    engine::{
        angle::{ANG180, point_to_pseudo},
        arena::Handle,
        frame::RenderFrameContext,
        lod::{plane_lod, point_lod, wall_lod},
        records::{DrawFloor, DrawSub, PlaneFace, WallFlags},
    },
    world::geometry::{
        Level, NO_TEXTURE, PLAYER_START_TYPE, Sector, SegmentId, SubsectorId, ThingId,
    },
};

/// Sprites closer than this along the view direction are not drawn.
const MIN_DEPTH: f64 = 1.0;

impl RenderFrameContext {
    /// Emit everything of one leaf: its floor group, the flats the eye can
    /// see, sprites, then segs (which may grow the clipper).
    pub(crate) fn walk_subsector(&mut self, level: &Level, ss_idx: SubsectorId) {
        let ss = &level.subsectors[ss_idx as usize];
        let sector = &level.sectors[ss.sector as usize];
        let base = self.config().lod_base_cube;

        self.seen[ss_idx as usize] = true;
        self.stats.subsectors += 1;

        // ─ floor group
        let df = {
            let h = self.floors.get_new();
            let rec = &mut self.floors[h];
            rec.sub = ss_idx;
            rec.floor_h = sector.floor_h;
            rec.ceil_h = sector.ceil_h;
            rec.light = sector.light;
            rec.lod = plane_lod(&self.view, &ss.bbox, sector.floor_h as f64, base);
            self.floors.commit()
        };

        // ─ flats facing the eye
        for (face, h, tex) in [
            (PlaneFace::Floor, sector.floor_h, sector.floor_tex),
            (PlaneFace::Ceiling, sector.ceil_h, sector.ceil_tex),
        ] {
            let faces_eye = match face {
                PlaneFace::Floor => (h as f64) < self.view.z,
                PlaneFace::Ceiling => (h as f64) > self.view.z,
            };
            if !faces_eye {
                continue;
            }
            let hp = self.planes.get_new();
            let rec = &mut self.planes[hp];
            rec.face = face;
            rec.h = h;
            rec.tex = tex;
            rec.light = sector.light;
            rec.lod = plane_lod(&self.view, &ss.bbox, h as f64, base);
            let hp = self.planes.commit();
            self.planes.append(&mut self.floors[df].planes, hp);
            self.stats.planes += 1;
        }

        // ─ sprites, before the leaf's own walls go into the clipper
        let mut visible = false;
        for &t in &ss.things {
            visible |= self.walk_thing(level, df, sector, t);
        }

        // ─ segs
        for seg_idx in level.segs_of_subsector(ss_idx) {
            visible |= self.walk_seg(level, df, sector, seg_idx);
        }

        let mut floors = Default::default();
        self.floors.append(&mut floors, df);
        self.subs.push(DrawSub {
            sub: ss_idx,
            floors,
            visible,
        });
    }

    /// Returns `true` if the sprite was committed.
    fn walk_thing(
        &mut self,
        level: &Level,
        df: Handle<DrawFloor>,
        sector: &Sector,
        t: ThingId,
    ) -> bool {
        let thing = &level.things[t as usize];
        if thing.type_id == PLAYER_START_TYPE {
            return false;
        }

        let base = self.config().lod_base_cube;
        let view = self.view;
        let (fwd, side) = view.to_view(thing.pos.x as f64, thing.pos.y as f64);
        let r = thing.radius as f64;

        let h = self.things.get_new();
        let rec = &mut self.things[h];
        rec.thing = t;
        rec.bottom = sector.floor_h;
        rec.top = sector.floor_h + thing.height;
        rec.depth = fwd as f32;
        rec.left = point_to_pseudo(fwd, side + r);
        rec.right = point_to_pseudo(fwd, side - r);
        rec.lod = point_lod(
            &view,
            thing.pos.x as f64,
            thing.pos.y as f64,
            (sector.floor_h + thing.height * 0.5) as f64,
            base,
        );

        if fwd > MIN_DEPTH && self.clipper.safe_check_range(rec.right, rec.left) {
            let h = self.things.commit();
            self.things.append(&mut self.floors[df].things, h);
            self.stats.things += 1;
            true
        } else {
            trace!("thing {t} culled");
            self.things.rollback();
            self.stats.things_culled += 1;
            false
        }
    }

    /// Returns `true` if the seg produced a wall record.
    fn walk_seg(
        &mut self,
        level: &Level,
        df: Handle<DrawFloor>,
        front: &Sector,
        seg_idx: SegmentId,
    ) -> bool {
        let seg = &level.segs[seg_idx as usize];
        let v1 = level.vertices[seg.v1 as usize].pos;
        let v2 = level.vertices[seg.v2 as usize].pos;

        // v1 is the left end when seen from the front side
        let left = self.view.pseudo_angle_to(v1.x as f64, v1.y as f64);
        let right = self.view.pseudo_angle_to(v2.x as f64, v2.y as f64);
        let span = left - right;
        if span.0 == 0 || span >= ANG180 {
            return false; // edge-on or back-facing
        }
        if !self.clipper.safe_check_range(right, left) {
            return false;
        }

        let (sd_front, _) = level.seg_sides(seg);
        let back = level.back_sector(seg);
        let mut flags = WallFlags::empty();
        match back {
            None => flags |= WallFlags::SOLID,
            Some(back) => {
                if front.is_closed()
                    || back.is_closed()
                    || back.ceil_h <= front.floor_h
                    || back.floor_h >= front.ceil_h
                {
                    flags |= WallFlags::SOLID;
                }
                if back.ceil_h < front.ceil_h {
                    flags |= WallFlags::UPPER;
                }
                if back.floor_h > front.floor_h {
                    flags |= WallFlags::LOWER;
                }
                if sd_front.is_some_and(|sd| sd.middle != NO_TEXTURE) {
                    flags |= WallFlags::MASKED;
                }
            }
        }

        let base = self.config().lod_base_cube;
        let eye = Vec2::new(self.view.x as f32, self.view.y as f32);
        let h = self.walls.get_new();
        let rec = &mut self.walls[h];
        rec.seg = seg_idx;
        rec.sector = sd_front.map_or(0, |sd| sd.sector);
        if let Some(sd) = sd_front {
            rec.middle = sd.middle;
            rec.upper = sd.upper;
            rec.lower = sd.lower;
        }
        rec.light = front.light;
        rec.left = left;
        rec.right = right;
        rec.dist = distance_to_segment(eye, v1, v2);
        rec.lod = wall_lod(
            &self.view,
            [v1.x as f64, v1.y as f64, front.floor_h as f64],
            [v2.x as f64, v2.y as f64, front.ceil_h as f64],
            base,
        );
        rec.flags = flags;

        let h = self.walls.commit();
        self.walls.append(&mut self.floors[df].walls, h);
        self.stats.walls += 1;

        if flags.contains(WallFlags::SOLID) {
            self.clipper.safe_add_range(right, left);
        }
        true
    }
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/*──────────────────────────────── Tests ───────────────────────────────*/
