use glam::vec2;
use log::{debug, trace};

use crate::{
    engine::{
        angle::{ANG180, Angle},
        arena::ArenaPool,
        bbox::check_bbox,
        clipper::Clipper,
        records::{DrawFloor, DrawPlane, DrawSub, DrawThing, DrawWall},
        types::{FrameConfig, Viewpoint},
    },
    world::{
        bsp::{CHILD_MASK, SUBSECTOR_BIT},
        geometry::{Level, SubsectorId},
    },
};

/// Extra margin around the field of view before the frustum is occluded.
const FRUSTUM_SLACK_DEG: f64 = 2.0;

/// Counters for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub nodes_visited: usize,
    pub nodes_culled: usize,
    pub subsectors: usize,
    pub walls: usize,
    pub planes: usize,
    pub things: usize,
    pub things_culled: usize,
    pub clip_ranges: usize,
}

/// Everything one frame of visibility needs, created once and reset per
/// frame: the clipper, one pool per record kind and the leaf list.
pub struct RenderFrameContext {
    config: FrameConfig,
    pub clipper: Clipper,
    pub walls: ArenaPool<DrawWall>,
    pub planes: ArenaPool<DrawPlane>,
    pub things: ArenaPool<DrawThing>,
    pub floors: ArenaPool<DrawFloor>,
    pub(crate) subs: Vec<DrawSub>,
    pub(crate) seen: Vec<bool>,
    pub(crate) view: Viewpoint,
    pub(crate) stats: FrameStats,
}

impl RenderFrameContext {
    pub fn new(config: FrameConfig) -> Self {
        Self {
            config,
            clipper: Clipper::new(),
            walls: ArenaPool::new(),
            planes: ArenaPool::new(),
            things: ArenaPool::new(),
            floors: ArenaPool::new(),
            subs: Vec::new(),
            seen: Vec::new(),
            view: Viewpoint::new(0.0, 0.0, 0.0, Angle::ZERO),
            stats: FrameStats::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    #[inline]
    pub fn view(&self) -> &Viewpoint {
        &self.view
    }

    /// Visited leaves of the last frame, nearest first.
    #[inline]
    pub fn draw_subs(&self) -> &[DrawSub] {
        &self.subs
    }

    /// Was leaf `ss` reached by the last frame's walk?
    #[inline]
    pub fn was_seen(&self, ss: SubsectorId) -> bool {
        self.seen.get(ss as usize).copied().unwrap_or(false)
    }

    /// Reset all per-frame state and apply the frustum.
    pub fn begin_frame(&mut self, level: &Level, view: Viewpoint) {
        self.view = view;
        self.stats = FrameStats::default();

        self.clipper.clear();
        self.walls.init();
        self.planes.init();
        self.things.init();
        self.floors.init();

        self.subs.clear();
        self.seen.clear();
        self.seen.resize(level.subsectors.len(), false);

        if self.config.frustum_clip {
            let slack = Angle::from_degrees(FRUSTUM_SLACK_DEG).0 as u64;
            let half = self.config.fov.0 as u64 / 2 + slack;
            if half < ANG180.0 as u64 {
                let half = Angle(half as u32);
                self.clipper.add_range_true_angles(half, -half);
            }
        }
    }

    /// Walk the whole tree front to back and fill the pools.
    pub fn build_frame(&mut self, level: &Level, view: Viewpoint) -> FrameStats {
        self.begin_frame(level, view);
        self.walk_bsp(level, level.root_child());

        self.stats.clip_ranges = self.clipper.len();
        debug!(
            "frame: {} nodes ({} culled), {} leaves, {} walls, {} planes, {} things ({} culled), {} clip ranges",
            self.stats.nodes_visited,
            self.stats.nodes_culled,
            self.stats.subsectors,
            self.stats.walls,
            self.stats.planes,
            self.stats.things,
            self.stats.things_culled,
            self.stats.clip_ranges,
        );
        self.stats
    }

    fn walk_bsp(&mut self, level: &Level, child: u16) {
        if self.clipper.is_fully_occluded() {
            return;
        }

        if child & SUBSECTOR_BIT != 0 {
            self.walk_subsector(level, child & CHILD_MASK);
            return;
        }

        self.stats.nodes_visited += 1;
        let node = &level.nodes[child as usize];
        let eye = vec2(self.view.x as f32, self.view.y as f32);
        let front = node.point_side(eye) as usize; // 0: front, 1: back

        // Near side first …
        for side in [front, front ^ 1] {
            if check_bbox(&self.clipper, &self.view, &node.bbox[side]) {
                self.walk_bsp(level, node.child[side]);
            } else {
                // … far side only while its box can still show through.
                trace!("node {child}: side {side} culled");
                self.stats.nodes_culled += 1;
            }
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::grid::parse_grid;

    const CORRIDOR: &str = "\
##########
#P.......#
##########";

    #[test]
    fn frustum_is_applied_at_frame_start() {
        let lvl = parse_grid("c", CORRIDOR).unwrap();
        let mut ctx = RenderFrameContext::new(FrameConfig::default());
        ctx.begin_frame(&lvl, Viewpoint::new(96.0, 96.0, 41.0, Angle::ZERO));
        assert_eq!(ctx.clipper.len(), 1);
        assert!(!ctx.clipper.safe_check_range(ANG180, ANG180));
        assert!(ctx.clipper.safe_check_range(Angle::ZERO, Angle::ZERO));
    }

    #[test]
    fn no_frustum_at_full_turn() {
        let lvl = parse_grid("c", CORRIDOR).unwrap();
        let cfg = FrameConfig {
            fov: Angle(u32::MAX),
            ..FrameConfig::default()
        };
        let mut ctx = RenderFrameContext::new(cfg);
        ctx.begin_frame(&lvl, Viewpoint::new(96.0, 96.0, 41.0, Angle::ZERO));
        assert!(ctx.clipper.is_empty());
    }

    #[test]
    fn corridor_is_walked_to_the_end() {
        let lvl = parse_grid("c", CORRIDOR).unwrap();
        let mut ctx = RenderFrameContext::new(FrameConfig::default());
        let stats = ctx.build_frame(&lvl, Viewpoint::new(96.0, 96.0, 41.0, Angle::ZERO));

        assert_eq!(stats.subsectors, lvl.subsectors.len());
        for ss in 0..lvl.subsectors.len() as u16 {
            assert!(ctx.was_seen(ss));
        }
        assert_eq!(ctx.draw_subs()[0].sub, lvl.locate_subsector(vec2(96.0, 96.0)));
        assert!(ctx.clipper.is_well_formed());
    }

    #[test]
    fn looking_at_a_wall_culls_the_rest() {
        let lvl = parse_grid("c", CORRIDOR).unwrap();
        let mut ctx = RenderFrameContext::new(FrameConfig::default());
        // west end, facing the west wall from close by
        let stats = ctx.build_frame(&lvl, Viewpoint::new(70.0, 96.0, 41.0, ANG180));

        assert!(stats.nodes_culled > 0);
        assert!(stats.subsectors < lvl.subsectors.len());
        assert!(ctx.clipper.is_fully_occluded());
    }

    #[test]
    fn contexts_are_reusable() {
        let lvl = parse_grid("c", CORRIDOR).unwrap();
        let mut ctx = RenderFrameContext::new(FrameConfig::default());
        let view = Viewpoint::new(96.0, 96.0, 41.0, Angle::ZERO);
        let first = ctx.build_frame(&lvl, view);
        let cap = ctx.walls.capacity();
        let second = ctx.build_frame(&lvl, view);
        assert_eq!(first, second);
        assert_eq!(ctx.walls.capacity(), cap);
        assert_eq!(ctx.walls.committed_len(), second.walls);
    }
}
