//! Whole frames over the demo map: the walk starts under the eye, every
//! emitted record is reachable from the leaf list, and the frustum only ever
//! removes leaves.

use bspvis::{
    engine::{Angle, FrameConfig, RenderFrameContext, Viewpoint},
    world::{DEMO_MAP, Level, parse_grid},
};
use glam::Vec2;
use rand::{Rng, SeedableRng, rngs::StdRng};

fn demo() -> Level {
    parse_grid("demo", DEMO_MAP).unwrap()
}

/// Random eye positions at the centre-ish of open cells.
fn random_views(level: &Level, n: usize, seed: u64) -> Vec<Viewpoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let ss = &level.subsectors[rng.gen_range(0..level.subsectors.len())];
            let (lo, hi) = (ss.bbox.min(), ss.bbox.max());
            let x = rng.gen_range(lo.x + 4.0..hi.x - 4.0);
            let y = rng.gen_range(lo.y + 4.0..hi.y - 4.0);
            let sector = &level.sectors[ss.sector as usize];
            Viewpoint::new(
                x as f64,
                y as f64,
                (sector.floor_h + 41.0) as f64,
                Angle(rng.r#gen::<u32>()),
            )
        })
        .collect()
}

#[test]
fn first_leaf_is_the_one_under_the_eye() {
    let level = demo();
    let mut ctx = RenderFrameContext::new(FrameConfig::default());
    for view in random_views(&level, 64, 1) {
        ctx.build_frame(&level, view);
        let here = level.locate_subsector(Vec2::new(view.x as f32, view.y as f32));
        assert_eq!(ctx.draw_subs()[0].sub, here);
    }
}

#[test]
fn records_hang_off_the_leaf_list() {
    let level = demo();
    let mut ctx = RenderFrameContext::new(FrameConfig::default());
    for view in random_views(&level, 64, 2) {
        let stats = ctx.build_frame(&level, view);

        let (mut walls, mut planes, mut things) = (0, 0, 0);
        for sub in ctx.draw_subs() {
            for (_, floor) in ctx.floors.iter_list(&sub.floors) {
                assert_eq!(floor.sub, sub.sub);
                walls += ctx.walls.iter_list(&floor.walls).count();
                planes += ctx.planes.iter_list(&floor.planes).count();
                things += ctx.things.iter_list(&floor.things).count();
            }
        }
        assert_eq!(walls, stats.walls);
        assert_eq!(planes, stats.planes);
        assert_eq!(things, stats.things);
        assert_eq!(ctx.walls.committed_len(), stats.walls);
        assert_eq!(ctx.floors.committed_len(), stats.subsectors);
        assert!(!ctx.walls.is_open() && !ctx.things.is_open());
        assert!(ctx.clipper.is_well_formed());
    }
}

#[test]
fn each_leaf_is_visited_once() {
    let level = demo();
    let mut ctx = RenderFrameContext::new(FrameConfig::default());
    for view in random_views(&level, 32, 3) {
        ctx.build_frame(&level, view);
        let mut seen = vec![false; level.subsectors.len()];
        for sub in ctx.draw_subs() {
            assert!(!seen[sub.sub as usize], "leaf {} twice", sub.sub);
            seen[sub.sub as usize] = true;
            assert!(ctx.was_seen(sub.sub));
        }
    }
}

#[test]
fn reused_context_matches_a_fresh_one() {
    let level = demo();
    let mut reused = RenderFrameContext::new(FrameConfig::default());
    for view in random_views(&level, 32, 4) {
        let mut fresh = RenderFrameContext::new(FrameConfig::default());
        let a = reused.build_frame(&level, view);
        let b = fresh.build_frame(&level, view);
        assert_eq!(a, b);

        let order = |ctx: &RenderFrameContext| {
            ctx.draw_subs().iter().map(|s| s.sub).collect::<Vec<_>>()
        };
        assert_eq!(order(&reused), order(&fresh));
        assert_eq!(reused.clipper.intervals(), fresh.clipper.intervals());
    }
}

#[test]
fn culling_keeps_every_leaf_a_full_turn_can_see() {
    // The frustum only adds occlusion, so it can drop leaves but never
    // reach one the full-turn walk missed.
    let level = demo();
    let cfg = FrameConfig {
        fov: Angle(u32::MAX),
        ..FrameConfig::default()
    };
    let mut ctx = RenderFrameContext::new(cfg);
    let mut narrow = RenderFrameContext::new(FrameConfig::default());
    for view in random_views(&level, 32, 5) {
        let all = ctx.build_frame(&level, view);
        let cone = narrow.build_frame(&level, view);
        assert!(cone.subsectors <= all.subsectors);
        for sub in narrow.draw_subs() {
            assert!(ctx.was_seen(sub.sub), "leaf {} only seen with a frustum", sub.sub);
        }
    }
}
