//! Headless visibility benchmark: spin the camera on the spot and report
//! what the culling pass produced per frame.
//!
//! ```bash
//! cargo run --release --bin vis_stats -- --frames 720 --fov 100
//! RUST_LOG=debug cargo run --bin vis_stats -- --map maps/e1.txt
//! ```

use std::{
    fs,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, bail};
use clap::Parser;
use log::info;

use bspvis::{
    engine::{Angle, FrameConfig, FrameStats, RenderFrameContext},
    world::{Camera, DEMO_MAP, Level, parse_grid},
};

const PLAYER_HEIGHT: f32 = 41.0;

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Tile-grid map file (built-in demo map when omitted)
    #[arg(long, value_name = "FILE")]
    map: Option<PathBuf>,

    /// Frames to build; the camera turns a full circle over all of them
    #[arg(long, default_value_t = 360)]
    frames: usize,

    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = 90.0)]
    fov: f64,

    /// Map units per level-of-detail step
    #[arg(long, default_value_t = 256.0)]
    lod_base: f64,

    /// Do not occlude the area outside the field of view up front
    #[arg(long)]
    no_frustum: bool,
}

fn load_level(path: Option<&PathBuf>) -> anyhow::Result<Level> {
    let Some(path) = path else {
        return Ok(parse_grid("demo", DEMO_MAP)?);
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_grid(&name, &text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();
    if opts.frames == 0 {
        bail!("--frames must be at least 1");
    }

    let level = load_level(opts.map.as_ref())?;
    info!(
        "level `{}`: {} leaves, {} nodes, {} segs, {} things",
        level.name,
        level.subsectors.len(),
        level.nodes.len(),
        level.segs.len(),
        level.things.len()
    );

    let start = level
        .player_start()
        .map(|t| t.pos)
        .context("map has no player start (`P`)")?;
    let eye_z = level.sectors[level.subsectors[level.locate_subsector(start) as usize].sector as usize]
        .floor_h
        + PLAYER_HEIGHT;
    let mut camera = Camera::new(start.extend(eye_z), 0.0, opts.fov.to_radians() as f32);

    let config = FrameConfig {
        fov: camera.fov_angle(),
        frustum_clip: !opts.no_frustum,
        lod_base_cube: opts.lod_base,
    };
    let mut ctx = RenderFrameContext::new(config);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut total = FrameStats::default();
    let mut acc_time = Duration::ZERO;
    let mut worst = Duration::ZERO;
    let turn = std::f32::consts::TAU / opts.frames as f32;

    for _ in 0..opts.frames {
        let t0 = Instant::now();
        let stats = ctx.build_frame(&level, camera.viewpoint());
        let dt = t0.elapsed();

        acc_time += dt;
        worst = worst.max(dt);
        total.nodes_visited += stats.nodes_visited;
        total.nodes_culled += stats.nodes_culled;
        total.subsectors += stats.subsectors;
        total.walls += stats.walls;
        total.planes += stats.planes;
        total.things += stats.things;
        total.things_culled += stats.things_culled;
        total.clip_ranges += stats.clip_ranges;

        camera.turn(turn);
    }

    let n = opts.frames as f64;
    let avg = |v: usize| v as f64 / n;
    println!(
        "{} frames, fov {:.0}°, frustum {}",
        opts.frames,
        Angle::to_radians(config.fov).to_degrees(),
        if config.frustum_clip { "on" } else { "off" }
    );
    println!(
        "per frame: {:.1} nodes ({:.1} culled), {:.1}/{} leaves, {:.1} walls, {:.1} planes, {:.1} things ({:.1} culled), {:.1} clip ranges",
        avg(total.nodes_visited),
        avg(total.nodes_culled),
        avg(total.subsectors),
        level.subsectors.len(),
        avg(total.walls),
        avg(total.planes),
        avg(total.things),
        avg(total.things_culled),
        avg(total.clip_ranges),
    );
    let avg_us = acc_time.as_secs_f64() * 1e6 / n;
    println!(
        "avg build: {:.1} µs  (worst {:.1} µs)",
        avg_us,
        worst.as_secs_f64() * 1e6
    );
    Ok(())
}
