//! Top-down view of one frame's culling result.
//!
//! ```bash
//! cargo run --release --bin vis_view -- [--map FILE] [--fov 90]
//! ```
//!
//! Grey: every seg.  Yellow: solid walls drawn this frame, cyan: see-through
//! ones.  Red dots: sprites drawn, dark red: sprites culled.  Blue: leaves
//! never reached.
//!
//! Controls W/S = forward/back A/D = strafe ←/→ = turn F = frustum Esc = quit

use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use glam::{Vec2, vec2};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use bspvis::{
    engine::{FrameConfig, RenderFrameContext, WallFlags},
    world::{Camera, DEMO_MAP, Level, parse_grid},
};

const WIDTH: usize = 1024;
const HEIGHT: usize = 768;
const PLAYER_HEIGHT: f32 = 41.0;

const BG: u32 = 0x0030_3030;
const SEG: u32 = 0x0055_5555;
const WALL_SOLID: u32 = 0x00FF_FF00;
const WALL_OPEN: u32 = 0x0000_C0C0;
const THING_DRAWN: u32 = 0x00FF_0000;
const THING_CULLED: u32 = 0x0060_0000;
const UNSEEN: u32 = 0x0020_2060;
const CONE: u32 = 0x0080_8080;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Tile-grid map file (built-in demo map when omitted)
    #[arg(long, value_name = "FILE")]
    map: Option<PathBuf>,

    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = 90.0)]
    fov: f64,
}

/*───────────────────────── drawing helpers ─────────────────────────*/

/// Map → screen transform fitted to the level bounds.
struct View {
    min: Vec2,
    scale: f32,
    off: Vec2,
}

impl View {
    fn fit(level: &Level) -> Self {
        let bb = level.bounds();
        let (min, max) = (bb.min(), bb.max());
        let map_w = (max.x - min.x).max(1.0);
        let map_h = (max.y - min.y).max(1.0);
        let scale = (WIDTH as f32 / map_w).min(HEIGHT as f32 / map_h) * 0.9;
        let off = vec2(
            (WIDTH as f32 - map_w * scale) * 0.5,
            (HEIGHT as f32 - map_h * scale) * 0.5,
        );
        Self { min, scale, off }
    }

    fn to_screen(&self, v: Vec2) -> (i32, i32) {
        (
            ((v.x - self.min.x) * self.scale + self.off.x).round() as i32,
            HEIGHT as i32 - ((v.y - self.min.y) * self.scale + self.off.y).round() as i32,
        )
    }
}

fn draw_line(buf: &mut [u32], (mut x0, mut y0): (i32, i32), (x1, y1): (i32, i32), col: u32) {
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        if (0..WIDTH as i32).contains(&x0) && (0..HEIGHT as i32).contains(&y0) {
            buf[y0 as usize * WIDTH + x0 as usize] = col;
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_dot(buf: &mut [u32], (px, py): (i32, i32), r: i32, col: u32) {
    for dy in -r..=r {
        for dx in -r..=r {
            let (x, y) = (px + dx, py + dy);
            if (0..WIDTH as i32).contains(&x) && (0..HEIGHT as i32).contains(&y) {
                buf[y as usize * WIDTH + x as usize] = col;
            }
        }
    }
}

fn load_level(path: Option<&PathBuf>) -> anyhow::Result<Level> {
    let Some(path) = path else {
        return Ok(parse_grid("demo", DEMO_MAP)?);
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_grid(&path.display().to_string(), &text)
        .with_context(|| format!("parsing {}", path.display()))
}

/*──────────────────────────── main ────────────────────────────────*/
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();
    let lvl = load_level(opts.map.as_ref())?;
    let view = View::fit(&lvl);

    let start = lvl
        .player_start()
        .map(|t| t.pos)
        .context("map has no player start (`P`)")?;
    let mut camera = Camera::new(
        start.extend(PLAYER_HEIGHT),
        0.0,
        opts.fov.to_radians() as f32,
    );

    let mut config = FrameConfig {
        fov: camera.fov_angle(),
        ..FrameConfig::default()
    };
    let mut ctx = RenderFrameContext::new(config);

    let mut buf = vec![0u32; WIDTH * HEIGHT];
    let mut win = Window::new("BSP visibility", WIDTH, HEIGHT, WindowOptions::default())?;
    win.set_target_fps(60);

    /*----- movement constants --------------------------------------*/
    let speed = 128.0;
    let rot = std::f32::consts::PI; // 180°/s
    let dt = 1.0 / 60.0;

    /*========================== main loop ==========================*/
    while win.is_open() && !win.is_key_down(Key::Escape) {
        /*--- input --------------------------------------------------*/
        let (mut fwd, mut side) = (0.0, 0.0);
        if win.is_key_down(Key::W) {
            fwd += speed * dt;
        }
        if win.is_key_down(Key::S) {
            fwd -= speed * dt;
        }
        if win.is_key_down(Key::A) {
            side -= speed * dt;
        }
        if win.is_key_down(Key::D) {
            side += speed * dt;
        }
        if win.is_key_down(Key::Left) {
            camera.turn(rot * dt);
        }
        if win.is_key_down(Key::Right) {
            camera.turn(-rot * dt);
        }
        if win.is_key_pressed(Key::F, KeyRepeat::No) {
            config.frustum_clip = !config.frustum_clip;
            ctx = RenderFrameContext::new(config);
        }
        camera.step(fwd, side);

        // eye height follows the floor under the player
        let ss = lvl.locate_subsector(camera.pos().truncate());
        let floor = lvl.sectors[lvl.subsectors[ss as usize].sector as usize].floor_h;
        camera.set_eye_z(floor + PLAYER_HEIGHT);

        let stats = ctx.build_frame(&lvl, camera.viewpoint());

        /*--- clear --------------------------------------------------*/
        buf.fill(BG);

        /*--- leaves never reached (blue outline) --------------------*/
        for (idx, sub) in lvl.subsectors.iter().enumerate() {
            if ctx.was_seen(idx as u16) {
                continue;
            }
            let (lo, hi) = (sub.bbox.min(), sub.bbox.max());
            let corners = [lo, vec2(hi.x, lo.y), hi, vec2(lo.x, hi.y)];
            for i in 0..4 {
                let a = view.to_screen(corners[i]);
                let b = view.to_screen(corners[(i + 1) % 4]);
                draw_line(&mut buf, a, b, UNSEEN);
            }
        }

        /*--- every seg (grey) ---------------------------------------*/
        for seg in &lvl.segs {
            let a = lvl.vertices[seg.v1 as usize].pos;
            let b = lvl.vertices[seg.v2 as usize].pos;
            draw_line(&mut buf, view.to_screen(a), view.to_screen(b), SEG);
        }

        /*--- walls drawn this frame ---------------------------------*/
        for wall in ctx.walls.committed() {
            let seg = &lvl.segs[wall.seg as usize];
            let a = lvl.vertices[seg.v1 as usize].pos;
            let b = lvl.vertices[seg.v2 as usize].pos;
            let col = if wall.flags.contains(WallFlags::SOLID) {
                WALL_SOLID
            } else {
                WALL_OPEN
            };
            draw_line(&mut buf, view.to_screen(a), view.to_screen(b), col);
        }

        /*--- sprites ------------------------------------------------*/
        for (idx, thing) in lvl.things.iter().enumerate() {
            let drawn = ctx
                .things
                .committed()
                .iter()
                .any(|rec| rec.thing as usize == idx);
            let col = if drawn { THING_DRAWN } else { THING_CULLED };
            draw_dot(&mut buf, view.to_screen(thing.pos), 2, col);
        }

        /*--- view cone ----------------------------------------------*/
        let eye = camera.pos().truncate();
        let half = camera.fov() * 0.5;
        for a in [camera.yaw() + half, camera.yaw() - half] {
            let tip = eye + Vec2::from_angle(a) * 256.0;
            draw_line(&mut buf, view.to_screen(eye), view.to_screen(tip), CONE);
        }
        draw_dot(&mut buf, view.to_screen(eye), 2, 0x00FF_FFFF);

        win.set_title(&format!(
            "BSP visibility  leaves {}/{}  walls {}  sprites {}  clip {}  frustum {}",
            stats.subsectors,
            lvl.subsectors.len(),
            stats.walls,
            stats.things,
            stats.clip_ranges,
            if config.frustum_clip { "on" } else { "off" },
        ));
        win.update_with_buffer(&buf, WIDTH, HEIGHT)?;
    }
    Ok(())
}
