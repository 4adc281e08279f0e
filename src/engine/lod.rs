//! Level-of-detail numbers.
//!
//! `1` is full detail, `2` half, and so on: one step per `base_cube` map
//! units of distance between the eye and the nearest part of the object.

use crate::{engine::types::Viewpoint, world::geometry::BoundingBox};

#[inline]
fn lod(dist: f64, base_cube: f64) -> u32 {
    1 + (dist / base_cube) as u32
}

/// Distance from `eye` to the span `lo..hi` on one axis; 0 when it straddles.
#[inline]
fn axis_gap(lo: f64, hi: f64, eye: f64) -> f64 {
    let (a, b) = (lo - eye, hi - eye);
    if (a < 0.0) != (b < 0.0) {
        0.0
    } else {
        a.abs().min(b.abs())
    }
}

pub fn point_lod(view: &Viewpoint, x: f64, y: f64, z: f64, base_cube: f64) -> u32 {
    let d = (x - view.x)
        .abs()
        .max((y - view.y).abs())
        .max((z - view.z).abs());
    lod(d, base_cube)
}

/// LOD of a 3-D box given by two opposite corners.
pub fn bbox_lod(view: &Viewpoint, p1: [f64; 3], p2: [f64; 3], base_cube: f64) -> u32 {
    let d = axis_gap(p1[0], p2[0], view.x)
        .max(axis_gap(p1[1], p2[1], view.y))
        .max(axis_gap(p1[2], p2[2], view.z));
    lod(d, base_cube)
}

/// Walls use the box spanned by their two end points (bottom and top).
#[inline]
pub fn wall_lod(view: &Viewpoint, p1: [f64; 3], p2: [f64; 3], base_cube: f64) -> u32 {
    bbox_lod(view, p1, p2, base_cube)
}

/// A flat at height `h` covering the leaf box `bb`.
pub fn plane_lod(view: &Viewpoint, bb: &BoundingBox, h: f64, base_cube: f64) -> u32 {
    let dx = axis_gap(bb.left as f64, bb.right as f64, view.x);
    let dy = axis_gap(bb.bottom as f64, bb.top as f64, view.y);
    lod((h - view.z).abs().max(dx).max(dy), base_cube)
}
