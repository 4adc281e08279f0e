//! Per-frame visibility core for Doom-style BSP renderers.
//!
//! * [`engine`] – angular occlusion clipper, pseudo-angles, bounding-box
//!   culling, draw-record arenas and the front-to-back traversal driver.
//! * [`world`] – the read-only level data the core walks.

pub mod engine;
pub mod world;
