pub mod angle;
pub mod arena;
pub mod bbox;
pub mod clipper;
pub mod frame;
pub mod lod;
pub mod records;
mod subsector;
pub mod types;

pub use angle::{ANG45, ANG90, ANG180, ANG270, ANGLE_MAX, Angle, point_to_pseudo};
pub use arena::{ArenaError, ArenaPool, DrawRecord, Handle, Link, RecordKind, RecordList};
pub use bbox::check_bbox;
pub use clipper::{AngleInterval, ClipError, Clipper};
pub use frame::{FrameStats, RenderFrameContext};
pub use records::{DrawFloor, DrawPlane, DrawSub, DrawThing, DrawWall, PlaneFace, WallFlags};
pub use types::{FrameConfig, Viewpoint};
