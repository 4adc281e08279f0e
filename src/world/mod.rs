pub mod bsp;
pub mod camera;
pub mod geometry;
pub mod grid;

pub use geometry::{
    BoundingBox, Level, Linedef, LinedefFlags, LinedefId, NO_TEXTURE, Node, PLAYER_START_TYPE,
    Sector, SectorId, Seg, SegmentId, Sidedef, SidedefId, Subsector, SubsectorId, TextureId, Thing,
    ThingId, Vertex, VertexId,
};

pub use camera::Camera;

pub use grid::{DEMO_MAP, GridError, parse_grid};
