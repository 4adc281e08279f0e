//! ---------------------------------------------------------------------------
//! Tile-grid levels
//!
//! Builds a complete [`Level`] (vertices, linedefs, sidedefs, segs, leaves and
//! an axis-aligned BSP) from rows of ASCII tiles.  Every open tile becomes one
//! sector and one convex leaf with four segs, so the result needs no node
//! builder and is exact enough to exercise the visibility pipeline.
//!
//! | tile | meaning                                  |
//! |------|------------------------------------------|
//! | `#`  | solid rock                               |
//! | `.`  | open, floor 0, ceiling 128               |
//! | `1`–`9` | open, floor raised by 16 per step     |
//! | `D`  | closed door (ceiling down on the floor)  |
//! | `T`  | open, with a monster                     |
//! | `P`  | open, with the player start              |
//!
//! The first row is the north edge of the map.
//! ---------------------------------------------------------------------------

use std::collections::HashMap;

use glam::{Vec2, vec2};
use thiserror::Error;

use crate::world::{
    bsp::{CHILD_MASK, SUBSECTOR_BIT},
    geometry::{
        BoundingBox, Level, Linedef, LinedefFlags, LinedefId, NO_TEXTURE, Node, PLAYER_START_TYPE,
        Sector, SectorId, Seg, Sidedef, Subsector, SubsectorId, TextureId, Thing, VertexId,
        Vertex,
    },
};

/// Side length of one tile in map units.
pub const CELL: f32 = 64.0;

const OPEN_CEIL: f32 = 128.0;
const STEP_H: f32 = 16.0;
const LIGHT: u8 = 160;

pub const WALL_TEX: TextureId = 1;
pub const STEP_TEX: TextureId = 2;
pub const FLAT_TEX: TextureId = 3;

pub const MONSTER_TYPE: u16 = 3001;

/// Multi-room map used by the binaries and the frame tests.
pub const DEMO_MAP: &str = "\
################################
#P.....#..........#............#
#......#..T.......D......T.....#
#..##..#..........#............#
#..##.....####....######..##...#
#.........#..#.........#..##...#
#######...#..#..T......#.......#
#.....#...####.........D.......#
#.123.#................#...T...#
#.....D.......######...#########
#.321.#.......#....#...........#
#.....#...T...#....#....T......#
#######.......######...........#
#..............................#
################################";

/*──────────────────────────── Error type ───────────────────────────*/

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no open tiles")]
    NoOpenCells,

    #[error("row {row} has {found} tiles, expected {expected}")]
    Ragged {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unknown tile `{ch}` at row {row}, column {col}")]
    UnknownTile { ch: char, row: usize, col: usize },

    #[error("{0} open tiles do not fit the 16-bit map lumps")]
    TooLarge(usize),
}

/*──────────────────────────── Tiles ────────────────────────────────*/

#[derive(Clone, Copy, Debug, PartialEq)]
enum Tile {
    Solid,
    Open {
        floor_h: f32,
        ceil_h: f32,
        thing: Option<u16>,
    },
}

impl Tile {
    fn parse(ch: char, row: usize, col: usize) -> Result<Self, GridError> {
        let open = |floor_h: f32, ceil_h: f32, thing| Tile::Open {
            floor_h,
            ceil_h,
            thing,
        };
        Ok(match ch {
            '#' => Tile::Solid,
            '.' => open(0.0, OPEN_CEIL, None),
            'D' => open(0.0, 0.0, None),
            'T' => open(0.0, OPEN_CEIL, Some(MONSTER_TYPE)),
            'P' => open(0.0, OPEN_CEIL, Some(PLAYER_START_TYPE)),
            '1'..='9' => {
                let step = ch.to_digit(10).unwrap_or(0) as f32;
                open(step * STEP_H, OPEN_CEIL, None)
            }
            _ => return Err(GridError::UnknownTile { ch, row, col }),
        })
    }
}

/// One open tile and the ids it was given.
#[derive(Clone, Copy, Debug)]
struct Cell {
    col: usize,
    row: usize,
    ss: SubsectorId,
    bbox: BoundingBox,
}

/*──────────────────────────── Public API ───────────────────────────*/

/// Build a level from `text`.  Blank lines are ignored.
pub fn parse_grid(name: &str, text: &str) -> Result<Level, GridError> {
    let rows: Vec<&str> = text
        .lines()
        .map(|l| l.trim_end())
        .filter(|l| !l.is_empty())
        .collect();

    let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
    let mut tiles = Vec::with_capacity(rows.len());
    for (row, line) in rows.iter().enumerate() {
        let found = line.chars().count();
        if found != width {
            return Err(GridError::Ragged {
                row,
                found,
                expected: width,
            });
        }
        let parsed = line
            .chars()
            .enumerate()
            .map(|(col, ch)| Tile::parse(ch, row, col))
            .collect::<Result<Vec<_>, _>>()?;
        tiles.push(parsed);
    }

    let mut builder = GridBuilder::new(name, tiles, width)?;
    builder.emit_cells();
    let all: Vec<usize> = (0..builder.cells.len()).collect();
    builder.split(&all);

    let mut level = builder.level;
    level.finalise_bsp();
    log::debug!(
        "grid `{}`: {} leaves, {} nodes, {} segs",
        level.name,
        level.subsectors.len(),
        level.nodes.len(),
        level.segs.len()
    );
    Ok(level)
}

/*──────────────────────────── Builder ──────────────────────────────*/

struct GridBuilder {
    tiles: Vec<Vec<Tile>>,
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    level: Level,
    corners: HashMap<(usize, usize), VertexId>,
    shared: HashMap<(VertexId, VertexId), LinedefId>,
}

impl GridBuilder {
    fn new(name: &str, tiles: Vec<Vec<Tile>>, cols: usize) -> Result<Self, GridError> {
        let rows = tiles.len();
        let mut cells = Vec::new();
        for (row, line) in tiles.iter().enumerate() {
            for (col, tile) in line.iter().enumerate() {
                if matches!(tile, Tile::Open { .. }) {
                    let x0 = col as f32 * CELL;
                    let y0 = (rows - row - 1) as f32 * CELL;
                    cells.push(Cell {
                        col,
                        row,
                        ss: cells.len() as SubsectorId,
                        bbox: BoundingBox::new(x0, y0, x0 + CELL, y0 + CELL),
                    });
                }
            }
        }

        if cells.is_empty() {
            return Err(GridError::NoOpenCells);
        }
        // four segs and four sidedefs per leaf, one vertex per tile corner
        if cells.len() * 4 > u16::MAX as usize
            || cells.len() > CHILD_MASK as usize
            || (rows + 1) * (cols + 1) > u16::MAX as usize
        {
            return Err(GridError::TooLarge(cells.len()));
        }

        Ok(Self {
            tiles,
            rows,
            cols,
            cells,
            level: Level {
                name: name.to_string(),
                ..Level::default()
            },
            corners: HashMap::new(),
            shared: HashMap::new(),
        })
    }

    fn tile(&self, col: isize, row: isize) -> Tile {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return Tile::Solid;
        }
        self.tiles[row as usize][col as usize]
    }

    /// Vertex at tile corner `(col, row)`; row 0 is the north edge.
    fn corner(&mut self, col: usize, row: usize) -> VertexId {
        let rows = self.rows;
        let vertices = &mut self.level.vertices;
        *self.corners.entry((col, row)).or_insert_with(|| {
            vertices.push(Vertex {
                pos: vec2(col as f32 * CELL, (rows - row) as f32 * CELL),
            });
            (vertices.len() - 1) as VertexId
        })
    }

    /// Sectors, sidedefs, linedefs, segs and leaves for every open tile.
    fn emit_cells(&mut self) {
        for idx in 0..self.cells.len() {
            let cell = self.cells[idx];
            let Tile::Open {
                floor_h,
                ceil_h,
                thing,
            } = self.tiles[cell.row][cell.col]
            else {
                continue;
            };

            let sector = self.level.sectors.len() as SectorId;
            self.level.sectors.push(Sector {
                floor_h,
                ceil_h,
                floor_tex: FLAT_TEX,
                ceil_tex: FLAT_TEX,
                light: LIGHT,
            });

            let (c, r) = (cell.col, cell.row);
            let bl = self.corner(c, r + 1);
            let tl = self.corner(c, r);
            let tr = self.corner(c + 1, r);
            let br = self.corner(c + 1, r + 1);

            // Clockwise with +y up, so the tile interior is on each seg's right.
            let (ci, ri) = (c as isize, r as isize);
            let edges = [
                (bl, tl, self.tile(ci - 1, ri)),
                (tl, tr, self.tile(ci, ri - 1)),
                (tr, br, self.tile(ci + 1, ri)),
                (br, bl, self.tile(ci, ri + 1)),
            ];

            let first_seg = self.level.segs.len() as u16;
            for (v1, v2, neighbour) in edges {
                self.emit_seg(v1, v2, sector, floor_h, ceil_h, neighbour);
            }

            self.level.subsectors.push(Subsector {
                seg_count: 4,
                first_seg,
                sector,
                things: Default::default(),
                bbox: cell.bbox,
            });

            if let Some(type_id) = thing {
                let centre = (cell.bbox.min() + cell.bbox.max()) * 0.5;
                self.level.things.push(thing_at(centre, type_id));
            }
        }
    }

    fn emit_seg(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        sector: SectorId,
        floor_h: f32,
        ceil_h: f32,
        neighbour: Tile,
    ) {
        let sidedef = self.level.sidedefs.len() as u16;
        let (upper, lower, middle) = match neighbour {
            Tile::Solid => (NO_TEXTURE, NO_TEXTURE, WALL_TEX),
            Tile::Open {
                floor_h: back_floor,
                ceil_h: back_ceil,
                ..
            } => (
                if back_ceil < ceil_h { WALL_TEX } else { NO_TEXTURE },
                if back_floor > floor_h { STEP_TEX } else { NO_TEXTURE },
                NO_TEXTURE,
            ),
        };
        self.level.sidedefs.push(Sidedef {
            x_off: 0.0,
            y_off: 0.0,
            upper,
            lower,
            middle,
            sector,
        });

        let (linedef, dir) = match neighbour {
            Tile::Solid => (self.push_linedef(v1, v2, LinedefFlags::IMPASSABLE, sidedef), 0),
            Tile::Open { .. } => {
                let key = (v1.min(v2), v1.max(v2));
                match self.shared.get(&key).copied() {
                    // the neighbour emitted this line first, running the other way
                    Some(ld) => {
                        self.level.linedefs[ld as usize].left_sidedef = Some(sidedef);
                        (ld, 1)
                    }
                    None => {
                        let ld = self.push_linedef(v1, v2, LinedefFlags::TWO_SIDED, sidedef);
                        self.shared.insert(key, ld);
                        (ld, 0)
                    }
                }
            }
        };

        self.level.segs.push(Seg {
            v1,
            v2,
            linedef,
            dir,
            offset: 0.0,
        });
    }

    fn push_linedef(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        flags: LinedefFlags,
        right: u16,
    ) -> LinedefId {
        self.level.linedefs.push(Linedef {
            v1,
            v2,
            flags,
            right_sidedef: Some(right),
            left_sidedef: None,
        });
        (self.level.linedefs.len() - 1) as LinedefId
    }

    /// Recursively split `set` (indices into `cells`) at the middle grid line
    /// of its longer axis.  Returns the child reference for the parent.
    fn split(&mut self, set: &[usize]) -> u16 {
        if let [only] = set {
            return SUBSECTOR_BIT | self.cells[*only].ss;
        }

        let cols = set.iter().map(|&i| self.cells[i].col);
        let rows = set.iter().map(|&i| self.cells[i].row);
        let (min_c, max_c) = (cols.clone().min().unwrap_or(0), cols.max().unwrap_or(0));
        let (min_r, max_r) = (rows.clone().min().unwrap_or(0), rows.max().unwrap_or(0));

        let (front, back, partition): (Vec<usize>, Vec<usize>, [f32; 4]) =
            if max_c - min_c >= max_r - min_r {
                // vertical splitter pointing north: front is east of it
                let s = (min_c + max_c + 1) / 2;
                let (f, b): (Vec<usize>, Vec<usize>) =
                    set.iter().partition(|&&i| self.cells[i].col >= s);
                (f, b, [s as f32 * CELL, 0.0, 0.0, 1.0])
            } else {
                // horizontal splitter pointing west: front is north of it
                let s = (min_r + max_r + 1) / 2;
                let (f, b): (Vec<usize>, Vec<usize>) =
                    set.iter().partition(|&&i| self.cells[i].row < s);
                (f, b, [0.0, (self.rows - s) as f32 * CELL, -1.0, 0.0])
            };

        let bbox = [self.bounds_of(&front), self.bounds_of(&back)];
        let front_child = self.split(&front);
        let back_child = self.split(&back);

        let [x, y, dx, dy] = partition;
        self.level.nodes.push(Node {
            x,
            y,
            dx,
            dy,
            bbox,
            child: [front_child, back_child],
        });
        (self.level.nodes.len() - 1) as u16
    }

    fn bounds_of(&self, set: &[usize]) -> BoundingBox {
        set.iter()
            .map(|&i| self.cells[i].bbox)
            .fold(BoundingBox::EMPTY, |acc, bb| acc.union(&bb))
    }
}

fn thing_at(pos: Vec2, type_id: u16) -> Thing {
    let (radius, height) = if type_id == PLAYER_START_TYPE {
        (16.0, 56.0)
    } else {
        (20.0, 56.0)
    };
    Thing {
        pos,
        angle: 0.0,
        type_id,
        radius,
        height,
        sub_sector: 0,
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_map_parses() {
        let lvl = parse_grid("demo", DEMO_MAP).unwrap();
        assert_eq!(lvl.subsectors.len(), lvl.sectors.len());
        assert_eq!(lvl.nodes.len(), lvl.subsectors.len() - 1);
        assert_eq!(lvl.segs.len(), lvl.subsectors.len() * 4);
        assert!(lvl.player_start().is_some());
    }

    #[test]
    fn two_sided_lines_get_both_sidedefs() {
        let lvl = parse_grid("pair", "####\n#..#\n####").unwrap();
        let two_sided: Vec<_> = lvl
            .linedefs
            .iter()
            .filter(|ld| ld.flags.contains(LinedefFlags::TWO_SIDED))
            .collect();
        assert_eq!(two_sided.len(), 1);
        assert!(two_sided[0].left_sidedef.is_some());
        // 2 leaves × 4 edges, the shared edge counted once
        assert_eq!(lvl.linedefs.len(), 7);
    }

    #[test]
    fn segs_face_into_their_leaf() {
        let lvl = parse_grid("face", "#####\n#.2.#\n#####").unwrap();
        for (ss_idx, ss) in lvl.subsectors.iter().enumerate() {
            let centre = (ss.bbox.min() + ss.bbox.max()) * 0.5;
            for seg_idx in lvl.segs_of_subsector(ss_idx as u16) {
                let seg = &lvl.segs[seg_idx as usize];
                let a = lvl.vertices[seg.v1 as usize].pos;
                let b = lvl.vertices[seg.v2 as usize].pos;
                let wall = b - a;
                // right-hand normal points at the interior
                let n = vec2(wall.y, -wall.x);
                assert!(n.dot(centre - a) > 0.0);

                let (front, _) = lvl.seg_sides(seg);
                assert_eq!(front.unwrap().sector, ss.sector);
            }
        }
    }

    #[test]
    fn raised_step_shows_lower_texture() {
        let lvl = parse_grid("step", "####\n#.3#\n####").unwrap();
        assert_eq!(lvl.sectors[1].floor_h, 48.0);
        assert!(lvl.sidedefs.iter().any(|sd| sd.lower == STEP_TEX));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse_grid("e", "###\n###").unwrap_err(),
            GridError::NoOpenCells
        );
        assert_eq!(
            parse_grid("r", "###\n#.\n###").unwrap_err(),
            GridError::Ragged {
                row: 1,
                found: 2,
                expected: 3
            }
        );
        assert_eq!(
            parse_grid("u", "###\n#x#\n###").unwrap_err(),
            GridError::UnknownTile {
                ch: 'x',
                row: 1,
                col: 1
            }
        );
    }
}
