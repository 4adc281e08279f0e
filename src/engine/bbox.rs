use crate::{
    engine::{clipper::Clipper, types::Viewpoint},
    world::geometry::BoundingBox,
};

const BOXTOP: usize = 0;
const BOXBOTTOM: usize = 1;
const BOXLEFT: usize = 2;
const BOXRIGHT: usize = 3;

/// Silhouette corners per viewer region, as indices into
/// `[top, bottom, left, right]`: `(x1, y1, x2, y2)`, where corner 1 is the
/// counter-clockwise end of the arc.  Region = `(boxy << 2) + boxx`;
/// rows 3 and 7 are never produced and row 5 (inside) is never read.
const CHECKCOORD: [[usize; 4]; 11] = [
    [BOXRIGHT, BOXTOP, BOXLEFT, BOXBOTTOM],
    [BOXRIGHT, BOXTOP, BOXLEFT, BOXTOP],
    [BOXRIGHT, BOXBOTTOM, BOXLEFT, BOXTOP],
    [0; 4],
    [BOXLEFT, BOXTOP, BOXLEFT, BOXBOTTOM],
    [0; 4],
    [BOXRIGHT, BOXBOTTOM, BOXRIGHT, BOXTOP],
    [0; 4],
    [BOXLEFT, BOXTOP, BOXRIGHT, BOXBOTTOM],
    [BOXLEFT, BOXBOTTOM, BOXRIGHT, BOXBOTTOM],
    [BOXLEFT, BOXBOTTOM, BOXRIGHT, BOXTOP],
];

/// Region of the viewer around `bb`: 0‥10, 5 meaning inside.
#[inline]
fn region(bb: &BoundingBox, view: &Viewpoint) -> usize {
    let boxx = if view.x <= bb.left as f64 {
        0
    } else if view.x < bb.right as f64 {
        1
    } else {
        2
    };
    let boxy = if view.y >= bb.top as f64 {
        0
    } else if view.y > bb.bottom as f64 {
        1
    } else {
        2
    };
    (boxy << 2) + boxx
}

/// Can anything inside `bb` still show through the clipper?
///
/// A viewer inside the box always gets `true`; otherwise the arc spanned by
/// the box's silhouette edge is tested with [`Clipper::safe_check_range`].
pub fn check_bbox(clipper: &Clipper, view: &Viewpoint, bb: &BoundingBox) -> bool {
    let boxpos = region(bb, view);
    if boxpos == 5 {
        return true;
    }

    let coords = [bb.top, bb.bottom, bb.left, bb.right];
    let check = &CHECKCOORD[boxpos];
    let (x1, y1) = (coords[check[0]] as f64, coords[check[1]] as f64);
    let (x2, y2) = (coords[check[2]] as f64, coords[check[3]] as f64);

    let angle1 = view.pseudo_angle_to(x1, y1);
    let angle2 = view.pseudo_angle_to(x2, y2);
    clipper.safe_check_range(angle2, angle1)
}

/*──────────────────────────────── Tests ───────────────────────────────*/
