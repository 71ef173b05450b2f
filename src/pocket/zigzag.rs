//! The zig-zag pocket generator (§4.6): sweep parallel bands across the
//! already tool-radius-offset area at `zig_angle_degrees`, intersecting each
//! band with the area to get one "zig" cut per row, then chain the zigs into
//! continuous curves with straight "zag" transitions between them.

use crate::context::{bump, should_abort, ProcessingContext};
use crate::errors::AreaResult;
use crate::geometry::area::Area;
use crate::geometry::curve::Curve;
use crate::geometry::point::Point;
use crate::geometry::vertex::Vertex;
use tracing::debug;

fn rotate_point(p: Point, cos_a: f64, sin_a: f64) -> Point {
    Point::new(p.x * cos_a - p.y * sin_a, p.x * sin_a + p.y * cos_a)
}

fn rotate_curve(curve: &Curve, cos_a: f64, sin_a: f64) -> Curve {
    let mut out = Curve::new();
    for v in &curve.vertices {
        out.push(Vertex {
            kind: v.kind,
            end: rotate_point(v.end, cos_a, sin_a),
            center: rotate_point(v.center, cos_a, sin_a),
            user_tag: v.user_tag,
        });
    }
    out
}

fn rotate_area(area: &Area, cos_a: f64, sin_a: f64) -> Area {
    Area::from_curves(
        area.curves.iter().map(|c| rotate_curve(c, cos_a, sin_a)).collect(),
        area.accuracy,
    )
}

/// An axis-aligned rectangle the full width of the rotated bounding box, `stepover`
/// tall, used to carve out one row of the sweep (§4.6 step 2).
fn rectangle_curve(min_x: f64, max_x: f64, y0: f64, y1: f64) -> Curve {
    let mut c = Curve::starting_at(Point::new(min_x, y0));
    c.push(Vertex::line(Point::new(max_x, y0)));
    c.push(Vertex::line(Point::new(max_x, y1)));
    c.push(Vertex::line(Point::new(min_x, y1)));
    c.push(Vertex::line(Point::new(min_x, y0)));
    c
}

/// The piece's four band-boundary anchors (§4.6 step 4): leftmost/rightmost
/// vertices on the band's bottom (`y0`) and top (`y0+stepover`) edges.
struct BandAnchors {
    top_left: Point,
    top_right: Point,
    bottom_left: Point,
    bottom_right: Point,
}

fn band_anchors(piece: &Curve, y0: f64, y1: f64, tol: f64) -> Option<BandAnchors> {
    let pts: Vec<Point> = piece.vertices.iter().map(|v| v.end).collect();
    let top: Vec<Point> = pts.iter().copied().filter(|p| (p.y - y1).abs() < tol).collect();
    let bottom: Vec<Point> = pts.iter().copied().filter(|p| (p.y - y0).abs() < tol).collect();
    if top.len() < 2 || bottom.is_empty() {
        return None;
    }
    let min_x = |pts: &[Point]| pts.iter().copied().reduce(|a, b| if b.x < a.x { b } else { a });
    let max_x = |pts: &[Point]| pts.iter().copied().reduce(|a, b| if b.x > a.x { b } else { a });
    Some(BandAnchors {
        top_left: min_x(&top)?,
        top_right: max_x(&top)?,
        bottom_left: min_x(&bottom)?,
        bottom_right: max_x(&bottom)?,
    })
}

/// One "zig" cut plus its "zag" transition (§4.6 step 4): the zig runs from the
/// band-bottom anchor on the leading side of travel to the band-top anchor on
/// the trailing side; the zag continues from there along the band's top edge to
/// the opposite top anchor. Both of the zag's endpoints sit on the same
/// (`y0 + stepover`) edge, so it is flat in the working frame regardless of the
/// zig's own slope — the next row's zig (whose own bottom-band anchor lands on
/// that same band-boundary point, per §4.6 step 4's "shared band boundary")
/// chains onto whichever of the two the geometry actually lands on.
fn make_zig_and_zag(piece: &Curve, y0: f64, y1: f64, left_to_right: bool, tol: f64) -> Option<(Curve, Curve)> {
    let anchors = band_anchors(piece, y0, y1, tol)?;
    let (zig_start, zig_end, zag_end) = if left_to_right {
        (anchors.bottom_left, anchors.top_right, anchors.top_left)
    } else {
        (anchors.bottom_right, anchors.top_left, anchors.top_right)
    };
    if zig_start.approx_eq(&zig_end, 1e-9) {
        return None;
    }

    let mut zig = Curve::starting_at(zig_start);
    zig.push(Vertex::line(zig_end));

    let mut zag = Curve::starting_at(zig_end);
    if !zig_end.approx_eq(&zag_end, 1e-9) {
        zag.push(Vertex::line(zag_end));
    }

    Some((zig, zag))
}

/// Chain zigs into continuous curves with zag transitions (§4.6 steps 5-6).
///
/// Zigzags are processed in generation order (row by row). A zig is appended to
/// whichever existing chain currently ends where this zig starts (within
/// `2 * accuracy`); otherwise it opens a new chain. Each chain remembers only its
/// most recently appended zig's zag as a *pending* transition — once another zig
/// is appended after it the pending zag is superseded (dropped), since §4.6 step 6
/// only emits a chain's zag for its terminal zigzag. A pending zag is also dropped
/// outright if its endpoint retraces a vertex of any zig already placed, so the
/// emitted toolpath never re-cuts material it already removed.
fn chain_zigzags(zigzags: Vec<(Curve, Curve)>, accuracy: f64) -> Vec<Curve> {
    struct Chain {
        curve: Curve,
        end: Point,
        pending_zag: Option<Curve>,
    }

    let tol = 2.0 * accuracy;
    let mut chains: Vec<Chain> = Vec::new();
    let mut placed_zig_points: Vec<Point> = Vec::new();

    for (zig, zag) in zigzags {
        let zig_start = zig.start().unwrap_or(Point::ZERO);
        let zig_end = zig.end().unwrap_or(Point::ZERO);

        let zag_end = zag.end().unwrap_or(Point::ZERO);
        let zag = if placed_zig_points.iter().any(|p| p.approx_eq(&zag_end, tol)) {
            None
        } else {
            Some(zag)
        };

        placed_zig_points.push(zig_start);
        placed_zig_points.push(zig_end);

        match chains.iter_mut().find(|c| c.end.approx_eq(&zig_start, tol)) {
            Some(chain) => {
                for v in zig.vertices.iter().skip(1) {
                    chain.curve.push(*v);
                }
                chain.end = zig_end;
                chain.pending_zag = zag;
            }
            None => chains.push(Chain {
                curve: zig,
                end: zig_end,
                pending_zag: zag,
            }),
        }
    }

    chains
        .into_iter()
        .map(|mut chain| {
            if let Some(zag) = chain.pending_zag {
                for v in zag.vertices.iter().skip(1) {
                    chain.curve.push(*v);
                }
            }
            chain.curve
        })
        .collect()
}

/// `CArea::MakeZigZagToolpath` (§4.6): `area` is already tool-radius-offset.
/// `angle_degrees` rotates the sweep direction; `stepover` is the row pitch.
pub fn zigzag(
    area: &Area,
    stepover: f64,
    angle_degrees: f64,
    accuracy: f64,
    ctx: &mut Option<&mut ProcessingContext>,
) -> AreaResult<Vec<Curve>> {
    if area.is_empty() || stepover <= 0.0 {
        return Ok(Vec::new());
    }

    let theta = -angle_degrees.to_radians();
    let cos_a = theta.cos();
    let sin_a = theta.sin();
    let rotated = rotate_area(area, cos_a, sin_a);
    let bbox = rotated.get_box();
    if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
        return Ok(Vec::new());
    }

    let row_count = ((bbox.height() / stepover).ceil() as i64).max(1);
    let tol = 2.0 * accuracy;
    let mut zigzags: Vec<(Curve, Curve)> = Vec::new();

    for row in 0..row_count {
        if should_abort(ctx) {
            debug!(row, "aborted mid-zigzag sweep");
            break;
        }
        let y0 = bbox.min_y + row as f64 * stepover;
        let y1 = (y0 + stepover).min(bbox.max_y);
        if y1 <= y0 {
            continue;
        }
        let band = rectangle_curve(bbox.min_x - 1.0, bbox.max_x + 1.0, y0, y1);
        let band_area = Area::from_curves(vec![band], accuracy);
        let clipped = rotated.intersected(&band_area)?;

        let left_to_right = row % 2 == 0;
        for piece in clipped.curves.iter().filter(|c| !c.is_clockwise()) {
            if let Some(zigzag) = make_zig_and_zag(piece, y0, y1, left_to_right, tol) {
                zigzags.push(zigzag);
            }
        }
        bump(ctx, 1.0);
    }

    let chains = chain_zigzags(zigzags, accuracy);
    Ok(chains
        .into_iter()
        .map(|c| {
            let inv_sin = -sin_a;
            rotate_curve(&c, cos_a, inv_sin)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> Curve {
        let mut c = Curve::starting_at(Point::new(0.0, 0.0));
        c.push(Vertex::line(Point::new(side, 0.0)));
        c.push(Vertex::line(Point::new(side, side)));
        c.push(Vertex::line(Point::new(0.0, side)));
        c.push(Vertex::line(Point::new(0.0, 0.0)));
        c
    }

    #[test]
    fn unit_square_zigzag_produces_rows() {
        let area = Area::from_curves(vec![square(10.0)], 0.01);
        let mut ctx = None;
        let curves = zigzag(&area, 2.0, 0.0, 0.01, &mut ctx).unwrap();
        assert!(!curves.is_empty());
        for c in &curves {
            assert!(c.vertices.len() >= 2);
        }
    }

    #[test]
    fn square_zigzag_chains_into_one_continuous_curve() {
        // A plain axis-aligned square has no islands to split rows apart, so every
        // row's zig should chain onto the last through a shared band-boundary point.
        let area = Area::from_curves(vec![square(10.0)], 0.01);
        let mut ctx = None;
        let curves = zigzag(&area, 1.5, 0.0, 0.01, &mut ctx).unwrap();
        assert_eq!(curves.len(), 1, "rows should chain into a single toolpath curve");

        let chain = &curves[0];
        let tol = 2.0 * 0.01;
        let mut prev_end = chain.start().unwrap();
        for span in chain.get_spans() {
            let p_start = span.start;
            assert!(
                p_start.approx_eq(&prev_end, tol),
                "consecutive spans should be contiguous: {p_start:?} vs {prev_end:?}"
            );
            prev_end = span.end();
        }
    }

    #[test]
    fn angled_sweep_still_covers_rectangle() {
        let mut c = Curve::starting_at(Point::new(0.0, 0.0));
        c.push(Vertex::line(Point::new(30.0, 0.0)));
        c.push(Vertex::line(Point::new(30.0, 10.0)));
        c.push(Vertex::line(Point::new(0.0, 10.0)));
        c.push(Vertex::line(Point::new(0.0, 0.0)));
        let area = Area::from_curves(vec![c], 0.01);
        let mut ctx = None;
        let curves = zigzag(&area, 2.0, 22.5, 0.01, &mut ctx).unwrap();
        assert!(!curves.is_empty());
    }

    #[test]
    fn empty_area_yields_no_zigzag() {
        let area = Area::new(0.01);
        let mut ctx = None;
        let curves = zigzag(&area, 2.0, 0.0, 0.01, &mut ctx).unwrap();
        assert!(curves.is_empty());
    }
}
