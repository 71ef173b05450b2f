//! Inward/outward polygon offset and open-curve Minkowski thickening (§4.2),
//! expressed as a union of small "loop"/"obround" polygons built around each edge,
//! clipped through the same integer-clipping adapter used for the raw Booleans.

use super::clip::unite_curves;
use super::curve::Curve;
use super::point::Point;
use super::span::Span;
use super::vertex::{Vertex, VertexKind};

/// Sagitta tolerance used for the loop/obround arcs themselves; independent of the
/// area's own `accuracy`, matching the original implementation's hardcoded `0.01`.
const LOOP_ARC_ACCURACY: f64 = 0.01;
const ENCLOSING_SQUARE_HALF_SIDE: f64 = 10_000.0;

fn square_curve(half_side: f64) -> Curve {
    let mut c = Curve::starting_at(Point::new(-half_side, -half_side));
    c.push(Vertex::line(Point::new(-half_side, half_side)));
    c.push(Vertex::line(Point::new(half_side, half_side)));
    c.push(Vertex::line(Point::new(half_side, -half_side)));
    c.push(Vertex::line(Point::new(-half_side, -half_side)));
    c
}

/// Flatten a curve to a bare point ring (no repeated closing point), used as the
/// input to the per-triple loop construction.
fn point_ring(curve: &Curve, accuracy: f64) -> Vec<Point> {
    let mut pts = Vec::new();
    if let Some(start) = curve.start() {
        pts.push(start);
    }
    for span in curve.get_spans() {
        for p in super::curve::flatten_arc_points(&span, accuracy) {
            pts.push(p);
        }
    }
    if pts.len() > 1 {
        if let (Some(first), Some(last)) = (pts.first().copied(), pts.last().copied()) {
            if first.approx_eq(&last, 1e-9) {
                pts.pop();
            }
        }
    }
    pts
}

fn right_normal_of(from: Point, to: Point) -> Point {
    (to - from).right_normal()
}

/// Append one "loop" around vertex `p1` of a polygon traversed `(p0, p1, p2)` onto
/// an in-progress accumulator path: an offset strip pivoting at `p1` by the signed
/// `radius` (§4.2). Consecutive loops share an endpoint (this loop's `v2_end` is the
/// next loop's `v0_end`), so the whole polygon's loops chain into one continuous,
/// self-intersecting path rather than separate closed sub-polygons.
fn append_loop(acc: &mut Option<Curve>, p0: Point, p1: Point, p2: Point, radius: f64) {
    let right0 = right_normal_of(p0, p1);
    let right1 = right_normal_of(p1, p2);
    let arc_kind = if radius > 0.0 {
        VertexKind::ArcCcw
    } else {
        VertexKind::ArcCw
    };
    let v0_end = p1 + right0 * radius;
    let v1_end = p1 + right1 * radius;
    let v2_end = p2 + right1 * radius;

    let curve = acc.get_or_insert_with(|| Curve::starting_at(v0_end));
    curve.push(Vertex::arc(arc_kind, v1_end, p1));
    curve.push(Vertex::line(v2_end));
}

/// Build the single accumulated loop path for one input ring (`AreaClipper.cpp`'s
/// `OffsetWithLoops`: `pts_for_AddVertex` is cleared once per polygon, then one
/// `c.AddPath`), rather than one closed path per vertex triple — a per-triple
/// closing edge would sum a spurious reversed-ring winding term into the union.
fn build_ring_loop_curve(ring: &[Point], radius: f64) -> Option<Curve> {
    let n = ring.len();
    if n < 3 {
        return None;
    }
    let mut acc: Option<Curve> = None;
    for i in 0..n {
        let p0 = ring[(i + n - 1) % n];
        let p1 = ring[i];
        let p2 = ring[(i + 1) % n];
        append_loop(&mut acc, p0, p1, p2, radius);
    }
    acc
}

/// `CArea::Offset` / `AreaClipper.cpp`'s `OffsetWithLoops`: positive `inwards_value`
/// erodes the region, negative dilates it.
pub fn offset_curves(curves: &[Curve], accuracy: f64, inwards_value: f64, fit_arcs: bool) -> Vec<Curve> {
    let inwards = inwards_value > 0.0;
    let reverse_input = !inwards;
    let radius = -inwards_value.abs();

    let mut loop_curves: Vec<Curve> = Vec::new();
    if inwards {
        loop_curves.push(square_curve(ENCLOSING_SQUARE_HALF_SIDE));
    }

    for curve in curves {
        let mut ring = point_ring(curve, accuracy);
        if reverse_input {
            ring.reverse();
        }
        if let Some(loop_curve) = build_ring_loop_curve(&ring, radius) {
            loop_curves.push(loop_curve);
        }
    }

    let mut result = unite_curves(&loop_curves, accuracy.min(LOOP_ARC_ACCURACY), fit_arcs);

    if inwards {
        if !result.is_empty() {
            // discard the enclosing square's own boundary, leaving the eroded shape
            result.remove(0);
        }
    } else {
        for c in result.iter_mut() {
            c.reverse();
        }
    }

    result
}

/// One "obround" around a single span: the span's left/right parallel offsets
/// joined by half-circles at each end, used to build `Thicken`'s Minkowski sum.
fn make_obround(span: &Span, radius: f64) -> Curve {
    let forward0 = span.get_vector(0.0);
    let forward1 = span.get_vector(1.0);
    let right0 = Point::new(forward0.y, -forward0.x);
    let right1 = Point::new(forward1.y, -forward1.x);

    let p0 = span.start;
    let p1 = span.vertex.end;

    let v0_end = p0 + right0 * radius;
    let v1_end = p1 + right1 * radius;
    let v2_end = p1 + right1 * -radius;
    let v3_end = p0 + right0 * -radius;

    let mut c = Curve::starting_at(v0_end);
    c.push(Vertex {
        kind: span.vertex.kind,
        end: v1_end,
        center: span.vertex.center,
        user_tag: 0,
    });
    c.push(Vertex::arc(VertexKind::ArcCcw, v2_end, p1));
    c.push(Vertex {
        kind: span.vertex.kind.reversed_arc(),
        end: v3_end,
        center: span.vertex.center,
        user_tag: 0,
    });
    c.push(Vertex::arc(VertexKind::ArcCcw, v0_end, p0));
    c
}

/// `CArea::Thicken`: Minkowski sum of every curve's span set with a disk of the
/// given `radius`, applied span-by-span so open curves thicken correctly too.
pub fn thicken_curves(curves: &[Curve], accuracy: f64, radius: f64, fit_arcs: bool) -> Vec<Curve> {
    let mut obrounds = Vec::new();
    for curve in curves {
        for span in curve.get_spans() {
            obrounds.push(make_obround(&span, radius));
        }
    }
    let mut result = unite_curves(&obrounds, accuracy.min(LOOP_ARC_ACCURACY), fit_arcs);
    for c in result.iter_mut() {
        c.reverse();
    }
    result
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
    fn inward_offset_of_square_shrinks() {
        let c = square(20.0);
        let result = offset_curves(&[c], 0.01, 3.0, false);
        assert!(!result.is_empty());
        let area: f64 = result.iter().map(|c| c.signed_area().abs()).sum();
        assert!(area < 400.0);
        assert!(area > 0.0);
    }

    #[test]
    fn thicken_of_single_line_span_makes_a_closed_obround() {
        let mut c = Curve::starting_at(Point::new(0.0, 0.0));
        c.push(Vertex::line(Point::new(10.0, 0.0)));
        let result = thicken_curves(&[c], 0.01, 1.0, false);
        assert!(!result.is_empty());
    }
}
