//! The integer-polygon-clipping adapter (§4.3): flattens arcs to chords, hands the
//! resulting polygon sets to the `clipper2` engine for the four Boolean operators,
//! and converts results back into `Curve`s.

use super::curve::{flatten_arc_points, Curve};
use super::point::Point;
use super::vertex::Vertex;
use clipper2::{difference, intersection, union, xor, Path, PathType, Polygon, Polygons, Vertex as ClipVertex};
use tracing::warn;

/// Flatten one closed `Curve` into a `clipper2::Path`. The original implementation's
/// winding convention is opposite the clipping engine's, so the vertex order is
/// reversed unless `reverse` is false (used for the loop-construction offset, which
/// needs the original's winding).
pub fn curve_to_path(curve: &Curve, accuracy: f64, reverse: bool) -> Path {
    let mut pts: Vec<Point> = Vec::new();
    if let Some(start) = curve.start() {
        pts.push(start);
    }
    for span in curve.get_spans() {
        for p in flatten_arc_points(&span, accuracy) {
            pts.push(p);
        }
    }
    // drop a trailing duplicate of the start point; clipper2 paths are implicitly closed
    if pts.len() > 1 {
        if let (Some(first), Some(last)) = (pts.first().copied(), pts.last().copied()) {
            if first.approx_eq(&last, 1e-9) {
                pts.pop();
            }
        }
    }
    if reverse {
        pts.reverse();
    }
    let vertices: Vec<ClipVertex> = pts.iter().map(|p| ClipVertex::new(p.x, p.y)).collect();
    Path::new(vertices, true)
}

pub fn area_to_polygons(curves: &[Curve], accuracy: f64, path_type: PathType, reverse: bool) -> Polygons {
    let paths: Vec<Path> = curves
        .iter()
        .filter(|c| c.get_spans().len() > 1)
        .map(|c| curve_to_path(c, accuracy, reverse))
        .collect();
    Polygons::new(vec![Polygon::new(paths, path_type)])
}

/// Convert one clipper2 output path back into a closed `Curve` (always lines; an
/// arc-refit pass is applied separately when `fit_arcs` is enabled).
pub fn path_to_curve(path: &Path) -> Curve {
    let vs = path.vertices();
    if vs.is_empty() {
        return Curve::new();
    }
    let mut curve = Curve::starting_at(Point::new(vs[0].x(), vs[0].y()));
    for v in &vs[1..] {
        curve.push(Vertex::line(Point::new(v.x(), v.y())));
    }
    // close explicitly
    curve.push(Vertex::line(Point::new(vs[0].x(), vs[0].y())));
    curve
}

pub fn polygons_to_curves(polygons: &Polygons, accuracy: f64, fit_arcs: bool) -> Vec<Curve> {
    let mut out = Vec::new();
    for polygon in polygons.polygons() {
        for path in polygon.paths() {
            let mut curve = path_to_curve(path);
            curve.remove_tiny_spans(accuracy);
            if curve.get_spans().len() < 2 {
                continue;
            }
            // the clipping engine's winding is opposite this data model's
            curve.reverse();
            if fit_arcs {
                curve.fit_arcs(accuracy);
            }
            out.push(curve);
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Intersection,
    Difference,
    Xor,
}

/// Run one Boolean operator over two curve sets (§4.3 steps 1-3). The caller is
/// responsible for `Reorder`ing the result where the contract requires it (raw
/// Booleans do not reorder; `Offset`/`Thicken` do).
pub fn boolean_op(
    op: BooleanOp,
    subject: &[Curve],
    clip: &[Curve],
    accuracy: f64,
    fit_arcs: bool,
) -> Vec<Curve> {
    let subject_polys = area_to_polygons(subject, accuracy, PathType::Subject, true);
    let clip_polys = area_to_polygons(clip, accuracy, PathType::Clip, true);

    let solution = match op {
        BooleanOp::Union => union(subject_polys, clip_polys),
        BooleanOp::Intersection => intersection(subject_polys, clip_polys),
        BooleanOp::Difference => difference(subject_polys, clip_polys),
        BooleanOp::Xor => xor(subject_polys, clip_polys),
    };

    if solution.polygons().is_empty() {
        return Vec::new();
    }
    polygons_to_curves(&solution, accuracy, fit_arcs)
}

/// `CArea::UniteCurves`: merge a bag of (possibly overlapping) curves into one
/// normalized union, with no second operand.
pub fn unite_curves(curves: &[Curve], accuracy: f64, fit_arcs: bool) -> Vec<Curve> {
    let subject_polys = area_to_polygons(curves, accuracy, PathType::Subject, true);
    let solution = union(subject_polys, Polygons::new(Vec::new()));
    if solution.polygons().is_empty() {
        warn!("unite_curves collapsed to an empty result");
        return Vec::new();
    }
    polygons_to_curves(&solution, accuracy, fit_arcs)
}
