//! Host-facing construction and readback surface (§6): a small builder over
//! `Curve`/`Vertex` so callers unfamiliar with the internal tagged-vertex
//! representation can build one up point-by-point, plus the mirror image for
//! reading results back out.

use crate::geometry::curve::Curve;
use crate::geometry::point::Point;
use crate::geometry::vertex::{Vertex, VertexKind};

/// Incrementally builds one `Curve` via `begin_curve`/`add_line_vertex`/
/// `add_arc_vertex`/`end_curve`. A builder holds at most one in-progress curve;
/// starting a new one before ending the last discards it.
#[derive(Debug, Default)]
pub struct CurveBuilder {
    curve: Option<Curve>,
}

impl CurveBuilder {
    pub fn new() -> Self {
        CurveBuilder::default()
    }

    pub fn begin_curve(&mut self, x: f64, y: f64) {
        self.curve = Some(Curve::starting_at(Point::new(x, y)));
    }

    pub fn add_line_vertex(&mut self, x: f64, y: f64) {
        if let Some(c) = self.curve.as_mut() {
            c.push(Vertex::line(Point::new(x, y)));
        }
    }

    pub fn add_arc_vertex(&mut self, x: f64, y: f64, cx: f64, cy: f64, ccw: bool) {
        if let Some(c) = self.curve.as_mut() {
            let kind = if ccw { VertexKind::ArcCcw } else { VertexKind::ArcCw };
            c.push(Vertex::arc(kind, Point::new(x, y), Point::new(cx, cy)));
        }
    }

    /// Finish the in-progress curve, if any, handing ownership to the caller.
    pub fn end_curve(&mut self) -> Option<Curve> {
        self.curve.take()
    }
}

/// One vertex as exposed to host code: `kind` is `-1` for a clockwise arc, `0`
/// for a line, `+1` for a counter-clockwise arc (§6's readback contract).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexView {
    pub x: f64,
    pub y: f64,
    pub cx: f64,
    pub cy: f64,
    pub kind: i32,
}

fn kind_to_int(kind: VertexKind) -> i32 {
    match kind {
        VertexKind::ArcCw => -1,
        VertexKind::Line => 0,
        VertexKind::ArcCcw => 1,
    }
}

/// Iterate a curve's vertices in the host-facing readback shape, skipping the
/// leading placeholder vertex that only records the curve's start point.
pub fn vertex_views(curve: &Curve) -> impl Iterator<Item = VertexView> + '_ {
    curve.vertices.iter().skip(1).map(|v| VertexView {
        x: v.end.x,
        y: v.end.y,
        cx: v.center.x,
        cy: v.center.y,
        kind: kind_to_int(v.kind),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_round_trips_a_triangle() {
        let mut b = CurveBuilder::new();
        b.begin_curve(0.0, 0.0);
        b.add_line_vertex(10.0, 0.0);
        b.add_line_vertex(0.0, 10.0);
        b.add_line_vertex(0.0, 0.0);
        let curve = b.end_curve().expect("curve was started");
        assert!(curve.is_closed(1e-9));

        let views: Vec<VertexView> = vertex_views(&curve).collect();
        assert_eq!(views.len(), 3);
        assert!(views.iter().all(|v| v.kind == 0));
    }

    #[test]
    fn builder_arc_vertex_reports_signed_kind() {
        let mut b = CurveBuilder::new();
        b.begin_curve(1.0, 0.0);
        b.add_arc_vertex(0.0, 1.0, 0.0, 0.0, true);
        let curve = b.end_curve().unwrap();
        let views: Vec<VertexView> = vertex_views(&curve).collect();
        assert_eq!(views[0].kind, 1);
        assert_eq!(views[0].cx, 0.0);
    }

    #[test]
    fn ending_without_begin_yields_none() {
        let mut b = CurveBuilder::new();
        assert!(b.end_curve().is_none());
    }
}
