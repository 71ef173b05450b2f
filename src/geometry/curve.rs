use super::point::{Box2D, Point};
use super::span::Span;
use super::vertex::{Vertex, VertexKind};
use serde::{Deserialize, Serialize};

/// An ordered sequence of vertices describing a polyline-with-arcs.
///
/// `vertices[0]` is always `kind = Line` with `end` equal to the curve's start point;
/// each subsequent vertex describes the span arriving at `end` from the previous
/// vertex's `end`. A curve is closed when its first and last endpoints coincide.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Curve {
    pub vertices: Vec<Vertex>,
}

impl Curve {
    pub fn new() -> Self {
        Curve {
            vertices: Vec::new(),
        }
    }

    /// Begin a new curve at `p` (the original's `append(CVertex(p))` as the first vertex).
    pub fn starting_at(p: Point) -> Self {
        Curve {
            vertices: vec![Vertex::line(p)],
        }
    }

    pub fn push(&mut self, vertex: Vertex) {
        self.vertices.push(vertex);
    }

    pub fn start(&self) -> Option<Point> {
        self.vertices.first().map(|v| v.end)
    }

    pub fn end(&self) -> Option<Point> {
        self.vertices.last().map(|v| v.end)
    }

    pub fn is_closed(&self, accuracy: f64) -> bool {
        match (self.start(), self.end()) {
            (Some(s), Some(e)) => self.vertices.len() > 1 && s.approx_eq(&e, accuracy),
            _ => false,
        }
    }

    /// Spans enumerate the curve one segment at a time: `spans[i]` runs from
    /// `vertices[i].end` to `vertices[i+1]`.
    pub fn get_spans(&self) -> Vec<Span> {
        if self.vertices.len() < 2 {
            return Vec::new();
        }
        self.vertices
            .windows(2)
            .map(|w| Span::new(w[0].end, w[1]))
            .collect()
    }

    pub fn get_box(&self, box2d: &mut Box2D) {
        if let Some(p) = self.start() {
            box2d.insert(p);
        }
        for span in self.get_spans() {
            span.get_box(box2d);
        }
    }

    /// Doubled signed area (shoelace + arc-sector corrections), halved to the
    /// conventional polygon area. Positive means clockwise, per the data model.
    pub fn signed_area(&self) -> f64 {
        self.get_spans().iter().map(|s| s.get_area()).sum::<f64>() * 0.5
    }

    pub fn is_clockwise(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Reverse the curve's direction in place: point order reverses and every arc
    /// flips CW<->CCW (`REVERSE_ARC_TYPE` in the original).
    pub fn reverse(&mut self) {
        let spans = self.get_spans();
        if spans.is_empty() {
            return;
        }
        let mut new_vertices = Vec::with_capacity(self.vertices.len());
        new_vertices.push(Vertex::line(spans.last().unwrap().end()));
        for span in spans.iter().rev() {
            new_vertices.push(Vertex {
                kind: span.vertex.kind.reversed_arc(),
                end: span.start,
                center: span.vertex.center,
                user_tag: span.vertex.user_tag,
            });
        }
        self.vertices = new_vertices;
    }

    pub fn reversed(&self) -> Curve {
        let mut c = self.clone();
        c.reverse();
        c
    }

    pub fn perim(&self) -> f64 {
        self.get_spans().iter().map(|s| s.length()).sum()
    }

    pub fn perim_to_point(&self, perim: f64) -> Point {
        let spans = self.get_spans();
        if spans.is_empty() {
            return self.start().unwrap_or(Point::ZERO);
        }
        let mut remaining = perim;
        if remaining <= 0.0 {
            return spans[0].start;
        }
        let last_idx = spans.len() - 1;
        for (i, span) in spans.iter().enumerate() {
            let len = span.length();
            if remaining <= len || i == last_idx {
                if len < 1e-12 {
                    return span.end();
                }
                return span.mid_perim(remaining.min(len));
            }
            remaining -= len;
        }
        spans.last().unwrap().end()
    }

    pub fn point_to_perim(&self, p: Point, accuracy: f64) -> f64 {
        let spans = self.get_spans();
        let mut acc = 0.0;
        let mut best_perim = 0.0;
        let mut best_dist = f64::INFINITY;
        for span in &spans {
            let np = span.nearest_point(p);
            let d = np.dist(&p);
            if d < best_dist {
                best_dist = d;
                let mut t = 0.0;
                if span.on(p, accuracy.max(d + 1e-9), &mut t) {
                    best_perim = acc + t * span.length();
                } else {
                    best_perim = acc;
                }
            }
            acc += span.length();
        }
        best_perim
    }

    pub fn nearest_point(&self, p: Point) -> Point {
        let mut best: Option<Point> = None;
        let mut best_dist = f64::INFINITY;
        for span in self.get_spans() {
            let np = span.nearest_point(p);
            let d = np.dist(&p);
            if d < best_dist {
                best_dist = d;
                best = Some(np);
            }
        }
        best.unwrap_or_else(|| self.start().unwrap_or(Point::ZERO))
    }

    /// Nearest point on this curve to the nearest point on `other`, used by the
    /// spiral generator to find hand-off points between rings. Returns the point
    /// on `self`; if `dist_out` is given it receives the corresponding distance.
    pub fn nearest_point_to_curve(&self, other: &Curve, dist_out: Option<&mut f64>) -> Point {
        let mut best_point = self.start().unwrap_or(Point::ZERO);
        let mut best_dist = f64::INFINITY;
        let other_spans = other.get_spans();
        for span in self.get_spans() {
            for candidate in [span.start, span.end()] {
                for other_span in &other_spans {
                    let np = other_span.nearest_point(candidate);
                    let d = np.dist(&candidate);
                    if d < best_dist {
                        best_dist = d;
                        best_point = candidate;
                    }
                }
            }
        }
        if let Some(out) = dist_out {
            *out = best_dist;
        }
        best_point
    }

    /// Rotate a *closed* curve so that it begins at `p`, splitting the span that
    /// contains `p` if `p` is not already a vertex (`CCurve::ChangeStart`).
    pub fn change_start(&mut self, p: Point, accuracy: f64) {
        let n = self.vertices.len();
        if n < 2 {
            return;
        }
        for idx in 1..n {
            if self.vertices[idx].end.approx_eq(&p, accuracy) {
                self.rotate_to_vertex(idx);
                return;
            }
        }
        let spans = self.get_spans();
        for (k, span) in spans.iter().enumerate() {
            let mut t = 0.0;
            if span.on(p, accuracy, &mut t) && t > 1e-9 && t < 1.0 - 1e-9 {
                self.split_span_at(k, p);
                self.rotate_to_vertex(k + 1);
                return;
            }
        }
    }

    fn rotate_to_vertex(&mut self, idx: usize) {
        let n = self.vertices.len();
        let mut new_vertices = Vec::with_capacity(n);
        new_vertices.push(Vertex::line(self.vertices[idx].end));
        new_vertices.extend_from_slice(&self.vertices[(idx + 1)..n]);
        new_vertices.extend_from_slice(&self.vertices[1..=idx]);
        self.vertices = new_vertices;
    }

    fn split_span_at(&mut self, span_idx: usize, p: Point) {
        let orig = self.vertices[span_idx + 1];
        let first_half = Vertex {
            kind: orig.kind,
            end: p,
            center: orig.center,
            user_tag: orig.user_tag,
        };
        self.vertices
            .splice(span_idx + 1..span_idx + 2, [first_half, orig]);
    }

    /// Truncate an open curve so it ends at `p` (`CCurve::ChangeEnd`).
    pub fn change_end(&mut self, p: Point, accuracy: f64) {
        let spans = self.get_spans();
        for (k, span) in spans.iter().enumerate() {
            let mut t = 0.0;
            if span.on(p, accuracy, &mut t) {
                let orig = self.vertices[k + 1];
                let truncated = Vertex {
                    kind: orig.kind,
                    end: p,
                    center: orig.center,
                    user_tag: orig.user_tag,
                };
                self.vertices.truncate(k + 1);
                self.vertices.push(truncated);
                return;
            }
        }
    }

    /// Insert `p` as a vertex on whichever span contains it, without otherwise
    /// disturbing the curve's order (`CCurve::Break`).
    pub fn break_at(&mut self, p: Point, accuracy: f64) {
        let spans = self.get_spans();
        for (k, span) in spans.iter().enumerate() {
            let mut t = 0.0;
            if span.on(p, accuracy, &mut t) && t > 1e-9 && t < 1.0 - 1e-9 {
                self.split_span_at(k, p);
                return;
            }
        }
    }

    /// Split this closed curve into open sub-curves between consecutive points of
    /// `ordered_points` (which must already lie in travel order along the curve).
    pub fn extract_separate_curves(&self, ordered_points: &[Point], accuracy: f64) -> Vec<Curve> {
        if ordered_points.len() < 2 {
            return Vec::new();
        }
        let mut working = self.clone();
        for p in ordered_points {
            working.break_at(*p, accuracy);
        }
        let n = working.vertices.len();
        let mut indices = Vec::new();
        for p in ordered_points {
            if let Some(idx) = working
                .vertices
                .iter()
                .position(|v| v.end.approx_eq(p, accuracy))
            {
                indices.push(idx);
            }
        }
        if indices.len() < 2 {
            return Vec::new();
        }
        let mut curves = Vec::new();
        for w in 0..indices.len() {
            let start_idx = indices[w];
            let end_idx = indices[(w + 1) % indices.len()];
            let mut verts = vec![Vertex::line(working.vertices[start_idx].end)];
            let mut i = start_idx;
            loop {
                i = (i + 1) % n;
                if i == 0 {
                    i = 1;
                }
                verts.push(working.vertices[i]);
                if i == end_idx {
                    break;
                }
            }
            curves.push(Curve { vertices: verts });
        }
        curves
    }

    pub fn remove_tiny_spans(&mut self, accuracy: f64) {
        if self.vertices.len() < 2 {
            return;
        }
        let mut kept = vec![self.vertices[0]];
        for v in &self.vertices[1..] {
            let prev_end = kept.last().unwrap().end;
            if prev_end.approx_eq(&v.end, accuracy) && v.kind == VertexKind::Line {
                continue;
            }
            kept.push(*v);
        }
        if kept.len() < 2 {
            kept.truncate(1);
        }
        self.vertices = kept;
    }

    /// Replace every arc span with its chord-flattened polyline equivalent
    /// (`UnFitArcs` / the clipping adapter's arc-discretization pass, §4.1).
    pub fn unfit_arcs(&mut self, accuracy: f64) {
        if self.vertices.is_empty() {
            return;
        }
        let mut new_vertices = vec![self.vertices[0]];
        for span in self.get_spans() {
            for p in flatten_arc_points(&span, accuracy) {
                new_vertices.push(Vertex::line(p));
            }
        }
        self.vertices = new_vertices;
    }

    /// Re-detect arcs from runs of near-collinear-on-circle line vertices.
    ///
    /// A best-effort post-process (§9's "Re-fit arcs"): greedily grows a run of
    /// consecutive line vertices while they remain within `accuracy` of a common
    /// circle fit from the run's first three points, then replaces the run with a
    /// single arc vertex.
    pub fn fit_arcs(&mut self, accuracy: f64) {
        if self.vertices.len() < 4 {
            return;
        }
        let mut out = vec![self.vertices[0]];
        let mut i = 1usize;
        let n = self.vertices.len();
        while i < n {
            if self.vertices[i].kind != VertexKind::Line {
                out.push(self.vertices[i]);
                i += 1;
                continue;
            }
            let p_prev = out.last().unwrap().end;
            let mut run_end = i;
            let mut fit: Option<(Point, VertexKind)> = None;
            let mut j = i + 1;
            while j < n && self.vertices[j].kind == VertexKind::Line {
                if let Some((center, r, kind)) =
                    circumcircle(p_prev, self.vertices[i].end, self.vertices[j].end)
                {
                    if circle_fits(&self.vertices[i..=j], center, r, accuracy) {
                        fit = Some((center, kind));
                        run_end = j;
                        j += 1;
                        continue;
                    }
                }
                break;
            }
            if run_end > i {
                let (center, kind) = fit.unwrap();
                out.push(Vertex::arc(kind, self.vertices[run_end].end, center));
                i = run_end + 1;
            } else {
                out.push(self.vertices[i]);
                i += 1;
            }
        }
        self.vertices = out;
    }

    pub fn span_intersections(&self, span: &Span, accuracy: f64) -> Vec<Point> {
        let mut pts = Vec::new();
        for s in self.get_spans() {
            for p in s.intersect(span) {
                if !pts.iter().any(|q: &Point| q.approx_eq(&p, accuracy)) {
                    pts.push(p);
                }
            }
        }
        pts
    }

    pub fn curve_intersections(&self, other: &Curve, accuracy: f64) -> Vec<Point> {
        let mut pts = Vec::new();
        for span in other.get_spans() {
            for p in self.span_intersections(&span, accuracy) {
                if pts
                    .last()
                    .map(|q: &Point| !q.approx_eq(&p, 1e-12))
                    .unwrap_or(true)
                {
                    pts.push(p);
                }
            }
        }
        pts
    }
}

/// Discretize one arc span into chord points at a maximum sagitta of `accuracy`
/// (§4.1). Returns the emitted points only (never the span's start). A line span
/// returns its single endpoint; a degenerate arc (`end == start`) returns nothing.
pub fn flatten_arc_points(span: &Span, accuracy: f64) -> Vec<Point> {
    if !span.is_arc() {
        return vec![span.end()];
    }
    if span.start.approx_eq(&span.end(), 1e-12) {
        return Vec::new();
    }
    let radius = span.radius();
    if radius < 1e-12 {
        return vec![span.end()];
    }
    let phi_total = span.included_angle(); // signed: CW positive, CCW negative
    let clamp_ratio = ((radius - accuracy).max(1e-9) / radius).min(1.0);
    let dphi = 2.0 * clamp_ratio.acos();
    let segments: i64 = if dphi < 1e-9 {
        100
    } else {
        (phi_total.abs() / dphi).ceil() as i64
    }
    .clamp(1, 100);

    let dphi_signed = phi_total / segments as f64;
    let c = span.vertex.center;
    let mut px = span.start.x;
    let mut py = span.start.y;
    let mut out = Vec::with_capacity(segments as usize);
    for i in 0..segments {
        let dx = px - c.x;
        let dy = py - c.y;
        let phi = dy.atan2(dx);
        // CW arcs have positive included_angle and sweep clockwise (decreasing math angle);
        // CCW arcs have negative included_angle and sweep counter-clockwise.
        let next_phi = phi - dphi_signed;
        let nx = c.x + radius * next_phi.cos();
        let ny = c.y + radius * next_phi.sin();
        if i == segments - 1 {
            out.push(span.end());
        } else {
            out.push(Point::new(nx, ny));
        }
        px = nx;
        py = ny;
    }
    out
}

fn circumcircle(p0: Point, p1: Point, p2: Point) -> Option<(Point, f64, VertexKind)> {
    let ax = p0.x;
    let ay = p0.y;
    let bx = p1.x;
    let by = p1.y;
    let cx = p2.x;
    let cy = p2.y;
    let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    if d.abs() < 1e-9 {
        return None;
    }
    let ux = ((ax * ax + ay * ay) * (by - cy)
        + (bx * bx + by * by) * (cy - ay)
        + (cx * cx + cy * cy) * (ay - by))
        / d;
    let uy = ((ax * ax + ay * ay) * (cx - bx)
        + (bx * bx + by * by) * (ax - cx)
        + (cx * cx + cy * cy) * (bx - ax))
        / d;
    let center = Point::new(ux, uy);
    let r = center.dist(&p0);
    // winding of p0->p1->p2 around center determines arc direction
    let cross = (p1 - p0).cross(&(p2 - p1));
    let kind = if cross < 0.0 {
        VertexKind::ArcCw
    } else {
        VertexKind::ArcCcw
    };
    Some((center, r, kind))
}

fn circle_fits(run: &[Vertex], center: Point, r: f64, accuracy: f64) -> bool {
    run.iter().all(|v| (v.end.dist(&center) - r).abs() <= accuracy)
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
    fn square_area_and_closedness() {
        let c = square(10.0);
        assert!(c.is_closed(1e-9));
        assert!((c.signed_area().abs() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn reverse_flips_area_sign_same_magnitude() {
        let c = square(10.0);
        let area_before = c.signed_area();
        let mut r = c.clone();
        r.reverse();
        assert!((r.signed_area() + area_before).abs() < 1e-9);
        assert!(r.is_closed(1e-9));
    }

    #[test]
    fn change_start_rotates_closed_curve() {
        let mut c = square(10.0);
        c.change_start(Point::new(10.0, 0.0), 1e-6);
        assert!(c.start().unwrap().approx_eq(&Point::new(10.0, 0.0), 1e-6));
        assert!(c.is_closed(1e-6));
        assert!((c.signed_area().abs() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn change_start_splits_mid_span() {
        let mut c = square(10.0);
        c.change_start(Point::new(5.0, 0.0), 1e-6);
        assert!(c.start().unwrap().approx_eq(&Point::new(5.0, 0.0), 1e-6));
        assert!(c.is_closed(1e-6));
        assert!((c.signed_area().abs() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn perim_of_square_is_side_times_four() {
        let c = square(10.0);
        assert!((c.perim() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn flatten_quarter_circle_respects_segment_bounds() {
        let span = Span::new(
            Point::new(2.0, 0.0),
            Vertex::arc(VertexKind::ArcCcw, Point::new(0.0, 2.0), Point::ZERO),
        );
        let pts = flatten_arc_points(&span, 0.01);
        assert!(!pts.is_empty());
        assert!(pts.len() <= 100);
        let last = *pts.last().unwrap();
        assert!(last.approx_eq(&Point::new(0.0, 2.0), 1e-6));
    }
}
