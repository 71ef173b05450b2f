use super::point::{Box2D, Point};
use super::vertex::{Vertex, VertexKind};

/// A single line-or-arc segment, derived from a vertex and the point preceding it.
///
/// Spans are never stored; they are constructed on demand from a `(previous point,
/// vertex)` pair wherever the curve needs to reason about one edge at a time.
#[derive(Debug, Clone, Copy)]
pub struct Span {
    pub start: Point,
    pub vertex: Vertex,
}

impl Span {
    pub fn new(start: Point, vertex: Vertex) -> Self {
        Span { start, vertex }
    }

    pub fn end(&self) -> Point {
        self.vertex.end
    }

    pub fn is_arc(&self) -> bool {
        self.vertex.kind.is_arc()
    }

    pub fn radius(&self) -> f64 {
        (self.start - self.vertex.center).norm()
    }

    /// Included angle, signed: positive for CW arcs, negative for CCW, zero for lines.
    pub fn included_angle(&self) -> f64 {
        if !self.is_arc() {
            return 0.0;
        }
        let d0 = self.start - self.vertex.center;
        let d1 = self.vertex.end - self.vertex.center;
        let mut ang1 = d0.y.atan2(d0.x);
        let mut ang2 = d1.y.atan2(d1.x);
        if ang1 < 0.0 {
            ang1 += 2.0 * std::f64::consts::PI;
        }
        if ang2 < 0.0 {
            ang2 += 2.0 * std::f64::consts::PI;
        }
        match self.vertex.kind {
            VertexKind::ArcCw => {
                if ang2 > ang1 {
                    2.0 * std::f64::consts::PI - ang2 + ang1
                } else {
                    ang1 - ang2
                }
            }
            VertexKind::ArcCcw => {
                if ang1 > ang2 {
                    -(2.0 * std::f64::consts::PI - ang1 + ang2)
                } else {
                    -(ang2 - ang1)
                }
            }
            VertexKind::Line => 0.0,
        }
    }

    pub fn length(&self) -> f64 {
        if self.is_arc() {
            self.radius() * self.included_angle().abs()
        } else {
            (self.vertex.end - self.start).norm()
        }
    }

    pub fn get_box(&self, box2d: &mut Box2D) {
        box2d.insert(self.start);
        box2d.insert(self.vertex.end);
        if self.is_arc() {
            // A tight arc bbox would also test the four axis extrema that fall within the
            // swept angle; the endpoints-only box is a safe (slightly loose) approximation
            // used throughout the original implementation's own GetBox.
            let r = self.radius();
            let c = self.vertex.center;
            box2d.insert(Point::new(c.x - r, c.y));
            box2d.insert(Point::new(c.x + r, c.y));
            box2d.insert(Point::new(c.x, c.y - r));
            box2d.insert(Point::new(c.x, c.y + r));
        }
    }

    /// Signed area contribution of this span to its curve's shoelace sum (doubled area,
    /// i.e. `x0*y1 - x1*y0`, plus the arc-sector correction for arcs).
    pub fn get_area(&self) -> f64 {
        let p0 = self.start;
        let p1 = self.vertex.end;
        let line_term = p0.x * p1.y - p1.x * p0.y;
        if !self.is_arc() {
            return line_term;
        }
        // The chord's line_term already accounts for the triangle (origin, p0, p1);
        // add the doubled circular-segment area between chord and arc, signed so that
        // a bulge in the curve's travel direction adds (CW positive, matching
        // `included_angle`'s sign convention).
        let r = self.radius();
        let theta = self.included_angle().abs();
        let sign = match self.vertex.kind {
            VertexKind::ArcCw => 1.0,
            VertexKind::ArcCcw => -1.0,
            VertexKind::Line => 0.0,
        };
        line_term + sign * r * r * (theta - theta.sin())
    }

    /// Point on the span at perimeter fraction `t` in `[0, 1]`.
    pub fn mid_param(&self, t: f64) -> Point {
        if !self.is_arc() {
            return self.start + (self.vertex.end - self.start) * t;
        }
        let c = self.vertex.center;
        let r = self.radius();
        let d0 = self.start - c;
        let a0 = d0.y.atan2(d0.x);
        let theta = self.included_angle().abs();
        let signed_sweep = match self.vertex.kind {
            VertexKind::ArcCw => -theta,
            _ => theta,
        };
        let a = a0 + signed_sweep * t;
        Point::new(c.x + r * a.cos(), c.y + r * a.sin())
    }

    pub fn mid_perim(&self, d: f64) -> Point {
        let len = self.length();
        if len < 1e-12 {
            return self.start;
        }
        self.mid_param(d / len)
    }

    /// `GetVector(fraction)`: unit tangent direction at perimeter fraction `fraction`.
    pub fn get_vector(&self, fraction: f64) -> Point {
        if !self.is_arc() {
            return (self.vertex.end - self.start).normalized();
        }
        let p = self.mid_param(fraction);
        let c = self.vertex.center;
        let radial = (p - c).normalized();
        let tangent = Point::new(-radial.y, radial.x);
        match self.vertex.kind {
            VertexKind::ArcCw => tangent * -1.0,
            _ => tangent,
        }
    }

    /// Tests whether `p` lies on this span (within `accuracy`); if so, returns the
    /// perimeter-fraction parameter `t` in `[0, 1]` via `t_out`.
    pub fn on(&self, p: Point, accuracy: f64, t_out: &mut f64) -> bool {
        if !self.is_arc() {
            let v = self.vertex.end - self.start;
            let len2 = v.dot(&v);
            if len2 < 1e-18 {
                let hit = p.approx_eq(&self.start, accuracy);
                if hit {
                    *t_out = 0.0;
                }
                return hit;
            }
            let t = (p - self.start).dot(&v) / len2;
            if !(-1e-6..=1.0 + 1e-6).contains(&t) {
                return false;
            }
            let proj = self.start + v * t.clamp(0.0, 1.0);
            if proj.dist(&p) < accuracy {
                *t_out = t.clamp(0.0, 1.0);
                true
            } else {
                false
            }
        } else {
            let c = self.vertex.center;
            let r = self.radius();
            if (p - c).norm().sub_abs(r) > accuracy {
                return false;
            }
            let d0 = self.start - c;
            let dp = p - c;
            let a0 = d0.y.atan2(d0.x);
            let ap = dp.y.atan2(dp.x);
            let signed_sweep = match self.vertex.kind {
                VertexKind::ArcCw => -self.included_angle().abs(),
                _ => self.included_angle().abs(),
            };
            if signed_sweep.abs() < 1e-12 {
                return false;
            }
            let mut delta = ap - a0;
            // normalize delta into the same winding direction as signed_sweep
            let two_pi = 2.0 * std::f64::consts::PI;
            if signed_sweep > 0.0 {
                while delta < 0.0 {
                    delta += two_pi;
                }
                while delta > two_pi {
                    delta -= two_pi;
                }
            } else {
                while delta > 0.0 {
                    delta -= two_pi;
                }
                while delta < -two_pi {
                    delta += two_pi;
                }
            }
            let t = delta / signed_sweep;
            if (-1e-6..=1.0 + 1e-6).contains(&t) {
                let expected = self.mid_param(t.clamp(0.0, 1.0));
                if expected.dist(&p) < accuracy.max(r * 1e-6) {
                    *t_out = t.clamp(0.0, 1.0);
                    return true;
                }
            }
            false
        }
    }

    /// Nearest point on this span to a query point (line: projection + clamp; arc:
    /// angular clamp onto the circle).
    pub fn nearest_point(&self, p: Point) -> Point {
        if !self.is_arc() {
            let v = self.vertex.end - self.start;
            let len2 = v.dot(&v);
            if len2 < 1e-18 {
                return self.start;
            }
            let t = ((p - self.start).dot(&v) / len2).clamp(0.0, 1.0);
            self.start + v * t
        } else {
            let dp = p - self.vertex.center;
            if dp.norm() < 1e-12 {
                return self.start;
            }
            // Project p onto the full circle, then check whether that angle falls
            // within the arc's swept range; if so it's the nearest point, otherwise
            // the nearest point is whichever endpoint is closer.
            let mut t_out = 0.0;
            if self.on(p, f64::INFINITY, &mut t_out) {
                return self.mid_param(t_out);
            }
            if self.start.dist(&p) < self.vertex.end.dist(&p) {
                self.start
            } else {
                self.vertex.end
            }
        }
    }

    /// All intersection points between this span and another.
    pub fn intersect(&self, other: &Span) -> Vec<Point> {
        match (self.is_arc(), other.is_arc()) {
            (false, false) => line_line_intersection(
                self.start,
                self.vertex.end,
                other.start,
                other.vertex.end,
            )
            .into_iter()
            .collect(),
            (false, true) => line_arc_intersection(self.start, self.vertex.end, other),
            (true, false) => line_arc_intersection(other.start, other.vertex.end, self),
            (true, true) => arc_arc_intersection(self, other),
        }
    }
}

trait FloatExt {
    fn sub_abs(self, other: f64) -> f64;
}
impl FloatExt for f64 {
    fn sub_abs(self, other: f64) -> f64 {
        (self - other).abs()
    }
}

fn line_line_intersection(p0: Point, p1: Point, q0: Point, q1: Point) -> Option<Point> {
    let d1 = p1 - p0;
    let d2 = q1 - q0;
    let denom = d1.cross(&d2);
    if denom.abs() < 1e-12 {
        return None;
    }
    let diff = q0 - p0;
    let t = diff.cross(&d2) / denom;
    let u = diff.cross(&d1) / denom;
    if (-1e-9..=1.0 + 1e-9).contains(&t) && (-1e-9..=1.0 + 1e-9).contains(&u) {
        Some(p0 + d1 * t)
    } else {
        None
    }
}

fn line_arc_intersection(p0: Point, p1: Point, arc: &Span) -> Vec<Point> {
    let c = arc.vertex.center;
    let r = arc.radius();
    let d = p1 - p0;
    let f = p0 - c;
    let a = d.dot(&d);
    if a < 1e-18 {
        return Vec::new();
    }
    let b = 2.0 * f.dot(&d);
    let cc = f.dot(&f) - r * r;
    let disc = b * b - 4.0 * a * cc;
    if disc < 0.0 {
        return Vec::new();
    }
    let sqrt_disc = disc.sqrt();
    let mut out = Vec::new();
    for t in [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)] {
        if (-1e-9..=1.0 + 1e-9).contains(&t) {
            let candidate = p0 + d * t;
            let mut t_arc = 0.0;
            if arc.on(candidate, 1e-6.max(r * 1e-9), &mut t_arc) {
                out.push(candidate);
            }
        }
    }
    out
}

fn arc_arc_intersection(a: &Span, b: &Span) -> Vec<Point> {
    let c0 = a.vertex.center;
    let c1 = b.vertex.center;
    let r0 = a.radius();
    let r1 = b.radius();
    let d = c1.dist(&c0);
    if d < 1e-12 || d > r0 + r1 + 1e-9 || d < (r0 - r1).abs() - 1e-9 {
        return Vec::new();
    }
    let a_dist = (r0 * r0 - r1 * r1 + d * d) / (2.0 * d);
    let h_sq = r0 * r0 - a_dist * a_dist;
    let h = if h_sq < 0.0 { 0.0 } else { h_sq.sqrt() };
    let dir = (c1 - c0) * (1.0 / d);
    let mid = c0 + dir * a_dist;
    let perp = Point::new(-dir.y, dir.x);
    let candidates = [mid + perp * h, mid - perp * h];
    let mut out = Vec::new();
    for cand in candidates {
        let mut ta = 0.0;
        let mut tb = 0.0;
        if a.on(cand, 1e-6.max(r0 * 1e-9), &mut ta) && b.on(cand, 1e-6.max(r1 * 1e-9), &mut tb) {
            out.push(cand);
        }
    }
    out.dedup_by(|x, y| x.dist(y) < 1e-9);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_span_length_and_midpoint() {
        let span = Span::new(Point::new(0.0, 0.0), Vertex::line(Point::new(10.0, 0.0)));
        assert!((span.length() - 10.0).abs() < 1e-9);
        assert!(span.mid_param(0.5).approx_eq(&Point::new(5.0, 0.0), 1e-9));
    }

    #[test]
    fn arc_span_quarter_circle_length() {
        // CCW quarter circle radius 2 from (2,0) to (0,2), center origin.
        let span = Span::new(
            Point::new(2.0, 0.0),
            Vertex::arc(VertexKind::ArcCcw, Point::new(0.0, 2.0), Point::ZERO),
        );
        let expected = 2.0 * std::f64::consts::FRAC_PI_2;
        assert!((span.length() - expected).abs() < 1e-6);
    }

    #[test]
    fn on_detects_midpoint_of_line_span() {
        let span = Span::new(Point::new(0.0, 0.0), Vertex::line(Point::new(4.0, 0.0)));
        let mut t = 0.0;
        assert!(span.on(Point::new(2.0, 0.0), 1e-6, &mut t));
        assert!((t - 0.5).abs() < 1e-6);
    }
}
