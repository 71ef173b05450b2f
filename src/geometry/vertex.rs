use super::point::Point;
use serde::{Deserialize, Serialize};

/// Tag discriminating a straight span from an arc span, and the arc's winding direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexKind {
    Line,
    ArcCcw,
    ArcCw,
}

impl VertexKind {
    /// A CCW arc traversed the other way becomes CW, and vice versa; lines are unaffected.
    pub fn reversed_arc(self) -> VertexKind {
        match self {
            VertexKind::Line => VertexKind::Line,
            VertexKind::ArcCcw => VertexKind::ArcCw,
            VertexKind::ArcCw => VertexKind::ArcCcw,
        }
    }

    pub fn is_arc(self) -> bool {
        !matches!(self, VertexKind::Line)
    }
}

/// One vertex of a `Curve`: describes the span arriving at `end` from whatever point
/// preceded it in the curve's vertex list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub kind: VertexKind,
    pub end: Point,
    /// Arc center, absolute coordinates. Unused (zero) when `kind == Line`.
    pub center: Point,
    pub user_tag: i32,
}

impl Vertex {
    pub fn line(end: Point) -> Self {
        Vertex {
            kind: VertexKind::Line,
            end,
            center: Point::ZERO,
            user_tag: 0,
        }
    }

    pub fn line_tagged(end: Point, user_tag: i32) -> Self {
        Vertex {
            kind: VertexKind::Line,
            end,
            center: Point::ZERO,
            user_tag,
        }
    }

    pub fn arc(kind: VertexKind, end: Point, center: Point) -> Self {
        debug_assert!(kind.is_arc());
        Vertex {
            kind,
            end,
            center,
            user_tag: 0,
        }
    }

    pub fn reversed(&self, new_end: Point) -> Vertex {
        Vertex {
            kind: self.kind.reversed_arc(),
            end: new_end,
            center: self.center,
            user_tag: self.user_tag,
        }
    }
}

/// Given two points and the tangent direction at `p0`, construct the center and winding
/// direction of the circular arc through both points that is tangent to `v0` at `p0`.
///
/// Ported from the original implementation's drag-knife-adjacent `tangential_arc` helper;
/// kept here as a general Curve/Span utility since nothing in scope excludes it.
pub fn tangential_arc(p0: Point, p1: Point, v0: Point) -> Option<(Point, VertexKind)> {
    let chord = p1 - p0;
    let chord_len_sq = chord.dot(&chord);
    if chord_len_sq < 1e-18 {
        return None;
    }

    // The center lies on the line through p0 perpendicular to v0. Parametrize
    // center = p0 + t * perp(v0), solve for t so that |center - p1| == |center - p0|.
    let v0n = v0.normalized();
    let perp = Point::new(-v0n.y, v0n.x);
    if perp.norm() < 1e-12 {
        return None;
    }

    // |p0 + t*perp - p1|^2 == |t*perp|^2
    // => -2*t*perp.(p1-p0) + |p1-p0|^2 == 0
    let denom = 2.0 * perp.dot(&chord);
    if denom.abs() < 1e-12 {
        return None;
    }
    let t = chord_len_sq / denom;
    let center = p0 + perp * t;

    // direction: CCW if the cross product of tangent and chord is positive.
    let dir = if v0n.cross(&chord) >= 0.0 {
        VertexKind::ArcCcw
    } else {
        VertexKind::ArcCw
    };

    Some((center, dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_arc_flips_ccw_cw() {
        assert_eq!(VertexKind::ArcCcw.reversed_arc(), VertexKind::ArcCw);
        assert_eq!(VertexKind::ArcCw.reversed_arc(), VertexKind::ArcCcw);
        assert_eq!(VertexKind::Line.reversed_arc(), VertexKind::Line);
    }

    #[test]
    fn tangential_arc_through_quarter_circle() {
        // p0=(1,0), tangent straight up (0,1) => center at origin, p1=(0,1), CCW quarter.
        let p0 = Point::new(1.0, 0.0);
        let p1 = Point::new(0.0, 1.0);
        let v0 = Point::new(0.0, 1.0);
        let (center, dir) = tangential_arc(p0, p1, v0).unwrap();
        assert!(center.dist(&Point::ZERO) < 1e-9);
        assert_eq!(dir, VertexKind::ArcCcw);
    }
}
