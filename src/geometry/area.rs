//! `Area` (§3): an ordered list of curves plus an `accuracy` scalar, the region-level
//! type the Boolean operators, `Offset`/`Thicken`, `Reorder` and `Split` all work on.
//! The reordering/nesting algorithm of §4.4 (the "InnerCurves" tree) lives here too,
//! since it is Area-internal machinery with no callers outside `reorder`/`split`.

use super::clip::{boolean_op, BooleanOp};
use super::curve::Curve;
use super::offset::{offset_curves, thicken_curves};
use super::point::{Box2D, Point};
use crate::errors::{AreaError, AreaResult};
use tracing::{debug_span, warn};

#[derive(Debug, Clone, Default)]
pub struct Area {
    pub curves: Vec<Curve>,
    pub accuracy: f64,
}

impl Area {
    pub fn new(accuracy: f64) -> Self {
        Area {
            curves: Vec::new(),
            accuracy,
        }
    }

    pub fn from_curves(curves: Vec<Curve>, accuracy: f64) -> Self {
        Area { curves, accuracy }
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn append(&mut self, curve: Curve) {
        self.curves.push(curve);
    }

    pub fn get_box(&self) -> Box2D {
        let mut b = Box2D::empty();
        for c in &self.curves {
            c.get_box(&mut b);
        }
        b
    }

    pub fn nearest_point(&self, p: Point) -> Point {
        let mut best = p;
        let mut best_dist = f64::INFINITY;
        for c in &self.curves {
            let np = c.nearest_point(p);
            let d = np.dist(&p);
            if d < best_dist {
                best_dist = d;
                best = np;
            }
        }
        best
    }

    pub fn get_area(&self) -> f64 {
        self.curves.iter().map(|c| c.signed_area()).sum()
    }

    pub fn span_intersections(&self, span: &super::span::Span) -> Vec<Point> {
        let mut pts = Vec::new();
        for c in &self.curves {
            for p in c.span_intersections(span, self.accuracy) {
                if !pts.iter().any(|q: &Point| q.approx_eq(&p, self.accuracy)) {
                    pts.push(p);
                }
            }
        }
        pts
    }

    pub fn curve_intersections(&self, other: &Curve) -> Vec<Point> {
        let mut pts = Vec::new();
        for c in &self.curves {
            for p in c.curve_intersections(other, self.accuracy) {
                if !pts.iter().any(|q: &Point| q.approx_eq(&p, self.accuracy)) {
                    pts.push(p);
                }
            }
        }
        pts
    }

    /// Curves of this Area whose midpoint lies inside the given closed `curve`
    /// (`CArea::InsideCurves`, used by overlap classification).
    pub fn inside_curves(&self, curve: &Curve) -> Vec<Curve> {
        self.curves
            .iter()
            .filter(|c| {
                c.start()
                    .map(|p| is_inside_curve(curve, p, self.accuracy))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    fn validate_closed(&self) -> AreaResult<()> {
        for (i, c) in self.curves.iter().enumerate() {
            if !c.is_closed(self.accuracy) {
                return Err(AreaError::invalid_geometry(format!(
                    "curve {} is not closed",
                    i
                )));
            }
        }
        Ok(())
    }

    fn boolean(&self, other: &Area, op: BooleanOp) -> AreaResult<Area> {
        self.validate_closed()?;
        other.validate_closed()?;
        let _span = debug_span!("area_boolean", ?op).entered();
        let result = boolean_op(op, &self.curves, &other.curves, self.accuracy, false);
        Ok(Area::from_curves(result, self.accuracy))
    }

    pub fn union(&mut self, other: &Area) -> AreaResult<()> {
        *self = self.boolean(other, BooleanOp::Union)?;
        Ok(())
    }

    pub fn intersection(&mut self, other: &Area) -> AreaResult<()> {
        *self = self.boolean(other, BooleanOp::Intersection)?;
        Ok(())
    }

    pub fn difference(&mut self, other: &Area) -> AreaResult<()> {
        *self = self.boolean(other, BooleanOp::Difference)?;
        Ok(())
    }

    pub fn symmetric_difference(&mut self, other: &Area) -> AreaResult<()> {
        *self = self.boolean(other, BooleanOp::Xor)?;
        Ok(())
    }

    /// Non-mutating variants, convenient for the overlap test and the orderer,
    /// which need to try an operation without committing to its result.
    pub fn unioned(&self, other: &Area) -> AreaResult<Area> {
        self.boolean(other, BooleanOp::Union)
    }
    pub fn intersected(&self, other: &Area) -> AreaResult<Area> {
        self.boolean(other, BooleanOp::Intersection)
    }
    pub fn subtracted(&self, other: &Area) -> AreaResult<Area> {
        self.boolean(other, BooleanOp::Difference)
    }

    /// `CArea::Offset` (§4.2): positive `value` erodes inward, negative dilates
    /// outward. Mutates in place, followed by `Reorder`.
    pub fn offset(&mut self, value: f64) -> AreaResult<()> {
        self.validate_closed()?;
        let _span = debug_span!("area_offset", value).entered();
        self.curves = offset_curves(&self.curves, self.accuracy, value, false);
        self.reorder()
    }

    /// `CArea::Thicken` (§4.2): Minkowski sum with a disk of `radius`. Mutates in
    /// place, followed by `Reorder`.
    pub fn thicken(&mut self, radius: f64) -> AreaResult<()> {
        let _span = debug_span!("area_thicken", radius).entered();
        self.curves = thicken_curves(&self.curves, self.accuracy, radius, false);
        self.reorder()
    }

    pub fn fit_arcs(&mut self) {
        for c in self.curves.iter_mut() {
            c.fit_arcs(self.accuracy);
        }
    }

    /// `CArea::Reorder` (§4.4): rebuild the curve list so outers are CCW and
    /// innermost first, islands CW, crossing siblings merged by union.
    pub fn reorder(&mut self) -> AreaResult<()> {
        let _span = debug_span!("area_reorder", curves = self.curves.len()).entered();
        let curves: Vec<Curve> = self
            .curves
            .drain(..)
            .filter(|c| c.is_closed(self.accuracy) && c.get_spans().len() >= 2)
            .collect();

        let mut tree = InnerCurvesNode::root();
        for c in curves {
            tree.insert(c, self.accuracy)?;
        }
        self.curves = tree.flatten(0, self.accuracy);
        Ok(())
    }

    /// `CArea::Split` (§4.4/§6): partition a `Reorder`ed Area into one Area per
    /// outer boundary with its islands attached.
    pub fn split(&self) -> AreaResult<Vec<Area>> {
        let mut ordered = self.clone();
        ordered.reorder()?;

        let mut outers: Vec<(Curve, Vec<Curve>)> = Vec::new();
        for c in ordered.curves {
            if c.is_clockwise() {
                // island: attach to whichever outer currently contains it
                if let Some((outer, islands)) = outers
                    .iter_mut()
                    .rev()
                    .find(|(outer, _)| is_inside_curve(outer, c.start().unwrap_or(Point::ZERO), self.accuracy))
                {
                    let _ = outer;
                    islands.push(c);
                } else {
                    warn!("island with no enclosing outer during split; dropping");
                }
            } else {
                outers.push((c, Vec::new()));
            }
        }

        Ok(outers
            .into_iter()
            .map(|(outer, islands)| {
                let mut curves = vec![outer];
                curves.extend(islands);
                Area::from_curves(curves, self.accuracy)
            })
            .collect())
    }
}

/// Point-in-region test (`CArea::IsInside` at curve granularity, via even-odd ray
/// casting over the flattened polygon boundary).
pub fn is_inside_curve(curve: &Curve, p: Point, accuracy: f64) -> bool {
    let mut pts = Vec::new();
    if let Some(start) = curve.start() {
        pts.push(start);
    }
    for span in curve.get_spans() {
        for q in super::curve::flatten_arc_points(&span, accuracy) {
            pts.push(q);
        }
    }
    if pts.len() < 3 {
        return false;
    }
    let n = pts.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = pts[i];
        let pj = pts[j];
        if ((pi.y > p.y) != (pj.y > p.y))
            && (p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

pub fn is_inside_area(area: &Area, p: Point) -> bool {
    if area.curves.is_empty() {
        return false;
    }
    let mut winding = 0i32;
    for c in &area.curves {
        if is_inside_curve(c, p, area.accuracy) {
            winding += if c.is_clockwise() { 1 } else { -1 };
        }
    }
    winding != 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapType {
    Inside,
    Outside,
    Siblings,
    Crossing,
}

/// The four-way overlap classification of §4.4, at curve granularity: build
/// single-curve Areas from `c1`/`c2` and probe with Boolean difference/intersection.
pub fn get_overlap_type(c1: &Curve, c2: &Curve, accuracy: f64) -> AreaResult<OverlapType> {
    let a1 = Area::from_curves(vec![c1.clone()], accuracy);
    let a2 = Area::from_curves(vec![c2.clone()], accuracy);

    let a1_minus_a2 = a1.subtracted(&a2)?;
    if a1_minus_a2.is_empty() {
        return Ok(OverlapType::Inside);
    }
    let a2_minus_a1 = a2.subtracted(&a1)?;
    if a2_minus_a1.is_empty() {
        return Ok(OverlapType::Outside);
    }
    let a1_and_a2 = a1.intersected(&a2)?;
    if a1_and_a2.is_empty() {
        return Ok(OverlapType::Siblings);
    }
    Ok(OverlapType::Crossing)
}

/// One node of the `Reorder` tree (`CInnerCurves`, §4.4/§9). The (virtual) root
/// holds no curve of its own; its children are the Area's outers.
#[derive(Debug, Clone)]
struct InnerCurvesNode {
    curve: Option<Curve>,
    children: Vec<Box<InnerCurvesNode>>,
}

impl InnerCurvesNode {
    fn root() -> Self {
        InnerCurvesNode {
            curve: None,
            children: Vec::new(),
        }
    }

    fn leaf(curve: Curve) -> Self {
        InnerCurvesNode {
            curve: Some(curve),
            children: Vec::new(),
        }
    }

    /// Insert one curve into this subtree, dispatching on the overlap test
    /// against each existing child (§4.4's Inside/Outside/Siblings/Crossing).
    fn insert(&mut self, candidate: Curve, accuracy: f64) -> AreaResult<()> {
        let mut i = 0;
        while i < self.children.len() {
            let child_curve = self.children[i].curve.clone();
            let overlap = match &child_curve {
                Some(cc) => get_overlap_type(&candidate, cc, accuracy)?,
                None => OverlapType::Siblings,
            };
            match overlap {
                OverlapType::Inside => {
                    return self.children[i].insert(candidate, accuracy);
                }
                OverlapType::Outside => {
                    let mut detached = self.children.remove(i);
                    let mut new_node = InnerCurvesNode::leaf(candidate);
                    new_node.children.push(detached_into_box(&mut detached));
                    self.children.push(Box::new(new_node));
                    return Ok(());
                }
                OverlapType::Siblings => {
                    i += 1;
                    continue;
                }
                OverlapType::Crossing => {
                    let child_curve = child_curve.unwrap();
                    let a1 = Area::from_curves(vec![candidate.clone()], accuracy);
                    let a2 = Area::from_curves(vec![child_curve], accuracy);
                    let united = a1.unioned(&a2)?;

                    let removed = self.children.remove(i);
                    let mut grandchildren = removed.children;

                    // The union may have produced more than one outer ring (e.g. two
                    // curves that only partly overlap but whose union still separates
                    // into disjoint pieces is not expected here since both inputs
                    // overlapped, but defensively handle it anyway).
                    let mut united_outers: Vec<Curve> = united
                        .curves
                        .into_iter()
                        .filter(|c| !c.is_clockwise())
                        .collect();
                    let merged_curve = if united_outers.is_empty() {
                        candidate
                    } else {
                        united_outers.remove(0)
                    };
                    let mut merged_node = InnerCurvesNode::leaf(merged_curve);
                    merged_node.children.append(&mut grandchildren);
                    self.children.push(Box::new(merged_node));

                    // any extra outer rings the union produced are re-inserted as
                    // independent siblings at this level.
                    for extra in united_outers {
                        self.insert(extra, accuracy)?;
                    }
                    return Ok(());
                }
            }
        }
        self.children.push(Box::new(InnerCurvesNode::leaf(candidate)));
        Ok(())
    }

    /// DFS flatten, alternating orientation per depth: even depth (outers) CCW,
    /// odd depth (islands) CW.
    fn flatten(&self, depth: usize, accuracy: f64) -> Vec<Curve> {
        let mut out = Vec::new();
        for child in &self.children {
            if let Some(mut c) = child.curve.clone() {
                let want_cw = depth % 2 == 1;
                if c.is_clockwise() != want_cw {
                    c.reverse();
                }
                out.push(c);
            }
            out.extend(child.flatten(depth + 1, accuracy));
        }
        out
    }
}

fn detached_into_box(node: &mut InnerCurvesNode) -> Box<InnerCurvesNode> {
    Box::new(InnerCurvesNode {
        curve: node.curve.take(),
        children: std::mem::take(&mut node.children),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vertex::Vertex;

    fn square(side: f64, offset: Point) -> Curve {
        let mut c = Curve::starting_at(offset + Point::new(0.0, 0.0));
        c.push(Vertex::line(offset + Point::new(side, 0.0)));
        c.push(Vertex::line(offset + Point::new(side, side)));
        c.push(Vertex::line(offset + Point::new(0.0, side)));
        c.push(Vertex::line(offset + Point::new(0.0, 0.0)));
        c
    }

    #[test]
    fn reorder_normalizes_orientation_idempotently() {
        let outer = square(20.0, Point::ZERO);
        let mut island = square(5.0, Point::new(7.0, 7.0));
        island.reverse(); // start CCW; Reorder must flip it CW
        let mut area = Area::from_curves(vec![outer, island], 1e-6);
        area.reorder().unwrap();
        let once = area.curves.clone();
        area.reorder().unwrap();
        assert_eq!(once.len(), area.curves.len());
        assert!(!once[0].is_clockwise());
        assert!(once[1].is_clockwise());
    }

    #[test]
    fn split_attaches_island_to_its_outer() {
        let outer1 = square(20.0, Point::ZERO);
        let outer2 = square(20.0, Point::new(100.0, 0.0));
        let island = square(5.0, Point::new(7.0, 7.0));
        let area = Area::from_curves(vec![outer1, outer2, island], 1e-6);
        let parts = area.split().unwrap();
        assert_eq!(parts.len(), 2);
        let with_island = parts.iter().find(|a| a.curves.len() == 2).unwrap();
        assert_eq!(with_island.curves.len(), 2);
    }

    #[test]
    fn overlap_type_detects_siblings_and_inside() {
        let a = square(10.0, Point::ZERO);
        let b = square(10.0, Point::new(100.0, 0.0));
        assert_eq!(get_overlap_type(&a, &b, 1e-6).unwrap(), OverlapType::Siblings);

        let outer = square(20.0, Point::ZERO);
        let inner = square(5.0, Point::new(7.0, 7.0));
        assert_eq!(
            get_overlap_type(&inner, &outer, 1e-6).unwrap(),
            OverlapType::Inside
        );
        assert_eq!(
            get_overlap_type(&outer, &inner, 1e-6).unwrap(),
            OverlapType::Outside
        );
    }

    #[test]
    fn is_inside_area_respects_islands() {
        let outer = square(20.0, Point::ZERO);
        let mut island = square(5.0, Point::new(7.0, 7.0));
        island.reverse();
        let mut area = Area::from_curves(vec![outer, island], 1e-6);
        area.reorder().unwrap();
        assert!(is_inside_area(&area, Point::new(1.0, 1.0)));
        assert!(!is_inside_area(&area, Point::new(9.0, 9.0)));
        assert!(!is_inside_area(&area, Point::new(-5.0, -5.0)));
    }
}
