//! Integration tests for the six concrete scenarios of §8 plus a handful of
//! the section's universally-quantified invariants and boundary behaviors,
//! exercised end to end through the public `Area`/pocket API rather than the
//! crate-internal unit tests next to each module.

use areapocket::*;

fn circle(center: Point, radius: f64, clockwise: bool) -> Curve {
    // Four quarter-arc vertices around `center`, starting at the +x point.
    let e = Point::new(center.x + radius, center.y);
    let n = Point::new(center.x, center.y + radius);
    let w = Point::new(center.x - radius, center.y);
    let s = Point::new(center.x, center.y - radius);
    let kind = if clockwise { VertexKind::ArcCw } else { VertexKind::ArcCcw };

    let mut c = Curve::starting_at(e);
    if clockwise {
        c.push(Vertex::arc(kind, s, center));
        c.push(Vertex::arc(kind, w, center));
        c.push(Vertex::arc(kind, n, center));
        c.push(Vertex::arc(kind, e, center));
    } else {
        c.push(Vertex::arc(kind, n, center));
        c.push(Vertex::arc(kind, w, center));
        c.push(Vertex::arc(kind, s, center));
        c.push(Vertex::arc(kind, e, center));
    }
    c
}

fn square(side: f64) -> Curve {
    let mut c = Curve::starting_at(Point::new(0.0, 0.0));
    c.push(Vertex::line(Point::new(side, 0.0)));
    c.push(Vertex::line(Point::new(side, side)));
    c.push(Vertex::line(Point::new(0.0, side)));
    c.push(Vertex::line(Point::new(0.0, 0.0)));
    c
}

fn rectangle(w: f64, h: f64) -> Curve {
    let mut c = Curve::starting_at(Point::new(0.0, 0.0));
    c.push(Vertex::line(Point::new(w, 0.0)));
    c.push(Vertex::line(Point::new(w, h)));
    c.push(Vertex::line(Point::new(0.0, h)));
    c.push(Vertex::line(Point::new(0.0, 0.0)));
    c
}

fn spiral_params(tool_radius: f64, stepover: f64) -> CAreaPocketParams {
    CAreaPocketParams {
        tool_radius,
        extra_offset: 0.0,
        stepover,
        from_center: false,
        mode: PocketMode::Spiral,
        zig_angle_degrees: 0.0,
        only_cut_first_offset: false,
    }
}

fn zigzag_params(tool_radius: f64, stepover: f64, zig_angle_degrees: f64) -> CAreaPocketParams {
    CAreaPocketParams {
        tool_radius,
        extra_offset: 0.0,
        stepover,
        from_center: false,
        mode: PocketMode::ZigZag,
        zig_angle_degrees,
        only_cut_first_offset: false,
    }
}

/// Scenario 1: circle, no island, spiral mode. A single connected sub-area
/// with no islands emits exactly one continuous toolpath curve, and every
/// vertex stays at least `tool_radius` inside the boundary.
#[test]
fn scenario_1_circle_no_island_spiral() {
    let accuracy = 0.05;
    let outer = circle(Point::new(50.0, 50.0), 40.0, false);
    let area = Area::from_curves(vec![outer.clone()], accuracy);
    let params = spiral_params(3.0, 2.5);

    let curves = make_pocket_toolpath(&area, &params, None).unwrap();
    assert_eq!(curves.len(), 1, "no islands -> exactly one toolpath curve");

    let boundary = Area::from_curves(vec![outer], accuracy);
    for v in &curves[0].vertices {
        let d = boundary.nearest_point(v.end).dist(&v.end);
        assert!(
            d >= params.tool_radius - accuracy,
            "toolpath vertex {:?} only {} from boundary",
            v.end,
            d
        );
    }
}

/// Scenario 2: circle with a concentric island. Every toolpath vertex stays
/// out of the annulus's inner edge by at least `tool_radius`.
#[test]
fn scenario_2_circle_with_concentric_island() {
    let accuracy = 0.05;
    let outer = circle(Point::new(50.0, 50.0), 40.0, false);
    let island = circle(Point::new(50.0, 50.0), 12.0, true);
    let area = Area::from_curves(vec![outer, island.clone()], accuracy);
    let params = spiral_params(3.0, 2.5);

    let curves = make_pocket_toolpath(&area, &params, None).unwrap();
    assert!(!curves.is_empty());

    let island_area = Area::from_curves(vec![island], accuracy);
    for curve in &curves {
        for v in &curve.vertices {
            assert!(
                !is_inside_area(&island_area, v.end),
                "toolpath vertex {:?} fell inside the island",
                v.end
            );
            let d = island_area.nearest_point(v.end).dist(&v.end);
            assert!(
                d >= params.tool_radius - accuracy,
                "toolpath vertex {:?} only {} from island boundary",
                v.end,
                d
            );
        }
    }
}

/// Scenario 3: peanut (union of two overlapping circles), spiral mode. The
/// single connected region still yields one continuous toolpath that stays
/// clear of the outer boundary.
#[test]
fn scenario_3_peanut_single_curve() {
    let accuracy = 0.05;
    let left = circle(Point::new(35.0, 50.0), 28.0, false);
    let right = circle(Point::new(65.0, 50.0), 28.0, false);
    let mut area = Area::from_curves(vec![left], accuracy);
    area.union(&Area::from_curves(vec![right], accuracy)).unwrap();
    assert_eq!(area.curves.len(), 1, "overlapping circles union into one outer");

    let boundary = area.clone();
    let params = spiral_params(3.0, 2.5);
    let curves = make_pocket_toolpath(&area, &params, None).unwrap();
    assert_eq!(curves.len(), 1, "one connected sub-area -> one toolpath curve");

    for v in &curves[0].vertices {
        let d = boundary.nearest_point(v.end).dist(&v.end);
        assert!(d >= params.tool_radius - accuracy);
    }
}

/// Scenario 4: unit 10x10 square, zig-zag at 0 degrees. A plain square has no
/// islands to split rows apart, so every row's zig shares a band-boundary
/// point with the next and all of them chain into exactly one curve.
#[test]
fn scenario_4_unit_square_zigzag() {
    let accuracy = 0.01;
    let area = Area::from_curves(vec![square(10.0)], accuracy);
    let params = zigzag_params(1.0, 1.5, 0.0);

    let curves = make_pocket_toolpath(&area, &params, None).unwrap();
    assert_eq!(curves.len(), 1, "rows with no islands should chain into a single curve");

    let chain = &curves[0];
    let total_spans = chain.get_spans().len();
    assert!(total_spans >= 5, "expected roughly six rows worth of spans, got {total_spans}");

    let tol = 2.0 * accuracy;
    let mut prev_end = chain.start().unwrap();
    for span in chain.get_spans() {
        assert!(
            span.start.approx_eq(&prev_end, tol),
            "consecutive spans should be contiguous: {:?} vs {:?}",
            span.start,
            prev_end
        );
        prev_end = span.end();
    }
}

/// Scenario 5: 10x20 rectangle, zig-zag at 22.5 degrees. Rotating the sweep
/// direction must still produce several rows chained into continuous curves
/// (a rectangle's band-to-band boundary point is still shared between rows
/// regardless of sweep angle, even though an individual zig's own slope now
/// tracks the rectangle's tilted sides rather than the sweep angle itself).
#[test]
fn scenario_5_rectangle_zigzag_at_angle() {
    let accuracy = 0.01;
    let area = Area::from_curves(vec![rectangle(10.0, 20.0)], accuracy);
    let params = zigzag_params(1.0, 1.5, 22.5);

    let curves = make_pocket_toolpath(&area, &params, None).unwrap();
    assert!(!curves.is_empty());

    let total_spans: usize = curves.iter().map(|c| c.get_spans().len()).sum();
    assert!(total_spans >= 5, "expected roughly twelve rows worth of spans, got {total_spans}");

    let tol = 2.0 * accuracy;
    for curve in &curves {
        let mut prev_end = curve.start().unwrap();
        for span in curve.get_spans() {
            assert!(
                span.start.approx_eq(&prev_end, tol),
                "consecutive spans should be contiguous: {:?} vs {:?}",
                span.start,
                prev_end
            );
            prev_end = span.end();
        }
    }
}

/// Scenario 6: offset round-trip. Square of side 20, inward by 3 then outward
/// by 3, recovers the original square within accuracy.
#[test]
fn scenario_6_offset_round_trip() {
    let accuracy = 1e-3;
    let mut area = Area::from_curves(vec![square(20.0)], accuracy);
    area.offset(3.0).unwrap();
    area.offset(-3.0).unwrap();

    assert_eq!(area.curves.len(), 1);
    let recovered_area = area.get_area().abs();
    assert!(
        (recovered_area - 400.0).abs() < 1.0,
        "round-tripped area {recovered_area} should be close to the original 400"
    );
}

/// §8 boundary behavior: stepover >= 2*tool_radius is rejected at entry.
#[test]
fn stepover_too_large_is_rejected() {
    let params = CAreaPocketParams {
        tool_radius: 2.0,
        extra_offset: 0.0,
        stepover: 4.0,
        from_center: false,
        mode: PocketMode::Spiral,
        zig_angle_degrees: 0.0,
        only_cut_first_offset: false,
    };
    assert!(matches!(params.validate(), Err(AreaError::InvalidParameters { .. })));
}

/// §8 boundary behavior: a tool radius larger than the inscribed circle yields
/// an empty toolpath, not an error.
#[test]
fn tool_too_large_yields_empty_not_error() {
    let accuracy = 0.05;
    let outer = circle(Point::new(0.0, 0.0), 2.0, false);
    let area = Area::from_curves(vec![outer], accuracy);
    let params = spiral_params(5.0, 1.0);
    let curves = make_pocket_toolpath(&area, &params, None).unwrap();
    assert!(curves.is_empty());
}

/// §8 invariant: `Reorder(); Reorder()` is idempotent.
#[test]
fn reorder_is_idempotent() {
    let accuracy = 1e-6;
    let outer = square(20.0);
    let mut island = square(5.0);
    for v in island.vertices.iter_mut() {
        v.end = Point::new(v.end.x + 7.0, v.end.y + 7.0);
    }
    island.reverse();
    let mut area = Area::from_curves(vec![outer, island], accuracy);
    area.reorder().unwrap();
    let once = area.curves.clone();
    area.reorder().unwrap();
    assert_eq!(once.len(), area.curves.len());
    for (a, b) in once.iter().zip(area.curves.iter()) {
        assert!((a.signed_area() - b.signed_area()).abs() < 1e-6);
    }
}

/// §8 invariant: reversing a closed curve flips the sign of its signed area
/// and preserves its magnitude.
#[test]
fn reverse_flips_sign_preserves_magnitude() {
    let c = square(10.0);
    let before = c.signed_area();
    let mut r = c;
    r.reverse();
    assert!((r.signed_area() + before).abs() < 1e-9);
}

/// §8 invariant: `A.Union(B); A.Subtract(B)` is topologically equal to `A.Subtract(B)`
/// for disjoint squares (both sides should equal the original `A`).
#[test]
fn union_then_subtract_matches_direct_subtract() {
    let accuracy = 1e-6;
    let a = Area::from_curves(vec![square(10.0)], accuracy);
    let mut far = square(10.0);
    for v in far.vertices.iter_mut() {
        v.end = Point::new(v.end.x + 100.0, v.end.y);
    }
    let b = Area::from_curves(vec![far], accuracy);

    let mut lhs = a.clone();
    lhs.union(&b).unwrap();
    lhs.difference(&b).unwrap();

    let rhs = a.subtracted(&b).unwrap();

    assert!((lhs.get_area().abs() - rhs.get_area().abs()).abs() < 1e-3);
}
