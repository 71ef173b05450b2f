//! The recursive concentric-offset "spiral" pocket generator (§4.5): per
//! single-outer sub-area, build a `CurveTree` of successively inward-offset
//! rings with live island absorption, then flatten it into one continuous
//! walking-order toolpath curve.

use crate::context::{bump, should_abort, ProcessingContext};
use crate::errors::AreaResult;
use crate::geometry::area::{get_overlap_type, Area, OverlapType};
use crate::geometry::curve::Curve;
use crate::geometry::point::Point;
use crate::geometry::vertex::Vertex;
use std::collections::HashSet;
use tracing::debug;

/// An island curve plus its stepover-grown footprint, and any other islands
/// whose grown footprints currently overlap it (§3/§4.5 step 3).
struct IslandAndOffset {
    /// The original island curve (CW).
    island: Curve,
    /// `offset_curves[0]` is the island's own enlarged outline (CCW); any
    /// further entries are inner voids (fillable pockets nested inside the
    /// island) inherited into the recursion as grandchildren.
    offset_curves: Vec<Curve>,
    touching: Vec<usize>,
}

/// One node of the `CurveTree` (§3/§9): owns its ring and its children
/// exclusively; `point_on_parent` is the hand-off point on the *parent's* ring
/// where this child's detour begins (`None` for the tree root).
struct CurveTreeNode {
    ring: Curve,
    point_on_parent: Option<Point>,
    children: Vec<CurveTreeNode>,
}

/// Grow an island's footprint outward by `stepover`: reverse it into a
/// standalone positive (CCW) region and dilate (`Area::offset` with a negative
/// value dilates outward).
fn build_island_offset(island: &Curve, stepover: f64, accuracy: f64) -> AreaResult<IslandAndOffset> {
    let mut reversed = island.clone();
    reversed.reverse();
    let mut area = Area::from_curves(vec![reversed], accuracy);
    area.offset(-stepover)?;
    Ok(IslandAndOffset {
        island: island.clone(),
        offset_curves: area.curves,
        touching: Vec::new(),
    })
}

fn is_fully_inside(inner: &Curve, outer: &Area, accuracy: f64) -> AreaResult<bool> {
    let inner_area = Area::from_curves(vec![inner.clone()], accuracy);
    Ok(inner_area.subtracted(outer)?.is_empty())
}

/// `CArea::MakePocketToolpath`'s spiral branch, for one single-outer sub-area
/// of the already tool-radius-offset starting region. `sub_area.curves[0]` is
/// the outer (CCW); the rest are islands (CW).
pub fn generate_for_subarea(
    sub_area: &Area,
    stepover: f64,
    accuracy: f64,
    ctx: &mut Option<&mut ProcessingContext>,
) -> AreaResult<Option<Curve>> {
    if sub_area.curves.is_empty() {
        return Ok(None);
    }
    let outer = sub_area.curves[0].clone();
    if outer.get_spans().len() < 2 {
        return Ok(None);
    }

    let mut islands = Vec::new();
    for island_curve in &sub_area.curves[1..] {
        islands.push(build_island_offset(island_curve, stepover, accuracy)?);
    }

    // §4.5 step 3: cross-classify every pair of island offsets.
    let n = islands.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let overlap =
                get_overlap_type(&islands[i].offset_curves[0], &islands[j].offset_curves[0], accuracy)?;
            if overlap == OverlapType::Crossing {
                islands[i].touching.push(j);
                islands[j].touching.push(i);
            }
        }
    }

    let pending: Vec<usize> = (0..n).collect();
    let root = build_node(outer, None, pending, &islands, stepover, accuracy, ctx)?;

    let curve = flatten_node(&root, accuracy);
    if curve.vertices.len() < 2 {
        Ok(None)
    } else {
        Ok(Some(curve))
    }
}

/// §4.5 step 5: one worklist item, realized as recursion rather than an
/// explicit queue of non-owning references (idiomatic ownership per §9: each
/// parent node exclusively owns its children, so there is no worklist of raw
/// pointers to keep alive — recursing achieves the same node-processing order
/// since the final output is produced by a full DFS in `flatten_node`
/// regardless of construction order).
fn build_node(
    ring: Curve,
    point_on_parent: Option<Point>,
    pending: Vec<usize>,
    islands: &[IslandAndOffset],
    stepover: f64,
    accuracy: f64,
    ctx: &mut Option<&mut ProcessingContext>,
) -> AreaResult<CurveTreeNode> {
    if should_abort(ctx) {
        debug!("spiral worklist item skipped: abort observed");
        return Ok(CurveTreeNode {
            ring,
            point_on_parent,
            children: Vec::new(),
        });
    }
    bump(ctx, 1.0);

    // 5a: offset this ring inward by stepover.
    let mut q_area = Area::from_curves(vec![ring.clone()], accuracy);
    q_area.offset(stepover)?;
    if q_area.is_empty() {
        return Ok(CurveTreeNode {
            ring,
            point_on_parent,
            children: Vec::new(),
        });
    }

    // 5b: classify every pending island offset against Q.
    let mut still_pending = Vec::new();
    let mut touched = Vec::new();
    for idx in pending {
        let grown = &islands[idx].offset_curves[0];
        if is_fully_inside(grown, &q_area, accuracy)? {
            still_pending.push(idx);
            // Not yet touched: the true island remains a hole in Q so later
            // recursion levels still see (and avoid) it.
            let island_area = Area::from_curves(vec![islands[idx].island.clone()], accuracy);
            q_area.difference(&island_area)?;
        } else {
            touched.push(idx);
        }
    }

    // flood-fill absorb every transitively touching island.
    let mut absorbed: HashSet<usize> = HashSet::new();
    let mut stack = touched.clone();
    while let Some(idx) = stack.pop() {
        if !absorbed.insert(idx) {
            continue;
        }
        for &neighbor in &islands[idx].touching {
            if still_pending.contains(&neighbor) {
                still_pending.retain(|&x| x != neighbor);
                stack.push(neighbor);
            } else if !absorbed.contains(&neighbor) {
                stack.push(neighbor);
            }
        }
    }

    let mut island_children = Vec::new();
    for &idx in &absorbed {
        let grown_area = Area::from_curves(vec![islands[idx].offset_curves[0].clone()], accuracy);
        q_area.difference(&grown_area)?;

        let anchor_on_parent = ring.nearest_point_to_curve(&islands[idx].island, None);
        let mut island_ring = islands[idx].island.clone();
        let entry_point = island_ring.nearest_point(anchor_on_parent);
        island_ring.change_start(entry_point, accuracy);

        // Inner voids (fillable pockets nested inside the island) recurse as
        // grandchildren of the island-wall node.
        let mut void_children = Vec::new();
        for void in &islands[idx].offset_curves[1..] {
            let mut fillable = void.clone();
            if fillable.is_clockwise() {
                fillable.reverse();
            }
            let void_anchor = island_ring.nearest_point_to_curve(&fillable, None);
            void_children.push(build_node(
                fillable,
                Some(void_anchor),
                Vec::new(),
                islands,
                stepover,
                accuracy,
                ctx,
            )?);
        }

        island_children.push(CurveTreeNode {
            ring: island_ring,
            point_on_parent: Some(entry_point_on_parent_ring(&ring, anchor_on_parent, accuracy)),
            children: void_children,
        });
    }

    // 5c: split the remaining Q into disjoint fillable sub-regions.
    let pieces = q_area.split()?;
    let mut region_children = Vec::new();
    for piece in pieces {
        if piece.curves.is_empty() {
            continue;
        }
        let piece_outer = piece.curves[0].clone();
        let child_pending: Vec<usize> = still_pending
            .iter()
            .copied()
            .filter(|&idx| {
                islands[idx]
                    .island
                    .start()
                    .map(|p| crate::geometry::area::is_inside_curve(&piece_outer, p, accuracy))
                    .unwrap_or(false)
            })
            .collect();

        let anchor_on_parent = ring.nearest_point_to_curve(&piece_outer, None);
        let entry_point = piece_outer.nearest_point(anchor_on_parent);
        let mut rotated_piece = piece_outer;
        rotated_piece.change_start(entry_point, accuracy);

        region_children.push(build_node(
            rotated_piece,
            Some(anchor_on_parent),
            child_pending,
            islands,
            stepover,
            accuracy,
            ctx,
        )?);
    }

    let mut children = island_children;
    children.extend(region_children);

    Ok(CurveTreeNode {
        ring,
        point_on_parent,
        children,
    })
}

/// The anchor point actually lives on the parent ring; `nearest_point_to_curve`
/// already returns a point on `ring`, so this is a thin naming wrapper kept to
/// make the call site at the island-child construction site self-documenting.
fn entry_point_on_parent_ring(_ring: &Curve, anchor_on_parent: Point, _accuracy: f64) -> Point {
    anchor_on_parent
}

/// §4.5 step 6: walk the ring, branching into each child at its
/// `point_on_parent`, ordered by parameter along the span that contains it.
fn flatten_node(node: &CurveTreeNode, accuracy: f64) -> Curve {
    if node.children.is_empty() {
        return node.ring.clone();
    }

    let mut working = node.ring.clone();
    for child in &node.children {
        if let Some(p) = child.point_on_parent {
            working.break_at(p, accuracy);
        }
    }

    let mut placements: Vec<(usize, f64)> = node
        .children
        .iter()
        .enumerate()
        .filter_map(|(i, c)| {
            c.point_on_parent
                .map(|p| (i, working.point_to_perim(p, accuracy)))
        })
        .collect();
    placements.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    let start = working.start().unwrap_or(Point::ZERO);
    let mut out = Curve::starting_at(start);
    let mut last_point = start;
    let mut next_placement = 0usize;

    for v in working.vertices.iter().skip(1) {
        push_vertex_dedup(&mut out, &mut last_point, *v, accuracy);

        while next_placement < placements.len() {
            let (child_idx, _) = placements[next_placement];
            let p = node.children[child_idx].point_on_parent.unwrap();
            if !v.end.approx_eq(&p, accuracy.max(1e-6)) {
                break;
            }
            let child_curve = flatten_node(&node.children[child_idx], accuracy);
            if let Some(entry) = child_curve.start() {
                push_point_dedup(&mut out, &mut last_point, entry, accuracy);
                for cv in child_curve.vertices.iter().skip(1) {
                    push_vertex_dedup(&mut out, &mut last_point, *cv, accuracy);
                }
                push_point_dedup(&mut out, &mut last_point, p, accuracy);
            }
            next_placement += 1;
        }
    }

    out
}

fn push_vertex_dedup(out: &mut Curve, last_point: &mut Point, v: Vertex, accuracy: f64) {
    if last_point.approx_eq(&v.end, accuracy) {
        return;
    }
    out.push(v);
    *last_point = v.end;
}

fn push_point_dedup(out: &mut Curve, last_point: &mut Point, p: Point, accuracy: f64) {
    if last_point.approx_eq(&p, accuracy) {
        return;
    }
    out.push(Vertex::line(p));
    *last_point = p;
}
