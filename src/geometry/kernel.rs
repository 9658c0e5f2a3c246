//! Polygon set operations over multipolygons.
//!
//! All comparisons use an epsilon relative to the combined bounding-box
//! diagonal, so floating-point slivers count as "no overlap". Degenerate
//! input (under three vertices, near-zero area) yields an empty result, since
//! transient degenerate states occur naturally while a user is still drawing;
//! a boundary configuration the clipper cannot thread is an error instead.

use crate::geometry::clip::{clip_rings, ClipOp, ClipOutcome};
use crate::geometry::tolerance::{area_eps, len_eps, near_zero, EPS_ABS, MIN_RING_VERTS};
use crate::geometry::winding::{bbox_diag, bbox_union, ring_area_signed, rings_bbox};
use crate::model::{MultiPolygon, Point, Ring};
use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum GeometryError {
    /// A boundary fragment lies on the other ring without a coincident edge
    /// to attribute it to.
    #[error("coincident boundary segments cannot be resolved")]
    CoincidentBoundary,
    /// The clip traversal failed to close (self-intersecting or inconsistent input).
    #[error("clip traversal failed to close")]
    OpenTraversal,
    /// The shape has no usable interior.
    #[error("shape is degenerate")]
    DegenerateShape,
}

/// Normalizes a single drawn ring into the uniform multipolygon form.
pub fn to_multi_polygon(ring: Ring) -> MultiPolygon {
    MultiPolygon::from_ring(ring)
}

/// Total area, non-negative. Rings are assumed disjoint so areas sum.
pub fn area(p: &MultiPolygon) -> f64 {
    p.rings.iter().map(|r| ring_area_signed(r).abs()).sum()
}

/// Area epsilon for comparisons between the two shapes' extents.
pub fn overlap_area_eps(a: &MultiPolygon, b: &MultiPolygon) -> f64 {
    match bbox_union(rings_bbox(&a.rings), rings_bbox(&b.rings)) {
        Some(bb) => area_eps(bbox_diag(bb)),
        None => EPS_ABS,
    }
}

/// Area epsilon for a single shape's extent.
pub fn shape_area_eps(a: &MultiPolygon) -> f64 {
    match rings_bbox(&a.rings) {
        Some(bb) => area_eps(bbox_diag(bb)),
        None => EPS_ABS,
    }
}

/// Geometric intersection of two areas, or `None` if they do not overlap.
/// Commutative up to ring ordering.
pub fn intersect(
    a: &MultiPolygon,
    b: &MultiPolygon,
) -> Result<Option<MultiPolygon>, GeometryError> {
    let Some(bb) = bbox_union(rings_bbox(&a.rings), rings_bbox(&b.rings)) else {
        return Ok(None);
    };
    let diag = bbox_diag(bb);
    let el = len_eps(diag);
    let ea = area_eps(diag);
    let ra = sanitize_rings(a, el, ea);
    let rb = sanitize_rings(b, el, ea);
    if ra.is_empty() || rb.is_empty() {
        return Ok(None);
    }
    let mut out: Vec<Ring> = Vec::new();
    for s in &ra {
        for c in &rb {
            match clip_rings(s, c, ClipOp::Intersection, el)? {
                ClipOutcome::Pieces(v) => out.extend(keep_solid(v, ea)),
                ClipOutcome::Disjoint => {}
                ClipOutcome::SubjectInClip => out.push(s.clone()),
                ClipOutcome::ClipInSubject => out.push(c.clone()),
            }
        }
    }
    Ok(if out.is_empty() {
        None
    } else {
        Some(MultiPolygon { rings: out })
    })
}

/// `a` minus the overlapping portion of `b`, or `None` if nothing remains.
/// May return more rings than `a` had: a subtraction that bisects a concave
/// ring leaves disjoint remainders, and a subtraction that would punch a hole
/// is resolved by cutting the containing ring into simple pieces.
pub fn difference(
    a: &MultiPolygon,
    b: &MultiPolygon,
) -> Result<Option<MultiPolygon>, GeometryError> {
    let Some(bb) = bbox_union(rings_bbox(&a.rings), rings_bbox(&b.rings)) else {
        return Ok(None);
    };
    let diag = bbox_diag(bb);
    let el = len_eps(diag);
    let ea = area_eps(diag);
    let ra = sanitize_rings(a, el, ea);
    if ra.is_empty() {
        return Ok(None);
    }
    let rb = sanitize_rings(b, el, ea);
    let mut pieces = ra;
    for c in &rb {
        let mut next: Vec<Ring> = Vec::new();
        for s in &pieces {
            next.extend(diff_ring(s, c, el, ea, 0)?);
        }
        pieces = next;
        if pieces.is_empty() {
            return Ok(None);
        }
    }
    Ok(Some(MultiPolygon { rings: pieces }))
}

fn diff_ring(
    s: &Ring,
    c: &Ring,
    el: f64,
    ea: f64,
    depth: u32,
) -> Result<Vec<Ring>, GeometryError> {
    if depth > 4 {
        return Err(GeometryError::OpenTraversal);
    }
    match clip_rings(s, c, ClipOp::Difference, el)? {
        ClipOutcome::Pieces(v) => {
            let pieces = keep_solid(v, ea);
            // A clockwise piece is a hole punched through the remainder
            // (the clip sits inside the subject, touching its boundary at a
            // point); redo the subtraction on cut halves instead.
            if pieces.iter().any(|r| ring_area_signed(r) < 0.0) {
                cut_around_hole(s, c, el, ea, depth)
            } else {
                Ok(pieces)
            }
        }
        ClipOutcome::Disjoint => Ok(vec![s.clone()]),
        ClipOutcome::SubjectInClip => Ok(Vec::new()),
        ClipOutcome::ClipInSubject => cut_around_hole(s, c, el, ea, depth),
    }
}

/// Subtracting a shape strictly inside the subject would punch a hole; the
/// partition model stores only simple rings, so the subject is cut along a
/// vertical line through the hole and the subtraction redone on each half.
fn cut_around_hole(
    s: &Ring,
    c: &Ring,
    el: f64,
    ea: f64,
    depth: u32,
) -> Result<Vec<Ring>, GeometryError> {
    let (sx0, sy0, sx1, sy1) = rings_bbox(std::slice::from_ref(s)).ok_or(GeometryError::DegenerateShape)?;
    let (cx0, _, cx1, _) = rings_bbox(std::slice::from_ref(c)).ok_or(GeometryError::DegenerateShape)?;
    let pad = bbox_diag((sx0, sy0, sx1, sy1)).max(1.0);
    let mut last_err = GeometryError::OpenTraversal;
    // A cut anywhere strictly inside the hole's x-range works; retry a few
    // positions in case one grazes a vertex.
    for f in [0.5, 0.372, 0.631] {
        let cut = cx0 + (cx1 - cx0) * f;
        let halves = [
            rect_ring(sx0 - pad, sy0 - pad, cut, sy1 + pad),
            rect_ring(cut, sy0 - pad, sx1 + pad, sy1 + pad),
        ];
        let mut out: Vec<Ring> = Vec::new();
        let mut failed = false;
        'halves: for half in &halves {
            match clip_rings(s, half, ClipOp::Intersection, el) {
                Ok(ClipOutcome::Pieces(v)) => {
                    for piece in keep_solid(v, ea) {
                        match diff_ring(&piece, c, el, ea, depth + 1) {
                            Ok(rem) => out.extend(rem),
                            Err(e) => {
                                last_err = e;
                                failed = true;
                                break 'halves;
                            }
                        }
                    }
                }
                Ok(ClipOutcome::SubjectInClip) => match diff_ring(s, c, el, ea, depth + 1) {
                    Ok(rem) => out.extend(rem),
                    Err(e) => {
                        last_err = e;
                        failed = true;
                        break 'halves;
                    }
                },
                Ok(_) => {}
                Err(e) => {
                    last_err = e;
                    failed = true;
                    break 'halves;
                }
            }
        }
        if !failed {
            return Ok(out);
        }
    }
    Err(last_err)
}

fn rect_ring(x0: f64, y0: f64, x1: f64, y1: f64) -> Ring {
    vec![
        Point { x: x0, y: y0 },
        Point { x: x1, y: y0 },
        Point { x: x1, y: y1 },
        Point { x: x0, y: y1 },
    ]
}

/// Drop duplicate vertices and the explicit closing point, reject rings with
/// no usable interior, and orient counter-clockwise.
fn sanitize_ring(ring: &[Point], el: f64, ea: f64) -> Option<Ring> {
    let mut pts: Vec<Point> = Vec::with_capacity(ring.len());
    for &p in ring {
        if !p.x.is_finite() || !p.y.is_finite() {
            return None;
        }
        if let Some(last) = pts.last() {
            if (p.x - last.x).abs() <= el && (p.y - last.y).abs() <= el {
                continue;
            }
        }
        pts.push(p);
    }
    while pts.len() >= 2 {
        let first = pts[0];
        let last = pts[pts.len() - 1];
        if (first.x - last.x).abs() <= el && (first.y - last.y).abs() <= el {
            pts.pop();
        } else {
            break;
        }
    }
    if pts.len() < MIN_RING_VERTS {
        return None;
    }
    let signed = ring_area_signed(&pts);
    if near_zero(signed, ea) {
        return None;
    }
    if signed < 0.0 {
        pts.reverse();
    }
    Some(pts)
}

fn sanitize_rings(p: &MultiPolygon, el: f64, ea: f64) -> Vec<Ring> {
    p.rings
        .iter()
        .filter_map(|r| sanitize_ring(r, el, ea))
        .collect()
}

fn keep_solid(rings: Vec<Ring>, ea: f64) -> Vec<Ring> {
    rings
        .into_iter()
        .filter(|r| r.len() >= MIN_RING_VERTS && ring_area_signed(r).abs() > ea)
        .collect()
}
