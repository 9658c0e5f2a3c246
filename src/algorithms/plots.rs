//! Fixed-size monitoring-plot grid generation.
//!
//! Plots are axis-aligned squares aligned to the origin grid, covering the
//! subzone bounding box row-major; a square is kept only when it lies fully
//! inside the subzone.

use crate::geometry::kernel::GeometryError;
use crate::geometry::tolerance::len_eps;
use crate::geometry::winding::{
    bbox_diag, point_in_ring, rings_bbox, segment_crossing, Crossing, ring_bbox,
};
use crate::model::{MultiPolygon, Point};

/// Upper bound on candidate grid squares before generation is refused.
const MAX_GRID_CELLS: i64 = 262_144;

/// Squares of side `side` fully contained in `subzone`, row-major.
pub fn grid_plots(subzone: &MultiPolygon, side: f64) -> Result<Vec<MultiPolygon>, GeometryError> {
    if !(side > 0.0) {
        return Err(GeometryError::DegenerateShape);
    }
    let Some(bb) = rings_bbox(&subzone.rings) else {
        return Ok(Vec::new());
    };
    let el = len_eps(bbox_diag(bb));
    let x0 = (bb.0 / side).floor() * side;
    let y0 = (bb.1 / side).floor() * side;
    let cols = ((bb.2 - x0) / side).ceil() as i64;
    let rows = ((bb.3 - y0) / side).ceil() as i64;
    // Guard against a side length far below the subzone extent.
    if cols.saturating_mul(rows) > MAX_GRID_CELLS {
        return Err(GeometryError::DegenerateShape);
    }
    let mut out = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let px = x0 + col as f64 * side;
            let py = y0 + row as f64 * side;
            let square = MultiPolygon::rect(px, py, px + side, py + side);
            if square_inside(&square, subzone, el) {
                out.push(square);
            }
        }
    }
    Ok(out)
}

/// Full containment: all four corners inside one of the subzone rings and no
/// subzone edge crossing or touching the square. Squares on the boundary are
/// excluded, which is the conservative reading of "fully contained".
fn square_inside(square: &MultiPolygon, subzone: &MultiPolygon, el: f64) -> bool {
    let corners = &square.rings[0];
    let inside = |p: Point| subzone.rings.iter().any(|r| point_in_ring(p, r));
    if !corners.iter().all(|&p| inside(p)) {
        return false;
    }
    for ring in &subzone.rings {
        // Quick reject: ring bbox vs square bbox.
        if let (Some(rb), Some(sb)) = (ring_bbox(ring), ring_bbox(corners)) {
            if rb.2 < sb.0 || rb.0 > sb.2 || rb.3 < sb.1 || rb.1 > sb.3 {
                continue;
            }
        }
        let n = ring.len();
        for i in 0..n {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            for j in 0..4 {
                let c = corners[j];
                let d = corners[(j + 1) % 4];
                if segment_crossing(a, b, c, d, el) != Crossing::None {
                    return false;
                }
            }
        }
    }
    true
}
