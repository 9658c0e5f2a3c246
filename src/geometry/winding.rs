//! Point containment and segment predicates for partition rings.

use crate::geometry::tolerance::EPS_ALPHA;
use crate::model::{Point, Ring};

pub type Bbox = (f64, f64, f64, f64); // minx, miny, maxx, maxy

/// Signed shoelace area; positive for counter-clockwise rings.
pub fn ring_area_signed(ring: &[Point]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    0.5 * sum
}

/// Even-odd ray cast; points exactly on the boundary are unreliable, callers
/// needing a definite answer should test an interior point instead.
pub fn point_in_ring(p: Point, ring: &[Point]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = ring[i];
        let b = ring[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// How two segments interact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Crossing {
    /// No contact.
    None,
    /// Endpoint contact or collinear overlap; zero crossing of interiors.
    Touching,
    /// Transversal crossing strictly inside both segments.
    Proper { t: f64, u: f64, p: Point },
}

pub fn segment_crossing(a1: Point, a2: Point, b1: Point, b2: Point, eps_len: f64) -> Crossing {
    let dax = a2.x - a1.x;
    let day = a2.y - a1.y;
    let dbx = b2.x - b1.x;
    let dby = b2.y - b1.y;
    let la = (dax * dax + day * day).sqrt();
    let lb = (dbx * dbx + dby * dby).sqrt();
    if la <= eps_len || lb <= eps_len {
        return Crossing::None;
    }
    let ex = b1.x - a1.x;
    let ey = b1.y - a1.y;
    let denom = dax * dby - day * dbx;
    if denom.abs() <= la * lb * 1e-12 {
        // Parallel. Collinear overlap of more than a point counts as touching.
        if (dax * ey - day * ex).abs() <= la * eps_len {
            let t0 = (ex * dax + ey * day) / (la * la);
            let t1 = ((b2.x - a1.x) * dax + (b2.y - a1.y) * day) / (la * la);
            let (lo, hi) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
            if hi > EPS_ALPHA && lo < 1.0 - EPS_ALPHA {
                return Crossing::Touching;
            }
        }
        return Crossing::None;
    }
    let t = (ex * dby - ey * dbx) / denom;
    let u = (ex * day - ey * dax) / denom;
    if t < -EPS_ALPHA || t > 1.0 + EPS_ALPHA || u < -EPS_ALPHA || u > 1.0 + EPS_ALPHA {
        return Crossing::None;
    }
    if t < EPS_ALPHA || t > 1.0 - EPS_ALPHA || u < EPS_ALPHA || u > 1.0 - EPS_ALPHA {
        return Crossing::Touching;
    }
    Crossing::Proper {
        t,
        u,
        p: Point {
            x: a1.x + t * dax,
            y: a1.y + t * day,
        },
    }
}

pub fn ring_bbox(ring: &[Point]) -> Option<Bbox> {
    let first = ring.first()?;
    let mut bb = (first.x, first.y, first.x, first.y);
    for p in &ring[1..] {
        bb.0 = bb.0.min(p.x);
        bb.1 = bb.1.min(p.y);
        bb.2 = bb.2.max(p.x);
        bb.3 = bb.3.max(p.y);
    }
    Some(bb)
}

pub fn bbox_union(a: Option<Bbox>, b: Option<Bbox>) -> Option<Bbox> {
    match (a, b) {
        (None, x) => x,
        (x, None) => x,
        (Some((ax0, ay0, ax1, ay1)), Some((bx0, by0, bx1, by1))) => {
            Some((ax0.min(bx0), ay0.min(by0), ax1.max(bx1), ay1.max(by1)))
        }
    }
}

pub fn rings_bbox(rings: &[Ring]) -> Option<Bbox> {
    let mut out = None;
    for r in rings {
        out = bbox_union(out, ring_bbox(r));
    }
    out
}

pub fn bbox_diag(bb: Bbox) -> f64 {
    let dx = bb.2 - bb.0;
    let dy = bb.3 - bb.1;
    (dx * dx + dy * dy).sqrt()
}

/// Distance from `p` to the closed boundary of `ring`.
pub fn dist_to_ring(p: Point, ring: &[Point]) -> f64 {
    let n = ring.len();
    let mut best = f64::INFINITY;
    for i in 0..n {
        best = best.min(dist_point_segment(p, ring[i], ring[(i + 1) % n]));
    }
    best
}

pub fn dist_point_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let qx = a.x + t * dx;
    let qy = a.y + t * dy;
    ((p.x - qx) * (p.x - qx) + (p.y - qy) * (p.y - qy)).sqrt()
}

/// A point strictly inside a simple ring, found by cutting a horizontal
/// scanline and taking the midpoint of the first spanned interval. Scanlines
/// that pass through a vertex are skipped and retried at another height.
pub fn interior_point(ring: &[Point]) -> Option<Point> {
    let (_, miny, _, maxy) = ring_bbox(ring)?;
    if ring.len() < 3 || maxy <= miny {
        return None;
    }
    let tiny = (maxy - miny) * 1e-9;
    let n = ring.len();
    for f in [0.5, 0.371_83, 0.628_41, 0.443_27, 0.557_19] {
        let y = miny + (maxy - miny) * f;
        let mut xs: Vec<f64> = Vec::new();
        let mut through_vertex = false;
        for i in 0..n {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            if (a.y - y).abs() <= tiny || (b.y - y).abs() <= tiny {
                through_vertex = true;
                break;
            }
            if (a.y < y) != (b.y < y) {
                xs.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
            }
        }
        if through_vertex || xs.len() < 2 {
            continue;
        }
        xs.sort_by(f64::total_cmp);
        return Some(Point {
            x: 0.5 * (xs[0] + xs[1]),
            y,
        });
    }
    None
}
