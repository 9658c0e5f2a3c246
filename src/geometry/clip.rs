//! Ring clipping by boundary subdivision.
//!
//! Both rings are cut at every boundary interaction: proper crossings,
//! vertices landing on the other ring's edges, and the endpoints of collinear
//! overlap runs. Each fragment is then classified against the other ring by
//! its midpoint, the fragments belonging to the result boundary are selected
//! per operation, and the output rings are stitched back together by walking
//! the selected fragments in angular order.
//!
//! Shared boundary runs are legal: a coincident fragment is emitted at most
//! once, decided by its direction relative to the other ring, so partition
//! cells that share edges (or that were clipped to the same parent frame)
//! clip cleanly instead of failing.

use crate::geometry::kernel::GeometryError;
use crate::geometry::tolerance::EPS_ALPHA;
use crate::geometry::winding::{
    dist_point_segment, dist_to_ring, interior_point, point_in_ring, ring_area_signed,
};
use crate::model::{Point, Ring};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipOp {
    Intersection,
    Difference,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClipOutcome {
    /// Boundary interactions resolved into output rings (possibly none).
    Pieces(Vec<Ring>),
    Disjoint,
    SubjectInClip,
    ClipInSubject,
}

#[derive(Clone, Copy)]
struct Frag {
    a: Point,
    b: Point,
}

impl Frag {
    fn mid(&self) -> Point {
        Point {
            x: 0.5 * (self.a.x + self.b.x),
            y: 0.5 * (self.a.y + self.b.y),
        }
    }

    fn reversed(&self) -> Frag {
        Frag {
            a: self.b,
            b: self.a,
        }
    }
}

/// Where a subject fragment sits relative to the clip ring.
#[derive(Clone, Copy, PartialEq)]
enum Side {
    Inside,
    Outside,
    /// On the clip boundary, running the same direction (interiors locally
    /// on the same side of the shared line).
    SharedSame,
    /// On the clip boundary, running opposite (interiors on opposite sides).
    SharedOpposite,
}

pub fn clip_rings(
    subject: &[Point],
    clip: &[Point],
    op: ClipOp,
    eps_len: f64,
) -> Result<ClipOutcome, GeometryError> {
    let s_cuts = cut_params(subject, clip, eps_len);
    let c_cuts = cut_params(clip, subject, eps_len);
    let mut contact = s_cuts.iter().chain(c_cuts.iter()).any(|l| !l.is_empty());

    let s_frags = fragments(subject, &s_cuts, eps_len);
    let c_frags = fragments(clip, &c_cuts, eps_len);

    let mut s_sides = Vec::with_capacity(s_frags.len());
    for f in &s_frags {
        let side = classify(f, clip, eps_len)?;
        if matches!(side, Side::SharedSame | Side::SharedOpposite) {
            contact = true;
        }
        s_sides.push(side);
    }
    // Clip fragments riding the subject boundary are never emitted; the
    // subject's copy of a shared run carries the decision.
    let mut c_inside = Vec::with_capacity(c_frags.len());
    for f in &c_frags {
        let mid = f.mid();
        if dist_to_ring(mid, subject) <= eps_len {
            contact = true;
            c_inside.push(false);
        } else {
            c_inside.push(point_in_ring(mid, subject));
        }
    }

    if !contact {
        // No boundary interaction at all: disjoint or cleanly nested.
        // Classify by an interior point, never a vertex. An interior point of
        // the larger ring can still land inside a ring it contains, so a
        // double hit is disambiguated by area.
        let sp = interior_point(subject).ok_or(GeometryError::DegenerateShape)?;
        let cp = interior_point(clip).ok_or(GeometryError::DegenerateShape)?;
        let s_in_c = point_in_ring(sp, clip);
        let c_in_s = point_in_ring(cp, subject);
        return Ok(match (s_in_c, c_in_s) {
            (false, false) => ClipOutcome::Disjoint,
            (true, false) => ClipOutcome::SubjectInClip,
            (false, true) => ClipOutcome::ClipInSubject,
            (true, true) => {
                if ring_area_signed(subject).abs() <= ring_area_signed(clip).abs() {
                    ClipOutcome::SubjectInClip
                } else {
                    ClipOutcome::ClipInSubject
                }
            }
        });
    }

    let mut picked: Vec<Frag> = Vec::new();
    match op {
        ClipOp::Intersection => {
            for (f, side) in s_frags.iter().zip(&s_sides) {
                if matches!(side, Side::Inside | Side::SharedSame) {
                    picked.push(*f);
                }
            }
            for (f, inside) in c_frags.iter().zip(&c_inside) {
                if *inside {
                    picked.push(*f);
                }
            }
        }
        ClipOp::Difference => {
            for (f, side) in s_frags.iter().zip(&s_sides) {
                if matches!(side, Side::Outside | Side::SharedOpposite) {
                    picked.push(*f);
                }
            }
            for (f, inside) in c_frags.iter().zip(&c_inside) {
                if *inside {
                    picked.push(f.reversed());
                }
            }
        }
    }
    if picked.is_empty() {
        // Touching without any interior exchange: empty intersection or a
        // fully consumed subject, depending on the operation.
        return Ok(ClipOutcome::Pieces(Vec::new()));
    }
    stitch(&picked, eps_len).map(ClipOutcome::Pieces)
}

/// Cut parameters per edge of `ring`, in (0, 1): proper crossings with
/// `other`'s edges, and projections of `other`'s vertices onto collinear
/// overlap runs. The symmetric call supplies the other ring's cuts.
fn cut_params(ring: &[Point], other: &[Point], el: f64) -> Vec<Vec<f64>> {
    let n = ring.len();
    let m = other.len();
    let mut out = vec![Vec::new(); n];
    for i in 0..n {
        let a1 = ring[i];
        let a2 = ring[(i + 1) % n];
        let dax = a2.x - a1.x;
        let day = a2.y - a1.y;
        let la2 = dax * dax + day * day;
        if la2 <= el * el {
            continue;
        }
        for j in 0..m {
            let b1 = other[j];
            let b2 = other[(j + 1) % m];
            let dbx = b2.x - b1.x;
            let dby = b2.y - b1.y;
            let lb2 = dbx * dbx + dby * dby;
            if lb2 <= el * el {
                continue;
            }
            let ex = b1.x - a1.x;
            let ey = b1.y - a1.y;
            let denom = dax * dby - day * dbx;
            if denom.abs() <= (la2 * lb2).sqrt() * 1e-12 {
                // Parallel; on a collinear run, cut at the other edge's ends.
                if (dax * ey - day * ex).abs() <= la2.sqrt() * el {
                    for q in [b1, b2] {
                        let t = ((q.x - a1.x) * dax + (q.y - a1.y) * day) / la2;
                        push_cut(&mut out[i], t);
                    }
                }
            } else {
                let t = (ex * dby - ey * dbx) / denom;
                let u = (ex * day - ey * dax) / denom;
                if (-EPS_ALPHA..=1.0 + EPS_ALPHA).contains(&t)
                    && (-EPS_ALPHA..=1.0 + EPS_ALPHA).contains(&u)
                {
                    push_cut(&mut out[i], t);
                }
            }
        }
    }
    out
}

fn push_cut(list: &mut Vec<f64>, t: f64) {
    if t > EPS_ALPHA && t < 1.0 - EPS_ALPHA && !list.iter().any(|&e| (e - t).abs() <= EPS_ALPHA) {
        list.push(t);
    }
}

fn fragments(ring: &[Point], cuts: &[Vec<f64>], el: f64) -> Vec<Frag> {
    let n = ring.len();
    let mut out = Vec::new();
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let mut ts = cuts[i].clone();
        ts.sort_by(f64::total_cmp);
        let mut prev = a;
        for &t in &ts {
            let p = Point {
                x: a.x + t * (b.x - a.x),
                y: a.y + t * (b.y - a.y),
            };
            push_frag(&mut out, prev, p, el);
            prev = p;
        }
        push_frag(&mut out, prev, b, el);
    }
    out
}

fn push_frag(out: &mut Vec<Frag>, a: Point, b: Point, el: f64) {
    if (b.x - a.x).hypot(b.y - a.y) > el {
        out.push(Frag { a, b });
    }
}

fn classify(f: &Frag, other: &[Point], el: f64) -> Result<Side, GeometryError> {
    let mid = f.mid();
    if dist_to_ring(mid, other) > el {
        return Ok(if point_in_ring(mid, other) {
            Side::Inside
        } else {
            Side::Outside
        });
    }
    // On the other boundary: find the coincident edge and compare directions.
    let dx = f.b.x - f.a.x;
    let dy = f.b.y - f.a.y;
    let m = other.len();
    for j in 0..m {
        let b1 = other[j];
        let b2 = other[(j + 1) % m];
        if dist_point_segment(mid, b1, b2) > el {
            continue;
        }
        let ox = b2.x - b1.x;
        let oy = b2.y - b1.y;
        let scale = ((dx * dx + dy * dy) * (ox * ox + oy * oy)).sqrt();
        if scale <= 0.0 {
            continue;
        }
        if (dx * oy - dy * ox).abs() <= scale * 1e-9 {
            return Ok(if dx * ox + dy * oy > 0.0 {
                Side::SharedSame
            } else {
                Side::SharedOpposite
            });
        }
    }
    Err(GeometryError::CoincidentBoundary)
}

/// Chain the selected fragments into closed rings. Endpoints are merged into
/// nodes within epsilon; at a node with several unused continuations the walk
/// takes the sharpest left turn, which keeps regions that only touch at a
/// point as separate rings.
fn stitch(frags: &[Frag], el: f64) -> Result<Vec<Ring>, GeometryError> {
    let mut nodes: Vec<Point> = Vec::new();
    let mut ends: Vec<(usize, usize)> = Vec::with_capacity(frags.len());
    for f in frags {
        let a = node_id(&mut nodes, f.a, el);
        let b = node_id(&mut nodes, f.b, el);
        ends.push((a, b));
    }
    let mut out_of: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (k, &(a, b)) in ends.iter().enumerate() {
        if a != b {
            out_of[a].push(k);
        }
    }
    let mut used = vec![false; ends.len()];
    let mut rings: Vec<Ring> = Vec::new();
    for start in 0..ends.len() {
        if used[start] || ends[start].0 == ends[start].1 {
            continue;
        }
        let origin = ends[start].0;
        let mut ring: Ring = vec![nodes[origin]];
        let mut e = start;
        used[e] = true;
        let mut steps = 0usize;
        loop {
            steps += 1;
            if steps > ends.len() {
                return Err(GeometryError::OpenTraversal);
            }
            let v = ends[e].1;
            if v == origin {
                break;
            }
            ring.push(nodes[v]);
            let from = nodes[ends[e].0];
            let din = (nodes[v].x - from.x, nodes[v].y - from.y);
            let next = pick_next(&out_of[v], &ends, &nodes, &used, din)
                .ok_or(GeometryError::OpenTraversal)?;
            used[next] = true;
            e = next;
        }
        if ring.len() >= 3 {
            rings.push(ring);
        }
    }
    Ok(rings)
}

fn node_id(nodes: &mut Vec<Point>, p: Point, el: f64) -> usize {
    match nodes
        .iter()
        .position(|q| (q.x - p.x).hypot(q.y - p.y) <= el)
    {
        Some(i) => i,
        None => {
            nodes.push(p);
            nodes.len() - 1
        }
    }
}

fn pick_next(
    candidates: &[usize],
    ends: &[(usize, usize)],
    nodes: &[Point],
    used: &[bool],
    din: (f64, f64),
) -> Option<usize> {
    let rx = -din.0;
    let ry = -din.1;
    let mut best: Option<(f64, usize)> = None;
    for &k in candidates {
        if used[k] {
            continue;
        }
        let a = nodes[ends[k].0];
        let b = nodes[ends[k].1];
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        // Counter-clockwise angle from the reversed incoming direction.
        let mut ang = (rx * dy - ry * dx).atan2(rx * dx + ry * dy);
        if ang <= 0.0 {
            ang += std::f64::consts::TAU;
        }
        if best.map_or(true, |(ba, _)| ang > ba) {
            best = Some((ang, k));
        }
    }
    best.map(|(_, k)| k)
}
