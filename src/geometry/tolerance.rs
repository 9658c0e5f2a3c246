// Centralized tolerances for robust partition geometry

pub const EPS_REL: f64 = 1e-9;      // relative tolerance vs bounding-box diagonal
pub const EPS_ABS: f64 = 1e-12;     // floor when the diagonal is tiny
pub const EPS_ALPHA: f64 = 1e-9;    // clip-parameter slack along an edge
pub const MIN_RING_VERTS: usize = 3;

/// Area epsilon scaled to the working extent: slivers below this count as "no overlap".
#[inline]
pub fn area_eps(diag: f64) -> f64 {
    (EPS_REL * diag * diag).max(EPS_ABS)
}

/// Length epsilon scaled to the working extent: points closer than this coincide.
#[inline]
pub fn len_eps(diag: f64) -> f64 {
    (EPS_REL * diag).max(EPS_ABS)
}

#[inline]
pub fn near_zero(x: f64, eps: f64) -> bool {
    x.abs() <= eps
}
