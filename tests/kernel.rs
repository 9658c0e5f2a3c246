use siteplot::geometry::kernel::{area, difference, intersect};
use siteplot::model::{MultiPolygon, Point};

fn pt(x: f64, y: f64) -> Point {
    Point { x, y }
}

fn square(x: f64, y: f64, side: f64) -> MultiPolygon {
    MultiPolygon::rect(x, y, x + side, y + side)
}

fn assert_area(p: &MultiPolygon, expected: f64) {
    let a = area(p);
    assert!(
        (a - expected).abs() < 1e-6,
        "expected area {expected}, got {a}"
    );
}

#[test]
fn intersect_overlapping_squares() {
    let a = square(0.0, 0.0, 10.0);
    let b = square(5.0, 5.0, 10.0);
    let out = intersect(&a, &b).unwrap().unwrap();
    assert_area(&out, 25.0);
}

#[test]
fn intersect_disjoint_squares_is_none() {
    let a = square(0.0, 0.0, 10.0);
    let b = square(20.0, 20.0, 10.0);
    assert_eq!(intersect(&a, &b).unwrap(), None);
}

#[test]
fn intersect_contained_square_is_inner() {
    let outer = square(0.0, 0.0, 10.0);
    let inner = square(2.0, 2.0, 4.0);
    let out = intersect(&outer, &inner).unwrap().unwrap();
    assert_area(&out, 16.0);
}

#[test]
fn intersect_identical_squares_is_full() {
    let a = square(0.0, 0.0, 10.0);
    let out = intersect(&a, &a.clone()).unwrap().unwrap();
    assert_area(&out, 100.0);
}

#[test]
fn intersect_edge_adjacent_squares_is_none() {
    // Shared edge, disjoint interiors.
    let a = square(0.0, 0.0, 10.0);
    let b = square(10.0, 0.0, 10.0);
    assert_eq!(intersect(&a, &b).unwrap(), None);
}

#[test]
fn difference_partial_overlap_leaves_l_shape() {
    let a = square(0.0, 0.0, 10.0);
    let b = square(5.0, 5.0, 10.0);
    let out = difference(&a, &b).unwrap().unwrap();
    assert_area(&out, 75.0);
}

#[test]
fn difference_fully_covered_is_none() {
    let a = square(2.0, 2.0, 4.0);
    let b = square(0.0, 0.0, 10.0);
    assert_eq!(difference(&a, &b).unwrap(), None);
}

#[test]
fn difference_identical_squares_is_none() {
    let a = square(0.0, 0.0, 10.0);
    assert_eq!(difference(&a, &a.clone()).unwrap(), None);
}

#[test]
fn difference_disjoint_keeps_subject() {
    let a = square(0.0, 0.0, 10.0);
    let b = square(20.0, 0.0, 5.0);
    let out = difference(&a, &b).unwrap().unwrap();
    assert_area(&out, 100.0);
}

#[test]
fn difference_interior_hole_is_cut_into_simple_pieces() {
    // Subtracting a shape strictly inside must not produce a ring with a
    // hole; the remainder is split into simple rings of the right total area.
    let a = square(0.0, 0.0, 10.0);
    let b = square(4.0, 4.0, 2.0);
    let out = difference(&a, &b).unwrap().unwrap();
    assert!(out.rings.len() >= 2, "hole must yield multiple rings");
    assert_area(&out, 96.0);
}

#[test]
fn difference_bisects_concave_subject() {
    // U shape: a square with a notch cut from the top middle. A vertical bar
    // down through the base under the notch severs the two halves.
    let u = MultiPolygon::from_ring(vec![
        pt(0.0, 0.0),
        pt(30.0, 0.0),
        pt(30.0, 30.0),
        pt(20.0, 30.0),
        pt(20.0, 10.0),
        pt(10.0, 10.0),
        pt(10.0, 30.0),
        pt(0.0, 30.0),
    ]);
    let bar = MultiPolygon::rect(12.0, -5.0, 18.0, 12.0);
    let out = difference(&u, &bar).unwrap().unwrap();
    assert_eq!(out.rings.len(), 2);
    // U area 700 minus the 6x10 of the bar that lies inside it.
    assert_area(&out, 640.0);
}

#[test]
fn degenerate_ring_is_ignored() {
    let line = MultiPolygon::from_ring(vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(20.0, 0.0)]);
    let b = square(0.0, 0.0, 10.0);
    assert_eq!(intersect(&line, &b).unwrap(), None);
    assert_eq!(difference(&line, &b).unwrap(), None);
}

#[test]
fn collinear_overlap_with_crossings_resolves() {
    // One edge runs along the subject's bottom edge while the sides properly
    // cross the top; the shared run is threaded, not refused.
    let a = square(0.0, 0.0, 10.0);
    let b = MultiPolygon::from_ring(vec![
        pt(2.0, 0.0),
        pt(8.0, 0.0),
        pt(8.0, 15.0),
        pt(2.0, 15.0),
    ]);
    let overlap = intersect(&a, &b).unwrap().unwrap();
    assert_area(&overlap, 60.0);
    let rem = difference(&a, &b).unwrap().unwrap();
    assert_eq!(rem.rings.len(), 2);
    assert_area(&rem, 40.0);
}

#[test]
fn overlap_along_a_shared_baseline_resolves() {
    // Two rectangles whose bottom edges lie on the same line, overlapping by
    // half: the only boundary crossings are T-junctions and collinear runs.
    let a = square(0.0, 0.0, 10.0);
    let b = MultiPolygon::rect(5.0, 0.0, 15.0, 10.0);
    let overlap = intersect(&a, &b).unwrap().unwrap();
    assert_area(&overlap, 50.0);
    let rem = difference(&a, &b).unwrap().unwrap();
    assert_area(&rem, 50.0);
}

#[test]
fn multi_ring_area_sums() {
    let p = MultiPolygon {
        rings: vec![
            square(0.0, 0.0, 10.0).rings.remove(0),
            square(20.0, 0.0, 5.0).rings.remove(0),
        ],
    };
    assert_area(&p, 125.0);
}
