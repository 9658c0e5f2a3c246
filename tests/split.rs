use siteplot::algorithms::split::{apply_split, split, SplitResult};
use siteplot::geometry::kernel::{area, GeometryError};
use siteplot::model::{CellLevel, MultiPolygon, Point};
use siteplot::partition::SiteMap;

fn square(x: f64, y: f64, side: f64) -> MultiPolygon {
    MultiPolygon::rect(x, y, x + side, y + side)
}

fn site_with(cells: &[MultiPolygon]) -> SiteMap {
    let mut site = SiteMap::new();
    for geom in cells {
        site.add_cell(CellLevel::Zone, None, geom.clone()).unwrap();
    }
    site
}

fn zone_cells(site: &SiteMap) -> Vec<siteplot::model::Cell> {
    site.partition(CellLevel::Zone, None)
        .map(|p| p.cells().to_vec())
        .unwrap_or_default()
}

fn total_area(site: &SiteMap) -> f64 {
    site.cells().map(|c| area(&c.geometry)).sum()
}

#[test]
fn disjoint_drawn_shape_is_no_change() {
    let site = site_with(&[square(0.0, 0.0, 10.0)]);
    let result = split(&zone_cells(&site), &square(50.0, 50.0, 10.0)).unwrap();
    assert_eq!(result, SplitResult::NoChange);
}

#[test]
fn partial_overlap_replaces_one_cell() {
    // Square at origin, new square drawn half over it: the old cell shrinks
    // to an L of 75, the 25 overlap is claimed, the 75 outside is greenfield.
    let site = site_with(&[square(0.0, 0.0, 10.0)]);
    let drawn = square(5.0, 5.0, 10.0);
    let result = split(&zone_cells(&site), &drawn).unwrap();
    match &result {
        SplitResult::Replaced {
            remainder,
            claimed,
            greenfield,
            ..
        } => {
            assert!((area(remainder.as_ref().unwrap()) - 75.0).abs() < 1e-6);
            assert!((area(claimed) - 25.0).abs() < 1e-6);
            assert!((area(greenfield.as_ref().unwrap()) - 75.0).abs() < 1e-6);
        }
        other => panic!("expected Replaced, got {other:?}"),
    }
}

#[test]
fn fully_consumed_cell_has_no_remainder() {
    let site = site_with(&[square(2.0, 2.0, 4.0)]);
    let drawn = square(0.0, 0.0, 10.0);
    let result = split(&zone_cells(&site), &drawn).unwrap();
    match &result {
        SplitResult::Replaced {
            remainder,
            claimed,
            greenfield,
            ..
        } => {
            assert_eq!(*remainder, None);
            assert!((area(claimed) - 16.0).abs() < 1e-6);
            assert!((area(greenfield.as_ref().unwrap()) - 84.0).abs() < 1e-6);
        }
        other => panic!("expected Replaced, got {other:?}"),
    }
}

#[test]
fn drawn_inside_one_cell_claims_without_greenfield() {
    let site = site_with(&[square(0.0, 0.0, 10.0)]);
    let drawn = square(1.0, 1.0, 3.0);
    let result = split(&zone_cells(&site), &drawn).unwrap();
    match &result {
        SplitResult::Replaced {
            remainder,
            claimed,
            greenfield,
            ..
        } => {
            assert!((area(remainder.as_ref().unwrap()) - 91.0).abs() < 1e-6);
            assert!((area(claimed) - 9.0).abs() < 1e-6);
            assert_eq!(*greenfield, None);
        }
        other => panic!("expected Replaced, got {other:?}"),
    }
}

#[test]
fn spanning_two_cells_splits_both() {
    // Two edge-adjacent squares; a bar across the seam takes a bite out of
    // each and claims the union of the bites.
    let site = site_with(&[square(0.0, 0.0, 10.0), square(10.0, 0.0, 10.0)]);
    let drawn = MultiPolygon::rect(5.0, 2.0, 15.0, 8.0);
    let result = split(&zone_cells(&site), &drawn).unwrap();
    match &result {
        SplitResult::Split {
            remainders,
            claimed,
            greenfield,
        } => {
            assert_eq!(remainders.len(), 2);
            for (_, rem) in remainders {
                assert!((area(rem.as_ref().unwrap()) - 70.0).abs() < 1e-6);
            }
            assert!((area(claimed) - 60.0).abs() < 1e-6);
            assert_eq!(*greenfield, None);
        }
        other => panic!("expected Split, got {other:?}"),
    }
}

#[test]
fn degenerate_drawn_shape_is_rejected() {
    let site = site_with(&[square(0.0, 0.0, 10.0)]);
    let line = MultiPolygon::from_ring(vec![
        Point { x: 0.0, y: 0.0 },
        Point { x: 5.0, y: 0.0 },
        Point { x: 10.0, y: 0.0 },
    ]);
    assert_eq!(
        split(&zone_cells(&site), &line),
        Err(GeometryError::DegenerateShape)
    );
}

#[test]
fn apply_split_conserves_total_area() {
    let mut site = site_with(&[square(0.0, 0.0, 10.0)]);
    let before = total_area(&site);
    let drawn = square(5.0, 5.0, 10.0);
    let result = split(&zone_cells(&site), &drawn).unwrap();
    let created = apply_split(&mut site, CellLevel::Zone, None, &drawn, &result).unwrap();

    // Old 100 plus the 75 of drawn area outside the old cell.
    assert!((total_area(&site) - (before + 75.0)).abs() < 1e-6);
    assert_eq!(created.len(), 2); // claimed + greenfield
    assert_eq!(zone_cells(&site).len(), 3);
}

#[test]
fn apply_split_removes_fully_consumed_cells() {
    let mut site = site_with(&[square(2.0, 2.0, 4.0)]);
    let consumed_id = zone_cells(&site)[0].id;
    let drawn = square(0.0, 0.0, 10.0);
    let result = split(&zone_cells(&site), &drawn).unwrap();
    apply_split(&mut site, CellLevel::Zone, None, &drawn, &result).unwrap();

    assert!(site.cell(consumed_id).is_none());
    assert!((total_area(&site) - 100.0).abs() < 1e-6);
}

#[test]
fn apply_split_no_change_adds_the_drawn_shape() {
    let mut site = site_with(&[square(0.0, 0.0, 10.0)]);
    let drawn = square(50.0, 50.0, 10.0);
    let result = split(&zone_cells(&site), &drawn).unwrap();
    let created = apply_split(&mut site, CellLevel::Zone, None, &drawn, &result).unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(site.cell(created[0]).unwrap().geometry, drawn);
    assert_eq!(zone_cells(&site).len(), 2);
}

#[test]
fn failed_split_leaves_partition_untouched() {
    // The kernel refuses the drawn shape; the caller sees the error before
    // any mutation happens.
    let site = site_with(&[square(0.0, 0.0, 10.0)]);
    let bad = MultiPolygon::from_ring(vec![
        Point { x: 2.0, y: 3.0 },
        Point { x: 8.0, y: 3.0 },
        Point { x: 5.0, y: 3.0 },
    ]);
    let snapshot = site.clone();
    assert!(split(&zone_cells(&site), &bad).is_err());
    assert_eq!(site, snapshot);
}

#[test]
fn siblings_stay_disjoint_after_split() {
    let mut site = site_with(&[square(0.0, 0.0, 10.0), square(10.0, 0.0, 10.0)]);
    let drawn = MultiPolygon::rect(5.0, 2.0, 15.0, 8.0);
    let result = split(&zone_cells(&site), &drawn).unwrap();
    apply_split(&mut site, CellLevel::Zone, None, &drawn, &result).unwrap();

    let cells = zone_cells(&site);
    for i in 0..cells.len() {
        for j in (i + 1)..cells.len() {
            let overlap =
                siteplot::geometry::kernel::intersect(&cells[i].geometry, &cells[j].geometry)
                    .unwrap();
            let a = overlap.map(|o| area(&o)).unwrap_or(0.0);
            assert!(a < 1e-6, "cells {i} and {j} overlap by {a}");
        }
    }
}
