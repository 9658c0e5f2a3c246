use siteplot::model::{CellLevel, MultiPolygon};
use siteplot::partition::{OverlapError, SiteMap};

fn square(x: f64, y: f64, side: f64) -> MultiPolygon {
    MultiPolygon::rect(x, y, x + side, y + side)
}

#[test]
fn add_and_look_up_cells() {
    let mut site = SiteMap::new();
    let a = site.add_cell(CellLevel::Site, None, square(0.0, 0.0, 100.0)).unwrap();
    let b = site.add_cell(CellLevel::Zone, Some(a), square(0.0, 0.0, 50.0)).unwrap();
    assert_ne!(a, b);
    assert_eq!(site.boundary().unwrap().id, a);
    assert_eq!(site.cell(b).unwrap().parent, Some(a));
    assert_eq!(site.cells().count(), 2);
}

#[test]
fn overlapping_sibling_is_rejected() {
    let mut site = SiteMap::new();
    let a = site.add_cell(CellLevel::Zone, None, square(0.0, 0.0, 10.0)).unwrap();
    let err = site
        .add_cell(CellLevel::Zone, None, square(5.0, 5.0, 10.0))
        .unwrap_err();
    match err {
        OverlapError::Overlap { sibling, area, .. } => {
            assert_eq!(sibling, a);
            assert!((area - 25.0).abs() < 1e-6);
        }
        other => panic!("expected overlap, got {other:?}"),
    }
    // The failed add must not leave a cell behind.
    assert_eq!(site.cells().count(), 1);
}

#[test]
fn overlap_on_a_shared_baseline_is_measured() {
    // Drawn shapes clipped to the same parent frame end up with edges on the
    // same line; the overlap must still be measured, not refused.
    let mut site = SiteMap::new();
    let a = site.add_cell(CellLevel::Zone, None, square(0.0, 0.0, 10.0)).unwrap();
    let err = site
        .add_cell(CellLevel::Zone, None, MultiPolygon::rect(5.0, 0.0, 15.0, 10.0))
        .unwrap_err();
    match err {
        OverlapError::Overlap { sibling, area, .. } => {
            assert_eq!(sibling, a);
            assert!((area - 50.0).abs() < 1e-6);
        }
        other => panic!("expected overlap, got {other:?}"),
    }
}

#[test]
fn edge_adjacent_siblings_are_accepted() {
    let mut site = SiteMap::new();
    site.add_cell(CellLevel::Zone, None, square(0.0, 0.0, 10.0)).unwrap();
    site.add_cell(CellLevel::Zone, None, square(10.0, 0.0, 10.0)).unwrap();
    site.add_cell(CellLevel::Zone, None, square(0.0, 10.0, 10.0)).unwrap();
    assert_eq!(site.cells().count(), 3);
}

#[test]
fn unknown_parent_is_rejected() {
    let mut site = SiteMap::new();
    assert_eq!(
        site.add_cell(CellLevel::Zone, Some(42), square(0.0, 0.0, 10.0)),
        Err(OverlapError::UnknownCell(42))
    );
}

#[test]
fn replace_validates_against_other_siblings_only() {
    let mut site = SiteMap::new();
    let a = site.add_cell(CellLevel::Zone, None, square(0.0, 0.0, 10.0)).unwrap();
    let b = site.add_cell(CellLevel::Zone, None, square(10.0, 0.0, 10.0)).unwrap();

    // Growing a over its own old footprint is fine.
    site.replace_cell(a, square(0.0, 0.0, 8.0)).unwrap();
    // Growing a into b is not, and leaves a unchanged.
    let err = site.replace_cell(a, square(0.0, 0.0, 15.0)).unwrap_err();
    assert!(matches!(err, OverlapError::Overlap { sibling, .. } if sibling == b));
    assert_eq!(site.cell(a).unwrap().geometry, square(0.0, 0.0, 8.0));
}

#[test]
fn replace_unknown_cell_fails() {
    let mut site = SiteMap::new();
    assert_eq!(
        site.replace_cell(7, square(0.0, 0.0, 1.0)),
        Err(OverlapError::UnknownCell(7))
    );
}

#[test]
fn remove_cascades_through_descendants() {
    let mut site = SiteMap::new();
    let root = site.add_cell(CellLevel::Site, None, square(0.0, 0.0, 100.0)).unwrap();
    let zone = site.add_cell(CellLevel::Zone, Some(root), square(0.0, 0.0, 50.0)).unwrap();
    let sub = site
        .add_cell(CellLevel::Subzone, Some(zone), square(0.0, 0.0, 20.0))
        .unwrap();
    let plot = site
        .add_cell(CellLevel::Plot, Some(sub), square(0.0, 0.0, 5.0))
        .unwrap();

    assert!(site.remove_cell(zone));
    assert!(site.cell(root).is_some());
    assert!(site.cell(zone).is_none());
    assert!(site.cell(sub).is_none());
    assert!(site.cell(plot).is_none());
    assert!(site.child_partitions(root).is_empty());
}

#[test]
fn removing_the_last_cell_drops_its_partition() {
    let mut site = SiteMap::new();
    let root = site.add_cell(CellLevel::Site, None, square(0.0, 0.0, 100.0)).unwrap();
    let zone = site.add_cell(CellLevel::Zone, Some(root), square(0.0, 0.0, 50.0)).unwrap();

    assert!(site.remove_cell(zone));
    assert!(site.partition(CellLevel::Zone, Some(root)).is_none());
    assert!(site.child_partitions(root).is_empty());
}

#[test]
fn rejected_add_allocates_nothing() {
    let mut site = SiteMap::new();
    let a = site.add_cell(CellLevel::Zone, None, square(0.0, 0.0, 10.0)).unwrap();
    assert!(site.add_cell(CellLevel::Zone, None, square(5.0, 5.0, 10.0)).is_err());
    assert!(site
        .add_cell(CellLevel::Subzone, Some(99), square(0.0, 0.0, 1.0))
        .is_err());

    // Neither failure burned an id or left a partition behind.
    let b = site.add_cell(CellLevel::Zone, None, square(20.0, 0.0, 10.0)).unwrap();
    assert_eq!(b, a + 1);
    assert!(site.partition(CellLevel::Subzone, Some(99)).is_none());
}

#[test]
fn remove_is_idempotent() {
    let mut site = SiteMap::new();
    let a = site.add_cell(CellLevel::Zone, None, square(0.0, 0.0, 10.0)).unwrap();
    assert!(site.remove_cell(a));
    assert!(!site.remove_cell(a));
    assert!(!site.remove_cell(999));
}

#[test]
fn site_map_serde_round_trip() {
    let mut site = SiteMap::new();
    let root = site.add_cell(CellLevel::Site, None, square(0.0, 0.0, 100.0)).unwrap();
    site.add_cell(CellLevel::Zone, Some(root), square(0.0, 0.0, 40.0)).unwrap();

    let json = serde_json::to_string(&site).unwrap();
    let back: SiteMap = serde_json::from_str(&json).unwrap();
    assert_eq!(site, back);
}
