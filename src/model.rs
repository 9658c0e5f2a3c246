use serde::{Deserialize, Serialize};

pub type CellId = u32;
pub type DraftId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A simple closed ring; the closing edge back to the first vertex is implicit.
pub type Ring = Vec<Point>;

/// One or more mutually non-overlapping rings treated as a single logical area.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygon {
    pub rings: Vec<Ring>,
}

impl MultiPolygon {
    pub fn from_ring(ring: Ring) -> Self {
        MultiPolygon { rings: vec![ring] }
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Axis-aligned rectangle, counter-clockwise.
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        MultiPolygon::from_ring(vec![
            Point { x: x0, y: y0 },
            Point { x: x1, y: y0 },
            Point { x: x1, y: y1 },
            Point { x: x0, y: y1 },
        ])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellLevel {
    Site,
    Zone,
    Subzone,
    Plot,
}

impl CellLevel {
    pub fn child(self) -> Option<CellLevel> {
        match self {
            CellLevel::Site => Some(CellLevel::Zone),
            CellLevel::Zone => Some(CellLevel::Subzone),
            CellLevel::Subzone => Some(CellLevel::Plot),
            CellLevel::Plot => None,
        }
    }
}

/// One slot in the site/zone/subzone/plot hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub level: CellLevel,
    pub parent: Option<CellId>,
    pub geometry: MultiPolygon,
}

/// Which phase of the multi-step site creation wizard the user is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditStep {
    Boundary,
    Zones,
    Subzones,
    Plots,
}

impl EditStep {
    pub fn level(self) -> CellLevel {
        match self {
            EditStep::Boundary => CellLevel::Site,
            EditStep::Zones => CellLevel::Zone,
            EditStep::Subzones => CellLevel::Subzone,
            EditStep::Plots => CellLevel::Plot,
        }
    }
}
