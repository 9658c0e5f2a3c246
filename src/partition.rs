//! The hierarchical partition tree: site, zones, subzones, plots.
//!
//! Each partition holds the sibling cells of one level under one parent.
//! Consistency (no sibling overlap beyond epsilon) is re-checked on every
//! add/replace against siblings only; each level's consistency is independent
//! of other levels' internal geometry. Lookups are linear scans, which is
//! fine at the expected scale of tens to low hundreds of cells.

use crate::geometry::kernel::{self, GeometryError};
use crate::model::{Cell, CellId, CellLevel, MultiPolygon};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Clone, Debug, PartialEq)]
pub enum OverlapError {
    #[error("cell {candidate} overlaps sibling {sibling} by area {area}")]
    Overlap {
        candidate: CellId,
        sibling: CellId,
        area: f64,
    },
    #[error("no cell with id {0}")]
    UnknownCell(CellId),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Sibling cells at one hierarchy level sharing a parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub(crate) level: CellLevel,
    pub(crate) parent: Option<CellId>,
    pub(crate) cells: Vec<Cell>,
}

impl Partition {
    pub fn level(&self) -> CellLevel {
        self.level
    }

    pub fn parent(&self) -> Option<CellId> {
        self.parent
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// The whole cell tree of one site draft.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteMap {
    pub(crate) next_cell: CellId,
    pub(crate) partitions: Vec<Partition>,
}

impl SiteMap {
    pub fn new() -> Self {
        SiteMap::default()
    }

    /// The root site cell, when one has been drawn.
    pub fn boundary(&self) -> Option<&Cell> {
        self.partition(CellLevel::Site, None)
            .and_then(|p| p.cells.first())
    }

    pub fn partition(&self, level: CellLevel, parent: Option<CellId>) -> Option<&Partition> {
        self.partitions
            .iter()
            .find(|p| p.level == level && p.parent == parent)
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.partitions
            .iter()
            .flat_map(|p| p.cells.iter())
            .find(|c| c.id == id)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.partitions.iter().flat_map(|p| p.cells.iter())
    }

    /// Child partitions of a cell, one per populated child level.
    pub fn child_partitions(&self, id: CellId) -> Vec<&Partition> {
        self.partitions
            .iter()
            .filter(|p| p.parent == Some(id))
            .collect()
    }

    /// Append a cell, rejecting any overlap with an existing sibling beyond
    /// epsilon. The parent cell must exist when one is named.
    pub fn add_cell(
        &mut self,
        level: CellLevel,
        parent: Option<CellId>,
        geometry: MultiPolygon,
    ) -> Result<CellId, OverlapError> {
        if let Some(pid) = parent {
            if self.cell(pid).is_none() {
                return Err(OverlapError::UnknownCell(pid));
            }
        }
        // Validate before allocating, so a rejected add burns no id and
        // leaves no empty partition behind.
        if let Some(p) = self.partition(level, parent) {
            check_disjoint(self.next_cell, &geometry, &p.cells, None)?;
        }
        let id = self.alloc();
        let idx = self.ensure_partition(level, parent);
        self.partitions[idx].cells.push(Cell {
            id,
            level,
            parent,
            geometry,
        });
        debug!(id, ?level, ?parent, "cell added");
        Ok(id)
    }

    /// Atomically swap a cell's geometry, re-validating against its siblings
    /// (not itself). The partition is untouched on failure.
    pub fn replace_cell(
        &mut self,
        id: CellId,
        geometry: MultiPolygon,
    ) -> Result<(), OverlapError> {
        let Some(idx) = self
            .partitions
            .iter()
            .position(|p| p.cells.iter().any(|c| c.id == id))
        else {
            return Err(OverlapError::UnknownCell(id));
        };
        check_disjoint(id, &geometry, &self.partitions[idx].cells, Some(id))?;
        if let Some(cell) = self.partitions[idx].cells.iter_mut().find(|c| c.id == id) {
            cell.geometry = geometry;
        }
        debug!(id, "cell geometry replaced");
        Ok(())
    }

    /// Remove a cell, cascade through its descendant partitions, and drop any
    /// partition the removal emptied. Idempotent: removing an unknown id is a
    /// no-op and returns false.
    pub fn remove_cell(&mut self, id: CellId) -> bool {
        let mut found = false;
        for p in &mut self.partitions {
            let before = p.cells.len();
            p.cells.retain(|c| c.id != id);
            if p.cells.len() != before {
                found = true;
            }
        }
        if !found {
            return false;
        }
        // Cascade: drop every partition parented (transitively) to the cell.
        let mut doomed = vec![id];
        while let Some(pid) = doomed.pop() {
            let mut orphans: Vec<CellId> = Vec::new();
            self.partitions.retain(|p| {
                if p.parent == Some(pid) {
                    orphans.extend(p.cells.iter().map(|c| c.id));
                    false
                } else {
                    true
                }
            });
            doomed.extend(orphans);
        }
        // A partition that just lost its last cell goes with it.
        self.partitions.retain(|p| !p.cells.is_empty());
        debug!(id, "cell removed");
        true
    }

    fn alloc(&mut self) -> CellId {
        let id = self.next_cell;
        self.next_cell += 1;
        id
    }

    pub(crate) fn ensure_partition(&mut self, level: CellLevel, parent: Option<CellId>) -> usize {
        if let Some(idx) = self
            .partitions
            .iter()
            .position(|p| p.level == level && p.parent == parent)
        {
            return idx;
        }
        self.partitions.push(Partition {
            level,
            parent,
            cells: Vec::new(),
        });
        self.partitions.len() - 1
    }
}

/// O(n) sibling sweep: the candidate may touch siblings along shared edges
/// but must not overlap any of them by more than the epsilon sliver.
fn check_disjoint(
    candidate: CellId,
    geometry: &MultiPolygon,
    siblings: &[Cell],
    skip: Option<CellId>,
) -> Result<(), OverlapError> {
    for sib in siblings {
        if Some(sib.id) == skip {
            continue;
        }
        if let Some(overlap) = kernel::intersect(geometry, &sib.geometry)? {
            let a = kernel::area(&overlap);
            if a > kernel::overlap_area_eps(geometry, &sib.geometry) {
                warn!(candidate, sibling = sib.id, area = a, "overlap rejected");
                return Err(OverlapError::Overlap {
                    candidate,
                    sibling: sib.id,
                    area: a,
                });
            }
        }
    }
    Ok(())
}
