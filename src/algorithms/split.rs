//! Split Engine: reconcile a freshly drawn shape against existing cells.
//!
//! The engine turns "user drew one shape" into a geometrically valid
//! partition delta: which cells were intersected, what their subtracted
//! remainders are, and what new cell(s) result. Application is all-or-nothing;
//! a kernel failure anywhere leaves the partition unchanged and the caller
//! discards the drawn shape.

use crate::geometry::kernel::{self, GeometryError};
use crate::model::{Cell, CellId, CellLevel, MultiPolygon, Ring};
use crate::partition::{OverlapError, SiteMap};
use tracing::debug;

#[derive(Clone, Debug, PartialEq)]
pub enum SplitResult {
    /// The drawn shape overlaps no existing cell; the caller simply adds it.
    NoChange,
    /// Exactly one cell was overlapped. Its remainder replaces it (`None`
    /// means fully consumed), the overlap becomes the claimed new cell.
    Replaced {
        cell: CellId,
        remainder: Option<MultiPolygon>,
        claimed: MultiPolygon,
        greenfield: Option<MultiPolygon>,
    },
    /// Several cells were each partially overlapped; every one gets its
    /// remainder and the union of intersected pieces is one claimed cell.
    Split {
        remainders: Vec<(CellId, Option<MultiPolygon>)>,
        claimed: MultiPolygon,
        greenfield: Option<MultiPolygon>,
    },
}

impl SplitResult {
    /// Portion of the drawn shape that fell outside all existing cells.
    pub fn greenfield(&self) -> Option<&MultiPolygon> {
        match self {
            SplitResult::NoChange => None,
            SplitResult::Replaced { greenfield, .. } => greenfield.as_ref(),
            SplitResult::Split { greenfield, .. } => greenfield.as_ref(),
        }
    }
}

/// Compute the geometric delta of `drawn` against `existing`, in storage order.
pub fn split(existing: &[Cell], drawn: &MultiPolygon) -> Result<SplitResult, GeometryError> {
    let drawn_area = kernel::area(drawn);
    let eps = kernel::shape_area_eps(drawn);
    if drawn_area <= eps {
        return Err(GeometryError::DegenerateShape);
    }

    let mut remainders: Vec<(CellId, Option<MultiPolygon>)> = Vec::new();
    let mut claimed_rings: Vec<Ring> = Vec::new();
    let mut overlap_area = 0.0;
    for cell in existing {
        let Some(overlap) = kernel::intersect(drawn, &cell.geometry)? else {
            continue;
        };
        let oa = kernel::area(&overlap);
        if oa <= kernel::overlap_area_eps(drawn, &cell.geometry) {
            continue;
        }
        overlap_area += oa;
        claimed_rings.extend(overlap.rings);
        // A `None` remainder means the cell is fully consumed and removed
        // outright, never replaced with an empty shape.
        let remainder = kernel::difference(&cell.geometry, drawn)?;
        remainders.push((cell.id, remainder));
    }

    if remainders.is_empty() {
        debug!("split: drawn shape touches no existing cell");
        return Ok(SplitResult::NoChange);
    }

    // Overlap pieces come from pairwise-disjoint cells, so they concatenate
    // into one claimed area without a union pass.
    let claimed = MultiPolygon {
        rings: claimed_rings,
    };

    let mut greenfield = None;
    if drawn_area > overlap_area + eps {
        let affected: Vec<CellId> = remainders.iter().map(|(id, _)| *id).collect();
        let mut left = Some(drawn.clone());
        for cell in existing.iter().filter(|c| affected.contains(&c.id)) {
            left = match left {
                Some(l) => kernel::difference(&l, &cell.geometry)?,
                None => break,
            };
        }
        greenfield = left.filter(|g| kernel::area(g) > eps);
    }

    debug!(
        affected = remainders.len(),
        claimed_rings = claimed.rings.len(),
        greenfield = greenfield.is_some(),
        "split computed"
    );
    if let [(cell, remainder)] = &remainders[..] {
        let (cell, remainder) = (*cell, remainder.clone());
        Ok(SplitResult::Replaced {
            cell,
            remainder,
            claimed,
            greenfield,
        })
    } else {
        Ok(SplitResult::Split {
            remainders,
            claimed,
            greenfield,
        })
    }
}

/// Apply a split to one partition as a single atomic transaction: remainders
/// replace their cells (or remove fully consumed ones), then the claimed and
/// greenfield pieces are added. Any validation failure leaves the site
/// untouched. Returns the ids of the cells the split created.
pub fn apply_split(
    site: &mut SiteMap,
    level: CellLevel,
    parent: Option<CellId>,
    drawn: &MultiPolygon,
    result: &SplitResult,
) -> Result<Vec<CellId>, OverlapError> {
    match result {
        SplitResult::NoChange => {
            let id = site.add_cell(level, parent, drawn.clone())?;
            Ok(vec![id])
        }
        SplitResult::Replaced {
            cell,
            remainder,
            claimed,
            greenfield,
        } => {
            let remainders = vec![(*cell, remainder.clone())];
            commit(site, level, parent, &remainders, claimed, greenfield.as_ref())
        }
        SplitResult::Split {
            remainders,
            claimed,
            greenfield,
        } => commit(site, level, parent, remainders, claimed, greenfield.as_ref()),
    }
}

fn commit(
    site: &mut SiteMap,
    level: CellLevel,
    parent: Option<CellId>,
    remainders: &[(CellId, Option<MultiPolygon>)],
    claimed: &MultiPolygon,
    greenfield: Option<&MultiPolygon>,
) -> Result<Vec<CellId>, OverlapError> {
    let mut staged = site.clone();
    for (id, remainder) in remainders {
        match remainder {
            Some(geom) => staged.replace_cell(*id, geom.clone())?,
            None => {
                staged.remove_cell(*id);
            }
        }
    }
    let mut created = vec![staged.add_cell(level, parent, claimed.clone())?];
    if let Some(g) = greenfield {
        created.push(staged.add_cell(level, parent, g.clone())?);
    }
    *site = staged;
    Ok(created)
}
