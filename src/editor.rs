//! Editor state machine over one interactive editing session.
//!
//! The rendering surface emits typed gesture events into the session; the
//! machine decides which gestures are legal in the current state and which
//! split/partition operation they trigger. The single-active-shape rule is a
//! guard here: starting a new polygon while another draw is pending discards
//! the pending shape, so at most one uncommitted shape ever exists.

use crate::algorithms::split::{apply_split, split};
use crate::geometry::kernel::{self, GeometryError};
use crate::model::{Cell, CellId, CellLevel, MultiPolygon};
use crate::partition::{OverlapError, SiteMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorState {
    /// No shape at the current hierarchy scope yet.
    NoBoundary,
    /// The user is drawing the very first shape.
    CreatingBoundary,
    /// Finished geometry exists; nothing is selected.
    BoundaryNotSelected,
    /// A cell is selected.
    BoundarySelected(CellId),
    /// The selected cell's vertices are being reshaped live.
    EditingBoundary(CellId),
    /// A brand-new shape is being drawn for splitting against existing cells.
    ReplacingBoundary,
}

impl EditorState {
    fn name(self) -> &'static str {
        match self {
            EditorState::NoBoundary => "NoBoundary",
            EditorState::CreatingBoundary => "CreatingBoundary",
            EditorState::BoundaryNotSelected => "BoundaryNotSelected",
            EditorState::BoundarySelected(_) => "BoundarySelected",
            EditorState::EditingBoundary(_) => "EditingBoundary",
            EditorState::ReplacingBoundary => "ReplacingBoundary",
        }
    }

    fn has_geometry(self) -> bool {
        !matches!(self, EditorState::NoBoundary | EditorState::CreatingBoundary)
    }
}

/// Gesture events emitted by the rendering collaborator.
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    DrawStarted,
    ShapeDrawn(MultiPolygon),
    DrawCancelled,
    ShapeSelected(Option<CellId>),
    ReshapeStarted(CellId),
    ShapeEdited(CellId, MultiPolygon),
    ShapeDeleted(CellId),
}

impl EditorEvent {
    fn name(&self) -> &'static str {
        match self {
            EditorEvent::DrawStarted => "DrawStarted",
            EditorEvent::ShapeDrawn(_) => "ShapeDrawn",
            EditorEvent::DrawCancelled => "DrawCancelled",
            EditorEvent::ShapeSelected(_) => "ShapeSelected",
            EditorEvent::ReshapeStarted(_) => "ReshapeStarted",
            EditorEvent::ShapeEdited(..) => "ShapeEdited",
            EditorEvent::ShapeDeleted(_) => "ShapeDeleted",
        }
    }
}

#[derive(Error, Clone, Debug, PartialEq)]
pub enum EditError {
    #[error("gesture {gesture} is not legal in state {state}")]
    IllegalGesture {
        gesture: &'static str,
        state: &'static str,
    },
    #[error("drawn shape lies entirely outside its parent cell")]
    OutsideParent,
    #[error("parent cell {0} does not exist")]
    UnknownParent(CellId),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Overlap(#[from] OverlapError),
}

/// Read-only view handed to the rendering collaborator after every mutation.
#[derive(Clone, Debug, Serialize)]
pub struct RenderSnapshot {
    pub state: EditorState,
    pub cells: Vec<Cell>,
}

/// Restore point for the most recent split, so that deleting a cell the split
/// created rolls the affected partition back to its exact pre-draw cell list.
#[derive(Clone, Debug)]
struct SplitRestore {
    level: CellLevel,
    parent: Option<CellId>,
    cells: Vec<Cell>,
    created: Vec<CellId>,
}

pub struct EditorSession {
    site: SiteMap,
    state: EditorState,
    prior: EditorState,
    level: CellLevel,
    parent: Option<CellId>,
    restore: Option<SplitRestore>,
}

impl EditorSession {
    /// Open a session at the root site scope.
    pub fn new(site: SiteMap) -> Self {
        let state = if site.partition(CellLevel::Site, None).is_some_and(|p| !p.is_empty()) {
            EditorState::BoundaryNotSelected
        } else {
            EditorState::NoBoundary
        };
        EditorSession {
            site,
            state,
            prior: state,
            level: CellLevel::Site,
            parent: None,
            restore: None,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn site(&self) -> &SiteMap {
        &self.site
    }

    pub fn into_site(self) -> SiteMap {
        self.site
    }

    /// Move the session to another hierarchy scope (wizard step). The named
    /// parent must exist and sit one level above the scope being edited.
    pub fn set_scope(
        &mut self,
        level: CellLevel,
        parent: Option<CellId>,
    ) -> Result<(), EditError> {
        if let Some(pid) = parent {
            let parent_cell = self.site.cell(pid).ok_or(EditError::UnknownParent(pid))?;
            if parent_cell.level.child() != Some(level) {
                return Err(EditError::UnknownParent(pid));
            }
        } else if level != CellLevel::Site {
            return Err(EditError::IllegalGesture {
                gesture: "SetScope",
                state: self.state.name(),
            });
        }
        self.level = level;
        self.parent = parent;
        self.restore = None;
        self.state = if self.scope_cells().is_empty() {
            EditorState::NoBoundary
        } else {
            EditorState::BoundaryNotSelected
        };
        self.prior = self.state;
        debug!(?level, ?parent, state = self.state.name(), "scope changed");
        Ok(())
    }

    /// Full cell list plus state, for the rendering collaborator.
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            state: self.state,
            cells: self.site.cells().cloned().collect(),
        }
    }

    /// Stable key the instructional-text collaborator resolves to a localized
    /// string for the current state. Pure lookup.
    pub fn instruction_key(&self) -> &'static str {
        match self.state {
            EditorState::NoBoundary => "instructions.draw_boundary",
            EditorState::CreatingBoundary => "instructions.finish_boundary",
            EditorState::BoundaryNotSelected => "instructions.select_shape",
            EditorState::BoundarySelected(_) => "instructions.edit_or_replace",
            EditorState::EditingBoundary(_) => "instructions.reshape",
            EditorState::ReplacingBoundary => "instructions.draw_replacement",
        }
    }

    /// Feed one gesture through the machine. Illegal gestures are rejected
    /// with the state untouched; geometry failures discard the drawn shape
    /// and leave the partition in its last-known-good state.
    pub fn handle(&mut self, event: EditorEvent) -> Result<(), EditError> {
        let from = self.state;
        match (self.state, event) {
            (EditorState::NoBoundary, EditorEvent::DrawStarted) => {
                self.state = EditorState::CreatingBoundary;
            }
            (st, EditorEvent::DrawStarted) if st.has_geometry() => {
                // Single-active-shape rule: any pending shape is discarded.
                // Restarting a pending draw keeps the original return state,
                // so a later cancel lands somewhere settled.
                if st != EditorState::ReplacingBoundary {
                    self.prior = st;
                }
                self.state = EditorState::ReplacingBoundary;
            }
            (EditorState::CreatingBoundary, EditorEvent::ShapeDrawn(drawn)) => {
                let drawn = self.clip_to_parent(drawn)?;
                self.restore = None;
                self.site.add_cell(self.level, self.parent, drawn)?;
                self.state = EditorState::BoundaryNotSelected;
            }
            (EditorState::CreatingBoundary, EditorEvent::DrawCancelled) => {
                self.state = EditorState::NoBoundary;
            }
            (EditorState::ReplacingBoundary, EditorEvent::ShapeDrawn(drawn)) => {
                let drawn = self.clip_to_parent(drawn)?;
                let pre = self.scope_cells();
                let result = split(&pre, &drawn)?;
                let created =
                    apply_split(&mut self.site, self.level, self.parent, &drawn, &result)?;
                self.restore = Some(SplitRestore {
                    level: self.level,
                    parent: self.parent,
                    cells: pre,
                    created,
                });
                self.state = EditorState::BoundaryNotSelected;
            }
            (EditorState::ReplacingBoundary, EditorEvent::DrawCancelled) => {
                self.state = self.prior;
            }
            (EditorState::BoundaryNotSelected, EditorEvent::ShapeSelected(Some(id)))
            | (EditorState::BoundarySelected(_), EditorEvent::ShapeSelected(Some(id))) => {
                if self.site.cell(id).is_none() {
                    return Err(OverlapError::UnknownCell(id).into());
                }
                self.state = EditorState::BoundarySelected(id);
            }
            (EditorState::BoundarySelected(_), EditorEvent::ShapeSelected(None)) => {
                self.state = EditorState::BoundaryNotSelected;
            }
            (EditorState::BoundaryNotSelected, EditorEvent::ShapeSelected(None)) => {}
            (EditorState::BoundarySelected(sel), EditorEvent::ReshapeStarted(id))
                if sel == id =>
            {
                self.state = EditorState::EditingBoundary(id);
            }
            (EditorState::EditingBoundary(sel), EditorEvent::ShapeEdited(id, geometry))
                if sel == id =>
            {
                let geometry = self.clip_to_parent(geometry)?;
                self.restore = None;
                self.site.replace_cell(id, geometry)?;
                self.state = EditorState::BoundarySelected(id);
            }
            (EditorState::EditingBoundary(sel), EditorEvent::DrawCancelled) => {
                self.state = EditorState::BoundarySelected(sel);
            }
            // Delete is accepted in every state; with no geometry around it
            // is simply a no-op that leaves the state alone.
            (st, EditorEvent::ShapeDeleted(id)) => {
                self.delete(id);
                if st.has_geometry() {
                    self.state = if self.scope_cells().is_empty() {
                        EditorState::NoBoundary
                    } else {
                        EditorState::BoundaryNotSelected
                    };
                }
            }
            (state, event) => {
                return Err(EditError::IllegalGesture {
                    gesture: event.name(),
                    state: state.name(),
                });
            }
        }
        if self.state != from {
            debug!(from = from.name(), to = self.state.name(), "transition");
        }
        Ok(())
    }

    fn scope_cells(&self) -> Vec<Cell> {
        self.site
            .partition(self.level, self.parent)
            .map(|p| p.cells().to_vec())
            .unwrap_or_default()
    }

    /// Commit-time containment: child-level shapes are clipped to the parent
    /// cell's area; a shape entirely outside the parent is rejected.
    fn clip_to_parent(&self, drawn: MultiPolygon) -> Result<MultiPolygon, EditError> {
        let Some(pid) = self.parent else {
            return Ok(drawn);
        };
        let parent = self.site.cell(pid).ok_or(EditError::UnknownParent(pid))?;
        match kernel::intersect(&drawn, &parent.geometry)? {
            Some(clipped) => Ok(clipped),
            None => Err(EditError::OutsideParent),
        }
    }

    fn delete(&mut self, id: CellId) {
        if let Some(restore) = self.restore.take() {
            if restore.created.contains(&id) {
                // Deleting a cell the last split created undoes the whole
                // split: the partition returns to its exact pre-draw cells.
                for created in &restore.created {
                    self.site.remove_cell(*created);
                }
                let idx = self.site.ensure_partition(restore.level, restore.parent);
                self.site.partitions[idx].cells = restore.cells;
                debug!(id, "split rolled back to pre-draw partition");
                return;
            }
        }
        self.site.remove_cell(id);
    }
}
