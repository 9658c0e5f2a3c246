//! Spatial partition editor for planting-site designs.
//!
//! A site is divided hierarchically (site, zones, subzones, plots) into a
//! gap-free, overlap-free partition of simple polygons. The crate holds the
//! geometry kernel that keeps that partition valid under freehand drawing,
//! the split engine that reconciles a new shape against existing cells, the
//! editor state machine driving an interactive session, and the async draft
//! persistence layer.

pub mod model;
pub mod partition;
pub mod editor;
pub mod draft;
pub mod geometry {
    pub mod clip;
    pub mod kernel;
    pub mod tolerance;
    pub mod winding;
}
pub mod algorithms {
    pub mod plots;
    pub mod split;
}

pub use algorithms::plots::grid_plots;
pub use algorithms::split::{apply_split, split, SplitResult};
pub use draft::{DraftSite, DraftStore, DraftSync, MemoryStore, PersistenceError, SaveOutcome};
pub use editor::{EditError, EditorEvent, EditorSession, EditorState, RenderSnapshot};
pub use geometry::kernel::{area, difference, intersect, to_multi_polygon, GeometryError};
pub use model::{Cell, CellId, CellLevel, DraftId, EditStep, MultiPolygon, Point, Ring};
pub use partition::{OverlapError, Partition, SiteMap};
