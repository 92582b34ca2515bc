//! Cell event service.
//! Saves and clears per-cell records, keeping the copies of a multi-day span
//! consistent, organized across focused submodules.

use crate::models::document::Document;

pub mod crud;
pub mod queries;

pub use crud::SaveOutcome;
pub use queries::{cell_label, editor_defaults, EditorDefaults, EMPTY_CELL_LABEL};

/// Service for editing the events of an in-memory planner document.
///
/// Operations here never fail and never persist; the caller owns both.
pub struct EventService<'a> {
    pub(crate) doc: &'a mut Document,
}

impl<'a> EventService<'a> {
    /// Create a new EventService over a document
    pub fn new(doc: &'a mut Document) -> Self {
        Self { doc }
    }
}
