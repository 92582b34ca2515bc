use super::{Planner, PlannerError, Result};
use crate::models::document::{Column, COLUMN_BOUNDS};
use crate::models::event::ColumnId;
use crate::services::storage::KeyValueStore;
use crate::utils::ids::fresh_column_id;

/// Title given to columns added without one.
pub const DEFAULT_COLUMN_TITLE: &str = "Schedule";

impl<S: KeyValueStore> Planner<S> {
    /// Appends a column and returns its new id.
    pub fn add_column(&mut self, title: Option<&str>) -> Result<ColumnId> {
        let id = fresh_column_id(&self.doc);
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_COLUMN_TITLE);
        self.doc.columns.push(Column::new(id.clone(), title));
        self.persist()?;
        log::info!("Added column {} ({})", id, title);
        Ok(id)
    }

    pub fn rename_column(&mut self, column_id: &str, title: &str) -> Result<()> {
        let column = self
            .doc
            .column_mut(column_id)
            .ok_or_else(|| PlannerError::ColumnNotFound(column_id.to_string()))?;
        column.title = title.trim().to_string();
        self.persist()
    }

    /// Sets a column width, clamped to its bounds. Returns the stored width.
    pub fn resize_column(&mut self, column_id: &str, width: f64) -> Result<u32> {
        let column = self
            .doc
            .column_mut(column_id)
            .ok_or_else(|| PlannerError::ColumnNotFound(column_id.to_string()))?;
        column.width = COLUMN_BOUNDS.clamp(width);
        let width = column.width;
        self.persist()?;
        Ok(width)
    }

    /// Removes a column and every event keyed to it, span members included.
    /// Returns how many events were removed.
    pub fn delete_column(&mut self, column_id: &str) -> Result<usize> {
        self.ensure_column(column_id)?;
        let before = self.doc.events.len();
        self.doc.events.retain(|key, _| key.column_id != column_id);
        let removed = before - self.doc.events.len();
        self.doc.columns.retain(|c| c.id != column_id);
        self.persist()?;
        log::info!("Deleted column {} and {} events", column_id, removed);
        Ok(removed)
    }
}
