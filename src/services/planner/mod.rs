//! The planner repository.
//!
//! [`Planner`] owns the in-memory document and its store. Every mutating
//! method applies its change and then writes the whole document back before
//! returning (write-through, no batching).

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::document::Document;
use crate::models::edit::EventEdit;
use crate::models::event::{CellKey, EventRecord};
use crate::services::event::{EventService, SaveOutcome};
use crate::services::migration::{migrate, MigrationContext};
use crate::services::notification::Notifier;
use crate::services::reminder::{NotifiedLog, ReminderService, ScanReport};
use crate::services::storage::{read_json, write_json, KeyValueStore, STATE_KEY};

mod columns;
mod layout;

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("invalid month (expected YYYY-MM): {0}")]
    InvalidMonth(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type Result<T, E = PlannerError> = std::result::Result<T, E>;

pub struct Planner<S: KeyValueStore> {
    store: S,
    doc: Document,
    notified: NotifiedLog,
    ctx: MigrationContext,
}

impl<S: KeyValueStore> Planner<S> {
    /// Loads and migrates the stored document, or starts from the first-run
    /// default when nothing usable is stored. Nothing is written.
    pub fn open(store: S, ctx: MigrationContext) -> Self {
        let doc = Self::load_document(&store, &ctx);
        let notified = NotifiedLog::load(&store);
        log::info!(
            "Opened planner for {} ({} columns, {} events)",
            doc.month,
            doc.columns.len(),
            doc.events.len()
        );
        Self {
            store,
            doc,
            notified,
            ctx,
        }
    }

    fn load_document(store: &S, ctx: &MigrationContext) -> Document {
        migrate(read_json(store, STATE_KEY), ctx)
            .unwrap_or_else(|| Document::with_defaults(ctx.today, ctx.compat_mode))
    }

    /// Re-reads the document and reminder log, dropping unsaved state.
    pub fn reload(&mut self) {
        self.doc = Self::load_document(&self.store, &self.ctx);
        self.notified = NotifiedLog::load(&self.store);
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn notified(&self) -> &NotifiedLog {
        &self.notified
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn context(&self) -> &MigrationContext {
        &self.ctx
    }

    /// Writes the whole document to the store.
    pub fn persist(&mut self) -> Result<()> {
        write_json(&mut self.store, STATE_KEY, &self.doc)?;
        Ok(())
    }

    /// Replaces the active document (import) and persists it.
    pub fn replace_document(&mut self, doc: Document) -> Result<()> {
        self.doc = doc;
        self.persist()
    }

    fn ensure_column(&self, column_id: &str) -> Result<()> {
        if self.doc.has_column(column_id) {
            Ok(())
        } else {
            Err(PlannerError::ColumnNotFound(column_id.to_string()))
        }
    }

    /// Saves an editor submission for `cell`. See [`EventService::save`].
    pub fn save_cell(&mut self, cell: &CellKey, edit: &EventEdit) -> Result<SaveOutcome> {
        self.ensure_column(&cell.column_id)?;
        let outcome = EventService::new(&mut self.doc).save(cell, edit);
        self.persist()?;
        Ok(outcome)
    }

    /// Deletes the record at exactly `cell`.
    pub fn clear_cell(&mut self, cell: &CellKey) -> Result<Option<EventRecord>> {
        let removed = EventService::new(&mut self.doc).clear_cell(cell);
        self.persist()?;
        Ok(removed)
    }

    /// Deletes the whole span of the record at `cell`; no-op without a span.
    pub fn clear_span(&mut self, cell: &CellKey) -> Result<usize> {
        let removed = EventService::new(&mut self.doc).clear_span(cell);
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Records of one column between two dates, both inclusive.
    pub fn column_events(
        &mut self,
        column_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<(CellKey, EventRecord)> {
        EventService::new(&mut self.doc)
            .column_range(column_id, start, end)
            .into_iter()
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect()
    }

    /// Runs one reminder scan and persists the reminder log.
    pub fn check_reminders<N: Notifier>(
        &mut self,
        reminders: &ReminderService<N>,
        now: NaiveDateTime,
    ) -> Result<ScanReport> {
        let report = reminders.scan(&self.doc, &mut self.notified, now);
        self.notified.save(&mut self.store)?;
        Ok(report)
    }
}
