use chrono::NaiveDate;

use super::EventService;
use crate::models::edit::{EditScope, EventEdit};
use crate::models::event::{CellKey, EventRecord, SpanId};
use crate::utils::date::each_date_inclusive;
use crate::utils::ids::fresh_span_id;

/// What a save actually wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub scope: EditScope,
    pub span_id: Option<SpanId>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Keys upserted, in date order.
    pub written: Vec<CellKey>,
}

struct SpanBounds {
    id: SpanId,
    start: NaiveDate,
    end: NaiveDate,
}

impl<'a> EventService<'a> {
    /// Saves an editor submission for `cell`.
    ///
    /// When the cell already belongs to a multi-day span the caller's scope is
    /// honoured (defaulting to `Span`); otherwise the scope is `Span` exactly
    /// when the edited range covers more than one date.
    ///
    /// A `Span` save upserts one record per date of the new range and does not
    /// delete records of the old range that fall outside it. A `Single` save
    /// writes a standalone record at `cell` and ignores the edited range.
    pub fn save(&mut self, cell: &CellKey, edit: &EventEdit) -> SaveOutcome {
        let (start, end) = edit.normalized_range(cell.date);
        let existing = self.doc.events.get(cell);
        let scope = if existing.is_some_and(EventRecord::has_multi_day_span) {
            edit.scope.unwrap_or(EditScope::Span)
        } else if start != end {
            EditScope::Span
        } else {
            EditScope::Single
        };

        match scope {
            EditScope::Single => {
                self.upsert(cell.clone(), edit, None);
                SaveOutcome {
                    scope,
                    span_id: None,
                    start,
                    end,
                    written: vec![cell.clone()],
                }
            }
            EditScope::Span => {
                let span_id = match existing.and_then(|record| record.span_id.clone()) {
                    Some(id) => id,
                    None => fresh_span_id(self.doc),
                };
                let mut written = Vec::new();
                for date in each_date_inclusive(start, end) {
                    let key = CellKey::new(date, cell.column_id.clone());
                    let bounds = SpanBounds {
                        id: span_id.clone(),
                        start,
                        end,
                    };
                    self.upsert(key.clone(), edit, Some(bounds));
                    written.push(key);
                }
                log::debug!(
                    "Saved span {} over {} dates in column {}",
                    span_id,
                    written.len(),
                    cell.column_id
                );
                SaveOutcome {
                    scope,
                    span_id: Some(span_id),
                    start,
                    end,
                    written,
                }
            }
        }
    }

    /// Deletes the record at exactly `cell`, even if it is one day of a span.
    /// The remaining days of that span are left as they are.
    pub fn clear_cell(&mut self, cell: &CellKey) -> Option<EventRecord> {
        self.doc.events.remove(cell)
    }

    /// Deletes every record sharing the span id of the record at `cell`.
    /// Returns how many records were removed; zero when the cell has no span.
    pub fn clear_span(&mut self, cell: &CellKey) -> usize {
        let Some(span_id) = self
            .doc
            .events
            .get(cell)
            .and_then(|record| record.span_id.clone())
        else {
            return 0;
        };

        let before = self.doc.events.len();
        self.doc
            .events
            .retain(|_, record| record.span_id.as_deref() != Some(span_id.as_str()));
        before - self.doc.events.len()
    }

    /// Overwrites the edit-payload fields of the record at `key`, keeping any
    /// other fields it already carries.
    fn upsert(&mut self, key: CellKey, edit: &EventEdit, span: Option<SpanBounds>) {
        let record = self.doc.events.entry(key).or_default();
        record.title = edit.title.clone();
        record.memo = edit.memo.clone();
        record.start_time = edit.start_time.clone();
        record.end_time = edit.end_time.clone();
        record.notify = edit.notify;
        record.notify_time = edit.notify_time.clone();
        match span {
            Some(bounds) => {
                record.span_id = Some(bounds.id);
                record.span_start = Some(bounds.start);
                record.span_end = Some(bounds.end);
            }
            None => {
                record.span_id = None;
                record.span_start = None;
                record.span_end = None;
            }
        }
    }
}
