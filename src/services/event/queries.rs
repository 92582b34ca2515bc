use chrono::NaiveDate;

use super::EventService;
use crate::models::document::Document;
use crate::models::edit::{EditScope, EventEdit};
use crate::models::event::{CellKey, EventRecord};

/// Placeholder label of a cell with nothing to show.
pub const EMPTY_CELL_LABEL: &str = "(tap to edit)";

/// Form values the cell editor opens with.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorDefaults {
    pub edit: EventEdit,
    /// True when the cell is part of a multi-day span and a scope choice
    /// (single date or whole span) should be offered.
    pub offers_scope: bool,
}

/// Prefills the editor for `cell`: the record's content, its span bounds or
/// the cell date, and notifications on unless the record turned them off.
pub fn editor_defaults(doc: &Document, cell: &CellKey) -> EditorDefaults {
    let fallback = EventRecord::default();
    let record = doc.events.get(cell).unwrap_or(&fallback);
    let offers_scope = record.has_multi_day_span();
    EditorDefaults {
        edit: EventEdit {
            title: record.title.clone(),
            memo: record.memo.clone(),
            start_date: Some(record.span_start.unwrap_or(cell.date)),
            end_date: Some(record.span_end.unwrap_or(cell.date)),
            start_time: record.start_time.clone(),
            end_time: record.end_time.clone(),
            notify: record.notify,
            notify_time: record.notify_time.clone(),
            scope: offers_scope.then_some(EditScope::Span),
        },
        offers_scope,
    }
}

/// Label shown in the grid cell at `cell`.
pub fn cell_label(doc: &Document, cell: &CellKey) -> String {
    doc.events
        .get(cell)
        .and_then(EventRecord::label)
        .unwrap_or_else(|| EMPTY_CELL_LABEL.to_string())
}

impl<'a> EventService<'a> {
    /// Records of one column between two dates, both inclusive.
    pub fn column_range(
        &self,
        column_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<(&CellKey, &EventRecord)> {
        let from = CellKey::new(start, "");
        self.doc
            .events
            .range(from..)
            .take_while(|(key, _)| key.date <= end)
            .filter(|(key, _)| key.column_id == column_id)
            .collect()
    }
}
