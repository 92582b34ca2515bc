// Edit module
// Payload submitted by the cell editor

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether a save applies to one date or to the whole span range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditScope {
    /// Detach just the edited date as a standalone entry.
    Single,
    /// Rewrite every date of the range.
    Span,
}

impl fmt::Display for EditScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EditScope::Single => "single",
            EditScope::Span => "span",
        })
    }
}

impl FromStr for EditScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(EditScope::Single),
            "span" => Ok(EditScope::Span),
            other => Err(format!("unknown edit scope: {other}")),
        }
    }
}

/// Everything the cell editor submits.
///
/// Missing dates default to the edited cell's date (start) and to the start
/// date (end). `scope` is only consulted when the edited cell already belongs
/// to a multi-day span; `None` then means `Span`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventEdit {
    pub title: String,
    pub memo: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time: String,
    pub end_time: String,
    pub notify: bool,
    pub notify_time: String,
    pub scope: Option<EditScope>,
}

impl EventEdit {
    /// An edit with only a title, notifications on, covering the edited date.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            notify: true,
            ..Self::default()
        }
    }

    pub fn dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = start.into();
        self.end_time = end.into();
        self
    }

    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn scope(mut self, scope: EditScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Trims every text field the way the editor form does before saving.
    pub fn trimmed(mut self) -> Self {
        for field in [
            &mut self.title,
            &mut self.memo,
            &mut self.start_time,
            &mut self.end_time,
            &mut self.notify_time,
        ] {
            *field = field.trim().to_string();
        }
        self
    }

    /// Inclusive date range with defaults applied and the bounds swapped if reversed.
    pub fn normalized_range(&self, cell_date: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = self.start_date.unwrap_or(cell_date);
        let end = self.end_date.unwrap_or(start);
        if start > end {
            (end, start)
        } else {
            (start, end)
        }
    }
}
