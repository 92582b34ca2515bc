// Event module
// Per-cell event record and the "YYYY-MM-DD|columnId" key it is stored under

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::utils::date::{format_date, parse_date};

/// Identifier of a user-defined column.
pub type ColumnId = String;

/// Identifier shared by every record of one multi-day span.
pub type SpanId = String;

/// Address of one grid cell: a date and a column.
///
/// Serialized as `"YYYY-MM-DD|columnId"`, which is also the ordering key of
/// the event map (date first, then column).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub date: NaiveDate,
    pub column_id: ColumnId,
}

impl CellKey {
    pub fn new(date: NaiveDate, column_id: impl Into<ColumnId>) -> Self {
        Self {
            date,
            column_id: column_id.into(),
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", format_date(self.date), self.column_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cell key: {0:?}")]
pub struct CellKeyParseError(pub String);

impl FromStr for CellKey {
    type Err = CellKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (date, column_id) = s
            .split_once('|')
            .ok_or_else(|| CellKeyParseError(s.to_string()))?;
        let date = parse_date(date).ok_or_else(|| CellKeyParseError(s.to_string()))?;
        if column_id.is_empty() {
            return Err(CellKeyParseError(s.to_string()));
        }
        Ok(Self::new(date, column_id))
    }
}

impl Serialize for CellKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn default_notify() -> bool {
    true
}

/// Reads `null` as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_notify<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(default_notify))
}

/// Content of one cell.
///
/// A record with a `span_id` is one day of a multi-day span: every record of
/// the span carries identical content and the same inclusive bounds, one copy
/// per covered date. `span_id`, `span_start` and `span_end` are either all set
/// or all `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memo: String,
    /// "HH:MM" or empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_time: String,
    /// "HH:MM" or empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_time: String,
    #[serde(default = "default_notify", deserialize_with = "null_as_notify")]
    pub notify: bool,
    /// Reminder time override, "HH:MM" or empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub notify_time: String,
    #[serde(default)]
    pub span_id: Option<SpanId>,
    #[serde(default)]
    pub span_start: Option<NaiveDate>,
    #[serde(default)]
    pub span_end: Option<NaiveDate>,
    /// Fields written by other versions of the planner; carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for EventRecord {
    fn default() -> Self {
        Self {
            title: String::new(),
            memo: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            notify: true,
            notify_time: String::new(),
            span_id: None,
            span_start: None,
            span_end: None,
            extra: Map::new(),
        }
    }
}

/// Inclusive bounds of the span a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanRef<'a> {
    pub id: &'a str,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SpanRef<'_> {
    pub fn is_multi_day(&self) -> bool {
        self.start != self.end
    }
}

/// Where a date sits inside the span of its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanPosition {
    /// One-day span.
    Single,
    Start,
    Middle,
    End,
}

impl EventRecord {
    /// The span this record belongs to, if all three span fields are present.
    pub fn span(&self) -> Option<SpanRef<'_>> {
        match (&self.span_id, self.span_start, self.span_end) {
            (Some(id), Some(start), Some(end)) => Some(SpanRef { id, start, end }),
            _ => None,
        }
    }

    /// True for records that belong to a span covering more than one date.
    pub fn has_multi_day_span(&self) -> bool {
        self.span().is_some_and(|span| span.is_multi_day())
    }

    pub fn span_position(&self, date: NaiveDate) -> Option<SpanPosition> {
        let span = self.span()?;
        let position = if !span.is_multi_day() {
            SpanPosition::Single
        } else if date == span.start {
            SpanPosition::Start
        } else if date == span.end {
            SpanPosition::End
        } else {
            SpanPosition::Middle
        };
        Some(position)
    }

    /// Leading time range shown before the title: "10:00–12:00", "10:00", "12:00" or "".
    pub fn time_range(&self) -> String {
        match (self.start_time.is_empty(), self.end_time.is_empty()) {
            (false, false) => format!("{}–{}", self.start_time, self.end_time),
            (false, true) => self.start_time.clone(),
            (true, false) => self.end_time.clone(),
            (true, true) => String::new(),
        }
    }

    /// Grid label for the cell, or `None` when the record has nothing to show.
    pub fn label(&self) -> Option<String> {
        if self.title.is_empty() && self.start_time.is_empty() && self.end_time.is_empty() {
            return None;
        }
        Some(format!("{} {}", self.time_range(), self.title).trim().to_string())
    }
}
