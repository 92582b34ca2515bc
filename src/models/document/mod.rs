// Document module
// Root planner document: ordered columns, per-cell events and layout sizes

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::event::{CellKey, ColumnId, EventRecord};
use crate::utils::date::{format_month, parse_month};
use crate::utils::ids;

/// Schema version written by this build.
pub const CURRENT_VERSION: u32 = 50;

pub const DEFAULT_DATE_COL_WIDTH: u32 = 120;
pub const DEFAULT_WEEKDAY_COL_WIDTH: u32 = 70;
pub const DEFAULT_COLUMN_WIDTH: u32 = 240;
pub const MIN_ROW_HEIGHT: u32 = 24;

pub const DATE_COL_BOUNDS: WidthBounds = WidthBounds { min: 70, max: 400 };
pub const WEEKDAY_COL_BOUNDS: WidthBounds = WidthBounds { min: 40, max: 300 };
pub const COLUMN_BOUNDS: WidthBounds = WidthBounds { min: 80, max: 800 };

/// Inclusive pixel range a width is kept in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthBounds {
    pub min: u32,
    pub max: u32,
}

impl WidthBounds {
    /// Clamps a raw pixel value, substituting the nearest bound. NaN counts as zero.
    pub fn clamp(&self, value: f64) -> u32 {
        let value = if value.is_nan() { 0.0 } else { value };
        value.round().clamp(self.min as f64, self.max as f64) as u32
    }
}

/// A user-defined column. `id` is never reused once assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_column_width")]
    pub width: u32,
}

fn default_column_width() -> u32 {
    DEFAULT_COLUMN_WIDTH
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            width: DEFAULT_COLUMN_WIDTH,
        }
    }
}

/// The whole persisted planner state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub version: u32,
    /// Displayed month, "YYYY-MM".
    pub month: String,
    /// Display order.
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub events: BTreeMap<CellKey, EventRecord>,
    pub date_col_width: u32,
    pub weekday_col_width: u32,
    #[serde(default)]
    pub row_heights: BTreeMap<NaiveDate, u32>,
    #[serde(default)]
    pub compact: bool,
    #[serde(default)]
    pub compat_mode: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// First-run document: two empty columns and no events.
    pub fn with_defaults(month: NaiveDate, compat_mode: bool) -> Self {
        let mut doc = Self {
            version: CURRENT_VERSION,
            month: format_month(month),
            columns: Vec::new(),
            events: BTreeMap::new(),
            date_col_width: DEFAULT_DATE_COL_WIDTH,
            weekday_col_width: DEFAULT_WEEKDAY_COL_WIDTH,
            row_heights: BTreeMap::new(),
            compact: true,
            compat_mode,
            extra: Map::new(),
        };
        for title in ["Schedule 1", "Schedule 2"] {
            let id = ids::fresh_column_id(&doc);
            doc.columns.push(Column::new(id, title));
        }
        doc
    }

    /// First day of the displayed month, if `month` is well formed.
    pub fn month_start(&self) -> Option<NaiveDate> {
        parse_month(&self.month)
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn column_mut(&mut self, id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == id)
    }

    pub fn has_column(&self, id: &str) -> bool {
        self.column(id).is_some()
    }

    pub fn event(&self, key: &CellKey) -> Option<&EventRecord> {
        self.events.get(key)
    }

    /// Pulls every width back into its bounds. Run on load and before display.
    pub fn normalize_layout(&mut self) {
        self.date_col_width = DATE_COL_BOUNDS.clamp(self.date_col_width as f64);
        self.weekday_col_width = WEEKDAY_COL_BOUNDS.clamp(self.weekday_col_width as f64);
        for column in &mut self.columns {
            if column.width == 0 {
                column.width = DEFAULT_COLUMN_WIDTH;
            }
            column.width = COLUMN_BOUNDS.clamp(column.width as f64);
        }
    }
}
