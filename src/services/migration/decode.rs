use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::MigrationContext;
use crate::models::document::{
    Column, Document, COLUMN_BOUNDS, DATE_COL_BOUNDS, DEFAULT_COLUMN_WIDTH, MIN_ROW_HEIGHT,
    WEEKDAY_COL_BOUNDS,
};
use crate::models::event::{CellKey, EventRecord};
use crate::utils::date::{format_month, parse_date, parse_month};

const KNOWN_FIELDS: &[&str] = &[
    "version",
    "month",
    "columns",
    "events",
    "dateColWidth",
    "weekdayColWidth",
    "rowHeights",
    "compact",
    "compatMode",
];

/// Numeric reading of a loosely typed value: numbers as-is, numeric strings
/// parsed, booleans as 1/0, everything else 0.
pub fn coerce_number(value: &Value) -> f64 {
    let number = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    if number.is_finite() {
        number
    } else {
        0.0
    }
}

/// Loose truthiness: null, false, 0 and "" are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(super) fn document(mut map: Map<String, Value>, ctx: &MigrationContext) -> Document {
    let version = coerce_number(map.get("version").unwrap_or(&Value::Null)).max(1.0) as u32;
    let month = month(map.get("month"), ctx);
    let columns = columns(map.remove("columns"));
    let events = events(map.remove("events"));
    let row_heights = row_heights(map.remove("rowHeights"));
    let width = |field: &str| coerce_number(map.get(field).unwrap_or(&Value::Null));
    let date_col_width = DATE_COL_BOUNDS.clamp(width("dateColWidth"));
    let weekday_col_width = WEEKDAY_COL_BOUNDS.clamp(width("weekdayColWidth"));
    let compact = map.get("compact").is_some_and(is_truthy);
    let compat_mode = map.get("compatMode").is_some_and(is_truthy);

    for field in KNOWN_FIELDS {
        map.remove(*field);
    }

    let mut doc = Document {
        version,
        month,
        columns,
        events,
        date_col_width,
        weekday_col_width,
        row_heights,
        compact,
        compat_mode,
        extra: map,
    };
    doc.normalize_layout();
    doc
}

fn month(value: Option<&Value>, ctx: &MigrationContext) -> String {
    match value.and_then(Value::as_str) {
        Some(month) if parse_month(month).is_some() => month.trim().to_string(),
        other => {
            log::warn!("Document month {:?} is unusable, showing the current month", other);
            format_month(ctx.today)
        }
    }
}

fn columns(value: Option<Value>) -> Vec<Column> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(fields) = item else {
            log::warn!("Dropping column entry that is not an object");
            continue;
        };
        let id = match fields.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                log::warn!("Dropping column without an id");
                continue;
            }
        };
        if !seen.insert(id.clone()) {
            log::warn!("Dropping duplicate column {}", id);
            continue;
        }
        let title = fields
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let raw_width = fields.get("width").map(coerce_number).unwrap_or(0.0);
        let width = if raw_width == 0.0 {
            DEFAULT_COLUMN_WIDTH
        } else {
            COLUMN_BOUNDS.clamp(raw_width)
        };
        columns.push(Column { id, title, width });
    }
    columns
}

fn events(value: Option<Value>) -> BTreeMap<CellKey, EventRecord> {
    let Some(Value::Object(entries)) = value else {
        return BTreeMap::new();
    };

    let mut events = BTreeMap::new();
    for (raw_key, raw_record) in entries {
        let key = match raw_key.parse::<CellKey>() {
            Ok(key) => key,
            Err(e) => {
                log::warn!("Dropping event: {}", e);
                continue;
            }
        };
        if !raw_record.is_object() {
            log::warn!("Dropping event {}: record is not an object", raw_key);
            continue;
        }
        match serde_json::from_value::<EventRecord>(raw_record) {
            Ok(record) => {
                events.insert(key, record);
            }
            Err(e) => log::warn!("Dropping event {}: {}", raw_key, e),
        }
    }
    events
}

fn row_heights(value: Option<Value>) -> BTreeMap<NaiveDate, u32> {
    let Some(Value::Object(entries)) = value else {
        return BTreeMap::new();
    };

    entries
        .iter()
        .filter_map(|(date, height)| {
            let date = parse_date(date)?;
            let height = coerce_number(height).round().max(MIN_ROW_HEIGHT as f64) as u32;
            Some((date, height))
        })
        .collect()
}
