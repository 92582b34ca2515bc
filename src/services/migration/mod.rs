//! Schema migration for stored and imported planner documents.
//!
//! A raw JSON value of unknown shape is upgraded by an ordered list of pure
//! steps and then decoded leniently into a [`Document`]. Nothing here fails:
//! corrupt fields are replaced by defaults or dropped with a warning.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::models::document::{Document, CURRENT_VERSION};

mod decode;
mod steps;

pub use decode::{coerce_number, is_truthy};

/// Inputs a migration may need from outside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationContext {
    /// Used when a stored document has no usable `month`.
    pub today: NaiveDate,
    /// Platform detection result for documents without `compatMode`.
    pub compat_mode: bool,
}

/// One upgrade step. Applied to every document whose version is below `target`.
pub struct MigrationStep {
    pub target: u32,
    pub name: &'static str,
    pub apply: fn(Map<String, Value>, &MigrationContext) -> Map<String, Value>,
}

/// Upgrades `raw` to [`CURRENT_VERSION`].
///
/// Returns `None` when there is no usable prior state: `None`, JSON `null`,
/// or any value that is not an object.
pub fn migrate(raw: Option<Value>, ctx: &MigrationContext) -> Option<Document> {
    let mut map = match raw? {
        Value::Null => return None,
        Value::Object(map) => map,
        other => {
            log::warn!("Stored planner state is not an object ({}), starting fresh", kind(&other));
            return None;
        }
    };

    let mut version = read_version(&map);
    for step in steps::STEPS {
        if version < step.target as f64 {
            log::debug!("Applying migration step {} (v{} -> v{})", step.name, version, step.target);
            map = (step.apply)(map, ctx);
            version = step.target as f64;
            map.insert("version".to_string(), Value::from(step.target));
        }
    }
    if version > CURRENT_VERSION as f64 {
        log::warn!("Document version {} is newer than {}, loading as-is", version, CURRENT_VERSION);
    }

    Some(decode::document(map, ctx))
}

/// Missing, zero or non-numeric versions count as version 1.
fn read_version(map: &Map<String, Value>) -> f64 {
    let version = map.get("version").map(coerce_number).unwrap_or(0.0);
    if version <= 0.0 {
        1.0
    } else {
        version
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
