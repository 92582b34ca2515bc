use serde_json::{Map, Value};

use super::decode::is_truthy;
use super::{MigrationContext, MigrationStep};

/// Ordered upgrade steps. Each is total and idempotent.
pub(super) const STEPS: &[MigrationStep] = &[
    MigrationStep {
        target: 4,
        name: "legacy-layout",
        apply: legacy_layout,
    },
    MigrationStep {
        target: 41,
        name: "sticky-columns",
        apply: sticky_columns,
    },
    MigrationStep {
        target: 50,
        name: "compat-mode",
        apply: compat_mode,
    },
];

const LEGACY_DATE_COL_WIDTH: u32 = 180;
const LEGACY_WEEKDAY_COL_WIDTH: u32 = 110;

/// Versions 1-3 had no fixed-column widths and no compact mode.
fn legacy_layout(mut doc: Map<String, Value>, _ctx: &MigrationContext) -> Map<String, Value> {
    for (field, fallback) in [
        ("dateColWidth", LEGACY_DATE_COL_WIDTH),
        ("weekdayColWidth", LEGACY_WEEKDAY_COL_WIDTH),
    ] {
        if !doc.get(field).is_some_and(is_truthy) {
            doc.insert(field.to_string(), Value::from(fallback));
        }
    }
    doc.insert("compact".to_string(), Value::Bool(true));
    doc
}

/// Layout-only release; the stored shape did not change.
fn sticky_columns(doc: Map<String, Value>, _ctx: &MigrationContext) -> Map<String, Value> {
    doc
}

fn compat_mode(mut doc: Map<String, Value>, ctx: &MigrationContext) -> Map<String, Value> {
    if !doc.get("compatMode").is_some_and(Value::is_boolean) {
        doc.insert("compatMode".to_string(), Value::Bool(ctx.compat_mode));
    }
    doc
}
