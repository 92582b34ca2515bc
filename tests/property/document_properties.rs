// Width clamping, migration idempotency and reminder de-duplication

use chrono::Duration;
use month_planner::models::document::{COLUMN_BOUNDS, DATE_COL_BOUNDS, WEEKDAY_COL_BOUNDS};
use month_planner::models::edit::EventEdit;
use month_planner::models::event::CellKey;
use month_planner::services::migration::migrate;
use month_planner::services::notification::{NotificationPermission, Notifier};
use month_planner::services::planner::Planner;
use month_planner::services::reminder::{ReminderRules, ReminderService};
use month_planner::services::storage::MemoryStore;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::cell::Cell;

use crate::fixtures::context;
use crate::fixtures::dates::{at, ymd};

fn raw_width() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-5000.0f64..5000.0).prop_map(|n| json!(n)),
        (-5000i64..5000).prop_map(|n| json!(n.to_string())),
        any::<bool>().prop_map(Value::Bool),
        "[a-z]{0,5}".prop_map(Value::String),
        Just(Value::Null),
        Just(json!([1, 2])),
    ]
}

fn raw_version() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        (0u32..60).prop_map(|v| json!(v)),
        (0u32..60).prop_map(|v| json!(v.to_string())),
    ]
}

proptest! {
    /// Property: widths land inside their bounds whatever was stored
    #[test]
    fn prop_widths_always_within_bounds(
        date in raw_width(),
        weekday in raw_width(),
        column in raw_width(),
        version in raw_version(),
    ) {
        let raw = json!({
            "version": version,
            "month": "2024-03",
            "columns": [{ "id": "c1", "title": "A", "width": column }],
            "dateColWidth": date,
            "weekdayColWidth": weekday,
        });

        let doc = migrate(Some(raw), &context()).unwrap();

        prop_assert!(doc.date_col_width >= DATE_COL_BOUNDS.min && doc.date_col_width <= DATE_COL_BOUNDS.max);
        prop_assert!(doc.weekday_col_width >= WEEKDAY_COL_BOUNDS.min && doc.weekday_col_width <= WEEKDAY_COL_BOUNDS.max);
        prop_assert!(doc.columns[0].width >= COLUMN_BOUNDS.min && doc.columns[0].width <= COLUMN_BOUNDS.max);
    }

    /// Property: migrating an already-migrated document changes nothing
    #[test]
    fn prop_migration_is_idempotent(
        date in raw_width(),
        weekday in raw_width(),
        version in raw_version(),
        compact in any::<bool>(),
        extra in "[a-z]{1,6}",
    ) {
        let raw = json!({
            "version": version,
            "month": "2023-07",
            "columns": [{ "id": "c1", "title": "A" }],
            "events": { "2023-07-04|c1": { "title": "Fireworks", "custom": 1 } },
            "dateColWidth": date,
            "weekdayColWidth": weekday,
            "compact": compact,
            "extra": extra,
        });

        let once = migrate(Some(raw), &context()).unwrap();
        let twice = migrate(Some(serde_json::to_value(&once).unwrap()), &context()).unwrap();

        prop_assert_eq!(once, twice);
    }

    /// Property: each (cell, reminder time) fires at most once while the clock advances
    #[test]
    fn prop_reminder_fires_at_most_once(
        hour in 0u32..23,
        minute in 0u32..60,
        steps in prop::collection::vec(1i64..20, 1..12),
    ) {
        let mut planner = Planner::open(MemoryStore::new(), context());
        let column = planner.document().columns[0].id.clone();
        let time = format!("{:02}:{:02}", hour, minute);
        planner
            .save_cell(&CellKey::new(ymd(2024, 3, 15), column), &EventEdit::titled("Call").times(time, ""))
            .unwrap();
        let notifier = CountingNotifier::default();
        let reminders = ReminderService::new(notifier, ReminderRules::default());

        let mut now = at(2024, 3, 15, hour, minute) - Duration::minutes(30);
        for step in steps {
            now += Duration::minutes(step);
            planner.check_reminders(&reminders, now).unwrap();
        }

        prop_assert!(reminders.notifier().shown.get() <= 1);
    }
}

#[derive(Default)]
struct CountingNotifier {
    shown: Cell<usize>,
}

impl Notifier for CountingNotifier {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    fn show(&self, _title: &str, _body: &str) -> anyhow::Result<()> {
        self.shown.set(self.shown.get() + 1);
        Ok(())
    }
}
