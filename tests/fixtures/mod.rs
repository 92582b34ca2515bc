// Test fixtures - reusable test data
// Planner documents, dates and stores shared by the integration tests

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use month_planner::services::migration::MigrationContext;
use month_planner::services::planner::Planner;
use month_planner::services::storage::FileStore;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Sample dates for testing
pub mod dates {
    use super::*;

    pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        ymd(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    /// Feb 29, 2024 (leap year)
    pub fn leap_day_2024() -> NaiveDate {
        ymd(2024, 2, 29)
    }

    pub fn mid_march_2024() -> NaiveDate {
        ymd(2024, 3, 15)
    }
}

/// Stored documents as older releases wrote them
pub mod documents {
    use super::*;

    /// Before fixed column widths existed.
    pub fn legacy_v2() -> Value {
        json!({
            "version": 2,
            "month": "2023-11",
            "columns": [{ "id": "abc12345", "title": "Family" }],
            "events": {
                "2023-11-05|abc12345": { "title": "Picnic", "startTime": "12:00" }
            }
        })
    }

    /// Current layout with out-of-range widths and an unknown field.
    pub fn oversized_v50() -> Value {
        json!({
            "version": 50,
            "month": "2024-03",
            "columns": [{ "id": "c1", "title": "Work", "width": 9999 }],
            "events": {},
            "dateColWidth": 5,
            "weekdayColWidth": "75.6",
            "rowHeights": {},
            "compact": false,
            "compatMode": false,
            "theme": "sepia"
        })
    }
}

pub fn context() -> MigrationContext {
    MigrationContext {
        today: dates::mid_march_2024(),
        compat_mode: false,
    }
}

/// A planner over a fresh temporary directory. Keep the `TempDir` alive.
pub fn file_planner() -> (TempDir, Planner<FileStore>) {
    let dir = TempDir::new().unwrap();
    let planner = Planner::open(FileStore::new(dir.path()), context());
    (dir, planner)
}

/// Re-opens the planner stored in `dir`, as a restart would.
pub fn reopen(dir: &TempDir) -> Planner<FileStore> {
    Planner::open(FileStore::new(dir.path()), context())
}
