use chrono::NaiveDate;

use super::{Planner, PlannerError, Result};
use crate::models::document::{
    DATE_COL_BOUNDS, DEFAULT_COLUMN_WIDTH, DEFAULT_DATE_COL_WIDTH, DEFAULT_WEEKDAY_COL_WIDTH,
    MIN_ROW_HEIGHT, WEEKDAY_COL_BOUNDS,
};
use crate::services::storage::KeyValueStore;
use crate::utils::date::{first_of_month, format_month, parse_month, shift_month};

/// Widest date column kept when compact mode is switched on.
pub const COMPACT_DATE_COL_CAP: u32 = 120;
/// Widest weekday column kept when compact mode is switched on.
pub const COMPACT_WEEKDAY_COL_CAP: u32 = 70;

impl<S: KeyValueStore> Planner<S> {
    fn displayed_month(&self) -> NaiveDate {
        self.doc
            .month_start()
            .unwrap_or_else(|| first_of_month(self.ctx.today))
    }

    /// Switches to a "YYYY-MM" month.
    pub fn set_month(&mut self, month: &str) -> Result<()> {
        let start = parse_month(month).ok_or_else(|| PlannerError::InvalidMonth(month.to_string()))?;
        self.doc.month = format_month(start);
        self.persist()
    }

    pub fn previous_month(&mut self) -> Result<()> {
        self.doc.month = format_month(shift_month(self.displayed_month(), -1));
        self.persist()
    }

    pub fn next_month(&mut self) -> Result<()> {
        self.doc.month = format_month(shift_month(self.displayed_month(), 1));
        self.persist()
    }

    pub fn go_to_today(&mut self, today: NaiveDate) -> Result<()> {
        self.doc.month = format_month(today);
        self.persist()
    }

    /// Stores a row height for `date`, never below the minimum.
    pub fn set_row_height(&mut self, date: NaiveDate, height: u32) -> Result<u32> {
        let height = height.max(MIN_ROW_HEIGHT);
        self.doc.row_heights.insert(date, height);
        self.persist()?;
        Ok(height)
    }

    pub fn set_date_col_width(&mut self, width: f64) -> Result<u32> {
        self.doc.date_col_width = DATE_COL_BOUNDS.clamp(width);
        self.persist()?;
        Ok(self.doc.date_col_width)
    }

    pub fn set_weekday_col_width(&mut self, width: f64) -> Result<u32> {
        self.doc.weekday_col_width = WEEKDAY_COL_BOUNDS.clamp(width);
        self.persist()?;
        Ok(self.doc.weekday_col_width)
    }

    /// Restores default widths everywhere and forgets row heights.
    pub fn reset_sizes(&mut self) -> Result<()> {
        self.doc.date_col_width = DEFAULT_DATE_COL_WIDTH;
        self.doc.weekday_col_width = DEFAULT_WEEKDAY_COL_WIDTH;
        for column in &mut self.doc.columns {
            column.width = DEFAULT_COLUMN_WIDTH;
        }
        self.doc.row_heights.clear();
        self.persist()
    }

    pub fn set_compact(&mut self, compact: bool) -> Result<()> {
        self.doc.compact = compact;
        if compact {
            self.doc.date_col_width = self.doc.date_col_width.min(COMPACT_DATE_COL_CAP);
            self.doc.weekday_col_width = self.doc.weekday_col_width.min(COMPACT_WEEKDAY_COL_CAP);
        }
        self.persist()
    }

    pub fn set_compat_mode(&mut self, enabled: bool) -> Result<()> {
        self.doc.compat_mode = enabled;
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::migration::MigrationContext;
    use crate::services::storage::MemoryStore;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn planner() -> Planner<MemoryStore> {
        Planner::open(
            MemoryStore::new(),
            MigrationContext {
                today: ymd(2024, 1, 20),
                compat_mode: false,
            },
        )
    }

    #[test]
    fn test_month_navigation() {
        let mut planner = planner();
        planner.previous_month().unwrap();
        assert_eq!(planner.document().month, "2023-12");
        planner.next_month().unwrap();
        planner.next_month().unwrap();
        assert_eq!(planner.document().month, "2024-02");

        planner.set_month("2025-07").unwrap();
        assert_eq!(planner.document().month, "2025-07");
        assert!(matches!(
            planner.set_month("July"),
            Err(PlannerError::InvalidMonth(_))
        ));

        planner.go_to_today(ymd(2026, 10, 18)).unwrap();
        assert_eq!(planner.document().month, "2026-10");
    }

    #[test]
    fn test_row_height_has_a_floor() {
        let mut planner = planner();
        assert_eq!(planner.set_row_height(ymd(2024, 1, 3), 10).unwrap(), 24);
        assert_eq!(planner.set_row_height(ymd(2024, 1, 4), 60).unwrap(), 60);
        assert_eq!(planner.document().row_heights.len(), 2);
    }

    #[test]
    fn test_fixed_widths_are_clamped() {
        let mut planner = planner();
        assert_eq!(planner.set_date_col_width(1000.0).unwrap(), 400);
        assert_eq!(planner.set_weekday_col_width(10.0).unwrap(), 40);
    }

    #[test]
    fn test_reset_sizes() {
        let mut planner = planner();
        let id = planner.document().columns[0].id.clone();
        planner.resize_column(&id, 500.0).unwrap();
        planner.set_date_col_width(300.0).unwrap();
        planner.set_row_height(ymd(2024, 1, 3), 90).unwrap();

        planner.reset_sizes().unwrap();

        let doc = planner.document();
        assert_eq!(doc.date_col_width, 120);
        assert_eq!(doc.weekday_col_width, 70);
        assert!(doc.columns.iter().all(|c| c.width == 240));
        assert!(doc.row_heights.is_empty());
    }

    #[test]
    fn test_compact_caps_fixed_widths() {
        let mut planner = planner();
        planner.set_compact(false).unwrap();
        planner.set_date_col_width(300.0).unwrap();
        planner.set_weekday_col_width(200.0).unwrap();

        planner.set_compact(true).unwrap();

        assert!(planner.document().compact);
        assert_eq!(planner.document().date_col_width, 120);
        assert_eq!(planner.document().weekday_col_width, 70);
    }

    #[test]
    fn test_compat_mode_toggle() {
        let mut planner = planner();
        planner.set_compat_mode(true).unwrap();
        assert!(planner.document().compat_mode);
    }
}
