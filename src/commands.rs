use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate};

use month_planner::models::document::Document;
use month_planner::models::edit::EditScope;
use month_planner::models::event::{CellKey, SpanPosition};
use month_planner::models::settings::PlannerSettings;
use month_planner::services::event::{cell_label, editor_defaults};
use month_planner::services::migration::MigrationContext;
use month_planner::services::notification::{NotificationService, PermissionOutcome};
use month_planner::services::planner::Planner;
use month_planner::services::reminder::{run_reminder_loop, ReminderRules, ReminderService};
use month_planner::services::settings::SettingsService;
use month_planner::services::storage::FileStore;
use month_planner::services::transfer;
use month_planner::utils::date::{
    date_label, first_of_month, format_date, month_dates, parse_date, parse_hhmm, weekday_label,
};

use crate::cli::{Cli, ColumnAction, LayoutAction, MonthAction, NotifyAction};

/// Loaded settings plus the planner they point at.
pub struct Session {
    pub settings_service: SettingsService,
    pub settings: PlannerSettings,
    pub planner: Planner<FileStore>,
}

impl Session {
    pub fn open(cli: &Cli) -> Result<Self> {
        let settings_service = match &cli.config {
            Some(path) => SettingsService::with_path(path),
            None => SettingsService::new(),
        };
        let settings = settings_service.load_or_default();
        let data_dir = cli
            .data_dir
            .clone()
            .unwrap_or_else(|| SettingsService::data_dir(&settings));

        let ctx = MigrationContext {
            today: Local::now().date_naive(),
            compat_mode: settings.display.compat_mode,
        };
        let planner = Planner::open(FileStore::new(data_dir), ctx);
        log::debug!("Using data directory {}", planner.store().dir().display());
        Ok(Self {
            settings_service,
            settings,
            planner,
        })
    }

    fn reminders(&self) -> ReminderService<NotificationService> {
        ReminderService::new(
            NotificationService::new(self.settings.notifications.enabled),
            ReminderRules::from(&self.settings.notifications),
        )
    }
}

/// Field overrides for `edit`; unset fields keep the editor defaults.
#[derive(Debug, Default)]
pub struct CellEditArgs {
    pub title: Option<String>,
    pub memo: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub notify_time: Option<String>,
    pub no_notify: bool,
    pub scope: Option<EditScope>,
}

pub fn show(session: &Session) -> Result<()> {
    print!("{}", render_grid(session.planner.document()));
    Ok(())
}

pub fn month(session: &mut Session, action: MonthAction) -> Result<()> {
    let planner = &mut session.planner;
    match action {
        MonthAction::Set { month } => planner.set_month(&month)?,
        MonthAction::Prev => planner.previous_month()?,
        MonthAction::Next => planner.next_month()?,
        MonthAction::Today => planner.go_to_today(Local::now().date_naive())?,
    }
    println!("Showing {}", planner.document().month);
    Ok(())
}

pub fn column(session: &mut Session, action: ColumnAction) -> Result<()> {
    let planner = &mut session.planner;
    match action {
        ColumnAction::Add { title } => {
            let id = planner.add_column(title.as_deref())?;
            println!("Added column {}", id);
        }
        ColumnAction::Rename { id, title } => {
            planner.rename_column(&id, &title)?;
            println!("Renamed column {}", id);
        }
        ColumnAction::Resize { id, width } => {
            let width = planner.resize_column(&id, width)?;
            println!("Column {} is now {}px wide", id, width);
        }
        ColumnAction::Delete { id } => {
            let removed = planner.delete_column(&id)?;
            println!("Deleted column {} and {} event(s)", id, removed);
        }
    }
    Ok(())
}

pub fn edit(session: &mut Session, date: &str, column: &str, args: CellEditArgs) -> Result<()> {
    let cell = CellKey::new(parse_cell_date(date)?, column);
    let mut edit = editor_defaults(session.planner.document(), &cell).edit;

    if let Some(title) = args.title {
        edit.title = title;
    }
    if let Some(memo) = args.memo {
        edit.memo = memo;
    }
    if let Some(from) = args.from {
        edit.start_date = Some(parse_cell_date(&from)?);
    }
    if let Some(to) = args.to {
        edit.end_date = Some(parse_cell_date(&to)?);
    }
    if let Some(start) = args.start {
        edit.start_time = parse_optional_time(start)?;
    }
    if let Some(end) = args.end {
        edit.end_time = parse_optional_time(end)?;
    }
    if let Some(notify_time) = args.notify_time {
        edit.notify_time = parse_optional_time(notify_time)?;
    }
    if args.no_notify {
        edit.notify = false;
    }
    if args.scope.is_some() {
        edit.scope = args.scope;
    }

    let edit = edit.trimmed();
    let outcome = session
        .planner
        .save_cell(&cell, &edit)
        .with_context(|| format!("saving cell {}", cell))?;
    match &outcome.span_id {
        Some(span_id) => println!(
            "Saved {} from {} to {} ({} dates)",
            span_id,
            format_date(outcome.start),
            format_date(outcome.end),
            outcome.written.len()
        ),
        None => println!("Saved {}", cell),
    }
    for (key, record) in session
        .planner
        .column_events(column, outcome.start, outcome.end)
    {
        println!("  {}  {}", format_date(key.date), record.label().unwrap_or_default());
    }
    Ok(())
}

pub fn clear(session: &mut Session, date: &str, column: &str, span: bool) -> Result<()> {
    let cell = CellKey::new(parse_cell_date(date)?, column);
    if span {
        let removed = session.planner.clear_span(&cell)?;
        if removed == 0 {
            println!("{} is not part of a multi-date event", cell);
        } else {
            println!("Cleared {} date(s)", removed);
        }
    } else if session.planner.clear_cell(&cell)?.is_some() {
        println!("Cleared {}", cell);
    } else {
        println!("{} was already empty", cell);
    }
    Ok(())
}

pub fn layout(session: &mut Session, action: LayoutAction) -> Result<()> {
    let planner = &mut session.planner;
    match action {
        LayoutAction::RowHeight { date, height } => {
            let height = planner.set_row_height(parse_cell_date(&date)?, height)?;
            println!("Row {} is now {}px high", date, height);
        }
        LayoutAction::DateWidth { width } => {
            println!("Date column is now {}px wide", planner.set_date_col_width(width)?);
        }
        LayoutAction::WeekdayWidth { width } => {
            println!("Weekday column is now {}px wide", planner.set_weekday_col_width(width)?);
        }
        LayoutAction::Reset => {
            planner.reset_sizes()?;
            println!("Sizes reset");
        }
        LayoutAction::Compact { state } => {
            planner.set_compact(state.is_on())?;
            println!("Compact mode {}", on_off(state.is_on()));
        }
        LayoutAction::Compat { state } => {
            planner.set_compat_mode(state.is_on())?;
            println!("Compatibility mode {}", on_off(state.is_on()));
        }
    }
    Ok(())
}

pub fn export(session: &Session, dir: Option<PathBuf>) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => env::current_dir().context("resolving current directory")?,
    };
    let path = transfer::export_document(session.planner.document(), &dir)?;
    println!("Exported to {}", path.display());
    Ok(())
}

pub fn import(session: &mut Session, path: PathBuf) -> Result<()> {
    transfer::import_file(&mut session.planner, &path)?;
    println!(
        "Imported {} from {}",
        session.planner.document().month,
        path.display()
    );
    Ok(())
}

pub fn notify(session: &mut Session, action: NotifyAction) -> Result<()> {
    match action {
        NotifyAction::Permission => {
            let mut service = NotificationService::new(session.settings.notifications.enabled);
            match service.request_permission()? {
                PermissionOutcome::Granted => println!("Notifications are enabled"),
                PermissionOutcome::Denied { advisory } => {
                    println!("{}", advisory.unwrap_or("Notifications are blocked"))
                }
            }
        }
        NotifyAction::Enable => set_notifications(session, true)?,
        NotifyAction::Disable => set_notifications(session, false)?,
        NotifyAction::Check => {
            let reminders = session.reminders();
            let now = Local::now().naive_local();
            let report = session.planner.check_reminders(&reminders, now)?;
            if report.skipped_without_permission {
                println!("Notifications are disabled; nothing was checked");
            } else {
                println!("Fired {} reminder(s)", report.fired.len());
            }
        }
        NotifyAction::Watch => {
            let reminders = session.reminders();
            let interval = Duration::from_secs(session.settings.notifications.check_interval_secs);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("starting async runtime")?;
            runtime.block_on(run_reminder_loop(&mut session.planner, &reminders, interval))?;
        }
    }
    Ok(())
}

fn set_notifications(session: &mut Session, enabled: bool) -> Result<()> {
    session.settings.notifications.enabled = enabled;
    session.settings_service.update(&session.settings)?;
    let location = session
        .settings_service
        .config_path()
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    println!("Notifications {} (saved to {})", on_off(enabled), location);
    Ok(())
}

fn parse_cell_date(value: &str) -> Result<NaiveDate> {
    parse_date(value).ok_or_else(|| anyhow!("invalid date {:?} (expected YYYY-MM-DD)", value))
}

/// Empty clears the field; anything else must be HH:MM.
fn parse_optional_time(value: String) -> Result<String> {
    let value = value.trim().to_string();
    if !value.is_empty() && parse_hhmm(&value).is_none() {
        bail!("invalid time {:?} (expected HH:MM)", value);
    }
    Ok(value)
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

fn span_marker(position: Option<SpanPosition>) -> &'static str {
    match position {
        Some(SpanPosition::Start) => "[ ",
        Some(SpanPosition::Middle) => "| ",
        Some(SpanPosition::End) => "] ",
        Some(SpanPosition::Single) | None => "",
    }
}

/// Text rendering of the displayed month, one line per date.
pub fn render_grid(doc: &Document) -> String {
    let month_start = doc
        .month_start()
        .unwrap_or_else(|| first_of_month(Local::now().date_naive()));
    let char_width = |px: u32| (px / 8).max(6) as usize;
    let date_width = char_width(doc.date_col_width);
    let weekday_width = char_width(doc.weekday_col_width);

    let mut out = format!("{}\n", doc.month);
    out.push_str(&format!("{:date_width$} {:weekday_width$}", "Date", "Day"));
    for column in &doc.columns {
        let heading = format!("{} ({})", column.title, column.id);
        out.push_str(&format!(" {}", fit(&heading, char_width(column.width))));
    }
    out.push('\n');

    for date in month_dates(month_start) {
        out.push_str(&format!(
            "{:date_width$} {:weekday_width$}",
            date_label(date, doc.compact),
            weekday_label(date.weekday(), doc.compact)
        ));
        for column in &doc.columns {
            let cell = CellKey::new(date, column.id.clone());
            let marker = span_marker(doc.event(&cell).and_then(|r| r.span_position(date)));
            let text = format!("{}{}", marker, cell_label(doc, &cell));
            out.push_str(&format!(" {}", fit(&text, char_width(column.width))));
        }
        out.push('\n');
    }
    out
}

fn fit(text: &str, width: usize) -> String {
    let mut fitted: String = text.chars().take(width).collect();
    let len = fitted.chars().count();
    fitted.extend(std::iter::repeat(' ').take(width - len));
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use month_planner::models::edit::EventEdit;
    use month_planner::services::event::{EventService, EMPTY_CELL_LABEL};
    use tempfile::TempDir;

    fn session_in(dir: &TempDir) -> Session {
        Session {
            settings_service: SettingsService::with_path(dir.path().join("config.toml")),
            settings: PlannerSettings::default(),
            planner: Planner::open(
                FileStore::new(dir.path().join("data")),
                MigrationContext {
                    today: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                    compat_mode: false,
                },
            ),
        }
    }

    #[test]
    fn test_edit_trims_text_fields_before_saving() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        let column = session.planner.document().columns[0].id.clone();
        let args = CellEditArgs {
            title: Some("  Gym  ".to_string()),
            memo: Some(" bring towel \n".to_string()),
            start: Some(" 07:00 ".to_string()),
            ..CellEditArgs::default()
        };

        edit(&mut session, "2024-03-10", &column, args).unwrap();

        let cell = CellKey::new(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), column);
        let record = session.planner.document().event(&cell).unwrap();
        assert_eq!(record.title, "Gym");
        assert_eq!(record.memo, "bring towel");
        assert_eq!(record.start_time, "07:00");
    }

    #[test]
    fn test_disable_notifications_is_saved_to_config() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);

        notify(&mut session, NotifyAction::Disable).unwrap();

        let saved = session.settings_service.get().unwrap();
        assert!(!saved.notifications.enabled);
        assert!(!session.settings.notifications.enabled);
    }

    #[test]
    fn test_render_grid_marks_spans() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let mut doc = Document::with_defaults(start, false);
        let column = doc.columns[0].id.clone();
        let edit = EventEdit::titled("Trip").dates(
            NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 12).unwrap(),
        );
        EventService::new(&mut doc).save(
            &CellKey::new(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(), column),
            &edit,
        );

        let grid = render_grid(&doc);
        let lines: Vec<&str> = grid.lines().collect();

        // month, header, then 29 days of a leap February
        assert_eq!(lines.len(), 31);
        assert!(lines[11].starts_with("2/10"));
        assert!(lines[11].contains("[ Trip"));
        assert!(lines[12].contains("| Trip"));
        assert!(lines[13].contains("] Trip"));
        assert!(lines[2].contains(EMPTY_CELL_LABEL));
    }

    #[test]
    fn test_parse_optional_time() {
        assert_eq!(parse_optional_time(" 09:30 ".to_string()).unwrap(), "09:30");
        assert_eq!(parse_optional_time(String::new()).unwrap(), "");
        assert!(parse_optional_time("9:30".to_string()).is_err());
    }
}
