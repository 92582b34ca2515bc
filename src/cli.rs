use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use month_planner::models::edit::EditScope;

#[derive(Parser, Debug)]
#[command(name = "month-planner", version, about = "Monthly planner grid with multi-day events and reminders")]
pub struct Cli {
    /// Read settings from this config.toml instead of the platform one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Keep planner state in this directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the grid of the displayed month
    Show,
    /// Change the displayed month
    Month {
        #[command(subcommand)]
        action: MonthAction,
    },
    /// Manage grid columns
    Column {
        #[command(subcommand)]
        action: ColumnAction,
    },
    /// Create or edit the event in one cell
    Edit {
        /// Cell date (YYYY-MM-DD)
        date: String,
        /// Column id
        column: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        memo: Option<String>,
        /// First date of the event (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Last date of the event (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Start time (HH:MM)
        #[arg(long)]
        start: Option<String>,
        /// End time (HH:MM)
        #[arg(long)]
        end: Option<String>,
        /// Reminder time (HH:MM)
        #[arg(long)]
        notify_time: Option<String>,
        /// Turn the reminder off
        #[arg(long)]
        no_notify: bool,
        /// For cells of a multi-day event: edit one date or the whole event
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
    },
    /// Delete the event in one cell
    Clear {
        /// Cell date (YYYY-MM-DD)
        date: String,
        /// Column id
        column: String,
        /// Delete every date of the cell's multi-day event
        #[arg(long)]
        span: bool,
    },
    /// Adjust widths, row heights and display modes
    Layout {
        #[command(subcommand)]
        action: LayoutAction,
    },
    /// Write the planner to planner-<month>.json
    Export {
        /// Target directory (defaults to the current one)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Replace the planner with an exported file
    Import { path: PathBuf },
    /// Reminder notifications
    Notify {
        #[command(subcommand)]
        action: NotifyAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum MonthAction {
    /// Jump to a month (YYYY-MM)
    Set { month: String },
    Prev,
    Next,
    Today,
}

#[derive(Subcommand, Debug)]
pub enum ColumnAction {
    Add {
        /// Column title (defaults to "Schedule")
        title: Option<String>,
    },
    Rename { id: String, title: String },
    Resize { id: String, width: f64 },
    /// Delete a column and all of its events
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum LayoutAction {
    /// Set the height of one date row
    RowHeight { date: String, height: u32 },
    DateWidth { width: f64 },
    WeekdayWidth { width: f64 },
    /// Restore default widths and forget row heights
    Reset,
    Compact {
        #[arg(value_enum)]
        state: Switch,
    },
    Compat {
        #[arg(value_enum)]
        state: Switch,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotifyAction {
    /// Ask for notification permission
    Permission,
    /// Allow reminder notifications (saved to the config file)
    Enable,
    /// Block reminder notifications (saved to the config file)
    Disable,
    /// Fire due reminders once
    Check,
    /// Keep firing due reminders until interrupted
    Watch,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ScopeArg {
    Single,
    Span,
}

impl From<ScopeArg> for EditScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Single => EditScope::Single,
            ScopeArg::Span => EditScope::Span,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn is_on(self) -> bool {
        matches!(self, Switch::On)
    }
}
