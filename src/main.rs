// Month planner
// Command-line entry point

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::Command;
use commands::{CellEditArgs, Session};

fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Cli::parse();
    let mut session = Session::open(&args)?;
    log::info!("Starting month planner");

    match args.command.unwrap_or(Command::Show) {
        Command::Show => commands::show(&session),
        Command::Month { action } => commands::month(&mut session, action),
        Command::Column { action } => commands::column(&mut session, action),
        Command::Edit {
            date,
            column,
            title,
            memo,
            from,
            to,
            start,
            end,
            notify_time,
            no_notify,
            scope,
        } => commands::edit(
            &mut session,
            &date,
            &column,
            CellEditArgs {
                title,
                memo,
                from,
                to,
                start,
                end,
                notify_time,
                no_notify,
                scope: scope.map(Into::into),
            },
        ),
        Command::Clear { date, column, span } => commands::clear(&mut session, &date, &column, span),
        Command::Layout { action } => commands::layout(&mut session, action),
        Command::Export { dir } => commands::export(&session, dir),
        Command::Import { path } => commands::import(&mut session, path),
        Command::Notify { action } => commands::notify(&mut session, action),
    }
}
