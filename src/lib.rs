// Month planner library
// Document model, editing, persistence and reminders behind the CLI

pub mod models;
pub mod services;
pub mod utils;
