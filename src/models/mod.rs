// Module exports for models

pub mod document;
pub mod edit;
pub mod event;
pub mod settings;
