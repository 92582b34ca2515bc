// Service module exports

pub mod event;
pub mod migration;
pub mod notification;
pub mod planner;
pub mod reminder;
pub mod settings;
pub mod storage;
pub mod transfer;
