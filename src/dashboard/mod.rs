pub mod app_service;
pub mod app_state;
pub mod client;
pub mod commands;
pub mod ui;

pub use app_state::{App, AppEvent};
pub use client::{ClientError, DirectoryApi, HttpDirectoryClient};
pub use commands::AppCommand;
