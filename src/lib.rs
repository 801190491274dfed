pub mod api;
pub mod config;
pub mod dashboard;
pub mod directory;
pub mod error;
pub mod ingestion;
pub mod storage;
