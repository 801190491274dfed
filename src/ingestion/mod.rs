pub mod model;
pub mod service;

pub use model::{
    CompletionCallback, JobStatus, JobView, ScrapeAccepted, ScrapeOverview, ScrapeRequest,
    ScrapeSource, SourceInfo,
};
pub use service::{IngestionError, IngestionService};
