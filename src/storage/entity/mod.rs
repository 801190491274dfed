pub mod investor;
pub mod scrape_job;

pub use investor::Entity as Investor;
pub use scrape_job::Entity as ScrapeJob;
