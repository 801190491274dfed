pub mod investor_repo;
pub mod scrape_job_repo;
pub mod stats_repo;

pub use investor_repo::InvestorRepository;
pub use scrape_job_repo::ScrapeJobRepository;
pub use stats_repo::StatsRepository;
