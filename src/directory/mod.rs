pub mod focus;
pub mod model;
pub mod validation;

pub use focus::{derive_focus_flags, Focus, FocusFlags};
pub use model::{
    DirectoryStats, InvestorDto, InvestorPage, ListParams, ListQuery, NewInvestor, RankedCounts,
};
pub use validation::ValidationError;
