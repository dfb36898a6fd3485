pub mod service;
pub mod standings;

pub use service::LeagueService;
pub use standings::calculate_standings;
