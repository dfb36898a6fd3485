pub mod cache;
pub mod client;
pub mod normalize;
pub mod provider;

pub use cache::CacheOptions;
pub use client::{endpoint, SportsDbClient};
pub use provider::ResourceProvider;
