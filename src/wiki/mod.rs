//! Link graph access: API client, content extraction, link index,
//! shortest-path search, and article sampling.

pub mod api;
pub mod article;
pub mod links;
pub mod pathfinder;
pub mod sampler;

pub use api::{WikiClient, WikiError};
pub use links::{article_url, normalize_title, titles_match};
pub use pathfinder::{Direction, PathFinder};
pub use sampler::ArticleSampler;
