//! The traversal engine: move parsing and the per-attempt game loop.

pub mod engine;
pub mod parser;

pub use engine::{GameEngine, GameRequest, GameResult, GameStep};
pub use parser::parse_response;
