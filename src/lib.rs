#![forbid(unsafe_code)]

//! # wikibench
//!
//! Benchmark harness that drives LLM agents through the Wikipedia game:
//! starting from a random article, reach a target article by clicking
//! hyperlinks only. Every move is scored against a BFS shortest path over
//! the live link graph, so each attempt yields not just solved/failed but
//! a per-click forward/neutral/backwards trajectory.
//!
//! Five conditions probe how navigation changes with prompt content and
//! reasoning intensity; per-model results are aggregated into trimmed
//! robust statistics (the worst few attempts per model are dropped).

pub mod benchmark;
pub mod config;
pub mod game;
pub mod gateway;
pub mod output;
pub mod prompts;
pub mod wiki;

pub use benchmark::{
    AttemptMetrics, AttemptRunner, BenchError, BenchmarkMetrics, Condition, Orchestrator,
    StepMetrics,
};
pub use config::RunConfig;
pub use gateway::{ChatGateway, PolicyGateway, ProviderError, ReasoningMode};
pub use wiki::{Direction, PathFinder, WikiClient, WikiError};
