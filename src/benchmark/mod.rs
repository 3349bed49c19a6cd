//! Attempt execution, aggregation, and condition orchestration.

pub mod attempt;
pub mod conditions;
pub mod metrics;
pub mod orchestrator;

use thiserror::Error;

use crate::gateway::ProviderError;
use crate::wiki::WikiError;

pub use attempt::AttemptRunner;
pub use conditions::{condition_config, Condition, ConditionConfig};
pub use metrics::{AttemptMetrics, BenchmarkMetrics, ModelMetrics, StepMetrics};
pub use orchestrator::Orchestrator;

/// Errors surfaced by the benchmark layer.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("wiki error: {0}")]
    Wiki(#[from] WikiError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
