//! Metrics computation for benchmark results.
//!
//! Distances are `Option<u32>` throughout; "no path found" converts to a
//! numeric value only at two boundaries: the ranking ceiling in
//! `effective_clicks`, and the CSV sentinel in the output layer.

use std::collections::BTreeMap;

use crate::wiki::Direction;

/// Scored version of one recorded move.
#[derive(Debug, Clone)]
pub struct StepMetrics {
    pub step_index: u32,
    pub remaining_distance_before: Option<u32>,
    pub remaining_distance_after: Option<u32>,
    pub step_direction: Direction,
    /// When the move was made, carried over from the game record.
    pub timestamp_utc: chrono::DateTime<chrono::Utc>,
}

/// Full metrics for a single attempt. Immutable once the runner returns,
/// except for the trimmed-inclusion flag set at aggregation time.
#[derive(Debug, Clone)]
pub struct AttemptMetrics {
    pub model_id: String,
    pub attempt_id: usize,
    pub start_title: String,
    pub target_title: String,
    pub solved: bool,
    /// Moves actually made, including for failed attempts.
    pub total_clicks: u32,
    pub best_path_length: Option<u32>,
    pub steps: Vec<StepMetrics>,
    pub trimmed_included: bool,
}

impl AttemptMetrics {
    /// Ranking cost: actual clicks when solved, the move ceiling when not.
    pub fn effective_clicks(&self, max_clicks: u32) -> u32 {
        if self.solved {
            self.total_clicks
        } else {
            max_clicks
        }
    }
}

/// Aggregated metrics for one model under one condition.
#[derive(Debug, Clone, Default)]
pub struct ModelMetrics {
    pub model_id: String,
    pub attempts: Vec<AttemptMetrics>,
    pub trimmed_count: usize,
    pub median_clicks: f64,
    pub median_best_path: f64,
    pub solve_rate: f64,
    pub forward_pct: f64,
    pub neutral_pct: f64,
    pub backwards_pct: f64,
}

impl ModelMetrics {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Default::default()
        }
    }

    /// Mark the trimmed subset: drop exactly the `drop_count` worst
    /// attempts by effective clicks when more than `drop_count` exist,
    /// otherwise keep all. Ties break by attempt id so the subset does
    /// not depend on completion order.
    fn compute_trimmed_set(&mut self, max_clicks: u32, drop_count: usize) {
        let mut order: Vec<usize> = (0..self.attempts.len()).collect();
        order.sort_by_key(|&i| {
            (
                self.attempts[i].effective_clicks(max_clicks),
                self.attempts[i].attempt_id,
            )
        });

        let keep = if self.attempts.len() > drop_count {
            self.attempts.len() - drop_count
        } else {
            self.attempts.len()
        };

        for (rank, &i) in order.iter().enumerate() {
            self.attempts[i].trimmed_included = rank < keep;
        }
        self.trimmed_count = keep;
    }

    /// Recompute every statistic from scratch. Idempotent; insensitive to
    /// the order attempts were added in.
    pub fn compute_statistics(&mut self, max_clicks: u32, drop_count: usize) {
        self.compute_trimmed_set(max_clicks, drop_count);

        let trimmed: Vec<&AttemptMetrics> = self
            .attempts
            .iter()
            .filter(|a| a.trimmed_included)
            .collect();

        if trimmed.is_empty() {
            return;
        }

        let clicks: Vec<f64> = trimmed
            .iter()
            .map(|a| a.effective_clicks(max_clicks) as f64)
            .collect();
        self.median_clicks = median(&clicks);

        // Unreachable best paths count at the ceiling, the same clamp the
        // ranking cost uses.
        let best_paths: Vec<f64> = trimmed
            .iter()
            .map(|a| a.best_path_length.unwrap_or(max_clicks) as f64)
            .collect();
        self.median_best_path = median(&best_paths);

        let solved = trimmed.iter().filter(|a| a.solved).count();
        self.solve_rate = solved as f64 / trimmed.len() as f64 * 100.0;

        let all_steps: Vec<&StepMetrics> = trimmed.iter().flat_map(|a| a.steps.iter()).collect();
        if !all_steps.is_empty() {
            let total = all_steps.len() as f64;
            let count = |d: Direction| {
                all_steps.iter().filter(|s| s.step_direction == d).count() as f64
            };
            self.forward_pct = count(Direction::Forward) / total * 100.0;
            self.neutral_pct = count(Direction::Neutral) / total * 100.0;
            self.backwards_pct = count(Direction::Backwards) / total * 100.0;
        }
    }
}

/// Complete metrics for one condition across all models. BTreeMap keeps
/// output ordering stable across runs.
#[derive(Debug, Clone)]
pub struct BenchmarkMetrics {
    pub benchmark_name: String,
    pub models: BTreeMap<String, ModelMetrics>,
}

impl BenchmarkMetrics {
    pub fn new(benchmark_name: impl Into<String>) -> Self {
        Self {
            benchmark_name: benchmark_name.into(),
            models: BTreeMap::new(),
        }
    }

    pub fn add_attempt(&mut self, attempt: AttemptMetrics) {
        self.models
            .entry(attempt.model_id.clone())
            .or_insert_with(|| ModelMetrics::new(&attempt.model_id))
            .attempts
            .push(attempt);
    }

    pub fn compute_all_statistics(&mut self, max_clicks: u32, drop_count: usize) {
        for model in self.models.values_mut() {
            model.compute_statistics(max_clicks, drop_count);
        }
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("no NaN distances"));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
