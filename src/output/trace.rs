//! Step trace capture for benchmark runs.
//!
//! One JSON line per recorded move, written off the async path by a
//! dedicated worker thread fed through an mpsc channel.

use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::mpsc;

use crate::benchmark::metrics::BenchmarkMetrics;
use crate::wiki::Direction;

#[derive(Debug, Clone, Serialize)]
pub struct StepTrace {
    pub timestamp_ms: i64,
    pub benchmark_run_name: String,
    pub model_id: String,
    pub attempt_id: usize,
    pub start_title: String,
    pub target_title: String,
    pub solved: bool,
    pub step_index: u32,
    pub remaining_distance_before: Option<u32>,
    pub remaining_distance_after: Option<u32>,
    pub step_direction: Direction,
}

#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(String),
    #[error("trace channel closed")]
    Closed,
    #[error("trace worker failed: {0}")]
    Join(String),
}

pub trait TraceSink: Send + Sync {
    fn record(&self, event: StepTrace) -> Result<(), TraceError>;
}

#[derive(Clone)]
pub struct JsonlTraceSink {
    sender: mpsc::Sender<StepTrace>,
}

pub struct TraceWorker {
    handle: Option<std::thread::JoinHandle<Result<(), TraceError>>>,
}

impl TraceWorker {
    pub fn join(mut self) -> Result<(), TraceError> {
        let handle = self.handle.take();
        match handle {
            Some(handle) => match handle.join() {
                Ok(result) => result,
                Err(_) => Err(TraceError::Join("trace worker panicked".to_string())),
            },
            None => Ok(()),
        }
    }
}

impl JsonlTraceSink {
    pub fn new(path: impl AsRef<Path>) -> Result<(Self, TraceWorker), TraceError> {
        let file = std::fs::File::create(path)?;
        let (sender, receiver) = mpsc::channel::<StepTrace>();
        let handle = std::thread::spawn(move || write_trace_loop(file, receiver));
        Ok((
            Self { sender },
            TraceWorker {
                handle: Some(handle),
            },
        ))
    }
}

impl TraceSink for JsonlTraceSink {
    fn record(&self, event: StepTrace) -> Result<(), TraceError> {
        self.sender.send(event).map_err(|_| TraceError::Closed)
    }
}

fn write_trace_loop(
    file: std::fs::File,
    receiver: mpsc::Receiver<StepTrace>,
) -> Result<(), TraceError> {
    let mut writer = BufWriter::new(file);
    for event in receiver {
        let line = serde_json::to_string(&event).map_err(|e| TraceError::Serde(e.to_string()))?;
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Replay a completed condition's steps into a sink.
pub fn record_benchmark(metrics: &BenchmarkMetrics, sink: &dyn TraceSink) -> Result<(), TraceError> {
    for model in metrics.models.values() {
        for attempt in &model.attempts {
            for step in &attempt.steps {
                sink.record(StepTrace {
                    timestamp_ms: step.timestamp_utc.timestamp_millis(),
                    benchmark_run_name: metrics.benchmark_name.clone(),
                    model_id: attempt.model_id.clone(),
                    attempt_id: attempt.attempt_id,
                    start_title: attempt.start_title.clone(),
                    target_title: attempt.target_title.clone(),
                    solved: attempt.solved,
                    step_index: step.step_index,
                    remaining_distance_before: step.remaining_distance_before,
                    remaining_distance_after: step.remaining_distance_after,
                    step_direction: step.step_direction,
                })?;
            }
        }
    }
    Ok(())
}
