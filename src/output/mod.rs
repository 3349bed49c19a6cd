//! Persisted outputs: CSV tables and JSONL step traces.

pub mod csv_writer;
pub mod trace;

pub use csv_writer::{write_benchmark_csv, write_summary_csv};
pub use trace::{record_benchmark, JsonlTraceSink, StepTrace, TraceError, TraceSink, TraceWorker};
