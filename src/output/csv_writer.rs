//! CSV output generation for benchmark results.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::benchmark::metrics::BenchmarkMetrics;
use crate::wiki::links::article_url;

/// CSV stand-in for "no path found within budget". The `Option` never
/// leaks past this boundary.
const NOT_FOUND_SENTINEL: u32 = 999;

fn distance_field(d: Option<u32>) -> String {
    d.unwrap_or(NOT_FOUND_SENTINEL).to_string()
}

/// Quote a field when it needs it (commas, quotes, newlines in titles).
fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn write_row(w: &mut impl Write, fields: &[String]) -> io::Result<()> {
    let escaped: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
    writeln!(w, "{}", escaped.join(","))
}

/// Write the detailed results table: one row per step, and one
/// placeholder row for attempts that made no moves at all.
pub fn write_benchmark_csv(metrics: &BenchmarkMetrics, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut w = BufWriter::new(File::create(path)?);

    writeln!(
        w,
        "benchmark_run_name,model_id,attempt_id,start_page_title,start_page_url,\
         target_page_title,target_page_url,solved,total_clicks,best_path_length,\
         trimmed_included,step_index,remaining_distance_before,\
         remaining_distance_after,step_direction,timestamp_utc"
    )?;

    for model in metrics.models.values() {
        for attempt in &model.attempts {
            let base = [
                metrics.benchmark_name.clone(),
                attempt.model_id.clone(),
                attempt.attempt_id.to_string(),
                attempt.start_title.clone(),
                article_url(&attempt.start_title),
                attempt.target_title.clone(),
                article_url(&attempt.target_title),
                attempt.solved.to_string(),
                attempt.total_clicks.to_string(),
                distance_field(attempt.best_path_length),
                attempt.trimmed_included.to_string(),
            ];

            if attempt.steps.is_empty() {
                let mut row = base.to_vec();
                row.extend(std::iter::repeat(String::new()).take(5));
                write_row(&mut w, &row)?;
                continue;
            }

            for step in &attempt.steps {
                let mut row = base.to_vec();
                row.push((step.step_index + 1).to_string()); // 1-indexed
                row.push(distance_field(step.remaining_distance_before));
                row.push(distance_field(step.remaining_distance_after));
                row.push(step.step_direction.as_str().to_string());
                row.push(step.timestamp_utc.to_rfc3339());
                write_row(&mut w, &row)?;
            }
        }
    }

    w.flush()
}

/// Write the per-model summary table.
pub fn write_summary_csv(metrics: &BenchmarkMetrics, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut w = BufWriter::new(File::create(path)?);

    writeln!(
        w,
        "benchmark_run_name,model_id,total_attempts,trimmed_attempts,median_clicks,\
         median_best_path,solve_rate,forward_pct,neutral_pct,backwards_pct"
    )?;

    for model in metrics.models.values() {
        write_row(
            &mut w,
            &[
                metrics.benchmark_name.clone(),
                model.model_id.clone(),
                model.attempts.len().to_string(),
                model.trimmed_count.to_string(),
                format!("{:.2}", model.median_clicks),
                format!("{:.2}", model.median_best_path),
                format!("{:.2}", model.solve_rate),
                format!("{:.2}", model.forward_pct),
                format!("{:.2}", model.neutral_pct),
                format!("{:.2}", model.backwards_pct),
            ],
        )?;
    }

    w.flush()
}
