use wikibench::benchmark::{AttemptMetrics, BenchmarkMetrics, StepMetrics};
use wikibench::output::{record_benchmark, write_benchmark_csv, write_summary_csv, JsonlTraceSink};
use wikibench::wiki::Direction;

fn sample_metrics() -> BenchmarkMetrics {
    let mut metrics = BenchmarkMetrics::new("baseline");

    metrics.add_attempt(AttemptMetrics {
        model_id: "openai/gpt-5.2".into(),
        attempt_id: 0,
        start_title: "Dayton, Ohio".into(),
        target_title: "Aviation".into(),
        solved: true,
        total_clicks: 2,
        best_path_length: Some(1),
        steps: vec![
            StepMetrics {
                step_index: 0,
                remaining_distance_before: Some(1),
                remaining_distance_after: Some(1),
                step_direction: Direction::Neutral,
                timestamp_utc: chrono::Utc::now(),
            },
            StepMetrics {
                step_index: 1,
                remaining_distance_before: Some(1),
                remaining_distance_after: Some(0),
                step_direction: Direction::Forward,
                timestamp_utc: chrono::Utc::now(),
            },
        ],
        trimmed_included: false,
    });

    // An attempt that never made a move still gets a placeholder row.
    metrics.add_attempt(AttemptMetrics {
        model_id: "openai/gpt-5.2".into(),
        attempt_id: 1,
        start_title: "Obscure Page".into(),
        target_title: "Aviation".into(),
        solved: false,
        total_clicks: 0,
        best_path_length: None,
        steps: Vec::new(),
        trimmed_included: false,
    });

    metrics.compute_all_statistics(30, 3);
    metrics
}

#[test]
fn results_csv_has_one_row_per_step_plus_placeholders() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("results.csv");
    let metrics = sample_metrics();

    write_benchmark_csv(&metrics, &path).unwrap();
    let csv = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    // Header + 2 step rows + 1 placeholder row.
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("benchmark_run_name,model_id,attempt_id"));

    // Titles with commas are quoted.
    assert!(lines[1].contains("\"Dayton, Ohio\""));
    // Step indices are 1-based in the table.
    assert!(lines[1].contains(",1,1,1,neutral,"));
    assert!(lines[2].contains(",2,1,0,forward,"));

    // The moves-less attempt writes the sentinel best path and empty
    // step fields.
    assert!(lines[3].contains(",999,"));
    assert!(lines[3].ends_with(",,,,,"));
}

#[test]
fn summary_csv_has_one_row_per_model() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("summary.csv");
    let metrics = sample_metrics();

    write_summary_csv(&metrics, &path).unwrap();
    let csv = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 2);
    let fields: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(fields[0], "baseline");
    assert_eq!(fields[1], "openai/gpt-5.2");
    assert_eq!(fields[2], "2"); // total attempts
    assert_eq!(fields[3], "2"); // trimmed attempts (N <= K keeps all)
    assert_eq!(fields[6], "50.00"); // solve rate
}

#[test]
fn trace_sink_writes_one_json_line_per_step() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("traces.jsonl");
    let metrics = sample_metrics();

    let (sink, worker) = JsonlTraceSink::new(&path).unwrap();
    record_benchmark(&metrics, &sink).unwrap();
    drop(sink);
    worker.join().unwrap();

    let jsonl = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = jsonl.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["benchmark_run_name"], "baseline");
    assert_eq!(first["model_id"], "openai/gpt-5.2");
    assert_eq!(first["step_direction"], "neutral");
    assert_eq!(first["remaining_distance_before"], 1);
}
