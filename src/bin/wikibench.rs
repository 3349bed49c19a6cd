#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wikibench::benchmark::{BenchmarkMetrics, Condition, Orchestrator};
use wikibench::config::RunConfig;
use wikibench::gateway::{validate_roster, PolicyGateway};
use wikibench::output::{record_benchmark, write_benchmark_csv, write_summary_csv, JsonlTraceSink};
use wikibench::wiki::{PathFinder, WikiClient};

#[derive(Parser)]
#[command(name = "wikibench", version, about = "Wikipedia game benchmark for LLM agents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run benchmark conditions
    Benchmark {
        /// Run all 5 conditions in order
        #[arg(long)]
        all: bool,

        /// Run a single condition by name
        #[arg(long)]
        condition: Option<String>,

        /// Output directory root
        #[arg(long, default_value = "outputs")]
        out: PathBuf,
    },
    /// One-shot shortest path query between two articles
    Path {
        #[arg(long)]
        start: String,

        #[arg(long)]
        target: String,

        #[arg(long, default_value_t = 10)]
        max_depth: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Benchmark {
            all,
            condition,
            out,
        } => {
            let mut config = RunConfig::default();
            config.outputs_dir = out;

            // Startup-fatal checks: unknown models and missing credentials
            // surface here, never mid-run.
            validate_roster(&config.models)?;
            let gateway = Arc::new(PolicyGateway::from_env()?);
            let api = WikiClient::new()?;

            let mut orchestrator = Orchestrator::new(api, gateway, config.clone());

            if all {
                let results = orchestrator.run_all().await?;
                for (condition, metrics) in &results {
                    write_outputs(&config.outputs_dir, condition.name(), metrics)?;
                }
                println!("All results written to {}", config.outputs_dir.display());
            } else if let Some(name) = condition {
                let Some(condition) = Condition::from_name(&name) else {
                    let available: Vec<&str> =
                        Condition::all().iter().map(|c| c.name()).collect();
                    return Err(format!(
                        "unknown condition: {name} (available: {})",
                        available.join(", ")
                    )
                    .into());
                };

                if condition == Condition::Tips {
                    orchestrator.load_tips().await;
                }

                let metrics = orchestrator.run_condition(condition).await?;
                write_outputs(&config.outputs_dir, condition.name(), &metrics)?;
                print_summary(&metrics);
                println!(
                    "Results written to {}",
                    config.outputs_dir.join(condition.name()).display()
                );
            } else {
                return Err("specify --all or --condition <name>".into());
            }
        }
        Commands::Path {
            start,
            target,
            max_depth,
        } => {
            let api = WikiClient::new()?;
            let mut finder = PathFinder::with_max_depth(api, max_depth);
            match finder.shortest_path(&start, &target).await? {
                Some(distance) => println!("{start} -> {target}: {distance} clicks"),
                None => println!("{start} -> {target}: no path found within depth {max_depth}"),
            }
        }
    }

    Ok(())
}

fn write_outputs(
    outputs_dir: &std::path::Path,
    condition_name: &str,
    metrics: &BenchmarkMetrics,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = outputs_dir.join(condition_name);
    std::fs::create_dir_all(&dir)?;

    write_benchmark_csv(metrics, &dir.join("results.csv"))?;
    write_summary_csv(metrics, &dir.join("summary.csv"))?;

    let (sink, worker) = JsonlTraceSink::new(dir.join("traces.jsonl"))?;
    record_benchmark(metrics, &sink)?;
    drop(sink);
    worker.join()?;

    Ok(())
}

fn print_summary(metrics: &BenchmarkMetrics) {
    println!("\n{} summary:", metrics.benchmark_name);
    for model in metrics.models.values() {
        println!(
            "  {:<32} attempts={} trimmed={} median_clicks={:.1} solve_rate={:.0}%",
            model.model_id,
            model.attempts.len(),
            model.trimmed_count,
            model.median_clicks,
            model.solve_rate,
        );
    }
}
