//! Condition orchestration: fan out attempts, isolate failures, aggregate.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::gateway::{ChatGateway, ReasoningMode};
use crate::game::{GameEngine, GameRequest};
use crate::wiki::api::WikiClient;
use crate::wiki::pathfinder::PathFinder;
use crate::wiki::sampler::ArticleSampler;

use super::attempt::AttemptRunner;
use super::conditions::{condition_config, Condition};
use super::metrics::BenchmarkMetrics;
use super::BenchError;

/// Depth bound for the peer-pressure best-path precompute. Shallower
/// than per-step scoring; these paths are advertised, not scored.
const PRECOMPUTE_MAX_DEPTH: u32 = 4;

/// Runs benchmark conditions over the model roster.
pub struct Orchestrator<G: ChatGateway + 'static> {
    api: WikiClient,
    gateway: Arc<G>,
    config: RunConfig,
    semaphore: Arc<Semaphore>,
    /// model_id -> tips text, carried from baseline to the tips condition.
    tips: HashMap<String, String>,
}

impl<G: ChatGateway + 'static> Orchestrator<G> {
    pub fn new(api: WikiClient, gateway: Arc<G>, config: RunConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_attempts));
        Self {
            api,
            gateway,
            config,
            semaphore,
            tips: HashMap::new(),
        }
    }

    fn tips_dir(&self) -> PathBuf {
        self.config.outputs_dir.join("baseline").join("tips")
    }

    fn tips_file(&self, model_id: &str) -> PathBuf {
        self.tips_dir()
            .join(format!("{}.txt", model_id.replace('/', "_")))
    }

    /// Run one complete condition: sample pairs, fan out every
    /// model x pair attempt under the global cap, fold the survivors.
    pub async fn run_condition(
        &mut self,
        condition: Condition,
    ) -> Result<BenchmarkMetrics, BenchError> {
        let cfg = condition_config(condition);
        let mut metrics = BenchmarkMetrics::new(cfg.name);

        let sampler = ArticleSampler::new(self.api.clone());
        let cutoff = cfg.post_cutoff_only.then_some(self.config.cutoff_date);

        info!(
            condition = cfg.name,
            pairs = self.config.attempts_per_model,
            "Sampling article pairs"
        );
        let pairs = sampler
            .sample_article_pairs(self.config.attempts_per_model, cutoff)
            .await?;

        if pairs.len() < self.config.attempts_per_model {
            warn!(
                condition = cfg.name,
                wanted = self.config.attempts_per_model,
                got = pairs.len(),
                "Sampling came up short"
            );
        }

        // Peer pressure advertises the optimal click count, so those
        // paths must exist before any attempt starts.
        let mut best_paths: HashMap<(String, String), Option<u32>> = HashMap::new();
        if cfg.use_peer_pressure {
            let mut finder =
                PathFinder::with_max_depth(self.api.clone(), PRECOMPUTE_MAX_DEPTH);
            for (start, target) in &pairs {
                let best = finder.shortest_path(start, target).await?;
                info!(start = %start, target = %target, ?best, "Precomputed best path");
                best_paths.insert((start.clone(), target.clone()), best);
            }
        }

        let total = self.config.models.len() * pairs.len();
        info!(condition = cfg.name, attempts = total, "Running attempts");

        let mut handles = Vec::with_capacity(total);
        for model_id in &self.config.models {
            for (attempt_id, (start, target)) in pairs.iter().enumerate() {
                let semaphore = self.semaphore.clone();
                let runner = AttemptRunner::new(
                    self.api.clone(),
                    self.gateway.clone(),
                    self.config.clone(),
                );
                let model_id = model_id.clone();
                let start = start.clone();
                let target = target.clone();
                let tips = self.tips.get(&model_id).cloned();
                let best = best_paths.get(&(start.clone(), target.clone())).copied();

                handles.push(tokio::spawn(async move {
                    let _permit = semaphore.acquire().await.expect("semaphore closed");
                    match runner
                        .run_attempt(
                            &model_id,
                            attempt_id,
                            &start,
                            &target,
                            &cfg,
                            tips.as_deref(),
                            best,
                        )
                        .await
                    {
                        Ok(attempt) => Some(attempt),
                        Err(e) => {
                            // A broken attempt is dropped, never fatal to
                            // the batch. It shrinks the sample instead.
                            warn!(
                                model = %model_id,
                                attempt_id,
                                start = %start,
                                target = %target,
                                error = %e,
                                "Attempt dropped"
                            );
                            None
                        }
                    }
                }));
            }
        }

        let mut completed = 0usize;
        for joined in future::join_all(handles).await {
            match joined {
                Ok(Some(attempt)) => {
                    completed += 1;
                    metrics.add_attempt(attempt);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Attempt task panicked"),
            }
        }
        info!(
            condition = cfg.name,
            completed,
            dropped = total - completed,
            "Condition finished"
        );

        if cfg.collect_tips {
            self.collect_all_tips(&pairs).await;
        }

        metrics
            .compute_all_statistics(self.config.max_clicks, self.config.trimmed_drop_count);

        Ok(metrics)
    }

    /// Run all five conditions in their canonical order, reloading the
    /// baseline tips before the tips condition.
    pub async fn run_all(&mut self) -> Result<Vec<(Condition, BenchmarkMetrics)>, BenchError> {
        let mut results = Vec::new();

        for condition in Condition::all() {
            if condition == Condition::Tips {
                self.load_tips().await;
            }
            info!(condition = condition.name(), "Starting condition");
            let metrics = self.run_condition(condition).await?;
            results.push((condition, metrics));
        }

        Ok(results)
    }

    /// After baseline, have every model play one extra game and write
    /// down advice for its future self.
    async fn collect_all_tips(&mut self, pairs: &[(String, String)]) {
        let Some((start, target)) = pairs.first() else {
            return;
        };

        info!("Collecting tips from models");
        let engine = GameEngine::new(
            self.api.clone(),
            self.gateway.clone(),
            self.config.max_clicks,
            self.config.move_retry_budget,
        );
        let runner = AttemptRunner::new(
            self.api.clone(),
            self.gateway.clone(),
            self.config.clone(),
        );

        for model_id in self.config.models.clone() {
            let result = engine
                .play(&GameRequest {
                    model_id: model_id.clone(),
                    start_title: start.clone(),
                    target_title: target.clone(),
                    reasoning_mode: ReasoningMode::Highest,
                    system_prompt_prefix: String::new(),
                })
                .await;

            match runner.collect_tips(&model_id, &result).await {
                Ok(tips) => {
                    if let Err(e) = self.persist_tips(&model_id, &tips).await {
                        warn!(model = %model_id, error = %e, "Failed to persist tips");
                    }
                    self.tips.insert(model_id, tips);
                }
                Err(e) => warn!(model = %model_id, error = %e, "Tips collection failed"),
            }
        }
    }

    async fn persist_tips(&self, model_id: &str, tips: &str) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.tips_dir()).await?;
        tokio::fs::write(self.tips_file(model_id), tips).await
    }

    /// Load tips persisted by an earlier baseline run.
    pub async fn load_tips(&mut self) {
        for model_id in self.config.models.clone() {
            match tokio::fs::read_to_string(self.tips_file(&model_id)).await {
                Ok(tips) => {
                    self.tips.insert(model_id, tips);
                }
                Err(_) => {
                    warn!(model = %model_id, "No baseline tips found");
                }
            }
        }
    }

    /// Tips currently loaded (tests and the tips condition inspect this).
    pub fn tips(&self) -> &HashMap<String, String> {
        &self.tips
    }
}
