//! Single benchmark attempt with metrics collection.

use std::sync::Arc;

use crate::config::RunConfig;
use crate::gateway::{ChatGateway, ChatRequest, Message, ProviderError, ReasoningMode};
use crate::game::{GameEngine, GameRequest, GameResult};
use crate::prompts;
use crate::wiki::api::{WikiClient, WikiError};
use crate::wiki::pathfinder::{Direction, PathFinder};

use super::conditions::ConditionConfig;
use super::metrics::{AttemptMetrics, StepMetrics};

/// Runs one game attempt and scores it move by move.
///
/// Each attempt gets its own `PathFinder`, so the link-set cache it
/// builds while scoring is never shared with a concurrent attempt.
pub struct AttemptRunner<G: ChatGateway> {
    api: WikiClient,
    gateway: Arc<G>,
    config: RunConfig,
}

impl<G: ChatGateway> AttemptRunner<G> {
    pub fn new(api: WikiClient, gateway: Arc<G>, config: RunConfig) -> Self {
        Self {
            api,
            gateway,
            config,
        }
    }

    /// Run a single attempt and collect metrics.
    ///
    /// `precomputed_best_path` carries a best-path length established
    /// before the run (peer pressure precomputes them); `None` means
    /// compute it here.
    #[allow(clippy::too_many_arguments)]
    pub async fn run_attempt(
        &self,
        model_id: &str,
        attempt_id: usize,
        start_title: &str,
        target_title: &str,
        condition: &ConditionConfig,
        tips: Option<&str>,
        precomputed_best_path: Option<Option<u32>>,
    ) -> Result<AttemptMetrics, WikiError> {
        let mut pathfinder =
            PathFinder::with_max_depth(self.api.clone(), self.config.max_search_depth);

        let best_path_length = match precomputed_best_path {
            Some(best) => best,
            None => pathfinder.shortest_path(start_title, target_title).await?,
        };

        let mut prompt_prefix = String::new();
        if condition.use_tips {
            if let Some(tips) = tips {
                prompt_prefix.push_str(&prompts::tips_preamble(tips));
            }
        }
        if condition.use_peer_pressure {
            prompt_prefix.push_str(&prompts::peer_pressure_preamble(
                model_id,
                start_title,
                target_title,
                best_path_length,
            ));
        }

        let engine = GameEngine::new(
            self.api.clone(),
            self.gateway.clone(),
            self.config.max_clicks,
            self.config.move_retry_budget,
        );

        let result = engine
            .play(&GameRequest {
                model_id: model_id.to_string(),
                start_title: start_title.to_string(),
                target_title: target_title.to_string(),
                reasoning_mode: condition.reasoning_mode,
                system_prompt_prefix: prompt_prefix,
            })
            .await;

        // Score each move: the distance before move i is the distance
        // after move i-1, so each move costs one fresh query.
        let mut steps: Vec<StepMetrics> = Vec::with_capacity(result.steps.len());
        for (i, step) in result.steps.iter().enumerate() {
            let before = match steps.last() {
                Some(prev) => prev.remaining_distance_after,
                None => {
                    debug_assert_eq!(i, 0);
                    pathfinder
                        .remaining_distance(start_title, target_title)
                        .await?
                }
            };
            let after = pathfinder
                .remaining_distance(&step.chosen_target_title, target_title)
                .await?;

            steps.push(StepMetrics {
                step_index: step.step_index,
                remaining_distance_before: before,
                remaining_distance_after: after,
                step_direction: Direction::classify(before, after),
                timestamp_utc: step.timestamp_utc,
            });
        }

        Ok(AttemptMetrics {
            model_id: model_id.to_string(),
            attempt_id,
            start_title: start_title.to_string(),
            target_title: target_title.to_string(),
            solved: result.solved,
            total_clicks: result.total_clicks,
            best_path_length,
            steps,
            trimmed_included: false,
        })
    }

    /// Ask a model for transferable advice after a game. The text is
    /// persisted and fed back in the tips condition; this is the one
    /// deliberate cross-attempt carry-over in the system.
    pub async fn collect_tips(
        &self,
        model_id: &str,
        game_result: &GameResult,
    ) -> Result<String, ProviderError> {
        let prompt = prompts::tips_request_prompt(
            game_result.solved,
            &game_result.path,
            &game_result.target_title,
        );

        let response = self
            .gateway
            .chat(ChatRequest::new(
                model_id,
                vec![Message::user(prompt)],
                ReasoningMode::Highest,
            ))
            .await?;

        Ok(response.content)
    }
}
