//! The per-attempt game loop.
//!
//! One traversal alternates between fetching the current page, asking the
//! policy for a move, validating it against the on-page link index, and
//! advancing. Moves are strictly sequential; there is nothing to
//! parallelize inside a single attempt.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::gateway::{ChatGateway, ChatRequest, Message, ReasoningMode};
use crate::prompts;
use crate::wiki::api::WikiClient;
use crate::wiki::article::fetch_article_text;
use crate::wiki::links::{
    article_url, extract_links, normalize_title, normalize_wiki_url, title_from_url, titles_match,
};

use super::parser::parse_response;

/// One move within an attempt. Immutable once recorded.
#[derive(Debug, Clone)]
pub struct GameStep {
    pub step_index: u32,
    pub current_page_title: String,
    pub current_page_url: String,
    pub chosen_link_markdown: String,
    pub chosen_target_title: String,
    pub chosen_target_url: String,
    pub timestamp_utc: DateTime<Utc>,
}

/// Terminal state of one traversal.
///
/// `total_clicks` counts moves actually made, for solved and failed runs
/// alike; ranking cost clamps failures elsewhere.
#[derive(Debug, Clone)]
pub struct GameResult {
    pub start_title: String,
    pub target_title: String,
    pub solved: bool,
    pub total_clicks: u32,
    pub steps: Vec<GameStep>,
    /// Titles visited, starting with the start article.
    pub path: Vec<String>,
}

/// Parameters for one traversal.
#[derive(Debug, Clone)]
pub struct GameRequest {
    pub model_id: String,
    pub start_title: String,
    pub target_title: String,
    pub reasoning_mode: ReasoningMode,
    /// Prepended to the task preamble (tips, peer-pressure framing).
    pub system_prompt_prefix: String,
}

pub struct GameEngine<G: ChatGateway> {
    api: WikiClient,
    gateway: Arc<G>,
    max_clicks: u32,
    move_retry_budget: u32,
}

impl<G: ChatGateway> GameEngine<G> {
    pub fn new(api: WikiClient, gateway: Arc<G>, max_clicks: u32, move_retry_budget: u32) -> Self {
        Self {
            api,
            gateway,
            max_clicks,
            move_retry_budget,
        }
    }

    /// Play a single game from start to target.
    pub async fn play(&self, req: &GameRequest) -> GameResult {
        let mut current_title = req.start_title.clone();
        let mut current_url = article_url(&req.start_title);
        let mut path = vec![req.start_title.clone()];
        let mut steps: Vec<GameStep> = Vec::new();

        let system_prompt = format!(
            "{}{}",
            req.system_prompt_prefix,
            prompts::system_prompt(&req.target_title)
        );

        // The start already being the target counts as solved with no moves.
        if titles_match(&current_title, &req.target_title) {
            return self.finish(req, true, steps, path);
        }

        for click_num in 0..self.max_clicks {
            // An unreadable page offers no valid moves; hard stop.
            let content = match fetch_article_text(&self.api, &current_title).await {
                Ok((_, text)) if !text.is_empty() => text,
                Ok(_) => {
                    warn!(title = %current_title, "Empty article content; ending attempt");
                    return self.finish(req, false, steps, path);
                }
                Err(e) => {
                    warn!(title = %current_title, error = %e, "Content fetch failed; ending attempt");
                    return self.finish(req, false, steps, path);
                }
            };

            let valid_links = extract_links(&content);
            let valid_urls: Vec<&str> = valid_links.iter().map(|(_, href)| href.as_str()).collect();

            let messages = vec![
                Message::system(&system_prompt),
                Message::user(prompts::user_prompt(&current_title, &content)),
            ];

            let Some((link_text, link_url)) = self
                .select_move(req, messages, &valid_urls)
                .await
            else {
                // Retry budget exhausted without a valid move.
                return self.finish(req, false, steps, path);
            };

            let next_title = title_from_url(&link_url);

            steps.push(GameStep {
                step_index: click_num,
                current_page_title: current_title.clone(),
                current_page_url: current_url.clone(),
                chosen_link_markdown: format!("[{link_text}]({link_url})"),
                chosen_target_title: next_title.clone(),
                chosen_target_url: link_url.clone(),
                timestamp_utc: Utc::now(),
            });

            current_title = next_title;
            current_url = link_url;
            path.push(current_title.clone());

            if titles_match(&current_title, &req.target_title) {
                return self.finish(req, true, steps, path);
            }
        }

        // Move ceiling reached without finding the target.
        self.finish(req, false, steps, path)
    }

    /// Ask the policy for a move until one validates or the per-move
    /// retry budget runs out.
    async fn select_move(
        &self,
        req: &GameRequest,
        messages: Vec<Message>,
        valid_urls: &[&str],
    ) -> Option<(String, String)> {
        for retry in 0..self.move_retry_budget {
            let chat_req = ChatRequest::new(
                req.model_id.clone(),
                messages.clone(),
                req.reasoning_mode,
            );

            let response = match self.gateway.chat(chat_req).await {
                Ok(resp) => resp,
                Err(e) => {
                    warn!(model = %req.model_id, retry, error = %e, "Policy call failed");
                    continue;
                }
            };

            let Some((text, href)) = parse_response(&response.content) else {
                debug!(model = %req.model_id, retry, "No link in policy response");
                continue;
            };

            if let Some(resolved) = resolve_against_page(&href, valid_urls) {
                return Some((text, resolved));
            }

            debug!(model = %req.model_id, retry, href = %href, "Chosen link not on current page");
        }

        None
    }

    fn finish(
        &self,
        req: &GameRequest,
        solved: bool,
        steps: Vec<GameStep>,
        path: Vec<String>,
    ) -> GameResult {
        GameResult {
            start_title: req.start_title.clone(),
            target_title: req.target_title.clone(),
            solved,
            total_clicks: steps.len() as u32,
            steps,
            path,
        }
    }
}

/// Match a proposed href against the on-page targets: exactly first, then
/// with trailing slashes stripped, then by resolved article title (models
/// answer with absolute URLs where the page used relative ones). Always
/// returns the on-page form.
fn resolve_against_page(href: &str, valid_urls: &[&str]) -> Option<String> {
    if valid_urls.contains(&href) {
        return Some(href.to_string());
    }

    let stripped = href.trim_end_matches('/');
    if let Some(found) = valid_urls
        .iter()
        .find(|v| v.trim_end_matches('/') == stripped)
    {
        return Some(found.to_string());
    }

    let key = normalize_title(&normalize_wiki_url(href)?);
    valid_urls
        .iter()
        .find(|v| {
            normalize_wiki_url(v)
                .map(|t| normalize_title(&t) == key)
                .unwrap_or(false)
        })
        .map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_wins() {
        let valid = ["/wiki/Animal", "/wiki/Plant"];
        assert_eq!(
            resolve_against_page("/wiki/Animal", &valid),
            Some("/wiki/Animal".to_string())
        );
    }

    #[test]
    fn trailing_slash_differences_are_tolerated() {
        let valid = ["/wiki/Animal"];
        assert_eq!(
            resolve_against_page("/wiki/Animal/", &valid),
            Some("/wiki/Animal".to_string())
        );

        let valid = ["/wiki/Animal/"];
        assert_eq!(
            resolve_against_page("/wiki/Animal", &valid),
            Some("/wiki/Animal/".to_string())
        );
    }

    #[test]
    fn absolute_url_resolves_to_the_relative_on_page_form() {
        let valid = ["/wiki/Animal"];
        assert_eq!(
            resolve_against_page("https://en.wikipedia.org/wiki/Animal", &valid),
            Some("/wiki/Animal".to_string())
        );
    }

    #[test]
    fn off_page_targets_are_rejected() {
        let valid = ["/wiki/Animal"];
        assert_eq!(resolve_against_page("/wiki/Fungus", &valid), None);
    }
}
