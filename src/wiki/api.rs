//! MediaWiki API client with admission control.
//!
//! Every outbound request passes through one gate shared by all callers:
//! a 3-permit semaphore with a 200 ms pre-dispatch delay held under the
//! permit. Transient failures retry up to 3 attempts with increasing
//! backoff; a missing article is terminal and never retried.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::warn;

use crate::config::WIKIPEDIA_API_URL;

/// Maximum attempts for a single logical request.
const MAX_ATTEMPTS: u32 = 3;

/// Backoff unit between attempts; attempt n waits n times this.
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// In-flight request cap shared across all attempts in the process.
const MAX_IN_FLIGHT: usize = 3;

/// Delay before each dispatch, held under the admission permit.
const DISPATCH_DELAY: Duration = Duration::from_millis(200);

/// Errors from the link graph service.
#[derive(Debug, Error)]
pub enum WikiError {
    /// The article does not exist. Never retried.
    #[error("article not found: {title}")]
    NotFound { title: String },

    /// Retries exhausted on a transient fault, or a terminal API error.
    #[error("wiki fetch failed after {attempts} attempts: {message}")]
    Fetch { message: String, attempts: u32 },

    /// Response body was not the expected shape.
    #[error("unexpected wiki response: {0}")]
    InvalidResponse(String),
}

impl WikiError {
    fn fetch(message: impl Into<String>, attempts: u32) -> Self {
        Self::Fetch {
            message: message.into(),
            attempts,
        }
    }
}

/// MediaWiki API accessor. Cheap to clone; all clones share one
/// admission gate and one connection pool.
#[derive(Clone)]
pub struct WikiClient {
    client: reqwest::Client,
    api_url: String,
    gate: Arc<Semaphore>,
    dispatch_delay: Duration,
}

impl WikiClient {
    /// Client against the live Wikipedia API.
    pub fn new() -> Result<Self, WikiError> {
        Self::with_api_url(WIKIPEDIA_API_URL)
    }

    /// Client against a custom endpoint (tests point this at a mock).
    pub fn with_api_url(api_url: impl Into<String>) -> Result<Self, WikiError> {
        let mut headers = reqwest::header::HeaderMap::new();
        // Wikipedia requires a descriptive User-Agent.
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(
                "WikiBench/1.0 (https://github.com/wikibench; wikibench@example.com)",
            ),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .gzip(true)
            .build()
            .map_err(|e| WikiError::fetch(format!("failed to create HTTP client: {e}"), 0))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            gate: Arc::new(Semaphore::new(MAX_IN_FLIGHT)),
            dispatch_delay: DISPATCH_DELAY,
        })
    }

    /// Shrink the dispatch delay (tests).
    #[doc(hidden)]
    pub fn with_dispatch_delay(mut self, delay: Duration) -> Self {
        self.dispatch_delay = delay;
        self
    }

    /// One HTTP GET through the admission gate. No retry here.
    async fn dispatch(&self, params: &[(&str, &str)]) -> Result<Value, FetchFailure> {
        let _permit = self.gate.acquire().await.expect("semaphore closed");
        sleep(self.dispatch_delay).await;

        let response = self
            .client
            .get(&self.api_url)
            .query(params)
            .send()
            .await
            .map_err(FetchFailure::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure {
                message: format!("HTTP {}", status.as_u16()),
                retryable: status.as_u16() == 429 || status.as_u16() >= 500,
            });
        }

        response.json::<Value>().await.map_err(|e| FetchFailure {
            message: format!("invalid JSON: {e}"),
            retryable: true,
        })
    }

    /// GET with bounded retry on transient failures.
    async fn fetch_json(&self, params: &[(&str, &str)]) -> Result<Value, WikiError> {
        let mut last: Option<FetchFailure> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.dispatch(params).await {
                Ok(value) => return Ok(value),
                Err(failure) => {
                    if !failure.retryable || attempt == MAX_ATTEMPTS {
                        return Err(WikiError::fetch(failure.message, attempt));
                    }
                    warn!(
                        attempt,
                        error = %failure.message,
                        "Wiki request failed; retrying"
                    );
                    last = Some(failure);
                    sleep(RETRY_BACKOFF * attempt).await;
                }
            }
        }

        Err(WikiError::fetch(
            last.map(|f| f.message).unwrap_or_else(|| "unknown".into()),
            MAX_ATTEMPTS,
        ))
    }

    /// `action=query` request with standard parameters folded in.
    async fn query(&self, extra: &[(&str, &str)]) -> Result<Value, WikiError> {
        let mut params = vec![("format", "json"), ("action", "query")];
        params.extend_from_slice(extra);
        self.fetch_json(&params).await
    }

    /// All namespace-0 outgoing links from a page, following continuation
    /// until exhausted.
    pub async fn page_links(&self, title: &str) -> Result<Vec<String>, WikiError> {
        let mut links = Vec::new();
        let mut continue_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("titles", title),
                ("prop", "links"),
                ("pllimit", "max"),
                ("plnamespace", "0"),
            ];
            if let Some(token) = continue_token.as_deref() {
                params.push(("plcontinue", token));
            }

            let data = self.query(&params).await?;

            if let Some(pages) = data
                .get("query")
                .and_then(|q| q.get("pages"))
                .and_then(Value::as_object)
            {
                for page in pages.values() {
                    if let Some(page_links) = page.get("links").and_then(Value::as_array) {
                        for link in page_links {
                            if let Some(t) = link.get("title").and_then(Value::as_str) {
                                links.push(t.to_string());
                            }
                        }
                    }
                }
            }

            continue_token = data
                .get("continue")
                .and_then(|c| c.get("plcontinue"))
                .and_then(Value::as_str)
                .map(|s| s.to_string());

            if continue_token.is_none() {
                break;
            }
        }

        Ok(links)
    }

    /// Rendered HTML of a page via `action=parse`.
    pub async fn page_html(&self, title: &str) -> Result<String, WikiError> {
        let params = [
            ("format", "json"),
            ("action", "parse"),
            ("page", title),
            ("prop", "text"),
            ("disableeditsection", "true"),
        ];

        let data = self.fetch_json(&params).await?;

        if let Some(error) = data.get("error") {
            let code = error.get("code").and_then(Value::as_str).unwrap_or("");
            if code == "missingtitle" {
                return Err(WikiError::NotFound {
                    title: title.to_string(),
                });
            }
            let info = error
                .get("info")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(WikiError::fetch(
                format!("error fetching page '{title}': {info}"),
                MAX_ATTEMPTS,
            ));
        }

        data.get("parse")
            .and_then(|p| p.get("text"))
            .and_then(|t| t.get("*"))
            .and_then(Value::as_str)
            .map(|s| s.to_string())
            .ok_or_else(|| WikiError::InvalidResponse(format!("no parse text for '{title}'")))
    }

    /// Creation timestamp (first revision) of a page. `None` when the
    /// page is missing.
    pub async fn page_creation_date(
        &self,
        title: &str,
    ) -> Result<Option<DateTime<Utc>>, WikiError> {
        let data = self
            .query(&[
                ("titles", title),
                ("prop", "revisions"),
                ("rvdir", "newer"),
                ("rvlimit", "1"),
                ("rvprop", "timestamp"),
            ])
            .await?;

        let Some(pages) = data
            .get("query")
            .and_then(|q| q.get("pages"))
            .and_then(Value::as_object)
        else {
            return Ok(None);
        };

        for page in pages.values() {
            if page.get("missing").is_some() {
                return Ok(None);
            }
            if let Some(ts) = page
                .get("revisions")
                .and_then(Value::as_array)
                .and_then(|revs| revs.first())
                .and_then(|rev| rev.get("timestamp"))
                .and_then(Value::as_str)
            {
                let parsed = DateTime::parse_from_rfc3339(ts)
                    .map_err(|e| WikiError::InvalidResponse(format!("bad timestamp '{ts}': {e}")))?;
                return Ok(Some(parsed.with_timezone(&Utc)));
            }
        }

        Ok(None)
    }

    /// Whether a page carries the disambiguation page property.
    pub async fn is_disambiguation(&self, title: &str) -> Result<bool, WikiError> {
        let data = self
            .query(&[
                ("titles", title),
                ("prop", "pageprops"),
                ("ppprop", "disambiguation"),
            ])
            .await?;

        let found = data
            .get("query")
            .and_then(|q| q.get("pages"))
            .and_then(Value::as_object)
            .map(|pages| {
                pages.values().any(|page| {
                    page.get("pageprops")
                        .and_then(|pp| pp.get("disambiguation"))
                        .is_some()
                })
            })
            .unwrap_or(false);

        Ok(found)
    }

    /// Random namespace-0 article titles.
    pub async fn random_articles(&self, count: usize) -> Result<Vec<String>, WikiError> {
        let limit = count.to_string();
        let data = self
            .query(&[
                ("generator", "random"),
                ("grnnamespace", "0"),
                ("grnlimit", &limit),
            ])
            .await?;

        let mut titles = Vec::new();
        if let Some(pages) = data
            .get("query")
            .and_then(|q| q.get("pages"))
            .and_then(Value::as_object)
        {
            for page in pages.values() {
                if let Some(t) = page.get("title").and_then(Value::as_str) {
                    titles.push(t.to_string());
                }
            }
        }

        Ok(titles)
    }
}

/// Outcome of a single dispatch, before retry classification.
struct FetchFailure {
    message: String,
    retryable: bool,
}

impl FetchFailure {
    fn transport(e: reqwest::Error) -> Self {
        Self {
            message: e.to_string(),
            retryable: e.is_timeout() || e.is_connect() || e.is_request(),
        }
    }
}
