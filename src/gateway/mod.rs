//! Policy gateway for OpenRouter chat completions.

pub mod error;
pub mod openrouter;
pub mod reasoning;
pub mod types;

use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use openrouter::{ChatProvider, OpenRouterAdapter};

pub use error::{ErrorContext, ProviderError};
pub use reasoning::{reasoning_params, validate_roster, ReasoningMode};
pub use types::{ChatRequest, ChatResponse, Message, Role};

#[async_trait::async_trait]
pub trait ChatGateway: Send + Sync {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_base_delay: Duration::from_secs(1),
        }
    }
}

/// Adapter plus bounded-retry policy. Transient faults (429, 5xx,
/// connect/timeout) are retried with exponential backoff; permanent
/// errors surface on the first attempt.
pub struct PolicyGateway {
    openrouter: OpenRouterAdapter,
    config: GatewayConfig,
}

#[async_trait::async_trait]
impl ChatGateway for PolicyGateway {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, ProviderError> {
        PolicyGateway::chat(self, req).await
    }
}

impl PolicyGateway {
    pub fn from_env() -> Result<Self, ProviderError> {
        let openrouter = OpenRouterAdapter::from_env()?;
        Ok(Self {
            openrouter,
            config: GatewayConfig::default(),
        })
    }

    pub fn with_config(openrouter: OpenRouterAdapter, config: GatewayConfig) -> Self {
        Self { openrouter, config }
    }

    pub async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let mut last_error: Option<ProviderError> = None;

        for attempt in 0..=self.config.max_retries {
            match self.openrouter.chat(&req).await {
                Ok(resp) => return Ok(resp),
                Err(err) => {
                    if !err.is_retryable() || attempt == self.config.max_retries {
                        return Err(err);
                    }

                    let delay = backoff_delay(self.config.retry_base_delay, attempt);
                    warn!(
                        model = %req.model,
                        code = err.code(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Policy call failed; retrying"
                    );
                    last_error = Some(err);
                    sleep(delay).await;
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ProviderError::provider("openrouter", "unknown error", false)))
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let multiplier = 2u64.pow(attempt.min(5));
    base * multiplier as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(200));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(800));
    }
}
