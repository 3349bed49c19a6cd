//! Core types for the policy gateway.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::reasoning::ReasoningMode;

// =============================================================================
// CHAT TYPES
// =============================================================================

/// Chat message role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Request for a chat completion.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// OpenRouter model ID, e.g. "anthropic/claude-opus-4.5".
    pub model: String,
    /// Messages in the conversation.
    pub messages: Vec<Message>,
    /// Reasoning intensity for this call.
    pub reasoning_mode: ReasoningMode,
    /// Maximum tokens to generate. The adapter raises this above the
    /// thinking budget for models that require it.
    pub max_tokens: u32,
}

impl ChatRequest {
    pub fn new(
        model: impl Into<String>,
        messages: Vec<Message>,
        reasoning_mode: ReasoningMode,
    ) -> Self {
        Self {
            model: model.into(),
            messages,
            reasoning_mode,
            max_tokens: 4096,
        }
    }

    pub fn max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    /// Provider route, e.g. "anthropic" from "anthropic/claude-opus-4.5".
    pub fn route(&self) -> &str {
        self.model.split('/').next().unwrap_or(&self.model)
    }
}

/// Response from a chat completion.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Assistant message content.
    pub content: String,
    /// Prompt tokens reported by the provider.
    pub input_tokens: u32,
    /// Completion tokens reported by the provider.
    pub output_tokens: u32,
    /// Wall-clock time for the request.
    pub latency: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_splits_provider_prefix() {
        let req = ChatRequest::new(
            "anthropic/claude-opus-4.5",
            vec![Message::user("hi")],
            ReasoningMode::Highest,
        );
        assert_eq!(req.route(), "anthropic");
    }
}
