//! Reasoning intensity mapping for OpenRouter models.
//!
//! OpenRouter normalizes thinking controls into a `reasoning` object, but
//! the accepted shape differs per provider: OpenAI and Google take an
//! `effort` string, Anthropic takes a `max_tokens` budget and additionally
//! requires the request's own max_tokens to exceed that budget.

use serde_json::{json, Value};

use super::error::ProviderError;

/// Reasoning intensity levels for benchmark runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningMode {
    Highest,
    Lowest,
}

impl ReasoningMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningMode::Highest => "highest",
            ReasoningMode::Lowest => "lowest",
        }
    }
}

/// Per-model reasoning payloads. Thinking output is always excluded from
/// the response; only the final answer text is scored.
fn reasoning_value(model_id: &str, mode: ReasoningMode) -> Option<Value> {
    let v = match (model_id, mode) {
        ("openai/gpt-5.2", ReasoningMode::Highest) => {
            json!({"effort": "xhigh", "exclude": true})
        }
        ("openai/gpt-5.2", ReasoningMode::Lowest) => {
            json!({"effort": "none", "exclude": true})
        }
        ("anthropic/claude-opus-4.5", ReasoningMode::Highest) => {
            json!({"max_tokens": 16384, "exclude": true})
        }
        ("anthropic/claude-opus-4.5", ReasoningMode::Lowest) => {
            json!({"max_tokens": 1024, "exclude": true})
        }
        ("x-ai/grok-4.1-fast", ReasoningMode::Highest) => {
            json!({"effort": "high", "exclude": true})
        }
        ("x-ai/grok-4.1-fast", ReasoningMode::Lowest) => {
            json!({"effort": "low", "exclude": true})
        }
        ("google/gemini-3-flash-preview", ReasoningMode::Highest) => {
            json!({"effort": "high", "exclude": true})
        }
        ("google/gemini-3-flash-preview", ReasoningMode::Lowest) => {
            json!({"effort": "minimal", "exclude": true})
        }
        _ => return None,
    };
    Some(v)
}

/// Reasoning parameters for a model and mode.
///
/// Unknown model IDs are a configuration error, surfaced at startup when
/// the roster is validated rather than mid-run.
pub fn reasoning_params(model_id: &str, mode: ReasoningMode) -> Result<Value, ProviderError> {
    reasoning_value(model_id, mode)
        .ok_or_else(|| ProviderError::config(format!("unknown model: {model_id}")))
}

/// Thinking-token budget for models that express reasoning as a budget.
///
/// Returns `None` for effort-based models. The adapter uses this to keep
/// the request max_tokens above the budget.
pub fn reasoning_token_budget(model_id: &str, mode: ReasoningMode) -> Option<u32> {
    if !model_id.starts_with("anthropic/") {
        return None;
    }
    reasoning_value(model_id, mode)
        .and_then(|v| v.get("max_tokens").and_then(Value::as_u64))
        .map(|b| b as u32)
}

/// Validate that every model in the roster has a reasoning configuration.
pub fn validate_roster(models: &[String]) -> Result<(), ProviderError> {
    for model in models {
        reasoning_params(model, ReasoningMode::Highest)?;
        reasoning_params(model, ReasoningMode::Lowest)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_models_have_both_modes() {
        for model in crate::config::MODELS {
            assert!(reasoning_params(model, ReasoningMode::Highest).is_ok());
            assert!(reasoning_params(model, ReasoningMode::Lowest).is_ok());
        }
    }

    #[test]
    fn unknown_model_is_config_error() {
        let err = reasoning_params("acme/unknown", ReasoningMode::Highest).unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
    }

    #[test]
    fn budget_only_for_anthropic() {
        assert_eq!(
            reasoning_token_budget("anthropic/claude-opus-4.5", ReasoningMode::Highest),
            Some(16384)
        );
        assert_eq!(
            reasoning_token_budget("openai/gpt-5.2", ReasoningMode::Highest),
            None
        );
    }

    #[test]
    fn roster_validation_rejects_strangers() {
        let good: Vec<String> = crate::config::MODELS.iter().map(|m| m.to_string()).collect();
        assert!(validate_roster(&good).is_ok());

        let bad = vec!["acme/unknown".to_string()];
        assert!(validate_roster(&bad).is_err());
    }
}
