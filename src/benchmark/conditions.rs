//! Experiment condition configurations.

use crate::gateway::ReasoningMode;

/// The five benchmark conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Baseline,
    Cutoff,
    Tips,
    LowReasoning,
    PeerPressure,
}

impl Condition {
    /// Run order. Only baseline's artifacts (tips, best paths) make the
    /// order meaningful; the rest could run in any order.
    pub fn all() -> [Condition; 5] {
        [
            Condition::Baseline,
            Condition::Cutoff,
            Condition::Tips,
            Condition::LowReasoning,
            Condition::PeerPressure,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Condition::Baseline => "baseline",
            Condition::Cutoff => "cutoff",
            Condition::Tips => "tips",
            Condition::LowReasoning => "low_reasoning",
            Condition::PeerPressure => "peer_pressure",
        }
    }

    pub fn from_name(name: &str) -> Option<Condition> {
        Condition::all().into_iter().find(|c| c.name() == name)
    }
}

/// Fixed configuration for one condition.
#[derive(Debug, Clone, Copy)]
pub struct ConditionConfig {
    pub name: &'static str,
    pub reasoning_mode: ReasoningMode,
    /// Restrict sampling to articles created after the cutoff date.
    pub post_cutoff_only: bool,
    /// Prepend tips collected during baseline.
    pub use_tips: bool,
    /// Prepend competitive framing with the known best path.
    pub use_peer_pressure: bool,
    /// Collect tips from each model after this condition (baseline only).
    pub collect_tips: bool,
}

pub fn condition_config(condition: Condition) -> ConditionConfig {
    match condition {
        Condition::Baseline => ConditionConfig {
            name: "baseline",
            reasoning_mode: ReasoningMode::Highest,
            post_cutoff_only: false,
            use_tips: false,
            use_peer_pressure: false,
            collect_tips: true,
        },
        Condition::Cutoff => ConditionConfig {
            name: "cutoff",
            reasoning_mode: ReasoningMode::Highest,
            post_cutoff_only: true,
            use_tips: false,
            use_peer_pressure: false,
            collect_tips: false,
        },
        Condition::Tips => ConditionConfig {
            name: "tips",
            reasoning_mode: ReasoningMode::Highest,
            post_cutoff_only: false,
            use_tips: true,
            use_peer_pressure: false,
            collect_tips: false,
        },
        Condition::LowReasoning => ConditionConfig {
            name: "low_reasoning",
            reasoning_mode: ReasoningMode::Lowest,
            post_cutoff_only: false,
            use_tips: false,
            use_peer_pressure: false,
            collect_tips: false,
        },
        Condition::PeerPressure => ConditionConfig {
            name: "peer_pressure",
            reasoning_mode: ReasoningMode::Highest,
            post_cutoff_only: false,
            use_tips: false,
            use_peer_pressure: true,
            collect_tips: false,
        },
    }
}
