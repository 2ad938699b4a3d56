//! Pipeline stages and their per-run data.

use serde::{Deserialize, Serialize};

/// One step of the fixed six-stage pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Research,
    Outline,
    Draft,
    Critique,
    Seo,
    Evaluate,
}

impl Stage {
    /// Every stage in execution order.
    pub const ALL: [Stage; 6] = [
        Stage::Research,
        Stage::Outline,
        Stage::Draft,
        Stage::Critique,
        Stage::Seo,
        Stage::Evaluate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Research => "research",
            Stage::Outline => "outline",
            Stage::Draft => "draft",
            Stage::Critique => "critique",
            Stage::Seo => "seo",
            Stage::Evaluate => "evaluate",
        }
    }

    /// Name of the agent that runs this stage. Also used as the telemetry label.
    pub fn agent_name(self) -> &'static str {
        match self {
            Stage::Research => "research_agent",
            Stage::Outline => "outline_agent",
            Stage::Draft => "draft_agent",
            Stage::Critique => "critic_agent",
            Stage::Seo => "seo_agent",
            Stage::Evaluate => "evaluation_agent",
        }
    }

    /// 1-based position in the pipeline.
    pub fn position(self) -> usize {
        Stage::ALL
            .iter()
            .position(|s| *s == self)
            .map(|i| i + 1)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs of one pipeline run. Built once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    pub topic: String,
    pub tone: String,
    pub audience: String,
    pub target_word_count: String,
    #[serde(default)]
    pub extra_instructions: Option<String>,
}

impl RunContext {
    pub fn new(
        topic: impl Into<String>,
        tone: impl Into<String>,
        audience: impl Into<String>,
        target_word_count: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            tone: tone.into(),
            audience: audience.into(),
            target_word_count: target_word_count.into(),
            extra_instructions: None,
        }
    }

    pub fn with_extra_instructions(mut self, extra: impl Into<String>) -> Self {
        self.extra_instructions = Some(extra.into());
        self
    }
}

/// Output of one stage after post-processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: Stage,
    pub text: String,
    pub duration_seconds: f64,
    pub succeeded: bool,
}
