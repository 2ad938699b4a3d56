//! The six pipeline agents and their standing instructions.

use crate::orchestrator::Stage;
use serde::{Deserialize, Serialize};

/// Default Gemini model for every agent.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Handle for one agent: its name, model and system instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub model: String,
    pub instruction: String,
}

impl AgentSpec {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            instruction: instruction.into(),
        }
    }
}

/// One agent per stage, all sharing a model.
#[derive(Debug, Clone)]
pub struct AgentRoster {
    agents: [AgentSpec; 6],
}

impl AgentRoster {
    pub fn new(model: &str) -> Self {
        let agents = Stage::ALL.map(|stage| {
            AgentSpec::new(stage.agent_name(), model, instruction_for(stage))
        });
        Self { agents }
    }

    pub fn for_stage(&self, stage: Stage) -> &AgentSpec {
        &self.agents[stage.position() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentSpec> {
        self.agents.iter()
    }
}

impl Default for AgentRoster {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

fn instruction_for(stage: Stage) -> &'static str {
    match stage {
        Stage::Research => RESEARCH_INSTRUCTION,
        Stage::Outline => OUTLINE_INSTRUCTION,
        Stage::Draft => DRAFT_INSTRUCTION,
        Stage::Critique => CRITIC_INSTRUCTION,
        Stage::Seo => SEO_INSTRUCTION,
        Stage::Evaluate => EVALUATION_INSTRUCTION,
    }
}

const RESEARCH_INSTRUCTION: &str = r#"You are the ResearchAgent.

Gather structured research about the requested blog topic:
- key facts and definitions
- subtopics worth covering
- statistics, when they are relevant and verifiable

Use the google_search tool when fresh information helps.
Answer in concise bullet points. Do not write paragraphs and do not draft the blog."#;

const OUTLINE_INSTRUCTION: &str = r#"You are the OutlineAgent.

Turn the research notes into a clean blog outline using markdown headings (#, ##, ###).
Cover an introduction, the main sections, examples, use cases and a conclusion.
Keep it detailed enough to draft from, but no longer than it needs to be."#;

const DRAFT_INSTRUCTION: &str = r#"You are the DraftAgent.

Expand the outline into a full markdown blog article.
Respect the requested tone, audience and word count.
Use headings, bullet points, examples and clear explanations.
Do not add SEO metadata; produce only the article."#;

const CRITIC_INSTRUCTION: &str = r#"You are the CriticAgent.

Improve the draft for clarity, accuracy, concision, grammar and flow.
Tighten the structure, smooth the transitions and remove redundancy.
Return the complete improved markdown article."#;

const SEO_INSTRUCTION: &str = r#"You are the SEOAgent.

Read the improved article and produce:
- SEO title
- meta description
- URL slug
- keyword list
- social media caption

Then output the final article markdown below the metadata. Keep the metadata concise and compelling."#;

const EVALUATION_INSTRUCTION: &str = r#"You are the EvaluationAgent.

You receive a markdown blog article, optionally with its tone, audience and target word count.
Score it from 0 to 10 on clarity, structure, SEO strength, usefulness for the audience, and overall.

Return only a JSON object of this shape, with no text outside it:
{
  "clarity": 0,
  "structure": 0,
  "seo": 0,
  "usefulness": 0,
  "overall": 0,
  "comments": "one or two sentences of feedback"
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_maps_each_stage_to_its_agent() {
        let roster = AgentRoster::new("gemini-test");
        for stage in Stage::ALL {
            let agent = roster.for_stage(stage);
            assert_eq!(agent.name, stage.agent_name());
            assert_eq!(agent.model, "gemini-test");
            assert!(!agent.instruction.is_empty());
        }
        assert_eq!(roster.iter().count(), 6);
    }

    #[test]
    fn evaluation_instruction_asks_for_json_scores() {
        let roster = AgentRoster::default();
        let eval = &roster.for_stage(Stage::Evaluate).instruction;
        for field in ["clarity", "structure", "seo", "usefulness", "overall", "comments"] {
            assert!(eval.contains(field), "missing {field}");
        }
    }
}
