//! Per-stage prompt construction.
//!
//! Stages 1-3 open with the base context block; later stages carry only their
//! instruction and the previous stage's output.

use super::stage::RunContext;

const RESEARCH_TASK: &str =
    "You are ResearchAgent. Provide structured notes using google_search tool when helpful.";
const OUTLINE_TASK: &str = "Create a detailed outline from this research:\n";
const DRAFT_TASK: &str = "Write the full blog from this outline:\n";
const CRITIQUE_TASK: &str = "Improve clarity & flow of this markdown blog:\n";
const SEO_TASK: &str = "Add SEO metadata (title, meta description, slug, keywords, social caption) \
                        and return final improved blog markdown below the metadata:\n";
const EVALUATION_TASK: &str =
    "Evaluate this blog article and return JSON as specified in your instructions.\n\n";

/// `Topic/Tone/Audience/Word Count` block, one labelled line each, trailing newline.
pub fn base_block(ctx: &RunContext) -> String {
    format!(
        "Topic: {}\nTone: {}\nAudience: {}\nWord Count: {}\n",
        ctx.topic, ctx.tone, ctx.audience, ctx.target_word_count
    )
}

/// Base block followed by the extra-instructions line, when there is one.
fn context_block(ctx: &RunContext) -> String {
    let mut block = base_block(ctx);
    if let Some(extra) = ctx.extra_instructions.as_deref()
        && !extra.trim().is_empty()
    {
        block.push_str(&format!("Extra Instructions: {}\n", extra.trim()));
    }
    block
}

pub fn research(ctx: &RunContext) -> String {
    format!("{}\n{}", context_block(ctx), RESEARCH_TASK)
}

pub fn outline(ctx: &RunContext, research: &str) -> String {
    format!("{}\n{}{}", context_block(ctx), OUTLINE_TASK, research)
}

pub fn draft(ctx: &RunContext, outline: &str) -> String {
    format!("{}\n{}{}", context_block(ctx), DRAFT_TASK, outline)
}

pub fn critique(draft: &str) -> String {
    format!("{}{}", CRITIQUE_TASK, draft)
}

pub fn seo(critique: &str) -> String {
    format!("{}{}", SEO_TASK, critique)
}

pub fn evaluation(ctx: &RunContext, artifact: &str) -> String {
    format!(
        "{}Tone: {}\nAudience: {}\nTarget Word Count: {}\n\n{}",
        EVALUATION_TASK, ctx.tone, ctx.audience, ctx.target_word_count, artifact
    )
}
