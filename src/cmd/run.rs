//! The blog pipeline: `blogsmith run`.

use anyhow::{Context, Result};
use blogsmith::agents::AgentRoster;
use blogsmith::config::{Config, RuntimeKind};
use blogsmith::memory::PreferenceStore;
use blogsmith::orchestrator::{PipelineReport, RunContext};
use blogsmith::runtime::AgentRuntime;
use serde_json::{Value, json};
use std::io::{BufRead, IsTerminal};
use std::sync::Arc;

use super::super::{Cli, RunArgs};

const SAMPLE_TOPIC: &str = "Edge Computing";
const SAMPLE_TONE: &str = "Professional";
const SAMPLE_AUDIENCE: &str = "beginner developers";
const SAMPLE_WORD_COUNT: &str = "1500";

/// Per-field fallbacks: stored preferences first, then the sample values.
#[derive(Debug, Clone, PartialEq)]
struct Defaults {
    topic: String,
    tone: String,
    audience: String,
    word_count: String,
}

impl Defaults {
    fn from_store(store: &PreferenceStore) -> Self {
        let stored = |key: &str, sample: &str| {
            store
                .lookup(key)
                .and_then(|v| match v {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .unwrap_or_else(|| sample.to_string())
        };
        Self {
            topic: SAMPLE_TOPIC.to_string(),
            tone: stored("tone", SAMPLE_TONE),
            audience: stored("audience", SAMPLE_AUDIENCE),
            word_count: stored("preferred_word_count", SAMPLE_WORD_COUNT),
        }
    }
}

pub async fn cmd_run(cli: &Cli, args: &RunArgs) -> Result<()> {
    use blogsmith::audit::EventRecorder;
    use blogsmith::memory::SessionOverlay;
    use blogsmith::orchestrator::PipelineOrchestrator;
    use blogsmith::ui::PipelineUI;

    let mut config = super::load_config(cli)?;
    if let Some(kind) = args.runtime {
        config.runtime.kind = kind;
    }
    if let Some(user_id) = &args.user_id {
        config.identity.user_id = user_id.clone();
    }
    if let Some(session_id) = &args.session_id {
        config.identity.session_id = session_id.clone();
    }
    config.validate()?;

    let prefs_path = config.storage.preferences_path.clone();
    let store = Arc::new(PreferenceStore::load(&prefs_path)?);
    let sessions = Arc::new(SessionOverlay::new());

    let defaults = Defaults::from_store(&store);
    let ctx = gather_context(args, &defaults)?;
    tracing::info!(
        topic = %ctx.topic,
        tone = %ctx.tone,
        audience = %ctx.audience,
        word_count = %ctx.target_word_count,
        runtime = %config.runtime.kind,
        "inputs resolved"
    );

    let runtime = build_runtime(&config, &store, &sessions)?;
    let recorder = Arc::new(EventRecorder::new(&config.storage.events_path));
    let orchestrator = PipelineOrchestrator::new(
        runtime,
        recorder,
        AgentRoster::new(&config.runtime.model),
    )
    .with_limits(config.pipeline);

    println!("\nRunning pipeline...\n");
    let ui = PipelineUI::new(cli.verbose);
    let report = orchestrator
        .run_observed(&ctx, &config.session_identity(), &ui)
        .await;
    ui.finish(&report);

    print_report(&report);

    // The pipeline ran; history persistence problems must not change the exit status.
    store.append("blog_history", history_entry(&ctx));
    if let Err(e) = store.save(&prefs_path) {
        tracing::warn!(path = %prefs_path.display(), error = %e, "failed to save preferences");
    }
    Ok(())
}

fn build_runtime(
    config: &Config,
    store: &Arc<PreferenceStore>,
    sessions: &Arc<blogsmith::memory::SessionOverlay>,
) -> Result<Arc<dyn AgentRuntime>> {
    use blogsmith::gemini::{GeminiClient, GeminiRuntime};
    use blogsmith::runtime::EchoRuntime;
    use blogsmith::tools::{CodeExecutionTool, GoogleSearchTool, ToolRegistry, UserProfileTool};

    match config.runtime.kind {
        RuntimeKind::Echo => Ok(Arc::new(EchoRuntime)),
        RuntimeKind::Gemini => {
            let client = Arc::new(
                GeminiClient::new(
                    config.api_key()?,
                    &config.runtime.base_url,
                    config.request_timeout(),
                )
                .context("Failed to build Gemini client")?,
            );
            let tools = ToolRegistry::new()
                .with(Arc::new(GoogleSearchTool::new(
                    Arc::clone(&client),
                    &config.runtime.model,
                )))
                .with(Arc::new(CodeExecutionTool::default()))
                .with(Arc::new(UserProfileTool::new(
                    Arc::clone(store),
                    Arc::clone(sessions),
                )));
            Ok(Arc::new(
                GeminiRuntime::new(client, Arc::new(tools))
                    .with_max_tool_rounds(config.runtime.max_tool_rounds),
            ))
        }
    }
}

/// Fill missing fields from an interactive prompt on a TTY, otherwise from
/// up to four stdin lines (topic, tone, audience, word count).
fn gather_context(args: &RunArgs, defaults: &Defaults) -> Result<RunContext> {
    let complete = args.topic.is_some()
        && args.tone.is_some()
        && args.audience.is_some()
        && args.word_count.is_some();

    let answers = if complete {
        Vec::new()
    } else if std::io::stdin().is_terminal() {
        prompt_missing(args, defaults)?
    } else {
        read_answer_lines(std::io::stdin().lock(), 4)
    };

    Ok(resolve_context(args, &answers, defaults))
}

/// Read up to `count` newline-terminated answers.
///
/// A line that is not valid UTF-8 comes back blank, and a read error ends
/// the answers early. Either way the affected fields fall back to defaults.
fn read_answer_lines(mut reader: impl BufRead, count: usize) -> Vec<String> {
    let mut answers = Vec::with_capacity(count);
    let mut buf = Vec::new();
    while answers.len() < count {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => answers.push(String::from_utf8(buf.clone()).unwrap_or_default()),
            Err(e) => {
                tracing::warn!(error = %e, "stopped reading inputs from stdin");
                break;
            }
        }
    }
    answers
}

fn prompt_missing(args: &RunArgs, defaults: &Defaults) -> Result<Vec<String>> {
    use dialoguer::Input;

    println!("\n{}AI Blog Production Agent", blogsmith::ui::icons::PENCIL);
    let ask = |given: &Option<String>, prompt: &str, default: &str| -> Result<String> {
        match given {
            Some(value) => Ok(value.clone()),
            None => Input::<String>::new()
                .with_prompt(prompt)
                .default(default.to_string())
                .interact_text()
                .with_context(|| format!("Failed to read {}", prompt.to_lowercase())),
        }
    };

    Ok(vec![
        ask(&args.topic, "Topic", &defaults.topic)?,
        ask(&args.tone, "Tone", &defaults.tone)?,
        ask(&args.audience, "Audience", &defaults.audience)?,
        ask(&args.word_count, "Word count", &defaults.word_count)?,
    ])
}

/// Flags win, then the positional answer, then the default.
fn resolve_context(args: &RunArgs, answers: &[String], defaults: &Defaults) -> RunContext {
    let pick = |flag: &Option<String>, index: usize, default: &str| {
        flag.as_deref()
            .or_else(|| answers.get(index).map(String::as_str))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    };

    let ctx = RunContext::new(
        pick(&args.topic, 0, &defaults.topic),
        pick(&args.tone, 1, &defaults.tone),
        pick(&args.audience, 2, &defaults.audience),
        pick(&args.word_count, 3, &defaults.word_count),
    );
    match args.extra.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        Some(extra) => ctx.with_extra_instructions(extra),
        None => ctx,
    }
}

fn history_entry(ctx: &RunContext) -> Value {
    json!({
        "topic": ctx.topic,
        "tone": ctx.tone,
        "audience": ctx.audience,
        "word_count": ctx.target_word_count,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })
}

fn print_report(report: &PipelineReport) {
    use blogsmith::orchestrator::Stage;
    use blogsmith::ui::icons::{CHART, PENCIL};
    use console::style;

    for result in &report.stages {
        if matches!(result.stage, Stage::Seo | Stage::Evaluate) {
            continue;
        }
        println!(
            "\n{}",
            style(format!("--- {} ({}) ---", result.stage, result.stage.agent_name())).bold()
        );
        println!("{}", result.text);
    }

    println!("\n{}{}", CHART, style("--- Evaluation ---").bold());
    match &report.evaluation_scores {
        Some(scores) => match serde_json::to_string_pretty(scores) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", report.evaluation),
        },
        None => println!("{}", report.evaluation),
    }
    println!("------------------");

    println!("\n============================");
    println!("{}FINAL BLOG\n", PENCIL);
    println!("{}", report.artifact);
    println!();
}
