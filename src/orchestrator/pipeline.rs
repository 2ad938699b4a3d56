use super::invoker::AgentInvoker;
use super::prompts;
use super::stage::{RunContext, Stage, StageResult};
use crate::agents::AgentRoster;
use crate::audit::{EventRecorder, EventType};
use crate::compaction;
use crate::runtime::{AgentRuntime, SessionIdentity};
use crate::util::extract_json_object;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Character budgets applied to stage outputs before they feed the next stage.
///
/// The SEO and evaluation outputs are never compacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactionLimits {
    pub research: usize,
    pub outline: usize,
    pub draft: usize,
    pub critique: usize,
}

impl Default for CompactionLimits {
    fn default() -> Self {
        Self {
            research: 6000,
            outline: 6000,
            draft: 9000,
            critique: 9000,
        }
    }
}

impl CompactionLimits {
    pub fn for_stage(&self, stage: Stage) -> Option<usize> {
        match stage {
            Stage::Research => Some(self.research),
            Stage::Outline => Some(self.outline),
            Stage::Draft => Some(self.draft),
            Stage::Critique => Some(self.critique),
            Stage::Seo | Stage::Evaluate => None,
        }
    }
}

/// Hooks for front ends that render pipeline progress.
pub trait PipelineObserver: Send + Sync {
    fn stage_started(&self, _stage: Stage, _prompt: &str) {}
    fn stage_finished(&self, _result: &StageResult) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    /// One entry per stage, in execution order.
    pub stages: Vec<StageResult>,
    /// The SEO-finalized article.
    pub artifact: String,
    /// Raw evaluation payload.
    pub evaluation: String,
    /// JSON object found in the evaluation payload, if any.
    pub evaluation_scores: Option<Value>,
}

impl PipelineReport {
    pub fn stage(&self, stage: Stage) -> Option<&StageResult> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    pub fn failed_stages(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .filter(|r| !r.succeeded)
            .map(|r| r.stage)
            .collect()
    }
}

/// Runs the fixed six-stage pipeline.
///
/// Stages execute strictly in order, each prompt embedding the previous
/// stage's (compacted) output. No stage can abort the run: a failed stage's
/// error payload is fed forward like ordinary content. There are no retries
/// and no timeouts at this level.
pub struct PipelineOrchestrator {
    invoker: AgentInvoker,
    roster: AgentRoster,
    recorder: Arc<EventRecorder>,
    limits: CompactionLimits,
}

impl PipelineOrchestrator {
    pub fn new(
        runtime: Arc<dyn AgentRuntime>,
        recorder: Arc<EventRecorder>,
        roster: AgentRoster,
    ) -> Self {
        Self {
            invoker: AgentInvoker::new(runtime, Arc::clone(&recorder)),
            roster,
            recorder,
            limits: CompactionLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: CompactionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub async fn run(&self, ctx: &RunContext, identity: &SessionIdentity) -> PipelineReport {
        self.run_observed(ctx, identity, &NoopObserver).await
    }

    pub async fn run_observed(
        &self,
        ctx: &RunContext,
        identity: &SessionIdentity,
        observer: &dyn PipelineObserver,
    ) -> PipelineReport {
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, topic = %ctx.topic, session = %identity.session_id, "starting pipeline");

        let research = self
            .run_stage(Stage::Research, prompts::research(ctx), identity, observer)
            .await;
        let outline = self
            .run_stage(Stage::Outline, prompts::outline(ctx, &research.text), identity, observer)
            .await;
        let draft = self
            .run_stage(Stage::Draft, prompts::draft(ctx, &outline.text), identity, observer)
            .await;
        let critique = self
            .run_stage(Stage::Critique, prompts::critique(&draft.text), identity, observer)
            .await;
        let seo = self
            .run_stage(Stage::Seo, prompts::seo(&critique.text), identity, observer)
            .await;
        let evaluate = self
            .run_stage(Stage::Evaluate, prompts::evaluation(ctx, &seo.text), identity, observer)
            .await;

        let mut extra = Map::new();
        extra.insert("raw_eval".into(), json!(evaluate.text));
        extra.insert("run_id".into(), json!(run_id.to_string()));
        self.recorder.record(
            EventType::Evaluation,
            Some(Stage::Evaluate.agent_name()),
            Some("eval"),
            Some("Evaluation completed."),
            None,
            extra,
        );

        let evaluation_scores = extract_json_object(&evaluate.text);
        let artifact = seo.text.clone();
        let evaluation = evaluate.text.clone();
        let stages = vec![research, outline, draft, critique, seo, evaluate];

        let failed = stages.iter().filter(|r| !r.succeeded).count();
        tracing::info!(%run_id, failed_stages = failed, "pipeline finished");

        PipelineReport {
            run_id,
            stages,
            artifact,
            evaluation,
            evaluation_scores,
        }
    }

    async fn run_stage(
        &self,
        stage: Stage,
        prompt: String,
        identity: &SessionIdentity,
        observer: &dyn PipelineObserver,
    ) -> StageResult {
        observer.stage_started(stage, &prompt);
        let agent = self.roster.for_stage(stage);

        let start = Instant::now();
        let (text, duration, succeeded) = match self
            .invoker
            .try_invoke(agent, identity, &prompt, stage.agent_name())
            .await
        {
            Ok(invocation) => (invocation.text, invocation.duration, true),
            Err(e) => (e.payload(), start.elapsed(), false),
        };

        let mut text = match self.limits.for_stage(stage) {
            Some(max_chars) => compaction::truncate(&text, max_chars),
            None => text,
        };
        // Stage outputs are never empty downstream.
        if text.trim().is_empty() {
            text = format!("Error: {} stage produced no output.", stage);
        }

        let result = StageResult {
            stage,
            text,
            duration_seconds: duration.as_secs_f64(),
            succeeded,
        };
        observer.stage_finished(&result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentSpec;
    use crate::audit::read_events;
    use crate::errors::{NO_FINAL_RESPONSE, RuntimeError};
    use crate::runtime::{Content, EventStream, Part, RuntimeEvent};
    use async_trait::async_trait;
    use futures::StreamExt;
    use futures::stream;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Answers with a fixed body per agent and keeps every prompt it saw.
    struct ScriptedRuntime {
        reply: fn(&str) -> Option<String>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedRuntime {
        fn new(reply: fn(&str) -> Option<String>) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompt_for(&self, agent: &str) -> String {
            self.prompts
                .lock()
                .unwrap()
                .iter()
                .find(|(a, _)| a == agent)
                .map(|(_, p)| p.clone())
                .unwrap()
        }
    }

    #[async_trait]
    impl AgentRuntime for ScriptedRuntime {
        async fn run(
            &self,
            agent: &AgentSpec,
            _identity: &SessionIdentity,
            message: Content,
        ) -> Result<EventStream, RuntimeError> {
            let prompt = message.parts[0].text().unwrap_or_default().to_string();
            self.prompts.lock().unwrap().push((agent.name.clone(), prompt));
            match (self.reply)(&agent.name) {
                Some(text) => {
                    let event = RuntimeEvent::final_response(
                        agent.name.clone(),
                        Content::model(vec![Part::Text(text)]),
                    );
                    Ok(stream::iter(vec![Ok(event)]).boxed())
                }
                None => Err(RuntimeError::Stream("scripted failure".into())),
            }
        }
    }

    fn setup(runtime: Arc<ScriptedRuntime>) -> (PipelineOrchestrator, Arc<EventRecorder>, TempDir) {
        let dir = TempDir::new().unwrap();
        let recorder = Arc::new(EventRecorder::new(dir.path().join("events.jsonl")));
        let orchestrator =
            PipelineOrchestrator::new(runtime, Arc::clone(&recorder), AgentRoster::default());
        (orchestrator, recorder, dir)
    }

    fn ok_stage(agent: &str) -> Option<String> {
        let stage = Stage::ALL.into_iter().find(|s| s.agent_name() == agent)?;
        Some(format!("OK:{}", stage))
    }

    fn ctx() -> RunContext {
        RunContext::new("Edge Computing", "Casual", "students", "800")
    }

    #[test]
    fn limits_cover_only_the_first_four_stages() {
        let limits = CompactionLimits::default();
        assert_eq!(limits.for_stage(Stage::Research), Some(6000));
        assert_eq!(limits.for_stage(Stage::Critique), Some(9000));
        assert_eq!(limits.for_stage(Stage::Seo), None);
        assert_eq!(limits.for_stage(Stage::Evaluate), None);
    }

    #[tokio::test]
    async fn each_stage_output_feeds_the_next_prompt() {
        let runtime = Arc::new(ScriptedRuntime::new(ok_stage));
        let (orchestrator, _recorder, _dir) = setup(Arc::clone(&runtime));
        let report = orchestrator.run(&ctx(), &SessionIdentity::default()).await;

        assert!(runtime.prompt_for("outline_agent").ends_with("OK:research"));
        assert!(runtime.prompt_for("draft_agent").ends_with("OK:outline"));
        assert!(runtime.prompt_for("critic_agent").ends_with("OK:draft"));
        assert!(runtime.prompt_for("seo_agent").ends_with("OK:critique"));
        assert!(runtime.prompt_for("evaluation_agent").ends_with("OK:seo"));
        assert_eq!(report.artifact, "OK:seo");
        assert_eq!(report.evaluation, "OK:evaluate");
    }

    #[tokio::test]
    async fn stages_run_in_order() {
        let runtime = Arc::new(ScriptedRuntime::new(ok_stage));
        let (orchestrator, _recorder, _dir) = setup(Arc::clone(&runtime));
        let report = orchestrator.run(&ctx(), &SessionIdentity::default()).await;

        let called: Vec<_> = runtime
            .prompts
            .lock()
            .unwrap()
            .iter()
            .map(|(a, _)| a.clone())
            .collect();
        let expected: Vec<_> = Stage::ALL.iter().map(|s| s.agent_name().to_string()).collect();
        assert_eq!(called, expected);
        assert_eq!(
            report.stages.iter().map(|r| r.stage).collect::<Vec<_>>(),
            Stage::ALL.to_vec()
        );
        assert!(report.failed_stages().is_empty());
    }

    #[tokio::test]
    async fn failed_stage_is_fed_forward_and_run_completes() {
        fn fail_draft(agent: &str) -> Option<String> {
            if agent == "draft_agent" {
                None
            } else {
                ok_stage(agent)
            }
        }
        let runtime = Arc::new(ScriptedRuntime::new(fail_draft));
        let (orchestrator, recorder, _dir) = setup(Arc::clone(&runtime));
        let report = orchestrator.run(&ctx(), &SessionIdentity::default()).await;

        let draft = report.stage(Stage::Draft).unwrap();
        assert!(!draft.succeeded);
        assert!(draft.text.contains("draft_agent"));
        assert!(runtime.prompt_for("critic_agent").ends_with(&draft.text));
        assert_eq!(report.failed_stages(), vec![Stage::Draft]);
        assert_eq!(report.artifact, "OK:seo");

        let events = read_events(recorder.path(), 100).unwrap();
        assert_eq!(events.iter().filter(|e| e.is_error()).count(), 1);
        assert_eq!(
            events.iter().filter(|e| e.event_type == EventType::AgentRun).count(),
            5
        );
    }

    #[tokio::test]
    async fn every_stage_failing_still_produces_an_artifact() {
        let runtime = Arc::new(ScriptedRuntime::new(|_| Some("   ".to_string())));
        let (orchestrator, _recorder, _dir) = setup(runtime);
        let report = orchestrator.run(&ctx(), &SessionIdentity::default()).await;

        assert_eq!(report.artifact, NO_FINAL_RESPONSE);
        assert_eq!(report.evaluation, NO_FINAL_RESPONSE);
        assert_eq!(report.failed_stages().len(), 6);
        assert!(report.stages.iter().all(|r| !r.text.is_empty()));
    }

    #[tokio::test]
    async fn long_outputs_are_compacted_but_seo_is_not() {
        fn verbose(agent: &str) -> Option<String> {
            Some(format!("{}{}", agent, "x".repeat(20_000)))
        }
        let runtime = Arc::new(ScriptedRuntime::new(verbose));
        let (orchestrator, _recorder, _dir) = setup(runtime);
        let report = orchestrator.run(&ctx(), &SessionIdentity::default()).await;

        let research = report.stage(Stage::Research).unwrap();
        assert!(research.text.contains(compaction::TRUNCATION_MARKER));
        assert_eq!(
            research.text.chars().count(),
            4200 + compaction::TRUNCATION_MARKER.chars().count() + 1200
        );
        let draft = report.stage(Stage::Draft).unwrap();
        assert!(draft.text.starts_with(&format!("draft_agent{}", "x".repeat(6289))));
        assert!(!report.artifact.contains(compaction::TRUNCATION_MARKER));
        assert_eq!(report.artifact.chars().count(), "seo_agent".len() + 20_000);
    }

    #[tokio::test]
    async fn evaluation_event_carries_raw_payload_and_scores_are_parsed() {
        fn scoring(agent: &str) -> Option<String> {
            if agent == "evaluation_agent" {
                Some("Here you go: {\"overall\": 8, \"comments\": \"solid\"}".to_string())
            } else {
                ok_stage(agent)
            }
        }
        let runtime = Arc::new(ScriptedRuntime::new(scoring));
        let (orchestrator, recorder, _dir) = setup(runtime);
        let report = orchestrator.run(&ctx(), &SessionIdentity::default()).await;

        let scores = report.evaluation_scores.as_ref().unwrap();
        assert_eq!(scores["overall"], json!(8));

        let events = read_events(recorder.path(), 100).unwrap();
        let eval = events.last().unwrap();
        assert_eq!(eval.event_type, EventType::Evaluation);
        assert_eq!(eval.step.as_deref(), Some("eval"));
        assert_eq!(eval.extra["raw_eval"], json!(report.evaluation));
        assert_eq!(eval.extra["run_id"], json!(report.run_id.to_string()));
    }

    #[tokio::test]
    async fn observer_sees_every_stage() {
        struct Counting(Mutex<Vec<(Stage, bool)>>);
        impl PipelineObserver for Counting {
            fn stage_started(&self, stage: Stage, _prompt: &str) {
                self.0.lock().unwrap().push((stage, false));
            }
            fn stage_finished(&self, result: &StageResult) {
                self.0.lock().unwrap().push((result.stage, true));
            }
        }

        let runtime = Arc::new(ScriptedRuntime::new(ok_stage));
        let (orchestrator, _recorder, _dir) = setup(runtime);
        let observer = Counting(Mutex::new(Vec::new()));
        orchestrator
            .run_observed(&ctx(), &SessionIdentity::default(), &observer)
            .await;

        let seen = observer.0.into_inner().unwrap();
        assert_eq!(seen.len(), 12);
        assert_eq!(seen[0], (Stage::Research, false));
        assert_eq!(seen[11], (Stage::Evaluate, true));
    }
}
