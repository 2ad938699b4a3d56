use crate::agents::AgentSpec;
use crate::audit::{EventRecorder, EventType};
use crate::errors::{InvokeError, RuntimeError};
use crate::runtime::{AgentRuntime, Content, SessionIdentity};
use futures::StreamExt;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A successful agent exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Final response text, whitespace-stripped and non-empty.
    pub text: String,
    /// Wall-clock time from submission until the response stream was drained.
    pub duration: Duration,
}

/// Performs exactly one request/response exchange with the agent runtime and
/// normalizes the outcome, recording telemetry for every call.
pub struct AgentInvoker {
    runtime: Arc<dyn AgentRuntime>,
    recorder: Arc<EventRecorder>,
}

impl AgentInvoker {
    pub fn new(runtime: Arc<dyn AgentRuntime>, recorder: Arc<EventRecorder>) -> Self {
        Self { runtime, recorder }
    }

    /// Invoke an agent and always come back with a string.
    ///
    /// Failures are replaced by their literal payload; see [`InvokeError`].
    pub async fn invoke(
        &self,
        agent: &AgentSpec,
        identity: &SessionIdentity,
        prompt: &str,
        label: &str,
    ) -> String {
        match self.try_invoke(agent, identity, prompt, label).await {
            Ok(invocation) => invocation.text,
            Err(e) => e.payload(),
        }
    }

    /// Invoke an agent, classifying the outcome. Telemetry is recorded either way.
    pub async fn try_invoke(
        &self,
        agent: &AgentSpec,
        identity: &SessionIdentity,
        prompt: &str,
        label: &str,
    ) -> Result<Invocation, InvokeError> {
        tracing::debug!(agent = label, prompt_chars = prompt.chars().count(), "submitting prompt");

        let (raw, duration) = match self.exchange(agent, identity, prompt).await {
            Ok(ok) => ok,
            Err(source) => {
                let err = InvokeError::Transport {
                    agent: label.to_string(),
                    source,
                };
                tracing::warn!(agent = label, error = %err, "agent run failed");
                self.recorder
                    .record_error(label, err.step(), &err.to_string(), failure_detail(&err));
                return Err(err);
            }
        };

        let text = raw.trim();
        if text.is_empty() {
            let err = InvokeError::EmptyResponse;
            tracing::warn!(agent = label, "agent returned no final response");
            self.recorder
                .record_error(label, err.step(), &err.payload(), Map::new());
            return Err(err);
        }

        let mut extra = Map::new();
        extra.insert("chars_out".into(), json!(raw.chars().count()));
        self.recorder.record(
            EventType::AgentRun,
            Some(label),
            Some("run"),
            Some("Agent completed successfully."),
            Some(duration.as_secs_f64()),
            extra,
        );
        tracing::info!(
            agent = label,
            elapsed_secs = duration.as_secs_f64(),
            "agent completed"
        );

        Ok(Invocation {
            text: text.to_string(),
            duration,
        })
    }

    /// Submit the prompt and drain the stream, concatenating final-response text.
    ///
    /// The timer brackets submission and draining only.
    async fn exchange(
        &self,
        agent: &AgentSpec,
        identity: &SessionIdentity,
        prompt: &str,
    ) -> Result<(String, Duration), RuntimeError> {
        let start = Instant::now();
        let mut events = self
            .runtime
            .run(agent, identity, Content::user_text(prompt))
            .await?;

        let mut final_text = String::new();
        while let Some(event) = events.next().await {
            let event = event?;
            if event.is_final_response() {
                for text in event.texts() {
                    final_text.push_str(text);
                }
            }
        }
        Ok((final_text, start.elapsed()))
    }
}

/// Auxiliary detail attached to a transport failure: the full source chain.
fn failure_detail(err: &InvokeError) -> Map<String, Value> {
    use std::error::Error as _;

    let mut chain = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(Value::String(cause.to_string()));
        source = cause.source();
    }

    let mut extra = Map::new();
    extra.insert("traceback".into(), Value::String(format!("{err:?}")));
    extra.insert("error_chain".into(), Value::Array(chain));
    extra
}
