//! Contract with the external agent runtime.
//!
//! A runtime accepts one user-authored message for an agent, scoped by a
//! [`SessionIdentity`], and answers with an ordered stream of
//! [`RuntimeEvent`]s. Some events are flagged as the agent's final response;
//! only their text is consumed by the invoker. Submission may fail outright
//! (`Err` from [`AgentRuntime::run`]) or mid-stream (an `Err` item).

mod echo;

pub use echo::EchoRuntime;

use crate::agents::AgentSpec;
use crate::errors::RuntimeError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered response events for one submitted message.
pub type EventStream = BoxStream<'static, Result<RuntimeEvent, RuntimeError>>;

/// Who is talking to the runtime. Threaded explicitly so concurrent runs can
/// use different identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionIdentity {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

impl Default for SessionIdentity {
    fn default() -> Self {
        Self::new("ai_blog_agent", "cli_user", "cli_session")
    }
}

/// Author role of a [`Content`] turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Part {
    Text(String),
    FunctionCall { name: String, args: Value },
    FunctionResponse { name: String, response: Value },
}

impl Part {
    pub fn text(&self) -> Option<&str> {
        match self {
            Part::Text(text) => Some(text),
            Part::FunctionCall { .. } | Part::FunctionResponse { .. } => None,
        }
    }
}

/// One conversational turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    /// A single-part, user-authored text message.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Role::Model,
            parts,
        }
    }
}

/// One event emitted by the runtime while answering a message.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeEvent {
    pub author: String,
    pub content: Option<Content>,
    final_response: bool,
}

impl RuntimeEvent {
    /// An intermediate (non-final) event.
    pub fn intermediate(author: impl Into<String>, content: Option<Content>) -> Self {
        Self {
            author: author.into(),
            content,
            final_response: false,
        }
    }

    /// The agent's final answer.
    pub fn final_response(author: impl Into<String>, content: Content) -> Self {
        Self {
            author: author.into(),
            content: Some(content),
            final_response: true,
        }
    }

    pub fn is_final_response(&self) -> bool {
        self.final_response
    }

    /// Text of every text part, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.content
            .iter()
            .flat_map(|content| content.parts.iter())
            .filter_map(Part::text)
    }
}

/// An external generative-agent runtime.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Submit `message` to `agent` and return its response events.
    async fn run(
        &self,
        agent: &AgentSpec,
        identity: &SessionIdentity,
        message: Content,
    ) -> Result<EventStream, RuntimeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn texts_skip_non_text_parts() {
        let event = RuntimeEvent::final_response(
            "seo_agent",
            Content::model(vec![
                Part::Text("Hello, ".into()),
                Part::FunctionCall {
                    name: "google_search".into(),
                    args: json!({"query": "x"}),
                },
                Part::Text("world".into()),
            ]),
        );
        assert_eq!(event.texts().collect::<Vec<_>>(), vec!["Hello, ", "world"]);
        assert!(event.is_final_response());
    }

    #[test]
    fn intermediate_event_without_content_has_no_text() {
        let event = RuntimeEvent::intermediate("draft_agent", None);
        assert!(!event.is_final_response());
        assert_eq!(event.texts().count(), 0);
    }

    #[test]
    fn user_text_is_single_part_user_turn() {
        let content = Content::user_text("Topic: Rust");
        assert_eq!(content.role, Role::User);
        assert_eq!(content.parts, vec![Part::Text("Topic: Rust".into())]);
    }

    #[test]
    fn default_identity_matches_cli_constants() {
        let identity = SessionIdentity::default();
        assert_eq!(identity.user_id, "cli_user");
        assert_eq!(identity.session_id, "cli_session");
    }
}
