use super::client::GeminiClient;
use super::types::{FunctionDeclaration, GenerateContentRequest, WireContent, WireTool};
use crate::agents::AgentSpec;
use crate::errors::RuntimeError;
use crate::runtime::{
    AgentRuntime, Content, EventStream, Part, Role, RuntimeEvent, SessionIdentity,
};
use crate::tools::ToolRegistry;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use serde_json::json;
use std::sync::Arc;

pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 5;

/// Agent runtime backed by Gemini, with function calling against a
/// [`ToolRegistry`].
///
/// Each `run` is a fresh conversation: the agent's instruction, the user
/// message, and whatever tool turns the model asks for. Every model turn is
/// emitted as an event; the first turn without function calls is the final
/// response.
pub struct GeminiRuntime {
    client: Arc<GeminiClient>,
    tools: Arc<ToolRegistry>,
    max_tool_rounds: u32,
}

impl GeminiRuntime {
    pub fn new(client: Arc<GeminiClient>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            client,
            tools,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    fn wire_tools(&self) -> Vec<WireTool> {
        if self.tools.is_empty() {
            return Vec::new();
        }
        let function_declarations = self
            .tools
            .iter()
            .map(|tool| FunctionDeclaration {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect();
        vec![WireTool {
            function_declarations,
            google_search: None,
        }]
    }
}

#[async_trait]
impl AgentRuntime for GeminiRuntime {
    async fn run(
        &self,
        agent: &AgentSpec,
        identity: &SessionIdentity,
        message: Content,
    ) -> Result<EventStream, RuntimeError> {
        tracing::debug!(
            agent = %agent.name,
            model = %agent.model,
            user = %identity.user_id,
            session = %identity.session_id,
            "starting gemini run"
        );

        let mut request = GenerateContentRequest {
            contents: vec![WireContent::from(&message)],
            system_instruction: Some(WireContent::system(&agent.instruction)),
            tools: self.wire_tools(),
        };
        let mut events = Vec::new();

        for round in 0..=self.max_tool_rounds {
            let response = self.client.generate_content(&agent.model, &request).await?;
            let content = response
                .first_content()
                .map(Content::from)
                .unwrap_or_else(|| Content::model(Vec::new()));

            let calls: Vec<(String, serde_json::Value)> = content
                .parts
                .iter()
                .filter_map(|part| match part {
                    Part::FunctionCall { name, args } => Some((name.clone(), args.clone())),
                    _ => None,
                })
                .collect();

            if calls.is_empty() {
                events.push(Ok(RuntimeEvent::final_response(&agent.name, content)));
                return Ok(stream::iter(events).boxed());
            }
            if round == self.max_tool_rounds {
                break;
            }

            request.contents.push(WireContent::from(&content));
            events.push(Ok(RuntimeEvent::intermediate(&agent.name, Some(content))));

            let mut responses = Vec::with_capacity(calls.len());
            for (name, args) in calls {
                tracing::info!(agent = %agent.name, tool = %name, round, "tool call");
                let output = self.tools.dispatch(&name, &args).await;
                responses.push(Part::FunctionResponse {
                    name,
                    response: json!({ "result": output }),
                });
            }
            let tool_turn = Content {
                role: Role::User,
                parts: responses,
            };
            request.contents.push(WireContent::from(&tool_turn));
            events.push(Ok(RuntimeEvent::intermediate(&agent.name, Some(tool_turn))));
        }

        Err(RuntimeError::ToolRoundsExhausted {
            agent: agent.name.clone(),
            rounds: self.max_tool_rounds,
        })
    }
}
