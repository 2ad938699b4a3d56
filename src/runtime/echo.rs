use super::{AgentRuntime, Content, EventStream, Part, RuntimeEvent, SessionIdentity};
use crate::agents::AgentSpec;
use crate::errors::RuntimeError;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;

/// Offline runtime that answers every message with `OK:<agent name>`.
///
/// Lets the whole pipeline, event log and CLI run without network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoRuntime;

#[async_trait]
impl AgentRuntime for EchoRuntime {
    async fn run(
        &self,
        agent: &AgentSpec,
        _identity: &SessionIdentity,
        _message: Content,
    ) -> Result<EventStream, RuntimeError> {
        let reply = RuntimeEvent::final_response(
            agent.name.clone(),
            Content::model(vec![Part::Text(format!("OK:{}", agent.name))]),
        );
        Ok(stream::iter(vec![Ok(reply)]).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentRoster;
    use crate::orchestrator::Stage;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn echoes_agent_name_as_final_response() {
        let roster = AgentRoster::new("test-model");
        let agent = roster.for_stage(Stage::Draft);
        let events: Vec<_> = EchoRuntime
            .run(agent, &SessionIdentity::default(), Content::user_text("hi"))
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert!(events[0].is_final_response());
        assert_eq!(events[0].texts().collect::<String>(), "OK:draft_agent");
    }
}
