use super::tasks::AgentTask;
use crate::ai::{AiClient, AiError, Message, ToolHistoryEntry, ToolResponse};
use crate::tools::{ToolContext, ToolRegistry};
use std::sync::Arc;

/// Runs one agent task: persona system prompt, task prompt, then LLM and tool
/// calls alternate until the model answers in plain text.
pub struct AgentRunner {
    ai: Arc<AiClient>,
    tools: Arc<ToolRegistry>,
    tool_context: ToolContext,
    max_iterations: usize,
}

impl AgentRunner {
    pub fn new(
        ai: Arc<AiClient>,
        tools: Arc<ToolRegistry>,
        tool_context: ToolContext,
        max_iterations: usize,
    ) -> Self {
        Self {
            ai,
            tools,
            tool_context,
            max_iterations: max_iterations.max(1),
        }
    }

    /// Run `task`, with `history` (earlier turns of the conversation) placed
    /// between the system prompt and the task prompt.
    pub async fn run(&self, task: &AgentTask, history: &[Message]) -> Result<String, AiError> {
        let kind = task.kind;
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(kind.system_prompt()));
        messages.extend_from_slice(history);
        messages.push(Message::user(task.prompt()));

        let tool_defs = self.tools.definitions_for(kind.tool_names());
        let mut tool_history: Vec<ToolHistoryEntry> = Vec::new();

        for iteration in 1..=self.max_iterations {
            log::debug!("[AGENT] {} iteration {}/{}", kind.as_ref(), iteration, self.max_iterations);

            let response = self
                .ai
                .generate_with_tools(messages.clone(), tool_history.clone(), tool_defs.clone())
                .await?;

            if !response.has_tool_calls() {
                let answer = response.content.trim();
                if answer.is_empty() {
                    return Err(AiError::new(format!(
                        "{} returned an empty response",
                        kind.display_name()
                    )));
                }
                log::info!(
                    "[AGENT] {} finished after {} iteration(s)",
                    kind.display_name(),
                    iteration
                );
                return Ok(answer.to_string());
            }

            let mut tool_responses = Vec::with_capacity(response.tool_calls.len());
            for call in &response.tool_calls {
                log::info!("[AGENT] {} calling {} {}", kind.as_ref(), call.name, call.arguments);
                let result = self
                    .tools
                    .execute(&call.name, call.arguments.clone(), &self.tool_context)
                    .await;
                tool_responses.push(if result.success {
                    ToolResponse::success(call.id.clone(), result.content)
                } else {
                    log::warn!("[AGENT] Tool {} failed: {}", call.name, result.content);
                    ToolResponse::error(call.id.clone(), result.content)
                });
            }
            tool_history.push(ToolHistoryEntry::new(response.tool_calls, tool_responses));
        }

        log::warn!(
            "[AGENT] {} hit the iteration limit ({})",
            kind.display_name(),
            self.max_iterations
        );
        Err(AiError::new(format!(
            "{} did not produce an answer within {} iterations",
            kind.display_name(),
            self.max_iterations
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::definitions::AgentKind;
    use crate::ai::types::ToolCall;
    use crate::ai::{AiResponse, MockAiClient};
    use crate::db::Database;
    use crate::models::CreateSkillRequest;
    use serde_json::json;

    fn runner(responses: Vec<Result<AiResponse, AiError>>, max_iterations: usize) -> (AgentRunner, Arc<AiClient>) {
        let db = Arc::new(Database::new(":memory:").unwrap());
        db.create_skill(&CreateSkillRequest {
            name: "Rust".to_string(),
            category: Some("programming".to_string()),
        })
        .unwrap();
        let ai = Arc::new(AiClient::Mock(MockAiClient::new(responses)));
        let runner = AgentRunner::new(
            ai.clone(),
            Arc::new(ToolRegistry::with_builtins()),
            ToolContext::new(db),
            max_iterations,
        );
        (runner, ai)
    }

    fn tool_call(id: &str, args: serde_json::Value) -> AiResponse {
        AiResponse::with_tools(
            String::new(),
            vec![ToolCall {
                id: id.to_string(),
                name: "query_database".to_string(),
                arguments: args,
            }],
        )
    }

    fn mock_calls(ai: &AiClient) -> Vec<crate::ai::mock::MockCall> {
        match ai {
            AiClient::Mock(mock) => mock.calls(),
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_plain_answer_returns_immediately() {
        let (runner, ai) = runner(vec![Ok(AiResponse::text("  Hello!  ".to_string()))], 3);
        let answer = runner
            .run(&AgentTask::onboarding(1), &[Message::user("earlier")])
            .await
            .unwrap();
        assert_eq!(answer, "Hello!");

        let calls = mock_calls(&ai);
        assert_eq!(calls.len(), 1);
        let messages = &calls[0].messages;
        assert_eq!(messages.len(), 3);
        assert!(messages[0].content.contains("Onboarding Agent"));
        assert_eq!(messages[1].content, "earlier");
        assert_eq!(calls[0].tool_names, vec!["query_database".to_string()]);
    }

    #[tokio::test]
    async fn test_tool_results_feed_next_round() {
        let (runner, ai) = runner(
            vec![
                Ok(tool_call("call_1", json!({"action": "list_skills"}))),
                Ok(tool_call("call_2", json!({"action": "get_club", "club_id": 99}))),
                Ok(AiResponse::text("You know Rust.".to_string())),
            ],
            5,
        );
        let answer = runner.run(&AgentTask::weekly_digest(1), &[]).await.unwrap();
        assert_eq!(answer, "You know Rust.");

        let calls = mock_calls(&ai);
        assert_eq!(calls.len(), 3);
        let history = &calls[2].tool_history;
        assert_eq!(history.len(), 2);
        assert!(!history[0].tool_responses[0].is_error);
        assert!(history[0].tool_responses[0].content.contains("Rust"));
        assert!(history[1].tool_responses[0].is_error);
        assert_eq!(history[1].tool_responses[0].tool_call_id, "call_2");
    }

    #[tokio::test]
    async fn test_iteration_cap() {
        let (runner, _) = runner(
            vec![
                Ok(tool_call("a", json!({"action": "list_clubs"}))),
                Ok(tool_call("b", json!({"action": "list_clubs"}))),
                Ok(AiResponse::text("too late".to_string())),
            ],
            2,
        );
        let err = runner.run(&AgentTask::trending_events(None), &[]).await.unwrap_err();
        assert!(err.message.contains("2 iterations"));
    }

    #[tokio::test]
    async fn test_ai_error_propagates() {
        let (runner, _) = runner(vec![Err(AiError::with_status("rate limited", 429))], 3);
        let err = runner
            .run(&AgentTask::direct_answer("hi", None), &[])
            .await
            .unwrap_err();
        assert_eq!(err.status_code, Some(429));
    }

    #[tokio::test]
    async fn test_empty_answer_is_error() {
        let (runner, _) = runner(vec![Ok(AiResponse::text("   ".to_string()))], 3);
        assert!(runner.run(&AgentTask::onboarding(1), &[]).await.is_err());
        assert_eq!(AgentKind::Onboarding.display_name(), "Onboarding Agent");
    }
}
