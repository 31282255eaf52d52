//! Reason-and-act agent loop.

use async_trait::async_trait;
use parley_core::{AgentError, ConversationState, Message};
use parley_llm::ChatModel;
use parley_tools::ToolSet;
use tracing::{info, warn};

use crate::prompt::PromptTemplate;

/// Maximum number of model calls per run to prevent infinite tool loops.
pub const MAX_TOOL_ITERATIONS: usize = 10;

/// Something that turns a conversation into its continuation.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Runs the agent and returns the conversation with its new messages.
    async fn invoke(&self, state: ConversationState) -> Result<ConversationState, AgentError>;
}

/// Agent that alternates model calls and tool execution until the model
/// answers without requesting tools.
pub struct ReactAgent {
    model: Box<dyn ChatModel>,
    tools: ToolSet,
    prompt: PromptTemplate,
    max_iterations: usize,
}

impl ReactAgent {
    pub fn new(model: Box<dyn ChatModel>, tools: ToolSet, prompt: PromptTemplate) -> Self {
        Self {
            model,
            tools,
            prompt,
            max_iterations: MAX_TOOL_ITERATIONS,
        }
    }

    /// Overrides the model call budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }
}

#[async_trait]
impl Agent for ReactAgent {
    async fn invoke(&self, mut state: ConversationState) -> Result<ConversationState, AgentError> {
        let schemas = self.tools.schemas();
        info!(
            "Agent run: model={}, tools={:?}, messages={}",
            self.model.model_id(),
            self.tools.names(),
            state.len()
        );

        for iteration in 1..=self.max_iterations {
            let prompt = self.prompt.render(&state);
            let reply: Message = self.model.complete(&prompt, &schemas).await?;

            if !reply.has_tool_calls() {
                info!(
                    "Final response: {} chars (after {} iterations)",
                    reply.content.len(),
                    iteration
                );
                state.push(reply);
                return Ok(state);
            }

            let calls = reply.tool_calls.clone();
            state.push(reply);

            for call in &calls {
                info!("Executing tool: {}", call.name);
                let result = self.tools.run(call).await;
                state.push(Message::tool(result));
            }
        }

        warn!("Max tool iterations ({}) reached", self.max_iterations);
        Err(AgentError::MaxIterations(self.max_iterations))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;
    use parley_core::{MessageInput, MessageRole, ToolCall, ToolSchema};
    use parley_tools::{Tool, ToolError};
    use serde_json::json;

    /// Replays canned replies and records every prompt it receives.
    #[derive(Clone, Default)]
    struct ScriptedModel {
        replies: Arc<Mutex<VecDeque<Result<Message, AgentError>>>>,
        prompts: Arc<Mutex<Vec<(Vec<Message>, Vec<ToolSchema>)>>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Result<Message, AgentError>>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into())),
                prompts: Arc::default(),
            }
        }

        fn prompts(&self) -> Vec<(Vec<Message>, Vec<ToolSchema>)> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        fn model_id(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, messages: &[Message], tools: &[ToolSchema]) -> Result<Message, AgentError> {
            self.prompts.lock().unwrap().push((messages.to_vec(), tools.to_vec()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Message::assistant_tool_calls("", vec![search_call("again")])))
        }
    }

    struct FakeSearch;

    #[async_trait]
    impl Tool for FakeSearch {
        fn name(&self) -> &str {
            "web_search"
        }

        fn description(&self) -> &str {
            "Fake search"
        }

        fn parameters(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {"query": {"type": "string"}}})
        }

        async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError> {
            match args["query"].as_str() {
                Some("boom") => Err(ToolError::ExecutionFailed("upstream down".into())),
                Some(q) => Ok(format!("results for {}", q)),
                None => Err(ToolError::InvalidArguments("Missing 'query' parameter".into())),
            }
        }
    }

    fn search_call(query: &str) -> ToolCall {
        ToolCall {
            id: format!("call_{}", query),
            name: "web_search".into(),
            arguments: json!({ "query": query }),
        }
    }

    fn search_tools() -> ToolSet {
        let mut tools = ToolSet::new();
        tools.register(FakeSearch);
        tools
    }

    fn agent(model: &ScriptedModel, tools: ToolSet) -> ReactAgent {
        ReactAgent::new(
            Box::new(model.clone()),
            tools,
            PromptTemplate::system_with_history("You are helpful."),
        )
    }

    #[tokio::test]
    async fn answers_directly_without_tools() {
        let model = ScriptedModel::new(vec![Ok(Message::assistant("Hi there"))]);
        let state = MessageInput::from("hello").into_state();

        let result = agent(&model, ToolSet::new()).invoke(state).await.unwrap();

        assert_eq!(result.messages, vec![Message::user("hello"), Message::assistant("Hi there")]);

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0[0], Message::system("You are helpful."));
        assert!(prompts[0].1.is_empty());
    }

    #[tokio::test]
    async fn runs_requested_tools_and_feeds_results_back() {
        let model = ScriptedModel::new(vec![
            Ok(Message::assistant_tool_calls("", vec![search_call("rust")])),
            Ok(Message::assistant("Rust is great.")),
        ]);
        let state = MessageInput::from("tell me about rust").into_state();

        let result = agent(&model, search_tools()).invoke(state).await.unwrap();

        let roles: Vec<MessageRole> = result.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [MessageRole::User, MessageRole::Assistant, MessageRole::Tool, MessageRole::Assistant]
        );
        assert_eq!(result.messages[2].tool_call_id.as_deref(), Some("call_rust"));
        assert_eq!(result.messages[2].content, "results for rust");
        assert_eq!(result.reply(), "Rust is great.");

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].1[0].name, "web_search");
        // second call sees system + user + tool request + tool result
        assert_eq!(prompts[1].0.len(), 4);
    }

    #[tokio::test]
    async fn tool_failures_are_reported_to_the_model() {
        let model = ScriptedModel::new(vec![
            Ok(Message::assistant_tool_calls("", vec![search_call("boom")])),
            Ok(Message::assistant("Search is unavailable.")),
        ]);
        let state = MessageInput::from("q").into_state();

        let result = agent(&model, search_tools()).invoke(state).await.unwrap();

        assert_eq!(
            result.messages[2].content,
            "Error: Tool execution failed: upstream down"
        );
        assert_eq!(result.reply(), "Search is unavailable.");
    }

    #[tokio::test]
    async fn stops_after_iteration_budget() {
        let model = ScriptedModel::new(vec![]);
        let state = MessageInput::from("loop forever").into_state();

        let err = agent(&model, search_tools())
            .with_max_iterations(3)
            .invoke(state)
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::MaxIterations(3)));
        assert_eq!(model.prompts().len(), 3);
    }

    #[tokio::test]
    async fn model_errors_propagate() {
        let model = ScriptedModel::new(vec![Err(AgentError::LlmError("rate limited".into()))]);
        let state = MessageInput::from("q").into_state();

        let err = agent(&model, ToolSet::new()).invoke(state).await.unwrap_err();
        assert!(matches!(err, AgentError::LlmError(ref msg) if msg == "rate limited"));
    }
}
