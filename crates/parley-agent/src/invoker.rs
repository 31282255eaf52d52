//! Per-request agent construction and invocation.

use async_trait::async_trait;
use parley_config::{LlmSettings, SearchSettings, Settings};
use parley_core::{AgentError, MessageInput};
use parley_llm::LlmClient;
use parley_tools::make_tools;
use tracing::info;

use crate::prompt::PromptTemplate;
use crate::react::{Agent, ReactAgent};

/// Everything needed to answer one chat request.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub model_id: String,
    pub system_prompt: String,
    pub messages: MessageInput,
    pub allow_search: bool,
}

/// Produces the agent's reply for a chat request.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn respond(&self, request: AgentRequest) -> Result<String, AgentError>;
}

/// Builds a fresh [`ReactAgent`] for every request.
///
/// Nothing is cached between requests: each call gets its own LLM client and
/// tool set.
#[derive(Debug, Clone)]
pub struct ReactAgentInvoker {
    llm: LlmSettings,
    search: SearchSettings,
}

impl ReactAgentInvoker {
    pub fn new(llm: LlmSettings, search: SearchSettings) -> Self {
        Self { llm, search }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.llm.clone(), settings.search.clone())
    }
}

#[async_trait]
impl AgentInvoker for ReactAgentInvoker {
    async fn respond(&self, request: AgentRequest) -> Result<String, AgentError> {
        let model = LlmClient::new(&request.model_id, &self.llm)?;
        let tools = make_tools(request.allow_search, &self.search);
        let prompt = PromptTemplate::system_with_history(request.system_prompt);
        let state = request.messages.into_state();

        let agent = ReactAgent::new(Box::new(model), tools, prompt);
        let final_state = agent.invoke(state).await?;

        info!("Agent finished with {} messages", final_state.len());
        Ok(final_state.reply())
    }
}
