//! OpenAI-compatible chat client with tool calling.
//!
//! Works with any endpoint that speaks the chat completions API. The default
//! base URL points at Groq.

use std::time::Instant;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        FunctionCall, FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use parley_config::LlmSettings;
use parley_core::{AgentError, Message, MessageRole, ToolCall, ToolSchema};
use tracing::{debug, info};

use crate::ChatModel;

/// Converts any error into an AgentError::LlmError.
fn llm_err(e: impl ToString) -> AgentError {
    AgentError::LlmError(e.to_string())
}

fn to_openai_tool_call(call: &ToolCall) -> ChatCompletionMessageToolCall {
    ChatCompletionMessageToolCall {
        id: call.id.clone(),
        r#type: ChatCompletionToolType::Function,
        function: FunctionCall {
            name: call.name.clone(),
            arguments: call.arguments.to_string(),
        },
    }
}

fn from_openai_tool_call(tc: ChatCompletionMessageToolCall) -> ToolCall {
    let arguments = serde_json::from_str(&tc.function.arguments).unwrap_or(serde_json::Value::Null);
    ToolCall {
        id: tc.id,
        name: tc.function.name,
        arguments,
    }
}

fn to_openai_tool(schema: &ToolSchema) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: schema.name.clone(),
            description: Some(schema.description.clone()),
            parameters: Some(schema.parameters.clone()),
            strict: None,
        },
    }
}

/// Maps a conversation message onto the chat completions request format.
fn to_request_message(msg: &Message) -> Result<ChatCompletionRequestMessage, AgentError> {
    let content = msg.content.as_str();
    let request_msg = match msg.role {
        MessageRole::System => ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(content)
                .build()
                .map_err(llm_err)?,
        ),
        MessageRole::User => ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()
                .map_err(llm_err)?,
        ),
        MessageRole::Assistant => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if !content.is_empty() {
                args.content(content);
            }
            if !msg.tool_calls.is_empty() {
                args.tool_calls(msg.tool_calls.iter().map(to_openai_tool_call).collect::<Vec<_>>());
            }
            ChatCompletionRequestMessage::Assistant(args.build().map_err(llm_err)?)
        }
        MessageRole::Tool => {
            let tool_call_id = msg.tool_call_id.as_deref().ok_or_else(|| {
                AgentError::LlmError("Tool message without a tool_call_id".into())
            })?;
            ChatCompletionRequestMessage::Tool(
                ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(tool_call_id)
                    .content(content)
                    .build()
                    .map_err(llm_err)?,
            )
        }
    };
    Ok(request_msg)
}

/// Client for OpenAI-compatible chat completion APIs, bound to one model.
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl LlmClient {
    /// Creates a client for `model` against the configured provider.
    ///
    /// Fails when no API key is configured. The model name itself is not
    /// checked until the first request.
    pub fn new(model: &str, settings: &LlmSettings) -> Result<Self, AgentError> {
        let api_key = settings
            .api_key
            .as_deref()
            .ok_or_else(|| AgentError::Config("GROQ_API_KEY is not set".into()))?;

        let config = OpenAIConfig::new()
            .with_api_base(settings.api_base.trim_end_matches('/'))
            .with_api_key(api_key);

        Ok(Self {
            client: Client::with_config(config),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[Message], tools: &[ToolSchema]) -> Result<Message, AgentError> {
        let start = Instant::now();

        let request_messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>, _>>()?;

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model).messages(request_messages);

        if !tools.is_empty() {
            request_builder.tools(tools.iter().map(to_openai_tool).collect::<Vec<_>>());
        }

        let request = request_builder.build().map_err(llm_err)?;
        let response = self.client.chat().create(request).await.map_err(llm_err)?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let (input_tokens, output_tokens) = response
            .usage
            .as_ref()
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        info!(
            "LLM {}: {}ms, tokens: {}/{} (in/out)",
            self.model, elapsed_ms, input_tokens, output_tokens
        );

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::LlmError("No response choices".into()))?;

        let content = choice.message.content.unwrap_or_default();
        let calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(from_openai_tool_call)
            .collect();

        if calls.is_empty() {
            debug!("LLM answered with {} chars", content.len());
            return Ok(Message::assistant(content));
        }

        debug!(
            "LLM requested tools: {:?}",
            calls.iter().map(|c| &c.name).collect::<Vec<_>>()
        );
        Ok(Message::assistant_tool_calls(content, calls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::ToolResult;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(api_base: &str) -> LlmSettings {
        LlmSettings {
            api_base: api_base.to_string(),
            api_key: Some("test_api_key".to_string()),
        }
    }

    fn completion(message: Value) -> Value {
        json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "llama-3.3-70b-versatile",
            "choices": [{
                "index": 0,
                "message": message,
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 12,
                "completion_tokens": 15,
                "total_tokens": 27
            }
        })
    }

    async fn setup_mock_server(response_body: Value) -> (MockServer, LlmClient) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test_api_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_body))
            .mount(&mock_server)
            .await;

        let client = LlmClient::new("llama-3.3-70b-versatile", &settings(&mock_server.uri())).unwrap();
        (mock_server, client)
    }

    async fn sent_body(server: &MockServer) -> Value {
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        serde_json::from_slice(&requests[0].body).unwrap()
    }

    #[tokio::test]
    async fn test_complete_basic() {
        let (server, client) = setup_mock_server(completion(json!({
            "role": "assistant",
            "content": "Hello! How can I assist you today?"
        })))
        .await;

        let messages = vec![Message::system("You are helpful."), Message::user("Hello?")];
        let reply = client.complete(&messages, &[]).await.unwrap();

        assert_eq!(reply, Message::assistant("Hello! How can I assist you today?"));

        let body = sent_body(&server).await;
        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert!(body.get("tools").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are helpful.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Hello?");
    }

    #[tokio::test]
    async fn test_complete_tool_request() {
        let (server, client) = setup_mock_server(completion(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {
                    "name": "web_search",
                    "arguments": "{\"query\":\"rust 2024 edition\"}"
                }
            }]
        })))
        .await;

        let tools = vec![ToolSchema {
            name: "web_search".into(),
            description: "Search the web".into(),
            parameters: json!({"type": "object", "properties": {"query": {"type": "string"}}}),
        }];
        let reply = client.complete(&[Message::user("news?")], &tools).await.unwrap();

        assert!(reply.has_tool_calls());
        assert_eq!(reply.content, "");
        assert_eq!(reply.tool_calls[0].id, "call_1");
        assert_eq!(reply.tool_calls[0].name, "web_search");
        assert_eq!(reply.tool_calls[0].arguments, json!({"query": "rust 2024 edition"}));

        let body = sent_body(&server).await;
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "web_search");
    }

    #[tokio::test]
    async fn test_invalid_tool_arguments_become_null() {
        let (_server, client) = setup_mock_server(completion(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_2",
                "type": "function",
                "function": { "name": "web_search", "arguments": "{not json" }
            }]
        })))
        .await;

        let reply = client.complete(&[Message::user("q")], &[]).await.unwrap();
        assert_eq!(reply.tool_calls[0].arguments, Value::Null);
    }

    #[tokio::test]
    async fn test_tool_round_trip_messages_are_encoded() {
        let (server, client) = setup_mock_server(completion(json!({
            "role": "assistant",
            "content": "Done."
        })))
        .await;

        let call = ToolCall {
            id: "call_1".into(),
            name: "web_search".into(),
            arguments: json!({"query": "q"}),
        };
        let messages = vec![
            Message::user("q"),
            Message::assistant_tool_calls("", vec![call]),
            Message::tool(ToolResult {
                tool_call_id: "call_1".into(),
                content: "results".into(),
            }),
        ];
        client.complete(&messages, &[]).await.unwrap();

        let body = sent_body(&server).await;
        let assistant = &body["messages"][1];
        assert_eq!(assistant["role"], "assistant");
        assert!(assistant.get("content").map_or(true, Value::is_null));
        assert_eq!(assistant["tool_calls"][0]["id"], "call_1");
        assert_eq!(assistant["tool_calls"][0]["function"]["arguments"], "{\"query\":\"q\"}");

        let tool = &body["messages"][2];
        assert_eq!(tool["role"], "tool");
        assert_eq!(tool["tool_call_id"], "call_1");
        assert_eq!(tool["content"], "results");
    }

    #[tokio::test]
    async fn test_provider_error_is_llm_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {
                    "message": "The model `nope` does not exist",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": "model_not_found"
                }
            })))
            .mount(&mock_server)
            .await;

        let client = LlmClient::new("nope", &settings(&mock_server.uri())).unwrap();
        let err = client.complete(&[Message::user("hi")], &[]).await.unwrap_err();

        assert!(matches!(err, AgentError::LlmError(ref msg) if msg.contains("does not exist")));
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let settings = LlmSettings {
            api_base: "http://localhost".into(),
            api_key: None,
        };
        let err = LlmClient::new("any", &settings).err().unwrap();
        assert!(matches!(err, AgentError::Config(_)));
    }
}
