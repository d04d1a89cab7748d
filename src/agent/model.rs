//! Language model boundary.
//!
//! The dispatch loop talks to a `ChatModel`; `OpenAIChatModel` maps the
//! conversation log onto OpenAI-compatible chat completion messages.

use super::conversation::{ConversationTurn, ToolCallRequest};
use super::manifest::{tool_definitions, ToolSpec};
use crate::config::ModelSettings;
use crate::error::{ReelError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionResponseMessage, ChatCompletionToolType, CreateChatCompletionRequestArgs,
    FunctionCall,
};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// What the model answered.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// Plain-text answer for the user.
    Answer(String),
    /// One or more tool calls, in the order the model returned them.
    ToolCalls(Vec<ToolCallRequest>),
}

/// Trait for tool-calling chat models.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the conversation and tool manifest, get the next reply.
    async fn complete(
        &self,
        system_prompt: &str,
        turns: &[ConversationTurn],
        tools: &[ToolSpec],
    ) -> Result<ModelReply>;
}

/// OpenAI-compatible chat completions model.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    timeout: Duration,
}

impl OpenAIChatModel {
    /// Create a model from settings.
    pub fn new(settings: &ModelSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
        })
    }

    /// Use a different model name with the same client.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip_all, fields(model = %self.model, turns = turns.len()))]
    async fn complete(
        &self,
        system_prompt: &str,
        turns: &[ConversationTurn],
        tools: &[ToolSpec],
    ) -> Result<ModelReply> {
        let messages = to_messages(system_prompt, turns)?;
        debug!("Sending {} messages", messages.len());

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages);
        if !tools.is_empty() {
            builder.tools(tool_definitions(tools));
        }
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        let request = builder
            .build()
            .map_err(|e| ReelError::Model(e.to_string()))?;

        // The HTTP timeout bounds one attempt; this bounds the whole call.
        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                ReelError::Upstream(format!("Chat API timed out after {:?}", self.timeout))
            })?
            .map_err(|e| ReelError::Upstream(format!("Chat API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ReelError::Model("No response from model".to_string()))?;

        reply_from_message(choice.message)
    }
}

/// Interpret a response message as an answer or tool calls.
///
/// A message with neither is a model error, not an empty answer.
pub fn reply_from_message(message: ChatCompletionResponseMessage) -> Result<ModelReply> {
    match message.tool_calls {
        Some(calls) if !calls.is_empty() => Ok(ModelReply::ToolCalls(
            calls
                .into_iter()
                .map(|call| ToolCallRequest {
                    call_id: call.id,
                    tool_name: call.function.name,
                    // Unparseable arguments stay raw and fail validation later.
                    arguments: serde_json::from_str(&call.function.arguments)
                        .unwrap_or(Value::String(call.function.arguments)),
                })
                .collect(),
        )),
        _ => match message.content {
            Some(text) if !text.trim().is_empty() => Ok(ModelReply::Answer(text)),
            _ => Err(ReelError::Model(
                "Model returned neither text nor tool calls".to_string(),
            )),
        },
    }
}

/// Map the conversation log onto chat completion messages.
///
/// Consecutive tool calls become one assistant message carrying all of them,
/// each followed by its tool result message.
pub fn to_messages(
    system_prompt: &str,
    turns: &[ConversationTurn],
) -> Result<Vec<ChatCompletionRequestMessage>> {
    let build_err = |e: async_openai::error::OpenAIError| ReelError::Model(e.to_string());

    let mut messages: Vec<ChatCompletionRequestMessage> = vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(build_err)?
            .into(),
    ];

    let mut pending_calls: Vec<ChatCompletionMessageToolCall> = Vec::new();

    for turn in turns {
        let message: ChatCompletionRequestMessage = match turn {
            ConversationTurn::ToolCall(call) => {
                pending_calls.push(ChatCompletionMessageToolCall {
                    id: call.call_id.clone(),
                    r#type: ChatCompletionToolType::Function,
                    function: FunctionCall {
                        name: call.tool_name.clone(),
                        arguments: call.arguments.to_string(),
                    },
                });
                continue;
            }
            ConversationTurn::User { text } => ChatCompletionRequestUserMessageArgs::default()
                .content(text.as_str())
                .build()
                .map_err(build_err)?
                .into(),
            ConversationTurn::Assistant { text } => {
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(text.as_str())
                    .build()
                    .map_err(build_err)?
                    .into()
            }
            ConversationTurn::ToolResult(result) => ChatCompletionRequestToolMessageArgs::default()
                .tool_call_id(result.call_id.as_str())
                .content(result.to_model_content())
                .build()
                .map_err(build_err)?
                .into(),
        };

        if !pending_calls.is_empty() {
            messages.push(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .tool_calls(std::mem::take(&mut pending_calls))
                    .build()
                    .map_err(build_err)?
                    .into(),
            );
        }
        messages.push(message);
    }

    if !pending_calls.is_empty() {
        messages.push(
            ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(pending_calls)
                .build()
                .map_err(build_err)?
                .into(),
        );
    }

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::conversation::{ToolOutcome, ToolResult};
    use serde_json::json;

    fn call(id: &str, name: &str) -> ConversationTurn {
        ConversationTurn::ToolCall(ToolCallRequest {
            call_id: id.to_string(),
            tool_name: name.to_string(),
            arguments: json!({}),
        })
    }

    fn result(id: &str, name: &str) -> ConversationTurn {
        ConversationTurn::ToolResult(ToolResult {
            call_id: id.to_string(),
            tool_name: name.to_string(),
            outcome: ToolOutcome::Movies(Vec::new()),
        })
    }

    #[test]
    fn test_tool_calls_are_grouped() {
        let turns = vec![
            ConversationTurn::User { text: "trending and top rated?".to_string() },
            call("c1", "get_trending"),
            call("c2", "get_top_rated"),
            result("c1", "get_trending"),
            result("c2", "get_top_rated"),
            ConversationTurn::Assistant { text: "Here they are".to_string() },
        ];

        let messages = to_messages("system", &turns).unwrap();
        let json: Vec<Value> = messages.iter().map(|m| serde_json::to_value(m).unwrap()).collect();

        let roles: Vec<&str> = json.iter().map(|m| m["role"].as_str().unwrap()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "tool", "tool", "assistant"]);
        assert_eq!(json[2]["tool_calls"].as_array().unwrap().len(), 2);
        assert_eq!(json[2]["tool_calls"][1]["function"]["name"], "get_top_rated");
        assert_eq!(json[3]["tool_call_id"], "c1");
        assert_eq!(json[4]["tool_call_id"], "c2");
    }

    #[test]
    fn test_reply_with_tool_calls() {
        let message: ChatCompletionResponseMessage = serde_json::from_value(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_abc",
                "type": "function",
                "function": {
                    "name": "search_by_person",
                    "arguments": "{\"name\": \"Christopher Nolan\", \"role\": \"director\"}"
                }
            }]
        }))
        .unwrap();

        match reply_from_message(message).unwrap() {
            ModelReply::ToolCalls(calls) => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].call_id, "call_abc");
                assert_eq!(calls[0].arguments["role"], "director");
            }
            other => panic!("Expected tool calls, got {:?}", other),
        }
    }

    #[test]
    fn test_reply_with_text() {
        let message: ChatCompletionResponseMessage = serde_json::from_value(json!({
            "role": "assistant",
            "content": "I only know about movies."
        }))
        .unwrap();

        assert_eq!(
            reply_from_message(message).unwrap(),
            ModelReply::Answer("I only know about movies.".to_string())
        );
    }

    #[test]
    fn test_unparseable_arguments_kept_raw() {
        let message: ChatCompletionResponseMessage = serde_json::from_value(json!({
            "role": "assistant",
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "get_trending", "arguments": "{window: day"}
            }]
        }))
        .unwrap();

        match reply_from_message(message).unwrap() {
            ModelReply::ToolCalls(calls) => {
                assert_eq!(calls[0].arguments, Value::String("{window: day".to_string()))
            }
            other => panic!("Expected tool calls, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_reply_is_model_error() {
        for content in [json!(null), json!(""), json!("  \n")] {
            let message: ChatCompletionResponseMessage = serde_json::from_value(json!({
                "role": "assistant",
                "content": content,
                "tool_calls": []
            }))
            .unwrap();

            let err = reply_from_message(message).unwrap_err();
            assert!(matches!(err, ReelError::Model(_)), "{:?}", err);
        }
    }
}
