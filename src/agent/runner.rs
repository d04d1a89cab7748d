//! Chat session with the tool calling loop.

use super::conversation::{
    render, Conversation, ConversationTurn, RenderItem, ToolCallRequest, ToolFailure,
    ToolOutcome, ToolResult,
};
use super::manifest::manifest;
use super::model::{ChatModel, ModelReply};
use super::tools::ToolContext;
use crate::config::Prompts;
use crate::error::ReelError;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default number of tool rounds per user message.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;

/// One chat session: a conversation log driven by a model and the tools.
pub struct ChatSession {
    model: Arc<dyn ChatModel>,
    tools: Arc<ToolContext>,
    prompts: Prompts,
    conversation: Conversation,
    max_tool_rounds: usize,
}

/// How a user turn ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The model produced a plain-text answer.
    Answered,
    /// The model kept asking for tools past the round limit.
    RoundLimitReached,
    /// The model call failed; the answer is the apology text.
    ModelFailed { error: String },
}

/// Result of one user message.
#[derive(Debug, Clone, Serialize)]
pub struct TurnReply {
    /// Final assistant text appended to the conversation.
    pub answer: String,
    pub outcome: TurnOutcome,
    /// Number of tool rounds executed.
    pub rounds: usize,
    /// Display items for everything appended during this turn.
    pub items: Vec<RenderItem>,
}

impl ChatSession {
    /// Create a session with an empty conversation.
    pub fn new(model: Arc<dyn ChatModel>, tools: Arc<ToolContext>, prompts: Prompts) -> Self {
        Self {
            model,
            tools,
            prompts,
            conversation: Conversation::new(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Set the maximum number of tool rounds per user message.
    pub fn with_max_tool_rounds(mut self, max: usize) -> Self {
        self.max_tool_rounds = max;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Handle one user message.
    ///
    /// Appends the user turn, runs the model/tool loop, and always ends with an
    /// assistant turn, so the log stays usable for the next message.
    pub async fn send_message(&mut self, text: &str) -> TurnReply {
        let start = self.conversation.push(ConversationTurn::User {
            text: text.to_string(),
        });

        let (answer, outcome, rounds) = self.drive().await;
        self.conversation.push(ConversationTurn::Assistant {
            text: answer.clone(),
        });

        TurnReply {
            answer,
            outcome,
            rounds,
            items: render(self.conversation.since(start + 1)),
        }
    }

    async fn drive(&mut self) -> (String, TurnOutcome, usize) {
        let tools = manifest();
        let mut rounds = 0;

        loop {
            debug!("Model round {} ({} turns)", rounds + 1, self.conversation.len());
            let reply = self
                .model
                .complete(&self.prompts.system, self.conversation.turns(), tools)
                .await;

            let calls = match reply {
                Ok(ModelReply::Answer(text)) => return (text, TurnOutcome::Answered, rounds),
                Ok(ModelReply::ToolCalls(calls)) => calls,
                Err(e) => {
                    warn!("Model call failed: {}", e);
                    return (
                        self.prompts.model_failure.clone(),
                        TurnOutcome::ModelFailed {
                            error: e.to_string(),
                        },
                        rounds,
                    );
                }
            };

            if rounds >= self.max_tool_rounds {
                warn!(
                    "Model still requested {} tools after {} rounds",
                    calls.len(),
                    rounds
                );
                self.refuse_tool_calls(calls);
                return (
                    self.prompts.fallback.clone(),
                    TurnOutcome::RoundLimitReached,
                    rounds,
                );
            }

            rounds += 1;
            info!("Tool round {}: {} calls", rounds, calls.len());
            self.run_tool_calls(calls).await;
        }
    }

    /// Record every call, run them concurrently, and append results in request order.
    async fn run_tool_calls(&mut self, calls: Vec<ToolCallRequest>) {
        for call in &calls {
            self.conversation.push(ConversationTurn::ToolCall(call.clone()));
        }

        let tools = Arc::clone(&self.tools);
        let results = join_all(calls.iter().map(|call| tools.dispatch(call))).await;

        for result in results {
            self.conversation.push(ConversationTurn::ToolResult(result));
        }
    }

    /// Answer calls past the round limit without running them.
    fn refuse_tool_calls(&mut self, calls: Vec<ToolCallRequest>) {
        let failure = ToolFailure::from(ReelError::LoopBoundExceeded(self.max_tool_rounds));
        for call in &calls {
            self.conversation.push(ConversationTurn::ToolCall(call.clone()));
        }
        for call in calls {
            self.conversation.push(ConversationTurn::ToolResult(ToolResult {
                call_id: call.call_id,
                tool_name: call.tool_name,
                outcome: ToolOutcome::Failed(failure.clone()),
            }));
        }
    }
}
