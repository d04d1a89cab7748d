//! Conversational dispatch loop with tool calling.
//!
//! A `ChatSession` keeps the conversation log, asks the model for the next
//! reply, and runs the movie tools the model requests until it answers.

mod conversation;
mod manifest;
mod model;
mod runner;
mod tools;

#[cfg(test)]
pub(crate) mod testing;

pub use conversation::{
    render, Conversation, ConversationTurn, RenderContent, RenderItem, RenderRole,
    ToolCallRequest, ToolErrorKind, ToolFailure, ToolOutcome, ToolResult,
};
pub use manifest::{
    find_tool, manifest, tool_definitions, verify_manifest, ParamSpec, ParamType, ToolKind,
    ToolSpec,
};
pub use model::{ChatModel, ModelReply, OpenAIChatModel};
pub use runner::{ChatSession, TurnOutcome, TurnReply, DEFAULT_MAX_TOOL_ROUNDS};
pub use tools::{parse_tool_call, validate_arguments, ToolContext, ToolInvocation};
