//! CLI command implementations.

mod ask;
mod call;
mod chat;
mod config;
mod models;
mod serve;
mod tools;

pub use ask::run_ask;
pub use call::run_call;
pub use chat::run_chat;
pub use config::run_config;
pub use models::run_models;
pub use serve::run_serve;
pub use tools::run_tools;

use crate::agent::{manifest, verify_manifest, ChatSession, OpenAIChatModel, ToolContext};
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::metadata::TmdbClient;
use std::sync::Arc;

/// Build the tool context backed by TMDB.
pub(crate) fn build_tool_context(settings: &Settings) -> Result<Arc<ToolContext>> {
    verify_manifest(manifest())?;
    let client = TmdbClient::new(&settings.tmdb)?;
    Ok(Arc::new(ToolContext::new(Arc::new(client))))
}

/// Build a fresh chat session from settings.
pub(crate) fn build_session(
    settings: &Settings,
    tools: Arc<ToolContext>,
    model: Option<&str>,
) -> Result<ChatSession> {
    let mut chat_model = OpenAIChatModel::new(&settings.model)?;
    if let Some(model) = model {
        chat_model = chat_model.with_model(model);
    }

    Ok(ChatSession::new(
        Arc::new(chat_model),
        tools,
        Prompts::from_settings(&settings.prompts),
    )
    .with_max_tool_rounds(settings.model.max_tool_rounds))
}
