//! Call command: run one tool without the model.

use super::build_tool_context;
use crate::agent::{render, ConversationTurn, ToolCallRequest, ToolOutcome};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::{Context, Result};

/// Run the call command.
///
/// Goes through the same validation and dispatch path the model uses.
pub async fn run_call(tool: &str, args: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Call, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let arguments: serde_json::Value =
        serde_json::from_str(args).context("--args must be a JSON object")?;

    let tools = build_tool_context(&settings)?;
    let request = ToolCallRequest {
        call_id: format!("cli_{}", uuid::Uuid::new_v4().simple()),
        tool_name: tool.to_string(),
        arguments,
    };

    let spinner = Output::spinner(&format!("Calling {}...", tool));
    let result = tools.dispatch(&request).await;
    spinner.finish_and_clear();

    if let ToolOutcome::Failed(failure) = &result.outcome {
        Output::error(&format!("{:?}: {}", failure.kind, failure.message));
        anyhow::bail!("{} failed", tool);
    }

    let items = render(&[ConversationTurn::ToolResult(result)]);
    Output::tool_items(&items, &settings.tmdb.image_base_url);
    println!();

    Ok(())
}
