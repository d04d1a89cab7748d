//! Ask command implementation.

use super::{build_session, build_tool_context};
use crate::agent::TurnOutcome;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command: one user turn, then exit.
pub async fn run_ask(
    question: &str,
    model: Option<String>,
    json: bool,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'reelchat config path' to locate the configuration file.");
        return Err(e.into());
    }

    let tools = build_tool_context(&settings)?;
    let mut session = build_session(&settings, tools, model.as_deref())?;

    let spinner = Output::spinner("Thinking...");
    let reply = session.send_message(question).await;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    Output::tool_items(&reply.items, &settings.tmdb.image_base_url);
    Output::assistant(&reply.answer);

    match &reply.outcome {
        TurnOutcome::Answered => {
            if reply.rounds > 0 {
                Output::info(&format!("Completed in {} tool round(s)", reply.rounds));
            }
        }
        TurnOutcome::RoundLimitReached => {
            Output::warning(&format!(
                "Stopped after {} tool rounds without a final answer",
                reply.rounds
            ));
        }
        TurnOutcome::ModelFailed { error } => {
            Output::error(&format!("Model call failed: {}", error));
            anyhow::bail!("model call failed");
        }
    }

    Ok(())
}
