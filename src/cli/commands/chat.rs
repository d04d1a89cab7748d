//! Interactive chat command.

use super::{build_session, build_tool_context};
use crate::agent::{RenderContent, RenderRole, TurnOutcome};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'reelchat config path' to locate the configuration file.");
        return Err(e);
    }

    let tools = build_tool_context(&settings)?;
    let mut chat = build_session(&settings, tools.clone(), model.as_deref())?;

    println!("\n{}", style("Reelchat").bold().cyan());
    println!(
        "{}\n",
        style("Ask about movies, or 'exit' to quit. Use 'clear' to start over.").dim()
    );
    Output::assistant(&settings.general.greeting);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            chat = build_session(&settings, tools.clone(), model.as_deref())?;
            Output::info("Conversation cleared.");
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        let reply = chat.send_message(input).await;
        spinner.finish_and_clear();

        for item in reply.items.iter().filter(|i| i.role == RenderRole::Tool) {
            let tool = item.tool.as_deref().unwrap_or_default();
            let mark = match item.content {
                RenderContent::Movies(_) => style("✓").green(),
                RenderContent::Text(_) => style("✗").red(),
            };
            println!("{} {}", style(format!("  [{}]", tool)).dim(), mark);
        }

        Output::tool_items(&reply.items, &settings.tmdb.image_base_url);
        Output::assistant(&reply.answer);

        if let TurnOutcome::ModelFailed { error } = &reply.outcome {
            Output::error(&format!("Error: {}", error));
        }
    }

    Ok(())
}
