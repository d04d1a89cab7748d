//! Models command: list models offered by the configured provider.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::openai::{create_client, list_models};
use anyhow::Result;

/// Run the models command.
pub async fn run_models(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Models, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let client = create_client(&settings.model)?;

    let spinner = Output::spinner("Fetching models...");
    let models = list_models(&client).await;
    spinner.finish_and_clear();
    let models = models?;

    Output::header(&format!("Available models ({})", models.len()));
    for id in &models {
        if *id == settings.model.model {
            Output::list_item(&format!("{} (configured)", id));
        } else {
            Output::list_item(id);
        }
    }

    Ok(())
}
