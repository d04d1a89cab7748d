//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
///
/// `path` is the config file in use: `--config` when given, otherwise the default.
pub fn run_config(action: &ConfigAction, mut settings: Settings, path: PathBuf) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            settings.set_value(key, value)?;
            settings.save_to(&path)?;
            Output::success(&format!("Set {} = {}", key, value));
        }

        ConfigAction::Edit => {
            // Create default config if it doesn't exist
            if !path.exists() {
                settings.save_to(&path)?;
                Output::info(&format!("Created default config at {:?}", path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor).arg(&path).status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", path));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }

    Ok(())
}
