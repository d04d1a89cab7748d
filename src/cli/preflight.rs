//! Pre-flight checks before network-bound operations.
//!
//! Validates that credentials are available before starting operations that
//! would otherwise fail midway through a conversation.

use crate::config::{Settings, TMDB_API_KEY_ENV, TMDB_TOKEN_ENV};
use crate::error::{ReelError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Chatting needs the model key and TMDB credentials.
    Chat,
    /// Running a tool directly needs TMDB credentials.
    Call,
    /// Listing models needs the model key.
    Models,
    /// Printing the manifest has no requirements.
    Tools,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Chat => {
            check_model_key(settings)?;
            check_tmdb(settings)?;
        }
        Operation::Call => check_tmdb(settings)?,
        Operation::Models => check_model_key(settings)?,
        Operation::Tools => {}
    }
    Ok(())
}

/// Check that the model API key is configured.
fn check_model_key(settings: &Settings) -> Result<()> {
    let env = &settings.model.api_key_env;
    match std::env::var(env) {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(ReelError::Config(format!(
            "{} is empty. Set it with: export {}='sk-...'",
            env, env
        ))),
        Err(_) => Err(ReelError::Config(format!(
            "{} not set. Set it with: export {}='sk-...'",
            env, env
        ))),
    }
}

/// Check that TMDB credentials are configured.
fn check_tmdb(settings: &Settings) -> Result<()> {
    match settings.tmdb.auth() {
        Some(_) => Ok(()),
        None => Err(ReelError::Config(format!(
            "No TMDB credentials. Set {} or {}, or tmdb.api_key in the config file",
            TMDB_TOKEN_ENV, TMDB_API_KEY_ENV
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tools_no_requirements() {
        assert!(check(Operation::Tools, &Settings::default()).is_ok());
    }

    #[test]
    fn test_configured_tmdb_key_passes() {
        let mut settings = Settings::default();
        settings.tmdb.api_key = Some("abc123".to_string());
        assert!(check(Operation::Call, &settings).is_ok());
    }

    #[test]
    fn test_missing_model_key_is_reported() {
        let mut settings = Settings::default();
        settings.model.api_key_env = "REELCHAT_TEST_UNSET_KEY".to_string();
        let err = check(Operation::Models, &settings).unwrap_err();
        assert!(err.to_string().contains("REELCHAT_TEST_UNSET_KEY"));
    }
}
