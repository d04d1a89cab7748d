//! Configuration module for Reelchat.
//!
//! Handles loading and managing application settings and prompt texts.

mod prompts;
mod settings;

pub use prompts::Prompts;
pub use settings::{
    GeneralSettings, ModelSettings, PromptSettings, ServerSettings, Settings, TmdbAuth,
    TmdbSettings, TMDB_API_KEY_ENV, TMDB_TOKEN_ENV,
};
