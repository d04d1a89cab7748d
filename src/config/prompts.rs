//! Prompt templates for Reelchat.
//!
//! Defaults can be overridden from the `[prompts]` section of the config file.

use super::PromptSettings;
use serde::{Deserialize, Serialize};

/// Collection of the fixed texts used by the dispatch loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    /// System prompt sent ahead of every conversation.
    pub system: String,
    /// Answer appended when the model keeps requesting tools past the round limit.
    pub fallback: String,
    /// Answer appended when the model call itself fails.
    pub model_failure: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            system: r#"You are a friendly movie-buff assistant with access to The Movie Database (TMDB).

You have tools to look up movies. Use them whenever the user asks about specific movies, genres, people, or lists.

Guidelines:
- Use 'search_by_title' when the user names a specific movie
- Use 'search_by_genre' for recommendations by genre (pass every genre mentioned)
- Use 'find_similar' when the user wants movies like a given title
- Use 'get_trending' for what is popular right now (window 'day' or 'week')
- Use 'get_top_rated' for the best-rated movies of all time
- Use 'search_by_person' for movies with an actor (role 'cast') or by a director (role 'director')

If a tool reports an error, read it and either retry with corrected arguments or explain the problem.
If the request is not about movies, answer directly without calling tools.
Keep answers short: the movie cards with posters are shown to the user separately."#
                .to_string(),
            fallback: "Sorry, I was unable to complete the request. Please try rephrasing it."
                .to_string(),
            model_failure: "Sorry, I couldn't reach the language model. Please try again in a moment."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Build prompts from defaults plus config overrides.
    pub fn from_settings(settings: &PromptSettings) -> Self {
        let mut prompts = Self::default();
        if let Some(system) = &settings.system {
            prompts.system = system.clone();
        }
        if let Some(fallback) = &settings.fallback {
            prompts.fallback = fallback.clone();
        }
        if let Some(model_failure) = &settings.model_failure {
            prompts.model_failure = model_failure.clone();
        }
        prompts
    }
}
