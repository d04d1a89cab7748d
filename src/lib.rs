//! Reelchat - a conversational movie assistant
//!
//! Routes natural-language questions about movies to The Movie Database
//! (TMDB) through language-model tool calling.
//!
//! # Overview
//!
//! Reelchat lets you:
//! - Look up a movie by title, with synopsis, rating, cast and director
//! - Get recommendations by genre or by similarity to a movie
//! - See what's trending and what's top rated
//! - Find movies by an actor or a director
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompts
//! - `metadata` - Movie metadata client (TMDB) and the normalized movie record
//! - `agent` - Tool manifest, conversation log and the dispatch loop
//! - `openai` - OpenAI-compatible client setup
//! - `cli` - Command-line and HTTP front ends
//!
//! # Example
//!
//! ```rust,no_run
//! use reelchat::agent::{ChatSession, OpenAIChatModel, ToolContext};
//! use reelchat::config::{Prompts, Settings};
//! use reelchat::metadata::TmdbClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let tools = ToolContext::new(Arc::new(TmdbClient::new(&settings.tmdb)?));
//!     let model = OpenAIChatModel::new(&settings.model)?;
//!
//!     let mut session = ChatSession::new(Arc::new(model), Arc::new(tools), Prompts::default());
//!     let reply = session.send_message("Movies directed by Christopher Nolan").await;
//!     println!("{}", reply.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod metadata;
pub mod openai;

pub use error::{ReelError, Result};
