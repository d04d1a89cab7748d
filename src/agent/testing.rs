//! In-memory model and catalog used by the agent tests.

use super::conversation::{ConversationTurn, ToolCallRequest};
use super::manifest::ToolSpec;
use super::model::{ChatModel, ModelReply};
use crate::error::{ReelError, Result};
use crate::metadata::{sample_movie, MetadataClient, MovieRecord, PersonRole, TimeWindow};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Catalog with a handful of fixed movies that records every call.
#[derive(Default)]
pub struct FakeCatalog {
    calls: Mutex<Vec<String>>,
    /// Delay applied to `get_top_rated`, to exercise out-of-order completion.
    top_rated_delay: Option<Duration>,
}

impl FakeCatalog {
    pub fn with_top_rated_delay(delay: Duration) -> Self {
        Self {
            top_rated_delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn movie(id: u64, title: &str, popularity: f64) -> MovieRecord {
    MovieRecord {
        popularity,
        ..sample_movie(id, title)
    }
}

#[async_trait]
impl MetadataClient for FakeCatalog {
    async fn search_by_genre(&self, genres: &BTreeSet<String>) -> Result<Vec<MovieRecord>> {
        self.record(format!("search_by_genre({:?})", genres));
        Ok(vec![movie(603, "The Matrix", 80.0)])
    }

    async fn search_by_title(&self, title: &str) -> Result<MovieRecord> {
        self.record(format!("search_by_title({:?})", title));
        match title {
            "Interstellar" => Ok(movie(157336, "Interstellar", 140.0)),
            _ => Err(ReelError::NotFound(format!("No movie matches the title '{}'", title))),
        }
    }

    async fn find_similar(&self, title: &str) -> Result<Vec<MovieRecord>> {
        self.record(format!("find_similar({:?})", title));
        match title {
            "Interstellar" => Ok(vec![
                movie(27205, "Inception", 120.0),
                movie(286217, "The Martian", 60.0),
            ]),
            _ => Err(ReelError::NotFound(format!("No movie matches the title '{}'", title))),
        }
    }

    async fn get_trending(&self, window: TimeWindow) -> Result<Vec<MovieRecord>> {
        self.record(format!("get_trending({})", window));
        Ok(vec![movie(693134, "Dune: Part Two", 300.0)])
    }

    async fn get_top_rated(&self) -> Result<Vec<MovieRecord>> {
        self.record("get_top_rated()".to_string());
        if let Some(delay) = self.top_rated_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(vec![movie(278, "The Shawshank Redemption", 90.0)])
    }

    async fn search_by_person(&self, name: &str, role: PersonRole) -> Result<Vec<MovieRecord>> {
        self.record(format!("search_by_person({:?}, {})", name, role));
        match (name, role) {
            ("Christopher Nolan", PersonRole::Director) => Ok(vec![
                movie(872585, "Oppenheimer", 300.0),
                movie(157336, "Interstellar", 140.0),
                movie(27205, "Inception", 120.0),
            ]),
            _ => Err(ReelError::NotFound(format!("No person named '{}'", name))),
        }
    }
}

/// Model that replays scripted replies, then repeats `then` forever.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelReply>>>,
    then: Option<ModelReply>,
    /// Conversation length seen on each call.
    seen: Mutex<Vec<usize>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<ModelReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            then: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// A model that never stops asking for tools.
    pub fn always(reply: ModelReply) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            then: Some(reply),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// A model whose first call fails.
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(ReelError::Upstream(
                "Chat API error: connection refused".to_string(),
            ))])),
            then: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn seen(&self) -> Vec<usize> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(
        &self,
        _system_prompt: &str,
        turns: &[ConversationTurn],
        _tools: &[ToolSpec],
    ) -> Result<ModelReply> {
        self.seen.lock().unwrap().push(turns.len());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(reply) => reply,
            None => Ok(self
                .then
                .clone()
                .unwrap_or_else(|| ModelReply::Answer("done".to_string()))),
        }
    }
}

/// Shorthand for a single tool call request.
pub fn tool_call(id: &str, name: &str, arguments: Value) -> ToolCallRequest {
    ToolCallRequest {
        call_id: id.to_string(),
        tool_name: name.to_string(),
        arguments,
    }
}
