//! Append-only conversation log and the per-turn rendering payload.

use crate::error::ReelError;
use crate::metadata::MovieRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Provider correlation ID, echoed back on the result.
    pub call_id: String,
    pub tool_name: String,
    /// Arguments as the model sent them.
    pub arguments: Value,
}

/// Category of a failed tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    NotFound,
    Upstream,
    UnknownTool,
    InvalidArguments,
    LoopBoundExceeded,
}

/// A tool error, kept as data so the model can react to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub kind: ToolErrorKind,
    pub message: String,
}

impl From<ReelError> for ToolFailure {
    fn from(err: ReelError) -> Self {
        let kind = match &err {
            ReelError::NotFound(_) => ToolErrorKind::NotFound,
            ReelError::UnknownTool(_) => ToolErrorKind::UnknownTool,
            ReelError::InvalidArguments(_) => ToolErrorKind::InvalidArguments,
            ReelError::LoopBoundExceeded(_) => ToolErrorKind::LoopBoundExceeded,
            _ => ToolErrorKind::Upstream,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// What a tool call produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutcome {
    Movies(Vec<MovieRecord>),
    Failed(ToolFailure),
}

/// Result of one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: String,
    pub tool_name: String,
    pub outcome: ToolOutcome,
}

/// Maximum synopsis length sent back to the model per movie.
const MODEL_OVERVIEW_CHARS: usize = 300;

impl ToolResult {
    /// Compact JSON observation sent to the model.
    pub fn to_model_content(&self) -> String {
        let value = match &self.outcome {
            ToolOutcome::Movies(movies) => {
                let movies: Vec<Value> = movies
                    .iter()
                    .map(|m| {
                        serde_json::json!({
                            "id": m.id,
                            "title": m.title,
                            "year": m.year(),
                            "rating": (m.rating * 10.0).round() / 10.0,
                            "overview": m.overview.chars().take(MODEL_OVERVIEW_CHARS).collect::<String>(),
                            "cast": m.cast,
                            "director": m.director,
                        })
                    })
                    .collect();
                serde_json::json!({ "movies": movies })
            }
            ToolOutcome::Failed(failure) => serde_json::json!({ "error": failure }),
        };
        value.to_string()
    }
}

/// One entry of the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationTurn {
    User { text: String },
    Assistant { text: String },
    ToolCall(ToolCallRequest),
    ToolResult(ToolResult),
}

/// Ordered, append-only log of a chat session.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, returning its index.
    pub fn push(&mut self, turn: ConversationTurn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Turns appended at or after `index`.
    pub fn since(&self, index: usize) -> &[ConversationTurn] {
        &self.turns[index.min(self.turns.len())..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Who a rendered item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderRole {
    User,
    Assistant,
    Tool,
}

/// Display content of a rendered item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RenderContent {
    Text(String),
    Movies(Vec<MovieRecord>),
}

/// One display-ready entry for a front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderItem {
    pub role: RenderRole,
    /// Tool that produced the item, for tool items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    pub content: RenderContent,
}

/// Build the rendering payload for a slice of turns.
///
/// Tool call requests are internal and not rendered; tool failures render as text.
pub fn render(turns: &[ConversationTurn]) -> Vec<RenderItem> {
    turns
        .iter()
        .filter_map(|turn| match turn {
            ConversationTurn::User { text } => Some(RenderItem {
                role: RenderRole::User,
                tool: None,
                content: RenderContent::Text(text.clone()),
            }),
            ConversationTurn::Assistant { text } => Some(RenderItem {
                role: RenderRole::Assistant,
                tool: None,
                content: RenderContent::Text(text.clone()),
            }),
            ConversationTurn::ToolCall(_) => None,
            ConversationTurn::ToolResult(result) => Some(RenderItem {
                role: RenderRole::Tool,
                tool: Some(result.tool_name.clone()),
                content: match &result.outcome {
                    ToolOutcome::Movies(movies) => RenderContent::Movies(movies.clone()),
                    ToolOutcome::Failed(failure) => RenderContent::Text(failure.message.clone()),
                },
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::sample_movie;

    #[test]
    fn test_push_and_since() {
        let mut conversation = Conversation::new();
        assert!(conversation.is_empty());

        conversation.push(ConversationTurn::User { text: "hi".to_string() });
        let index = conversation.push(ConversationTurn::Assistant { text: "hello".to_string() });

        assert_eq!(index, 1);
        assert_eq!(conversation.since(1).len(), 1);
        assert!(conversation.since(10).is_empty());
    }

    #[test]
    fn test_failure_kinds_from_errors() {
        let failure = ToolFailure::from(ReelError::NotFound("No movie".to_string()));
        assert_eq!(failure.kind, ToolErrorKind::NotFound);

        let failure = ToolFailure::from(ReelError::Upstream("timeout".to_string()));
        assert_eq!(failure.kind, ToolErrorKind::Upstream);
        assert!(failure.message.contains("timeout"));
    }

    #[test]
    fn test_model_content() {
        let result = ToolResult {
            call_id: "call_1".to_string(),
            tool_name: "search_by_title".to_string(),
            outcome: ToolOutcome::Movies(vec![sample_movie(27205, "Inception")]),
        };
        let content: Value = serde_json::from_str(&result.to_model_content()).unwrap();
        assert_eq!(content["movies"][0]["title"], "Inception");

        let failed = ToolResult {
            outcome: ToolOutcome::Failed(ToolFailure {
                kind: ToolErrorKind::UnknownTool,
                message: "Unknown tool: x".to_string(),
            }),
            ..result
        };
        let content: Value = serde_json::from_str(&failed.to_model_content()).unwrap();
        assert_eq!(content["error"]["kind"], "unknown_tool");
    }

    #[test]
    fn test_render_skips_tool_requests() {
        let turns = vec![
            ConversationTurn::User { text: "trending?".to_string() },
            ConversationTurn::ToolCall(ToolCallRequest {
                call_id: "c1".to_string(),
                tool_name: "get_trending".to_string(),
                arguments: serde_json::json!({}),
            }),
            ConversationTurn::ToolResult(ToolResult {
                call_id: "c1".to_string(),
                tool_name: "get_trending".to_string(),
                outcome: ToolOutcome::Movies(vec![sample_movie(1, "Dune")]),
            }),
            ConversationTurn::Assistant { text: "Here you go".to_string() },
        ];

        let items = render(&turns);
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].role, RenderRole::Tool);
        assert_eq!(items[1].tool.as_deref(), Some("get_trending"));
        assert!(matches!(&items[1].content, RenderContent::Movies(m) if m.len() == 1));
    }

    #[test]
    fn test_turn_serialization_is_tagged() {
        let turn = ConversationTurn::User { text: "hi".to_string() };
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value, serde_json::json!({"type": "user", "text": "hi"}));
    }
}
