//! Static tool manifest shown to the language model.

use crate::error::{ReelError, Result};
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// Which handler a manifest entry dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    SearchByTitle,
    SearchByGenre,
    FindSimilar,
    GetTrending,
    GetTopRated,
    SearchByPerson,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::SearchByTitle,
        ToolKind::SearchByGenre,
        ToolKind::FindSimilar,
        ToolKind::GetTrending,
        ToolKind::GetTopRated,
        ToolKind::SearchByPerson,
    ];
}

/// Accepted shape of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum ParamType {
    String,
    StringList,
    Enum(&'static [&'static str]),
}

/// One parameter of a tool.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

/// A tool the model may call.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: &'static [ParamSpec],
    #[serde(skip)]
    pub kind: ToolKind,
}

static MANIFEST: &[ToolSpec] = &[
    ToolSpec {
        name: "search_by_title",
        description: "Find a single movie by its title and return its full details \
            (synopsis, rating, cast, director). Picks the most popular match.",
        parameters: &[ParamSpec {
            name: "title",
            description: "The movie title, e.g. 'Inception'",
            kind: ParamType::String,
            required: true,
            default: None,
        }],
        kind: ToolKind::SearchByTitle,
    },
    ToolSpec {
        name: "search_by_genre",
        description: "Recommend popular movies that belong to all of the given genres.",
        parameters: &[ParamSpec {
            name: "genres",
            description: "Genre names, e.g. ['action', 'science fiction']",
            kind: ParamType::StringList,
            required: true,
            default: None,
        }],
        kind: ToolKind::SearchByGenre,
    },
    ToolSpec {
        name: "find_similar",
        description: "Recommend movies similar to a given movie title.",
        parameters: &[ParamSpec {
            name: "title",
            description: "Title of the movie to find similar movies for",
            kind: ParamType::String,
            required: true,
            default: None,
        }],
        kind: ToolKind::FindSimilar,
    },
    ToolSpec {
        name: "get_trending",
        description: "List the movies trending right now.",
        parameters: &[ParamSpec {
            name: "window",
            description: "Trending over the last 'day' or 'week'",
            kind: ParamType::Enum(&["day", "week"]),
            required: false,
            default: Some("week"),
        }],
        kind: ToolKind::GetTrending,
    },
    ToolSpec {
        name: "get_top_rated",
        description: "List the highest rated movies of all time.",
        parameters: &[],
        kind: ToolKind::GetTopRated,
    },
    ToolSpec {
        name: "search_by_person",
        description: "List movies featuring an actor (role 'cast') or directed by \
            a director (role 'director'), most popular first.",
        parameters: &[
            ParamSpec {
                name: "name",
                description: "The person's name, e.g. 'Christopher Nolan'",
                kind: ParamType::String,
                required: true,
                default: None,
            },
            ParamSpec {
                name: "role",
                description: "'cast' for acting credits, 'director' for directing credits",
                kind: ParamType::Enum(&["cast", "director"]),
                required: false,
                default: Some("cast"),
            },
        ],
        kind: ToolKind::SearchByPerson,
    },
];

/// The full tool manifest.
pub fn manifest() -> &'static [ToolSpec] {
    MANIFEST
}

/// Look up a tool by the exact name the model used.
pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    MANIFEST.iter().find(|t| t.name == name)
}

/// Check that the manifest is consistent with the handlers.
///
/// Every handler kind must appear exactly once, names must be unique, and
/// required parameters cannot carry defaults.
pub fn verify_manifest(tools: &[ToolSpec]) -> Result<()> {
    let mut names = HashSet::new();
    let mut kinds = HashSet::new();

    for tool in tools {
        if !names.insert(tool.name) {
            return Err(ReelError::Config(format!("Duplicate tool name: {}", tool.name)));
        }
        if !kinds.insert(tool.kind) {
            return Err(ReelError::Config(format!(
                "Tool {} reuses handler {:?}",
                tool.name, tool.kind
            )));
        }
        let mut params = HashSet::new();
        for param in tool.parameters {
            if !params.insert(param.name) {
                return Err(ReelError::Config(format!(
                    "Tool {} declares '{}' twice",
                    tool.name, param.name
                )));
            }
            if param.required && param.default.is_some() {
                return Err(ReelError::Config(format!(
                    "Required parameter {}.{} has a default",
                    tool.name, param.name
                )));
            }
        }
    }

    if let Some(missing) = ToolKind::ALL.iter().find(|k| !kinds.contains(*k)) {
        return Err(ReelError::Config(format!("No manifest entry for handler {:?}", missing)));
    }

    Ok(())
}

impl ToolSpec {
    /// Find a declared parameter.
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// JSON Schema for the tool's arguments object.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in self.parameters {
            let mut schema = match param.kind {
                ParamType::String => json!({"type": "string"}),
                ParamType::StringList => json!({"type": "array", "items": {"type": "string"}}),
                ParamType::Enum(values) => json!({"type": "string", "enum": values}),
            };
            let description = match param.default {
                Some(default) => format!("{} (default: {})", param.description, default),
                None => param.description.to_string(),
            };
            schema["description"] = Value::String(description);
            if let Some(default) = param.default {
                schema["default"] = Value::String(default.to_string());
            }
            properties.insert(param.name.to_string(), schema);
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }

    /// OpenAI function/tool definition.
    pub fn to_openai_tool(&self) -> ChatCompletionTool {
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: self.name.to_string(),
                description: Some(self.description.to_string()),
                parameters: Some(self.json_schema()),
                strict: None,
            },
        }
    }
}

/// Get OpenAI function/tool definitions for a manifest.
pub fn tool_definitions(tools: &[ToolSpec]) -> Vec<ChatCompletionTool> {
    tools.iter().map(ToolSpec::to_openai_tool).collect()
}
