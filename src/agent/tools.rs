//! Typed tool invocations, argument validation and execution.

use super::conversation::{ToolCallRequest, ToolFailure, ToolOutcome, ToolResult};
use super::manifest::{find_tool, manifest, ParamType, ToolKind, ToolSpec};
use crate::error::{ReelError, Result};
use crate::metadata::{MetadataClient, MovieRecord, PersonRole, TimeWindow};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// A validated tool call, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    SearchByTitle { title: String },
    SearchByGenre { genres: BTreeSet<String> },
    FindSimilar { title: String },
    GetTrending { window: TimeWindow },
    GetTopRated,
    SearchByPerson { name: String, role: PersonRole },
}

impl std::fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolInvocation::SearchByTitle { title } => write!(f, "search_by_title({:?})", title),
            ToolInvocation::SearchByGenre { genres } => write!(f, "search_by_genre({:?})", genres),
            ToolInvocation::FindSimilar { title } => write!(f, "find_similar({:?})", title),
            ToolInvocation::GetTrending { window } => write!(f, "get_trending({})", window),
            ToolInvocation::GetTopRated => write!(f, "get_top_rated()"),
            ToolInvocation::SearchByPerson { name, role } => {
                write!(f, "search_by_person({:?}, {})", name, role)
            }
        }
    }
}

/// Resolve, validate and decode a tool call from the model.
pub fn parse_tool_call(name: &str, arguments: &Value) -> Result<ToolInvocation> {
    let spec = find_tool(name).ok_or_else(|| {
        let available: Vec<_> = manifest().iter().map(|t| t.name).collect();
        ReelError::UnknownTool(format!("{} (available: {})", name, available.join(", ")))
    })?;

    let args = validate_arguments(spec, arguments)?;
    decode(spec.kind, &args)
}

/// Check arguments against a tool's parameters, coercing values and applying defaults.
///
/// String lists also accept a comma-separated string, enum values are
/// case-insensitive, and keys the tool does not declare are ignored.
pub fn validate_arguments(spec: &ToolSpec, arguments: &Value) -> Result<Map<String, Value>> {
    let mut raw = match arguments {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        Value::String(s) if s.trim().is_empty() => Map::new(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => map,
            _ => {
                return Err(ReelError::InvalidArguments(format!(
                    "{} expects a JSON object of arguments, got {:?}",
                    spec.name, s
                )))
            }
        },
        other => {
            return Err(ReelError::InvalidArguments(format!(
                "{} expects a JSON object of arguments, got {}",
                spec.name, other
            )))
        }
    };

    let mut args = Map::new();
    for param in spec.parameters {
        let value = match raw.remove(param.name) {
            Some(Value::Null) | None => match (param.required, param.default) {
                (true, _) => {
                    return Err(ReelError::InvalidArguments(format!(
                        "{} is missing required argument '{}'",
                        spec.name, param.name
                    )))
                }
                (false, Some(default)) => Value::String(default.to_string()),
                (false, None) => continue,
            },
            Some(value) => value,
        };

        let coerced = coerce(param.kind, &value).map_err(|expected| {
            ReelError::InvalidArguments(format!(
                "{}: argument '{}' must be {}, got {}",
                spec.name, param.name, expected, value
            ))
        })?;
        args.insert(param.name.to_string(), coerced);
    }

    if !raw.is_empty() {
        debug!(
            "Ignoring undeclared arguments for {}: {:?}",
            spec.name,
            raw.keys().collect::<Vec<_>>()
        );
    }

    Ok(args)
}

/// Coerce one value to a parameter type, or describe what was expected.
fn coerce(kind: ParamType, value: &Value) -> std::result::Result<Value, String> {
    match kind {
        ParamType::String => {
            let s = match value {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => String::new(),
            };
            if s.is_empty() {
                Err("a non-empty string".to_string())
            } else {
                Ok(Value::String(s))
            }
        }
        ParamType::StringList => {
            let items: Vec<String> = match value {
                Value::Array(items) => items
                    .iter()
                    .map(|v| v.as_str().map(|s| s.trim().to_string()))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| "a list of strings".to_string())?,
                Value::String(s) => s.split(',').map(|p| p.trim().to_string()).collect(),
                _ => return Err("a list of strings".to_string()),
            };
            let items: Vec<Value> = items
                .into_iter()
                .filter(|s| !s.is_empty())
                .map(Value::String)
                .collect();
            if items.is_empty() {
                Err("a non-empty list of strings".to_string())
            } else {
                Ok(Value::Array(items))
            }
        }
        ParamType::Enum(allowed) => {
            let choice = value.as_str().map(|s| s.trim().to_lowercase());
            match choice {
                Some(c) if allowed.contains(&c.as_str()) => Ok(Value::String(c)),
                _ => Err(format!("one of {:?}", allowed)),
            }
        }
    }
}

/// Map validated arguments onto the typed invocation for a handler.
fn decode(kind: ToolKind, args: &Map<String, Value>) -> Result<ToolInvocation> {
    let invocation = match kind {
        ToolKind::SearchByTitle => ToolInvocation::SearchByTitle {
            title: string_arg(args, "title")?,
        },
        ToolKind::SearchByGenre => ToolInvocation::SearchByGenre {
            genres: list_arg(args, "genres")?,
        },
        ToolKind::FindSimilar => ToolInvocation::FindSimilar {
            title: string_arg(args, "title")?,
        },
        ToolKind::GetTrending => ToolInvocation::GetTrending {
            window: enum_arg(args, "window")?,
        },
        ToolKind::GetTopRated => ToolInvocation::GetTopRated,
        ToolKind::SearchByPerson => ToolInvocation::SearchByPerson {
            name: string_arg(args, "name")?,
            role: enum_arg(args, "role")?,
        },
    };
    Ok(invocation)
}

fn string_arg(args: &Map<String, Value>, name: &str) -> Result<String> {
    args.get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ReelError::InvalidArguments(format!("Missing '{}' argument", name)))
}

fn list_arg(args: &Map<String, Value>, name: &str) -> Result<BTreeSet<String>> {
    args.get(name)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .ok_or_else(|| ReelError::InvalidArguments(format!("Missing '{}' argument", name)))
}

fn enum_arg<T: serde::de::DeserializeOwned>(args: &Map<String, Value>, name: &str) -> Result<T> {
    let value = args
        .get(name)
        .cloned()
        .ok_or_else(|| ReelError::InvalidArguments(format!("Missing '{}' argument", name)))?;
    serde_json::from_value(value)
        .map_err(|e| ReelError::InvalidArguments(format!("Bad '{}' argument: {}", name, e)))
}

/// Tool execution context with access to the metadata client.
pub struct ToolContext {
    pub client: Arc<dyn MetadataClient>,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(client: Arc<dyn MetadataClient>) -> Self {
        Self { client }
    }

    /// Execute a validated invocation.
    pub async fn execute(&self, tool: &ToolInvocation) -> Result<Vec<MovieRecord>> {
        match tool {
            ToolInvocation::SearchByTitle { title } => {
                self.client.search_by_title(title).await.map(|m| vec![m])
            }
            ToolInvocation::SearchByGenre { genres } => self.client.search_by_genre(genres).await,
            ToolInvocation::FindSimilar { title } => self.client.find_similar(title).await,
            ToolInvocation::GetTrending { window } => self.client.get_trending(*window).await,
            ToolInvocation::GetTopRated => self.client.get_top_rated().await,
            ToolInvocation::SearchByPerson { name, role } => {
                self.client.search_by_person(name, *role).await
            }
        }
    }

    /// Resolve and run a model tool call, capturing any failure as data.
    pub async fn dispatch(&self, request: &ToolCallRequest) -> ToolResult {
        info!("Calling tool: {} with args: {}", request.tool_name, request.arguments);

        let outcome = match parse_tool_call(&request.tool_name, &request.arguments) {
            Ok(tool) => match self.execute(&tool).await {
                Ok(movies) => {
                    debug!("{} returned {} movies", tool, movies.len());
                    ToolOutcome::Movies(movies)
                }
                Err(e) => ToolOutcome::Failed(ToolFailure::from(e)),
            },
            Err(e) => ToolOutcome::Failed(ToolFailure::from(e)),
        };

        ToolResult {
            call_id: request.call_id.clone(),
            tool_name: request.tool_name.clone(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::conversation::ToolErrorKind;
    use crate::agent::testing::FakeCatalog;
    use serde_json::json;

    #[test]
    fn test_parse_search_by_title() {
        let tool = parse_tool_call("search_by_title", &json!({"title": "  Inception "})).unwrap();
        assert_eq!(
            tool,
            ToolInvocation::SearchByTitle {
                title: "Inception".to_string()
            }
        );
    }

    #[test]
    fn test_parse_person_defaults_and_case() {
        let tool = parse_tool_call("search_by_person", &json!({"name": "Tom Hanks"})).unwrap();
        assert_eq!(
            tool,
            ToolInvocation::SearchByPerson {
                name: "Tom Hanks".to_string(),
                role: PersonRole::Cast
            }
        );

        let tool = parse_tool_call(
            "search_by_person",
            &json!({"name": "Christopher Nolan", "role": "Director"}),
        )
        .unwrap();
        assert!(matches!(
            tool,
            ToolInvocation::SearchByPerson { role: PersonRole::Director, .. }
        ));
    }

    #[test]
    fn test_parse_genres_from_comma_string() {
        let tool = parse_tool_call("search_by_genre", &json!({"genres": "Action, comedy,"})).unwrap();
        match tool {
            ToolInvocation::SearchByGenre { genres } => {
                assert_eq!(genres.len(), 2);
                assert!(genres.contains("Action"));
                assert!(genres.contains("comedy"));
            }
            other => panic!("Expected SearchByGenre, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_trending_default_window() {
        let tool = parse_tool_call("get_trending", &Value::Null).unwrap();
        assert_eq!(tool, ToolInvocation::GetTrending { window: TimeWindow::Week });
    }

    #[test]
    fn test_parse_string_encoded_arguments() {
        let tool = parse_tool_call("find_similar", &json!(r#"{"title": "Interstellar"}"#)).unwrap();
        assert_eq!(
            tool,
            ToolInvocation::FindSimilar {
                title: "Interstellar".to_string()
            }
        );
    }

    #[test]
    fn test_undeclared_arguments_are_ignored() {
        let tool = parse_tool_call("get_top_rated", &json!({"limit": 3})).unwrap();
        assert_eq!(tool, ToolInvocation::GetTopRated);
    }

    #[test]
    fn test_unknown_tool() {
        let err = parse_tool_call("get_movies_by_actor", &json!({"name": "x"})).unwrap_err();
        assert!(matches!(err, ReelError::UnknownTool(_)));
    }

    #[test]
    fn test_invalid_arguments() {
        let cases = [
            ("search_by_title", json!({})),
            ("search_by_title", json!({"title": ""})),
            ("search_by_title", json!({"title": ["a"]})),
            ("search_by_genre", json!({"genres": []})),
            ("search_by_genre", json!({"genres": [1, 2]})),
            ("get_trending", json!({"window": "month"})),
            ("search_by_person", json!({"name": "x", "role": "producer"})),
            ("get_top_rated", json!([1, 2])),
            ("find_similar", json!("not json")),
        ];
        for (name, args) in cases {
            let err = parse_tool_call(name, &args).unwrap_err();
            assert!(
                matches!(err, ReelError::InvalidArguments(_)),
                "{} {} -> {:?}",
                name,
                args,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_dispatch_captures_failures() {
        let context = ToolContext::new(Arc::new(FakeCatalog::default()));

        let request = ToolCallRequest {
            call_id: "call_1".to_string(),
            tool_name: "search_by_title".to_string(),
            arguments: json!({"title": "No Such Movie"}),
        };
        let result = context.dispatch(&request).await;
        assert_eq!(result.call_id, "call_1");
        match result.outcome {
            ToolOutcome::Failed(f) => assert_eq!(f.kind, ToolErrorKind::NotFound),
            other => panic!("Expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_runs_handler() {
        let catalog = Arc::new(FakeCatalog::default());
        let context = ToolContext::new(catalog.clone());

        let request = ToolCallRequest {
            call_id: "call_2".to_string(),
            tool_name: "find_similar".to_string(),
            arguments: json!({"title": "Interstellar"}),
        };
        let result = context.dispatch(&request).await;
        match result.outcome {
            ToolOutcome::Movies(movies) => {
                assert!(!movies.is_empty());
                assert!(movies.iter().all(|m| m.title != "Interstellar"));
            }
            other => panic!("Expected movies, got {:?}", other),
        }
        assert_eq!(catalog.calls(), vec!["find_similar(\"Interstellar\")".to_string()]);
    }
}
