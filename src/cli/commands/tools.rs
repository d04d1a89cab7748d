//! Tools command: print the manifest offered to the model.

use crate::agent::{manifest, ParamType};
use crate::cli::Output;
use anyhow::Result;

/// Run the tools command.
pub fn run_tools(json: bool) -> Result<()> {
    let tools = manifest();

    if json {
        let schemas: Vec<serde_json::Value> = tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.json_schema(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&schemas)?);
        return Ok(());
    }

    Output::header(&format!("Tools ({})", tools.len()));
    for tool in tools {
        println!();
        Output::list_item(tool.name);
        println!("    {}", tool.description);
        for param in tool.parameters {
            let kind = match param.kind {
                ParamType::String => "string".to_string(),
                ParamType::StringList => "list of strings".to_string(),
                ParamType::Enum(values) => values.join(" | "),
            };
            let requirement = match (param.required, param.default) {
                (true, _) => "required".to_string(),
                (false, Some(default)) => format!("default: {}", default),
                (false, None) => "optional".to_string(),
            };
            Output::kv(param.name, &format!("{} ({})", kind, requirement));
        }
    }

    Ok(())
}
