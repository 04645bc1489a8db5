/// Dynamic Toolset Discovery
///
/// In dynamic mode the server starts with only the toolsets named on the
/// command line and lets the client discover and enable the rest at runtime
/// through these meta tools.

use serde_json::Value;

use crate::core::translations::Translations;
use crate::tools::{MCPTool, ToolRegistry, output_schema, required, tool};

/// Result of a meta tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub result: Value,
    /// The set of exposed tools changed and clients should re-list.
    pub tools_changed: bool,
}

pub fn tools(t: &mut Translations) -> Vec<MCPTool> {
    vec![
        tool(
            t,
            "list_available_toolsets",
            "List all available toolsets this GitHub MCP server can offer, providing the enabled status of each. Use this when a task could be achieved with a GitHub tool and the currently available tools aren't enough. Call get_toolset_tools with these toolset names to discover specific tools you can call",
            true,
            &[],
            output_schema("array", "Toolsets with their enabled status"),
        ),
        tool(
            t,
            "get_toolset_tools",
            "Lists all the capabilities that are enabled with the specified toolset, use this to get clarity on whether enabling a toolset would help you to complete a task",
            true,
            &[required("toolset", "string", "The name of the toolset you want to get the tools for")],
            output_schema("array", "Tools contained in the toolset"),
        ),
        tool(
            t,
            "enable_toolset",
            "Enable one of the sets of tools the GitHub MCP server provides, use get_toolset_tools and list_available_toolsets first to see what this will enable",
            true,
            &[required("toolset", "string", "The name of the toolset to enable")],
            output_schema("string", "Confirmation message"),
        ),
    ]
}

/// Run a meta tool. Returns `None` when `name` is not a meta tool.
pub fn call(registry: &mut ToolRegistry, name: &str, args: &Value) -> Option<Result<Outcome, String>> {
    let outcome = match name {
        "list_available_toolsets" => Ok(unchanged(list_available_toolsets(registry))),
        "get_toolset_tools" => toolset_arg(args).and_then(|ts| get_toolset_tools(registry, ts)),
        "enable_toolset" => toolset_arg(args).and_then(|ts| enable_toolset(registry, ts)),
        _ => return None,
    };
    Some(outcome)
}

fn unchanged(result: Value) -> Outcome {
    Outcome {
        result,
        tools_changed: false,
    }
}

fn toolset_arg(args: &Value) -> Result<&str, String> {
    args.get("toolset")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing required parameter: toolset".to_string())
}

fn list_available_toolsets(registry: &ToolRegistry) -> Value {
    registry
        .toolsets()
        .iter()
        .map(|ts| {
            serde_json::json!({
                "name": ts.name,
                "description": ts.description,
                "can_enable": "true",
                "currently_enabled": ts.enabled.to_string(),
            })
        })
        .collect()
}

fn get_toolset_tools(registry: &ToolRegistry, name: &str) -> Result<Outcome, String> {
    let toolset = registry
        .toolset(name)
        .ok_or_else(|| format!("Toolset {name} not found"))?;
    let tools: Value = toolset
        .tools(registry.read_only())
        .map(|tool| {
            serde_json::json!({
                "name": tool.name,
                "description": tool.description,
                "can_enable": "true",
                "toolset": toolset.name,
            })
        })
        .collect();
    Ok(unchanged(tools))
}

fn enable_toolset(registry: &mut ToolRegistry, name: &str) -> Result<Outcome, String> {
    let already = registry
        .toolset(name)
        .map(|ts| ts.enabled)
        .ok_or_else(|| format!("Toolset {name} not found"))?;
    if already {
        return Ok(unchanged(Value::String(format!(
            "Toolset {name} is already enabled"
        ))));
    }
    registry.enable_toolset(name).map_err(|e| e.to_string())?;
    Ok(Outcome {
        result: Value::String(format!("Toolset {name} enabled")),
        tools_changed: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> ToolRegistry {
        ToolRegistry::github(&mut Translations::default(), false)
    }

    #[test]
    fn non_meta_tool_is_not_handled() {
        assert!(call(&mut registry(), "get_me", &json!({})).is_none());
    }

    #[test]
    fn lists_every_toolset_with_status() {
        let outcome = call(&mut registry(), "list_available_toolsets", &json!({}))
            .unwrap()
            .unwrap();
        let items = outcome.result.as_array().unwrap();
        assert!(items.iter().any(|i| i["name"] == "repos" && i["currently_enabled"] == "false"));
        assert!(items.iter().any(|i| i["name"] == "context" && i["currently_enabled"] == "true"));
        assert!(!outcome.tools_changed);
    }

    #[test]
    fn enabling_a_toolset_reports_change_once() {
        let mut registry = registry();
        let first = call(&mut registry, "enable_toolset", &json!({"toolset": "issues"}))
            .unwrap()
            .unwrap();
        assert!(first.tools_changed);
        assert!(registry.find("get_issue").is_some());

        let second = call(&mut registry, "enable_toolset", &json!({"toolset": "issues"}))
            .unwrap()
            .unwrap();
        assert!(!second.tools_changed);
    }

    #[test]
    fn unknown_toolset_and_missing_argument_are_errors() {
        let mut registry = registry();
        assert!(call(&mut registry, "enable_toolset", &json!({"toolset": "wiki"})).unwrap().is_err());
        assert!(call(&mut registry, "get_toolset_tools", &json!({})).unwrap().is_err());
    }

    #[test]
    fn toolset_tools_lists_members() {
        let outcome = call(&mut registry(), "get_toolset_tools", &json!({"toolset": "users"}))
            .unwrap()
            .unwrap();
        assert_eq!(outcome.result[0]["name"], "search_users");
    }
}
