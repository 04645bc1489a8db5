/// Toolset Registry
///
/// Tools are grouped into named toolsets which are enabled as a unit. Each
/// toolset lives in its own module exporting a `register` function that adds
/// the toolset to the registry during server initialization.

pub mod code_security;
pub mod context;
pub mod dynamic;
pub mod issues;
pub mod pull_requests;
pub mod repos;
pub mod users;

use serde::Serialize;
use serde_json::Value;

use crate::core::error::LoopError;
use crate::core::translations::Translations;

/// Selection keyword that enables every toolset.
pub const ALL_TOOLSETS: &str = "all";

/// MCP tool definition.
///
/// Serialized as an entry of a `tools/list` result; the output schema is
/// only published through the HTTP manifest.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MCPTool {
    /// Unique tool identifier used in `tools/call`
    pub name: String,
    /// Human-readable description, possibly overridden by translations
    pub description: String,
    /// JSON Schema of the `arguments` object
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    /// Shape of the tool result, published as `output_spec` in `/tools`
    #[serde(skip)]
    pub output_schema: Value,
    /// Behavioral hints for clients
    pub annotations: ToolAnnotations,
}

/// MCP tool annotations.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ToolAnnotations {
    /// True when the tool never modifies GitHub state
    #[serde(rename = "readOnlyHint")]
    pub read_only_hint: bool,
}

impl MCPTool {
    pub fn is_read_only(&self) -> bool {
        self.annotations.read_only_hint
    }
}

/// One input parameter of a tool.
pub(crate) struct Param {
    name: &'static str,
    kind: &'static str,
    description: &'static str,
    required: bool,
}

pub(crate) const fn required(
    name: &'static str,
    kind: &'static str,
    description: &'static str,
) -> Param {
    Param {
        name,
        kind,
        description,
        required: true,
    }
}

pub(crate) const fn optional(
    name: &'static str,
    kind: &'static str,
    description: &'static str,
) -> Param {
    Param {
        name,
        kind,
        description,
        required: false,
    }
}

/// JSON schema for an object with the given parameters.
pub(crate) fn input_schema(params: &[Param]) -> Value {
    let mut properties = serde_json::Map::new();
    for p in params {
        properties.insert(
            p.name.to_string(),
            serde_json::json!({ "type": p.kind, "description": p.description }),
        );
    }
    let required: Vec<&str> = params.iter().filter(|p| p.required).map(|p| p.name).collect();
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

pub(crate) fn output_schema(kind: &str, description: &str) -> Value {
    serde_json::json!({ "type": kind, "description": description })
}

/// Build a tool whose description can be overridden via translations.
pub(crate) fn tool(
    t: &mut Translations,
    name: &str,
    description: &str,
    read_only: bool,
    params: &[Param],
    output: Value,
) -> MCPTool {
    let key = format!("TOOL_{}_DESCRIPTION", name.to_ascii_uppercase());
    MCPTool {
        name: name.to_string(),
        description: t.translate(&key, description),
        input_schema: input_schema(params),
        output_schema: output,
        annotations: ToolAnnotations {
            read_only_hint: read_only,
        },
    }
}

/// A named group of tools enabled together.
#[derive(Debug, Clone)]
pub struct Toolset {
    pub name: &'static str,
    pub description: String,
    pub enabled: bool,
    tools: Vec<MCPTool>,
}

impl Toolset {
    pub fn new(t: &mut Translations, name: &'static str, description: &str) -> Self {
        let key = format!("TOOLSET_{}_DESCRIPTION", name.to_ascii_uppercase());
        Self {
            name,
            description: t.translate(&key, description),
            enabled: false,
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<MCPTool>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Tools exposed by this toolset; write tools are hidden in read-only mode.
    pub fn tools(&self, read_only: bool) -> impl Iterator<Item = &MCPTool> {
        self.tools
            .iter()
            .filter(move |tool| !read_only || tool.is_read_only())
    }
}

/// Registry of every known toolset, in registration order.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    toolsets: Vec<Toolset>,
    read_only: bool,
}

impl ToolRegistry {
    pub fn new(read_only: bool) -> Self {
        Self {
            toolsets: Vec::new(),
            read_only,
        }
    }

    /// Registry with all GitHub toolsets registered and none enabled except
    /// `context`.
    pub fn github(t: &mut Translations, read_only: bool) -> Self {
        let mut registry = Self::new(read_only);
        context::register(&mut registry, t);
        repos::register(&mut registry, t);
        issues::register(&mut registry, t);
        users::register(&mut registry, t);
        pull_requests::register(&mut registry, t);
        code_security::register(&mut registry, t);
        registry.register(Toolset::new(
            t,
            "experiments",
            "Experimental features that are not considered stable yet",
        ));
        registry
    }

    pub fn register(&mut self, toolset: Toolset) {
        self.toolsets.push(toolset);
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn toolsets(&self) -> &[Toolset] {
        &self.toolsets
    }

    pub fn toolset(&self, name: &str) -> Option<&Toolset> {
        self.toolsets.iter().find(|ts| ts.name == name)
    }

    /// Enable a single toolset by name.
    pub fn enable_toolset(&mut self, name: &str) -> Result<(), LoopError> {
        let toolset = self
            .toolsets
            .iter_mut()
            .find(|ts| ts.name == name)
            .ok_or_else(|| LoopError::UnknownToolset(name.to_string()))?;
        toolset.enabled = true;
        Ok(())
    }

    /// Enable every toolset in `names`; `all` enables everything.
    pub fn enable_toolsets(&mut self, names: &[String]) -> Result<(), LoopError> {
        if names.iter().any(|n| n == ALL_TOOLSETS) {
            for toolset in &mut self.toolsets {
                toolset.enabled = true;
            }
            return Ok(());
        }
        for name in names {
            self.enable_toolset(name)?;
        }
        Ok(())
    }

    /// Tools of all enabled toolsets, in registration order.
    pub fn tools(&self) -> Vec<&MCPTool> {
        self.toolsets
            .iter()
            .filter(|ts| ts.enabled)
            .flat_map(|ts| ts.tools(self.read_only))
            .collect()
    }

    pub fn find(&self, name: &str) -> Option<&MCPTool> {
        self.tools().into_iter().find(|tool| tool.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(read_only: bool) -> ToolRegistry {
        ToolRegistry::github(&mut Translations::default(), read_only)
    }

    #[test]
    fn only_context_is_enabled_initially() {
        let registry = registry(false);
        let enabled: Vec<&str> = registry
            .toolsets()
            .iter()
            .filter(|ts| ts.enabled)
            .map(|ts| ts.name)
            .collect();
        assert_eq!(enabled, vec!["context"]);
        assert!(registry.find("get_me").is_some());
    }

    #[test]
    fn all_enables_every_toolset() {
        let mut registry = registry(false);
        registry.enable_toolsets(&["all".to_string()]).unwrap();
        assert!(registry.toolsets().iter().all(|ts| ts.enabled));
        assert!(registry.find("create_issue").is_some());
        assert!(registry.find("list_code_scanning_alerts").is_some());
    }

    #[test]
    fn named_selection_enables_only_those() {
        let mut registry = registry(false);
        registry.enable_toolsets(&["issues".to_string()]).unwrap();
        assert!(registry.find("get_issue").is_some());
        assert!(registry.find("get_pull_request").is_none());
    }

    #[test]
    fn unknown_toolset_is_an_error() {
        let mut registry = registry(false);
        let err = registry
            .enable_toolsets(&["repos".to_string(), "wiki".to_string()])
            .unwrap_err();
        assert!(matches!(err, LoopError::UnknownToolset(name) if name == "wiki"));
    }

    #[test]
    fn read_only_hides_write_tools() {
        let mut registry = registry(true);
        registry.enable_toolsets(&["all".to_string()]).unwrap();
        assert!(registry.find("get_issue").is_some());
        assert!(registry.find("create_issue").is_none());
        assert!(registry.tools().iter().all(|tool| tool.is_read_only()));
    }

    #[test]
    fn tool_names_are_unique() {
        let mut registry = registry(false);
        registry.enable_toolsets(&["all".to_string()]).unwrap();
        let mut names: Vec<&str> = registry.tools().iter().map(|t| t.name.as_str()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn input_schema_lists_required_params() {
        let schema = input_schema(&[
            required("owner", "string", "Repository owner"),
            optional("page", "number", "Page number"),
        ]);
        assert_eq!(schema["required"], serde_json::json!(["owner"]));
        assert_eq!(schema["properties"]["page"]["type"], "number");
    }

    #[test]
    fn descriptions_can_be_translated() {
        let mut overrides = std::collections::HashMap::new();
        overrides.insert("TOOL_GET_ME_DESCRIPTION".to_string(), "Who am I".to_string());
        let registry = ToolRegistry::github(&mut Translations::new(overrides), false);
        assert_eq!(registry.find("get_me").unwrap().description, "Who am I");
    }
}
