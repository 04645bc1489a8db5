/// MCP Stdio Server
///
/// This module contains the protocol loop the transports hand a validated
/// [`ServerConfig`] to:
/// - JSON-RPC 2.0 request/response structures
/// - A per-run session owning the toolset registry
/// - The line-based stdio loop
/// - The [`ProtocolLoop`] seam the dispatcher calls through

use std::sync::Arc;

use bytes::Bytes;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use crate::core::config::EnvMap;
use crate::core::error::LoopError;
use crate::core::translations::Translations;
use crate::core::validate::ServerConfig;
use crate::tools::{ALL_TOOLSETS, MCPTool, ToolRegistry, dynamic};

/// Name reported in `initialize` responses.
pub const SERVER_NAME: &str = "github-mcp-server";

/// Tracing target for `--enable-command-logging` output.
pub const IO_TARGET: &str = "github_mcp_server::io";

const PROTOCOL_VERSION: &str = "2024-11-05";
const DOT_COM_API: &str = "https://api.github.com/";

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

/// JSON-RPC 2.0 request read from one stdin line.
///
/// A line without an `id` is a notification and gets no response.
#[derive(Deserialize, Debug)]
pub struct MCPRequest {
    /// JSON-RPC version identifier, must be "2.0"
    #[allow(dead_code)]
    jsonrpc: String,
    /// Request ID for correlating responses. None indicates a notification.
    id: Option<Value>,
    /// MCP method name (e.g., "initialize", "tools/list", "tools/call")
    method: String,
    /// Method-specific parameters
    params: Option<Value>,
}

/// JSON-RPC 2.0 response carrying either a result or an error.
#[derive(Serialize, Debug)]
pub struct MCPResponse {
    /// JSON-RPC version identifier, always "2.0"
    jsonrpc: String,
    /// Request ID from the original request
    id: Option<Value>,
    /// Response result, present when the request succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error information, present when the request failed
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<MCPError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Debug)]
pub struct MCPError {
    /// JSON-RPC error code (e.g., -32601 for method not found)
    code: i32,
    /// Human-readable error message
    message: String,
    /// Optional additional error data
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl MCPResponse {
    fn result(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(MCPError {
                code,
                message,
                data: None,
            }),
        }
    }
}

/// Tool call result in MCP content form.
fn tool_result(text: String, is_error: bool) -> Value {
    serde_json::json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error
    })
}

/// REST base URL for a `--gh-host` value.
///
/// Empty or `github.com` means the public API; anything else is treated as a
/// GitHub Enterprise Server host, defaulting to https.
pub fn api_base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return DOT_COM_API.to_string();
    }
    let (scheme, authority) = host.split_once("://").unwrap_or(("https", host));
    if authority.eq_ignore_ascii_case("github.com") || authority.eq_ignore_ascii_case("api.github.com")
    {
        return DOT_COM_API.to_string();
    }
    format!("{scheme}://{authority}/api/v3/")
}

#[derive(Serialize)]
struct ManifestEntry<'a> {
    name: &'a str,
    description: &'a str,
    input_spec: &'a Value,
    output_spec: &'a Value,
}

#[derive(Serialize)]
struct Manifest<'a> {
    tools: Vec<ManifestEntry<'a>>,
}

/// State of one protocol loop run.
pub struct Session {
    registry: ToolRegistry,
    meta_tools: Vec<MCPTool>,
    version: String,
    api_base_url: String,
    dynamic: bool,
    tools_changed: bool,
}

impl Session {
    /// Build the registry for `config` and enable its toolsets.
    ///
    /// # Errors
    /// `UnknownToolset` when the selection names a toolset that does not exist.
    pub fn new(config: &ServerConfig, t: &mut Translations) -> Result<Self, LoopError> {
        let mut registry = ToolRegistry::github(t, config.read_only);
        let (meta_tools, selection) = if config.dynamic_toolsets {
            let selection: Vec<String> = config
                .enabled_toolsets
                .iter()
                .filter(|name| *name != ALL_TOOLSETS)
                .cloned()
                .collect();
            (dynamic::tools(t), selection)
        } else {
            (Vec::new(), config.enabled_toolsets.clone())
        };
        registry.enable_toolsets(&selection)?;

        Ok(Self {
            registry,
            meta_tools,
            version: config.version.clone(),
            api_base_url: api_base_url(&config.host),
            dynamic: config.dynamic_toolsets,
            tools_changed: false,
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Tools currently exposed, meta tools first.
    pub fn tools(&self) -> Vec<&MCPTool> {
        self.meta_tools.iter().chain(self.registry.tools()).collect()
    }

    /// `{"tools": [{name, description, input_spec, output_spec}]}` for the
    /// tools currently exposed.
    pub fn manifest_json(&self) -> Result<Bytes, LoopError> {
        let manifest = Manifest {
            tools: self
                .tools()
                .into_iter()
                .map(|tool| ManifestEntry {
                    name: &tool.name,
                    description: &tool.description,
                    input_spec: &tool.input_schema,
                    output_spec: &tool.output_schema,
                })
                .collect(),
        };
        Ok(Bytes::from(serde_json::to_vec(&manifest)?))
    }

    /// Whether the tool list changed since the last call.
    pub fn take_tools_changed(&mut self) -> bool {
        std::mem::take(&mut self.tools_changed)
    }

    pub fn handle(&mut self, req: &MCPRequest) -> MCPResponse {
        let id = req.id.clone();
        match req.method.as_str() {
            "initialize" => MCPResponse::result(
                id,
                serde_json::json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {
                        "tools": { "listChanged": self.dynamic }
                    },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": self.version
                    }
                }),
            ),
            "tools/list" => MCPResponse::result(id, serde_json::json!({ "tools": self.tools() })),
            "tools/call" => self.handle_tools_call(id, req.params.as_ref()),
            other => MCPResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
        }
    }

    fn handle_tools_call(&mut self, id: Option<Value>, params: Option<&Value>) -> MCPResponse {
        let Some(params) = params else {
            return MCPResponse::error(id, INVALID_PARAMS, "Invalid params".to_string());
        };
        let name = params.get("name").and_then(Value::as_str).unwrap_or("");
        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));

        if self.dynamic
            && let Some(outcome) = dynamic::call(&mut self.registry, name, &arguments)
        {
            let result = match outcome {
                Ok(outcome) => {
                    self.tools_changed |= outcome.tools_changed;
                    let text = match outcome.result {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    tool_result(text, false)
                }
                Err(e) => tool_result(e, true),
            };
            return MCPResponse::result(id, result);
        }

        if self.registry.find(name).is_some() {
            // The REST client lives outside this crate.
            let text = format!(
                "tool {name} requires a GitHub API client for {}, which is not available in this server",
                self.api_base_url
            );
            return MCPResponse::result(id, tool_result(text, true));
        }

        MCPResponse::error(id, METHOD_NOT_FOUND, format!("Unknown tool: {name}"))
    }
}

async fn write_line<W>(out: &mut W, line: &str, log_commands: bool) -> Result<(), LoopError>
where
    W: AsyncWrite + Unpin,
{
    if log_commands {
        tracing::info!(target: IO_TARGET, "[stdout]: {line}");
    }
    out.write_all(line.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(())
}

/// Serve line-delimited JSON-RPC from `reader` to `writer` until EOF.
pub async fn serve<R, W>(
    session: &mut Session,
    reader: R,
    writer: W,
    log_commands: bool,
) -> Result<(), LoopError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::with_capacity(8192, reader).lines();
    let mut out = BufWriter::with_capacity(8192, writer);

    while let Some(line) = lines.next_line().await? {
        if log_commands {
            tracing::info!(target: IO_TARGET, "[stdin]: {line}");
        }
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<MCPRequest>(&line) {
            Ok(req) if req.id.is_none() => {
                tracing::debug!(method = %req.method, "notification received");
                None
            }
            Ok(req) => Some(session.handle(&req)),
            Err(e) => {
                tracing::warn!("parse error: {e}");
                serde_json::from_str::<Value>(&line)
                    .ok()
                    .and_then(|partial| partial.get("id").cloned())
                    .map(|id| MCPResponse::error(Some(id), PARSE_ERROR, format!("Parse error: {e}")))
            }
        };

        if let Some(response) = response {
            write_line(&mut out, &serde_json::to_string(&response)?, log_commands).await?;
        }
        if session.take_tools_changed() {
            let notification = serde_json::json!({
                "jsonrpc": "2.0",
                "method": "notifications/tools/list_changed"
            });
            write_line(&mut out, &notification.to_string(), log_commands).await?;
        }
    }

    out.flush().await?;
    Ok(())
}

/// Load translations from the working directory and `env`.
fn load_translations(env: &EnvMap) -> Result<(std::path::PathBuf, Translations), LoopError> {
    let cwd = std::env::current_dir()?;
    let vars = env.iter().map(|(k, v)| (k.clone(), v.clone()));
    let translations = Translations::load(&cwd, vars)?;
    Ok((cwd, translations))
}

/// Render the `/tools` manifest for `config` from the live registry.
pub fn render_manifest(config: &ServerConfig, env: &EnvMap) -> Result<Bytes, LoopError> {
    let (_, mut translations) = load_translations(env)?;
    Session::new(config, &mut translations)?.manifest_json()
}

/// Run the server over the process's stdin/stdout until stdin closes.
pub async fn run_stdio_server(config: ServerConfig, env: Arc<EnvMap>) -> Result<(), LoopError> {
    let (cwd, mut translations) = load_translations(&env)?;
    let mut session = Session::new(&config, &mut translations)?;

    if config.export_translations {
        let path = translations.export(&cwd)?;
        tracing::info!(path = %path.display(), "exported translations");
    }

    tracing::info!(
        version = %config.version,
        api = %session.api_base_url(),
        tools = session.tools().len(),
        read_only = config.read_only,
        dynamic_toolsets = config.dynamic_toolsets,
        "GitHub MCP Server running on stdio"
    );

    serve(
        &mut session,
        tokio::io::stdin(),
        tokio::io::stdout(),
        config.enable_command_logging,
    )
    .await
}

/// Entry point the transports use to run the protocol loop.
///
/// The returned future runs until the input stream closes; dropping it stops
/// the loop. `env` is the environment the bootstrap resolved from.
pub trait ProtocolLoop: Send + Sync {
    fn run(&self, config: ServerConfig, env: Arc<EnvMap>) -> BoxFuture<'static, Result<(), LoopError>>;
}

/// The built-in stdio server.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioServer;

impl ProtocolLoop for StdioServer {
    fn run(&self, config: ServerConfig, env: Arc<EnvMap>) -> BoxFuture<'static, Result<(), LoopError>> {
        run_stdio_server(config, env).boxed()
    }
}
