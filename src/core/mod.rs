/// Core Server Framework Module
///
/// - config.rs: key normalization and the layered configuration resolver
/// - validate.rs: startup validation into a `ServerConfig`
/// - cli.rs: command-line surface and transport selection
/// - dispatch.rs: bootstrap object and transport dispatcher
/// - http.rs: HTTP listener and routes
/// - server.rs: the stdio MCP protocol loop
/// - translations.rs: overridable tool descriptions
/// - logging.rs: tracing subscriber setup
/// - error.rs: error types

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod logging;
pub mod server;
pub mod translations;
pub mod validate;
