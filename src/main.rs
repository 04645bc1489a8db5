/// GitHub MCP Server Entry Point
///
/// Resolves configuration from command-line flags, `GITHUB_*` environment
/// variables and built-in defaults, then runs the transport named by the
/// subcommand:
/// - `stdio`: JSON-RPC over stdin/stdout until stdin closes
/// - `http`: HTTP listener with `/`, `/tools` and `/run-stdio`
///
/// Environment Variables:
/// - GITHUB_PERSONAL_ACCESS_TOKEN: credential (required)
/// - GITHUB_TOOLSETS, GITHUB_READ_ONLY, GITHUB_HOST, ...: one per flag
/// - PORT: HTTP port (default: 8080)
/// - WORKER_THREADS: HTTP worker count (default: CPU count, max 16)
/// - RUST_LOG: log filter (default: info)

mod core;
mod tools;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use crate::core::cli::Cli;
use crate::core::config::{self, EnvMap, keys};
use crate::core::dispatch::{self, Bootstrap};
use crate::core::error::Error;
use crate::core::logging;
use crate::core::server::StdioServer;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let env: EnvMap = config::process_env().into_iter().collect();

    let mut resolver = config::github_resolver(env.clone());
    cli.apply_flags(&mut resolver);
    let snapshot = resolver.snapshot()?;
    let transport = cli.transport(&env)?;

    let log_file = snapshot.get_string(keys::LOG_FILE);
    let _log_guard = logging::init((!log_file.is_empty()).then(|| Path::new(log_file)))
        .map_err(|source| Error::LogFile {
            path: log_file.to_string(),
            source,
        })?;

    let bootstrap = Arc::new(
        Bootstrap::new(snapshot, env!("CARGO_PKG_VERSION"), Arc::new(StdioServer)).with_env(env),
    );
    dispatch::dispatch(&bootstrap, transport).await
}
