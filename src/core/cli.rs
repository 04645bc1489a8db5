/// Command Line
///
/// Root command with one subcommand per transport. Server flags are global,
/// so they may appear before or after the subcommand. Only flags the user
/// actually typed are handed to the resolver; absent flags never shadow the
/// environment.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::core::config::{EnvMap, Resolver, Value};
use crate::core::dispatch::Transport;
use crate::core::error::{DecodeError, Error};
use crate::core::http::{DEFAULT_BIND, DEFAULT_PORT, DEFAULT_RUN_STDIO_TIMEOUT, HttpOptions};

/// GitHub MCP Server
#[derive(Debug, Parser)]
#[command(
    name = "github-mcp-server",
    version,
    about = "GitHub MCP Server",
    long_about = "A GitHub MCP server that handles various tools and resources.",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// An optional comma separated list of groups of tools to allow, defaults to enabling all
    #[arg(long, global = true, value_delimiter = ',')]
    pub toolsets: Option<Vec<String>>,

    /// Enable dynamic toolsets
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub dynamic_toolsets: Option<bool>,

    /// Restrict the server to read-only operations
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub read_only: Option<bool>,

    /// Path to log file
    #[arg(long, global = true)]
    pub log_file: Option<String>,

    /// When enabled, the server will log all command requests and responses to the log file
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub enable_command_logging: Option<bool>,

    /// Save translations to a JSON file
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub export_translations: Option<bool>,

    /// Specify the GitHub hostname (for GitHub Enterprise etc.)
    #[arg(long, global = true)]
    pub gh_host: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a server that communicates via standard input/output streams using JSON-RPC messages.
    Stdio,
    /// Start an HTTP server with liveness, tool manifest and remote stdio trigger routes.
    Http(HttpArgs),
}

#[derive(Debug, Args)]
pub struct HttpArgs {
    /// TCP port to listen on [default: $PORT, then 8080]
    #[arg(long)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Seconds a /run-stdio request may keep the stdio server running
    #[arg(long, default_value_t = DEFAULT_RUN_STDIO_TIMEOUT.as_secs())]
    pub run_stdio_timeout: u64,
}

impl Cli {
    /// Record every explicitly given server flag on `resolver`.
    pub fn apply_flags(&self, resolver: &mut Resolver) {
        // a bare `--toolsets=` parses as [""] and means "no selection"
        if let Some(toolsets) = &self.toolsets
            && !matches!(toolsets.as_slice(), [only] if only.is_empty())
        {
            resolver.set_flag("toolsets", Value::List(toolsets.clone()));
        }
        let bools = [
            ("dynamic-toolsets", self.dynamic_toolsets),
            ("read-only", self.read_only),
            ("enable-command-logging", self.enable_command_logging),
            ("export-translations", self.export_translations),
        ];
        for (flag, value) in bools {
            if let Some(value) = value {
                resolver.set_flag(flag, Value::Bool(value));
            }
        }
        if let Some(path) = &self.log_file {
            resolver.set_flag("log-file", Value::Str(path.clone()));
        }
        if let Some(host) = &self.gh_host {
            resolver.set_flag("gh-host", Value::Str(host.clone()));
        }
    }

    pub fn transport(&self, env: &EnvMap) -> Result<Transport, Error> {
        match &self.command {
            Command::Stdio => Ok(Transport::Stdio),
            Command::Http(args) => args.options(env).map(Transport::Http),
        }
    }
}

impl HttpArgs {
    /// Port: `--port`, then `PORT`, then 8080. Workers: `WORKER_THREADS`,
    /// then the CPU count capped at 16.
    pub fn options(&self, env: &EnvMap) -> Result<HttpOptions, Error> {
        let port = match (self.port, env.get("PORT").filter(|p| !p.is_empty())) {
            (Some(port), _) => port,
            (None, Some(raw)) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::decode("PORT", DecodeError::InvalidPort(raw.clone())))?,
            (None, None) => DEFAULT_PORT,
        };

        let workers = env
            .get("WORKER_THREADS")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or_else(|| num_cpus::get().clamp(1, 16));

        Ok(HttpOptions {
            bind: self.bind.clone(),
            port,
            workers,
            run_timeout: Duration::from_secs(self.run_stdio_timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::github_resolver;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("github-mcp-server").chain(args.iter().copied())).unwrap()
    }

    fn env(pairs: &[(&str, &str)]) -> EnvMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["github-mcp-server"]).is_err());
        assert!(Cli::try_parse_from(["github-mcp-server", "--read-only"]).is_err());
    }

    #[test]
    fn global_flags_before_or_after_subcommand() {
        let before = parse(&["--read-only", "stdio"]);
        assert_eq!(before.read_only, Some(true));
        assert!(matches!(before.command, Command::Stdio));

        let after = parse(&["stdio", "--read-only=false", "--gh-host", "ghe.example.com"]);
        assert_eq!(after.read_only, Some(false));
        assert_eq!(after.gh_host.as_deref(), Some("ghe.example.com"));
    }

    #[test]
    fn toolsets_accept_commas_and_repeats() {
        let cli = parse(&["stdio", "--toolsets", "repos,issues", "--toolsets", "users"]);
        assert_eq!(
            cli.toolsets,
            Some(vec!["repos".into(), "issues".into(), "users".into()])
        );
    }

    #[test]
    fn absent_flags_leave_env_in_charge() {
        let cli = parse(&["stdio"]);
        let mut resolver = github_resolver(vec![
            ("GITHUB_READ_ONLY".to_string(), "true".to_string()),
            ("GITHUB_TOOLSETS".to_string(), "a,b,c".to_string()),
        ]);
        cli.apply_flags(&mut resolver);
        assert!(resolver.get_bool("read-only").unwrap());
        assert_eq!(resolver.get_string_list("toolsets").unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn typed_flags_override_env() {
        let cli = parse(&["stdio", "--toolsets", "repos", "--dynamic-toolsets", "--gh-host", "flag.host"]);
        let mut resolver = github_resolver(vec![
            ("GITHUB_TOOLSETS".to_string(), "issues".to_string()),
            ("GITHUB_HOST".to_string(), "env.host".to_string()),
        ]);
        cli.apply_flags(&mut resolver);
        assert_eq!(resolver.get_string_list("toolsets").unwrap(), vec!["repos"]);
        assert!(resolver.get_bool("dynamic_toolsets").unwrap());
        assert_eq!(resolver.get_string("host").unwrap(), "flag.host");
    }

    #[test]
    fn empty_toolsets_flag_falls_back() {
        let cli = parse(&["stdio", "--toolsets="]);
        assert_eq!(cli.toolsets, Some(vec![String::new()]));

        let mut resolver = github_resolver(Vec::new());
        cli.apply_flags(&mut resolver);
        assert_eq!(resolver.get_string_list("toolsets").unwrap(), vec!["all"]);

        let mut resolver = github_resolver(vec![("GITHUB_TOOLSETS".to_string(), "issues".to_string())]);
        cli.apply_flags(&mut resolver);
        assert_eq!(resolver.get_string_list("toolsets").unwrap(), vec!["issues"]);
    }

    #[test]
    fn partially_empty_toolsets_flag_is_rejected() {
        let cli = parse(&["stdio", "--toolsets", "repos,"]);
        let mut resolver = github_resolver(Vec::new());
        cli.apply_flags(&mut resolver);
        assert!(matches!(
            resolver.get_string_list("toolsets"),
            Err(Error::ConfigDecode { .. })
        ));
    }

    #[test]
    fn http_port_precedence() {
        let cli = parse(&["http"]);
        let Transport::Http(options) = cli.transport(&env(&[])).unwrap() else {
            panic!("expected http transport");
        };
        assert_eq!(options.port, 8080);
        assert_eq!(options.bind, "0.0.0.0");
        assert_eq!(options.run_timeout, Duration::from_secs(300));

        let Transport::Http(options) = cli.transport(&env(&[("PORT", "9090")])).unwrap() else {
            panic!("expected http transport");
        };
        assert_eq!(options.port, 9090);

        let cli = parse(&["http", "--port", "7070"]);
        let Transport::Http(options) = cli.transport(&env(&[("PORT", "9090")])).unwrap() else {
            panic!("expected http transport");
        };
        assert_eq!(options.port, 7070);
    }

    #[test]
    fn invalid_port_env_is_a_decode_error() {
        let cli = parse(&["http"]);
        assert!(matches!(
            cli.transport(&env(&[("PORT", "eighty")])),
            Err(Error::ConfigDecode { .. })
        ));
    }

    #[test]
    fn worker_threads_env_is_honored() {
        let cli = parse(&["http"]);
        let Transport::Http(options) = cli.transport(&env(&[("WORKER_THREADS", "3")])).unwrap() else {
            panic!("expected http transport");
        };
        assert_eq!(options.workers, 3);
    }

    #[test]
    fn stdio_subcommand_selects_stdio() {
        assert_eq!(parse(&["stdio"]).transport(&env(&[])).unwrap(), Transport::Stdio);
    }
}
