/// Startup Validation
///
/// Projects a [`Snapshot`] onto the strongly-typed [`ServerConfig`] the
/// protocol loop consumes. Runs before any transport is started.

use std::fmt;
use std::path::PathBuf;

use crate::core::config::{DEFAULT_TOOLSETS, Snapshot, keys};
use crate::core::error::Error;

/// Everything the stdio protocol loop needs to run.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub version: String,
    /// GitHub hostname override; empty means github.com.
    pub host: String,
    pub token: String,
    pub enabled_toolsets: Vec<String>,
    pub dynamic_toolsets: bool,
    pub read_only: bool,
    pub export_translations: bool,
    pub enable_command_logging: bool,
    pub log_file_path: Option<PathBuf>,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("version", &self.version)
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .field("enabled_toolsets", &self.enabled_toolsets)
            .field("dynamic_toolsets", &self.dynamic_toolsets)
            .field("read_only", &self.read_only)
            .field("export_translations", &self.export_translations)
            .field("enable_command_logging", &self.enable_command_logging)
            .field("log_file_path", &self.log_file_path)
            .finish()
    }
}

/// Check mandatory fields and build a [`ServerConfig`].
///
/// # Errors
/// `MissingCredential` when no token was configured anywhere.
pub fn validate(snapshot: &Snapshot, version: &str) -> Result<ServerConfig, Error> {
    let token = snapshot.get_string(keys::PERSONAL_ACCESS_TOKEN).trim();
    // never the value itself
    tracing::debug!(token_present = !token.is_empty(), "checked credential");
    if token.is_empty() {
        return Err(Error::MissingCredential);
    }

    let mut enabled_toolsets = snapshot.get_string_list(keys::TOOLSETS).to_vec();
    if enabled_toolsets.is_empty() {
        enabled_toolsets = DEFAULT_TOOLSETS.iter().map(|s| s.to_string()).collect();
    }

    let log_file = snapshot.get_string(keys::LOG_FILE);

    Ok(ServerConfig {
        version: version.to_string(),
        host: snapshot.get_string(keys::HOST).to_string(),
        token: token.to_string(),
        enabled_toolsets,
        dynamic_toolsets: snapshot.get_bool(keys::DYNAMIC_TOOLSETS),
        read_only: snapshot.get_bool(keys::READ_ONLY),
        export_translations: snapshot.get_bool(keys::EXPORT_TRANSLATIONS),
        enable_command_logging: snapshot.get_bool(keys::ENABLE_COMMAND_LOGGING),
        log_file_path: (!log_file.is_empty()).then(|| PathBuf::from(log_file)),
    })
}
