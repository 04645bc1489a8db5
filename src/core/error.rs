/// Error Types
///
/// Startup errors (`MissingCredential`, `ConfigDecode`, `ListenerBind`) are
/// resolved before any transport runs and terminate the process. Errors raised
/// while serving an HTTP request stay local to that response.

use std::time::Duration;

use thiserror::Error;

/// Top-level error surfaced by the bootstrap and the transport dispatcher.
#[derive(Debug, Error)]
pub enum Error {
    /// The credential token was not supplied by any configuration source.
    #[error("GITHUB_PERSONAL_ACCESS_TOKEN not set")]
    MissingCredential,

    /// A configuration value could not be decoded into its declared type.
    #[error("failed to decode `{key}`: {source}")]
    ConfigDecode {
        key: String,
        #[source]
        source: DecodeError,
    },

    /// The configuration layers could not be merged.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(#[source] figment::Error),

    /// The configured log file could not be opened.
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP listener could not bind its address.
    #[error("failed to bind on {addr}: {source}")]
    ListenerBind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP listener failed after binding.
    #[error("http server error: {0}")]
    Serve(#[source] std::io::Error),

    /// The protocol loop returned an error.
    #[error(transparent)]
    ProtocolLoop(#[from] LoopError),

    /// A stdio loop is already running in this process.
    #[error("a stdio server is already active in this process")]
    ConcurrentStdio,

    /// A remotely triggered stdio loop outlived its request deadline.
    #[error("stdio server did not finish within {0:?}")]
    StdioTimeout(Duration),
}

impl Error {
    pub fn decode(key: impl Into<String>, source: DecodeError) -> Self {
        Error::ConfigDecode {
            key: key.into(),
            source,
        }
    }
}

/// Why a raw configuration value failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("list entry {index} is empty in {raw:?}")]
    EmptyListEntry { index: usize, raw: String },

    #[error("{0:?} is not a valid boolean")]
    InvalidBool(String),

    #[error("{0:?} is not a valid port number")]
    InvalidPort(String),

    #[error("expected a {expected} value, found a {found} value")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors raised by the stdio protocol loop.
#[derive(Debug, Error)]
pub enum LoopError {
    #[error("stdio stream error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toolset {0} does not exist")]
    UnknownToolset(String),

    #[error("failed to read translations from {path}: {reason}")]
    TranslationsRead { path: String, reason: String },

    #[error("failed to export translations to {path}: {reason}")]
    TranslationsWrite { path: String, reason: String },

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_the_variable() {
        assert_eq!(
            Error::MissingCredential.to_string(),
            "GITHUB_PERSONAL_ACCESS_TOKEN not set"
        );
    }

    #[test]
    fn decode_error_keeps_key_and_cause() {
        let err = Error::decode(
            "toolsets",
            DecodeError::EmptyListEntry {
                index: 1,
                raw: "a,,b".into(),
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("toolsets"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn bind_error_displays_address() {
        let err = Error::ListenerBind {
            addr: "0.0.0.0:8080".into(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(err.to_string().contains("0.0.0.0:8080"));
    }

    #[test]
    fn loop_error_is_transparent() {
        let err = Error::from(LoopError::UnknownToolset("nope".into()));
        assert_eq!(err.to_string(), "toolset nope does not exist");
    }
}
