/// Transport Dispatch
///
/// The [`Bootstrap`] is built once in `main` and owns everything a transport
/// needs: the configuration snapshot, the protocol loop and the guard that
/// keeps at most one stdio loop active per process. [`dispatch`] validates
/// the configuration and then runs exactly one transport.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::core::config::{EnvMap, Snapshot};
use crate::core::error::Error;
use crate::core::http::{self, HttpOptions};
use crate::core::server::ProtocolLoop;
use crate::core::validate::{ServerConfig, validate};

/// Transport selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http(HttpOptions),
}

/// Single-permit guard around the stdio loop.
///
/// The stdin stream has exactly one reader; a second activation while one is
/// running is rejected instead of queued.
#[derive(Debug, Clone)]
pub struct StdioGuard {
    permits: Arc<Semaphore>,
}

impl StdioGuard {
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    /// Take the permit without waiting. Released when the returned value drops.
    pub fn try_acquire(&self) -> Result<OwnedSemaphorePermit, Error> {
        self.permits
            .clone()
            .try_acquire_owned()
            .map_err(|_| Error::ConcurrentStdio)
    }

    pub fn is_active(&self) -> bool {
        self.permits.available_permits() == 0
    }
}

impl Default for StdioGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Explicitly constructed process bootstrap shared by both transports.
pub struct Bootstrap {
    snapshot: Arc<Snapshot>,
    env: Arc<EnvMap>,
    version: String,
    protocol: Arc<dyn ProtocolLoop>,
    guard: StdioGuard,
}

impl Bootstrap {
    pub fn new(snapshot: Snapshot, version: impl Into<String>, protocol: Arc<dyn ProtocolLoop>) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            env: Arc::new(EnvMap::new()),
            version: version.into(),
            protocol,
            guard: StdioGuard::new(),
        }
    }

    /// Environment handed to the protocol loop and the manifest renderer.
    pub fn with_env(mut self, env: EnvMap) -> Self {
        self.env = Arc::new(env);
        self
    }

    pub fn env(&self) -> &EnvMap {
        &self.env
    }

    /// Derive a fresh validated config from the snapshot.
    pub fn server_config(&self) -> Result<ServerConfig, Error> {
        validate(&self.snapshot, &self.version)
    }

    pub fn stdio_active(&self) -> bool {
        self.guard.is_active()
    }

    /// Validate, take the stdio permit and run the protocol loop to completion.
    ///
    /// Dropping the returned future stops the loop and releases the permit.
    pub async fn activate_stdio(&self) -> Result<(), Error> {
        let config = self.server_config()?;
        let _permit = self.guard.try_acquire()?;
        tracing::info!(
            toolsets = ?config.enabled_toolsets,
            read_only = config.read_only,
            "starting stdio server"
        );
        self.protocol.run(config, self.env.clone()).await?;
        Ok(())
    }
}

/// Resolves on ctrl-c, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("cannot listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

async fn run_stdio(bootstrap: &Bootstrap) -> Result<(), Error> {
    tokio::select! {
        result = bootstrap.activate_stdio() => result,
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
            Ok(())
        }
    }
}

/// Validate the configuration, then run the selected transport.
///
/// Nothing is opened when validation fails.
pub async fn dispatch(bootstrap: &Arc<Bootstrap>, transport: Transport) -> Result<(), Error> {
    let config = bootstrap.server_config()?;
    tracing::debug!(?config, "configuration validated");

    match transport {
        Transport::Stdio => run_stdio(bootstrap).await,
        Transport::Http(options) => http::run_server_http(bootstrap.clone(), &config, options).await,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use futures_util::FutureExt;
    use futures_util::future::BoxFuture;
    use tokio::sync::Notify;

    use crate::core::config::{EnvMap, Snapshot, github_resolver};
    use crate::core::error::LoopError;
    use crate::core::server::ProtocolLoop;
    use crate::core::validate::ServerConfig;

    /// Protocol loop that records its configs and optionally blocks or fails.
    #[derive(Default)]
    pub(crate) struct RecordingLoop {
        pub seen: Mutex<Vec<ServerConfig>>,
        pub seen_env: Mutex<Vec<Arc<EnvMap>>>,
        pub started: Arc<Notify>,
        pub release: Option<Arc<Notify>>,
        pub fail_with: Option<String>,
    }

    impl RecordingLoop {
        pub fn blocking() -> (Arc<Self>, Arc<Notify>) {
            let release = Arc::new(Notify::new());
            let this = Arc::new(Self {
                release: Some(release.clone()),
                ..Self::default()
            });
            (this, release)
        }

        pub fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                fail_with: Some(message.to_string()),
                ..Self::default()
            })
        }

        pub fn runs(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl ProtocolLoop for RecordingLoop {
        fn run(&self, config: ServerConfig, env: Arc<EnvMap>) -> BoxFuture<'static, Result<(), LoopError>> {
            self.seen.lock().unwrap().push(config);
            self.seen_env.lock().unwrap().push(env);
            let started = self.started.clone();
            let release = self.release.clone();
            let fail_with = self.fail_with.clone();
            async move {
                started.notify_one();
                if let Some(release) = release {
                    release.notified().await;
                }
                match fail_with {
                    Some(message) => Err(LoopError::Io(std::io::Error::other(message))),
                    None => Ok(()),
                }
            }
            .boxed()
        }
    }

    pub(crate) fn snapshot(pairs: &[(&str, &str)]) -> Snapshot {
        let env = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string()));
        github_resolver(env).snapshot().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{RecordingLoop, snapshot};
    use super::*;

    const TOKEN: (&str, &str) = ("GITHUB_PERSONAL_ACCESS_TOKEN", "tok123");

    #[test]
    fn guard_hands_out_one_permit() {
        let guard = StdioGuard::new();
        let permit = guard.try_acquire().unwrap();
        assert!(guard.is_active());
        assert!(matches!(guard.try_acquire(), Err(Error::ConcurrentStdio)));
        drop(permit);
        assert!(!guard.is_active());
        assert!(guard.try_acquire().is_ok());
    }

    #[tokio::test]
    async fn stdio_dispatch_passes_default_config() {
        let protocol = Arc::new(RecordingLoop::default());
        let bootstrap = Arc::new(Bootstrap::new(snapshot(&[TOKEN]), "1.0.0", protocol.clone()));

        dispatch(&bootstrap, Transport::Stdio).await.unwrap();

        let seen = protocol.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].token, "tok123");
        assert_eq!(seen[0].enabled_toolsets, vec!["all"]);
        assert!(!seen[0].read_only);
        assert!(!seen[0].dynamic_toolsets);
    }

    #[tokio::test]
    async fn activation_hands_bootstrap_env_to_the_loop() {
        let protocol = Arc::new(RecordingLoop::default());
        let env: EnvMap = [("GITHUB_MCP_TOOL_GET_ME_DESCRIPTION".to_string(), "x".to_string())]
            .into_iter()
            .collect();
        let bootstrap = Bootstrap::new(snapshot(&[TOKEN]), "1.0.0", protocol.clone()).with_env(env.clone());

        bootstrap.activate_stdio().await.unwrap();

        let seen = protocol.seen_env.lock().unwrap();
        assert_eq!(*seen[0], env);
    }

    #[tokio::test]
    async fn missing_token_never_starts_the_loop() {
        let protocol = Arc::new(RecordingLoop::default());
        let bootstrap = Arc::new(Bootstrap::new(snapshot(&[]), "1.0.0", protocol.clone()));

        let err = dispatch(&bootstrap, Transport::Stdio).await.unwrap_err();
        assert!(matches!(err, Error::MissingCredential));
        assert_eq!(protocol.runs(), 0);
    }

    #[tokio::test]
    async fn loop_error_is_surfaced() {
        let protocol = RecordingLoop::failing("stdin closed unexpectedly");
        let bootstrap = Arc::new(Bootstrap::new(snapshot(&[TOKEN]), "1.0.0", protocol));

        let err = dispatch(&bootstrap, Transport::Stdio).await.unwrap_err();
        assert!(matches!(err, Error::ProtocolLoop(_)));
        assert!(err.to_string().contains("stdin closed unexpectedly"));
        assert!(!bootstrap.stdio_active());
    }

    #[tokio::test]
    async fn overlapping_activation_is_rejected() {
        let (protocol, release) = RecordingLoop::blocking();
        let bootstrap = Bootstrap::new(snapshot(&[TOKEN]), "1.0.0", protocol.clone());

        let first = bootstrap.activate_stdio();
        let second = async {
            protocol.started.notified().await;
            let result = bootstrap.activate_stdio().await;
            release.notify_one();
            result
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_ok());
        assert!(matches!(second, Err(Error::ConcurrentStdio)));
        assert_eq!(protocol.runs(), 1);
        assert!(!bootstrap.stdio_active());
    }

    #[tokio::test]
    async fn dropped_activation_releases_permit() {
        let (protocol, _release) = RecordingLoop::blocking();
        let bootstrap = Bootstrap::new(snapshot(&[TOKEN]), "1.0.0", protocol);

        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            bootstrap.activate_stdio(),
        )
        .await;
        assert!(timed_out.is_err());
        assert!(!bootstrap.stdio_active());
    }
}
