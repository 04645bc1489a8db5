/// HTTP Transport
///
/// Actix Web listener with three routes:
/// - `GET /`: liveness text
/// - `GET /tools`: JSON manifest of the exposed tools, rendered once at startup
/// - `ANY /run-stdio`: runs the stdio server inside the request
///
/// Per-request failures become error responses; only bind and serve errors
/// end the process.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    App, HttpResponse, HttpServer,
    http::StatusCode,
    middleware::{Compress, DefaultHeaders, Logger},
    web,
};
use bytes::Bytes;

use crate::core::dispatch::Bootstrap;
use crate::core::error::Error;
use crate::core::server::render_manifest;
use crate::core::validate::ServerConfig;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_RUN_STDIO_TIMEOUT: Duration = Duration::from_secs(300);

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Listener settings for HTTP mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    pub bind: String,
    pub port: u16,
    pub workers: usize,
    /// Upper bound on how long one `/run-stdio` request may run the loop.
    pub run_timeout: Duration,
}

impl HttpOptions {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Application state shared across all worker threads in HTTP mode.
pub struct AppState {
    /// Process bootstrap; owns the stdio guard `/run-stdio` acquires
    bootstrap: Arc<Bootstrap>,
    /// `/tools` body, rendered once at startup
    manifest: Bytes,
    /// Deadline for a single `/run-stdio` activation
    run_timeout: Duration,
}

impl AppState {
    pub fn new(bootstrap: Arc<Bootstrap>, manifest: Bytes, run_timeout: Duration) -> Self {
        Self {
            bootstrap,
            manifest,
            run_timeout,
        }
    }
}

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(TEXT_PLAIN)
        .body("GitHub MCP Server is running\n")
}

/// Same bytes on every call; no side effects.
async fn tools(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(state.manifest.clone())
}

/// Run the stdio server for the lifetime of this request.
///
/// 409 when another stdio server is active, 500 on validation, loop or
/// timeout failure.
async fn run_stdio(state: web::Data<AppState>) -> HttpResponse {
    tracing::debug!(already_active = state.bootstrap.stdio_active(), "run-stdio requested");
    let outcome = match tokio::time::timeout(state.run_timeout, state.bootstrap.activate_stdio()).await
    {
        Ok(result) => result,
        Err(_) => Err(Error::StdioTimeout(state.run_timeout)),
    };

    match outcome {
        Ok(()) => HttpResponse::Ok()
            .content_type(TEXT_PLAIN)
            .body("Stdio server completed\n"),
        Err(e) => {
            let status = match e {
                Error::ConcurrentStdio => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::warn!(%status, "run-stdio failed: {e}");
            HttpResponse::build(status)
                .content_type(TEXT_PLAIN)
                .body(format!("Failed to run stdio server: {e}\n"))
        }
    }
}

/// Register all routes; state is provided by the caller via `app_data`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/tools", web::get().to(tools))
        .route("/run-stdio", web::route().to(run_stdio));
}

/// Run the HTTP listener until it fails or the server is shut down.
///
/// Configured with:
/// - Worker threads from `options.workers`
/// - Keep-alive: 30 seconds
/// - Request header timeout: 30 seconds
/// - Shutdown timeout: 10 seconds
pub async fn run_server_http(
    bootstrap: Arc<Bootstrap>,
    config: &ServerConfig,
    options: HttpOptions,
) -> Result<(), Error> {
    let addr = options.addr();
    let manifest = render_manifest(config, bootstrap.env())?;

    let state = web::Data::new(AppState::new(bootstrap, manifest, options.run_timeout));

    tracing::info!(
        addr = %addr,
        workers = options.workers,
        run_stdio_timeout = ?options.run_timeout,
        "GitHub MCP Server starting (HTTP mode)"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY")),
            )
            // %r = request line, %s = status, %D = duration in ms
            .wrap(Logger::new("%r %s %Dms"))
            .configure(routes)
    })
    .workers(options.workers)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&addr)
    .map_err(|source| Error::ListenerBind {
        addr: addr.clone(),
        source,
    })?
    .run()
    .await
    .map_err(Error::Serve)
}
