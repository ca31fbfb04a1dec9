//! Local helper server: receives `{file, line}` from the page and opens the
//! file in an editor.

use std::future::Future;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::editor::{Editor, PathResolver};
use crate::error::Error;

/// Origins allowed to call the helper: a dev server on localhost, any port.
#[allow(clippy::expect_used, reason = "literal pattern, checked by tests")]
static LOCALHOST_ORIGIN: Lazy<Regex> =
    Lazy::new(|| return Regex::new(r"^http://localhost:\d+$").expect("valid localhost origin regex"));

/// Shared state handed to every request.
pub struct AppState {
    /// Editor used for `/open`.
    pub editor: Arc<dyn Editor>,
    /// Turns requested paths into files on disk.
    pub resolver: PathResolver,
}

/// Failure body for every non-200 `/open` response.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureBody {
    /// Multi-line text for the page to show, when there is more than `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    alert_message: Option<String>,
    /// The page should surface this to the user.
    alert_user: bool,
    /// Underlying failure, for launch errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    /// Set on 503 so the page keeps the path visible.
    #[serde(skip_serializing_if = "Option::is_none")]
    editor_unavailable: Option<bool>,
    /// Short description.
    error: String,
    /// The path involved, resolved if resolution got that far.
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    /// The line involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
}

/// `GET /health` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReport {
    /// Human-readable greeting.
    pub message: String,
    /// Always `ok` while the server answers.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// `POST /open` success body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OpenedBody {
    /// Editor name.
    editor: String,
    /// Resolved absolute path.
    file: String,
    /// Line the cursor was placed on.
    line: u32,
    /// Confirmation text.
    message: String,
    /// Always true.
    success: bool,
}

/// `POST /open` request.
#[derive(Debug, Deserialize)]
pub struct OpenRequest {
    /// Requested path, possibly bundler-prefixed or relative.
    pub file: Option<String>,
    /// One-based line; missing or below 1 means line 1.
    pub line: Option<i64>,
}

/// Router with both endpoints, CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            return origin.to_str().is_ok_and(is_allowed_origin);
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    return Router::new()
        .route("/health", get(health))
        .route("/open", post(open))
        .with_state(Arc::new(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());
}

/// `GET /health`.
async fn health() -> Json<HealthReport> {
    return Json(HealthReport {
        message: "JumpToCode helper server is running".to_string(),
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    });
}

/// Whether a browser origin may call the helper.
pub fn is_allowed_origin(origin: &str) -> bool {
    return LOCALHOST_ORIGIN.is_match(origin);
}

/// `POST /open`: resolve the path, check the editor, launch it.
async fn open(State(state): State<Arc<AppState>>, body: Result<Json<OpenRequest>, JsonRejection>) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "rejected open request body");
            return failure(StatusCode::BAD_REQUEST, FailureBody {
                alert_user: true,
                details: Some(rejection.body_text()),
                error: "Missing file path".to_string(),
                ..FailureBody::default()
            });
        },
    };

    let Some(file) = request.file.filter(|f| return !f.trim().is_empty()) else {
        error!("missing file path in open request");
        return failure(StatusCode::BAD_REQUEST, FailureBody {
            alert_user: true,
            error: "Missing file path".to_string(),
            ..FailureBody::default()
        });
    };
    let line = request.line.and_then(|l| return u32::try_from(l).ok()).filter(|l| return *l >= 1).unwrap_or(1);
    info!(%file, line, "open requested");

    let Some(path) = state.resolver.resolve(&file) else {
        warn!(%file, "file not found");
        return failure(StatusCode::NOT_FOUND, FailureBody {
            alert_message: Some(format!("File not found: {file}")),
            alert_user: true,
            error: "File not found".to_string(),
            file: Some(file),
            ..FailureBody::default()
        });
    };
    let resolved = path.display().to_string();

    let editor = state.editor.as_ref();
    if !editor.is_available().await {
        warn!(editor = editor.command(), "editor command not found in PATH");
        return failure(StatusCode::SERVICE_UNAVAILABLE, FailureBody {
            alert_message: Some(format!(
                "{name} not found!\n\nFile: {resolved}\nLine: {line}\n\nInstall {name} or add '{command}' to your PATH.",
                name = editor.display_name(),
                command = editor.command(),
            )),
            alert_user: true,
            editor_unavailable: Some(true),
            error: format!("{} not installed or '{}' command not in PATH", editor.display_name(), editor.command()),
            file: Some(resolved),
            line: Some(line),
            ..FailureBody::default()
        });
    }

    if let Err(e) = editor.open(&path, line).await {
        error!(error = %e, "failed to open file");
        return failure(StatusCode::INTERNAL_SERVER_ERROR, FailureBody {
            alert_message: Some(format!(
                "Failed to open in {}\n\nFile: {resolved}\nLine: {line}\n\nError: {e}",
                editor.display_name()
            )),
            alert_user: true,
            details: Some(e.to_string()),
            error: format!("Failed to open file in {}", editor.display_name()),
            file: Some(resolved),
            line: Some(line),
            ..FailureBody::default()
        });
    }

    info!(file = %resolved, line, "file opened");
    return Json(OpenedBody {
        editor: editor.display_name().to_string(),
        file: resolved,
        line,
        message: "File opened successfully".to_string(),
        success: true,
    })
    .into_response();
}

/// JSON failure response.
fn failure(status: StatusCode, body: FailureBody) -> Response {
    return (status, Json(body)).into_response();
}

/// Bind to the configured address and serve until Ctrl-C.
///
/// # Errors
///
/// Returns `Error::Io` if the working directory cannot be read, the address
/// cannot be bound, or the server fails.
pub async fn serve(config: &Config, editor: Arc<dyn Editor>) -> Result<(), Error> {
    let root = std::env::current_dir()?;
    info!(cwd = %root.display(), "working directory");
    if editor.is_available().await {
        info!(editor = editor.display_name(), "editor detected and ready");
    } else {
        warn!(
            command = editor.command(),
            "editor command not found in PATH; the page will show the file location instead"
        );
    }

    let state = AppState {
        editor,
        resolver: PathResolver::new(root, config.search_dirs.clone(), config.search_depth),
    };
    let listener = TcpListener::bind((config.bind, config.port)).await?;
    info!(addr = %listener.local_addr()?, version = env!("CARGO_PKG_VERSION"), "helper server listening");

    return serve_on(listener, build_router(state), shutdown_signal()).await;
}

/// Serve `router` on an already-bound listener until `shutdown` resolves.
///
/// # Errors
///
/// Returns `Error::Io` if the server fails.
pub async fn serve_on<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router).with_graceful_shutdown(shutdown).await?;
    info!("helper server stopped");
    return Ok(());
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutting down helper server");
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn only_localhost_origins_are_allowed() {
        assert!(is_allowed_origin("http://localhost:3000"));
        assert!(is_allowed_origin("http://localhost:5173"));
        assert!(!is_allowed_origin("http://localhost"));
        assert!(!is_allowed_origin("https://localhost:3000"));
        assert!(!is_allowed_origin("http://evil.example:3000"));
        assert!(!is_allowed_origin("http://localhost:3000.evil.example"));
    }
}
