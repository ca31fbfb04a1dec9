//! Calling-layer side of the editor-open protocol.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Error;
use crate::server::HealthReport;
use crate::types::SourceLocation;

/// Requests give up after this long; the helper is local.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of asking the helper to open a location. Exactly one per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum OpenOutcome {
    /// The helper is up but the editor is missing; the path must stay visible.
    EditorUnavailable {
        /// Path as the helper resolved it.
        file: String,
        /// One-based line.
        line: u32,
        /// Helper's explanation.
        message: String,
    },
    /// Transport failure, launch failure or any other unexpected answer.
    Failed {
        /// What went wrong.
        message: String,
    },
    /// The helper could not find the file.
    FileNotFound {
        /// Path as requested.
        file: String,
    },
    /// The editor opened the file.
    Opened {
        /// Path as the helper resolved it.
        file: String,
        /// One-based line.
        line: u32,
    },
}

/// Any `/open` response body; fields depend on the status.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct OpenResponse {
    /// Multi-line explanation for the user.
    alert_message: Option<String>,
    /// Short error text.
    error: Option<String>,
    /// Resolved or requested path.
    file: Option<String>,
    /// Line echoed back.
    line: Option<u32>,
}

/// `POST /open` body.
#[derive(Debug, Serialize)]
struct OpenPayload<'a> {
    /// Canonical path.
    file: &'a str,
    /// One-based line.
    line: u32,
}

/// HTTP client for a running helper server.
#[derive(Debug, Clone)]
pub struct HelperClient {
    /// Base URL without a trailing slash, e.g. `http://localhost:5123`.
    base_url: String,
    /// Shared connection pool.
    http: reqwest::Client,
}

impl HelperClient {
    /// The base URL requests go to.
    pub fn base_url(&self) -> &str {
        return &self.base_url;
    }

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Http` if the helper is unreachable, answers with an
    /// error status, or sends a body that is not a health report.
    pub async fn health(&self) -> Result<HealthReport, Error> {
        let report = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json::<HealthReport>()
            .await?;
        debug!(version = %report.version, "helper is healthy");
        return Ok(report);
    }

    /// Client for the helper at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Http` if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        return Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), http });
    }

    /// `POST /open` for `location`. Never errors: every failure is an outcome.
    pub async fn open(&self, location: &SourceLocation) -> OpenOutcome {
        let payload = OpenPayload { file: location.file(), line: location.line() };
        let response = match self.http.post(format!("{}/open", self.base_url)).json(&payload).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(url = %self.base_url, error = %e, "helper server unreachable");
                return OpenOutcome::Failed { message: format!("helper server not running at {}", self.base_url) };
            },
        };

        let status = response.status();
        let body: OpenResponse = response.json().await.unwrap_or_default();
        debug!(%status, "helper answered");
        return classify(status, body, location);
    }
}

/// Map a helper answer to exactly one outcome.
fn classify(status: StatusCode, body: OpenResponse, location: &SourceLocation) -> OpenOutcome {
    let file = body.file.unwrap_or_else(|| return location.file().to_string());
    return match status {
        StatusCode::OK => OpenOutcome::Opened { file, line: body.line.unwrap_or(location.line()) },
        StatusCode::NOT_FOUND => OpenOutcome::FileNotFound { file },
        StatusCode::SERVICE_UNAVAILABLE => OpenOutcome::EditorUnavailable {
            file,
            line: body.line.unwrap_or(location.line()),
            message: body.alert_message.or(body.error).unwrap_or_else(|| return "editor not available".to_string()),
        },
        other => OpenOutcome::Failed {
            message: body.error.unwrap_or_else(|| return format!("helper answered {other}")),
        },
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    fn location() -> SourceLocation {
        return SourceLocation::new("/repo/src/App.tsx", 42).unwrap();
    }

    #[test]
    fn each_status_maps_to_one_outcome() {
        let opened = classify(StatusCode::OK, OpenResponse::default(), &location());
        assert_eq!(opened, OpenOutcome::Opened { file: "/repo/src/App.tsx".to_string(), line: 42 });

        let missing = classify(StatusCode::NOT_FOUND, OpenResponse::default(), &location());
        assert!(matches!(missing, OpenOutcome::FileNotFound { .. }));

        let unavailable = classify(
            StatusCode::SERVICE_UNAVAILABLE,
            OpenResponse { error: Some("no editor".to_string()), ..OpenResponse::default() },
            &location(),
        );
        assert_eq!(unavailable, OpenOutcome::EditorUnavailable {
            file: "/repo/src/App.tsx".to_string(),
            line: 42,
            message: "no editor".to_string(),
        });

        let failed = classify(StatusCode::BAD_REQUEST, OpenResponse::default(), &location());
        assert!(matches!(failed, OpenOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn unreachable_helper_is_a_failed_outcome() {
        // Port 9 (discard) is not expected to run an HTTP server.
        let client = HelperClient::new("http://127.0.0.1:9/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9");
        let outcome = client.open(&location()).await;
        assert_eq!(outcome, OpenOutcome::Failed {
            message: "helper server not running at http://127.0.0.1:9".to_string(),
        });
    }
}
