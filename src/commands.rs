//! Core CLI commands for jumptocode: serve, resolve, health.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::client::{HelperClient, OpenOutcome};
use crate::config::Config;
use crate::diagnostics;
use crate::editor::CodeEditor;
use crate::error::Error;
use crate::resolution::{self, ProbeVariant, Resolution};
use crate::server;
use crate::session::Notice;
use crate::snapshot::PageSnapshot;
use crate::types::ResolutionOutcome;

/// Exit code for a runtime error, shared with `main`.
pub const EXIT_ERROR: u8 = 3;

/// `resolve --json` output: the resolution plus the open result, if asked.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveReport<'a> {
    /// Result of `--open`.
    #[serde(skip_serializing_if = "Option::is_none")]
    open: Option<&'a OpenOutcome>,
    /// The resolution.
    #[serde(flatten)]
    resolution: &'a Resolution,
}

/// Exit code for a resolution outcome: 0 found, 1 no debug source, 2 no handle.
pub fn exit_code_for(outcome: &ResolutionOutcome) -> ExitCode {
    return match outcome {
        ResolutionOutcome::Found { .. } => ExitCode::SUCCESS,
        ResolutionOutcome::NoDebugSourceFound => ExitCode::from(1),
        ResolutionOutcome::NoHandleFound => ExitCode::from(2),
    };
}

/// Query a running helper and print its health report.
///
/// # Errors
///
/// Returns `Error::Http` if the helper is unreachable or answers badly.
pub async fn health(url: &str) -> Result<ExitCode, Error> {
    let client = HelperClient::new(url)?;
    let report = client.health().await?;
    println!("{} ({}) {}", report.message, report.version, client.base_url());
    return Ok(ExitCode::SUCCESS);
}

/// Resolve one element of a captured page, optionally opening the result.
///
/// # Errors
///
/// Returns snapshot load errors, `Error::UnknownElement` for a bad index,
/// or `Error::Json` if the report cannot be serialized.
pub async fn resolve(
    snapshot: &Path,
    element: usize,
    variant: ProbeVariant,
    config: &Config,
    helper_url: Option<&str>,
    json: bool,
) -> Result<ExitCode, Error> {
    let page = PageSnapshot::load(snapshot)?;
    let target = page.element(element)?;
    let resolution = resolution::resolve_detailed(&page, target, variant, &config.source_roots);

    let open = match (helper_url, resolution.outcome.location()) {
        (Some(url), Some(location)) => Some(HelperClient::new(url)?.open(location).await),
        (Some(_), None) | (None, _) => None,
    };

    if json {
        let report = ResolveReport { open: open.as_ref(), resolution: &resolution };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", diagnostics::render_outcome(&resolution));
        if let Some(outcome) = &open {
            print_notice(&Notice::for_open(outcome));
        }
    }

    return Ok(exit_code_for(&resolution.outcome));
}

/// Run the helper server until Ctrl-C.
///
/// # Errors
///
/// Returns `Error::Io` if binding or serving fails.
pub async fn serve(config: &Config) -> Result<ExitCode, Error> {
    info!(bind = %config.bind, port = config.port, editor = %config.editor, "starting helper");
    let editor = Arc::new(CodeEditor::new(config.editor.clone()));
    server::serve(config, editor).await?;
    return Ok(ExitCode::SUCCESS);
}

/// Print a notice the way the page would show it.
fn print_notice(notice: &Notice) {
    match notice {
        Notice::Persistent { file, line, message } => {
            println!();
            println!("{message}");
            println!();
            println!("    {file}:{line}");
        },
        Notice::Transient { text, .. } => {
            println!();
            println!("{text}");
        },
    }
}
