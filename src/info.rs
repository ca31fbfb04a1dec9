use std::path::Path;

use serde::Serialize;

use crate::config::{CONFIG_FILE, Config};
use crate::extractor::{COMPONENT_NAME_DEPTH, DEBUG_SOURCE_DEPTH};
use crate::locator::{ANCESTOR_BUDGET, HANDLE_STRATEGIES};
use crate::registry::REGISTRY_SEARCH_BUDGET;

/// Output the jumptocode reference document.
pub fn run(root: &Path, json: bool) {
    let state = gather_state(root);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

/// What the current directory's setup looks like.
struct CurrentState {
    /// Effective config, or the load error text.
    config: Result<Config, String>,
    /// Whether `.jumptocode.toml` exists.
    config_found: bool,
}

/// Inspect `root` for a config file.
fn gather_state(root: &Path) -> CurrentState {
    return CurrentState {
        config: Config::load(root).map_err(|e| return e.to_string()),
        config_found: root.join(CONFIG_FILE).exists(),
    };
}

// ── Markdown output ───────────────────────────────────────────────────

/// Full markdown document.
fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print!(
        "\
# jumptocode {version}

Jump from a rendered UI element to the source line that declared it, and
open that line in your editor through a local helper.

## Workflow

    jumptocode serve                         Run the helper in your project root
    jumptocode resolve <page.json> <index>   Resolve an element of a captured page
    jumptocode resolve ... --open            ...and open the result in the editor
    jumptocode health                        Ask a running helper if it is up

## Handle Keys

| Prefix | Kind | Probed on neighbors |
|--------|------|---------------------|
"
    );
    for strategy in &HANDLE_STRATEGIES {
        let probed = if strategy.probe_eligible { "yes" } else { "no" };
        println!("| `{}` | {:?} | {probed} |", strategy.prefix, strategy.kind);
    }
    print!(
        "\n\
## Budgets

    ancestor walk          {ANCESTOR_BUDGET} elements
    debug-source walk      {DEBUG_SOURCE_DEPTH} records
    component name walk    {COMPONENT_NAME_DEPTH} records
    registry search        {REGISTRY_SEARCH_BUDGET} records

## Helper Endpoints

    GET  /health    {{status, message, version}}
    POST /open      {{file, line}} -> 200 opened, 400 missing file, 404 not found,
                    503 editor unavailable, 500 launch failed

## Configuration ({CONFIG_FILE})

    bind = \"127.0.0.1\"
    port = 5123
    editor = \"code\"                        # run as: editor --reuse-window --goto path:line
    search_dirs = [\"src\", \"app\", \"components\", \"pages\"]
    search_depth = 1
    source_roots = [\"src\", \"app\", \"components\", \"pages\", \"lib\"]
    log_level = \"info\"                     # RUST_LOG wins when set
    log_format = \"pretty\"                  # or \"json\"

## Current State

"
    );
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

/// Config status lines.
fn print_markdown_state(state: &CurrentState) {
    if state.config_found {
        println!("Config:     {CONFIG_FILE} (found)");
    } else {
        println!("Config:     {CONFIG_FILE} (not found, using defaults)");
    }

    match &state.config {
        Ok(config) => {
            println!("Helper:     http://{}:{}", config.bind, config.port);
            println!("Editor:     {}", config.editor);
        },
        Err(reason) => println!("Error:      {reason}"),
    }
}

/// `resolve` exit code table.
fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes (resolve)

| Code | Meaning |
|------|---------|
| 0    | Source location found |
| 1    | Handle found, no debug source |
| 2    | No handle found |
| 3    | Runtime error |
"
    );
}

// ── JSON output ───────────────────────────────────────────────────────

/// Budget constants.
#[derive(Serialize)]
struct BudgetsJson {
    /// Ancestor walk.
    ancestor: usize,
    /// Component name walk.
    component_name: usize,
    /// Debug-source walk.
    debug_source: usize,
    /// Registry search.
    registry: usize,
}

/// Effective configuration.
#[derive(Serialize)]
struct ConfigJson {
    /// Bind address.
    bind: String,
    /// Editor command.
    editor: String,
    /// Helper port.
    port: u16,
    /// Basename search depth.
    search_depth: usize,
    /// Basename search dirs.
    search_dirs: Vec<String>,
    /// Display-path roots.
    source_roots: Vec<String>,
}

/// One exit code.
#[derive(Serialize)]
struct ExitCodeInfo {
    /// Process exit code.
    code: u8,
    /// What it means.
    meaning: String,
}

/// One handle key.
#[derive(Serialize)]
struct HandleInfo {
    /// Kind name.
    kind: String,
    /// Key prefix.
    prefix: String,
    /// Probed on children and siblings.
    probe_eligible: bool,
}

/// Whole document.
#[derive(Serialize)]
struct InfoJson {
    /// Budgets.
    budgets: BudgetsJson,
    /// Effective config, when it loads.
    config: Option<ConfigJson>,
    /// Config load error, when it does not.
    config_error: Option<String>,
    /// Whether the config file exists.
    config_found: bool,
    /// `resolve` exit codes.
    exit_codes: Vec<ExitCodeInfo>,
    /// Handle keys in priority order.
    handle_keys: Vec<HandleInfo>,
    /// Crate version.
    version: String,
}

/// JSON document on stdout.
fn print_json(state: &CurrentState) {
    let (config, config_error) = match &state.config {
        Ok(c) => (
            Some(ConfigJson {
                bind: c.bind.to_string(),
                editor: c.editor.clone(),
                port: c.port,
                search_depth: c.search_depth,
                search_dirs: c.search_dirs.clone(),
                source_roots: c.source_roots.clone(),
            }),
            None,
        ),
        Err(reason) => (None, Some(reason.clone())),
    };

    let info = InfoJson {
        budgets: BudgetsJson {
            ancestor: ANCESTOR_BUDGET,
            component_name: COMPONENT_NAME_DEPTH,
            debug_source: DEBUG_SOURCE_DEPTH,
            registry: REGISTRY_SEARCH_BUDGET,
        },
        config,
        config_error,
        config_found: state.config_found,
        exit_codes: vec![
            ExitCodeInfo { code: 0, meaning: "Source location found".to_string() },
            ExitCodeInfo { code: 1, meaning: "Handle found, no debug source".to_string() },
            ExitCodeInfo { code: 2, meaning: "No handle found".to_string() },
            ExitCodeInfo { code: 3, meaning: "Runtime error".to_string() },
        ],
        handle_keys: HANDLE_STRATEGIES
            .iter()
            .map(|s| {
                return HandleInfo {
                    kind: format!("{:?}", s.kind),
                    prefix: s.prefix.to_string(),
                    probe_eligible: s.probe_eligible,
                };
            })
            .collect(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}
