use std::fmt::Write as _;

use crate::config::CONFIG_FILE;
use crate::error::Error;
use crate::resolution::{Resolution, Route};
use crate::types::ResolutionOutcome;

/// ANSI bold, for headings on a terminal.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is
/// one, how to fix it. Readable by both humans and agents.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::ConfigInvalid { reason } => format!(
            "\
# Error: Invalid Config

{reason}

## Fix

Correct the value in `{CONFIG_FILE}`, or delete the key to use the default.
"
        ),
        Error::EditorLaunch { command, reason } => format!(
            "\
# Error: Editor Launch Failed

`{command}` could not open the file: {reason}

## Fix

Check that `{command}` is on your PATH:

    which {command}
"
        ),
        Error::Http(e) => format!(
            "\
# Error: Helper Unreachable

{e}

## Fix

Start the helper in your project directory:

    jumptocode serve
"
        ),
        Error::Io(e) => format!(
            "\
# Error: I/O

{e}
"
        ),
        Error::Json(e) => format!(
            "\
# Error: Invalid JSON

{e}
"
        ),
        Error::SnapshotCorrupt { path, reason } => format!(
            "\
# Error: Snapshot Corrupt

`{}` references something it does not contain: {reason}

## Fix

Capture the page again; every element and record id must be in range.
",
            path.display()
        ),
        Error::TomlDe(e) => format!(
            "\
# Error: Invalid TOML

{e}
"
        ),
        Error::UnknownElement { count, id } => render_unknown_element(*id, *count),
    };
}

/// Render a resolution as a markdown report.
pub fn render_outcome(resolution: &Resolution) -> String {
    let mut out = match &resolution.outcome {
        ResolutionOutcome::Found { location, origin } => {
            let mut found = format!("# Found: {location}\n\n");
            if let Some(display) = &resolution.display_path {
                let _ = writeln!(found, "Display:   {display}:{}", location.line());
            }
            if let Some(component) = &resolution.component {
                let _ = writeln!(found, "Component: {component}");
            }
            let _ = writeln!(found, "Element:   #{}", origin.0);
            found
        },
        ResolutionOutcome::NoDebugSourceFound => "\
# No Debug Source Found

The element belongs to a rendered component, but no record in reach
carries a source descriptor.

## Fix

Enable the JSX source transform in development builds, or try an
element closer to the component you are after.
"
        .to_string(),
        ResolutionOutcome::NoHandleFound => "\
# No Handle Found

No rendering-library handle on the element or its ancestors.

## Fix

Make sure the page is a development build rendered by React.
"
        .to_string(),
    };

    if let Some(route) = &resolution.route {
        let via = match route {
            Route::Handle { attempt, kind } => format!("{kind:?} handle, {attempt} hop(s) up"),
            Route::Registry { exact: true } => "devtools registry, exact match".to_string(),
            Route::Registry { exact: false } => "devtools registry, first root".to_string(),
        };
        let _ = write!(out, "\nVia:       {via}\n");
    }
    if let Some(depth) = resolution.source_depth {
        let _ = writeln!(out, "Depth:     {depth}");
    }
    return out;
}

/// Unknown target element.
fn render_unknown_element(id: usize, count: usize) -> String {
    let last = count.checked_sub(1);
    let mut out = format!(
        "\
# Error: Unknown Element

Element `#{id}` is not in the snapshot.
"
    );
    match last {
        Some(last) => {
            let _ = write!(out, "\n## Fix\n\nPick an element between `0` and `{last}`.\n");
        },
        None => out.push_str("\nThe snapshot has no elements.\n"),
    }
    return out;
}
