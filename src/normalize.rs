//! Canonicalize raw debug descriptors and derive short display paths.
//!
//! The display path is presentation only. The editor-open request always
//! carries the canonical `SourceLocation::file`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{DebugSource, SourceLocation};

/// Source-root folder names tried, in order, when shortening a path.
pub const DEFAULT_SOURCE_ROOTS: [&str; 5] = ["src", "app", "components", "pages", "lib"];

/// Marker prefixed to a path shortened to its last two segments.
pub const ELLIPSIS: &str = "\u{2026}";

/// `scheme://` or `scheme:///` at the start of a bundler URL.
/// Requires two slashes so Windows drive letters (`C:\`) never match.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static BUNDLER_SCHEME: Lazy<Regex> =
    Lazy::new(|| return Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:///?").expect("valid regex"));

/// A canonical location plus its short display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Short path for notices and logs.
    pub display_path: String,
    /// Canonical location for the editor.
    pub location: SourceLocation,
}

/// Shorten a canonical path for display.
///
/// Returns the suffix starting at the first listed source-root folder that
/// appears in the path. Otherwise, paths with more than three segments become
/// the last two segments behind an ellipsis, and short paths become the bare
/// file name.
pub fn display_path(file: &str, source_roots: &[String]) -> String {
    let segments: Vec<&str> = file.split(['/', '\\']).filter(|s| return !s.is_empty()).collect();

    for root in source_roots {
        if let Some(start) = segments.iter().position(|s| return *s == root.as_str()) {
            return segments.get(start..).unwrap_or_default().join("/");
        }
    }

    if segments.len() > 3 {
        let tail = segments.get(segments.len().saturating_sub(2)..).unwrap_or_default();
        return format!("{ELLIPSIS}/{}", tail.join("/"));
    }

    return segments.last().map(|s| return (*s).to_string()).unwrap_or_default();
}

/// Default source roots as owned strings, for callers without a config.
pub fn default_source_roots() -> Vec<String> {
    return DEFAULT_SOURCE_ROOTS.iter().map(|s| return (*s).to_string()).collect();
}

/// Canonicalize a raw descriptor. Returns `None` when the descriptor cannot
/// form a valid location (empty path after stripping, or a line below 1).
pub fn normalize(raw: &DebugSource, source_roots: &[String]) -> Option<Normalized> {
    let file = strip_bundler_prefix(&raw.file_name);
    let line = u32::try_from(raw.line_number).ok()?;
    let location = SourceLocation::new(file, line)?;
    let display_path = display_path(location.file(), source_roots);
    return Some(Normalized { display_path, location });
}

/// Whether a descriptor would survive `normalize`.
pub fn is_usable(raw: &DebugSource) -> bool {
    return raw.line_number >= 1
        && u32::try_from(raw.line_number).is_ok()
        && !strip_bundler_prefix(&raw.file_name).is_empty();
}

/// Remove a bundler URL scheme and a leading `./`.
///
/// `file://` keeps the leading slash of its absolute path; other schemes
/// (`webpack://`, `webpack:///`, `vite://`, ...) are dropped entirely.
pub fn strip_bundler_prefix(path: &str) -> String {
    let trimmed = path.trim();
    let without_scheme = if let Some(rest) = trimmed.strip_prefix("file://") {
        rest
    } else {
        let end = BUNDLER_SCHEME.find(trimmed).map_or(0, |m| return m.end());
        trimmed.get(end..).unwrap_or(trimmed)
    };
    return without_scheme.strip_prefix("./").unwrap_or(without_scheme).to_string();
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    fn raw(file: &str, line: i64) -> DebugSource {
        return DebugSource { file_name: file.to_string(), line_number: line };
    }

    #[test]
    fn webpack_triple_slash_display_starts_at_src() {
        let n = normalize(&raw("webpack:///src/components/Button.tsx", 12), &default_source_roots()).unwrap();
        assert_eq!(n.location.file(), "src/components/Button.tsx");
        assert_eq!(n.location.line(), 12);
        assert_eq!(n.display_path, "src/components/Button.tsx");
    }

    #[test]
    fn unrecognized_long_path_keeps_last_two_segments() {
        let roots = default_source_roots();
        assert_eq!(display_path("alpha/beta/gamma/delta/Widget.tsx", &roots), "\u{2026}/delta/Widget.tsx");
        assert_eq!(display_path("/opt/work/ui/Widget.tsx", &roots), "\u{2026}/ui/Widget.tsx");
    }

    #[test]
    fn short_unrecognized_path_is_bare_file_name() {
        let roots = default_source_roots();
        assert_eq!(display_path("ui/widgets/Widget.tsx", &roots), "Widget.tsx");
        assert_eq!(display_path("Widget.tsx", &roots), "Widget.tsx");
    }

    #[test]
    fn root_order_beats_position_in_path() {
        // `app` appears first in the path but `src` is listed first.
        let roots = default_source_roots();
        assert_eq!(display_path("/repo/app/src/Main.tsx", &roots), "src/Main.tsx");
    }

    #[test]
    fn strips_schemes_and_dot_slash() {
        assert_eq!(strip_bundler_prefix("webpack://./src/App.tsx"), "src/App.tsx");
        assert_eq!(strip_bundler_prefix("./src/App.tsx"), "src/App.tsx");
        assert_eq!(strip_bundler_prefix("file:///home/me/src/App.tsx"), "/home/me/src/App.tsx");
        assert_eq!(strip_bundler_prefix("C:\\repo\\src\\App.tsx"), "C:\\repo\\src\\App.tsx");
        assert_eq!(strip_bundler_prefix("/repo/src/App.tsx"), "/repo/src/App.tsx");
    }

    #[test]
    fn rejects_unusable_descriptors() {
        let roots = default_source_roots();
        assert!(normalize(&raw("src/App.tsx", 0), &roots).is_none());
        assert!(normalize(&raw("src/App.tsx", -4), &roots).is_none());
        assert!(normalize(&raw("webpack:///", 3), &roots).is_none());
    }
}
