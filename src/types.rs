/// Core domain types: element and record ids, debug descriptors, outcomes.
use serde::{Deserialize, Serialize};

/// Index of a DOM element inside a host page.
/// Opaque to callers; only the page that issued it can dereference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(
    /// Position in the page's element table.
    pub usize,
);

/// Index of a node record (a "fiber") inside a host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(
    /// Position in the page's record table.
    pub usize,
);

/// Component identity of a node record: the record's `type`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ComponentKind {
    /// Class component. `name` is the constructor name.
    Class {
        /// `displayName` static, if the class sets one.
        #[serde(default)]
        display_name: Option<String>,
        /// Constructor name; empty for anonymous classes.
        #[serde(default)]
        name: String,
    },
    /// Function component, including forwardRef and memo render functions.
    Function {
        /// `displayName` property, if the function sets one.
        #[serde(default)]
        display_name: Option<String>,
        /// Function name; empty for anonymous arrows.
        #[serde(default)]
        name: String,
    },
    /// Built-in element such as `div`. The string is the tag.
    Host {
        /// Lower-case tag name.
        tag: String,
    },
    /// Roots, fragments, text nodes and anything without a meaningful type.
    #[default]
    #[serde(other)]
    Other,
}

impl ComponentKind {
    /// Label for a composite component: name, then display name, then `anonymous`.
    /// Returns `None` for host elements and typeless records.
    pub fn component_label(&self) -> Option<&str> {
        let (display_name, name) = match self {
            ComponentKind::Class { display_name, name }
            | ComponentKind::Function { display_name, name } => (display_name, name),
            ComponentKind::Host { .. } | ComponentKind::Other => return None,
        };
        if !name.is_empty() {
            return Some(name.as_str());
        }
        if let Some(display) = display_name.as_deref().filter(|d| return !d.is_empty()) {
            return Some(display);
        }
        return Some("anonymous");
    }
}

/// A `_debugSource` descriptor exactly as the rendering library attached it.
/// Nothing about it is trusted until the normalizer accepts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSource {
    /// Path as emitted by the JSX transform, possibly scheme-prefixed.
    pub file_name: String,
    /// One-based line; bogus values are possible in hand-written metadata.
    pub line_number: i64,
}

/// A canonical source location. `line >= 1` and `file` is non-empty by
/// construction, since the only constructor is `SourceLocation::new`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    /// Absolute or project-relative path with bundler schemes removed.
    file: String,
    /// One-based line number.
    line: u32,
}

impl SourceLocation {
    /// The resolved path, suitable for the editor-open request.
    pub fn file(&self) -> &str {
        return &self.file;
    }

    /// The one-based line number.
    pub fn line(&self) -> u32 {
        return self.line;
    }

    /// Build a location, rejecting an empty file or a line below 1.
    pub fn new(file: impl Into<String>, line: u32) -> Option<Self> {
        let file = file.into();
        if file.is_empty() || line < 1 {
            return None;
        }
        return Some(Self { file, line });
    }
}

impl std::fmt::Display for SourceLocation {
    /// `path:line`, the goto form editors understand.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}:{}", self.file, self.line);
    }
}

/// Result of one resolution call. Exactly one variant; a location and an
/// absence are never reported together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum ResolutionOutcome {
    /// A debug descriptor was found and normalized.
    Found {
        /// Resolved location to hand to the editor-open collaborator.
        location: SourceLocation,
        /// Element whose handle led to the record (the target for registry matches).
        origin: ElementId,
    },
    /// A record was reached but nothing in its traceable ancestry carries a descriptor.
    NoDebugSourceFound,
    /// No internal handle was reachable within budget, and the registry did not help.
    NoHandleFound,
}

impl ResolutionOutcome {
    /// The location, if the outcome is `Found`.
    pub fn location(&self) -> Option<&SourceLocation> {
        return match self {
            ResolutionOutcome::Found { location, .. } => Some(location),
            ResolutionOutcome::NoDebugSourceFound | ResolutionOutcome::NoHandleFound => None,
        };
    }
}
