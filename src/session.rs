//! Inspector session owned by the calling layer, and the notices it shows.
//!
//! The enabled flag lives here instead of on the page's global object; the
//! session is passed explicitly to every inspection.

use serde::Serialize;
use tracing::{debug, info};

use crate::client::OpenOutcome;
use crate::host::HostPage;
use crate::normalize;
use crate::resolution::{self, ProbeVariant, Resolution};
use crate::types::{ElementId, ResolutionOutcome};

/// Which events the session reacts to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectMode {
    /// Resolve on click; a successful click ends the session.
    #[default]
    Click,
    /// Resolve on every hover; the session stays on.
    Hover,
}

/// How long a notice stays and how loud it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Notice {
    /// Blocking dialog that keeps the path visible so the user can copy it.
    Persistent {
        /// Resolved path.
        file: String,
        /// One-based line.
        line: u32,
        /// Why the editor could not be reached.
        message: String,
    },
    /// Toast that goes away on its own.
    Transient {
        /// Styled as an error rather than a confirmation.
        is_error: bool,
        /// Text to show.
        text: String,
    },
}

impl Notice {
    /// Notice for the result of the editor-open request.
    pub fn for_open(outcome: &OpenOutcome) -> Self {
        return match outcome {
            OpenOutcome::EditorUnavailable { file, line, message } => Notice::Persistent {
                file: file.clone(),
                line: *line,
                message: message.clone(),
            },
            OpenOutcome::Failed { message } => Notice::transient_error(format!("\u{274c} {message}")),
            OpenOutcome::FileNotFound { file } => Notice::transient_error(format!("\u{274c} File not found: {file}")),
            OpenOutcome::Opened { .. } => Notice::Transient {
                is_error: false,
                text: "\u{2705} Opened in editor".to_string(),
            },
        };
    }

    /// Notice for a resolution outcome, shown before any open request.
    pub fn for_outcome(outcome: &ResolutionOutcome) -> Self {
        return match outcome {
            ResolutionOutcome::Found { location, .. } => {
                let file_name = location.file().rsplit(['/', '\\']).next().unwrap_or(location.file());
                Notice::Transient {
                    is_error: false,
                    text: format!("Opening {file_name}:{}", location.line()),
                }
            },
            ResolutionOutcome::NoDebugSourceFound => Notice::transient_error(
                "\u{26a0}\u{fe0f} Debug source not found. Try clicking a different element".to_string(),
            ),
            ResolutionOutcome::NoHandleFound => Notice::transient_error(
                "\u{26a0}\u{fe0f} Not a React component or dev mode disabled".to_string(),
            ),
        };
    }

    /// Whether the notice reports a problem.
    pub fn is_error(&self) -> bool {
        return match self {
            Notice::Persistent { .. } => true,
            Notice::Transient { is_error, .. } => *is_error,
        };
    }

    /// Transient error toast.
    fn transient_error(text: String) -> Self {
        return Notice::Transient { is_error: true, text };
    }
}

/// The event that triggered an inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Pointer click on the element.
    Click,
    /// Pointer moved over the element.
    Hover,
}

/// Explicit inspector state for one page.
#[derive(Debug, Clone)]
pub struct InspectorSession {
    /// Whether inspections run at all.
    enabled: bool,
    /// Which events the session reacts to.
    mode: InspectMode,
    /// Source-root folders used for display paths.
    source_roots: Vec<String>,
    /// Which heuristics resolution may use.
    variant: ProbeVariant,
}

impl Default for InspectorSession {
    fn default() -> Self {
        return Self::new(InspectMode::Click, ProbeVariant::Rich);
    }
}

impl InspectorSession {
    /// Turn the session off.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Turn the session on.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Resolve `target` if the session is on and reacts to `trigger`.
    ///
    /// Returns `None` when disabled or when the trigger does not match the
    /// mode. In click mode a `Found` outcome disables the session, so the next
    /// click goes back to the page.
    pub fn inspect<P: HostPage + ?Sized>(&mut self, page: &P, target: ElementId, trigger: Trigger) -> Option<Resolution> {
        if !self.enabled || !self.reacts_to(trigger) {
            debug!(enabled = self.enabled, ?trigger, "inspection skipped");
            return None;
        }

        let resolution = resolution::resolve_detailed(page, target, self.variant, &self.source_roots);
        if trigger == Trigger::Click && matches!(resolution.outcome, ResolutionOutcome::Found { .. }) {
            info!("click resolved, inspector disabled");
            self.enabled = false;
        }
        return Some(resolution);
    }

    /// Whether inspections currently run.
    pub fn is_enabled(&self) -> bool {
        return self.enabled;
    }

    /// Which events the session reacts to.
    pub fn mode(&self) -> InspectMode {
        return self.mode;
    }

    /// A disabled session with default source roots.
    pub fn new(mode: InspectMode, variant: ProbeVariant) -> Self {
        return Self {
            enabled: false,
            mode,
            source_roots: normalize::default_source_roots(),
            variant,
        };
    }

    /// Whether the session handles this trigger in its mode.
    fn reacts_to(&self, trigger: Trigger) -> bool {
        return match (self.mode, trigger) {
            (InspectMode::Click, Trigger::Click) | (InspectMode::Hover, Trigger::Hover | Trigger::Click) => true,
            (InspectMode::Click, Trigger::Hover) => false,
        };
    }

    /// Flip the enabled flag and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        info!(enabled = self.enabled, "inspector toggled");
        return self.enabled;
    }

    /// Replace the source roots used for display paths.
    #[must_use]
    pub fn with_source_roots(mut self, source_roots: Vec<String>) -> Self {
        self.source_roots = source_roots;
        return self;
    }
}
