//! Resolution orchestrator: element → handle → debug source → location.
//!
//! Absence at any stage becomes one of the two typed outcomes. Resolution is
//! a pure read of the host page, so calling it repeatedly (once per hover
//! event, say) is safe and yields identical outcomes for an unchanged page.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::extractor;
use crate::host::HostPage;
use crate::locator::{self, HandleKind};
use crate::normalize;
use crate::registry::{self, RegistryMatch};
use crate::types::{ElementId, NodeId, ResolutionOutcome};

/// Which heuristics the resolution may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProbeVariant {
    /// Ancestor walk; own and owner descriptors only.
    Basic,
    /// Adds the first-hop child/sibling probe, the alternate check and the
    /// devtools registry fallback.
    #[default]
    Rich,
}

impl ProbeVariant {
    /// Whether the extractor looks at the `alternate` twin.
    pub fn checks_alternate(self) -> bool {
        return self == ProbeVariant::Rich;
    }

    /// Whether the locator probes children and siblings on the first hop.
    pub fn probes_neighbors(self) -> bool {
        return self == ProbeVariant::Rich;
    }

    /// Whether the devtools registry is consulted when no handle is found.
    pub fn uses_registry(self) -> bool {
        return self == ProbeVariant::Rich;
    }
}

/// Everything learned during one resolution, for reports and logs.
/// The outcome is the contract; the rest is detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Nearest named component above the record that carried the descriptor.
    pub component: Option<String>,
    /// Short path for display; never sent to the editor.
    pub display_path: Option<String>,
    /// The typed result.
    #[serde(flatten)]
    pub outcome: ResolutionOutcome,
    /// How the starting record was reached.
    pub route: Option<Route>,
    /// Records climbed before a descriptor turned up.
    pub source_depth: Option<usize>,
}

/// How the starting record was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Route {
    /// Element-attached handle of the given kind, at the given ancestor hop.
    Handle {
        /// Ancestor hop.
        attempt: usize,
        /// Key generation.
        kind: HandleKind,
    },
    /// Devtools registry, either exact or coarse.
    Registry {
        /// Whether the record rendered the target itself.
        exact: bool,
    },
}

/// Resolve `target` to a source location.
pub fn resolve<P: HostPage + ?Sized>(page: &P, target: ElementId, variant: ProbeVariant) -> ResolutionOutcome {
    return resolve_detailed(page, target, variant, &normalize::default_source_roots()).outcome;
}

/// Resolve `target` and keep the details the calling layer may want to show.
///
/// Order of attempts: ancestor walk (with the first-hop neighbor probe in the
/// rich variant), then the devtools registry if the page has one.
pub fn resolve_detailed<P: HostPage + ?Sized>(
    page: &P,
    target: ElementId,
    variant: ProbeVariant,
    source_roots: &[String],
) -> Resolution {
    let Some((start, origin, route)) = starting_record(page, target, variant) else {
        warn!(target = target.0, "no internal handle found; not a rendered component or a production build");
        return Resolution::absent(ResolutionOutcome::NoHandleFound, None);
    };

    let Some(start) = start else {
        warn!(target = target.0, ?route, "handle found but it does not lead to a record");
        return Resolution::absent(ResolutionOutcome::NoDebugSourceFound, Some(route));
    };

    let Some(extracted) = extractor::extract(page, start, variant) else {
        warn!(target = target.0, record = start.0, "no debug source in record ancestry");
        return Resolution::absent(ResolutionOutcome::NoDebugSourceFound, Some(route));
    };

    let Some(normalized) = normalize::normalize(extracted.source, source_roots) else {
        return Resolution::absent(ResolutionOutcome::NoDebugSourceFound, Some(route));
    };

    let component = extractor::nearest_component_name(page, extracted.record).map(str::to_string);

    info!(
        file = normalized.location.file(),
        line = normalized.location.line(),
        component = component.as_deref().unwrap_or("-"),
        link = ?extracted.link,
        "resolved source location"
    );

    return Resolution {
        component,
        display_path: Some(normalized.display_path),
        outcome: ResolutionOutcome::Found { location: normalized.location, origin },
        route: Some(route),
        source_depth: Some(extracted.depth),
    };
}

impl Resolution {
    /// A resolution that ended in one of the absence outcomes.
    fn absent(outcome: ResolutionOutcome, route: Option<Route>) -> Self {
        return Self {
            component: None,
            display_path: None,
            outcome,
            route,
            source_depth: None,
        };
    }
}

/// Find the record to start the debug-source walk from.
///
/// Returns `None` when neither a handle nor the registry produced anything.
/// The inner `Option` is `None` when a handle matched but led nowhere.
fn starting_record<P: HostPage + ?Sized>(
    page: &P,
    target: ElementId,
    variant: ProbeVariant,
) -> Option<(Option<NodeId>, ElementId, Route)> {
    if let Some(handle) = locator::locate(page, target, variant) {
        let route = Route::Handle { attempt: handle.attempt, kind: handle.kind };
        return Some((handle.record, handle.element, route));
    }

    if !variant.uses_registry() {
        return None;
    }
    let hook = page.debug_hook()?;
    let found = registry::fallback_locate(page, hook, target)?;
    let route = Route::Registry { exact: matches!(found, RegistryMatch::Exact(_)) };
    return Some((Some(found.record()), target, route));
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;
    use crate::host::{HostValue, NodeRecord, StateNode};
    use crate::snapshot::{DevtoolsHook, HookRoot, PageSnapshot};
    use crate::types::{ComponentKind, DebugSource, SourceLocation};

    fn app_source() -> Option<DebugSource> {
        return Some(DebugSource { file_name: "/repo/src/App.tsx".to_string(), line_number: 42 });
    }

    #[test]
    fn owner_descriptor_resolves_end_to_end() {
        let mut page = PageSnapshot::default();
        let body = page.push_element("body", None);
        let button = page.push_element("button", Some(body));
        let owner = page.push_record(NodeRecord {
            debug_source: app_source(),
            kind: ComponentKind::Function { display_name: None, name: "App".to_string() },
            ..NodeRecord::default()
        });
        let fiber = page.push_record(NodeRecord {
            debug_owner: Some(owner),
            kind: ComponentKind::Host { tag: "button".to_string() },
            return_: Some(owner),
            state_node: Some(StateNode::Element { id: button }),
            ..NodeRecord::default()
        });
        page.attach(button, "__reactFiber$abc123", HostValue::Record { id: fiber });

        let outcome = resolve(&page, button, ProbeVariant::Rich);
        let expected = SourceLocation::new("/repo/src/App.tsx", 42).unwrap();
        assert_eq!(outcome, ResolutionOutcome::Found { location: expected, origin: button });

        let detailed = resolve_detailed(&page, button, ProbeVariant::Rich, &normalize::default_source_roots());
        assert_eq!(detailed.component.as_deref(), Some("App"));
        assert_eq!(detailed.display_path.as_deref(), Some("src/App.tsx"));
    }

    #[test]
    fn no_handle_in_long_chain_without_registry() {
        let mut page = PageSnapshot::default();
        let mut parent = None;
        for _ in 0..100 {
            parent = Some(page.push_element("div", parent));
        }
        let target = parent.unwrap();
        assert_eq!(resolve(&page, target, ProbeVariant::Rich), ResolutionOutcome::NoHandleFound);
    }

    #[test]
    fn handle_without_descriptor_is_no_debug_source() {
        let mut page = PageSnapshot::default();
        let div = page.push_element("div", None);
        let fiber = page.push_record(NodeRecord::default());
        page.attach(div, "__reactFiber$x", HostValue::Record { id: fiber });
        assert_eq!(resolve(&page, div, ProbeVariant::Rich), ResolutionOutcome::NoDebugSourceFound);

        let mut page = PageSnapshot::default();
        let div = page.push_element("div", None);
        page.attach(div, "__reactContainer$x", HostValue::Container { current: None });
        assert_eq!(resolve(&page, div, ProbeVariant::Rich), ResolutionOutcome::NoDebugSourceFound);
    }

    #[test]
    fn props_handle_with_class_owner_resolves() {
        let mut page = PageSnapshot::default();
        let div = page.push_element("div", None);
        let owner = page.push_record(NodeRecord {
            debug_source: Some(DebugSource { file_name: "/repo/src/Legacy.tsx".to_string(), line_number: 5 }),
            kind: ComponentKind::Class { display_name: None, name: "Legacy".to_string() },
            state_node: Some(StateNode::Instance),
            ..NodeRecord::default()
        });
        page.attach(div, "__reactProps$x", HostValue::Props { owner: Some(owner) });

        let expected = SourceLocation::new("/repo/src/Legacy.tsx", 5).unwrap();
        assert_eq!(resolve(&page, div, ProbeVariant::Rich), ResolutionOutcome::Found { location: expected, origin: div });
    }

    #[test]
    fn resolving_twice_is_identical() {
        let mut page = PageSnapshot::default();
        let div = page.push_element("div", None);
        let fiber = page.push_record(NodeRecord { debug_source: app_source(), ..NodeRecord::default() });
        page.attach(div, "__reactFiber$x", HostValue::Record { id: fiber });

        let before = page.clone();
        let first = resolve_detailed(&page, div, ProbeVariant::Rich, &normalize::default_source_roots());
        let second = resolve_detailed(&page, div, ProbeVariant::Rich, &normalize::default_source_roots());
        assert_eq!(first, second);
        assert_eq!(page, before, "resolution must not mutate the page");
    }

    #[test]
    fn registry_fallback_only_in_rich_variant() {
        let mut page = PageSnapshot::default();
        let div = page.push_element("div", None);
        let root = page.push_record(NodeRecord::default());
        let host = page.push_record(NodeRecord {
            debug_source: app_source(),
            return_: Some(root),
            state_node: Some(StateNode::Element { id: div }),
            ..NodeRecord::default()
        });
        page.record_mut(root).unwrap().child = Some(host);
        page.devtools_hook = Some(DevtoolsHook { roots: Some(vec![HookRoot { current: Some(root) }]) });

        assert_eq!(resolve(&page, div, ProbeVariant::Basic), ResolutionOutcome::NoHandleFound);

        let detailed = resolve_detailed(&page, div, ProbeVariant::Rich, &normalize::default_source_roots());
        assert_eq!(detailed.route, Some(Route::Registry { exact: true }));
        assert_eq!(detailed.outcome.location().map(SourceLocation::line), Some(42));
    }

    #[test]
    fn coarse_root_fallback_still_walks_ancestry() {
        let mut page = PageSnapshot::default();
        let stray = page.push_element("div", None);
        let root = page.push_record(NodeRecord { debug_source: app_source(), ..NodeRecord::default() });
        page.devtools_hook = Some(DevtoolsHook { roots: Some(vec![HookRoot { current: Some(root) }]) });

        let detailed = resolve_detailed(&page, stray, ProbeVariant::Rich, &normalize::default_source_roots());
        assert_eq!(detailed.route, Some(Route::Registry { exact: false }));
        assert!(matches!(detailed.outcome, ResolutionOutcome::Found { origin, .. } if origin == stray));
    }
}
