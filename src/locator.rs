//! Internal-handle locator: find the rendering library's per-element handle
//! by walking from the target element toward the document root.

use tracing::{debug, trace};

use crate::host::{DomTree, HostValue, RecordTree};
use crate::resolution::ProbeVariant;
use crate::types::{ElementId, NodeId};

/// Maximum number of elements examined on the ancestor walk, target included.
pub const ANCESTOR_BUDGET: usize = 100;

/// Known handle keys, in priority order. A key matches when it starts with
/// the prefix; the suffix is a per-page random token.
pub const HANDLE_STRATEGIES: [HandleStrategy; 4] = [
    HandleStrategy {
        extract: record_pointer,
        kind: HandleKind::Fiber,
        needs_rendered_owner: false,
        prefix: "__reactFiber$",
        probe_eligible: true,
    },
    HandleStrategy {
        extract: record_pointer,
        kind: HandleKind::InternalInstance,
        needs_rendered_owner: false,
        prefix: "__reactInternalInstance$",
        probe_eligible: true,
    },
    HandleStrategy {
        extract: props_owner,
        kind: HandleKind::Props,
        needs_rendered_owner: true,
        prefix: "__reactProps$",
        probe_eligible: false,
    },
    HandleStrategy {
        extract: container_current,
        kind: HandleKind::Container,
        needs_rendered_owner: false,
        prefix: "__reactContainer$",
        probe_eligible: false,
    },
];

/// A matched handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle {
    /// Zero-based ancestor hop at which the handle was found.
    pub attempt: usize,
    /// Element carrying the handle.
    pub element: ElementId,
    /// Which key generation matched.
    pub kind: HandleKind,
    /// Record the handle leads to. `None` when the key matched but its value
    /// does not lead to a record (props without a rendered owner, an empty container).
    pub record: Option<NodeId>,
}

/// Generation of the handle key that matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HandleKind {
    /// `__reactContainer$`: root wrapper on a container element.
    Container,
    /// `__reactFiber$`: the fiber for this element.
    Fiber,
    /// `__reactInternalInstance$`: pre-fiber-key naming of the same pointer.
    InternalInstance,
    /// `__reactProps$`: props object; only its `_owner` helps.
    Props,
}

/// One recognized handle key and how to get a record out of its value.
#[derive(Debug, Clone, Copy)]
pub struct HandleStrategy {
    /// Pull the candidate record out of the property value.
    pub extract: fn(&HostValue) -> Option<NodeId>,
    /// Which generation this key belongs to.
    pub kind: HandleKind,
    /// Accept the candidate only if its record renders a DOM node.
    pub needs_rendered_owner: bool,
    /// Key prefix.
    pub prefix: &'static str,
    /// Whether the child/sibling probe looks for this key.
    pub probe_eligible: bool,
}

/// `Container { current }` leads to `current`.
fn container_current(value: &HostValue) -> Option<NodeId> {
    return match *value {
        HostValue::Container { current } => current,
        HostValue::Opaque | HostValue::Props { .. } | HostValue::Record { .. } => None,
    };
}

/// Walk outward from `target` looking for an internal handle.
///
/// Examines at most `ANCESTOR_BUDGET` elements. With the rich variant the
/// first hop also probes the target's direct children and its immediate
/// siblings, which recovers from wrapper elements that styling libraries
/// insert between the clicked node and the nearest node carrying a handle.
pub fn locate<P: DomTree + RecordTree + ?Sized>(
    page: &P,
    target: ElementId,
    variant: ProbeVariant,
) -> Option<Handle> {
    let mut current = Some(target);

    for attempt in 0..ANCESTOR_BUDGET {
        let Some(element) = current else {
            trace!(attempt, "reached document root");
            break;
        };

        if let Some(handle) = match_element(page, element, attempt, false) {
            debug!(attempt, element = element.0, kind = ?handle.kind, "internal handle found");
            return Some(handle);
        }

        if attempt == 0 && variant.probes_neighbors() {
            if let Some(handle) = probe_neighbors(page, element) {
                debug!(element = handle.element.0, kind = ?handle.kind, "internal handle found on neighbor");
                return Some(handle);
            }
        }

        current = page.parent(element);
    }

    debug!(target = target.0, "no internal handle within ancestor budget");
    return None;
}

/// Check one element's keys, in enumeration order, against the strategies.
/// The first key that matches any strategy wins.
fn match_element<P: DomTree + RecordTree + ?Sized>(
    page: &P,
    element: ElementId,
    attempt: usize,
    probe_only: bool,
) -> Option<Handle> {
    for property in page.properties(element) {
        let Some(strategy) = strategy_for_key(&property.key, probe_only) else {
            continue;
        };
        trace!(key = %property.key, "matched handle key");

        let record = (strategy.extract)(&property.value).filter(|id| {
            return !strategy.needs_rendered_owner
                || page.record(*id).is_some_and(|r| return r.state_node.is_some());
        });
        return Some(Handle { attempt, element, kind: strategy.kind, record });
    }
    return None;
}

/// Probe direct children, then the previous sibling, then the next sibling.
fn probe_neighbors<P: DomTree + RecordTree + ?Sized>(page: &P, element: ElementId) -> Option<Handle> {
    let siblings = [page.previous_sibling(element), page.next_sibling(element)];
    return page
        .children(element)
        .iter()
        .copied()
        .chain(siblings.into_iter().flatten())
        .find_map(|neighbor| return match_element(page, neighbor, 0, true));
}

/// `Props { owner }` leads to the owner record.
fn props_owner(value: &HostValue) -> Option<NodeId> {
    return match *value {
        HostValue::Props { owner } => owner,
        HostValue::Container { .. } | HostValue::Opaque | HostValue::Record { .. } => None,
    };
}

/// `Record { id }` leads straight to `id`.
fn record_pointer(value: &HostValue) -> Option<NodeId> {
    return match *value {
        HostValue::Record { id } => Some(id),
        HostValue::Container { .. } | HostValue::Opaque | HostValue::Props { .. } => None,
    };
}

/// First strategy whose prefix the key starts with.
fn strategy_for_key(key: &str, probe_only: bool) -> Option<&'static HandleStrategy> {
    return HANDLE_STRATEGIES
        .iter()
        .filter(|s| return !probe_only || s.probe_eligible)
        .find(|s| return key.starts_with(s.prefix));
}
