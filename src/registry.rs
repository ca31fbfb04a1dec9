//! Global-registry fallback: find a record for an element through the
//! devtools hook when no element-attached handle is reachable.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::host::{DebugHookRegistry, RecordTree};
use crate::types::{ElementId, NodeId};

/// Maximum records visited across all roots before the search gives up.
pub const REGISTRY_SEARCH_BUDGET: usize = 10_000;

/// How the fallback produced its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryMatch {
    /// No exact match; the first root's top-level record, as a coarse start.
    CoarseRoot(NodeId),
    /// A record whose `stateNode` is the target element.
    Exact(NodeId),
}

impl RegistryMatch {
    /// The record either way.
    pub fn record(self) -> NodeId {
        return match self {
            RegistryMatch::CoarseRoot(id) | RegistryMatch::Exact(id) => id,
        };
    }
}

/// Search every registered root for the record that rendered `target`.
///
/// Each root's subtree is searched depth-first (`child` first, then the
/// `sibling` chain). If nothing matches, the first root's top-level record is
/// returned so the extractor can still try an ancestor walk from it; that
/// degrades precision instead of failing. Returns `None` only when the
/// registry has no roots.
pub fn fallback_locate<T: RecordTree + ?Sized>(
    tree: &T,
    registry: &dyn DebugHookRegistry,
    target: ElementId,
) -> Option<RegistryMatch> {
    let roots = registry.root_records();
    let mut visited = HashSet::new();

    for root in &roots {
        if let Some(found) = find_rendering_record(tree, *root, target, &mut visited) {
            debug!(record = found.0, "registry search matched target element");
            return Some(RegistryMatch::Exact(found));
        }
    }

    let first = roots.first().copied()?;
    warn!(root = first.0, "no exact registry match, falling back to first root record");
    return Some(RegistryMatch::CoarseRoot(first));
}

/// Depth-first search of one subtree for a record whose `stateNode` is `target`.
/// `visited` is shared across roots so cycles and shared subtrees are walked once.
fn find_rendering_record<T: RecordTree + ?Sized>(
    tree: &T,
    root: NodeId,
    target: ElementId,
    visited: &mut HashSet<NodeId>,
) -> Option<NodeId> {
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        if visited.len() >= REGISTRY_SEARCH_BUDGET {
            debug!("registry search budget exhausted");
            return None;
        }
        if !visited.insert(id) {
            continue;
        }
        let Some(node) = tree.record(id) else {
            continue;
        };
        if node.rendered_element() == Some(target) {
            return Some(id);
        }

        // Push children in reverse so the first child is searched first.
        let children = child_list(tree, node.child, visited);
        stack.extend(children.into_iter().rev());
    }
    return None;
}

/// Collect a `child` → `sibling` → `sibling` ... list, stopping at a record
/// already visited or already in the list.
fn child_list<T: RecordTree + ?Sized>(
    tree: &T,
    first: Option<NodeId>,
    visited: &HashSet<NodeId>,
) -> Vec<NodeId> {
    let mut children = Vec::new();
    let mut current = first;
    while let Some(id) = current {
        if visited.contains(&id) || children.contains(&id) || children.len() >= REGISTRY_SEARCH_BUDGET {
            break;
        }
        children.push(id);
        current = tree.record(id).and_then(|r| return r.sibling);
    }
    return children;
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;
    use crate::host::{HostPage, NodeRecord, StateNode};
    use crate::snapshot::{DevtoolsHook, HookRoot, PageSnapshot};

    /// root -> [a -> [a1], b]; `b` renders `el_b`, `a1` renders `el_a1`.
    fn page_with_tree() -> (PageSnapshot, ElementId, ElementId, NodeId) {
        let mut page = PageSnapshot::default();
        let body = page.push_element("body", None);
        let el_a1 = page.push_element("span", Some(body));
        let el_b = page.push_element("p", Some(body));

        let root = page.push_record(NodeRecord::default());
        let a = page.push_record(NodeRecord { return_: Some(root), ..NodeRecord::default() });
        let a1 = page.push_record(NodeRecord { return_: Some(a), state_node: Some(StateNode::Element { id: el_a1 }), ..NodeRecord::default() });
        let b = page.push_record(NodeRecord { return_: Some(root), state_node: Some(StateNode::Element { id: el_b }), ..NodeRecord::default() });
        page.record_mut(root).unwrap().child = Some(a);
        page.record_mut(a).unwrap().child = Some(a1);
        page.record_mut(a).unwrap().sibling = Some(b);

        page.devtools_hook = Some(DevtoolsHook { roots: Some(vec![HookRoot { current: Some(root) }]) });
        return (page, el_a1, el_b, root);
    }

    #[test]
    fn finds_exact_match_through_child_and_sibling_links() {
        let (page, el_a1, el_b, _) = page_with_tree();
        let hook = page.debug_hook().unwrap();

        assert_eq!(fallback_locate(&page, hook, el_a1), Some(RegistryMatch::Exact(NodeId(2))));
        assert_eq!(fallback_locate(&page, hook, el_b), Some(RegistryMatch::Exact(NodeId(3))));
    }

    #[test]
    fn unmatched_target_falls_back_to_first_root() {
        let (mut page, _, _, root) = page_with_tree();
        let stray = page.push_element("div", None);
        let hook = page.debug_hook().unwrap();
        assert_eq!(fallback_locate(&page, hook, stray), Some(RegistryMatch::CoarseRoot(root)));
    }

    #[test]
    fn empty_registry_yields_nothing() {
        let (mut page, el_a1, _, _) = page_with_tree();
        page.devtools_hook = Some(DevtoolsHook { roots: Some(Vec::new()) });
        let hook = page.debug_hook().unwrap();
        assert_eq!(fallback_locate(&page, hook, el_a1), None);
    }

    #[test]
    fn later_roots_are_searched() {
        let (mut page, _, _, first_root) = page_with_tree();
        let portal_el = page.push_element("div", None);
        let second_root = page.push_record(NodeRecord::default());
        let portal = page.push_record(NodeRecord { state_node: Some(StateNode::Element { id: portal_el }), ..NodeRecord::default() });
        page.record_mut(second_root).unwrap().child = Some(portal);
        page.devtools_hook = Some(DevtoolsHook {
            roots: Some(vec![HookRoot { current: Some(first_root) }, HookRoot { current: Some(second_root) }]),
        });

        let hook = page.debug_hook().unwrap();
        assert_eq!(fallback_locate(&page, hook, portal_el), Some(RegistryMatch::Exact(portal)));
    }

    #[test]
    fn cyclic_sibling_chain_terminates() {
        let (mut page, _, _, root) = page_with_tree();
        // b.sibling -> a closes a loop in the sibling chain.
        page.record_mut(NodeId(3)).unwrap().sibling = Some(NodeId(1));
        let stray = page.push_element("div", None);
        let hook = page.debug_hook().unwrap();
        assert_eq!(fallback_locate(&page, hook, stray), Some(RegistryMatch::CoarseRoot(root)));
    }

    #[test]
    fn search_stops_at_budget() {
        let mut page = PageSnapshot::default();
        let deep_el = page.push_element("div", None);
        let chain: Vec<NodeId> = (0..=REGISTRY_SEARCH_BUDGET).map(|_| return page.push_record(NodeRecord::default())).collect();
        for pair in chain.windows(2) {
            page.record_mut(pair[0]).unwrap().child = Some(pair[1]);
        }
        page.devtools_hook = Some(DevtoolsHook { roots: Some(vec![HookRoot { current: Some(chain[0]) }]) });

        let last = chain[REGISTRY_SEARCH_BUDGET];
        page.record_mut(last).unwrap().state_node = Some(StateNode::Element { id: deep_el });
        let hook = page.debug_hook().unwrap();
        assert_eq!(fallback_locate(&page, hook, deep_el), Some(RegistryMatch::CoarseRoot(chain[0])));

        let within = chain[REGISTRY_SEARCH_BUDGET - 1];
        page.record_mut(last).unwrap().state_node = None;
        page.record_mut(within).unwrap().state_node = Some(StateNode::Element { id: deep_el });
        let hook = page.debug_hook().unwrap();
        assert_eq!(fallback_locate(&page, hook, deep_el), Some(RegistryMatch::Exact(within)));
    }

    #[test]
    fn class_instances_never_match_an_element() {
        let (mut page, el_a1, _, root) = page_with_tree();
        page.record_mut(NodeId(2)).unwrap().state_node = Some(StateNode::Instance);
        let hook = page.debug_hook().unwrap();
        assert_eq!(fallback_locate(&page, hook, el_a1), Some(RegistryMatch::CoarseRoot(root)));
    }
}
