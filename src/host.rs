//! Read-only view of a host page: its DOM, the rendering library's record
//! tree, and the optional devtools hook.
//!
//! The resolution core only ever borrows a `HostPage`. It never mutates the
//! DOM, the record tree, or any attached debug metadata.

use serde::{Deserialize, Serialize};

use crate::types::{ComponentKind, DebugSource, ElementId, NodeId};

/// Enumeration of mounted roots exposed by a devtools-style global hook.
pub trait DebugHookRegistry {
    /// Top-level record (`root.current`) of every registered root, in
    /// registration order. Roots without a current record are skipped.
    fn root_records(&self) -> Vec<NodeId>;
}

/// DOM structure and the properties attached to each element.
pub trait DomTree {
    /// Direct element children, in document order.
    fn children(&self, element: ElementId) -> &[ElementId];

    /// The element after this one under the same parent.
    fn next_sibling(&self, element: ElementId) -> Option<ElementId>;

    /// DOM parent, or `None` at the document root.
    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// The element before this one under the same parent.
    fn previous_sibling(&self, element: ElementId) -> Option<ElementId>;

    /// Every property key visible on the element, in enumeration order,
    /// including keys that are non-enumerable by convention.
    fn properties(&self, element: ElementId) -> &[Property];
}

/// A full host page: DOM plus records plus the optional devtools hook.
pub trait HostPage: DomTree + RecordTree {
    /// The devtools hook, if the page installed one that can enumerate roots.
    fn debug_hook(&self) -> Option<&dyn DebugHookRegistry>;
}

/// Access to the rendering library's node records.
pub trait RecordTree {
    /// Dereference a record id. Dangling ids read as absent.
    fn record(&self, id: NodeId) -> Option<&NodeRecord>;
}

/// What a property on a DOM element points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
#[expect(clippy::arbitrary_source_item_ordering, reason = "serde(other) must be the last variant")]
pub enum HostValue {
    /// Root wrapper attached to a container element; `current` is its live tree.
    Container {
        /// The root's current top-level record.
        #[serde(default)]
        current: Option<NodeId>,
    },
    /// The element's props object; `owner` is the `_owner` record, if any.
    Props {
        /// Record that rendered these props.
        #[serde(default)]
        owner: Option<NodeId>,
    },
    /// A direct pointer to a node record (fiber or legacy internal instance).
    Record {
        /// The pointed-to record.
        id: NodeId,
    },
    /// Anything the core does not understand.
    #[serde(other)]
    Opaque,
}

/// One record of the rendering library's instance tree.
///
/// Every link kind stays a separate optional relation: `return_` is the
/// instance-tree parent, `debug_owner` is the record whose render created this
/// one, and `alternate` is the double-buffered twin of the same logical node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Double-buffer twin (current vs work-in-progress).
    #[serde(default)]
    pub alternate: Option<NodeId>,
    /// First child in the instance tree.
    #[serde(default)]
    pub child: Option<NodeId>,
    /// Record that created this one via composition.
    #[serde(default, rename = "_debugOwner")]
    pub debug_owner: Option<NodeId>,
    /// JSX call site, only present in development builds.
    #[serde(default, rename = "_debugSource")]
    pub debug_source: Option<DebugSource>,
    /// Component identity (`type`).
    #[serde(default, rename = "type")]
    pub kind: ComponentKind,
    /// Instance-tree parent.
    #[serde(default, rename = "return")]
    pub return_: Option<NodeId>,
    /// Next sibling in the instance tree.
    #[serde(default)]
    pub sibling: Option<NodeId>,
    /// Instance behind the record: a DOM element for host records, a
    /// component instance for class records.
    #[serde(default)]
    pub state_node: Option<StateNode>,
}

impl NodeRecord {
    /// The DOM element this record rendered, if it is a host record.
    pub fn rendered_element(&self) -> Option<ElementId> {
        return self.state_node.and_then(StateNode::element);
    }
}

/// A key/value pair attached to a DOM element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property name, e.g. `__reactFiber$k2x9`.
    pub key: String,
    /// What the property points at.
    pub value: HostValue,
}

impl Property {
    /// Convenience constructor.
    pub fn new(key: impl Into<String>, value: HostValue) -> Self {
        return Self { key: key.into(), value };
    }
}

/// What a record's `stateNode` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum StateNode {
    /// A rendered DOM element.
    Element {
        /// The element.
        id: ElementId,
    },
    /// A class component instance. Only its presence matters.
    Instance,
}

impl StateNode {
    /// The element, when this is one.
    pub fn element(self) -> Option<ElementId> {
        return match self {
            StateNode::Element { id } => Some(id),
            StateNode::Instance => None,
        };
    }
}
