//! Captured page state: a serde-loadable `HostPage`.
//!
//! A snapshot is a JSON dump of one live page: its elements (with every
//! property key in enumeration order), the record tree, and the devtools hook
//! if the page had one. Ids are table indices; `load` refuses snapshots whose
//! ids dangle so the accessors never have to guess.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::host::{DebugHookRegistry, DomTree, HostPage, HostValue, NodeRecord, Property, RecordTree};
use crate::types::{ElementId, NodeId};

/// The global devtools hook as captured from the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevtoolsHook {
    /// Registered roots. `None` means the hook exists but cannot enumerate roots.
    #[serde(default)]
    pub roots: Option<Vec<HookRoot>>,
}

impl DebugHookRegistry for DevtoolsHook {
    fn root_records(&self) -> Vec<NodeId> {
        return self
            .roots
            .iter()
            .flatten()
            .filter_map(|root| return root.current)
            .collect();
    }
}

/// One registered root container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookRoot {
    /// The root's current top-level record.
    #[serde(default)]
    pub current: Option<NodeId>,
}

/// One DOM element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementNode {
    /// Child elements in document order.
    #[serde(default)]
    pub children: Vec<ElementId>,
    /// DOM parent.
    #[serde(default)]
    pub parent: Option<ElementId>,
    /// Every property key on the element, in enumeration order.
    #[serde(default)]
    pub properties: Vec<Property>,
    /// Tag name, informational only.
    #[serde(default)]
    pub tag: String,
}

/// A captured page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    /// `__REACT_DEVTOOLS_GLOBAL_HOOK__`, if the page installed one.
    #[serde(default)]
    pub devtools_hook: Option<DevtoolsHook>,
    /// Element table; `ElementId(n)` is `elements[n]`.
    pub elements: Vec<ElementNode>,
    /// Record table; `NodeId(n)` is `records[n]`.
    #[serde(default)]
    pub records: Vec<NodeRecord>,
    /// Page URL at capture time, informational only.
    #[serde(default)]
    pub url: Option<String>,
}

impl DomTree for PageSnapshot {
    fn children(&self, element: ElementId) -> &[ElementId] {
        return self.elements.get(element.0).map(|e| return e.children.as_slice()).unwrap_or_default();
    }

    fn next_sibling(&self, element: ElementId) -> Option<ElementId> {
        let siblings = self.children(self.parent(element)?);
        let position = siblings.iter().position(|s| return *s == element)?;
        return siblings.get(position.checked_add(1)?).copied();
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        return self.elements.get(element.0)?.parent;
    }

    fn previous_sibling(&self, element: ElementId) -> Option<ElementId> {
        let siblings = self.children(self.parent(element)?);
        let position = siblings.iter().position(|s| return *s == element)?;
        return siblings.get(position.checked_sub(1)?).copied();
    }

    fn properties(&self, element: ElementId) -> &[Property] {
        return self.elements.get(element.0).map(|e| return e.properties.as_slice()).unwrap_or_default();
    }
}

impl HostPage for PageSnapshot {
    fn debug_hook(&self) -> Option<&dyn DebugHookRegistry> {
        let hook = self.devtools_hook.as_ref()?;
        hook.roots.as_ref()?;
        let registry: &dyn DebugHookRegistry = hook;
        return Some(registry);
    }
}

impl PageSnapshot {
    /// Attach a property to an element, after any existing ones.
    pub fn attach(&mut self, element: ElementId, key: &str, value: HostValue) {
        if let Some(node) = self.elements.get_mut(element.0) {
            node.properties.push(Property::new(key, value));
        }
    }

    /// Look up a target element by index.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownElement` if the index is past the element table.
    pub fn element(&self, index: usize) -> Result<ElementId, Error> {
        if index >= self.elements.len() {
            return Err(Error::UnknownElement { count: self.elements.len(), id: index });
        }
        return Ok(ElementId(index));
    }

    /// Parse and validate a snapshot from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the text is not a snapshot,
    /// or `Error::SnapshotCorrupt` if any id dangles.
    pub fn from_json(content: &str) -> Result<Self, Error> {
        let snapshot: Self = serde_json::from_str(content)?;
        snapshot.validate(Path::new("<memory>"))?;
        return Ok(snapshot);
    }

    /// Read, parse and validate a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, `Error::Json` if it is
    /// not a snapshot, or `Error::SnapshotCorrupt` if any id dangles.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&content)?;
        snapshot.validate(path)?;
        return Ok(snapshot);
    }

    /// Append an element under `parent` (or as a root) and return its id.
    pub fn push_element(&mut self, tag: &str, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(ElementNode {
            children: Vec::new(),
            parent,
            properties: Vec::new(),
            tag: tag.to_string(),
        });
        if let Some(node) = parent.and_then(|p| return self.elements.get_mut(p.0)) {
            node.children.push(id);
        }
        return id;
    }

    /// Append a record and return its id.
    pub fn push_record(&mut self, record: NodeRecord) -> NodeId {
        let id = NodeId(self.records.len());
        self.records.push(record);
        return id;
    }

    /// Mutable access to a record, for wiring links after both ends exist.
    pub fn record_mut(&mut self, id: NodeId) -> Option<&mut NodeRecord> {
        return self.records.get_mut(id.0);
    }

    /// Check that every id the snapshot mentions is in range.
    ///
    /// # Errors
    ///
    /// Returns `Error::SnapshotCorrupt` naming the first dangling reference.
    pub fn validate(&self, path: &Path) -> Result<(), Error> {
        let checker = IdChecker {
            elements: self.elements.len(),
            path,
            records: self.records.len(),
        };

        for (index, element) in self.elements.iter().enumerate() {
            let owner = format!("element #{index}");
            checker.element(element.parent, &owner, "parent")?;
            for child in &element.children {
                checker.element(Some(*child), &owner, "children")?;
            }
            for property in &element.properties {
                let field = property.key.as_str();
                match property.value {
                    HostValue::Container { current } => checker.record(current, &owner, field)?,
                    HostValue::Opaque => {},
                    HostValue::Props { owner: props_owner } => checker.record(props_owner, &owner, field)?,
                    HostValue::Record { id } => checker.record(Some(id), &owner, field)?,
                }
            }
        }

        for (index, record) in self.records.iter().enumerate() {
            let owner = format!("record #{index}");
            checker.record(record.alternate, &owner, "alternate")?;
            checker.record(record.child, &owner, "child")?;
            checker.record(record.debug_owner, &owner, "_debugOwner")?;
            checker.record(record.return_, &owner, "return")?;
            checker.record(record.sibling, &owner, "sibling")?;
            checker.element(record.rendered_element(), &owner, "stateNode")?;
        }

        for root in self.devtools_hook.iter().filter_map(|h| return h.roots.as_ref()).flatten() {
            checker.record(root.current, "devtools hook", "roots")?;
        }

        return Ok(());
    }
}

impl RecordTree for PageSnapshot {
    fn record(&self, id: NodeId) -> Option<&NodeRecord> {
        return self.records.get(id.0);
    }
}

/// Range checks for `PageSnapshot::validate`.
struct IdChecker<'a> {
    /// Length of the element table.
    elements: usize,
    /// Snapshot path for error messages.
    path: &'a Path,
    /// Length of the record table.
    records: usize,
}

impl IdChecker<'_> {
    /// Fail if an element reference is out of range.
    ///
    /// # Errors
    ///
    /// Returns `Error::SnapshotCorrupt` for a dangling element id.
    fn element(&self, id: Option<ElementId>, owner: &str, field: &str) -> Result<(), Error> {
        return match id {
            Some(ElementId(n)) if n >= self.elements => Err(self.dangling(owner, field, "element", n)),
            _ => Ok(()),
        };
    }

    /// Build the corruption error for a dangling id.
    fn dangling(&self, owner: &str, field: &str, table: &str, id: usize) -> Error {
        return Error::SnapshotCorrupt {
            path: PathBuf::from(self.path),
            reason: format!("{owner} `{field}` points at {table} #{id}, which does not exist"),
        };
    }

    /// Fail if a record reference is out of range.
    ///
    /// # Errors
    ///
    /// Returns `Error::SnapshotCorrupt` for a dangling record id.
    fn record(&self, id: Option<NodeId>, owner: &str, field: &str) -> Result<(), Error> {
        return match id {
            Some(NodeId(n)) if n >= self.records => Err(self.dangling(owner, field, "record", n)),
            _ => Ok(()),
        };
    }
}
