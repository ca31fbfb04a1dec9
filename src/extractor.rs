//! Debug-source extractor: climb a record's ancestry until some record, its
//! owner, or its alternate twin carries a usable `_debugSource`.

use tracing::{debug, trace};

use crate::host::{NodeRecord, RecordTree};
use crate::normalize;
use crate::resolution::ProbeVariant;
use crate::types::{DebugSource, NodeId};

/// Maximum `return` hops when naming the nearest component.
pub const COMPONENT_NAME_DEPTH: usize = 20;

/// Maximum records examined on the `return` walk, the starting record included.
pub const DEBUG_SOURCE_DEPTH: usize = 50;

/// A descriptor and where it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extracted<'a> {
    /// Zero-based `return` hop of the record whose links produced the descriptor.
    pub depth: usize,
    /// Which link on that record carried it.
    pub link: SourceLink,
    /// The record at `depth`.
    pub record: NodeId,
    /// The descriptor itself.
    pub source: &'a DebugSource,
}

/// Where on a record the descriptor was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLink {
    /// On the `alternate` twin.
    Alternate,
    /// On the record itself.
    Own,
    /// On the `_debugOwner`.
    Owner,
}

/// Find the first usable descriptor along `record`'s `return` chain.
///
/// At each hop the record's own descriptor wins, then its owner's (the owner
/// is the JSX call site that created it, more precise than the instance-tree
/// parent), then, in the rich variant, its alternate twin's. Gives up after
/// `DEBUG_SOURCE_DEPTH` records or when the chain ends.
pub fn extract<P: RecordTree + ?Sized>(
    tree: &P,
    record: NodeId,
    variant: ProbeVariant,
) -> Option<Extracted<'_>> {
    let mut current = Some(record);

    for depth in 0..DEBUG_SOURCE_DEPTH {
        let Some(id) = current else {
            break;
        };
        let Some(node) = tree.record(id) else {
            break;
        };

        if let Some(found) = descriptor_on(tree, node, variant) {
            let (link, source) = found;
            debug!(depth, record = id.0, ?link, file = %source.file_name, line = source.line_number, "debug source found");
            return Some(Extracted { depth, link, record: id, source });
        }

        if let Some(label) = node.kind.component_label() {
            trace!(depth, component = label, "no debug source on component");
        }
        current = node.return_;
    }

    debug!(record = record.0, "no debug source within depth budget");
    return None;
}

/// Name of the nearest function or class component at or above `record`,
/// looking at most `COMPONENT_NAME_DEPTH` records up the `return` chain.
pub fn nearest_component_name<P: RecordTree + ?Sized>(tree: &P, record: NodeId) -> Option<&str> {
    let mut current = Some(record);
    for _ in 0..COMPONENT_NAME_DEPTH {
        let node = tree.record(current?)?;
        if let Some(label) = node.kind.component_label() {
            return Some(label);
        }
        current = node.return_;
    }
    return None;
}

/// Check one record's own, owner and alternate descriptors in that order.
fn descriptor_on<'a, P: RecordTree + ?Sized>(
    tree: &'a P,
    node: &'a NodeRecord,
    variant: ProbeVariant,
) -> Option<(SourceLink, &'a DebugSource)> {
    if let Some(source) = usable(node) {
        return Some((SourceLink::Own, source));
    }

    if let Some(source) = node.debug_owner.and_then(|o| return tree.record(o)).and_then(usable) {
        return Some((SourceLink::Owner, source));
    }

    if variant.checks_alternate() {
        if let Some(source) = node.alternate.and_then(|a| return tree.record(a)).and_then(usable) {
            return Some((SourceLink::Alternate, source));
        }
    }

    return None;
}

/// The record's descriptor, if it would normalize to a valid location.
fn usable(node: &NodeRecord) -> Option<&DebugSource> {
    return node.debug_source.as_ref().filter(|s| return normalize::is_usable(s));
}
