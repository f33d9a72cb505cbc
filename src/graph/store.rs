//! Long-lived incremental lineage store.
//!
//! Where [`crate::graph::tree`] rebuilds a whole tree per call, this store
//! supports progressive disclosure: nodes and edges accumulate in place as
//! the surrounding application fetches more lineage pages. Nodes are
//! deduplicated by a caller-defined unique key, so the same physical
//! entity reached via two edges collapses to one node.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::error::{LineageError, Result};

/// Stable identifier assigned to a node on insertion.
pub type NodeId = usize;

// ---------------------------------------------------------------------------
// UniqueKey
// ---------------------------------------------------------------------------

/// Extracts the deduplication key from a node payload.
///
/// The original store configured this as a key path into the payload
/// (for datasets, the physical-location URI); here the payload type
/// supplies it directly.
pub trait UniqueKey {
    fn unique_key(&self) -> String;
}

// ---------------------------------------------------------------------------
// LoadState
// ---------------------------------------------------------------------------

/// Per-node fetch state, driven by external fetch tasks.
///
/// A failed fetch simply leaves the node in `Unloaded` or `Loading`; retry
/// policy belongs to the caller, not the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
}

// ---------------------------------------------------------------------------
// StoreNode / StoreEdge
// ---------------------------------------------------------------------------

/// A node in the incremental store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreNode<P> {
    pub id: NodeId,
    pub payload: P,
    /// Signed depth relative to the root: negative levels sit on the
    /// upstream side, positive on the downstream side.
    pub level: i32,
    pub load_state: LoadState,
    /// UI focus flag. At most one selected node is caller discipline,
    /// not a store invariant.
    pub selected: bool,
    /// Expand/collapse UI flag, flipped by [`LineageStore::toggle`].
    pub expanded: bool,
}

impl<P> StoreNode<P> {
    /// Whether this node sits on the upstream side of the root.
    pub fn is_upstream(&self) -> bool {
        self.level < 0
    }
}

/// A directed edge; data flows `from` toward `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEdge {
    pub from: NodeId,
    pub to: NodeId,
}

// ---------------------------------------------------------------------------
// NodeAttrs
// ---------------------------------------------------------------------------

/// Partial attribute update for [`LineageStore::set_node_attrs`].
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeAttrs {
    pub load_state: Option<LoadState>,
    pub selected: Option<bool>,
    pub expanded: Option<bool>,
}

// ---------------------------------------------------------------------------
// StoreStats
// ---------------------------------------------------------------------------

/// Aggregate statistics about the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub nodes: usize,
    pub edges: usize,
}

// ---------------------------------------------------------------------------
// LineageStore
// ---------------------------------------------------------------------------

/// Mutable, bidirectionally navigable node/edge set keyed by the payload's
/// unique key.
#[derive(Debug, Default)]
pub struct LineageStore<P: UniqueKey> {
    nodes: Vec<StoreNode<P>>,
    ids_by_key: HashMap<String, NodeId>,
    edges: Vec<StoreEdge>,
    edge_set: HashSet<(NodeId, NodeId)>,
}

impl<P: UniqueKey> LineageStore<P> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            ids_by_key: HashMap::new(),
            edges: Vec::new(),
            edge_set: HashSet::new(),
        }
    }

    // -------------------------------------------------------------------
    // add_node
    // -------------------------------------------------------------------

    /// Insert a node, optionally wired to `parent`.
    ///
    /// Upstream insertions wire an edge from the new node toward the
    /// parent (data flows toward the root); downstream insertions wire
    /// parent toward child. If a node with the same unique key already
    /// exists, only the edge is added and the existing node's id is
    /// returned; the incoming payload is dropped.
    pub fn add_node(
        &mut self,
        payload: P,
        parent: Option<NodeId>,
        is_upstream: bool,
    ) -> Result<NodeId> {
        if let Some(parent_id) = parent {
            if parent_id >= self.nodes.len() {
                return Err(LineageError::ParentNotFound(parent_id));
            }
        }

        let key = payload.unique_key();
        if let Some(&existing) = self.ids_by_key.get(&key) {
            debug!(key = %key, id = existing, "node deduplicated by unique key");
            if let Some(parent_id) = parent {
                self.wire_edge(existing, parent_id, is_upstream);
            }
            return Ok(existing);
        }

        let level = match parent {
            None => 0,
            Some(parent_id) => {
                let parent_level = self.nodes[parent_id].level;
                if is_upstream {
                    parent_level - 1
                } else {
                    parent_level + 1
                }
            }
        };

        let id = self.nodes.len();
        self.nodes.push(StoreNode {
            id,
            payload,
            level,
            load_state: LoadState::Unloaded,
            selected: false,
            expanded: false,
        });
        self.ids_by_key.insert(key, id);
        if let Some(parent_id) = parent {
            self.wire_edge(id, parent_id, is_upstream);
        }
        debug!(id, level, "node added to lineage store");
        Ok(id)
    }

    fn wire_edge(&mut self, child: NodeId, parent: NodeId, is_upstream: bool) {
        let (from, to) = if is_upstream {
            (child, parent)
        } else {
            (parent, child)
        };
        if from == to {
            return;
        }
        if self.edge_set.insert((from, to)) {
            self.edges.push(StoreEdge { from, to });
        }
    }

    // -------------------------------------------------------------------
    // Attribute updates
    // -------------------------------------------------------------------

    /// Merge the given attributes into the node in place.
    pub fn set_node_attrs(&mut self, id: NodeId, attrs: NodeAttrs) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or(LineageError::NodeNotFound(id))?;
        if let Some(load_state) = attrs.load_state {
            node.load_state = load_state;
        }
        if let Some(selected) = attrs.selected {
            node.selected = selected;
        }
        if let Some(expanded) = attrs.expanded {
            node.expanded = expanded;
        }
        Ok(())
    }

    /// Flip the node's expand/collapse flag; returns the new value.
    pub fn toggle(&mut self, id: NodeId) -> Result<bool> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or(LineageError::NodeNotFound(id))?;
        node.expanded = !node.expanded;
        Ok(node.expanded)
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&StoreNode<P>> {
        self.nodes.get(id)
    }

    pub fn node_by_key(&self, key: &str) -> Option<&StoreNode<P>> {
        self.ids_by_key.get(key).map(|&id| &self.nodes[id])
    }

    pub fn nodes(&self) -> &[StoreNode<P>] {
        &self.nodes
    }

    pub fn edges(&self) -> &[StoreEdge] {
        &self.edges
    }

    /// Nodes with an edge flowing into `id` (its upstream side).
    pub fn upstream_neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter(|edge| edge.to == id)
            .map(|edge| edge.from)
            .collect()
    }

    /// Nodes `id` flows into (its downstream side).
    pub fn downstream_neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter(|edge| edge.from == id)
            .map(|edge| edge.to)
            .collect()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct DatasetPayload {
        uri: String,
    }

    impl DatasetPayload {
        fn new(uri: &str) -> Self {
            Self {
                uri: uri.to_string(),
            }
        }
    }

    impl UniqueKey for DatasetPayload {
        fn unique_key(&self) -> String {
            self.uri.clone()
        }
    }

    fn seeded_store() -> (LineageStore<DatasetPayload>, NodeId) {
        let mut store = LineageStore::new();
        let root = store
            .add_node(DatasetPayload::new("hdfs://root"), None, false)
            .unwrap();
        (store, root)
    }

    // -- add_node -----------------------------------------------------------

    #[test]
    fn root_node_sits_at_level_zero() {
        let (store, root) = seeded_store();
        assert_eq!(store.node(root).unwrap().level, 0);
        assert_eq!(store.node(root).unwrap().load_state, LoadState::Unloaded);
        assert!(!store.node(root).unwrap().is_upstream());
    }

    #[test]
    fn downstream_children_descend_positive_levels() {
        let (mut store, root) = seeded_store();
        let child = store
            .add_node(DatasetPayload::new("hdfs://child"), Some(root), false)
            .unwrap();
        let grandchild = store
            .add_node(DatasetPayload::new("hdfs://grandchild"), Some(child), false)
            .unwrap();
        assert_eq!(store.node(child).unwrap().level, 1);
        assert_eq!(store.node(grandchild).unwrap().level, 2);
    }

    #[test]
    fn upstream_parents_ascend_negative_levels() {
        let (mut store, root) = seeded_store();
        let parent = store
            .add_node(DatasetPayload::new("hdfs://parent"), Some(root), true)
            .unwrap();
        assert_eq!(store.node(parent).unwrap().level, -1);
        assert!(store.node(parent).unwrap().is_upstream());
    }

    #[test]
    fn edges_follow_data_flow() {
        let (mut store, root) = seeded_store();
        let down = store
            .add_node(DatasetPayload::new("hdfs://down"), Some(root), false)
            .unwrap();
        let up = store
            .add_node(DatasetPayload::new("hdfs://up"), Some(root), true)
            .unwrap();
        assert!(store.edges().contains(&StoreEdge { from: root, to: down }));
        assert!(store.edges().contains(&StoreEdge { from: up, to: root }));
        assert_eq!(store.upstream_neighbors(root), vec![up]);
        assert_eq!(store.downstream_neighbors(root), vec![down]);
    }

    #[test]
    fn same_unique_key_collapses_to_one_node() {
        let (mut store, root) = seeded_store();
        let a = store
            .add_node(DatasetPayload::new("hdfs://a"), Some(root), false)
            .unwrap();
        let b = store
            .add_node(DatasetPayload::new("hdfs://shared"), Some(root), false)
            .unwrap();
        // Same physical entity reached through a second edge.
        let b_again = store
            .add_node(DatasetPayload::new("hdfs://shared"), Some(a), false)
            .unwrap();
        assert_eq!(b, b_again);
        assert_eq!(store.stats().nodes, 3);
        assert_eq!(store.stats().edges, 3);
    }

    #[test]
    fn duplicate_edges_are_not_readded() {
        let (mut store, root) = seeded_store();
        store
            .add_node(DatasetPayload::new("hdfs://child"), Some(root), false)
            .unwrap();
        store
            .add_node(DatasetPayload::new("hdfs://child"), Some(root), false)
            .unwrap();
        assert_eq!(store.stats().edges, 1);
    }

    #[test]
    fn unknown_parent_is_an_error() {
        let mut store: LineageStore<DatasetPayload> = LineageStore::new();
        let err = store
            .add_node(DatasetPayload::new("hdfs://x"), Some(42), false)
            .unwrap_err();
        assert!(matches!(err, LineageError::ParentNotFound(42)));
    }

    #[test]
    fn node_by_key_finds_inserted_node() {
        let (store, root) = seeded_store();
        assert_eq!(store.node_by_key("hdfs://root").unwrap().id, root);
        assert!(store.node_by_key("hdfs://nope").is_none());
    }

    // -- set_node_attrs / toggle --------------------------------------------

    #[test]
    fn load_state_progresses_through_attrs() {
        let (mut store, root) = seeded_store();
        store
            .set_node_attrs(
                root,
                NodeAttrs {
                    load_state: Some(LoadState::Loading),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(store.node(root).unwrap().load_state, LoadState::Loading);
        store
            .set_node_attrs(
                root,
                NodeAttrs {
                    load_state: Some(LoadState::Loaded),
                    selected: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        let node = store.node(root).unwrap();
        assert_eq!(node.load_state, LoadState::Loaded);
        assert!(node.selected);
    }

    #[test]
    fn attrs_merge_leaves_unset_fields_untouched() {
        let (mut store, root) = seeded_store();
        store
            .set_node_attrs(
                root,
                NodeAttrs {
                    selected: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        store
            .set_node_attrs(
                root,
                NodeAttrs {
                    load_state: Some(LoadState::Loaded),
                    ..Default::default()
                },
            )
            .unwrap();
        let node = store.node(root).unwrap();
        assert!(node.selected, "selected must survive an unrelated merge");
        assert_eq!(node.load_state, LoadState::Loaded);
    }

    #[test]
    fn toggle_flips_and_reports() {
        let (mut store, root) = seeded_store();
        assert!(store.toggle(root).unwrap());
        assert!(!store.toggle(root).unwrap());
    }

    #[test]
    fn attrs_on_unknown_node_is_an_error() {
        let (mut store, _) = seeded_store();
        let err = store.set_node_attrs(9, NodeAttrs::default()).unwrap_err();
        assert!(matches!(err, LineageError::NodeNotFound(9)));
        assert!(matches!(
            store.toggle(9).unwrap_err(),
            LineageError::NodeNotFound(9)
        ));
    }
}
