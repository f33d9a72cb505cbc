//! Lineage tree construction.
//!
//! Builds a renderable tree from a focal entity and the flat map of
//! entities fetched so far. Trees are rebuilt from scratch on every call;
//! incremental state lives in [`crate::graph::store`] instead.
//!
//! Two guards keep construction finite and cheap on real lineage graphs:
//! the construction path (the URNs from the root down to the current node)
//! suppresses cycles, and a per-build cache reuses the subtree of a URN
//! reached a second time via a different path. The cache is owned by one
//! [`build_tree`] call and must not be reused across calls; a stale cache
//! would short-circuit expansion with nodes from an older snapshot.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::graph::resolve::resolve_neighbors;
use crate::types::{Direction, Entity, EntityRegistry, FetchedEntities, NodeData};

/// Root name shown while the initial query for the focal entity is in flight.
const LOADING_PLACEHOLDER: &str = "loading...";

// ---------------------------------------------------------------------------
// BuiltNode
// ---------------------------------------------------------------------------

/// Outcome of constructing a single tree position.
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltNode {
    /// The URN was fetched; here is its (possibly cached) subtree.
    Node(NodeData),
    /// The URN already appears on the construction path. The branch is a
    /// back-edge and contributes no node.
    Cycle,
    /// The URN has not been fetched yet. Not expandable until the caller
    /// loads it and rebuilds.
    NotFetched,
}

impl BuiltNode {
    /// The constructed node, when there is one.
    pub fn into_node(self) -> Option<NodeData> {
        match self {
            BuiltNode::Node(node) => Some(node),
            BuiltNode::Cycle | BuiltNode::NotFetched => None,
        }
    }
}

// ---------------------------------------------------------------------------
// build_node
// ---------------------------------------------------------------------------

/// Recursively construct the tree position for `urn`.
///
/// The path check runs before the cache check: a back-edge to an ancestor
/// reports [`BuiltNode::Cycle`] even though the ancestor is already cached.
/// A URN reached a second time via a non-ancestor path returns its cached
/// node, so diamond-shaped lineage expands each URN once per build.
pub fn build_node(
    urn: &str,
    fetched_entities: &FetchedEntities,
    direction: Direction,
    constructed: &mut HashMap<String, NodeData>,
    construction_path: &[String],
) -> BuiltNode {
    if construction_path.iter().any(|ancestor| ancestor == urn) {
        debug!(urn, "lineage cycle suppressed");
        return BuiltNode::Cycle;
    }

    if let Some(node) = constructed.get(urn) {
        trace!(urn, "reusing node constructed earlier in this build");
        return BuiltNode::Node(node.clone());
    }

    let Some(fetched) = fetched_entities.get(urn) else {
        return BuiltNode::NotFetched;
    };

    let neighbors = fetched.children(direction);
    let unexplored_children = neighbors
        .iter()
        .filter(|child| !fetched_entities.contains_key(*child))
        .count();

    let mut node = NodeData {
        urn: Some(fetched.urn.clone()),
        name: fetched.name.clone(),
        kind: Some(fetched.kind),
        icon: fetched.icon.clone(),
        platform: fetched.platform.clone(),
        unexplored_children,
        countercurrent_children_urns: fetched.children(direction.opposite()).to_vec(),
        children: Vec::new(),
    };

    // Register before recursing. A revisit from inside this subtree is
    // necessarily an ancestor revisit and resolves via the path check, so
    // the childless entry is never observed.
    constructed.insert(urn.to_string(), node.clone());

    let mut extended_path = Vec::with_capacity(construction_path.len() + 1);
    extended_path.extend_from_slice(construction_path);
    extended_path.push(urn.to_string());

    let mut children = Vec::new();
    for child_urn in neighbors {
        if child_urn == urn {
            // Immediate self-loop.
            continue;
        }
        if let BuiltNode::Node(child) = build_node(
            child_urn,
            fetched_entities,
            direction,
            constructed,
            &extended_path,
        ) {
            children.push(child);
        }
    }
    node.children = children;

    // Complete the cache entry so later paths reuse the full subtree.
    constructed.insert(urn.to_string(), node.clone());
    BuiltNode::Node(node)
}

// ---------------------------------------------------------------------------
// build_tree
// ---------------------------------------------------------------------------

/// Build the lineage tree rooted at the focal entity.
///
/// Never fails: an absent focal entity yields a `"loading..."` placeholder
/// root, a registry miss yields a nameless root, and unfetched or cyclic
/// branches are simply omitted from `children`.
pub fn build_tree(
    focal: Option<&Entity>,
    fetched_entities: &FetchedEntities,
    direction: Direction,
    registry: &dyn EntityRegistry,
) -> NodeData {
    let Some(entity) = focal else {
        return NodeData {
            urn: None,
            name: LOADING_PLACEHOLDER.to_string(),
            kind: None,
            icon: None,
            platform: None,
            unexplored_children: 0,
            countercurrent_children_urns: Vec::new(),
            children: Vec::new(),
        };
    };

    let viz = registry.lineage_viz_config(entity.kind, entity);
    // The root is the query focus, so it is always considered fully known.
    let mut root = NodeData {
        urn: viz.as_ref().map(|v| v.urn.clone()),
        name: viz.as_ref().map(|v| v.name.clone()).unwrap_or_default(),
        kind: viz.as_ref().map(|v| v.kind),
        icon: viz.as_ref().and_then(|v| v.icon.clone()),
        platform: viz.as_ref().and_then(|v| v.platform.clone()),
        unexplored_children: 0,
        countercurrent_children_urns: Vec::new(),
        children: Vec::new(),
    };

    let mut constructed: HashMap<String, NodeData> = HashMap::new();
    let root_path = vec![root.urn.clone().unwrap_or_default()];

    for neighbor in resolve_neighbors(entity, Some(direction)) {
        if root.urn.as_deref() == Some(neighbor.urn.as_str()) {
            // Self-loop at the root.
            continue;
        }
        if let BuiltNode::Node(child) = build_node(
            &neighbor.urn,
            fetched_entities,
            direction,
            &mut constructed,
            &root_path,
        ) {
            root.children.push(child);
        }
    }

    trace!(
        root = root.urn.as_deref().unwrap_or(""),
        children = root.children.len(),
        "lineage tree built"
    );
    root
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
