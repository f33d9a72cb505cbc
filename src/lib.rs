//! DataLineage — lineage-graph construction for a metadata catalog.
//!
//! Builds renderable lineage trees from partially fetched entity data,
//! suppressing cycles and tolerating missing entities, and maintains a
//! long-lived incremental node/edge store for progressive disclosure.
//! Pure in-memory and synchronous; fetching is owned by the surrounding
//! application.

pub mod error;
pub mod graph;
pub mod observability;
pub mod types;

pub use error::{LineageError, Result};
pub use graph::resolve::resolve_neighbors;
pub use graph::store::{
    LineageStore, LoadState, NodeAttrs, NodeId, StoreEdge, StoreNode, StoreStats, UniqueKey,
};
pub use graph::tree::{build_node, build_tree, BuiltNode};
pub use types::{
    Direction, Entity, EntityKind, EntityRef, EntityRegistry, EntityRelations, FetchedEntities,
    FetchedEntity, NodeData, VizConfig,
};
