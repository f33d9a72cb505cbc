//! Neighbor resolution: which entities count as "children" of an entity
//! for a given traversal direction.
//!
//! A pure projection over already-loaded data. Most entity shapes carry
//! generic lineage edge lists; the ML shapes derive their downstream
//! children from structural composition instead, and expose no upstream
//! side at all.

use crate::types::{Direction, Entity, EntityRef, EntityRelations};

/// Immediate related entities of `entity` in the given direction.
///
/// `None` for the direction is a defensive default and yields no
/// neighbors. Absent edge lists also yield no neighbors; this never fails.
pub fn resolve_neighbors(entity: &Entity, direction: Option<Direction>) -> Vec<EntityRef> {
    match direction {
        Some(Direction::Upstream) => match &entity.relations {
            EntityRelations::Lineage { upstream, .. } => upstream.clone(),
            // Leaf-like in the upstream direction by domain convention.
            EntityRelations::FeatureTable { .. }
            | EntityRelations::Feature { .. }
            | EntityRelations::PrimaryKey { .. } => Vec::new(),
        },
        Some(Direction::Downstream) => match &entity.relations {
            EntityRelations::Lineage { downstream, .. } => downstream.clone(),
            EntityRelations::FeatureTable {
                features,
                primary_keys,
            } => features.iter().chain(primary_keys).cloned().collect(),
            EntityRelations::Feature { sources } => sources.clone(),
            EntityRelations::PrimaryKey { sources } => sources.clone(),
        },
        None => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
