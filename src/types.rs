//! Core domain types for the lineage graph.
//!
//! Entities arrive from an external fetch layer at varying levels of
//! completeness; identity is always the URN string. Two records with the
//! same URN denote the same logical entity.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// Kinds of catalog entities that can participate in lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Dataset,
    Chart,
    Dashboard,
    DataFlow,
    DataJob,
    MlFeature,
    MlPrimaryKey,
    MlFeatureTable,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dataset => "DATASET",
            Self::Chart => "CHART",
            Self::Dashboard => "DASHBOARD",
            Self::DataFlow => "DATA_FLOW",
            Self::DataJob => "DATA_JOB",
            Self::MlFeature => "ML_FEATURE",
            Self::MlPrimaryKey => "ML_PRIMARY_KEY",
            Self::MlFeatureTable => "ML_FEATURE_TABLE",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DATASET" => Some(Self::Dataset),
            "CHART" => Some(Self::Chart),
            "DASHBOARD" => Some(Self::Dashboard),
            "DATA_FLOW" | "DATAFLOW" => Some(Self::DataFlow),
            "DATA_JOB" | "DATAJOB" => Some(Self::DataJob),
            "ML_FEATURE" | "MLFEATURE" => Some(Self::MlFeature),
            "ML_PRIMARY_KEY" | "MLPRIMARYKEY" => Some(Self::MlPrimaryKey),
            "ML_FEATURE_TABLE" | "MLFEATURETABLE" => Some(Self::MlFeatureTable),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Traversal direction across lineage edges.
///
/// Upstream walks toward sources, downstream toward consumers. A tree is
/// built in exactly one direction; the UI toggles between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Upstream,
    Downstream,
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Upstream => Self::Downstream,
            Self::Downstream => Self::Upstream,
        }
    }
}

// ---------------------------------------------------------------------------
// EntityRef
// ---------------------------------------------------------------------------

/// A typed reference to a related entity, as projected out of an entity's
/// structural fields by the neighbor resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub kind: EntityKind,
    pub urn: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, urn: impl Into<String>) -> Self {
        Self {
            kind,
            urn: urn.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// EntityRelations
// ---------------------------------------------------------------------------

/// Where an entity's lineage neighbors come from, tagged per entity shape.
///
/// Most entities carry generic upstream/downstream edge lists. The ML
/// entities are special: their "children" are structural composition
/// (declared features, primary keys, sources), not lineage edges, and they
/// have no upstream side at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum EntityRelations {
    /// Generic lineage edge lists (datasets, charts, dashboards, flows, jobs).
    Lineage {
        #[serde(default)]
        upstream: Vec<EntityRef>,
        #[serde(default)]
        downstream: Vec<EntityRef>,
    },
    /// ML feature table: downstream children are its declared features and
    /// primary keys, in that order.
    #[serde(rename_all = "camelCase")]
    FeatureTable {
        #[serde(default)]
        features: Vec<EntityRef>,
        #[serde(default)]
        primary_keys: Vec<EntityRef>,
    },
    /// ML feature: downstream children are its declared source entities.
    Feature {
        #[serde(default)]
        sources: Vec<EntityRef>,
    },
    /// ML primary key: downstream children are its declared source entities.
    PrimaryKey {
        #[serde(default)]
        sources: Vec<EntityRef>,
    },
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A raw entity record as supplied by the fetch layer.
///
/// `relations` drives neighbor resolution; `kind`, `name` and `platform`
/// are presentation metadata carried through to the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub urn: String,
    pub name: String,
    pub kind: EntityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub relations: EntityRelations,
}

// ---------------------------------------------------------------------------
// FetchedEntity
// ---------------------------------------------------------------------------

/// Lightweight node-info record kept in the fetched-entities map.
///
/// Holds the raw child URN lists in both directions so a tree can be built
/// either way (and re-built after a direction toggle) without refetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedEntity {
    pub urn: String,
    pub name: String,
    pub kind: EntityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default)]
    pub upstream_children: Vec<String>,
    #[serde(default)]
    pub downstream_children: Vec<String>,
}

impl FetchedEntity {
    /// The raw child URN list for the given traversal direction.
    pub fn children(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::Upstream => &self.upstream_children,
            Direction::Downstream => &self.downstream_children,
        }
    }
}

/// Map from URN to fetched node info, populated externally as queries
/// resolve. The construction logic only reads it.
pub type FetchedEntities = HashMap<String, FetchedEntity>;

// ---------------------------------------------------------------------------
// NodeData
// ---------------------------------------------------------------------------

/// A position in the rendered lineage tree.
///
/// Built top-down by the tree builder; never mutated after construction
/// except by rebuilding the whole tree. `children` only ever holds
/// neighbors in the active traversal direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntityKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Count of direction-appropriate neighbor URNs absent from the
    /// fetched-entities map at construction time. A lower bound on
    /// undiscovered breadth; the renderer offers "expand" when nonzero.
    pub unexplored_children: usize,
    /// The neighbor URN list in the opposite direction, retained so the UI
    /// can toggle traversal direction without refetching.
    pub countercurrent_children_urns: Vec<String>,
    pub children: Vec<NodeData>,
}

// ---------------------------------------------------------------------------
// Entity registry boundary
// ---------------------------------------------------------------------------

/// Presentation projection of an entity, supplied by the registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VizConfig {
    pub urn: String,
    pub name: String,
    pub kind: EntityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// Per-entity-type display lookup, implemented by the surrounding
/// application. Returning `None` degrades the root to a nameless
/// placeholder rather than failing the build.
pub trait EntityRegistry {
    fn lineage_viz_config(&self, kind: EntityKind, entity: &Entity) -> Option<VizConfig>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_roundtrip() {
        for kind in [
            EntityKind::Dataset,
            EntityKind::Chart,
            EntityKind::Dashboard,
            EntityKind::DataFlow,
            EntityKind::DataJob,
            EntityKind::MlFeature,
            EntityKind::MlPrimaryKey,
            EntityKind::MlFeatureTable,
        ] {
            let s = kind.as_str();
            assert_eq!(EntityKind::from_str_loose(s), Some(kind));
        }
    }

    #[test]
    fn entity_kind_from_str_loose_aliases() {
        assert_eq!(
            EntityKind::from_str_loose("mlfeature"),
            Some(EntityKind::MlFeature)
        );
        assert_eq!(
            EntityKind::from_str_loose("dataflow"),
            Some(EntityKind::DataFlow)
        );
        assert_eq!(EntityKind::from_str_loose("pipeline"), None);
    }

    #[test]
    fn direction_opposite() {
        assert_eq!(Direction::Upstream.opposite(), Direction::Downstream);
        assert_eq!(Direction::Downstream.opposite(), Direction::Upstream);
    }

    #[test]
    fn fetched_entity_children_by_direction() {
        let fetched = FetchedEntity {
            urn: "urn:li:dataset:1".to_string(),
            name: "one".to_string(),
            kind: EntityKind::Dataset,
            icon: None,
            platform: None,
            upstream_children: vec!["urn:li:dataset:2".to_string()],
            downstream_children: vec!["urn:li:dataset:3".to_string()],
        };
        assert_eq!(
            fetched.children(Direction::Upstream),
            ["urn:li:dataset:2".to_string()]
        );
        assert_eq!(
            fetched.children(Direction::Downstream),
            ["urn:li:dataset:3".to_string()]
        );
    }

    #[test]
    fn node_data_serializes_camel_case() {
        let node = NodeData {
            urn: Some("urn:li:dataset:1".to_string()),
            name: "one".to_string(),
            kind: Some(EntityKind::Dataset),
            icon: None,
            platform: Some("kafka".to_string()),
            unexplored_children: 2,
            countercurrent_children_urns: vec![],
            children: vec![],
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["unexploredChildren"], 2);
        assert_eq!(json["kind"], "DATASET");
        assert!(json.get("icon").is_none());
    }

    #[test]
    fn fetched_entity_deserializes_with_missing_child_lists() {
        let fetched: FetchedEntity = serde_json::from_value(serde_json::json!({
            "urn": "urn:li:chart:9",
            "name": "weekly actives",
            "kind": "CHART",
        }))
        .unwrap();
        assert!(fetched.upstream_children.is_empty());
        assert!(fetched.downstream_children.is_empty());
    }
}
