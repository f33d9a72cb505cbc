//! Error types for the lineage library.
//!
//! Tree construction never fails: missing data degrades to empty or
//! placeholder values. Errors only arise at the incremental store boundary,
//! where callers address nodes by id.

use thiserror::Error;

use crate::graph::store::NodeId;

pub type Result<T> = std::result::Result<T, LineageError>;

#[derive(Debug, Error)]
pub enum LineageError {
    /// A store operation addressed a node id that was never created.
    #[error("node {0} not found in lineage store")]
    NodeNotFound(NodeId),

    /// `add_node` named a parent id that was never created.
    #[error("parent node {0} not found in lineage store")]
    ParentNotFound(NodeId),
}
