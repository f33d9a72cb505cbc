//! Graph layer — neighbor resolution, tree construction, incremental store.

pub mod resolve;
pub mod store;
pub mod tree;
