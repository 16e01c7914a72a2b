//! Spatial indexing for batch operations.

mod str_tree;

pub use str_tree::{ItemsTree, StrTree};
