//! Node identifiers.
//!
//! Node identities are assigned sequentially in first-seen order by the node
//! registry, so a plain index is all an identity needs to be. [`NodeId`] wraps
//! that index to keep it from being confused with row or stage indices.

use std::fmt;

/// Identity of a node within one run of the pipeline.
///
/// Ids are dense: a registry holding `n` nodes uses exactly `0..n`, which
/// lets positions and other per-node data live in plain vectors indexed by
/// [`NodeId::index`].
///
/// # Examples
///
/// ```
/// use rivulet_core::identifier::NodeId;
///
/// let id = NodeId::new(3);
/// assert_eq!(id.index(), 3);
/// assert_eq!(id.to_string(), "3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Creates an id from its dense index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the dense index of this id.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
