//! Flow graph vertices and transitions.
//!
//! A [`Node`] is a distinct categorical value seen in some stage; an [`Edge`]
//! is an observed row-level transition between nodes of adjacent stages.

use crate::identifier::NodeId;

/// A vertex of the flow diagram.
///
/// Identity, label and stage are fixed at registration. The rank is the
/// node's position among its stage siblings and is written by the layout
/// step; it starts out as `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    label: String,
    stage: usize,
    rank: usize,
}

impl Node {
    /// Creates a node first seen in `stage`.
    pub fn new(id: NodeId, label: impl Into<String>, stage: usize) -> Self {
        Self {
            id,
            label: label.into(),
            stage,
            rank: 0,
        }
    }

    /// Returns the node identity.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the original cell text.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the index of the stage the node was first seen in.
    pub fn stage(&self) -> usize {
        self.stage
    }

    /// Returns the rank within the stage.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Sets the rank within the stage.
    pub fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }
}

/// A directed transition between two nodes.
///
/// Parallel edges are legal and meaningful: every contributing table row is
/// one unit of weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    source: NodeId,
    target: NodeId,
    weight: f64,
}

impl Edge {
    /// Creates an edge with unit weight.
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self::with_weight(source, target, 1.0)
    }

    /// Creates an edge with an explicit weight.
    pub fn with_weight(source: NodeId, target: NodeId, weight: f64) -> Self {
        Self {
            source,
            target,
            weight,
        }
    }

    /// Returns the source node.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Returns the target node.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Returns the edge weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns `(source, target)`.
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.source, self.target)
    }
}
