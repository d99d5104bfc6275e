//! Manual position overrides.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use rivulet_core::{flow::Node, geometry::Point, identifier::NodeId};

/// Errors raised when building a [`LayoutOverride`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverrideError {
    #[error("override position ({x}, {y}) lies outside the unit square")]
    OutOfRange { x: f32, y: f32 },

    #[error("an override needs either a `label` or an `id`")]
    MissingTarget,

    #[error("an override takes a `label` or an `id`, not both")]
    AmbiguousTarget,
}

/// The node(s) an override applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideTarget {
    /// Every node carrying this label.
    Label(String),
    /// The node with this id.
    Id(NodeId),
}

impl OverrideTarget {
    fn matches(&self, node: &Node) -> bool {
        match self {
            OverrideTarget::Label(label) => node.label() == label,
            OverrideTarget::Id(id) => node.id() == *id,
        }
    }
}

impl fmt::Display for OverrideTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideTarget::Label(label) => write!(f, "label `{label}`"),
            OverrideTarget::Id(id) => write!(f, "id {id}"),
        }
    }
}

/// A fixed position replacing the computed one for its target.
///
/// # Examples
///
/// ```
/// use rivulet::layout::LayoutOverride;
///
/// let pinned = LayoutOverride::label("x", 0.9, 0.1).unwrap();
/// assert_eq!(pinned.position().x(), 0.9);
///
/// assert!(LayoutOverride::id(3, 1.2, 0.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawOverride")]
pub struct LayoutOverride {
    target: OverrideTarget,
    position: Point,
}

impl LayoutOverride {
    /// Creates an override.
    ///
    /// # Errors
    ///
    /// Returns [`OverrideError::OutOfRange`] when the position is not inside
    /// the unit square.
    pub fn new(target: OverrideTarget, x: f32, y: f32) -> Result<Self, OverrideError> {
        let position = Point::new(x, y);
        if !position.is_normalized() {
            return Err(OverrideError::OutOfRange { x, y });
        }
        Ok(Self { target, position })
    }

    /// Creates an override for every node labelled `label`.
    pub fn label(label: impl Into<String>, x: f32, y: f32) -> Result<Self, OverrideError> {
        Self::new(OverrideTarget::Label(label.into()), x, y)
    }

    /// Creates an override for the node with id `id`.
    pub fn id(id: usize, x: f32, y: f32) -> Result<Self, OverrideError> {
        Self::new(OverrideTarget::Id(NodeId::new(id)), x, y)
    }

    pub fn target(&self) -> &OverrideTarget {
        &self.target
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns the ids of the nodes this override applies to, in id order.
    pub(crate) fn resolve(&self, nodes: &[Node]) -> Vec<NodeId> {
        nodes
            .iter()
            .filter(|node| self.target.matches(node))
            .map(Node::id)
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOverride {
    label: Option<String>,
    id: Option<usize>,
    x: f32,
    y: f32,
}

impl TryFrom<RawOverride> for LayoutOverride {
    type Error = OverrideError;

    fn try_from(raw: RawOverride) -> Result<Self, Self::Error> {
        let target = match (raw.label, raw.id) {
            (Some(label), None) => OverrideTarget::Label(label),
            (None, Some(id)) => OverrideTarget::Id(NodeId::new(id)),
            (None, None) => return Err(OverrideError::MissingTarget),
            (Some(_), Some(_)) => return Err(OverrideError::AmbiguousTarget),
        };
        Self::new(target, raw.x, raw.y)
    }
}
