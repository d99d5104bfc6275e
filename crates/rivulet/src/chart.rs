//! The renderer-facing description of one run.
//!
//! A [`Chart`] bundles everything a renderer needs and nothing it has to
//! recompute: stage names, positioned nodes with their display and hover
//! text, the link list, overlay bubbles, and the warnings raised on the way.

use log::debug;

use rivulet_core::{flow::Edge, geometry::Point, identifier::NodeId, table::StageTable};
use rivulet_table::error::Diagnostic;

use crate::{
    config::LabelsConfig, error::RivuletError, layout::Layout, overlay::Bubble,
    structure::Registry,
};

/// A positioned node as the renderer sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartNode {
    id: NodeId,
    label: String,
    hover: String,
    stage: usize,
    rank: usize,
    position: Point,
}

impl ChartNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Text drawn next to the node; empty when the label is hidden.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Full label, always present.
    pub fn hover(&self) -> &str {
        &self.hover
    }

    pub fn stage(&self) -> usize {
        self.stage
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn position(&self) -> Point {
        self.position
    }
}

/// Everything produced by one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    stages: Vec<String>,
    nodes: Vec<ChartNode>,
    edges: Vec<Edge>,
    overlay: Vec<Bubble>,
    warnings: Vec<Diagnostic>,
}

impl Chart {
    /// Joins the pipeline artifacts into one chart.
    ///
    /// # Errors
    ///
    /// Returns [`RivuletError::Layout`] if a registered node has no position.
    pub(crate) fn assemble(
        table: &StageTable,
        registry: &Registry,
        edges: Vec<Edge>,
        layout: &Layout,
        overlay: Vec<Bubble>,
        labels: &LabelsConfig,
    ) -> Result<Self, RivuletError> {
        let nodes = registry
            .nodes()
            .iter()
            .map(|node| {
                let position = layout.position(node.id()).ok_or_else(|| {
                    RivuletError::Layout(format!("Position not found for node {}", node.id()))
                })?;
                let label = if labels.is_visible(node.id().index()) {
                    node.label().to_string()
                } else {
                    String::new()
                };
                Ok(ChartNode {
                    id: node.id(),
                    label,
                    hover: node.label().to_string(),
                    stage: node.stage(),
                    rank: node.rank(),
                    position,
                })
            })
            .collect::<Result<Vec<_>, RivuletError>>()?;

        let warnings: Vec<Diagnostic> = registry
            .warnings()
            .iter()
            .chain(layout.warnings())
            .cloned()
            .collect();

        debug!(
            nodes = nodes.len(),
            links = edges.len(),
            bubbles = overlay.len(),
            warnings = warnings.len();
            "Chart assembled"
        );
        Ok(Self {
            stages: table.stage_names().map(str::to_string).collect(),
            nodes,
            edges,
            overlay,
            warnings,
        })
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> &[ChartNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&ChartNode> {
        self.nodes.get(id.index()).filter(|node| node.id == id)
    }

    /// Links in extraction order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn overlay(&self) -> &[Bubble] {
        &self.overlay
    }

    /// Non-fatal diagnostics from registration and layout.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}
