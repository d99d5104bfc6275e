//! Node placement in normalized diagram space.
//!
//! The [`LayoutEngine`] computes one [`Point`] per registered node:
//!
//! 1. **x** spreads stages evenly across `[0, 1]`.
//! 2. **y** ranks each stage's nodes and spreads them across the band the
//!    [`BandRule`] picks for that stage's size.
//! 3. An optional ordering policy reorders the terminal stage.
//! 4. Manual [`LayoutOverride`]s replace the computed point of their target.
//!
//! The engine also writes each node's rank back into the node.

mod band;
mod overrides;

pub use band::BandRule;
pub use overrides::{LayoutOverride, OverrideError, OverrideTarget};

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, info, trace};
use serde::Deserialize;

use rivulet_core::{flow::Node, geometry::Point, identifier::NodeId};
use rivulet_table::error::{Diagnostic, ErrorCode};

use crate::structure::Registry;

/// Where the ordering-policy members of the terminal stage go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalPlacement {
    /// Policy members first, in policy order, then the rest in encounter order.
    #[default]
    Leading,
    /// The rest in encounter order, then the policy members in policy order.
    Trailing,
}

/// Computed node positions, keyed by node id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    positions: IndexMap<NodeId, Point>,
    warnings: Vec<Diagnostic>,
}

impl Layout {
    /// Returns the position of `id`, if the node was laid out.
    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    /// Iterates over `(id, position)` in node order.
    pub fn positions(&self) -> impl Iterator<Item = (NodeId, Point)> + '_ {
        self.positions.iter().map(|(id, point)| (*id, *point))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Warnings for overrides that matched no node.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

/// Configurable node placement.
///
/// # Examples
///
/// ```
/// use rivulet::layout::{BandRule, LayoutEngine, LayoutOverride, TerminalPlacement};
///
/// let engine = LayoutEngine::new()
///     .with_band_rule(BandRule::Unit)
///     .with_ordering_policy(["E", "D"])
///     .with_terminal_placement(TerminalPlacement::Trailing)
///     .with_overrides(vec![LayoutOverride::label("x", 0.9, 0.1).unwrap()]);
/// assert_eq!(engine.band_rule(), BandRule::Unit);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    band_rule: BandRule,
    ordering_policy: Option<Vec<String>>,
    terminal_placement: TerminalPlacement,
    overrides: Vec<LayoutOverride>,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_band_rule(mut self, band_rule: BandRule) -> Self {
        self.band_rule = band_rule;
        self
    }

    /// Sets the display order of the terminal stage.
    ///
    /// Only nodes placed in the terminal stage are reordered. With
    /// [`CollisionPolicy::Merge`], a policy label first seen in an earlier
    /// stage keeps its earlier node and is left where it is; use
    /// [`CollisionPolicy::Separate`] to give the terminal stage its own node.
    ///
    /// [`CollisionPolicy::Merge`]: crate::structure::CollisionPolicy::Merge
    /// [`CollisionPolicy::Separate`]: crate::structure::CollisionPolicy::Separate
    pub fn with_ordering_policy<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ordering_policy = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_terminal_placement(mut self, placement: TerminalPlacement) -> Self {
        self.terminal_placement = placement;
        self
    }

    pub fn with_overrides(mut self, overrides: Vec<LayoutOverride>) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn band_rule(&self) -> BandRule {
        self.band_rule
    }

    pub fn ordering_policy(&self) -> Option<&[String]> {
        self.ordering_policy.as_deref()
    }

    pub fn terminal_placement(&self) -> TerminalPlacement {
        self.terminal_placement
    }

    pub fn overrides(&self) -> &[LayoutOverride] {
        &self.overrides
    }

    /// Lays out `nodes`, spread over `stage_count` stages.
    ///
    /// Every node receives exactly one position, and its rank is updated to
    /// its place within its stage.
    pub fn assign(&self, nodes: &mut [Node], stage_count: usize) -> Layout {
        info!(
            nodes = nodes.len(),
            stages = stage_count,
            overrides = self.overrides.len();
            "Assigning layout"
        );

        let stage_count = stage_count.max(
            nodes
                .iter()
                .map(|node| node.stage() + 1)
                .max()
                .unwrap_or(0),
        );
        let mut stages: Vec<Vec<usize>> = vec![Vec::new(); stage_count];
        for (slot, node) in nodes.iter().enumerate() {
            stages[node.stage()].push(slot);
        }

        if let (Some(policy), Some(terminal)) = (&self.ordering_policy, stages.last_mut()) {
            *terminal = self.order_terminal(nodes, terminal, policy);
        }

        let mut positions = IndexMap::with_capacity(nodes.len());
        for (stage, members) in stages.iter().enumerate() {
            let x = stage_x(stage, stage_count);
            let band = self.band_rule.band(members.len());
            trace!(stage, nodes = members.len(), lo = band.lo(), hi = band.hi(); "Stage band");

            for (rank, &slot) in members.iter().enumerate() {
                let node = &mut nodes[slot];
                node.set_rank(rank);
                positions.insert(node.id(), Point::new(x, band.position(rank, members.len())));
            }
        }
        // Node order, not stage order.
        positions.sort_keys();

        let mut warnings = Vec::new();
        for layout_override in &self.overrides {
            let targets = layout_override.resolve(nodes);
            if targets.is_empty() {
                debug!(override_target:% = layout_override.target(); "Override matches no node");
                warnings.push(unresolved_override(layout_override));
                continue;
            }
            for id in targets {
                trace!(id:% = id; "Position overridden");
                positions.insert(id, layout_override.position());
            }
        }

        debug!(positions = positions.len(), warnings = warnings.len(); "Layout assigned");
        Layout {
            positions,
            warnings,
        }
    }

    /// Splits the terminal stage into policy members and the rest.
    fn order_terminal(&self, nodes: &[Node], members: &[usize], policy: &[String]) -> Vec<usize> {
        let mut placed: HashSet<usize> = HashSet::with_capacity(policy.len());
        let mut ordered: Vec<usize> = Vec::with_capacity(members.len());
        for label in policy {
            for &slot in members {
                if nodes[slot].label() == label && placed.insert(slot) {
                    ordered.push(slot);
                }
            }
        }
        let rest = members.iter().copied().filter(|slot| !placed.contains(slot));

        debug!(
            policy_members = ordered.len(),
            others = members.len() - ordered.len(),
            placement:? = self.terminal_placement;
            "Terminal stage reordered"
        );
        match self.terminal_placement {
            TerminalPlacement::Leading => ordered.into_iter().chain(rest).collect(),
            TerminalPlacement::Trailing => rest.chain(ordered).collect(),
        }
    }
}

/// Lays out every node of `registry` with `engine`.
pub fn assign_layout(registry: &mut Registry, engine: &LayoutEngine) -> Layout {
    let stage_count = registry.stage_count();
    engine.assign(registry.nodes_mut(), stage_count)
}

fn stage_x(stage: usize, stage_count: usize) -> f32 {
    if stage_count <= 1 {
        0.0
    } else {
        stage as f32 / (stage_count - 1) as f32
    }
}

fn unresolved_override(layout_override: &LayoutOverride) -> Diagnostic {
    Diagnostic::warning(format!(
        "layout override for {} matches no node",
        layout_override.target()
    ))
    .with_code(ErrorCode::E200)
    .with_help("the override was ignored; check the label spelling or the node id")
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use rivulet_core::table::StageTable;

    use super::*;
    use crate::structure::{RegistryOptions, build_registry};

    fn registry(names: &[&str], rows: &[&[&str]]) -> Registry {
        let table = StageTable::from_rows(names.iter().copied(), rows.iter().map(|row| row.iter()))
            .unwrap();
        build_registry(&table, &RegistryOptions::new()).unwrap()
    }

    fn terminal_order(registry: &Registry) -> Vec<(&str, usize)> {
        let terminal = registry.stage_count() - 1;
        let mut members: Vec<_> = registry
            .nodes()
            .iter()
            .filter(|node| node.stage() == terminal)
            .map(|node| (node.label(), node.rank()))
            .collect();
        members.sort_by_key(|(_, rank)| *rank);
        members
    }

    #[test]
    fn test_stage_x_is_even() {
        assert_eq!(stage_x(0, 1), 0.0);
        assert_eq!(stage_x(0, 3), 0.0);
        assert_eq!(stage_x(1, 3), 0.5);
        assert_eq!(stage_x(2, 3), 1.0);
    }

    #[test]
    fn test_default_layout() {
        let mut registry = registry(&["S0", "S1"], &[&["a", "x"], &["b", "x"], &["a", "y"]]);
        let layout = assign_layout(&mut registry, &LayoutEngine::new());

        // a=0 b=1 x=2 y=3
        assert_eq!(layout.len(), 4);
        let a = layout.position(NodeId::new(0)).unwrap();
        let b = layout.position(NodeId::new(1)).unwrap();
        let y = layout.position(NodeId::new(3)).unwrap();
        assert_approx_eq!(f32, a.x(), 0.0);
        assert_approx_eq!(f32, a.y(), 0.3);
        assert_approx_eq!(f32, b.y(), 0.7);
        assert_approx_eq!(f32, y.x(), 1.0);
        assert_approx_eq!(f32, y.y(), 0.7);
        assert_eq!(registry.nodes()[3].rank(), 1);
        assert!(layout.warnings().is_empty());
    }

    #[test]
    fn test_single_node_stage_is_centered() {
        let mut registry = registry(&["S0"], &[&["a"]]);
        let layout = assign_layout(&mut registry, &LayoutEngine::new());
        assert_eq!(layout.position(NodeId::new(0)), Some(Point::new(0.0, 0.5)));
    }

    #[test]
    fn test_positions_follow_node_order() {
        let mut registry = registry(&["S0", "S1"], &[&["a", "x"], &["b", "y"]]);
        let layout = assign_layout(&mut registry, &LayoutEngine::new());
        let ids: Vec<_> = layout.positions().map(|(id, _)| id.index()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_leading_terminal_policy() {
        let mut registry = registry(&["S0", "S1"], &[&["a", "L3"], &["a", "L1"], &["a", "L4"]]);
        let engine = LayoutEngine::new().with_ordering_policy(["L1", "L2", "L3"]);
        let layout = assign_layout(&mut registry, &engine);

        assert_eq!(terminal_order(&registry), vec![("L1", 0), ("L3", 1), ("L4", 2)]);
        let l1 = registry.lookup("L1").next().unwrap();
        assert_approx_eq!(f32, layout.position(l1).unwrap().y(), 0.3);
    }

    #[test]
    fn test_trailing_terminal_policy() {
        let mut registry = registry(&["S0", "S1"], &[&["a", "L3"], &["a", "L1"], &["a", "L4"]]);
        let engine = LayoutEngine::new()
            .with_ordering_policy(["L1", "L2", "L3"])
            .with_terminal_placement(TerminalPlacement::Trailing);
        assign_layout(&mut registry, &engine);

        assert_eq!(terminal_order(&registry), vec![("L4", 0), ("L1", 1), ("L3", 2)]);
    }

    #[test]
    fn test_policy_touches_only_terminal_stage() {
        let mut registry = registry(&["S0", "S1"], &[&["b", "y"], &["a", "x"]]);
        let engine = LayoutEngine::new().with_ordering_policy(["a", "x"]);
        assign_layout(&mut registry, &engine);

        let ranks: Vec<_> = registry.nodes().iter().map(|n| (n.label(), n.rank())).collect();
        assert_eq!(ranks, vec![("b", 0), ("a", 1), ("y", 1), ("x", 0)]);
    }

    #[test]
    fn test_override_is_isolated() {
        let mut plain = registry(&["S0", "S1"], &[&["a", "x"], &["b", "x"], &["a", "y"]]);
        let mut pinned = plain.clone();

        let before = assign_layout(&mut plain, &LayoutEngine::new());
        let engine =
            LayoutEngine::new().with_overrides(vec![LayoutOverride::label("x", 0.9, 0.1).unwrap()]);
        let after = assign_layout(&mut pinned, &engine);

        let x = pinned.lookup("x").next().unwrap();
        assert_eq!(after.position(x), Some(Point::new(0.9, 0.1)));
        for (id, point) in before.positions().filter(|(id, _)| *id != x) {
            assert_eq!(after.position(id), Some(point));
        }
    }

    #[test]
    fn test_unresolved_override_warns() {
        let mut registry = registry(&["S0"], &[&["a"]]);
        let engine = LayoutEngine::new().with_overrides(vec![
            LayoutOverride::label("missing", 0.5, 0.5).unwrap(),
            LayoutOverride::id(9, 0.5, 0.5).unwrap(),
        ]);
        let layout = assign_layout(&mut registry, &engine);

        assert_eq!(layout.len(), 1);
        assert_eq!(layout.warnings().len(), 2);
        assert_eq!(layout.warnings()[0].code(), Some(ErrorCode::E200));
        assert_eq!(
            layout.warnings()[0].message(),
            "layout override for label `missing` matches no node"
        );
    }

    #[test]
    fn test_empty_registry() {
        let mut registry = registry(&["S0", "S1"], &[]);
        let layout = assign_layout(
            &mut registry,
            &LayoutEngine::new().with_ordering_policy(["A"]),
        );
        assert!(layout.is_empty());
    }
}
