//! Node registration.
//!
//! Every distinct cell value becomes one node. Stages are scanned in declared
//! order and rows top to bottom; the first occurrence of a value fixes its id
//! and its stage. Identity assignment is therefore a pure function of the
//! table and the [`RegistryOptions`].
//!
//! # Labels shared across stages
//!
//! With the default [`CollisionPolicy::Merge`], a value that shows up again in
//! a later stage is *not* registered a second time: both stages share one node
//! and the diagram gains a cross-stage junction. The other policies make that
//! visible ([`CollisionPolicy::Warn`]), fatal ([`CollisionPolicy::Reject`]) or
//! impossible ([`CollisionPolicy::Separate`]).

use std::collections::{HashMap, HashSet};

use log::{debug, info, trace};
use serde::Deserialize;

use rivulet_core::{flow::Node, identifier::NodeId, table::StageTable};
use rivulet_table::error::{Diagnostic, DiagnosticCollector, DiagnosticError, ErrorCode};

/// What to do when one label appears in more than one stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Share one node between the stages, silently.
    #[default]
    Merge,

    /// Share one node and emit an `E100` warning per collision.
    Warn,

    /// Fail registration with an `E100` error per collision.
    Reject,

    /// Key identities by stage and label; equal text in two stages gives two nodes.
    Separate,
}

/// Options for [`build_registry`].
///
/// # Examples
///
/// ```
/// use rivulet::structure::{CollisionPolicy, RegistryOptions};
///
/// let options = RegistryOptions::new()
///     .with_collisions(CollisionPolicy::Warn)
///     .with_terminal_allow_list(["A", "B"]);
/// assert_eq!(options.collisions(), CollisionPolicy::Warn);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegistryOptions {
    collisions: CollisionPolicy,
    terminal_allow_list: Option<HashSet<String>>,
}

impl RegistryOptions {
    /// Creates options with the merge policy and no terminal filtering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cross-stage collision policy.
    pub fn with_collisions(mut self, collisions: CollisionPolicy) -> Self {
        self.collisions = collisions;
        self
    }

    /// Restricts the terminal stage to the given labels.
    ///
    /// Terminal cells outside the list are neither registered nor resolvable
    /// in the terminal stage, so rows flowing into them produce no edge.
    pub fn with_terminal_allow_list<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terminal_allow_list = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the cross-stage collision policy.
    pub fn collisions(&self) -> CollisionPolicy {
        self.collisions
    }

    /// Returns the labels the terminal stage is restricted to, if any.
    pub fn terminal_allow_list(&self) -> Option<&HashSet<String>> {
        self.terminal_allow_list.as_ref()
    }
}

/// Label lookup, either shared by all stages or kept per stage.
#[derive(Debug, Clone)]
enum LabelIndex {
    Shared(HashMap<String, NodeId>),
    PerStage(Vec<HashMap<String, NodeId>>),
}

impl LabelIndex {
    fn get(&self, stage: usize, label: &str) -> Option<NodeId> {
        match self {
            LabelIndex::Shared(index) => index.get(label).copied(),
            LabelIndex::PerStage(stages) => stages.get(stage)?.get(label).copied(),
        }
    }

    fn insert(&mut self, stage: usize, label: &str, id: NodeId) {
        match self {
            LabelIndex::Shared(index) => {
                index.insert(label.to_string(), id);
            }
            LabelIndex::PerStage(stages) => {
                stages[stage].insert(label.to_string(), id);
            }
        }
    }
}

/// The registered nodes of one run and the label index that resolves cells to them.
///
/// Ids are dense: node `i` of [`Registry::nodes`] carries `NodeId::new(i)`.
#[derive(Debug, Clone)]
pub struct Registry {
    nodes: Vec<Node>,
    index: LabelIndex,
    stage_count: usize,
    terminal_allow_list: Option<HashSet<String>>,
    warnings: Vec<Diagnostic>,
}

/// Registers every distinct cell of `table`.
///
/// # Errors
///
/// Returns a [`DiagnosticError`] with one `E100` error per collision when the
/// policy is [`CollisionPolicy::Reject`].
///
/// # Examples
///
/// ```
/// use rivulet::structure::{RegistryOptions, build_registry};
/// use rivulet::table::StageTable;
///
/// let table = StageTable::from_rows(
///     ["S0", "S1"],
///     [vec!["a", "x"], vec!["b", "x"], vec!["a", "y"]],
/// )
/// .unwrap();
/// let registry = build_registry(&table, &RegistryOptions::new()).unwrap();
///
/// let labels: Vec<_> = registry.nodes().iter().map(|n| n.label()).collect();
/// assert_eq!(labels, vec!["a", "b", "x", "y"]);
/// ```
pub fn build_registry(
    table: &StageTable,
    options: &RegistryOptions,
) -> Result<Registry, DiagnosticError> {
    Registry::build(table, options)
}

impl Registry {
    /// See [`build_registry`].
    pub fn build(table: &StageTable, options: &RegistryOptions) -> Result<Self, DiagnosticError> {
        let stage_count = table.stage_count();
        let mut registry = Registry {
            nodes: Vec::new(),
            index: match options.collisions {
                CollisionPolicy::Separate => LabelIndex::PerStage(vec![HashMap::new(); stage_count]),
                _ => LabelIndex::Shared(HashMap::new()),
            },
            stage_count,
            terminal_allow_list: options.terminal_allow_list.clone(),
            warnings: Vec::new(),
        };

        let mut first_rows: Vec<usize> = Vec::new();
        let mut reported: HashSet<(NodeId, usize)> = HashSet::new();
        let mut collector = DiagnosticCollector::new();

        for (stage_index, stage) in table.stages().iter().enumerate() {
            for (row, label) in stage.present() {
                if !registry.admits(stage_index, label) {
                    trace!(label, stage = stage_index; "Cell excluded by terminal allow-list");
                    continue;
                }

                let Some(id) = registry.index.get(stage_index, label) else {
                    let id = NodeId::new(registry.nodes.len());
                    registry.index.insert(stage_index, label, id);
                    registry.nodes.push(Node::new(id, label, stage_index));
                    first_rows.push(row);
                    continue;
                };

                let first_stage = registry.nodes[id.index()].stage();
                if first_stage == stage_index || !reported.insert((id, stage_index)) {
                    continue;
                }

                debug!(label, first_stage, stage = stage_index; "Label shared across stages");
                if let Some(diagnostic) = collision_diagnostic(
                    options.collisions,
                    table,
                    label,
                    (first_stage, first_rows[id.index()]),
                    (stage_index, row),
                ) {
                    collector.emit(diagnostic);
                }
            }
        }

        registry.warnings = collector.finish()?;

        info!(
            nodes = registry.nodes.len(),
            stages = stage_count,
            warnings = registry.warnings.len();
            "Node registry built"
        );
        Ok(registry)
    }

    /// Returns the nodes in id order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Returns the node with `id`, if registered.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Returns the number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when no node was registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of stages of the table the registry was built from.
    pub fn stage_count(&self) -> usize {
        self.stage_count
    }

    /// Resolves the cell text `label` found in `stage` to its node.
    ///
    /// Returns `None` for unknown labels and for terminal cells excluded by
    /// the allow-list.
    pub fn resolve(&self, stage: usize, label: &str) -> Option<NodeId> {
        if !self.admits(stage, label) {
            return None;
        }
        self.index.get(stage, label)
    }

    /// Returns every node carrying `label`, in id order.
    ///
    /// Holds at most one id unless the registry keeps stages separate.
    pub fn lookup<'a>(&'a self, label: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.nodes
            .iter()
            .filter(move |node| node.label() == label)
            .map(Node::id)
    }

    /// Iterates over the `label → id` mapping in id order.
    pub fn index(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.nodes.iter().map(|node| (node.label(), node.id()))
    }

    /// Returns the warnings emitted during registration.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    fn admits(&self, stage: usize, label: &str) -> bool {
        match &self.terminal_allow_list {
            Some(allowed) if stage + 1 == self.stage_count => allowed.contains(label),
            _ => true,
        }
    }
}

fn collision_diagnostic(
    policy: CollisionPolicy,
    table: &StageTable,
    label: &str,
    (first_stage, first_row): (usize, usize),
    (stage, row): (usize, usize),
) -> Option<Diagnostic> {
    let stage_name = |index: usize| table.stage(index).map_or("", |stage| stage.name());
    let message = format!(
        "label `{label}` appears in stage `{}` and stage `{}`",
        stage_name(first_stage),
        stage_name(stage)
    );

    let diagnostic = match policy {
        CollisionPolicy::Merge | CollisionPolicy::Separate => return None,
        CollisionPolicy::Warn => Diagnostic::warning(message)
            .with_help("both cells share one node; set `collisions = \"separate\"` to keep them apart"),
        CollisionPolicy::Reject => Diagnostic::error(message)
            .with_help("rename one of the cells, or allow merging with `collisions = \"merge\"`"),
    };

    Some(
        diagnostic
            .with_code(ErrorCode::E100)
            .with_optional_label(table.row_span(row), "reused here")
            .with_optional_secondary_label(table.row_span(first_row), "first seen here"),
    )
}


#[cfg(test)]
mod proptest_tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    fn table_strategy() -> impl Strategy<Value = StageTable> {
        (1usize..5).prop_flat_map(|width| {
            prop::collection::vec(prop::collection::vec("[a-e]?", width), 0..25).prop_map(
                move |rows| {
                    let names: Vec<String> = (0..width).map(|i| format!("S{i}")).collect();
                    StageTable::from_rows(names, rows).expect("rows match the stage count")
                },
            )
        })
    }

    /// Each distinct label must own exactly one id under the merge policy.
    fn check_one_id_per_label(table: StageTable) -> Result<(), TestCaseError> {
        let registry = build_registry(&table, &RegistryOptions::new())
            .map_err(|err| TestCaseError::fail(err.to_string()))?;

        let distinct: HashSet<&str> = table
            .stages()
            .iter()
            .flat_map(|stage| stage.present().map(|(_, label)| label))
            .collect();
        prop_assert_eq!(registry.len(), distinct.len());

        for (position, node) in registry.nodes().iter().enumerate() {
            prop_assert_eq!(node.id().index(), position);
            prop_assert_eq!(registry.lookup(node.label()).count(), 1);
        }
        Ok(())
    }

    /// Building twice must give identical identities.
    fn check_registration_is_reproducible(table: StageTable) -> Result<(), TestCaseError> {
        let first = build_registry(&table, &RegistryOptions::new())
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let second = build_registry(&table, &RegistryOptions::new())
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assert_eq!(first.nodes(), second.nodes());
        Ok(())
    }

    proptest! {
        #[test]
        fn one_id_per_label(table in table_strategy()) {
            check_one_id_per_label(table)?;
        }

        #[test]
        fn registration_is_reproducible(table in table_strategy()) {
            check_registration_is_reproducible(table)?;
        }
    }
}
