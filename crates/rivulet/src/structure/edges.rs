//! Row-level transitions between adjacent stages.

use indexmap::IndexMap;
use log::{debug, trace};

use rivulet_core::{flow::Edge, identifier::NodeId, table::StageTable};

use super::Registry;

/// Extracts one unit-weight edge per row and pair of adjacent stages.
///
/// For stage pairs `(k, k + 1)` in order, and rows top to bottom within each
/// pair, an edge is produced when both cells of the row are present and
/// resolve to a node. Cells are paired by row, so an empty cell breaks the
/// flow at that point instead of shifting later values up.
///
/// Duplicates are kept: the number of edges between two nodes is the flow
/// volume between them.
///
/// # Examples
///
/// ```
/// use rivulet::structure::{RegistryOptions, build_registry, extract_edges};
/// use rivulet::table::StageTable;
///
/// let table = StageTable::from_rows(
///     ["S0", "S1"],
///     [vec!["a", "x"], vec!["b", "x"], vec!["a", "y"]],
/// )
/// .unwrap();
/// let registry = build_registry(&table, &RegistryOptions::new()).unwrap();
///
/// let edges: Vec<_> = extract_edges(&table, &registry)
///     .iter()
///     .map(|edge| (edge.source().index(), edge.target().index()))
///     .collect();
/// assert_eq!(edges, vec![(0, 2), (1, 2), (0, 3)]);
/// ```
pub fn extract_edges(table: &StageTable, registry: &Registry) -> Vec<Edge> {
    let mut edges = Vec::new();

    for stage in 1..table.stage_count() {
        let before = edges.len();
        for row in 0..table.row_count() {
            let (Some(from), Some(to)) = (table.cell(stage - 1, row), table.cell(stage, row)) else {
                continue;
            };
            match (registry.resolve(stage - 1, from), registry.resolve(stage, to)) {
                (Some(source), Some(target)) => edges.push(Edge::new(source, target)),
                _ => trace!(row, stage; "Transition dropped, endpoint not registered"),
            }
        }
        trace!(stage, edges = edges.len() - before; "Stage pair linked");
    }

    debug!(edges = edges.len(); "Edges extracted");
    edges
}

/// Collapses parallel edges into one edge per `(source, target)` pair.
///
/// Weights are summed; the result keeps the order in which each pair first
/// occurs in `edges`.
pub fn aggregate_edges(edges: &[Edge]) -> Vec<Edge> {
    let mut weights: IndexMap<(NodeId, NodeId), f64> = IndexMap::with_capacity(edges.len());
    for edge in edges {
        *weights.entry(edge.endpoints()).or_insert(0.0) += edge.weight();
    }

    debug!(before = edges.len(), after = weights.len(); "Edges aggregated");
    weights
        .into_iter()
        .map(|((source, target), weight)| Edge::with_weight(source, target, weight))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{RegistryOptions, build_registry};

    fn pairs(edges: &[Edge]) -> Vec<(usize, usize)> {
        edges
            .iter()
            .map(|edge| (edge.source().index(), edge.target().index()))
            .collect()
    }

    fn table(rows: &[&[&str]]) -> StageTable {
        StageTable::from_rows(["S0", "S1", "S2"], rows.iter().map(|row| row.iter())).unwrap()
    }

    #[test]
    fn test_edges_follow_stage_pairs_then_rows() {
        let table = table(&[&["a", "x", "p"], &["b", "y", "p"]]);
        let registry = build_registry(&table, &RegistryOptions::new()).unwrap();

        // a=0 b=1 x=2 y=3 p=4
        assert_eq!(
            pairs(&extract_edges(&table, &registry)),
            vec![(0, 2), (1, 3), (2, 4), (3, 4)]
        );
    }

    #[test]
    fn test_empty_cells_break_the_flow() {
        let table = table(&[&["a", "", "p"], &["b", "y", ""], &["", "z", "q"]]);
        let registry = build_registry(&table, &RegistryOptions::new()).unwrap();

        // a=0 b=1 y=2 z=3 p=4 q=5
        assert_eq!(
            pairs(&extract_edges(&table, &registry)),
            vec![(1, 2), (3, 5)]
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        let table = table(&[&["a", "x", ""], &["a", "x", ""]]);
        let registry = build_registry(&table, &RegistryOptions::new()).unwrap();
        let edges = extract_edges(&table, &registry);

        assert_eq!(pairs(&edges), vec![(0, 1), (0, 1)]);
        assert!(edges.iter().all(|edge| edge.weight() == 1.0));
    }

    #[test]
    fn test_excluded_terminal_cells_produce_no_edges() {
        let table = table(&[&["a", "x", "p"], &["b", "y", "q"]]);
        let options = RegistryOptions::new().with_terminal_allow_list(["q"]);
        let registry = build_registry(&table, &options).unwrap();

        // a=0 b=1 x=2 y=3 q=4
        assert_eq!(
            pairs(&extract_edges(&table, &registry)),
            vec![(0, 2), (1, 3), (3, 4)]
        );
    }

    #[test]
    fn test_single_stage_has_no_edges() {
        let table = StageTable::from_rows(["S0"], [vec!["a"], vec!["b"]]).unwrap();
        let registry = build_registry(&table, &RegistryOptions::new()).unwrap();
        assert!(extract_edges(&table, &registry).is_empty());
    }

    #[test]
    fn test_aggregate_sums_in_first_occurrence_order() {
        let a = NodeId::new(0);
        let b = NodeId::new(1);
        let c = NodeId::new(2);
        let edges = vec![
            Edge::new(a, c),
            Edge::new(b, c),
            Edge::new(a, c),
            Edge::with_weight(b, c, 2.5),
        ];

        assert_eq!(
            aggregate_edges(&edges),
            vec![Edge::with_weight(a, c, 2.0), Edge::with_weight(b, c, 3.5)]
        );
    }
}
