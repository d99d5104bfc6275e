//! Integration tests for the ChartBuilder API
//!
//! These tests run the whole pipeline through the public API.

use float_cmp::assert_approx_eq;

use rivulet::{
    ChartBuilder,
    config::{AppConfig, LayoutConfig},
    geometry::Point,
    identifier::NodeId,
    layout::{LayoutOverride, TerminalPlacement},
};

const FLOW: &str = "S0,S1\na,x\nb,x\na,y\n";

fn ranks_of_terminal(builder: &ChartBuilder, source: &str) -> Vec<String> {
    let table = builder.parse(source).expect("Failed to parse");
    let chart = builder.build(&table, None).expect("Failed to build");
    let terminal = chart.stages().len() - 1;

    let mut members: Vec<_> = chart
        .nodes()
        .iter()
        .filter(|node| node.stage() == terminal)
        .collect();
    members.sort_by_key(|node| node.rank());
    members.iter().map(|node| node.hover().to_string()).collect()
}

#[test]
fn test_builder_api_exists() {
    let _builder = ChartBuilder::default();
}

#[test]
fn test_nodes_and_links_of_small_table() {
    let builder = ChartBuilder::default();
    let table = builder.parse(FLOW).expect("Failed to parse");
    let chart = builder.build(&table, None).expect("Failed to build");

    let nodes: Vec<_> = chart
        .nodes()
        .iter()
        .map(|node| (node.hover(), node.id().index()))
        .collect();
    assert_eq!(nodes, vec![("a", 0), ("b", 1), ("x", 2), ("y", 3)]);

    let links: Vec<_> = chart
        .edges()
        .iter()
        .map(|edge| (edge.source().index(), edge.target().index()))
        .collect();
    assert_eq!(links, vec![(0, 2), (1, 2), (0, 3)]);
}

#[test]
fn test_terminal_policy_leading() {
    let config = AppConfig::default()
        .with_layout(LayoutConfig::default().with_ordering_policy(["L1", "L2", "L3"]));
    let builder = ChartBuilder::new(config);

    let order = ranks_of_terminal(&builder, "S0,S1\na,L3\na,L1\na,L4\n");
    assert_eq!(order, vec!["L1", "L3", "L4"]);
}

#[test]
fn test_terminal_policy_trailing() {
    let config = AppConfig::default().with_layout(
        LayoutConfig::default()
            .with_ordering_policy(["L1", "L2", "L3"])
            .with_terminal_placement(TerminalPlacement::Trailing),
    );
    let builder = ChartBuilder::new(config);

    let order = ranks_of_terminal(&builder, "S0,S1\na,L3\na,L1\na,L4\n");
    assert_eq!(order, vec!["L4", "L1", "L3"]);
}

#[test]
fn test_terminal_policy_skips_labels_merged_into_earlier_stages() {
    let source = "S0,S1\nL1,x\na,L3\na,L1\n";
    let config = |collisions: &str| -> AppConfig {
        toml::from_str(&format!(
            "[registry]\ncollisions = \"{collisions}\"\n[layout]\nordering_policy = [\"L1\", \"L3\"]\n"
        ))
        .expect("valid config")
    };

    let merged = ChartBuilder::new(config("merge"));
    assert_eq!(ranks_of_terminal(&merged, source), vec!["L3", "x"]);
    let table = merged.parse(source).expect("Failed to parse");
    let chart = merged.build(&table, None).expect("Failed to build");
    let l1 = chart.node(NodeId::new(0)).expect("node 0");
    assert_eq!((l1.hover(), l1.stage(), l1.rank()), ("L1", 0, 0));

    let separate = ChartBuilder::new(config("separate"));
    assert_eq!(ranks_of_terminal(&separate, source), vec!["L1", "L3", "x"]);
}

#[test]
fn test_override_moves_only_its_node() {
    let plain = ChartBuilder::default();
    let table = plain.parse(FLOW).expect("Failed to parse");
    let before = plain.build(&table, None).expect("Failed to build");

    let config = AppConfig::default().with_layout(
        LayoutConfig::default()
            .with_overrides(vec![LayoutOverride::label("x", 0.9, 0.1).expect("valid override")]),
    );
    let pinned = ChartBuilder::new(config);
    let after = pinned.build(&table, None).expect("Failed to build");

    let x = NodeId::new(2);
    assert_eq!(after.node(x).map(|node| node.position()), Some(Point::new(0.9, 0.1)));
    for node in before.nodes().iter().filter(|node| node.id() != x) {
        assert_eq!(after.node(node.id()).map(|n| n.position()), Some(node.position()));
    }
}

#[test]
fn test_positions_are_normalized() {
    let builder = ChartBuilder::default();
    let table = builder
        .parse("S0,S1,S2\na,x,p\nb,y,p\nc,,q\n")
        .expect("Failed to parse");
    let chart = builder.build(&table, None).expect("Failed to build");

    assert!(chart.nodes().iter().all(|node| node.position().is_normalized()));
    let first = chart.node(NodeId::new(0)).expect("node 0");
    assert_approx_eq!(f32, first.position().x(), 0.0);
    assert_approx_eq!(f32, first.position().y(), 0.3);
}

#[test]
fn test_full_pipeline_is_idempotent() {
    let config: AppConfig = toml::from_str(
        r#"
        [layout]
        ordering_policy = ["y"]

        [labels]
        visible_label_range = [1, 3]
        "#,
    )
    .expect("valid config");
    let tags = "tag,tag\nA,B\nA,\n";

    let render = || {
        let builder = ChartBuilder::new(config.clone());
        let table = builder.parse(FLOW).expect("Failed to parse");
        let tags = builder.parse_tags(tags).expect("Failed to parse tags");
        let chart = builder.build(&table, Some(&tags)).expect("Failed to build");
        builder.render_json(&chart).expect("Failed to render")
    };

    assert_eq!(render(), render());
}
