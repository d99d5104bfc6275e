//! Example: Building a chart from an in-memory table
//!
//! This example builds a stage table in code instead of loading CSV, pins
//! the terminal stage order, and prints the resulting positions.

use rivulet::{
    ChartBuilder,
    config::{AppConfig, LayoutConfig, OverlayConfig},
    layout::LayoutOverride,
    table::{StageTable, TagTable},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Building chart from an in-memory table...\n");

    let table = StageTable::from_rows(
        ["system", "feature", "benefit"],
        [
            vec!["Connectivity", "Remote climate", "A"],
            vec!["Connectivity", "Voice assistant", "C"],
            vec!["Information", "Navigation", "C"],
            vec!["Controls", "Haptic wheel", "E"],
            vec!["Controls", "Touch display", ""],
        ],
    )?;

    let tags = TagTable::new(vec![
        vec![Some("A".to_string()), Some("C".to_string())],
        vec![Some("C".to_string()), Some("E".to_string())],
    ]);

    let config = AppConfig::default()
        .with_layout(
            LayoutConfig::default()
                .with_ordering_policy(["A", "B", "C", "D", "E"])
                .with_overrides(vec![LayoutOverride::label("Navigation", 0.5, 0.95)?]),
        )
        .with_overlay(OverlayConfig::default().with_sort_by_count(true));

    let builder = ChartBuilder::new(config);
    let chart = builder.build(&table, Some(&tags))?;

    for node in chart.nodes() {
        let position = node.position();
        println!(
            "  [{}] {:<16} stage {} rank {} at ({:.2}, {:.2})",
            node.id(),
            node.hover(),
            node.stage(),
            node.rank(),
            position.x(),
            position.y()
        );
    }
    println!("\n{} links, {} bubbles", chart.edges().len(), chart.overlay().len());

    let json = builder.render_json(&chart)?;
    println!("\nJSON is {} bytes", json.len());

    Ok(())
}
