//! # Rivulet
//!
//! Rivulet turns a table of categorical stages into a Sankey flow diagram
//! description: one node per distinct value, one link per row-level
//! transition between adjacent stages, and a deterministic position for
//! every node. An optional tag table adds a bubble overlay.
//!
//! ## Pipeline
//!
//! ```text
//! CSV text ─load─► StageTable ─register─► Registry ─extract─► edges
//!                                              │
//!                                          layout ─► Chart ─export─► JSON
//! ```
//!
//! Every stage returns plain values; nothing is kept between runs, and the
//! same input with the same configuration always yields the same bytes.
//!
//! ## Usage
//!
//! ```
//! use rivulet::{ChartBuilder, config::AppConfig};
//!
//! let builder = ChartBuilder::new(AppConfig::default());
//! let table = builder.parse("system,feature\nNav,Maps\nAudio,Maps\nNav,Voice\n").unwrap();
//! let chart = builder.build(&table, None).unwrap();
//!
//! assert_eq!(chart.nodes().len(), 4);
//! assert_eq!(chart.edges().len(), 3);
//!
//! let json = builder.render_json(&chart).unwrap();
//! assert!(json.starts_with('{'));
//! ```

pub mod chart;
pub mod config;
pub mod export;
pub mod layout;
pub mod overlay;
pub mod structure;

mod error;

pub use rivulet_core::{flow, geometry, identifier, table};

pub use error::RivuletError;

use log::{debug, info, trace};

use rivulet_table::{load_stage_table, load_tag_table};

use chart::Chart;
use config::AppConfig;
use export::{Exporter, json::JsonExporter};
use overlay::TagTally;
use table::{StageTable, TagTable};

/// Builder for loading tables and producing charts.
///
/// # Examples
///
/// ```
/// use rivulet::{ChartBuilder, config::AppConfig};
///
/// let builder = ChartBuilder::new(AppConfig::default());
/// let table = builder.parse("S0,S1\na,x\n").expect("Failed to parse");
/// let tags = builder.parse_tags("tag\nA\nB\nA\n").expect("Failed to parse tags");
///
/// let chart = builder.build(&table, Some(&tags)).expect("Failed to build");
/// assert_eq!(chart.overlay().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ChartBuilder {
    config: AppConfig,
}

impl ChartBuilder {
    /// Create a new chart builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Load a stage table from delimited text.
    ///
    /// The source may hold any bytes; a load error carries it lossily
    /// decoded so its diagnostics can be rendered.
    ///
    /// # Errors
    ///
    /// Returns [`RivuletError::Config`] for invalid input settings and
    /// [`RivuletError::Load`] when the text is not a valid stage table.
    pub fn parse(&self, source: impl AsRef<[u8]>) -> Result<StageTable, RivuletError> {
        let source = source.as_ref();
        info!("Parsing stage table");
        let options = self.config.input().load_options().map_err(RivuletError::Config)?;

        let table = load_stage_table(source, &options)
            .map_err(|err| RivuletError::new_load_error(err, String::from_utf8_lossy(source)))?;

        debug!(stages = table.stage_count(), rows = table.row_count(); "Stage table parsed");
        Ok(table)
    }

    /// Load a tag table for the bubble overlay.
    ///
    /// # Errors
    ///
    /// Returns [`RivuletError::Config`] for invalid input settings and
    /// [`RivuletError::Load`] when the text cannot be read.
    pub fn parse_tags(&self, source: impl AsRef<[u8]>) -> Result<TagTable, RivuletError> {
        let source = source.as_ref();
        info!("Parsing tag table");
        let options = self.config.input().load_options().map_err(RivuletError::Config)?;

        let tags = load_tag_table(source, &options)
            .map_err(|err| RivuletError::new_load_error(err, String::from_utf8_lossy(source)))?;

        debug!(rows = tags.row_count(); "Tag table parsed");
        Ok(tags)
    }

    /// Run registration, edge extraction, layout and the overlay.
    ///
    /// # Errors
    ///
    /// Returns [`RivuletError::Config`] for an invalid configuration,
    /// [`RivuletError::Integrity`] when the collision policy rejects the
    /// table, and [`RivuletError::Layout`] if a node ends up unplaced.
    pub fn build(&self, table: &StageTable, tags: Option<&TagTable>) -> Result<Chart, RivuletError> {
        self.config.validate().map_err(RivuletError::Config)?;

        info!(stages = table.stage_count(), rows = table.row_count(); "Building chart");
        let mut registry = structure::build_registry(table, &self.config.registry_options())
            .map_err(RivuletError::Integrity)?;

        let mut edges = structure::extract_edges(table, &registry);
        if self.config.edges().aggregate_edges() {
            edges = structure::aggregate_edges(&edges);
        }
        info!(nodes = registry.len(), links = edges.len(); "Structure built");

        let engine = self.config.layout().engine();
        let layout = layout::assign_layout(&mut registry, &engine);
        trace!(layout:?; "Assigned layout");

        let bubbles = match tags {
            Some(tags) => overlay::arrange(&TagTally::tally(tags), self.config.overlay()),
            None => Vec::new(),
        };

        let chart = Chart::assemble(
            table,
            &registry,
            edges,
            &layout,
            bubbles,
            self.config.labels(),
        )?;
        info!(warnings = chart.warnings().len(); "Chart built");
        Ok(chart)
    }

    /// Render a chart as a pretty-printed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`RivuletError::Export`] if serialization fails.
    pub fn render_json(&self, chart: &Chart) -> Result<String, RivuletError> {
        let mut exporter = JsonExporter::new(Vec::new());
        exporter.export_chart(chart)?;

        let json = String::from_utf8(exporter.into_inner())
            .map_err(|err| RivuletError::Export(Box::new(err)))?;
        info!(bytes = json.len(); "JSON rendered");
        Ok(json)
    }
}
