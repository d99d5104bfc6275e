//! JSON chart description.
//!
//! The document has four top-level arrays:
//!
//! ```json
//! {
//!   "stages": ["system", "feature"],
//!   "nodes": [{ "id": 0, "label": "a", "hover": "a", "stage": 0, "rank": 0, "x": 0.0, "y": 0.5 }],
//!   "links": [{ "source": 0, "target": 1, "value": 1.0 }],
//!   "overlay": [{ "label": "A", "count": 3, "x": 1.5, "y": -0.5, "size": 50.0, "color": 0 }]
//! }
//! ```
//!
//! Field order is fixed and every array keeps the chart's order, so equal
//! charts serialize to equal bytes.

use std::io::{self, Write};

use log::debug;
use serde::Serialize;

use rivulet_core::flow::Edge;

use super::{Error, Exporter};
use crate::{
    chart::{Chart, ChartNode},
    overlay::Bubble,
};

/// Writes charts as pretty-printed JSON.
///
/// # Examples
///
/// ```
/// use rivulet::ChartBuilder;
/// use rivulet::export::{Exporter, json::JsonExporter};
///
/// let builder = ChartBuilder::default();
/// let table = builder.parse("S0,S1\na,x\n").unwrap();
/// let chart = builder.build(&table, None).unwrap();
///
/// let mut exporter = JsonExporter::new(Vec::new());
/// exporter.export_chart(&chart).unwrap();
/// let json = String::from_utf8(exporter.into_inner()).unwrap();
/// assert!(json.contains("\"links\""));
/// ```
#[derive(Debug)]
pub struct JsonExporter<W: Write> {
    writer: W,
}

impl<W: Write> JsonExporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the exporter and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Exporter for JsonExporter<W> {
    fn export_chart(&mut self, chart: &Chart) -> Result<(), Error> {
        let document = ChartDocument::from(chart);
        serde_json::to_writer_pretty(&mut self.writer, &document).map_err(|err| {
            if err.is_io() {
                Error::Io(io::Error::from(err))
            } else {
                Error::Render(err.to_string())
            }
        })?;
        writeln!(self.writer).map_err(Error::Io)?;
        self.writer.flush().map_err(Error::Io)?;

        debug!(nodes = document.nodes.len(), links = document.links.len(); "Chart written as JSON");
        Ok(())
    }
}

#[derive(Serialize)]
struct ChartDocument<'a> {
    stages: &'a [String],
    nodes: Vec<NodeDocument<'a>>,
    links: Vec<LinkDocument>,
    overlay: Vec<BubbleDocument<'a>>,
}

impl<'a> From<&'a Chart> for ChartDocument<'a> {
    fn from(chart: &'a Chart) -> Self {
        Self {
            stages: chart.stages(),
            nodes: chart.nodes().iter().map(NodeDocument::from).collect(),
            links: chart.edges().iter().map(LinkDocument::from).collect(),
            overlay: chart.overlay().iter().map(BubbleDocument::from).collect(),
        }
    }
}

#[derive(Serialize)]
struct NodeDocument<'a> {
    id: usize,
    label: &'a str,
    hover: &'a str,
    stage: usize,
    rank: usize,
    x: f32,
    y: f32,
}

impl<'a> From<&'a ChartNode> for NodeDocument<'a> {
    fn from(node: &'a ChartNode) -> Self {
        Self {
            id: node.id().index(),
            label: node.label(),
            hover: node.hover(),
            stage: node.stage(),
            rank: node.rank(),
            x: node.position().x(),
            y: node.position().y(),
        }
    }
}

#[derive(Serialize)]
struct LinkDocument {
    source: usize,
    target: usize,
    value: f64,
}

impl From<&Edge> for LinkDocument {
    fn from(edge: &Edge) -> Self {
        Self {
            source: edge.source().index(),
            target: edge.target().index(),
            value: edge.weight(),
        }
    }
}

#[derive(Serialize)]
struct BubbleDocument<'a> {
    label: &'a str,
    count: usize,
    x: f32,
    y: f32,
    size: f32,
    color: usize,
}

impl<'a> From<&'a Bubble> for BubbleDocument<'a> {
    fn from(bubble: &'a Bubble) -> Self {
        Self {
            label: bubble.label(),
            count: bubble.count(),
            x: bubble.position().x(),
            y: bubble.position().y(),
            size: bubble.size(),
            color: bubble.color(),
        }
    }
}
