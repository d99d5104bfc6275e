//! Configuration types for Rivulet charts.
//!
//! Every section implements [`serde::Deserialize`] and falls back to its
//! defaults for anything left out, so an empty document is a valid
//! configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section below.
//! - [`InputConfig`] - How delimited text is read.
//! - [`RegistryConfig`] - How cell values become nodes.
//! - [`EdgesConfig`] - Whether parallel edges are collapsed.
//! - [`LayoutConfig`] - Band rule, terminal ordering and manual overrides.
//! - [`LabelsConfig`] - Which node labels are displayed.
//! - [`OverlayConfig`] - Placement and sizing of the bubble overlay.
//!
//! # Example
//!
//! ```
//! # use rivulet::config::AppConfig;
//! let config: AppConfig = toml::from_str(
//!     r#"
//!     [layout]
//!     ordering_policy = ["A", "B"]
//!
//!     [labels]
//!     visible_label_range = [75, 96]
//!     "#,
//! )
//! .unwrap();
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.labels().visible_label_range(), Some((75, 96)));
//! ```

use serde::Deserialize;

use rivulet_table::LoadOptions;

use crate::{
    layout::{BandRule, LayoutEngine, LayoutOverride, TerminalPlacement},
    structure::{CollisionPolicy, RegistryOptions},
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    input: InputConfig,
    registry: RegistryConfig,
    edges: EdgesConfig,
    layout: LayoutConfig,
    labels: LabelsConfig,
    overlay: OverlayConfig,
}

impl AppConfig {
    pub fn input(&self) -> &InputConfig {
        &self.input
    }

    pub fn registry(&self) -> &RegistryConfig {
        &self.registry
    }

    pub fn edges(&self) -> &EdgesConfig {
        &self.edges
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn labels(&self) -> &LabelsConfig {
        &self.labels
    }

    pub fn overlay(&self) -> &OverlayConfig {
        &self.overlay
    }

    pub fn with_input(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    pub fn with_registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_edges(mut self, edges: EdgesConfig) -> Self {
        self.edges = edges;
        self
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_labels(mut self, labels: LabelsConfig) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_overlay(mut self, overlay: OverlayConfig) -> Self {
        self.overlay = overlay;
        self
    }

    /// Registry options: the collision policy plus, when the terminal stage
    /// is restricted, the ordering policy as its allow-list.
    pub fn registry_options(&self) -> RegistryOptions {
        let options = RegistryOptions::new().with_collisions(self.registry.collisions);
        match (&self.layout.ordering_policy, self.registry.restrict_terminal) {
            (Some(policy), true) => options.with_terminal_allow_list(policy.iter().cloned()),
            _ => options,
        }
    }

    /// Checks the constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending setting.
    pub fn validate(&self) -> Result<(), String> {
        self.input.load_options()?;
        self.labels.validate()?;
        self.overlay.validate()
    }
}

/// How delimited text is read.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    delimiter: char,
    has_headers: bool,
    trim: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_headers: true,
            trim: true,
        }
    }
}

impl InputConfig {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Converts the section into loader options.
    ///
    /// # Errors
    ///
    /// Returns an error if the delimiter is not a single ASCII character.
    pub fn load_options(&self) -> Result<LoadOptions, String> {
        if !self.delimiter.is_ascii() {
            return Err(format!(
                "Invalid delimiter in config: `{}` is not an ASCII character",
                self.delimiter
            ));
        }
        Ok(LoadOptions::default()
            .with_delimiter(self.delimiter as u8)
            .with_headers(self.has_headers)
            .with_trim(self.trim))
    }
}

/// How cell values become nodes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    collisions: CollisionPolicy,
    restrict_terminal: bool,
}

impl RegistryConfig {
    pub fn with_collisions(mut self, collisions: CollisionPolicy) -> Self {
        self.collisions = collisions;
        self
    }

    /// Uses the layout ordering policy as an allow-list for the terminal stage.
    pub fn with_restrict_terminal(mut self, restrict_terminal: bool) -> Self {
        self.restrict_terminal = restrict_terminal;
        self
    }

    pub fn collisions(&self) -> CollisionPolicy {
        self.collisions
    }

    pub fn restrict_terminal(&self) -> bool {
        self.restrict_terminal
    }
}

/// Edge extraction settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EdgesConfig {
    aggregate_edges: bool,
}

impl EdgesConfig {
    pub fn with_aggregate_edges(mut self, aggregate_edges: bool) -> Self {
        self.aggregate_edges = aggregate_edges;
        self
    }

    /// Returns whether parallel edges are summed into one weighted edge.
    pub fn aggregate_edges(&self) -> bool {
        self.aggregate_edges
    }
}

/// Node placement settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    band: BandRule,
    ordering_policy: Option<Vec<String>>,
    terminal_placement: TerminalPlacement,
    overrides: Vec<LayoutOverride>,
}

impl LayoutConfig {
    pub fn with_band(mut self, band: BandRule) -> Self {
        self.band = band;
        self
    }

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

    pub fn band(&self) -> BandRule {
        self.band
    }

    pub fn ordering_policy(&self) -> Option<&[String]> {
        self.ordering_policy.as_deref()
    }

    pub fn overrides(&self) -> &[LayoutOverride] {
        &self.overrides
    }

    /// Builds the [`LayoutEngine`] this section describes.
    pub fn engine(&self) -> LayoutEngine {
        let engine = LayoutEngine::new()
            .with_band_rule(self.band)
            .with_terminal_placement(self.terminal_placement)
            .with_overrides(self.overrides.clone());
        match &self.ordering_policy {
            Some(policy) => engine.with_ordering_policy(policy.iter().cloned()),
            None => engine,
        }
    }
}

/// Node label display settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelsConfig {
    visible_label_range: Option<[usize; 2]>,
}

impl LabelsConfig {
    /// Shows labels only for node ids in `lo..hi`.
    pub fn with_visible_label_range(mut self, lo: usize, hi: usize) -> Self {
        self.visible_label_range = Some([lo, hi]);
        self
    }

    /// Returns the half-open id window `(lo, hi)` of visible labels, if limited.
    pub fn visible_label_range(&self) -> Option<(usize, usize)> {
        self.visible_label_range.map(|[lo, hi]| (lo, hi))
    }

    /// Returns whether the node with id index `id` shows its label.
    pub fn is_visible(&self, id: usize) -> bool {
        self.visible_label_range
            .is_none_or(|[lo, hi]| (lo..hi).contains(&id))
    }

    fn validate(&self) -> Result<(), String> {
        match self.visible_label_range {
            Some([lo, hi]) if lo > hi => Err(format!(
                "Invalid visible_label_range in config: start {lo} is after end {hi}"
            )),
            _ => Ok(()),
        }
    }
}

/// Placement and sizing of the bubble overlay.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    max_bubbles: usize,
    center: [f32; 2],
    radius_range: [f32; 2],
    size_range: [f32; 2],
    palette_size: usize,
    sort_by_count: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            max_bubbles: 50,
            center: [1.5, 0.5],
            radius_range: [1.0, 1.5],
            size_range: [15.0, 50.0],
            palette_size: 5,
            sort_by_count: false,
        }
    }
}

impl OverlayConfig {
    pub fn with_max_bubbles(mut self, max_bubbles: usize) -> Self {
        self.max_bubbles = max_bubbles;
        self
    }

    pub fn with_sort_by_count(mut self, sort_by_count: bool) -> Self {
        self.sort_by_count = sort_by_count;
        self
    }

    pub fn with_palette_size(mut self, palette_size: usize) -> Self {
        self.palette_size = palette_size;
        self
    }

    pub fn max_bubbles(&self) -> usize {
        self.max_bubbles
    }

    /// Returns the `(x, y)` centre of the half-circle.
    pub fn center(&self) -> (f32, f32) {
        (self.center[0], self.center[1])
    }

    /// Returns the radius of the first and of the last bubble.
    pub fn radius_range(&self) -> (f32, f32) {
        (self.radius_range[0], self.radius_range[1])
    }

    /// Returns the marker size for the smallest and the largest count.
    pub fn size_range(&self) -> (f32, f32) {
        (self.size_range[0], self.size_range[1])
    }

    pub fn palette_size(&self) -> usize {
        self.palette_size
    }

    pub fn sort_by_count(&self) -> bool {
        self.sort_by_count
    }

    fn validate(&self) -> Result<(), String> {
        let [r0, r1] = self.radius_range;
        if !(r0.is_finite() && r1.is_finite() && 0.0 <= r0 && r0 <= r1) {
            return Err(format!(
                "Invalid radius_range in config: [{r0}, {r1}] must be ordered and non-negative"
            ));
        }
        let [s0, s1] = self.size_range;
        if !(s0.is_finite() && s1.is_finite() && 0.0 <= s0 && s0 <= s1) {
            return Err(format!(
                "Invalid size_range in config: [{s0}, {s1}] must be ordered and non-negative"
            ));
        }
        if !self.center.iter().all(|c| c.is_finite()) {
            return Err("Invalid center in config: coordinates must be finite".to_string());
        }
        if self.palette_size == 0 {
            return Err("Invalid palette_size in config: must be at least 1".to_string());
        }
        Ok(())
    }
}
