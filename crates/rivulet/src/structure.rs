//! Graph structure built from a stage table.
//!
//! This module turns the loaded [`StageTable`](crate::table::StageTable)
//! into the two artifacts the layout and the renderer consume:
//!
//! - [`Registry`] - distinct cell values with stable, first-seen identities
//! - [`Edge`](crate::flow::Edge) lists - row-level transitions between
//!   adjacent stages, see [`extract_edges`] and [`aggregate_edges`]

mod edges;
mod registry;

pub use edges::{aggregate_edges, extract_edges};
pub use registry::{CollisionPolicy, Registry, RegistryOptions, build_registry};
