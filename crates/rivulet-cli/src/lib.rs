//! CLI logic for the Rivulet chart tool.
//!
//! Reads a stage table (and optionally a tag table), runs the Rivulet
//! pipeline and writes the JSON chart description.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{info, warn};

use rivulet::{ChartBuilder, RivuletError};

/// Run the Rivulet CLI application
///
/// # Errors
///
/// Returns `RivuletError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed input tables
/// - Label collisions rejected by the configuration
/// - Layout and export errors
pub fn run(args: &Args) -> Result<(), RivuletError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing stage table"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read(&args.input)?;
    let tag_source = args.tags.as_ref().map(fs::read).transpose()?;

    let builder = ChartBuilder::new(app_config);
    let table = builder.parse(&source)?;
    let tags = tag_source
        .as_ref()
        .map(|tag_source| builder.parse_tags(tag_source))
        .transpose()?;

    // The table loaded, so the source is valid UTF-8 and this borrows.
    let text = String::from_utf8_lossy(&source);
    let chart = builder
        .build(&table, tags.as_ref())
        .map_err(|err| err.with_source(&*text))?;

    for report in error_adapter::render_warnings(chart.warnings(), &text) {
        warn!("{report}");
    }

    let json = builder.render_json(&chart)?;
    fs::write(&args.output, json)?;

    info!(output_file = args.output; "Chart exported successfully");

    Ok(())
}
