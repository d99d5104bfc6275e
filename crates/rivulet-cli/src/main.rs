//! Rivulet CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use rivulet_cli::{
    Args,
    error_adapter::{render, to_reportables},
};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Rivulet");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = rivulet_cli::run(&args) {
        for report in to_reportables(&err) {
            error!("{}", render(&*report));
        }
        process::exit(1);
    }

    info!("Completed successfully");
}
