// Copyright © 2024 RmdPrep. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # RmdPrep CLI
//!
//! Entry point of the `rmdprep` binary. It initialises the logger, resolves
//! the configuration and runs the preprocessor over the content root.

use anyhow::{bail, Context};
use env_logger::Env;
use log::info;
use rmdprep::{cli, Preprocessor};

/// Runs the preprocessor with the configuration taken from the command line.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, if a document is
/// malformed or cannot be read or written, or, with `--keep-going`, if any
/// document failed.
fn run() -> Result<(), anyhow::Error> {
    let matches = cli::build().get_matches();

    env_logger::Builder::from_env(
        Env::default().default_filter_or(cli::log_level(
            matches.get_count("verbose"),
        )),
    )
    .init();
    info!("Starting RmdPrep v{}", cli::VERSION);

    let config = cli::config_from_matches(&matches)
        .context("Failed to load RmdPrep configuration")?;
    let root = config.root_dir.clone();

    let preprocessor = Preprocessor::new(config)
        .context("Failed to initialise the preprocessor")?;
    let report = preprocessor
        .run()
        .with_context(|| format!("Failed to process {}", root.display()))?;

    if !report.is_success() {
        for failure in &report.failures {
            eprintln!("{}: {}", failure.path.display(), failure.error);
        }
        bail!(
            "{} of {} document(s) failed",
            report.failures.len(),
            report.failures.len() + report.processed.len()
        );
    }

    info!("RmdPrep completed successfully");
    Ok(())
}

/// The main entry point for the RmdPrep CLI.
fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
