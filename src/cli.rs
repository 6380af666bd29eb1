// Copyright © 2024 RmdPrep. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command-line interface for RmdPrep
//!
//! With no arguments the binary processes `open-science/` with the default
//! configuration. Flags only override configuration values.
//!
//! # Examples
//!
//! ```
//! use rmdprep::cli;
//!
//! let matches = cli::build().get_matches_from(vec![
//!     "rmdprep",
//!     "--root",
//!     "site/content",
//!     "--keep-going",
//! ]);
//!
//! assert!(matches.get_flag("keep-going"));
//! ```

use crate::core::config::{Config, ConfigBuilder};
use crate::core::error::Result;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::debug;
use std::path::PathBuf;

/// The current version of RmdPrep, as defined in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix of environment variables read as configuration.
pub const ENV_PREFIX: &str = "RMDPREP_";

/// Builds the RmdPrep command-line interface.
pub fn build() -> Command {
    debug!("Building CLI command structure");

    Command::new("rmdprep")
        .author("RmdPrep Contributors")
        .about(
            "Injects front matter and include paths into \
             *.render.Rmd documents.",
        )
        .version(VERSION)
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .help("Directory to process [default: open-science]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML configuration file")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("keep-going")
                .short('k')
                .long("keep-going")
                .help(
                    "Report malformed documents and continue \
                     instead of stopping",
                )
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Check documents without writing any output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose mode (-v, -vv)")
                .action(ArgAction::Count),
        )
}

/// Resolves the run configuration from parsed arguments.
///
/// Sources are layered as file, then `RMDPREP_*` variables, then flags.
pub fn config_from_matches(matches: &ArgMatches) -> Result<Config> {
    let mut builder = ConfigBuilder::new().with_env_prefix(ENV_PREFIX);

    if let Some(path) = matches.get_one::<PathBuf>("config") {
        builder = builder.with_file(path);
    }
    if let Some(root) = matches.get_one::<PathBuf>("root") {
        builder = builder.with_override("root_dir", root.display().to_string());
    }
    if matches.get_flag("keep-going") {
        builder = builder.with_override("on_error", "continue");
    }
    if matches.get_flag("dry-run") {
        builder = builder.with_override("dry_run", true);
    }

    builder.build()
}

/// Default log filter for the `-v` count.
pub fn log_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ErrorPolicy;
    use tempfile::TempDir;

    fn get_matches(args: Vec<&str>) -> ArgMatches {
        build().get_matches_from(args)
    }

    #[test]
    fn test_no_arguments() {
        let matches = get_matches(vec!["rmdprep"]);
        assert!(matches.get_one::<PathBuf>("root").is_none());
        assert!(matches.get_one::<PathBuf>("config").is_none());
        assert!(!matches.get_flag("keep-going"));
        assert!(!matches.get_flag("dry-run"));
        assert_eq!(matches.get_count("verbose"), 0);
    }

    #[test]
    fn test_all_flags() {
        let matches = get_matches(vec![
            "rmdprep", "-r", "content", "-c", "rmdprep.toml", "-k", "-n", "-vv",
        ]);
        assert_eq!(
            matches.get_one::<PathBuf>("root").unwrap(),
            &PathBuf::from("content")
        );
        assert_eq!(
            matches.get_one::<PathBuf>("config").unwrap(),
            &PathBuf::from("rmdprep.toml")
        );
        assert!(matches.get_flag("keep-going"));
        assert!(matches.get_flag("dry-run"));
        assert_eq!(matches.get_count("verbose"), 2);
    }

    #[test]
    fn test_config_from_matches() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().display().to_string();
        let matches = get_matches(vec![
            "rmdprep",
            "--root",
            root.as_str(),
            "--keep-going",
            "--dry-run",
        ]);

        let config = config_from_matches(&matches).unwrap();
        assert_eq!(config.root_dir, temp_dir.path());
        assert_eq!(config.on_error, ErrorPolicy::Continue);
        assert!(config.dry_run);
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("rmdprep.toml");
        std::fs::write(
            &file,
            "root_dir = 'nowhere'\nstylesheet = '/x.css'\n",
        )
        .unwrap();
        let root = temp_dir.path().display().to_string();
        let file_arg = file.display().to_string();

        let matches = get_matches(vec![
            "rmdprep",
            "-c",
            file_arg.as_str(),
            "-r",
            root.as_str(),
        ]);
        let config = config_from_matches(&matches).unwrap();
        assert_eq!(config.root_dir, temp_dir.path());
        assert_eq!(config.stylesheet, "/x.css");
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0), "warn");
        assert_eq!(log_level(1), "info");
        assert_eq!(log_level(5), "debug");
    }
}
