// Copyright © 2024 RmdPrep. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # RmdPrep Library
//!
//! RmdPrep is the pre-build step of an R Markdown static site. It walks a
//! content directory for `*.render.Rmd` documents and, for each one:
//!
//! 1. takes the title from the `# Title` first line,
//! 2. renders a YAML front-matter header whose `_includes/` paths are
//!    prefixed with enough `../` to reach the site root,
//! 3. appends a provenance notice whose inline `r` timestamp expression is
//!    left for the R Markdown renderer,
//! 4. writes the result next to the source as `*ed.Rmd`.
//!
//! ```rust,no_run
//! use rmdprep::{Config, Preprocessor};
//!
//! let report = Preprocessor::new(Config::with_root("open-science"))
//!     .unwrap()
//!     .run()
//!     .unwrap();
//! println!("{} documents written", report.processed.len());
//! ```

#![doc(html_root_url = "https://docs.rs/rmdprep")]

use log::{info, warn};
use std::path::{Path, PathBuf};

/// Core configuration, error and trait definitions.
pub mod core;

/// Provides command-line interface utilities.
pub mod cli;

/// Source and derived document types.
pub mod content;

/// Relative include prefix calculation.
pub mod prefix;

/// Document transformation and output generation.
pub mod process;

/// Front-matter template rendering.
pub mod template;

/// Source document discovery.
pub mod walker;

pub use crate::core::config::{Config, ConfigBuilder, ErrorPolicy};
pub use crate::core::error::{PrepError, Result};

use crate::content::SourceDocument;
use crate::core::traits::{Generator, Processor};
use crate::process::{DocumentTransformer, DryRunGenerator, FileGenerator};
use crate::walker::DocumentWalker;

/// A document that could not be processed in a continuing run.
#[derive(Debug)]
pub struct Failure {
    /// Source document, or the walked path for traversal errors.
    pub path: PathBuf,
    /// What went wrong.
    pub error: PrepError,
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Destinations written (or, in a dry run, that would be written).
    pub processed: Vec<PathBuf>,
    /// Failures collected under `ErrorPolicy::Continue`.
    pub failures: Vec<Failure>,
}

impl BuildReport {
    /// Returns `true` when no document failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The preprocessing pipeline: walker, transformer and generator.
#[derive(Debug)]
pub struct Preprocessor {
    config: Config,
    walker: DocumentWalker,
    transformer: DocumentTransformer,
    generator: Box<dyn Generator>,
}

impl Preprocessor {
    /// Creates a pipeline for `config`.
    ///
    /// The configuration is used as given; call [`Config::validate`] or go
    /// through [`ConfigBuilder`] to check it first.
    pub fn new(config: Config) -> Result<Self> {
        let generator: Box<dyn Generator> = if config.dry_run {
            Box::new(DryRunGenerator)
        } else {
            Box::new(FileGenerator)
        };
        Ok(Self {
            walker: DocumentWalker::from_config(&config),
            transformer: DocumentTransformer::from_config(&config)?,
            generator,
            config,
        })
    }

    /// Replaces the output generator.
    pub fn with_generator(mut self, generator: Box<dyn Generator>) -> Self {
        self.generator = generator;
        self
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Transforms and writes one source document, returning its destination.
    pub fn process_file(&self, path: &Path) -> Result<PathBuf> {
        let source = SourceDocument::read(path)?;
        let derived = self.transformer.process(source)?;
        self.generator.generate(&derived)?;

        if self.config.dry_run {
            println!("Would process {}", derived.path.display());
        } else {
            println!("Processed {}", derived.path.display());
        }
        info!("{} -> {}", path.display(), derived.path.display());
        Ok(derived.path)
    }

    /// Processes every source document under the root.
    ///
    /// Under `ErrorPolicy::Abort` the first failure is returned and no
    /// later document is touched. Under `ErrorPolicy::Continue` failures
    /// are collected in the report. A root that does not exist holds no
    /// documents and gives an empty report.
    pub fn run(&self) -> Result<BuildReport> {
        let mut report = BuildReport::default();
        if !self.walker.root().exists() {
            warn!(
                "{} does not exist, nothing to process",
                self.walker.root().display()
            );
            return Ok(report);
        }
        info!(
            "Processing {} (suffix {:?})",
            self.walker.root().display(),
            self.config.source_suffix
        );

        for entry in self.walker.documents() {
            let path = match entry {
                Ok(path) => path,
                Err(error) => {
                    let path = error
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.walker.root().to_path_buf());
                    self.record_failure(&mut report, path, error)?;
                    continue;
                }
            };
            match self.process_file(&path) {
                Ok(destination) => report.processed.push(destination),
                Err(error) => self.record_failure(&mut report, path, error)?,
            }
        }

        info!(
            "{} document(s) processed, {} failed",
            report.processed.len(),
            report.failures.len()
        );
        Ok(report)
    }

    fn record_failure(
        &self,
        report: &mut BuildReport,
        path: PathBuf,
        error: PrepError,
    ) -> Result<()> {
        match self.config.on_error {
            ErrorPolicy::Abort => Err(error),
            ErrorPolicy::Continue => {
                warn!("skipping {}: {}", path.display(), error);
                report.failures.push(Failure { path, error });
                Ok(())
            }
        }
    }
}

/// Processes `root` with the default configuration.
pub fn process_directory<P: AsRef<Path>>(root: P) -> Result<BuildReport> {
    Preprocessor::new(Config::with_root(root))?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_process_directory() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("open-science");
        fs::create_dir_all(root.join("a"))?;
        fs::write(root.join("a").join("doc.render.Rmd"), "# Doc\nText\n")?;

        let report = process_directory(&root)?;

        let output_file = root.join("a").join("doced.Rmd");
        assert_eq!(report.processed, vec![output_file.clone()]);
        assert!(report.is_success());
        let output = fs::read_to_string(output_file)?;
        assert!(output.starts_with("---\ntitle: Doc\n"));
        assert!(output.contains("../../_includes/head.html"));
        Ok(())
    }

    #[test]
    fn test_abort_policy_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.render.Rmd"), "no title\n")
            .unwrap();

        let err = process_directory(temp_dir.path()).unwrap_err();
        assert!(err.is_malformed_title());
        assert!(!temp_dir.path().join("baded.Rmd").exists());
    }

    #[test]
    fn test_continue_policy_collects_failures() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.render.Rmd"), "no title\n")
            .unwrap();
        fs::write(temp_dir.path().join("good.render.Rmd"), "# Good\n").unwrap();

        let config = Config {
            on_error: ErrorPolicy::Continue,
            ..Config::with_root(temp_dir.path())
        };
        let report = Preprocessor::new(config).unwrap().run().unwrap();

        assert_eq!(report.processed, vec![temp_dir.path().join("gooded.Rmd")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].path,
            temp_dir.path().join("bad.render.Rmd")
        );
        assert!(report.failures[0].error.is_malformed_title());
        assert!(!report.is_success());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("doc.render.Rmd"), "# Doc\n").unwrap();

        let config = Config {
            dry_run: true,
            ..Config::with_root(temp_dir.path())
        };
        let preprocessor = Preprocessor::new(config).unwrap();
        assert!(preprocessor.config().dry_run);
        let report = preprocessor.run().unwrap();

        assert_eq!(report.processed, vec![temp_dir.path().join("doced.Rmd")]);
        assert!(!temp_dir.path().join("doced.Rmd").exists());
    }

    #[test]
    fn test_missing_root_is_an_empty_run() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("open-science");

        let report = process_directory(&root).unwrap();

        assert!(report.processed.is_empty());
        assert!(report.is_success());
        assert!(!root.exists());
    }

    #[test]
    fn test_custom_generator() {
        #[derive(Debug)]
        struct Refusing;

        impl Generator for Refusing {
            fn generate(
                &self,
                document: &content::DerivedDocument,
            ) -> Result<()> {
                Err(PrepError::path_error("read-only", document.path.clone()))
            }

            fn validate(&self, path: &Path) -> Result<()> {
                Err(PrepError::path_error("read-only", path.to_path_buf()))
            }
        }

        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("doc.render.Rmd"), "# Doc\n").unwrap();

        let preprocessor = Preprocessor::new(Config::with_root(temp_dir.path()))
            .unwrap()
            .with_generator(Box::new(Refusing));
        let err = preprocessor.run().unwrap_err();
        assert!(matches!(err, PrepError::Path { .. }));
    }
}
