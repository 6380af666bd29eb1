//! # Core Traits Module
//!
//! The two seams of the preprocessing pipeline:
//!
//! - [`Processor`]: turns one input into one output in memory
//! - [`Generator`]: persists a derived document
//!
//! The pipeline in [`crate::Preprocessor`] holds its generator as a boxed
//! trait object so that a dry run swaps the writer without touching the
//! transformation.

use std::path::Path;

use crate::content::DerivedDocument;
use crate::core::error::Result;

/// Core trait for in-memory document processing.
pub trait Processor: Send + Sync + std::fmt::Debug {
    /// The type of input content for the processor.
    type Input;
    /// The type of output content produced by the processor.
    type Output;

    /// Processes `input`.
    fn process(&self, input: Self::Input) -> Result<Self::Output>;
}

/// Trait for persisting derived documents.
pub trait Generator: Send + Sync + std::fmt::Debug {
    /// Writes `document` to `document.path`.
    fn generate(&self, document: &DerivedDocument) -> Result<()>;

    /// Checks that `path` can be written to without writing it.
    fn validate(&self, path: &Path) -> Result<()>;
}
