//! # Error Handling for RmdPrep
//!
//! This module defines the error type shared by every stage of the
//! preprocessor. The `thiserror` crate is used to derive `Display` and
//! `Error` so that each variant carries the path it relates to.

use std::path::PathBuf;
use thiserror::Error;

/// A unified result type for the RmdPrep library.
pub type Result<T> = std::result::Result<T, PrepError>;

/// The main error type for RmdPrep.
///
/// `MalformedTitle` is the only error the preprocessor raises on its own.
/// The other variants wrap failures of the filesystem, the configuration
/// layer or the header template with the path they occurred on.
#[derive(Error, Debug)]
pub enum PrepError {
    /// The first line of a source document is not `<marker> <title>`.
    #[error("Title not found in {path:?}: first line is {line:?}")]
    MalformedTitle {
        /// Source document that failed validation.
        path: PathBuf,
        /// The offending first line, without its terminator.
        line: String,
    },

    /// IO error encountered while walking, reading or writing.
    #[error("File IO error at `{path:?}`: {source}")]
    Io {
        /// Path associated with the IO error.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A document path could not be expressed relative to the root.
    #[error("Path error: {message} ({path:?}).")]
    Path {
        /// Description of the path problem.
        message: String,
        /// Path that could not be relativized.
        path: PathBuf,
    },

    /// Error related to configuration loading or validation.
    #[error("Configuration error: {message}.")]
    Config {
        /// Detailed description of the configuration error.
        message: String,
        /// Optional path of the configuration file or directory at fault.
        path: Option<PathBuf>,
    },

    /// The front-matter template failed to register or render.
    #[error("Template rendering error: {message} in template `{template}`.")]
    Template {
        /// Description of the template error.
        message: String,
        /// Name of the template involved.
        template: String,
    },
}

impl From<std::io::Error> for PrepError {
    /// Converts a bare IO error into `PrepError::Io` with an empty path.
    fn from(source: std::io::Error) -> Self {
        PrepError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl PrepError {
    /// Creates a `MalformedTitle` error for `path`.
    pub fn malformed_title<S: Into<String>>(path: PathBuf, line: S) -> Self {
        PrepError::MalformedTitle {
            path,
            line: line.into(),
        }
    }

    /// Wraps an IO error with the path it occurred on.
    pub fn io_error(path: PathBuf, source: std::io::Error) -> Self {
        PrepError::Io { path, source }
    }

    /// Creates a `Path` error.
    pub fn path_error<S: Into<String>>(message: S, path: PathBuf) -> Self {
        PrepError::Path {
            message: message.into(),
            path,
        }
    }

    /// Creates a `Config` error with an optional path.
    pub fn config_error<S: Into<String>>(
        message: S,
        path: Option<PathBuf>,
    ) -> Self {
        PrepError::Config {
            message: message.into(),
            path,
        }
    }

    /// Creates a `Template` error for the named template.
    pub fn template_error<S: Into<String>, T: Into<String>>(
        message: S,
        template: T,
    ) -> Self {
        PrepError::Template {
            message: message.into(),
            template: template.into(),
        }
    }

    /// Returns the document path this error refers to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            PrepError::MalformedTitle { path, .. }
            | PrepError::Io { path, .. }
            | PrepError::Path { path, .. } => Some(path.as_path()),
            PrepError::Config { path, .. } => path.as_deref(),
            PrepError::Template { .. } => None,
        }
    }

    /// Returns `true` for the malformed-title validation failure.
    pub fn is_malformed_title(&self) -> bool {
        matches!(self, PrepError::MalformedTitle { .. })
    }
}
