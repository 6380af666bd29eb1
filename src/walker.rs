// Copyright © 2024 RmdPrep. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Source document discovery.
//!
//! Walks the processing root recursively and yields every file whose name
//! ends with the source suffix. Entries come back in the order the
//! filesystem lists them; nothing is sorted.

use std::path::{Path, PathBuf};

use log::debug;
use walkdir::{DirEntry, WalkDir};

use crate::core::config::Config;
use crate::core::error::{PrepError, Result};

/// Recursive finder for source documents.
#[derive(Debug, Clone)]
pub struct DocumentWalker {
    root: PathBuf,
    suffix: String,
}

impl DocumentWalker {
    /// Creates a walker over `root` selecting names ending in `suffix`.
    pub fn new<P: AsRef<Path>, S: Into<String>>(root: P, suffix: S) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            suffix: suffix.into(),
        }
    }

    /// Creates a walker from the run configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.root_dir, config.source_suffix.clone())
    }

    /// Directory being walked.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `true` when `name` selects a source document.
    pub fn matches_name(&self, name: &str) -> bool {
        name.ends_with(&self.suffix)
    }

    /// Lazily yields source document paths.
    ///
    /// Walk errors are yielded in place, so a caller stopping at the first
    /// `Err` leaves the rest of the tree unvisited.
    pub fn documents(&self) -> impl Iterator<Item = Result<PathBuf>> + '_ {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) if self.is_source(&entry) => {
                    debug!("found {}", entry.path().display());
                    Some(Ok(entry.into_path()))
                }
                Ok(_) => None,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    Some(Err(PrepError::io_error(path, e.into())))
                }
            })
    }

    fn is_source(&self, entry: &DirEntry) -> bool {
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        is_file
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.matches_name(name))
    }
}
