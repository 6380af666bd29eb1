// Copyright © 2024 RmdPrep. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document transformation and output.
//!
//! [`DocumentTransformer`] turns a [`SourceDocument`] into a
//! [`DerivedDocument`]; [`FileGenerator`] writes it next to its source and
//! [`DryRunGenerator`] only checks that it could.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::content::{DerivedDocument, SourceDocument, TitleMatcher};
use crate::core::config::Config;
use crate::core::error::{PrepError, Result};
use crate::core::traits::{Generator, Processor};
use crate::prefix::relative_prefix;
use crate::template::{HeaderRenderer, NOTICE_SEPARATOR};

/// Replaces `strip_suffix` at the end of `source`'s file name with
/// `output_suffix`, keeping the directory.
///
/// ```
/// use rmdprep::process::destination_path;
/// use std::path::{Path, PathBuf};
///
/// let dest = destination_path(
///     Path::new("open-science/a/b/doc.render.Rmd"),
///     ".render.Rmd",
///     "ed.Rmd",
/// )
/// .unwrap();
/// assert_eq!(dest, PathBuf::from("open-science/a/b/doced.Rmd"));
/// ```
pub fn destination_path(
    source: &Path,
    strip_suffix: &str,
    output_suffix: &str,
) -> Result<PathBuf> {
    let name = source
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            PrepError::path_error(
                "file name is missing or not valid UTF-8",
                source.to_path_buf(),
            )
        })?;
    let stem = name.strip_suffix(strip_suffix).ok_or_else(|| {
        PrepError::path_error(
            format!("file name does not end with '{}'", strip_suffix),
            source.to_path_buf(),
        )
    })?;
    Ok(source.with_file_name(format!("{}{}", stem, output_suffix)))
}

/// Converts source documents into derived documents.
#[derive(Debug)]
pub struct DocumentTransformer {
    root: PathBuf,
    matcher: TitleMatcher,
    renderer: HeaderRenderer,
    stylesheet: String,
    notice: String,
    strip_suffix: String,
    output_suffix: String,
}

impl DocumentTransformer {
    /// Builds a transformer from the run configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let renderer = match &config.header_template {
            Some(path) => HeaderRenderer::from_file(path)?,
            None => HeaderRenderer::new()?,
        };
        let matcher = TitleMatcher::new(config.title_marker)?;
        debug!(
            "title marker {:?}, header template of {} line(s)",
            matcher.marker(),
            renderer.source().lines().count()
        );
        Ok(Self {
            root: config.root_dir.clone(),
            matcher,
            renderer,
            stylesheet: config.stylesheet.clone(),
            notice: config.notice.clone(),
            strip_suffix: config.strip_suffix.clone(),
            output_suffix: config.output_suffix.clone(),
        })
    }

    /// Destination for a source path.
    pub fn destination_for(&self, source: &Path) -> Result<PathBuf> {
        destination_path(source, &self.strip_suffix, &self.output_suffix)
    }
}

impl Processor for DocumentTransformer {
    type Input = SourceDocument;
    type Output = DerivedDocument;

    fn process(&self, source: SourceDocument) -> Result<DerivedDocument> {
        let title = self.matcher.title_of(&source)?;
        let prefix = relative_prefix(source.path(), &self.root)?;
        let header = self.renderer.render(&title, &prefix, &self.stylesheet)?;
        let path = self.destination_for(source.path())?;
        debug!(
            "{}: title {:?}, prefix {:?}",
            source.path().display(),
            title,
            prefix
        );

        Ok(DerivedDocument {
            path,
            title,
            header,
            body: source.body().to_vec(),
            trailer: format!("{}{}", NOTICE_SEPARATOR, self.notice),
        })
    }
}

/// Writes derived documents to disk, replacing existing files.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileGenerator;

impl Generator for FileGenerator {
    fn generate(&self, document: &DerivedDocument) -> Result<()> {
        let path = &document.path;
        let file = File::create(path)
            .map_err(|e| PrepError::io_error(path.clone(), e))?;
        let mut writer = BufWriter::new(file);
        document
            .write_to(&mut writer)
            .and_then(|()| writer.flush())
            .map_err(|e| PrepError::io_error(path.clone(), e))
    }

    fn validate(&self, path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent)
                if !parent.as_os_str().is_empty() && !parent.is_dir() =>
            {
                Err(PrepError::path_error(
                    "destination directory does not exist",
                    path.to_path_buf(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Generator used for dry runs: validates, never writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunGenerator;

impl Generator for DryRunGenerator {
    fn generate(&self, document: &DerivedDocument) -> Result<()> {
        self.validate(&document.path)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        FileGenerator.validate(path)
    }
}
