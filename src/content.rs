//! # Document Content Module
//!
//! In-memory representations of the documents the preprocessor handles.
//!
//! - [`SourceDocument`]: an input file split into lines, each line keeping
//!   its terminator so the body is copied byte for byte.
//! - [`TitleMatcher`]: recognises the `<marker> <title>` first line.
//! - [`DerivedDocument`]: header, body and notice ready to be written.

use crate::core::error::{PrepError, Result};
use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// An input document and its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    path: PathBuf,
    lines: Vec<String>,
}

impl SourceDocument {
    /// Reads the document at `path`. The file must be valid UTF-8.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| PrepError::io_error(path.to_path_buf(), e))?;
        Ok(Self::from_text(path, &text))
    }

    /// Builds a document from text already in memory.
    pub fn from_text<P: AsRef<Path>>(path: P, text: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines: text.split_inclusive('\n').map(String::from).collect(),
        }
    }

    /// Path the document was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All lines, terminators included.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The first line without its terminator, or `None` for an empty file.
    pub fn title_line(&self) -> Option<&str> {
        self.lines.first().map(|line| strip_terminator(line))
    }

    /// Every line after the title line.
    pub fn body(&self) -> &[String] {
        self.lines.get(1..).unwrap_or_default()
    }
}

/// Removes a trailing `\n` or `\r\n`.
pub fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Matches `<marker> <title>` and captures the title.
#[derive(Debug, Clone)]
pub struct TitleMatcher {
    marker: char,
    pattern: Regex,
}

impl TitleMatcher {
    /// Creates a matcher for lines opening with `marker` and a space.
    pub fn new(marker: char) -> Result<Self> {
        let source = format!("^{} (.+)$", regex::escape(&marker.to_string()));
        let pattern = Regex::new(&source).map_err(|e| {
            PrepError::config_error(
                format!("Invalid title marker '{}': {}", marker, e),
                None,
            )
        })?;
        Ok(Self { marker, pattern })
    }

    /// Marker character this matcher expects.
    pub fn marker(&self) -> char {
        self.marker
    }

    /// Returns the title carried by `line`, taken verbatim after `marker `.
    pub fn extract<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(strip_terminator(line))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Extracts the title of `document` or fails with `MalformedTitle`.
    pub fn title_of(&self, document: &SourceDocument) -> Result<String> {
        let line = document.title_line().unwrap_or_default();
        self.extract(line).map(String::from).ok_or_else(|| {
            PrepError::malformed_title(document.path().to_path_buf(), line)
        })
    }
}

/// A transformed document, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedDocument {
    /// Destination path.
    pub path: PathBuf,
    /// Title extracted from the source.
    pub title: String,
    /// Rendered front matter.
    pub header: String,
    /// Source lines after the title line.
    pub body: Vec<String>,
    /// Trailing text, separator included.
    pub trailer: String,
}

impl DerivedDocument {
    /// Writes header, body and trailer to `writer` in that order.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.header.as_bytes())?;
        for line in &self.body {
            writer.write_all(line.as_bytes())?;
        }
        writer.write_all(self.trailer.as_bytes())
    }

    /// The full output text.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(
            self.header.len()
                + self.body.iter().map(String::len).sum::<usize>()
                + self.trailer.len(),
        );
        text.push_str(&self.header);
        for line in &self.body {
            text.push_str(line);
        }
        text.push_str(&self.trailer);
        text
    }
}
