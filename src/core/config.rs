//! # Configuration Module
//!
//! Configuration for the preprocessor. Every field has a default, so running
//! with no configuration at all processes `open-science/**/*.render.Rmd`.
//!
//! Values are layered in this order, later sources winning:
//!
//! 1. built-in defaults,
//! 2. a TOML file (`with_file`),
//! 3. environment variables carrying a prefix (`with_env_prefix`),
//! 4. explicit overrides (`with_override`), used by the CLI flags.
//!
//! A root directory named by any layer must exist. When no layer names
//! one, the default `open-science` may be missing and the run is simply
//! empty.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rmdprep::core::config::{ConfigBuilder, ErrorPolicy};
//!
//! let config = ConfigBuilder::new()
//!     .with_file("rmdprep.toml")
//!     .with_env_prefix("RMDPREP_")
//!     .with_override("on_error", "continue")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.on_error, ErrorPolicy::Continue);
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};
use toml::Value as TomlValue;

use crate::core::error::{PrepError, Result};
use crate::template::DEFAULT_NOTICE;

/// Default processing root.
pub const DEFAULT_ROOT_DIR: &str = "open-science";
/// File name suffix selecting source documents.
pub const DEFAULT_SOURCE_SUFFIX: &str = ".render.Rmd";
/// Suffix removed from a source name to build the destination name.
pub const DEFAULT_STRIP_SUFFIX: &str = ".render.Rmd";
/// Suffix appended in place of the stripped one.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "ed.Rmd";
/// Character that must open the title line.
pub const DEFAULT_TITLE_MARKER: char = '#';
/// Stylesheet referenced by the generated `html_document` block.
pub const DEFAULT_STYLESHEET: &str = "/assets/css/design.css";

/// Keys accepted by files, environment variables and overrides.
pub const CONFIG_KEYS: [&str; 10] = [
    "root_dir",
    "source_suffix",
    "strip_suffix",
    "output_suffix",
    "title_marker",
    "stylesheet",
    "header_template",
    "notice",
    "on_error",
    "dry_run",
];

/// What to do when a document fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the run at the first failing document.
    #[default]
    Abort,
    /// Record the failure and keep processing the remaining documents.
    Continue,
}

/// Settings for one preprocessing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory that is walked and against which include prefixes
    /// are computed.
    pub root_dir: PathBuf,
    /// Only files whose name ends with this suffix are processed.
    pub source_suffix: String,
    /// Suffix replaced when deriving the destination name.
    pub strip_suffix: String,
    /// Replacement for `strip_suffix`.
    pub output_suffix: String,
    /// Leading character of the title line.
    pub title_marker: char,
    /// Stylesheet path written into the header.
    pub stylesheet: String,
    /// Optional Handlebars file replacing the built-in header template.
    pub header_template: Option<PathBuf>,
    /// Literal text appended after the body.
    pub notice: String,
    /// Failure handling across documents.
    pub on_error: ErrorPolicy,
    /// Validate and report without writing destinations.
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            source_suffix: DEFAULT_SOURCE_SUFFIX.to_string(),
            strip_suffix: DEFAULT_STRIP_SUFFIX.to_string(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            title_marker: DEFAULT_TITLE_MARKER,
            stylesheet: DEFAULT_STYLESHEET.to_string(),
            header_template: None,
            notice: DEFAULT_NOTICE.to_string(),
            on_error: ErrorPolicy::default(),
            dry_run: false,
        }
    }
}

impl Config {
    /// Creates a default configuration rooted at `root_dir`.
    pub fn with_root<P: AsRef<Path>>(root_dir: P) -> Self {
        Self {
            root_dir: root_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_config(self)
    }
}

/// Builds a `Config` from a file, the environment and explicit overrides.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_file: Option<PathBuf>,
    env_prefix: Option<String>,
    overrides: Vec<(String, TomlValue)>,
}

impl ConfigBuilder {
    /// Initialises a new `ConfigBuilder` instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a TOML configuration file.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Reads `<prefix><KEY>` environment variables as overrides.
    ///
    /// `RMDPREP_ROOT_DIR=site` sets `root_dir` when the prefix is `RMDPREP_`.
    pub fn with_env_prefix<S: Into<String>>(
        mut self,
        prefix: S,
    ) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Overrides a single key. Overrides apply in insertion order.
    pub fn with_override<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<TomlValue>,
    {
        self.overrides.push((key.into(), value.into()));
        self
    }

    /// Builds and validates the final configuration.
    ///
    /// The root directory is only required to exist when one of the
    /// layers set `root_dir`.
    pub fn build(self) -> Result<Config> {
        let mut root_named = false;
        let mut config = match &self.config_file {
            Some(path) => {
                let table = load_from_file(path)?;
                root_named |= table.contains_key("root_dir");
                config_from_table(table, path)?
            }
            None => Config::default(),
        };

        if let Some(prefix) = &self.env_prefix {
            let applied = apply_env_overrides(&mut config, prefix)?;
            root_named |= applied.iter().any(|key| key == "root_dir");
        }

        root_named |= self.overrides.iter().any(|(key, _)| key == "root_dir");
        apply_overrides(&mut config, &self.overrides)?;

        if root_named {
            validate_config(&config)?;
        } else {
            validate_settings(&config)?;
        }

        Ok(config)
    }
}

fn load_from_file(path: &Path) -> Result<toml::Table> {
    let content = fs::read_to_string(path).map_err(|e| {
        PrepError::config_error(
            format!("Failed to read config file: {}", e),
            Some(path.to_path_buf()),
        )
    })?;

    toml::from_str(&content).map_err(|e| {
        PrepError::config_error(
            format!("Failed to parse config file: {}", e),
            Some(path.to_path_buf()),
        )
    })
}

fn config_from_table(table: toml::Table, path: &Path) -> Result<Config> {
    TomlValue::Table(table).try_into().map_err(|e| {
        PrepError::config_error(
            format!("Invalid config file: {}", e),
            Some(path.to_path_buf()),
        )
    })
}

/// Applies `<prefix><KEY>` variables and returns the keys applied.
///
/// Variables outside the prefix are never decoded, so a non-UTF-8
/// environment entry elsewhere is ignored. Prefixed variables naming no
/// known key, or holding non-UTF-8 values, are skipped with a warning.
fn apply_env_overrides(
    config: &mut Config,
    prefix: &str,
) -> Result<Vec<String>> {
    let mut applied = Vec::new();
    for (key, value) in env::vars_os() {
        let Some(stripped) =
            key.to_str().and_then(|key| key.strip_prefix(prefix))
        else {
            continue;
        };
        let config_key = stripped.trim_start_matches('_').to_lowercase();
        if !CONFIG_KEYS.contains(&config_key.as_str()) {
            warn!("ignoring {}{}: unknown configuration key", prefix, stripped);
            continue;
        }
        let Some(value) = value.to_str() else {
            warn!("ignoring {}{}: value is not valid UTF-8", prefix, stripped);
            continue;
        };
        apply_config_value(config, &config_key, value)?;
        applied.push(config_key);
    }
    Ok(applied)
}

fn apply_overrides(
    config: &mut Config,
    overrides: &[(String, TomlValue)],
) -> Result<()> {
    for (key, value) in overrides {
        let value = match value {
            TomlValue::String(s) => s.clone(),
            other => other.to_string(),
        };
        apply_config_value(config, key, &value)?;
    }
    Ok(())
}

fn apply_config_value(
    config: &mut Config,
    key: &str,
    value: &str,
) -> Result<()> {
    match key {
        "root_dir" => config.root_dir = PathBuf::from(value),
        "source_suffix" => config.source_suffix = value.to_string(),
        "strip_suffix" => config.strip_suffix = value.to_string(),
        "output_suffix" => config.output_suffix = value.to_string(),
        "title_marker" => {
            let mut chars = value.chars();
            config.title_marker = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(PrepError::config_error(
                        format!(
                            "Invalid title_marker value '{}': \
                             expected a single character",
                            value
                        ),
                        None,
                    ))
                }
            };
        }
        "stylesheet" => config.stylesheet = value.to_string(),
        "header_template" => {
            config.header_template = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }
        "notice" => config.notice = value.to_string(),
        "on_error" => {
            config.on_error = match value.to_lowercase().as_str() {
                "abort" => ErrorPolicy::Abort,
                "continue" => ErrorPolicy::Continue,
                _ => {
                    return Err(PrepError::config_error(
                        format!(
                            "Invalid on_error value '{}': \
                             expected 'abort' or 'continue'",
                            value
                        ),
                        None,
                    ))
                }
            };
        }
        "dry_run" => {
            config.dry_run = value.parse().map_err(|e| {
                PrepError::config_error(
                    format!("Invalid dry_run value '{}': {}", value, e),
                    None,
                )
            })?;
        }
        _ => {
            return Err(PrepError::config_error(
                format!("Unknown configuration key: {}", key),
                None,
            ));
        }
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    validate_root(&config.root_dir)?;
    validate_settings(config)
}

fn validate_root(root: &Path) -> Result<()> {
    if !root.exists() {
        return Err(PrepError::config_error(
            format!("root directory does not exist: {}", root.display()),
            Some(root.to_path_buf()),
        ));
    }
    if !root.is_dir() {
        return Err(PrepError::config_error(
            format!("root path is not a directory: {}", root.display()),
            Some(root.to_path_buf()),
        ));
    }
    Ok(())
}

fn validate_settings(config: &Config) -> Result<()> {

    for (name, value) in [
        ("source_suffix", &config.source_suffix),
        ("strip_suffix", &config.strip_suffix),
        ("output_suffix", &config.output_suffix),
    ] {
        if value.is_empty() {
            return Err(PrepError::config_error(
                format!("{} must not be empty", name),
                None,
            ));
        }
    }

    if !config.source_suffix.ends_with(&config.strip_suffix) {
        return Err(PrepError::config_error(
            format!(
                "strip_suffix '{}' is not a suffix of source_suffix '{}'",
                config.strip_suffix, config.source_suffix
            ),
            None,
        ));
    }

    if config.output_suffix == config.strip_suffix {
        return Err(PrepError::config_error(
            "output_suffix must differ from strip_suffix",
            None,
        ));
    }

    if let Some(template) = &config.header_template {
        if !template.is_file() {
            return Err(PrepError::config_error(
                format!("header template not found: {}", template.display()),
                Some(template.clone()),
            ));
        }
    }

    Ok(())
}
