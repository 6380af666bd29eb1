//! # Template Rendering Module
//!
//! Renders the front-matter header placed at the top of every derived
//! document, and holds the provenance notice placed at the bottom.
//!
//! The header is a Handlebars template receiving three values:
//!
//! - `title`: the document title,
//! - `prefix`: the relative prefix (`../` repeated) leading to the site root,
//! - `stylesheet`: the stylesheet path from the configuration.
//!
//! HTML escaping is disabled: the output is YAML, and titles must be
//! written exactly as they appear in the source.

use crate::core::error::{PrepError, Result};
use handlebars::Handlebars;
use serde_json::json;
use std::fs;
use std::path::Path;

/// Name the header template is registered under.
pub const HEADER_TEMPLATE_NAME: &str = "header";

/// Built-in front-matter template for the `html_document` output format.
pub const DEFAULT_HEADER_TEMPLATE: &str = concat!(
    "---\n",
    "title: {{title}}\n",
    "output: \n",
    "  html_document:\n",
    "    theme: null\n",
    "    css: {{stylesheet}}\n",
    "    self_contained: false\n",
    "    highlight: null\n",
    "    include:\n",
    "      in_header: {{prefix}}_includes/head.html\n",
    "      before_body: \n",
    "        - {{prefix}}_includes/header.html\n",
    "        - {{prefix}}_includes/begin_content.html\n",
    "        - {{prefix}}_includes/toc.html\n",
    "        - {{prefix}}_includes/begin_post_content.html\n",
    "      after_body: \n",
    "        - {{prefix}}_includes/handle_page_title.html\n",
    "        - {{prefix}}_includes/end_post_content.html\n",
    "        - {{prefix}}_includes/end_content.html\n",
    "        - {{prefix}}_includes/footer.html\n",
    "---\n",
);

/// Inserted between the body and the notice.
pub const NOTICE_SEPARATOR: &str = "\n\n";

/// Provenance notice appended to every derived document.
///
/// The inline `r` expression is left for the R Markdown renderer to
/// evaluate; it is never interpolated here.
pub const DEFAULT_NOTICE: &str = "<br /><div class=\"warning\">This document is automatically generated after every `git push` action on the public repository `hlefebvr/hlefebvr.github.io` using rmarkdown and Github Actions. This ensures the reproducibility of our data manipulation. The last compilation was performed on the `r format(Sys.time(), '%d/%m/%y %H:%M:%S')`.</div>";

/// Handlebars renderer for the front-matter header.
pub struct HeaderRenderer {
    engine: Handlebars<'static>,
    source: String,
}

impl std::fmt::Debug for HeaderRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderRenderer")
            .field("source", &self.source)
            .finish()
    }
}

impl HeaderRenderer {
    /// Creates a renderer using the built-in template.
    pub fn new() -> Result<Self> {
        Self::from_template(DEFAULT_HEADER_TEMPLATE)
    }

    /// Creates a renderer from template text.
    pub fn from_template(template: &str) -> Result<Self> {
        let mut engine = Handlebars::new();
        engine.register_escape_fn(handlebars::no_escape);
        engine.set_strict_mode(true);
        engine
            .register_template_string(HEADER_TEMPLATE_NAME, template)
            .map_err(|e| {
                PrepError::template_error(
                    format!("Failed to register template: {}", e),
                    HEADER_TEMPLATE_NAME,
                )
            })?;

        Ok(Self {
            engine,
            source: template.to_string(),
        })
    }

    /// Creates a renderer from a template file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let template = fs::read_to_string(path)
            .map_err(|e| PrepError::io_error(path.to_path_buf(), e))?;
        Self::from_template(&template)
    }

    /// Renders the header for one document.
    pub fn render(
        &self,
        title: &str,
        prefix: &str,
        stylesheet: &str,
    ) -> Result<String> {
        let context = json!({
            "title": title,
            "prefix": prefix,
            "stylesheet": stylesheet,
        });
        self.engine
            .render(HEADER_TEMPLATE_NAME, &context)
            .map_err(|e| {
                PrepError::template_error(
                    format!("Failed to render header: {}", e),
                    HEADER_TEMPLATE_NAME,
                )
            })
    }

    /// Returns the template text in use.
    pub fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSS: &str = "/assets/css/design.css";

    #[test]
    fn test_default_header_shape() {
        let renderer = HeaderRenderer::new().unwrap();
        let header = renderer.render("My Title", "../../../", CSS).unwrap();

        assert!(header.starts_with("---\ntitle: My Title\noutput: \n"));
        assert!(header.ends_with("---\n"));
        assert!(header.contains("    css: /assets/css/design.css\n"));
        assert!(header
            .contains("      in_header: ../../../_includes/head.html\n"));
        assert!(header.contains("        - ../../../_includes/footer.html\n"));
        assert_eq!(header.matches("_includes/").count(), 9);
        assert_eq!(header.lines().count(), 21);
    }

    #[test]
    fn test_before_body_precedes_after_body() {
        let renderer = HeaderRenderer::new().unwrap();
        let header = renderer.render("T", "../", CSS).unwrap();

        let before = header.find("before_body:").unwrap();
        let toc = header.find("../_includes/toc.html").unwrap();
        let after = header.find("after_body:").unwrap();
        let footer = header.find("../_includes/footer.html").unwrap();
        assert!(before < toc && toc < after && after < footer);
    }

    #[test]
    fn test_title_is_not_escaped() {
        let renderer = HeaderRenderer::new().unwrap();
        let header = renderer
            .render("Q&A <draft> \"quoted\"", "../", CSS)
            .unwrap();
        assert!(header.contains("title: Q&A <draft> \"quoted\"\n"));
    }

    #[test]
    fn test_custom_template() {
        let renderer = HeaderRenderer::from_template(
            "---\ntitle: {{title}}\n\
             root: {{prefix}}\n---\n",
        )
        .unwrap();
        let header = renderer.render("Custom", "../../", CSS).unwrap();
        assert_eq!(header, "---\ntitle: Custom\nroot: ../../\n---\n");
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        let err = HeaderRenderer::from_template("{{#if title}}").unwrap_err();
        assert!(matches!(err, PrepError::Template { .. }));
    }

    #[test]
    fn test_unknown_variable_fails_in_strict_mode() {
        let renderer = HeaderRenderer::from_template("{{author}}").unwrap();
        assert!(renderer.render("T", "../", CSS).is_err());
    }

    #[test]
    fn test_notice_keeps_r_expression_literal() {
        assert!(DEFAULT_NOTICE
            .contains("`r format(Sys.time(), '%d/%m/%y %H:%M:%S')`"));
        assert!(DEFAULT_NOTICE.starts_with("<br /><div class=\"warning\">"));
        assert!(DEFAULT_NOTICE.ends_with("</div>"));
    }
}
