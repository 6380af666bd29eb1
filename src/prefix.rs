//! Relative prefix calculation.
//!
//! Derived documents reference shared fragments under `_includes/` at the
//! site root, one level above the processing root. A document nested `n`
//! directories below the root therefore needs `n + 1` parent hops.

use crate::core::error::{PrepError, Result};
use std::path::{Component, Path};

/// One parent-directory hop.
pub const PARENT_SEGMENT: &str = "../";

/// Number of directories between `base` and the directory containing `path`.
///
/// A file directly inside `base` has depth 0.
pub fn directory_depth(path: &Path, base: &Path) -> Result<usize> {
    let relative = path.strip_prefix(base).map_err(|_| {
        PrepError::path_error(
            format!("not under root {}", base.display()),
            path.to_path_buf(),
        )
    })?;

    let parent = relative.parent().unwrap_or_else(|| Path::new(""));
    let mut depth = 0usize;
    for component in parent.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            _ => {
                return Err(PrepError::path_error(
                    "unexpected path component below root",
                    path.to_path_buf(),
                ))
            }
        }
    }
    Ok(depth)
}

/// Builds the `../` prefix leading from `path`'s directory to the site root.
///
/// # Examples
///
/// ```
/// use rmdprep::prefix::relative_prefix;
/// use std::path::Path;
///
/// let prefix = relative_prefix(
///     Path::new("open-science/a/b/doc.render.Rmd"),
///     Path::new("open-science"),
/// )
/// .unwrap();
/// assert_eq!(prefix, "../../../");
/// ```
pub fn relative_prefix(path: &Path, base: &Path) -> Result<String> {
    let depth = directory_depth(path, base)?;
    Ok(PARENT_SEGMENT.repeat(depth + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_level_file() {
        let prefix = relative_prefix(
            Path::new("open-science/doc.render.Rmd"),
            Path::new("open-science"),
        )
        .unwrap();
        assert_eq!(prefix, "../");
    }

    #[test]
    fn test_nested_file() {
        let prefix = relative_prefix(
            Path::new("open-science/a/b/doc.render.Rmd"),
            Path::new("open-science"),
        )
        .unwrap();
        assert_eq!(prefix, "../../../");
    }

    #[test]
    fn test_prefix_length_tracks_depth() {
        let base = Path::new("/site/root");
        for (path, depth) in [
            ("/site/root/x.render.Rmd", 0),
            ("/site/root/a/x.render.Rmd", 1),
            ("/site/root/a/b/c/d/x.render.Rmd", 4),
        ] {
            let path = Path::new(path);
            assert_eq!(directory_depth(path, base).unwrap(), depth);
            let prefix = relative_prefix(path, base).unwrap();
            assert_eq!(prefix.len() / PARENT_SEGMENT.len(), depth + 1);
        }
    }

    #[test]
    fn test_base_with_trailing_slash() {
        let depth = directory_depth(
            Path::new("open-science/a/doc.render.Rmd"),
            Path::new("open-science/"),
        )
        .unwrap();
        assert_eq!(depth, 1);
    }

    #[test]
    fn test_path_outside_base() {
        let err = relative_prefix(
            Path::new("elsewhere/doc.render.Rmd"),
            Path::new("open-science"),
        )
        .unwrap_err();
        assert!(matches!(err, PrepError::Path { .. }));
    }
}
