//! Static files and directory listings under the content root.
//!
//! A request path is mapped onto the root one component at a time; `..`
//! may climb back toward the root but never above it. The mapped path is
//! then canonicalized and must still lie inside the canonical root, which
//! also rejects symlinks that point outside. A rejected path is reported as
//! [`WebConfigError::SuspiciousOperation`] and never opened.

use std::fs::File;
use std::path::{Component, Path, PathBuf};

use webconfig_core::{WebConfigError, WebConfigResult};
use webconfig_http::{content_type, Response};

use crate::pages;

/// What a request path resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A regular file.
    File(PathBuf),
    /// A directory without an index file.
    Directory(PathBuf),
}

/// Serves files below a root folder.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    index_file: String,
}

impl StaticFiles {
    /// Creates a server for `root`, using `index_file` for directories.
    pub fn new(root: impl Into<PathBuf>, index_file: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index_file: index_file.into(),
        }
    }

    /// The configured root folder.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a decoded request path.
    ///
    /// A directory containing the index file resolves to that file.
    ///
    /// # Errors
    ///
    /// - [`WebConfigError::SuspiciousOperation`] if the path escapes the root.
    /// - [`WebConfigError::NotFound`] if nothing exists there or the root is missing.
    pub fn resolve(&self, url: &str) -> WebConfigResult<Resolved> {
        let root = self.root.canonicalize().map_err(|e| {
            WebConfigError::NotFound(format!("root folder '{}': {e}", self.root.display()))
        })?;
        let mapped = map_path(&root, url)?;
        let path = mapped
            .canonicalize()
            .map_err(|_| WebConfigError::NotFound(url.to_string()))?;
        if !path.starts_with(&root) {
            return Err(WebConfigError::SuspiciousOperation(format!(
                "'{url}' resolves outside the root folder"
            )));
        }

        if path.is_dir() {
            let index = path.join(&self.index_file);
            if index.is_file() {
                return Ok(Resolved::File(index));
            }
            return Ok(Resolved::Directory(path));
        }
        if path.is_file() {
            return Ok(Resolved::File(path));
        }
        Err(WebConfigError::NotFound(url.to_string()))
    }

    /// Fills `response` with the file or listing for `url`.
    ///
    /// # Errors
    ///
    /// Propagates [`resolve`](Self::resolve) errors, and I/O errors from
    /// opening the file or reading the directory.
    pub fn serve(&self, url: &str, response: &mut Response) -> WebConfigResult<()> {
        match self.resolve(url)? {
            Resolved::File(path) => {
                let file = File::open(&path)?;
                response.set_file(file)?;
                response.set_content_type(&content_type(&path));
                tracing::debug!(path = %path.display(), "serving file");
            }
            Resolved::Directory(path) => {
                let (dirs, files) = list_directory(&path)?;
                let relative = self.relative_display(&path);
                response.set_html(pages::listing_page(&relative, url, &dirs, &files));
            }
        }
        Ok(())
    }

    /// `path` relative to the root, as a `/`-separated display string.
    fn relative_display(&self, path: &Path) -> String {
        let root = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());
        let relative = path.strip_prefix(&root).unwrap_or(path);
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        format!("/{}", segments.join("/"))
    }
}

/// Maps a URL path onto `root`, folding `.` and `..` lexically.
fn map_path(root: &Path, url: &str) -> WebConfigResult<PathBuf> {
    let mut path = root.to_path_buf();
    let mut depth = 0usize;
    for component in Path::new(url.trim_start_matches('/')).components() {
        match component {
            Component::Normal(segment) => {
                path.push(segment);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir if depth > 0 => {
                path.pop();
                depth -= 1;
            }
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(WebConfigError::SuspiciousOperation(format!(
                    "'{url}' climbs above the root folder"
                )));
            }
        }
    }
    Ok(path)
}

/// Sorted subdirectory and file names of `dir`.
fn list_directory(dir: &Path) -> WebConfigResult<(Vec<String>, Vec<String>)> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            dirs.push(name);
        } else {
            files.push(name);
        }
    }
    dirs.sort();
    files.sort();
    Ok((dirs, files))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> (tempfile::TempDir, StaticFiles) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("www");
        std::fs::create_dir_all(root.join("docs/img")).unwrap();
        std::fs::create_dir_all(root.join("withindex")).unwrap();
        std::fs::write(root.join("docs/readme.txt"), "hello").unwrap();
        std::fs::write(root.join("withindex/index.htm"), "<p>index</p>").unwrap();
        std::fs::write(dir.path().join("secret.txt"), "outside").unwrap();
        let files = StaticFiles::new(&root, "index.htm");
        (dir, files)
    }

    #[test]
    fn test_map_path_folds_dots() {
        let root = Path::new("/srv/www");
        assert_eq!(map_path(root, "/a/./b/../c").unwrap(), root.join("a/c"));
        assert_eq!(map_path(root, "/").unwrap(), root);
    }

    #[test]
    fn test_map_path_rejects_escape() {
        let root = Path::new("/srv/www");
        for url in ["/../etc/passwd", "/../../etc/passwd", "/a/../../x", ".."] {
            assert!(
                matches!(map_path(root, url), Err(WebConfigError::SuspiciousOperation(_))),
                "{url}"
            );
        }
    }

    #[test]
    fn test_resolve_file() {
        let (_dir, files) = site();
        let resolved = files.resolve("/docs/readme.txt").unwrap();
        assert!(matches!(resolved, Resolved::File(p) if p.ends_with("docs/readme.txt")));
    }

    #[test]
    fn test_resolve_directory_with_and_without_index() {
        let (_dir, files) = site();
        assert!(matches!(files.resolve("/withindex").unwrap(), Resolved::File(p) if p.ends_with("index.htm")));
        assert!(matches!(files.resolve("/docs/").unwrap(), Resolved::Directory(_)));
    }

    #[test]
    fn test_resolve_missing() {
        let (_dir, files) = site();
        assert!(matches!(files.resolve("/nope.htm"), Err(WebConfigError::NotFound(_))));
    }

    #[test]
    fn test_resolve_traversal_to_existing_file() {
        let (_dir, files) = site();
        assert!(matches!(
            files.resolve("/../secret.txt"),
            Err(WebConfigError::SuspiciousOperation(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_symlink_outside_root() {
        let (dir, files) = site();
        std::os::unix::fs::symlink(dir.path().join("secret.txt"), files.root().join("link.txt"))
            .unwrap();
        assert!(matches!(
            files.resolve("/link.txt"),
            Err(WebConfigError::SuspiciousOperation(_))
        ));
    }

    #[test]
    fn test_serve_file_sets_type() {
        let (_dir, files) = site();
        let mut response = Response::new();
        files.serve("/docs/readme.txt", &mut response).unwrap();
        assert!(response.has_file());
        assert_eq!(response.content_length(), 5);
        assert_eq!(response.content_type(), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn test_serve_listing() {
        let (_dir, files) = site();
        let mut response = Response::new();
        files.serve("/docs", &mut response).unwrap();
        let html = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(html.contains("Folder listing for /docs"));
        assert!(html.contains(r#"<a href="/docs/img">"#));
        assert!(html.contains(r#"<a href="/docs/readme.txt">"#));
        assert!(html.find("[img]").unwrap() < html.find("[readme.txt]").unwrap());
    }

    #[test]
    fn test_missing_root() {
        let files = StaticFiles::new("/definitely/not/here", "index.htm");
        assert!(matches!(files.resolve("/"), Err(WebConfigError::NotFound(_))));
    }
}
