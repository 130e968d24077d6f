//! Recursive discovery of the simplates under a site root.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::simplate::{clean_path, Simplate, SimplateOptions};

/// Walks a site root and parses every regular, non-hidden file as a simplate.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    package: String,
    root: PathBuf,
    options: SimplateOptions,
    skip_dirs: Vec<PathBuf>,
}

impl TreeWalker {
    pub fn new(
        package: impl Into<String>,
        root: impl AsRef<Path>,
        options: SimplateOptions,
    ) -> Result<Self> {
        let package = package.into();
        if package.trim().is_empty() {
            return Err(Error::Config(
                "tree walker needs a non-empty package name".to_string(),
            ));
        }
        let root = root.as_ref();
        if !root.exists() {
            return Err(Error::path(root, "site root does not exist"));
        }
        if !root.is_dir() {
            return Err(Error::path(root, "site root is not a directory"));
        }
        let root = std::path::absolute(root).map_err(|e| Error::io(root, e))?;
        Ok(Self {
            package,
            root: clean_path(&root),
            options,
            skip_dirs: Vec::new(),
        })
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Leave `dir` and everything below it out of the walk.
    pub fn skip_dir(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        let dir = std::path::absolute(dir).map_err(|e| Error::io(dir, e))?;
        self.skip_dirs.push(clean_path(&dir));
        Ok(())
    }

    /// Lazily parse every simplate under the root, in file-name order.
    ///
    /// A file that cannot be read or parsed is yielded as an `Err` and the
    /// walk carries on. Each call starts a fresh walk.
    pub fn simplates(&self) -> impl Iterator<Item = Result<Simplate>> + '_ {
        debug!(root = %self.root.display(), package = %self.package, "walking site root");
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| self.is_visible(entry))
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    Some(Simplate::from_file(&self.root, entry.path(), &self.options))
                }
                Ok(entry) => {
                    trace!(path = %entry.path().display(), "skipping non-file entry");
                    None
                }
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    Some(Err(Error::io(path, err.into())))
                }
            })
    }

    fn is_visible(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            trace!(path = %entry.path().display(), "skipping hidden entry");
            return false;
        }
        if entry.file_type().is_dir() && self.skip_dirs.iter().any(|d| d == entry.path()) {
            debug!(path = %entry.path().display(), "skipping excluded directory");
            return false;
        }
        true
    }
}
