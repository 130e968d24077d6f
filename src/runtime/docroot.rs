use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Files mirrored from static simplates, served as-is.
#[derive(Debug, Clone)]
pub struct Docroot {
    base_dir: PathBuf,
}

impl Docroot {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base_dir: base.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    /// Read the file behind `url_path` with its guessed media type.
    pub fn load(&self, url_path: &str) -> io::Result<(Vec<u8>, String)> {
        let path = self
            .map_path(url_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        let bytes = fs::read(&path)?;
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok((bytes, content_type))
    }
}
