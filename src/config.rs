//! Site builder configuration.
//!
//! Values come from an optional TOML file (`aspen.toml`), then command-line
//! flags. Every key is optional in the file:
//!
//! ```toml
//! site_root = "site"
//! output_root = "out"
//! package = "my_site"
//! bind = "127.0.0.1:9182"
//! format = true
//! compile = false
//!
//! [content_types]
//! mustache = "text/html"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::simplate::{SimplateOptions, DEFAULT_RENDERER};

/// Package name used when none is configured.
pub const DEFAULT_PACKAGE: &str = "aspen_rs_gen";
/// Address generated servers bind to unless told otherwise.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
/// Environment variable overriding the cargo executable.
pub const CARGO_BIN_ENV: &str = "ASPEN_CARGO_BIN";

/// Everything a [`crate::builder::SiteBuilder`] needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteBuilderConfig {
    /// Directory holding the simplates
    pub site_root: PathBuf,
    /// Directory receiving `src/`, `www/`, `bin/` and `target/`
    pub output_root: PathBuf,
    /// Generated package name; [`DEFAULT_PACKAGE`] when unset
    pub package: Option<String>,
    /// Default bind address baked into the server, `host:port` or `:port`
    pub bind: String,
    /// Run `cargo fmt` on the generated package
    pub format: bool,
    /// Run `cargo install` to produce the server binary
    pub compile: bool,
    /// Create `output_root` when it does not exist
    pub mk_out_dir: bool,
    /// Cargo executable used for formatting and compiling
    pub cargo: PathBuf,
    /// Location of the aspen crate generated packages depend on; defaults
    /// to the directory this crate was built from
    pub runtime_path: Option<PathBuf>,
    /// Renderer for template pages that do not name one
    pub default_renderer: String,
    /// Extension to media type overrides
    pub content_types: BTreeMap<String, String>,
}

impl Default for SiteBuilderConfig {
    fn default() -> Self {
        Self {
            site_root: PathBuf::new(),
            output_root: PathBuf::new(),
            package: None,
            bind: DEFAULT_BIND.to_string(),
            format: false,
            compile: false,
            mk_out_dir: false,
            cargo: PathBuf::from("cargo"),
            runtime_path: None,
            default_renderer: DEFAULT_RENDERER.to_string(),
            content_types: BTreeMap::new(),
        }
    }
}

impl SiteBuilderConfig {
    pub fn new(site_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            site_root: site_root.into(),
            output_root: output_root.into(),
            ..Self::default()
        }
    }

    /// Load a configuration file; unknown keys are rejected.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn package_name(&self) -> &str {
        self.package.as_deref().unwrap_or(DEFAULT_PACKAGE)
    }

    pub fn runtime_path(&self) -> PathBuf {
        self.runtime_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
    }

    pub fn simplate_options(&self) -> SimplateOptions {
        SimplateOptions {
            default_renderer: self.default_renderer.clone(),
            content_types: self
                .content_types
                .iter()
                .map(|(ext, ty)| (ext.trim_start_matches('.').to_ascii_lowercase(), ty.clone()))
                .collect(),
        }
    }
}
