//! Error taxonomy shared by the parser, generator, tree walker and site builder.
//!
//! Every variant carries enough context to act on: the offending path, the
//! offending specline, or the diagnostic printed by an external tool.

use std::io;
use std::path::{Path, PathBuf};

use crate::simplate::SpecError;

/// Result alias used throughout the build pipeline.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while turning a site tree into a generated package.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A root or resource path is missing, not a directory, or outside the site root.
    #[error("path error at {}: {reason}", path.display())]
    Path {
        /// The path that failed validation
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },

    /// The page layout of a simplate does not match its detected type.
    #[error("malformed simplate {}: {reason}", path.display())]
    MalformedResource {
        /// Simplate path relative to the site root
        path: PathBuf,
        /// Structural violation
        reason: String,
    },

    /// A template page's specline could not be parsed.
    #[error("invalid specline in {}: {source}", path.display())]
    Spec {
        /// Simplate path relative to the site root
        path: PathBuf,
        /// The specline failure
        #[source]
        source: SpecError,
    },

    /// Naming, template rendering or syntax validation failed for a resource.
    #[error("code generation failed for {}: {reason}", path.display())]
    Generation {
        /// Simplate path relative to the site root
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// `cargo fmt` or `cargo install` failed; `diagnostic` is the tool's stderr verbatim.
    #[error("{tool} failed:\n{diagnostic}")]
    Toolchain {
        /// Tool invocation, e.g. `cargo fmt`
        tool: String,
        /// Output captured from the tool
        diagnostic: String,
    },

    /// Invalid configuration or construction arguments.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn path(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Error::Path {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Error::MalformedResource {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn generation(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Error::Generation {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }
}
