use std::path::Path;
use std::process::{Command, Output};

use tracing::debug;

use crate::error::{Error, Result};

/// Run `cargo fmt` over the package whose manifest sits in `package_dir`.
pub fn format_package(cargo: &Path, package_dir: &Path) -> Result<()> {
    let manifest = package_dir.join("Cargo.toml");
    let mut cmd = Command::new(cargo);
    cmd.arg("fmt")
        .arg("--manifest-path")
        .arg(&manifest)
        .current_dir(package_dir);
    debug!(cargo = %cargo.display(), manifest = %manifest.display(), "running cargo fmt");
    run_tool("cargo fmt", cmd)?;
    Ok(())
}

/// Run `cmd`, turning a spawn failure or non-zero exit into
/// [`Error::Toolchain`] carrying the tool's stderr.
pub(crate) fn run_tool(tool: &str, mut cmd: Command) -> Result<Output> {
    let output = cmd.output().map_err(|e| Error::Toolchain {
        tool: tool.to_string(),
        diagnostic: format!("could not run {:?}: {e}", cmd.get_program()),
    })?;
    if !output.status.success() {
        let mut diagnostic = String::from_utf8_lossy(&output.stderr).into_owned();
        if diagnostic.trim().is_empty() {
            diagnostic = format!("exited with {}", output.status);
        }
        return Err(Error::Toolchain {
            tool: tool.to_string(),
            diagnostic,
        });
    }
    Ok(output)
}

#[cfg(all(test, unix))]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::builder::tests::write_stub;

    #[test]
    fn test_format_package_noop() {
        let dir = tempfile::tempdir().unwrap();
        let stub = write_stub(
            dir.path(),
            "if [ \"$1\" = \"fmt\" ]; then\n    exit 0\nfi\nexit 1\n",
        );
        assert!(format_package(&stub, dir.path()).is_ok());
    }

    #[test]
    fn test_format_package_error_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let stub = write_stub(dir.path(), "echo 'error: expected item, found `let`' >&2\nexit 1\n");
        match format_package(&stub, dir.path()).unwrap_err() {
            Error::Toolchain { tool, diagnostic } => {
                assert_eq!(tool, "cargo fmt");
                assert_eq!(diagnostic, "error: expected item, found `let`\n");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_format_package_missing_cargo() {
        let dir = tempfile::tempdir().unwrap();
        let err = format_package(&dir.path().join("no-such-cargo"), dir.path()).unwrap_err();
        assert!(matches!(err, Error::Toolchain { .. }), "{err:?}");
    }
}
