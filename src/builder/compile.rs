use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::format::run_tool;
use crate::error::{Error, Result};

/// Permission bits given to the installed server binary.
pub const BINARY_MODE: u32 = 0o750;

/// `cargo install` the package in `package_dir` into `<output_root>/bin`
/// and return the path of `binary_name`.
pub fn install_package(
    cargo: &Path,
    package_dir: &Path,
    output_root: &Path,
    binary_name: &str,
) -> Result<PathBuf> {
    let mut cmd = Command::new(cargo);
    cmd.arg("install")
        .arg("--path")
        .arg(package_dir)
        .arg("--root")
        .arg(output_root)
        .arg("--target-dir")
        .arg(output_root.join("target"))
        .arg("--force");
    debug!(cargo = %cargo.display(), package = %package_dir.display(), "running cargo install");
    run_tool("cargo install", cmd)?;

    let binary = output_root
        .join("bin")
        .join(format!("{binary_name}{}", std::env::consts::EXE_SUFFIX));
    if !binary.is_file() {
        return Err(Error::Toolchain {
            tool: "cargo install".to_string(),
            diagnostic: format!("expected binary {} was not produced", binary.display()),
        });
    }
    set_binary_mode(&binary)?;
    Ok(binary)
}

#[cfg(unix)]
fn set_binary_mode(binary: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(binary, std::fs::Permissions::from_mode(BINARY_MODE))
        .map_err(|e| Error::io(binary, e))
}

#[cfg(not(unix))]
fn set_binary_mode(_binary: &Path) -> Result<()> {
    Ok(())
}
