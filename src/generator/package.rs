use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::templates::{
    render_guarded, rust_string_literal, toml_string_literal, CargoTomlTemplate, LibRsTemplate,
    MainRsTemplate, PackageModule,
};
use super::unit::{ensure_valid_rust, GeneratedUnit};
use crate::error::{Error, Result};

/// Files the package scaffolding owns inside the generated package directory.
pub const SCAFFOLD_FILES: [&str; 3] = ["Cargo.toml", "lib.rs", "main.rs"];

/// Suffix of the server binary built from a generated package.
pub const SERVER_BINARY_SUFFIX: &str = "-http-server";

/// Settings baked into the generated package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageScaffold {
    /// Cargo package (and library crate) name
    pub package: String,
    /// Directory holding the aspen crate the package depends on
    pub runtime_path: PathBuf,
    /// Default address the server binds to
    pub bind: String,
    /// Directory static simplates are served from
    pub docroot: PathBuf,
}

impl PackageScaffold {
    /// Name of the server binary, e.g. `aspen_rs_gen-http-server`.
    pub fn binary_name(&self) -> String {
        format!("{}{SERVER_BINARY_SUFFIX}", self.package)
    }

    pub fn render_cargo_toml(&self) -> Result<String> {
        render_guarded(&CargoTomlTemplate {
            package: &self.package,
            runtime_path: toml_string_literal(&self.runtime_path.to_string_lossy()),
        })
        .map_err(|reason| Error::generation("Cargo.toml", reason))
    }

    /// `lib.rs` mounting every unit in `units` and listing them in `routes()`.
    pub fn render_lib_rs(&self, units: &[GeneratedUnit]) -> Result<String> {
        let modules = units
            .iter()
            .map(|unit| PackageModule {
                source_path: unit.relative_path.to_string_lossy().into_owned(),
                file_literal: rust_string_literal(&unit.output_name),
                module_name: unit.names.module_name.clone(),
                struct_name: unit.names.struct_name.clone(),
            })
            .collect::<Vec<_>>();
        let source = render_guarded(&LibRsTemplate {
            package: &self.package,
            modules: &modules,
        })
        .map_err(|reason| Error::generation("lib.rs", reason))?;
        ensure_valid_rust(Path::new("lib.rs"), &source)?;
        Ok(source)
    }

    pub fn render_main_rs(&self) -> Result<String> {
        let source = render_guarded(&MainRsTemplate {
            package: &self.package,
            bind: rust_string_literal(&self.bind),
            docroot: rust_string_literal(&self.docroot.to_string_lossy()),
        })
        .map_err(|reason| Error::generation("main.rs", reason))?;
        ensure_valid_rust(Path::new("main.rs"), &source)?;
        Ok(source)
    }

    /// Write `Cargo.toml`, `lib.rs` and `main.rs` into `package_dir`.
    pub fn write(&self, package_dir: &Path, units: &[GeneratedUnit]) -> Result<Vec<PathBuf>> {
        let files = [
            (SCAFFOLD_FILES[0], self.render_cargo_toml()?),
            (SCAFFOLD_FILES[1], self.render_lib_rs(units)?),
            (SCAFFOLD_FILES[2], self.render_main_rs()?),
        ];
        let mut written = Vec::with_capacity(files.len());
        for (name, content) in files {
            let path = package_dir.join(name);
            fs::write(&path, content).map_err(|e| Error::io(&path, e))?;
            debug!(path = %path.display(), "wrote package scaffolding");
            written.push(path);
        }
        Ok(written)
    }
}
