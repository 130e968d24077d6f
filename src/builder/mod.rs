//! # Site Builder
//!
//! Drives a whole build: validate the configuration, walk the site root,
//! generate and write one unit per dynamic simplate, mirror static files into
//! the docroot, write the package scaffolding, then optionally format and
//! compile the package.
//!
//! ```text
//! <output_root>/
//! ├── src/<package>/   generated package (Cargo.toml, lib.rs, main.rs, units)
//! ├── www/             static simplates, byte for byte
//! ├── target/          cargo build directory
//! └── bin/<package>-http-server
//! ```
//!
//! Units are generated and written one at a time, so a failure leaves the
//! units written before it on disk.

mod compile;
mod format;

pub use compile::{install_package, BINARY_MODE};
pub use format::format_package;

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::SiteBuilderConfig;
use crate::error::{Error, Result};
use crate::generator::{
    is_rust_identifier, CodeGenerator, GeneratedUnit, PackageScaffold, SCAFFOLD_FILES,
};
use crate::simplate::{clean_path, Simplate, SimplateKind};
use crate::walker::TreeWalker;

/// Directory under the output root holding generated packages.
pub const SOURCE_DIR: &str = "src";
/// Directory under the output root static simplates are mirrored into.
pub const DOCROOT_DIR: &str = "www";

/// Build pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStage {
    Validated,
    Walking,
    Generating,
    Writing,
    Formatting,
    Compiling,
    Done,
}

impl BuildStage {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildStage::Validated => "validated",
            BuildStage::Walking => "walking",
            BuildStage::Generating => "generating",
            BuildStage::Writing => "writing",
            BuildStage::Formatting => "formatting",
            BuildStage::Compiling => "compiling",
            BuildStage::Done => "done",
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A build error together with the stage it happened in.
#[derive(Debug, thiserror::Error)]
#[error("site build failed while {stage}: {error}")]
pub struct BuildFailure {
    pub stage: BuildStage,
    #[source]
    pub error: Error,
}

impl BuildFailure {
    fn at(stage: BuildStage) -> impl FnOnce(Error) -> BuildFailure {
        move |error| BuildFailure { stage, error }
    }
}

/// A generated unit as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltUnit {
    pub relative_path: PathBuf,
    pub kind: SimplateKind,
    pub output_path: PathBuf,
    pub module_name: String,
}

/// A static simplate mirrored into the docroot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirroredFile {
    pub relative_path: PathBuf,
    pub output_path: PathBuf,
    /// False when the docroot already held identical content
    pub updated: bool,
}

/// What a successful build produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub package_dir: PathBuf,
    pub units: Vec<BuiltUnit>,
    pub static_files: Vec<MirroredFile>,
    /// `Cargo.toml`, `lib.rs` and `main.rs`
    pub scaffolding: Vec<PathBuf>,
    pub formatted: bool,
    pub binary: Option<PathBuf>,
}

/// Builds a site root into a generated package and, optionally, a binary.
#[derive(Debug, Clone)]
pub struct SiteBuilder {
    config: SiteBuilderConfig,
    site_root: PathBuf,
    output_root: PathBuf,
    package: String,
    generator: CodeGenerator,
}

impl SiteBuilder {
    /// Validate `config`. Creates the output root when `mk_out_dir` is set.
    pub fn new(config: SiteBuilderConfig) -> Result<Self> {
        let site_root = absolute_dir(&config.site_root, "site root")?;

        let package = config.package_name().to_string();
        if !is_rust_identifier(&package) || package == "aspen" {
            return Err(Error::Config(format!(
                "package name {package:?} is not usable as a Rust crate name"
            )));
        }
        validate_bind(&config.bind)?;
        if config.cargo.as_os_str().is_empty() {
            return Err(Error::Config("cargo executable must not be empty".to_string()));
        }

        if config.output_root.as_os_str().is_empty() {
            return Err(Error::Config("output root must not be empty".to_string()));
        }
        if !config.output_root.exists() && config.mk_out_dir {
            fs::create_dir_all(&config.output_root).map_err(|e| Error::io(&config.output_root, e))?;
            info!(output_root = %config.output_root.display(), "created output root");
        }
        let output_root = absolute_dir(&config.output_root, "output root")?;
        validate_roots(&site_root, &output_root)?;

        Ok(Self {
            config,
            site_root,
            output_root,
            package,
            generator: CodeGenerator::new(),
        })
    }

    pub fn config(&self) -> &SiteBuilderConfig {
        &self.config
    }

    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// `<output_root>/src/<package>`
    pub fn package_dir(&self) -> PathBuf {
        self.output_root.join(SOURCE_DIR).join(&self.package)
    }

    /// `<output_root>/www`
    pub fn docroot(&self) -> PathBuf {
        self.output_root.join(DOCROOT_DIR)
    }

    pub fn scaffold(&self) -> PackageScaffold {
        PackageScaffold {
            package: self.package.clone(),
            runtime_path: self.config.runtime_path(),
            bind: self.config.bind.clone(),
            docroot: self.docroot(),
        }
    }

    /// Run every stage. The first failure stops the build.
    pub fn build(&self) -> std::result::Result<BuildReport, BuildFailure> {
        info!(
            stage = %BuildStage::Validated,
            site_root = %self.site_root.display(),
            output_root = %self.output_root.display(),
            package = %self.package,
            "starting site build"
        );
        let package_dir = self.package_dir();
        let docroot = self.docroot();
        for dir in [&package_dir, &docroot] {
            fs::create_dir_all(dir)
                .map_err(|e| Error::io(dir, e))
                .map_err(BuildFailure::at(BuildStage::Writing))?;
        }

        info!(stage = %BuildStage::Walking, "walking site root");
        let mut walker = TreeWalker::new(
            &self.package,
            &self.site_root,
            self.config.simplate_options(),
        )
        .map_err(BuildFailure::at(BuildStage::Walking))?;
        if self.output_root.starts_with(&self.site_root) {
            walker
                .skip_dir(&self.output_root)
                .map_err(BuildFailure::at(BuildStage::Walking))?;
        }

        let mut report = BuildReport {
            package_dir: package_dir.clone(),
            ..BuildReport::default()
        };
        let mut units = Vec::new();
        let mut claims = NameClaims::default();
        for simplate in walker.simplates() {
            let simplate = simplate.map_err(BuildFailure::at(BuildStage::Walking))?;
            if simplate.kind() == SimplateKind::Static {
                let mirrored = mirror_static(&simplate, &docroot)
                    .map_err(BuildFailure::at(BuildStage::Writing))?;
                report.static_files.push(mirrored);
                continue;
            }

            let unit = self
                .generator
                .generate(&simplate)
                .and_then(|unit| claims.claim(&unit).map(|()| unit))
                .map_err(BuildFailure::at(BuildStage::Generating))?;
            let output_path = package_dir.join(&unit.output_name);
            fs::write(&output_path, &unit.source)
                .map_err(|e| Error::io(&output_path, e))
                .map_err(BuildFailure::at(BuildStage::Writing))?;
            debug!(
                path = %unit.relative_path.display(),
                output = %output_path.display(),
                "wrote unit"
            );
            report.units.push(BuiltUnit {
                relative_path: unit.relative_path.clone(),
                kind: unit.kind,
                output_path,
                module_name: unit.names.module_name.clone(),
            });
            units.push(unit);
        }

        info!(
            stage = %BuildStage::Writing,
            units = units.len(),
            static_files = report.static_files.len(),
            "writing package scaffolding"
        );
        report.scaffolding = self
            .scaffold()
            .write(&package_dir, &units)
            .map_err(BuildFailure::at(BuildStage::Writing))?;

        if self.config.format {
            info!(stage = %BuildStage::Formatting, "formatting generated package");
            format_package(&self.config.cargo, &package_dir)
                .map_err(BuildFailure::at(BuildStage::Formatting))?;
            report.formatted = true;
        }

        if self.config.compile {
            info!(stage = %BuildStage::Compiling, "compiling generated package");
            let binary = install_package(
                &self.config.cargo,
                &package_dir,
                &self.output_root,
                &self.scaffold().binary_name(),
            )
            .map_err(BuildFailure::at(BuildStage::Compiling))?;
            report.binary = Some(binary);
        }

        info!(stage = %BuildStage::Done, units = report.units.len(), "site build finished");
        Ok(report)
    }
}

/// Output and module names already taken in this build.
#[derive(Debug, Default)]
struct NameClaims {
    outputs: HashMap<String, PathBuf>,
    modules: HashMap<String, PathBuf>,
}

impl NameClaims {
    fn claim(&mut self, unit: &GeneratedUnit) -> Result<()> {
        let path = &unit.relative_path;
        if SCAFFOLD_FILES.contains(&unit.output_name.as_str()) {
            return Err(Error::generation(
                path,
                format!("output name {} is reserved for the package scaffolding", unit.output_name),
            ));
        }
        if let Some(other) = self.outputs.get(&unit.output_name) {
            return Err(Error::generation(
                path,
                format!(
                    "output name {} collides with {}",
                    unit.output_name,
                    other.display()
                ),
            ));
        }
        if let Some(other) = self.modules.get(&unit.names.module_name) {
            return Err(Error::generation(
                path,
                format!(
                    "module name {} collides with {}",
                    unit.names.module_name,
                    other.display()
                ),
            ));
        }
        self.outputs.insert(unit.output_name.clone(), path.clone());
        self.modules.insert(unit.names.module_name.clone(), path.clone());
        Ok(())
    }
}

/// Copy a static simplate into the docroot unless identical content is
/// already there.
fn mirror_static(simplate: &Simplate, docroot: &Path) -> Result<MirroredFile> {
    let relative_path = simplate.relative_path().to_path_buf();
    let body = simplate.static_body().unwrap_or_default();
    let output_path = docroot.join(&relative_path);
    let unchanged = fs::read(&output_path).is_ok_and(|existing| existing == body);
    if !unchanged {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(&output_path, body).map_err(|e| Error::io(&output_path, e))?;
        debug!(path = %relative_path.display(), "mirrored static file");
    }
    Ok(MirroredFile {
        relative_path,
        output_path,
        updated: !unchanged,
    })
}

fn absolute_dir(dir: &Path, role: &str) -> Result<PathBuf> {
    if dir.as_os_str().is_empty() {
        return Err(Error::Config(format!("{role} must not be empty")));
    }
    if !dir.exists() {
        return Err(Error::path(dir, format!("{role} does not exist")));
    }
    if !dir.is_dir() {
        return Err(Error::path(dir, format!("{role} is not a directory")));
    }
    let absolute = std::path::absolute(dir).map_err(|e| Error::io(dir, e))?;
    Ok(clean_path(&absolute))
}

/// Accept `host:port` or `:port` with a numeric port.
/// The output root may sit inside the site root (it is skipped during the
/// walk) but must not be the site root, and the site root must not live in
/// a directory the build writes to.
fn validate_roots(site_root: &Path, output_root: &Path) -> Result<()> {
    if site_root == output_root {
        return Err(Error::Config(format!(
            "output root {} must differ from the site root",
            output_root.display()
        )));
    }
    for dir in [SOURCE_DIR, DOCROOT_DIR, "bin", "target"] {
        let written = output_root.join(dir);
        if site_root.starts_with(&written) {
            return Err(Error::Config(format!(
                "site root {} lies inside build output {}",
                site_root.display(),
                written.display()
            )));
        }
    }
    Ok(())
}

fn validate_bind(bind: &str) -> Result<()> {
    let port = bind
        .rsplit_once(':')
        .map(|(_, port)| port)
        .ok_or_else(|| Error::Config(format!("bind address {bind:?} has no port")))?;
    port.parse::<u16>()
        .map(|_| ())
        .map_err(|_| Error::Config(format!("bind address {bind:?} has an invalid port")))
}
