use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::builder::SiteBuilder;
use crate::config::{SiteBuilderConfig, CARGO_BIN_ENV, DEFAULT_PACKAGE};
use crate::generator::{output_name, CodeGenerator};
use crate::simplate::{Simplate, SimplateOptions};
use crate::walker::TreeWalker;

/// Command-line interface for aspen
#[derive(Parser)]
#[command(name = "aspen-gen", version)]
#[command(about = "Build a tree of simplates into a Rust site server", long_about = None)]
pub struct Cli {
    /// Log at debug level unless ASPEN_LOG_LEVEL says otherwise
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available aspen-gen commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate (and optionally format and compile) the package for a site
    Build {
        /// Directory holding the simplates
        #[arg(long)]
        site_root: Option<PathBuf>,

        /// Directory receiving src/, www/ and bin/
        #[arg(long)]
        output_root: Option<PathBuf>,

        /// Name of the generated crate
        #[arg(long)]
        package: Option<String>,

        /// Default bind address of the generated server
        #[arg(long)]
        bind: Option<String>,

        /// Run cargo fmt on the generated package
        #[arg(long, default_value_t = false)]
        format: bool,

        /// Run cargo install to produce the server binary
        #[arg(long, default_value_t = false)]
        compile: bool,

        /// Create the output root if it is missing
        #[arg(long, default_value_t = false)]
        mk_out_dir: bool,

        /// Cargo executable used for formatting and compiling
        #[arg(long, env = CARGO_BIN_ENV)]
        cargo: Option<PathBuf>,

        /// TOML configuration file; command-line flags take precedence
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the generated unit for a single simplate
    Preview {
        /// The simplate to generate
        file: PathBuf,

        /// Site root the simplate's URL path is relative to (default: its directory)
        #[arg(long)]
        site_root: Option<PathBuf>,
    },
    /// List the resources found under a site root
    Inspect {
        /// Directory holding the simplates
        site_root: PathBuf,

        /// Package name reported for the walk
        #[arg(long, default_value = DEFAULT_PACKAGE)]
        package: String,
    },
}

/// Parse arguments, set up logging and run the selected command.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut log_config = crate::logging::LogConfig::from_env();
    if cli.verbose && std::env::var_os("ASPEN_LOG_LEVEL").is_none() {
        log_config.log_level = "debug".to_string();
    }
    crate::logging::init_logging_with_config(&log_config)?;
    let stdout = std::io::stdout();
    execute(&cli.command, &mut stdout.lock())
}

/// Run `command`, writing its report to `out`.
pub fn execute(command: &Commands, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Commands::Build {
            site_root,
            output_root,
            package,
            bind,
            format,
            compile,
            mk_out_dir,
            cargo,
            config,
        } => {
            let mut settings = match config {
                Some(path) => SiteBuilderConfig::from_toml_file(path)?,
                None => SiteBuilderConfig::default(),
            };
            if let Some(site_root) = site_root {
                settings.site_root = site_root.clone();
            }
            if let Some(output_root) = output_root {
                settings.output_root = output_root.clone();
            }
            if package.is_some() {
                settings.package = package.clone();
            }
            if let Some(bind) = bind {
                settings.bind = bind.clone();
            }
            if let Some(cargo) = cargo {
                settings.cargo = cargo.clone();
            }
            settings.format |= *format;
            settings.compile |= *compile;
            settings.mk_out_dir |= *mk_out_dir;
            if settings.site_root.as_os_str().is_empty()
                || settings.output_root.as_os_str().is_empty()
            {
                bail!("both --site-root and --output-root are required (or set them in --config)");
            }

            let builder = SiteBuilder::new(settings)?;
            let report = builder.build()?;
            for unit in &report.units {
                writeln!(
                    out,
                    "generated {} -> {}",
                    unit.relative_path.display(),
                    unit.output_path.display()
                )?;
            }
            for file in &report.static_files {
                let verb = if file.updated { "copied" } else { "unchanged" };
                writeln!(out, "{verb} {}", file.relative_path.display())?;
            }
            if report.formatted {
                writeln!(out, "formatted {}", report.package_dir.display())?;
            }
            if let Some(binary) = &report.binary {
                writeln!(out, "built {}", binary.display())?;
            }
            writeln!(
                out,
                "{} units, {} static files in {}",
                report.units.len(),
                report.static_files.len(),
                report.package_dir.display()
            )?;
            Ok(())
        }
        Commands::Preview { file, site_root } => {
            let site_root = match site_root {
                Some(root) => root.clone(),
                None => parent_dir(file)?,
            };
            let simplate = Simplate::from_file(&site_root, file, &SimplateOptions::default())?;
            CodeGenerator::new().execute(&simplate, out)?;
            Ok(())
        }
        Commands::Inspect { site_root, package } => {
            let walker = TreeWalker::new(package.as_str(), site_root, SimplateOptions::default())?;
            let mut failures = 0usize;
            for simplate in walker.simplates() {
                match simplate {
                    Ok(simplate) => writeln!(
                        out,
                        "{:<10} {:<24} {:<40} {}",
                        simplate.kind().as_str(),
                        display_or_dash(simplate.content_type()),
                        output_name(&simplate),
                        simplate.relative_path().display()
                    )?,
                    Err(e) => {
                        warn!(error = %e, "failed to parse simplate");
                        writeln!(out, "error      {e}")?;
                        failures += 1;
                    }
                }
            }
            if failures > 0 {
                bail!("{failures} simplate(s) under {} failed to parse", site_root.display());
            }
            Ok(())
        }
    }
}

fn parent_dir(file: &Path) -> anyhow::Result<PathBuf> {
    let absolute = std::path::absolute(file)
        .with_context(|| format!("cannot resolve {}", file.display()))?;
    absolute
        .parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("{} has no parent directory", file.display()))
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
