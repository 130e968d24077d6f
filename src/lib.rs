//! # aspen
//!
//! **aspen** builds a directory of *simplates* into a generated Rust package and a single
//! HTTP server binary that serves the whole site.
//!
//! ## Overview
//!
//! A simplate is one file per URL. Files without page breaks are served as-is; files with
//! form-feed (`\x0C`) separated pages carry module-level Rust items, a logic block and one or
//! more templates. aspen turns every dynamic simplate into a Rust module, wires them into a
//! `routes()` table and lets cargo compile the result.
//!
//! ## Architecture
//!
//! - **[`simplate`]** - Splitting a file into pages and classifying it (static, rendered, JSON,
//!   negotiated); specline parsing
//! - **[`generator`]** - Name mangling and Askama templates that emit one Rust unit per
//!   simplate plus the package scaffolding
//! - **[`walker`]** - Deterministic recursive discovery of simplates under a site root
//! - **[`builder`]** - The staged build: walk, generate, write, format, compile
//! - **[`runtime`]** - Types and helpers that generated packages link against, including the
//!   `tiny_http` server shell and content negotiation
//! - **[`config`]** - Builder configuration, loadable from TOML
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `aspen-gen` command line
//!
//! ### Build Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(aspen-gen)
//!     participant Builder as builder::SiteBuilder
//!     participant Walker as walker::TreeWalker
//!     participant Gen as generator::CodeGenerator
//!     participant FS as File System
//!     participant Cargo
//!
//!     User->>CLI: aspen-gen build --site-root site --output-root out
//!     CLI->>Builder: SiteBuilder::new(config)
//!     Builder->>Walker: simplates()
//!     loop every file, in name order
//!         Walker-->>Builder: Simplate
//!         alt static
//!             Builder->>FS: mirror to out/www/<path>
//!         else rendered / json / negotiated
//!             Builder->>Gen: generate(&simplate)
//!             Gen-->>Builder: GeneratedUnit
//!             Builder->>FS: write out/src/<package>/<escaped>.rs
//!         end
//!     end
//!     Builder->>FS: Cargo.toml, lib.rs, main.rs
//!     opt --format
//!         Builder->>Cargo: cargo fmt
//!     end
//!     opt --compile
//!         Builder->>Cargo: cargo install --root out
//!     end
//!     Builder-->>CLI: BuildReport
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aspen::builder::SiteBuilder;
//! use aspen::config::SiteBuilderConfig;
//!
//! let mut config = SiteBuilderConfig::new("site", "out");
//! config.mk_out_dir = true;
//! let report = SiteBuilder::new(config)?.build()?;
//! println!("{} units generated", report.units.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod runtime;
pub mod simplate;
pub mod walker;

pub use builder::{BuildFailure, BuildReport, BuildStage, SiteBuilder};
pub use config::SiteBuilderConfig;
pub use error::{Error, Result};
pub use generator::{CodeGenerator, GeneratedUnit};
pub use simplate::{Simplate, SimplateKind, SimplateOptions};
pub use walker::TreeWalker;
