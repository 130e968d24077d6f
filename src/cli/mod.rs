//! # CLI Module
//!
//! Command-line interface of the `aspen-gen` binary.
//!
//! ## Commands
//!
//! ### `build`
//!
//! Build a site root into a generated package, optionally formatting it and
//! compiling the server binary:
//!
//! ```bash
//! aspen-gen build --site-root site --output-root out --format --compile
//! ```
//!
//! Options:
//! - `--site-root <DIR>` / `--output-root <DIR>` - required unless set in `--config`
//! - `--package <NAME>` - generated crate name (default: `aspen_rs_gen`)
//! - `--bind <ADDR>` - default address of the server (`host:port` or `:port`)
//! - `--format` / `--compile` / `--mk-out-dir` - optional stages
//! - `--config <FILE>` - TOML file with the same keys; flags win
//! - `--cargo <PATH>` - cargo executable (env `ASPEN_CARGO_BIN`)
//!
//! ### `preview`
//!
//! Print the Rust unit generated for one simplate:
//!
//! ```bash
//! aspen-gen preview site/shill/cans.txt --site-root site
//! ```
//!
//! ### `inspect`
//!
//! List every resource under a site root with its kind, content type and
//! output name:
//!
//! ```bash
//! aspen-gen inspect site
//! ```

mod commands;


pub use commands::{execute, run_cli, Cli, Commands};
