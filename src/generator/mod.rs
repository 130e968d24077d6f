//! # Generator Module
//!
//! Turns parsed simplates into Rust source and assembles the generated
//! package that is compiled into the site server.
//!
//! ## Architecture
//!
//! The generator uses Askama templates to produce Rust code:
//!
//! ```text
//! Simplate → naming (escaped path, symbols) → unit template by kind → syn check → GeneratedUnit
//! ```
//!
//! - **Naming** - `shill/cans.txt` is escaped to `shill-SLASH-cans-DOT-txt`, written as
//!   `shill-SLASH-cans-DOT-txt.rs`, and exports `ShillSlashCansDotTxt` and
//!   `SHILL_SLASH_CANS_DOT_TXT`
//! - **Units** - one template per kind (`rendered.rs.txt`, `json.rs.txt`,
//!   `negotiated.rs.txt`), all extending `unit.rs.txt`; static simplates are never generated
//! - **Package** - `Cargo.toml`, `lib.rs` (one `#[path]` module per unit plus `routes()`)
//!   and `main.rs` (the server entry point)
//!
//! ## Generated Structure
//!
//! ```text
//! <output_root>/src/<package>/
//! ├── Cargo.toml
//! ├── lib.rs
//! ├── main.rs
//! └── <escaped>.rs      # one file per non-static simplate
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aspen::generator::CodeGenerator;
//! use aspen::simplate::{Simplate, SimplateOptions};
//!
//! let simplate = Simplate::from_file(site_root, path, &SimplateOptions::default())?;
//! CodeGenerator::new().execute(&simplate, &mut std::io::stdout())?;
//! ```

mod naming;
mod package;
mod templates;
mod unit;

pub use naming::{
    escape_path, is_rust_identifier, output_name, to_const_name, to_struct_name, ResourceNames,
    GENERATED_EXTENSION,
};
pub use package::{PackageScaffold, SCAFFOLD_FILES, SERVER_BINARY_SUFFIX};
pub use templates::{rust_string_literal, PackageModule};
pub use unit::{CodeGenerator, GeneratedUnit};
