use askama::Template;
use std::panic::{self, AssertUnwindSafe};

use super::naming::ResourceNames;
use crate::simplate::SimplateKind;

/// A template page rendered as Rust literals for the `Page` table of a unit.
#[derive(Debug, Clone)]
pub struct PageLiteral {
    /// Media type as a Rust string literal
    pub content_type: String,
    /// Renderer name as a Rust string literal
    pub renderer: String,
    /// Template body as a Rust string literal
    pub body: String,
}

/// Everything the unit templates interpolate.
#[derive(Debug, Clone)]
pub struct UnitData {
    /// Relative path of the simplate, for comments
    pub source_path: String,
    /// Relative path as a Rust string literal
    pub path_literal: String,
    /// Resource content type as a Rust string literal
    pub content_type_literal: String,
    pub kind: SimplateKind,
    pub names: ResourceNames,
    /// Init page, verbatim
    pub init_body: String,
    /// Logic page, verbatim
    pub logic_body: String,
    pub pages: Vec<PageLiteral>,
}

/// Unit template for rendered simplates.
#[derive(Template)]
#[template(path = "rendered.rs.txt", escape = "none")]
pub struct RenderedUnitTemplate<'a> {
    pub unit: &'a UnitData,
}

/// Unit template for JSON simplates.
#[derive(Template)]
#[template(path = "json.rs.txt", escape = "none")]
pub struct JsonUnitTemplate<'a> {
    pub unit: &'a UnitData,
}

/// Unit template for negotiated simplates.
#[derive(Template)]
#[template(path = "negotiated.rs.txt", escape = "none")]
pub struct NegotiatedUnitTemplate<'a> {
    pub unit: &'a UnitData,
}

/// One `#[path]` module of the generated `lib.rs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageModule {
    /// Relative path of the simplate, for comments
    pub source_path: String,
    /// Output file name as a Rust string literal
    pub file_literal: String,
    pub module_name: String,
    pub struct_name: String,
}

#[derive(Template)]
#[template(path = "Cargo.toml.txt")]
pub struct CargoTomlTemplate<'a> {
    pub package: &'a str,
    /// Path to the aspen crate as a TOML string
    pub runtime_path: String,
}

#[derive(Template)]
#[template(path = "lib.rs.txt", escape = "none")]
pub struct LibRsTemplate<'a> {
    pub package: &'a str,
    pub modules: &'a [PackageModule],
}

#[derive(Template)]
#[template(path = "main.rs.txt", escape = "none")]
pub struct MainRsTemplate<'a> {
    pub package: &'a str,
    /// Default bind address as a Rust string literal
    pub bind: String,
    /// Docroot as a Rust string literal
    pub docroot: String,
}

/// Render a template, turning both template errors and panics into a message.
pub fn render_guarded<T: Template>(template: &T) -> Result<String, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| template.render())) {
        Ok(Ok(rendered)) => Ok(rendered),
        Ok(Err(err)) => Err(format!("template rendering failed: {err}")),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            Err(format!("template engine panicked: {message}"))
        }
    }
}

/// Quote `value` as a Rust string literal, preferring a raw string with just
/// enough `#`s. Bodies with carriage returns fall back to an escaped literal
/// since raw strings may not contain a bare CR.
pub fn rust_string_literal(value: &str) -> String {
    if value.contains('\r') {
        return format!("{value:?}");
    }
    let mut longest = 0usize;
    let mut run: Option<usize> = None;
    for ch in value.chars() {
        run = match (ch, run) {
            ('"', _) => Some(0),
            ('#', Some(n)) => Some(n + 1),
            _ => None,
        };
        if let Some(n) = run {
            longest = longest.max(n + 1);
        }
    }
    let hashes = "#".repeat(longest);
    format!("r{hashes}\"{value}\"{hashes}")
}

/// Quote `value` as a TOML basic string.
pub fn toml_string_literal(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
