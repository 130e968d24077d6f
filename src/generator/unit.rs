use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::naming::{output_name, ResourceNames};
use super::templates::{
    render_guarded, rust_string_literal, JsonUnitTemplate, NegotiatedUnitTemplate, PageLiteral,
    RenderedUnitTemplate, UnitData,
};
use crate::error::{Error, Result};
use crate::runtime::{MINIJINJA_RENDERER, RENDERERS};
use crate::simplate::{Simplate, SimplateKind};

/// Source code emitted for one simplate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Simplate path relative to the site root
    pub relative_path: PathBuf,
    pub kind: SimplateKind,
    /// File name inside the generated package directory
    pub output_name: String,
    pub names: ResourceNames,
    /// Rust source of the unit
    pub source: String,
}

/// Turns parsed simplates into Rust modules.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    renderers: BTreeSet<String>,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self {
            renderers: RENDERERS.iter().map(|r| (*r).to_string()).collect(),
        }
    }
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderers a template page may name.
    pub fn renderers(&self) -> impl Iterator<Item = &str> {
        self.renderers.iter().map(String::as_str)
    }

    /// Generate the Rust unit for a non-static simplate.
    ///
    /// Fails when the path cannot be mangled into valid identifiers, a
    /// template page names an unknown renderer or does not compile, or the
    /// emitted unit is not valid Rust.
    pub fn generate(&self, simplate: &Simplate) -> Result<GeneratedUnit> {
        let path = simplate.relative_path();
        let kind = simplate.kind();
        if kind == SimplateKind::Static {
            return Err(Error::generation(
                path,
                "static simplates are copied to the docroot, not generated",
            ));
        }

        let names = ResourceNames::for_path(path);
        if let Some((role, ident)) = names.invalid_identifiers().first() {
            return Err(Error::generation(
                path,
                format!(
                    "generated {role} name `{ident}` is not a valid Rust identifier \
                    (the path starts with a digit, is a keyword, or contains punctuation)"
                ),
            ));
        }
        if let Some(clash) = names.clashing_name() {
            return Err(Error::generation(
                path,
                format!("generated type and constant would both be named `{clash}`"),
            ));
        }

        let pages = simplate
            .template_pages()
            .iter()
            .enumerate()
            .map(|(index, page)| {
                let spec = page.spec.clone().unwrap_or_default();
                self.check_template(path, index, &spec.renderer, &page.body)?;
                Ok(PageLiteral {
                    content_type: rust_string_literal(&spec.content_type),
                    renderer: rust_string_literal(&spec.renderer),
                    body: rust_string_literal(&page.body),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let source_path = path.to_string_lossy().into_owned();
        let unit = UnitData {
            path_literal: rust_string_literal(&source_path),
            content_type_literal: rust_string_literal(simplate.content_type()),
            source_path,
            kind,
            names,
            init_body: simplate
                .init_page()
                .map(|p| p.body.clone())
                .unwrap_or_default(),
            logic_body: simplate
                .logic_page()
                .map(|p| p.body.clone())
                .unwrap_or_default(),
            pages,
        };

        let rendered = match kind {
            SimplateKind::Rendered => render_guarded(&RenderedUnitTemplate { unit: &unit }),
            SimplateKind::Json => render_guarded(&JsonUnitTemplate { unit: &unit }),
            SimplateKind::Negotiated => render_guarded(&NegotiatedUnitTemplate { unit: &unit }),
            SimplateKind::Static => Err("static simplates have no generation template".to_string()),
        };
        let source = rendered.map_err(|reason| Error::generation(path, reason))?;
        ensure_valid_rust(path, &source)?;

        debug!(path = %path.display(), kind = %kind, "generated unit");
        Ok(GeneratedUnit {
            relative_path: path.to_path_buf(),
            kind,
            output_name: output_name(simplate),
            names: unit.names,
            source,
        })
    }

    /// Generate a simplate's unit and write it to `writer`.
    ///
    /// The unit is rendered completely before anything is written, so a
    /// failure never leaves partial output behind.
    pub fn execute<W: Write>(&self, simplate: &Simplate, writer: &mut W) -> Result<()> {
        let unit = self.generate(simplate)?;
        writer
            .write_all(unit.source.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| Error::io(simplate.relative_path(), e))
    }

    fn check_template(&self, path: &Path, index: usize, renderer: &str, body: &str) -> Result<()> {
        if !self.renderers.contains(renderer) {
            let known = self.renderers().collect::<Vec<_>>().join(", ");
            return Err(Error::generation(
                path,
                format!(
                    "template page {index} names unknown renderer {renderer:?} (known: {known})"
                ),
            ));
        }
        if renderer == MINIJINJA_RENDERER {
            let env = minijinja::Environment::new();
            env.template_from_str(body).map_err(|e| {
                Error::generation(path, format!("template page {index} does not compile: {e}"))
            })?;
        }
        Ok(())
    }
}

/// Reject emitted source that does not parse as a Rust file.
pub(crate) fn ensure_valid_rust(path: &Path, source: &str) -> Result<()> {
    syn::parse_file(source)
        .map(|_| ())
        .map_err(|e| Error::generation(path, format!("generated code is not valid Rust: {e}")))
}
