//! # Simplate Module
//!
//! A simplate is a single file under the site root that encodes one or more
//! logical pages for one URL. Pages are separated by the form feed character
//! (`^L`, `\x0C`):
//!
//! ```text
//! use serde::Serialize;              <- init page: module-level Rust items
//! #[derive(Serialize)]
//! struct Dance { who: String }
//! ^L
//! ctx.insert("d", Dance { who: "Everybody".into() })?;   <- logic page
//! ^L text/plain
//! {{ d.who }} dance now!             <- template page(s), first line is the specline
//! ```
//!
//! ## Kinds
//!
//! | Page breaks | Content type        | Kind         | Template pages |
//! |-------------|---------------------|--------------|----------------|
//! | 0           | any                 | `Static`     | 0              |
//! | 1 or 2      | `application/json`  | `Json`       | 0              |
//! | 1 or 2      | anything else       | `Rendered`   | 1              |
//! | 3 or more   | any                 | `Negotiated` | breaks - 1     |
//!
//! Negotiated template pages keep their declaration order, which is the order
//! they are offered during content negotiation.

mod resource;
mod spec;
#[cfg(test)]
pub(crate) mod tests;

pub use resource::{clean_path, Page, Simplate, SimplateKind, PAGE_BREAK};
pub use spec::{parse_spec, PageSpec, SpecError, DEFAULT_RENDERER};

use std::collections::BTreeMap;
use std::path::Path;

/// Parsing knobs that would otherwise be process-wide tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimplateOptions {
    /// Renderer used when a template page does not name one
    pub default_renderer: String,
    /// Extension (without the dot, lower case) to media type overrides
    pub content_types: BTreeMap<String, String>,
}

impl Default for SimplateOptions {
    fn default() -> Self {
        Self {
            default_renderer: DEFAULT_RENDERER.to_string(),
            content_types: BTreeMap::new(),
        }
    }
}

impl SimplateOptions {
    /// Media type for `path`: the override table first, then the MIME database.
    /// Unknown extensions yield an empty string.
    pub fn content_type_for(&self, path: &Path) -> String {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return String::new();
        };
        let ext = ext.to_ascii_lowercase();
        if let Some(content_type) = self.content_types.get(&ext) {
            return content_type.clone();
        }
        mime_guess::from_ext(&ext)
            .first_raw()
            .map(str::to_string)
            .unwrap_or_default()
    }
}
