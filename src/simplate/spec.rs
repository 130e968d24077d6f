use serde::Serialize;

use super::{SimplateKind, SimplateOptions};

/// Renderer used when a template page does not name one.
pub const DEFAULT_RENDERER: &str = "minijinja";

/// Marker that may prefix a renderer token on a specline, as in `#!minijinja`.
const RENDERER_MARKER: &str = "#!";

/// Content-negotiation declaration carried by a template page.
///
/// `renderer` never includes the leading `#!` marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageSpec {
    /// Media type this page renders
    pub content_type: String,
    /// Rendering engine for the page body
    pub renderer: String,
}

/// A specline that cannot be turned into a [`PageSpec`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    /// Negotiated speclines take exactly one or two whitespace-separated tokens.
    #[error(
        "a negotiated specline must have one or two parts (media/type [#!renderer]); yours is {specline:?}"
    )]
    TokenCount {
        /// The specline, verbatim
        specline: String,
    },
    /// Two template pages of one negotiated simplate claim the same media type.
    #[error("media type {content_type:?} is declared by more than one template page")]
    DuplicateContentType {
        /// The repeated media type
        content_type: String,
    },
}

/// Parse a template page's specline according to the simplate's kind.
///
/// * Static: an empty spec, never consulted.
/// * Json: the inherited content type with the default renderer; the specline is ignored.
/// * Rendered: the specline names the renderer (default when empty); the content type is inherited.
/// * Negotiated: `<media-type>` or `<media-type> <renderer>`.
pub fn parse_spec(
    kind: SimplateKind,
    prior_content_type: &str,
    specline: &str,
    options: &SimplateOptions,
) -> Result<PageSpec, SpecError> {
    match kind {
        SimplateKind::Static => Ok(PageSpec::default()),
        SimplateKind::Json => Ok(PageSpec {
            content_type: prior_content_type.to_string(),
            renderer: options.default_renderer.clone(),
        }),
        SimplateKind::Rendered => Ok(PageSpec {
            content_type: prior_content_type.to_string(),
            renderer: renderer_or_default(specline.trim(), options),
        }),
        SimplateKind::Negotiated => {
            let parts: Vec<&str> = specline.split_whitespace().collect();
            match parts.as_slice() {
                [content_type] => Ok(PageSpec {
                    content_type: (*content_type).to_string(),
                    renderer: options.default_renderer.clone(),
                }),
                [content_type, renderer] => Ok(PageSpec {
                    content_type: (*content_type).to_string(),
                    renderer: renderer_or_default(renderer, options),
                }),
                _ => Err(SpecError::TokenCount {
                    specline: specline.to_string(),
                }),
            }
        }
    }
}

fn renderer_or_default(token: &str, options: &SimplateOptions) -> String {
    let name = token.strip_prefix(RENDERER_MARKER).unwrap_or(token).trim();
    if name.is_empty() {
        options.default_renderer.clone()
    } else {
        name.to_string()
    }
}
