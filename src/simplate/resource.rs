use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::spec::{parse_spec, PageSpec, SpecError};
use super::SimplateOptions;
use crate::error::{Error, Result};

/// Separator between the pages of a simplate (ASCII form feed, `^L`).
pub const PAGE_BREAK: char = '\x0C';

const JSON_CONTENT_TYPE: &str = "application/json";

/// How a simplate is turned into a response, decided by its page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimplateKind {
    /// No page breaks: served byte-for-byte
    Static,
    /// Init, logic and one template page
    Rendered,
    /// Init and logic pages; the response body is JSON
    Json,
    /// Init, logic and one template page per negotiated media type
    Negotiated,
}

impl SimplateKind {
    /// Every kind, in alphabetical order.
    pub const ALL: [SimplateKind; 4] = [
        SimplateKind::Json,
        SimplateKind::Negotiated,
        SimplateKind::Rendered,
        SimplateKind::Static,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SimplateKind::Static => "static",
            SimplateKind::Rendered => "rendered",
            SimplateKind::Json => "json",
            SimplateKind::Negotiated => "negotiated",
        }
    }
}

impl fmt::Display for SimplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One section of a simplate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Raw text of the section (the specline excluded)
    pub body: String,
    /// Negotiation declaration; only template pages carry one
    pub spec: Option<PageSpec>,
}

impl Page {
    fn plain(raw: &str) -> Self {
        Page {
            body: raw.to_string(),
            spec: None,
        }
    }
}

/// Page layout per kind. Keeping the pages inside the kind makes an
/// inconsistent simplate unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pages {
    Static {
        body: Vec<u8>,
    },
    Rendered {
        init: Page,
        logic: Page,
        template: Page,
    },
    Json {
        init: Page,
        logic: Page,
    },
    Negotiated {
        init: Page,
        logic: Page,
        templates: Vec<Page>,
    },
}

/// A parsed page-resource bound to one file under the site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simplate {
    site_root: PathBuf,
    relative_path: PathBuf,
    content_type: String,
    pages: Pages,
}

impl Simplate {
    /// Read `path` and parse it as a simplate rooted at `site_root`.
    pub fn from_file(site_root: &Path, path: &Path, options: &SimplateOptions) -> Result<Self> {
        let content = fs::read(path).map_err(|e| Error::io(path, e))?;
        Self::parse(site_root, path, &content, options)
    }

    /// Parse raw file content.
    ///
    /// The number of page breaks decides the kind: none is static, one or two
    /// is rendered (or JSON for `application/json` files), more is negotiated.
    /// Content that is not UTF-8 is always static.
    pub fn parse(
        site_root: &Path,
        path: &Path,
        content: &[u8],
        options: &SimplateOptions,
    ) -> Result<Self> {
        let relative_path = relative_to(site_root, path)?;
        let content_type = options.content_type_for(&relative_path);

        let Ok(text) = std::str::from_utf8(content) else {
            return Ok(Simplate {
                site_root: site_root.to_path_buf(),
                relative_path,
                content_type,
                pages: Pages::Static {
                    body: content.to_vec(),
                },
            });
        };

        let raw_pages: Vec<&str> = text.split(PAGE_BREAK).collect();
        let breaks = raw_pages.len() - 1;

        let pages = match breaks {
            0 => Pages::Static {
                body: content.to_vec(),
            },
            1 | 2 => {
                let init = Page::plain(raw_pages[0]);
                let logic = Page::plain(raw_pages[1]);
                if content_type == JSON_CONTENT_TYPE {
                    Pages::Json { init, logic }
                } else {
                    let raw = raw_pages.get(2).ok_or_else(|| {
                        Error::malformed(
                            &relative_path,
                            "a rendered simplate needs a template page after its logic page",
                        )
                    })?;
                    let template = template_page(
                        &relative_path,
                        SimplateKind::Rendered,
                        &content_type,
                        raw,
                        options,
                    )?;
                    Pages::Rendered {
                        init,
                        logic,
                        template,
                    }
                }
            }
            _ => {
                let init = Page::plain(raw_pages[0]);
                let logic = Page::plain(raw_pages[1]);
                let templates = raw_pages[2..]
                    .iter()
                    .map(|raw| {
                        template_page(
                            &relative_path,
                            SimplateKind::Negotiated,
                            &content_type,
                            raw,
                            options,
                        )
                    })
                    .collect::<Result<Vec<_>>>()?;
                ensure_unique_content_types(&relative_path, &templates)?;
                Pages::Negotiated {
                    init,
                    logic,
                    templates,
                }
            }
        };

        Ok(Simplate {
            site_root: site_root.to_path_buf(),
            relative_path,
            content_type,
            pages,
        })
    }

    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    /// Path relative to the site root; the simplate's identity.
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Media type inferred from the file extension, empty when unknown.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn kind(&self) -> SimplateKind {
        match self.pages {
            Pages::Static { .. } => SimplateKind::Static,
            Pages::Rendered { .. } => SimplateKind::Rendered,
            Pages::Json { .. } => SimplateKind::Json,
            Pages::Negotiated { .. } => SimplateKind::Negotiated,
        }
    }

    pub fn init_page(&self) -> Option<&Page> {
        match &self.pages {
            Pages::Static { .. } => None,
            Pages::Rendered { init, .. }
            | Pages::Json { init, .. }
            | Pages::Negotiated { init, .. } => Some(init),
        }
    }

    pub fn logic_page(&self) -> Option<&Page> {
        match &self.pages {
            Pages::Static { .. } => None,
            Pages::Rendered { logic, .. }
            | Pages::Json { logic, .. }
            | Pages::Negotiated { logic, .. } => Some(logic),
        }
    }

    /// Template pages in declaration order, which is also their negotiation priority.
    pub fn template_pages(&self) -> &[Page] {
        match &self.pages {
            Pages::Static { .. } | Pages::Json { .. } => &[],
            Pages::Rendered { template, .. } => std::slice::from_ref(template),
            Pages::Negotiated { templates, .. } => templates,
        }
    }

    pub fn first_template_page(&self) -> Option<&Page> {
        self.template_pages().first()
    }

    /// Raw bytes of a static simplate.
    pub fn static_body(&self) -> Option<&[u8]> {
        match &self.pages {
            Pages::Static { body } => Some(body),
            _ => None,
        }
    }
}

fn template_page(
    relative_path: &Path,
    kind: SimplateKind,
    content_type: &str,
    raw: &str,
    options: &SimplateOptions,
) -> Result<Page> {
    let (specline, body) = raw.split_once('\n').ok_or_else(|| {
        Error::malformed(
            relative_path,
            format!("template page has no body after its specline {:?}", raw.trim()),
        )
    })?;
    let spec = parse_spec(kind, content_type, specline.trim(), options).map_err(|source| {
        Error::Spec {
            path: relative_path.to_path_buf(),
            source,
        }
    })?;
    Ok(Page {
        body: body.to_string(),
        spec: Some(spec),
    })
}

fn ensure_unique_content_types(relative_path: &Path, templates: &[Page]) -> Result<()> {
    let mut seen = HashSet::new();
    for spec in templates.iter().filter_map(|page| page.spec.as_ref()) {
        if !seen.insert(spec.content_type.to_ascii_lowercase()) {
            return Err(Error::Spec {
                path: relative_path.to_path_buf(),
                source: SpecError::DuplicateContentType {
                    content_type: spec.content_type.clone(),
                },
            });
        }
    }
    Ok(())
}

/// Lexically normalise a path: drop `.` components and resolve `..` against
/// preceding components. Never touches the filesystem.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !cleaned.pop() {
                    cleaned.push("..");
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

fn relative_to(site_root: &Path, path: &Path) -> Result<PathBuf> {
    let root = std::path::absolute(site_root).map_err(|e| Error::io(site_root, e))?;
    let file = std::path::absolute(path).map_err(|e| Error::io(path, e))?;
    let relative = clean_path(&file)
        .strip_prefix(clean_path(&root))
        .map(Path::to_path_buf)
        .map_err(|_| {
            Error::path(
                path,
                format!("not inside the site root {}", site_root.display()),
            )
        })?;
    if relative.as_os_str().is_empty() {
        return Err(Error::path(path, "is the site root itself, not a file in it"));
    }
    Ok(relative)
}
