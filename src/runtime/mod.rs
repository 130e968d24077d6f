//! # Runtime Module
//!
//! The thin surface that generated site packages link against. Every
//! generated unit implements [`Resource`]; its logic page runs with a
//! [`Context`] named `ctx`, the incoming [`Request`] named `request` and the
//! outgoing [`Response`] named `response` in scope:
//!
//! ```rust,ignore
//! ctx.insert("who", "Everybody")?;
//! response.set_header("Cache-Control", "no-store");
//! ```
//!
//! After the logic page runs, the unit finishes the response according to
//! its kind ([`finish_rendered`], [`finish_json`], [`finish_negotiated`]).
//! A logic page that already set a body short-circuits template rendering.
//!
//! The HTTP shell in [`serve`] is intentionally small: exact path lookup in
//! [`Routes`], then files under the docroot, then 404.

mod docroot;
mod negotiation;
mod server;

pub use docroot::Docroot;
pub use negotiation::{parse_accept, select, MediaRange};
pub use server::{dispatch, serve};

use std::collections::BTreeMap;

use anyhow::bail;
use serde::Serialize;
use serde_json::{Map, Value};

/// Renderer backed by minijinja templates.
pub const MINIJINJA_RENDERER: &str = "minijinja";
/// Renderer that emits the page body unchanged.
pub const VERBATIM_RENDERER: &str = "verbatim";
/// Every renderer [`render_page`] understands.
pub const RENDERERS: [&str; 2] = [MINIJINJA_RENDERER, VERBATIM_RENDERER];

const JSON_CONTENT_TYPE: &str = "application/json";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A template page compiled into a generated unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub content_type: &'static str,
    pub renderer: &'static str,
    pub body: &'static str,
}

/// Values the logic page hands to the template pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context(Map<String, Value>);

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `value` and store it under `key`.
    pub fn insert<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> anyhow::Result<()> {
        self.0.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An incoming request as seen by a logic page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
    query: Option<String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Decoded URL path, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn accept(&self) -> Option<&str> {
        self.header("Accept")
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// The response a resource builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: None,
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Set a header, replacing any existing header of the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// Serialize `value` as the JSON body.
    pub fn set_body<T: Serialize + ?Sized>(&mut self, value: &T) -> anyhow::Result<()> {
        self.body = Some(serde_json::to_vec(value)?);
        if self.content_type().is_none() {
            self.set_header("Content-Type", JSON_CONTENT_TYPE);
        }
        Ok(())
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.body = Some(text.into().into_bytes());
    }

    pub fn set_bytes(&mut self, bytes: Vec<u8>) {
        self.body = Some(bytes);
    }

    /// True once the logic page (or a finisher) has produced a body.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn body(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }

    pub fn into_parts(self) -> (u16, Vec<(String, String)>, Vec<u8>) {
        (self.status, self.headers, self.body.unwrap_or_default())
    }

    fn default_content_type(&mut self, content_type: &str) {
        if self.content_type().is_none() {
            let content_type = if content_type.is_empty() {
                FALLBACK_CONTENT_TYPE
            } else {
                content_type
            };
            self.set_header("Content-Type", content_type);
        }
    }
}

/// A generated resource, mounted at a path relative to the site root.
pub trait Resource: Send + Sync {
    /// Site path, e.g. `shill/cans.txt`
    fn path(&self) -> &'static str;

    /// Run the logic page and fill in `response`.
    fn respond(&self, request: &Request, response: &mut Response) -> anyhow::Result<()>;
}

/// Generated resources keyed by site path.
#[derive(Default)]
pub struct Routes {
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `resource` at its own path, replacing any previous resource there.
    pub fn register(&mut self, resource: Box<dyn Resource>) {
        self.resources.insert(resource.path(), resource);
    }

    /// Resource for a URL path; a leading `/` is ignored.
    pub fn get(&self, url_path: &str) -> Option<&dyn Resource> {
        self.resources
            .get(url_path.trim_start_matches('/'))
            .map(|r| r.as_ref())
    }

    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Render one template page with `ctx`.
pub fn render_page(page: &Page, ctx: &Context) -> anyhow::Result<String> {
    match page.renderer {
        MINIJINJA_RENDERER => {
            let env = minijinja::Environment::new();
            Ok(env.render_str(page.body, ctx)?)
        }
        VERBATIM_RENDERER => Ok(page.body.to_string()),
        other => bail!("unknown renderer {other:?}"),
    }
}

/// Finish a rendered resource with its single template page.
pub fn finish_rendered(response: &mut Response, page: &Page, ctx: &Context) -> anyhow::Result<()> {
    if !response.has_body() {
        let body = render_page(page, ctx)?;
        response.set_text(body);
    }
    response.default_content_type(page.content_type);
    Ok(())
}

/// Finish a JSON resource; the whole context becomes the body unless the
/// logic page set one.
pub fn finish_json(
    response: &mut Response,
    content_type: &str,
    ctx: &Context,
) -> anyhow::Result<()> {
    if !response.has_body() {
        response.body = Some(serde_json::to_vec(ctx)?);
    }
    response.default_content_type(if content_type.is_empty() {
        JSON_CONTENT_TYPE
    } else {
        content_type
    });
    Ok(())
}

/// Finish a negotiated resource with the page the request's `Accept`
/// header prefers; 406 when none is acceptable.
pub fn finish_negotiated(
    response: &mut Response,
    pages: &[Page],
    ctx: &Context,
    request: &Request,
) -> anyhow::Result<()> {
    response.set_header("Vary", "Accept");
    if response.has_body() {
        return Ok(());
    }
    match select(pages, request.accept()) {
        Some(page) => {
            let body = render_page(page, ctx)?;
            response.set_text(body);
            response.default_content_type(page.content_type);
        }
        None => {
            let available = pages
                .iter()
                .map(|p| p.content_type)
                .collect::<Vec<_>>()
                .join(", ");
            response.set_status(406);
            response.set_header("Content-Type", "text/plain; charset=utf-8");
            response.set_text(format!("Not Acceptable. Available media types: {available}\n"));
        }
    }
    Ok(())
}
