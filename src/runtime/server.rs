use std::path::Path;

use anyhow::anyhow;
use tracing::{debug, error, info, warn};

use super::{Docroot, Request, Response, Routes};

/// Serve `routes`, then the files under `docroot`, on `bind`.
///
/// `bind` may omit the host (`:8080`), which binds every interface.
/// Runs until the process is stopped.
pub fn serve(bind: &str, docroot: &Path, routes: Routes) -> anyhow::Result<()> {
    let addr = normalize_bind(bind);
    let server =
        tiny_http::Server::http(addr.as_str()).map_err(|e| anyhow!("failed to bind {addr}: {e}"))?;
    let docroot = Docroot::new(docroot);
    info!(
        addr = %addr,
        docroot = %docroot.base_dir().display(),
        resources = routes.len(),
        "site server listening"
    );

    for mut incoming in server.incoming_requests() {
        let request = match convert_request(&mut incoming) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "failed to read request");
                if let Err(e) = incoming.respond(tiny_http::Response::empty(400)) {
                    warn!(error = %e, "failed to send response");
                }
                continue;
            }
        };
        let response = dispatch(&routes, &docroot, &request);
        info!(
            method = %request.method(),
            path = %request.path(),
            status = response.status(),
            "request handled"
        );
        if let Err(e) = incoming.respond(convert_response(response)) {
            warn!(error = %e, "failed to send response");
        }
    }
    Ok(())
}

/// Answer one request: a generated resource at the exact path, else a
/// docroot file, else 404.
pub fn dispatch(routes: &Routes, docroot: &Docroot, request: &Request) -> Response {
    let mut response = Response::new();
    if let Some(resource) = routes.get(request.path()) {
        debug!(resource = resource.path(), "dispatching to resource");
        if let Err(e) = resource.respond(request, &mut response) {
            error!(path = %request.path(), error = %e, "resource failed");
            response = Response::new();
            response.set_status(500);
            response.set_header("Content-Type", "text/plain; charset=utf-8");
            response.set_text("Internal Server Error\n");
        }
        return response;
    }
    match docroot.load(request.path()) {
        Ok((bytes, content_type)) => {
            response.set_header("Content-Type", content_type);
            response.set_bytes(bytes);
        }
        Err(_) => {
            response.set_status(404);
            response.set_header("Content-Type", "text/plain; charset=utf-8");
            response.set_text("Not Found\n");
        }
    }
    response
}

fn normalize_bind(bind: &str) -> String {
    if bind.starts_with(':') {
        format!("0.0.0.0{bind}")
    } else {
        bind.to_string()
    }
}

fn convert_request(incoming: &mut tiny_http::Request) -> anyhow::Result<Request> {
    let (raw_path, query) = match incoming.url().split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (incoming.url().to_string(), None),
    };
    let path = urlencoding::decode(&raw_path)?.into_owned();
    let mut request = Request::new(incoming.method().to_string(), path);
    if let Some(query) = query {
        request = request.with_query(query);
    }
    for header in incoming.headers() {
        request = request.with_header(header.field.to_string(), header.value.to_string());
    }
    let mut body = Vec::new();
    incoming.as_reader().read_to_end(&mut body)?;
    Ok(request.with_body(body))
}

fn convert_response(response: Response) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let (status, headers, body) = response.into_parts();
    let mut out = tiny_http::Response::from_data(body).with_status_code(status);
    for (name, value) in headers {
        match tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => out = out.with_header(header),
            Err(()) => warn!(header = %name, "dropping header that is not valid ASCII"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::runtime::{finish_rendered, Context, Page, Resource, MINIJINJA_RENDERER};
    use std::fs;

    struct Hello;

    const HELLO_PAGE: Page = Page {
        content_type: "text/plain",
        renderer: MINIJINJA_RENDERER,
        body: "Hello, {{ who }}!",
    };

    impl Resource for Hello {
        fn path(&self) -> &'static str {
            "hello.txt"
        }

        fn respond(&self, request: &Request, response: &mut Response) -> anyhow::Result<()> {
            let mut ctx = Context::new();
            ctx.insert("who", request.query().unwrap_or("world"))?;
            finish_rendered(response, &HELLO_PAGE, &ctx)
        }
    }

    struct Broken;

    impl Resource for Broken {
        fn path(&self) -> &'static str {
            "broken.txt"
        }

        fn respond(&self, _request: &Request, _response: &mut Response) -> anyhow::Result<()> {
            Err(anyhow!("logic page failed"))
        }
    }

    fn fixture() -> (tempfile::TempDir, Routes, Docroot) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("robots.txt"), "User-agent: *\n").unwrap();
        let mut routes = Routes::new();
        routes.register(Box::new(Hello));
        routes.register(Box::new(Broken));
        let docroot = Docroot::new(dir.path());
        (dir, routes, docroot)
    }

    #[test]
    fn test_dispatch_resource() {
        let (_dir, routes, docroot) = fixture();
        let request = Request::new("GET", "/hello.txt").with_query("aspen");
        let response = dispatch(&routes, &docroot, &request);
        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), b"Hello, aspen!");
    }

    #[test]
    fn test_dispatch_docroot_and_missing() {
        let (_dir, routes, docroot) = fixture();
        let response = dispatch(&routes, &docroot, &Request::new("GET", "/robots.txt"));
        assert_eq!(response.status(), 200);
        assert_eq!(response.content_type(), Some("text/plain"));
        let response = dispatch(&routes, &docroot, &Request::new("GET", "/missing.txt"));
        assert_eq!(response.status(), 404);
    }

    #[test]
    fn test_dispatch_resource_error_is_500() {
        let (_dir, routes, docroot) = fixture();
        let response = dispatch(&routes, &docroot, &Request::new("GET", "/broken.txt"));
        assert_eq!(response.status(), 500);
    }

    #[test]
    fn test_normalize_bind() {
        assert_eq!(normalize_bind(":9182"), "0.0.0.0:9182");
        assert_eq!(normalize_bind("127.0.0.1:8080"), "127.0.0.1:8080");
    }
}
