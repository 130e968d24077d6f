use aspen::runtime::{
    finish_json, finish_negotiated, serve, Context, Page, Request, Resource, Response, Routes,
    MINIJINJA_RENDERER,
};
use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::time::Duration;

const DANCE_PAGES: &[Page] = &[
    Page {
        content_type: "text/plain",
        renderer: MINIJINJA_RENDERER,
        body: "{{ who }} Dance Now!",
    },
    Page {
        content_type: "application/json",
        renderer: MINIJINJA_RENDERER,
        body: "{\"who\":\"{{ who }}\"}",
    },
];

struct Dance;

impl Resource for Dance {
    fn path(&self) -> &'static str {
        "hams/bone/derp"
    }

    fn respond(&self, request: &Request, response: &mut Response) -> anyhow::Result<()> {
        let mut ctx = Context::new();
        ctx.insert("who", "Everybody")?;
        finish_negotiated(response, DANCE_PAGES, &ctx, request)
    }
}

struct Spaced;

impl Resource for Spaced {
    fn path(&self) -> &'static str {
        "Big CMS/v.json"
    }

    fn respond(&self, _request: &Request, response: &mut Response) -> anyhow::Result<()> {
        let mut ctx = Context::new();
        ctx.insert("owned", true)?;
        finish_json(response, "application/json", &ctx)
    }
}

fn start_server() -> (tempfile::TempDir, SocketAddr) {
    let docroot = tempfile::tempdir().unwrap();
    fs::write(docroot.path().join("robots.txt"), "User-agent: *\n").unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let root = PathBuf::from(docroot.path());
    std::thread::spawn(move || {
        let mut routes = Routes::new();
        routes.register(Box::new(Dance));
        routes.register(Box::new(Spaced));
        serve(&addr.to_string(), &root, routes)
    });
    for _ in 0..50 {
        if TcpStream::connect(addr).is_ok() {
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    (docroot, addr)
}

fn send_request(addr: &SocketAddr, path: &str, accept: Option<&str>) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    let accept = accept
        .map(|a| format!("Accept: {a}\r\n"))
        .unwrap_or_default();
    let req = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n{accept}Connection: close\r\n\r\n");
    stream.write_all(req.as_bytes()).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let mut buf = String::new();
    stream.read_to_string(&mut buf).unwrap();
    buf
}

#[test]
fn test_negotiated_resource_over_http() {
    let (_docroot, addr) = start_server();
    let plain = send_request(&addr, "/hams/bone/derp", None);
    assert!(plain.starts_with("HTTP/1.1 200"), "{plain}");
    assert!(plain.ends_with("Everybody Dance Now!"), "{plain}");

    let json = send_request(&addr, "/hams/bone/derp", Some("application/json"));
    assert!(json.ends_with("{\"who\":\"Everybody\"}"), "{json}");

    let refused = send_request(&addr, "/hams/bone/derp", Some("image/png"));
    assert!(refused.starts_with("HTTP/1.1 406"), "{refused}");
}

#[test]
fn test_percent_encoded_path_and_docroot() {
    let (_docroot, addr) = start_server();
    let spaced = send_request(&addr, "/Big%20CMS/v.json", None);
    assert!(spaced.ends_with("{\"owned\":true}"), "{spaced}");

    let robots = send_request(&addr, "/robots.txt", None);
    assert!(robots.starts_with("HTTP/1.1 200"), "{robots}");
    assert!(robots.ends_with("User-agent: *\n"), "{robots}");

    let missing = send_request(&addr, "/nope", None);
    assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");
}
