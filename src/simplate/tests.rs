#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::error::Error;
use std::path::{Path, PathBuf};

pub(crate) const BASIC_RENDERED_TXT: &str = "
#[derive(serde::Serialize)]
struct RDance {
    who: String,
}
\x0C
ctx.insert(\"d\", RDance { who: \"Everybody\".to_string() })?;
\x0C
{{ d.who }} Dance Now!
";

pub(crate) const BASIC_STATIC_TXT: &str = "
Everybody Dance Now!
";

pub(crate) const BASIC_JSON: &str = "
#[derive(serde::Serialize)]
struct JDance {
    who: String,
}
\x0C
let dance = JDance { who: \"Everybody\".to_string() };
response.set_body(&dance)?;
";

pub(crate) const BASIC_NEGOTIATED: &str = "
#[derive(serde::Serialize)]
struct NDance {
    who: String,
}
\x0C
ctx.insert(\"d\", NDance { who: \"Everybody\".to_string() })?;
\x0C text/plain
{{ d.who }} Dance Now!

\x0C application/json #!minijinja
{\"who\":\"{{ d.who }}\"}
";

fn parse(path: &str, content: &str) -> Result<Simplate, Error> {
    Simplate::parse(
        Path::new("/tmp"),
        &Path::new("/tmp").join(path),
        content.as_bytes(),
        &SimplateOptions::default(),
    )
}

#[test]
fn test_simplate_knows_its_relative_path() {
    let s = parse("hasty-decisions.txt", "herpherpderpherp").unwrap();
    assert_eq!(s.relative_path(), Path::new("hasty-decisions.txt"));
    assert_eq!(s.site_root(), Path::new("/tmp"));
}

#[test]
fn test_simplate_knows_its_content_type() {
    let s = parse("hasty-decisions.js", "function herp() { return 'derp'; }").unwrap();
    let expected = mime_guess::from_ext("js").first_raw().unwrap();
    assert_eq!(s.content_type(), expected);
}

#[test]
fn test_unknown_extension_has_empty_content_type() {
    let s = parse("hams/bone/derp", BASIC_NEGOTIATED).unwrap();
    assert_eq!(s.content_type(), "");
}

#[test]
fn test_content_type_override_wins() {
    let mut options = SimplateOptions::default();
    options
        .content_types
        .insert("txt".to_string(), "text/x-dance".to_string());
    let s = Simplate::parse(
        Path::new("/tmp"),
        Path::new("/tmp/flurb.TXT"),
        b"plain",
        &options,
    )
    .unwrap();
    assert_eq!(s.content_type(), "text/x-dance");
}

#[test]
fn test_rejects_paths_outside_site_root() {
    let err = Simplate::parse(
        Path::new("/tmp/site"),
        Path::new("/etc/passwd"),
        b"",
        &SimplateOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Path { .. }), "{err:?}");

    let err = Simplate::parse(
        Path::new("/tmp/site"),
        Path::new("/tmp/site/../escape.txt"),
        b"",
        &SimplateOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Path { .. }), "{err:?}");
}

#[test]
fn test_detects_static_simplate() {
    let s = parse("flurb.txt", "Everybody Dance Now!\n").unwrap();
    assert_eq!(s.kind(), SimplateKind::Static);
    assert!(s.init_page().is_none());
    assert!(s.logic_page().is_none());
    assert!(s.template_pages().is_empty());
    assert_eq!(s.static_body().unwrap(), b"Everybody Dance Now!\n");
}

#[test]
fn test_empty_file_is_static() {
    let s = parse("empty.html", "").unwrap();
    assert_eq!(s.kind(), SimplateKind::Static);
    assert_eq!(s.static_body().unwrap(), b"");
}

#[test]
fn test_non_utf8_content_is_static() {
    let bytes = [0x89, b'P', b'N', b'G', 0x0C, 0xff, 0xfe];
    let s = Simplate::parse(
        Path::new("/tmp"),
        Path::new("/tmp/logo.png"),
        &bytes,
        &SimplateOptions::default(),
    )
    .unwrap();
    assert_eq!(s.kind(), SimplateKind::Static);
    assert_eq!(s.static_body().unwrap(), &bytes);
}

#[test]
fn test_detects_rendered_simplate() {
    let s = parse("basic-rendered.txt", BASIC_RENDERED_TXT).unwrap();
    assert_eq!(s.kind(), SimplateKind::Rendered);
    assert!(s.init_page().unwrap().body.contains("struct RDance"));
    assert!(s.logic_page().unwrap().body.contains("ctx.insert"));
    assert_eq!(s.template_pages().len(), 1);

    let template = s.first_template_page().unwrap();
    assert_eq!(template.body, "{{ d.who }} Dance Now!\n");
    let spec = template.spec.as_ref().unwrap();
    assert_eq!(spec.content_type, "text/plain");
    assert_eq!(spec.renderer, DEFAULT_RENDERER);
    assert!(s.init_page().unwrap().spec.is_none());
    assert!(s.logic_page().unwrap().spec.is_none());
}

#[test]
fn test_rendered_with_single_break_is_malformed() {
    let err = parse("half.html", "init\x0Clogic").unwrap_err();
    assert!(matches!(err, Error::MalformedResource { .. }), "{err:?}");
}

#[test]
fn test_template_page_without_body_is_malformed() {
    let err = parse("nobody.html", "init\x0Clogic\x0C#!verbatim").unwrap_err();
    match err {
        Error::MalformedResource { path, reason } => {
            assert_eq!(path, PathBuf::from("nobody.html"));
            assert!(reason.contains("#!verbatim"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_detects_json_simplate() {
    let s = parse("basic.json", BASIC_JSON).unwrap();
    assert_eq!(s.kind(), SimplateKind::Json);
    assert!(s.init_page().unwrap().body.contains("struct JDance"));
    assert!(s.logic_page().unwrap().body.contains("response.set_body"));
    assert!(s.template_pages().is_empty());
}

#[test]
fn test_json_simplate_ignores_third_page() {
    let s = parse("v.json", "init\x0Clogic\x0Cnever rendered\n").unwrap();
    assert_eq!(s.kind(), SimplateKind::Json);
    assert!(s.template_pages().is_empty());
}

#[test]
fn test_detects_negotiated_simplate() {
    let s = parse("hork", BASIC_NEGOTIATED).unwrap();
    assert_eq!(s.kind(), SimplateKind::Negotiated);
    assert!(s.init_page().is_some());
    assert!(s.logic_page().is_some());

    let types: Vec<_> = s
        .template_pages()
        .iter()
        .map(|p| p.spec.as_ref().unwrap().content_type.as_str())
        .collect();
    assert_eq!(types, vec!["text/plain", "application/json"]);
    assert_eq!(
        s.template_pages()[1].spec.as_ref().unwrap().renderer,
        "minijinja"
    );
}

#[test]
fn test_negotiated_template_count_is_breaks_minus_one() {
    for breaks in 3..7 {
        let mut content = String::from("init\x0Clogic");
        for i in 2..=breaks {
            content.push_str(&format!("\x0C text/x-{i}\nbody {i}\n"));
        }
        let s = parse("many", &content).unwrap();
        assert_eq!(s.kind(), SimplateKind::Negotiated);
        assert_eq!(s.template_pages().len(), breaks - 1);
    }
}

#[test]
fn test_negotiated_bad_specline_is_spec_error() {
    let err = parse("bad", "i\x0Cl\x0C text/plain #!a b\nbody\n\x0C text/html\nbody\n")
        .unwrap_err();
    match err {
        Error::Spec { path, source } => {
            assert_eq!(path, PathBuf::from("bad"));
            assert_eq!(
                source,
                SpecError::TokenCount {
                    specline: "text/plain #!a b".to_string()
                }
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_negotiated_duplicate_content_type_is_spec_error() {
    let err = parse(
        "dup",
        "i\x0Cl\x0C text/plain\none\n\x0C TEXT/PLAIN #!verbatim\ntwo\n",
    )
    .unwrap_err();
    assert!(
        matches!(
            err,
            Error::Spec {
                source: SpecError::DuplicateContentType { .. },
                ..
            }
        ),
        "{err:?}"
    );
}

#[test]
fn test_clean_path() {
    assert_eq!(clean_path(Path::new("a//b/./c")), PathBuf::from("a/b/c"));
    assert_eq!(clean_path(Path::new("a/b/../c")), PathBuf::from("a/c"));
    assert_eq!(clean_path(Path::new("./a")), PathBuf::from("a"));
}

#[test]
fn test_kind_names() {
    let names: Vec<_> = SimplateKind::ALL.iter().map(|k| k.to_string()).collect();
    assert_eq!(names, vec!["json", "negotiated", "rendered", "static"]);
}
