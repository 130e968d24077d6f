#![allow(dead_code)]

pub mod site {
    use std::fs;
    use std::path::{Path, PathBuf};

    pub const BASIC_RENDERED_TXT: &str = "
#[derive(serde::Serialize)]
struct RDance {
    who: String,
}
\x0C
ctx.insert(\"d\", RDance { who: \"Everybody\".to_string() })?;
\x0C
{{ d.who }} Dance Now!
";

    pub const BASIC_STATIC_TXT: &str = "
Everybody Dance Now!
";

    pub const BASIC_JSON: &str = "
#[derive(serde::Serialize)]
struct JDance {
    who: String,
}
\x0C
let dance = JDance { who: \"Everybody\".to_string() };
response.set_body(&dance)?;
";

    pub const BASIC_NEGOTIATED: &str = "
#[derive(serde::Serialize)]
struct NDance {
    who: String,
}
\x0C
ctx.insert(\"d\", NDance { who: \"Everybody\".to_string() })?;
\x0C text/plain
{{ d.who }} Dance Now!

\x0C application/json
{\"who\":\"{{ d.who }}\"}
";

    /// The reference site: one resource of every kind.
    pub const SITE_FILES: [(&str, &str); 5] = [
        ("hams/bone/derp", BASIC_NEGOTIATED),
        ("shill/cans.txt", BASIC_RENDERED_TXT),
        ("hat/v.json", BASIC_JSON),
        (
            "silmarillion.handlebar.mustache.moniker.html",
            "<html>INVALID AS BUTT</html>",
        ),
        ("Big CMS/Owns_UR Contents/flurb.txt", BASIC_STATIC_TXT),
    ];

    /// Build artifacts and index files a walk must ignore.
    pub const HIDDEN_FILES: [(&str, &str); 3] = [
        (".aspen-index", "shill/cans.txt\n"),
        (".git/HEAD", "ref: refs/heads/main\n"),
        ("shill/.cans.txt.swp", "\x0C\x0Cbroken"),
    ];

    pub fn write_files(root: &Path, files: &[(&str, &str)]) {
        for (path, content) in files {
            let full = root.join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
    }

    /// A temp dir holding `site/` (the reference site plus hidden files)
    /// and an empty `out/`.
    pub fn make_site() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("site");
        let out = dir.path().join("out");
        write_files(&site, &SITE_FILES);
        write_files(&site, &HIDDEN_FILES);
        fs::create_dir_all(&out).unwrap();
        (dir, site, out)
    }
}

pub mod toolchain {
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Check if cargo fmt is available
    pub fn is_cargo_fmt_available() -> bool {
        std::process::Command::new("cargo")
            .arg("fmt")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Write an executable `/bin/sh` script named `cargo` into `dir`.
    #[cfg(unix)]
    pub fn write_stub_cargo(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let stub = dir.join("cargo");
        fs::write(&stub, format!("#!/bin/sh\n{body}")).unwrap();
        let mut perms = fs::metadata(&stub).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&stub, perms).unwrap();
        stub
    }
}
