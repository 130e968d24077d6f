use std::path::Path;

use crate::simplate::{clean_path, Simplate, SimplateKind};

/// File extension of generated units.
pub const GENERATED_EXTENSION: &str = "rs";

/// Substitutions applied, in order, to a cleaned relative path.
const ESCAPES: [(char, &str); 4] = [
    ('.', "-DOT-"),
    ('/', "-SLASH-"),
    (' ', "-SPACE-"),
    ('%', "PCT-"),
];

/// Rust symbols derived from a simplate's escaped name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNames {
    /// Flat, separator-free rendition of the relative path
    pub escaped: String,
    /// CamelCase name of the generated resource type
    pub struct_name: String,
    /// UPPER_SNAKE name of the constant holding the site path
    pub const_name: String,
    /// lower_snake name of the module the unit is mounted as
    pub module_name: String,
}

impl ResourceNames {
    pub fn for_path(relative_path: &Path) -> Self {
        let escaped = escape_path(relative_path);
        ResourceNames {
            struct_name: to_struct_name(&escaped),
            const_name: to_const_name(&escaped),
            module_name: to_const_name(&escaped).to_lowercase(),
            escaped,
        }
    }

    /// Every generated identifier that is not a valid Rust identifier, paired
    /// with the role it plays.
    pub fn invalid_identifiers(&self) -> Vec<(&'static str, &str)> {
        [
            ("type", self.struct_name.as_str()),
            ("constant", self.const_name.as_str()),
            ("module", self.module_name.as_str()),
        ]
        .into_iter()
        .filter(|(_, ident)| !is_rust_identifier(ident))
        .collect()
    }

    /// The shared name when the type and constant names coincide (`a` gives
    /// `A` for both). A unit struct lives in the value namespace too, so the
    /// two would clash in the generated module.
    pub fn clashing_name(&self) -> Option<&str> {
        (self.struct_name == self.const_name).then_some(self.struct_name.as_str())
    }
}

/// Clean `relative_path` and escape it into a single flat name, e.g.
/// `shill/cans.txt` becomes `shill-SLASH-cans-DOT-txt`.
pub fn escape_path(relative_path: &Path) -> String {
    let cleaned = clean_path(relative_path);
    let joined = cleaned
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let mut escaped = String::with_capacity(joined.len());
    for ch in joined.chars() {
        match ESCAPES.iter().find(|(from, _)| *from == ch) {
            Some((_, to)) => escaped.push_str(to),
            None => escaped.push(ch),
        }
    }
    escaped
}

/// Name the generated unit is written under. Static simplates keep their
/// relative path; everything else becomes `<escaped>.rs`.
pub fn output_name(simplate: &Simplate) -> String {
    if simplate.kind() == SimplateKind::Static {
        return simplate.relative_path().to_string_lossy().into_owned();
    }
    format!(
        "{}.{GENERATED_EXTENSION}",
        escape_path(simplate.relative_path())
    )
}

/// `basic-rendered-DOT-txt` becomes `BasicRenderedDotTxt`.
pub fn to_struct_name(escaped: &str) -> String {
    escaped
        .split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect()
}

/// `basic-rendered-DOT-txt` becomes `BASIC_RENDERED_DOT_TXT`.
pub fn to_const_name(escaped: &str) -> String {
    escaped.to_uppercase().replace('-', "_")
}

/// True when `ident` parses as a plain Rust identifier: no keywords, no
/// leading digit, no punctuation.
pub fn is_rust_identifier(ident: &str) -> bool {
    !ident.is_empty() && ident != "_" && syn::parse_str::<syn::Ident>(ident).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_escape_path() {
        assert_eq!(
            escape_path(Path::new("shill/cans.txt")),
            "shill-SLASH-cans-DOT-txt"
        );
        assert_eq!(
            escape_path(Path::new("flip/dippy slippy/%zonk/snork.d/basic-rendered.txt")),
            "flip-SLASH-dippy-SPACE-slippy-SLASH-PCT-zonk-SLASH-snork-DOT-d-SLASH-basic-rendered-DOT-txt"
        );
    }

    #[test]
    fn test_escape_path_cleans_first() {
        assert_eq!(
            escape_path(Path::new("./hams//bone/../bone/derp")),
            escape_path(Path::new("hams/bone/derp"))
        );
    }

    #[test]
    fn test_escape_is_injective_over_plain_paths() {
        let paths = [
            "a.b", "a/b", "a b", "a%b", "ab", "a/b.c", "a.b/c", "a b/c", "a/b c", "a.b.c",
        ];
        let escaped: HashSet<_> = paths.iter().map(|p| escape_path(Path::new(p))).collect();
        assert_eq!(escaped.len(), paths.len());
    }

    #[test]
    fn test_escape_is_stable_on_escaped_names() {
        let once = escape_path(Path::new("shill/cans.txt"));
        let twice = escape_path(Path::new(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_symbol_names() {
        let names = ResourceNames::for_path(Path::new("shill/cans.txt"));
        assert_eq!(names.escaped, "shill-SLASH-cans-DOT-txt");
        assert_eq!(names.struct_name, "ShillSlashCansDotTxt");
        assert_eq!(names.const_name, "SHILL_SLASH_CANS_DOT_TXT");
        assert_eq!(names.module_name, "shill_slash_cans_dot_txt");
        assert!(names.invalid_identifiers().is_empty());
    }

    #[test]
    fn test_struct_name_skips_empty_segments() {
        assert_eq!(to_struct_name("a--b-"), "AB");
        assert_eq!(to_struct_name("Owns_UR-SPACE-x"), "Owns_urSpaceX");
    }

    #[test]
    fn test_invalid_identifiers_are_reported() {
        let names = ResourceNames::for_path(Path::new("404.html"));
        let roles: Vec<_> = names.invalid_identifiers().iter().map(|(r, _)| *r).collect();
        assert_eq!(roles, vec!["type", "constant", "module"]);

        let names = ResourceNames::for_path(Path::new("type"));
        let roles: Vec<_> = names.invalid_identifiers().iter().map(|(r, _)| *r).collect();
        assert_eq!(roles, vec!["module"]);

        let names = ResourceNames::for_path(Path::new("a+b.txt"));
        assert_eq!(names.invalid_identifiers().len(), 3);
    }

    #[test]
    fn test_clashing_type_and_constant_names() {
        for path in ["a", "X1", "x_1"] {
            let names = ResourceNames::for_path(Path::new(path));
            assert!(names.invalid_identifiers().is_empty(), "{path}");
            assert_eq!(names.clashing_name(), Some(names.const_name.as_str()), "{path}");
        }
        assert_eq!(
            ResourceNames::for_path(Path::new("shill/cans.txt")).clashing_name(),
            None
        );
    }

    #[test]
    fn test_is_rust_identifier() {
        assert!(is_rust_identifier("hello_world"));
        assert!(is_rust_identifier("Hello"));
        assert!(!is_rust_identifier("fn"));
        assert!(!is_rust_identifier("self"));
        assert!(!is_rust_identifier("1abc"));
        assert!(!is_rust_identifier("a-b"));
        assert!(!is_rust_identifier(""));
        assert!(!is_rust_identifier("_"));
    }
}
