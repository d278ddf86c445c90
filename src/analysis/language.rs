//! Language profiles and idiom detection.
//!
//! A [`LanguageProfile`] bundles the file extensions and structural regex
//! patterns for one implementation language. Adding a language means adding
//! a profile instance; no classifier logic changes.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex_lite::Regex;

/// What kind of identifier a structural pattern captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralKind {
    Function,
    Class,
    Import,
    Decorator,
    Export,
}

/// Extraction profile for one implementation language.
pub struct LanguageProfile {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    /// Regexes run against the added-line block. For patterns with several
    /// capture alternatives, the first non-empty group per match wins.
    pub patterns: Vec<(StructuralKind, Regex)>,
}

/// Name of the catch-all profile for unknown extensions.
pub const GENERAL: &str = "general";

static PROFILES: LazyLock<Vec<LanguageProfile>> = LazyLock::new(|| {
    vec![
        LanguageProfile {
            name: "python",
            extensions: &[".py", ".pyx", ".pyi"],
            patterns: vec![
                (StructuralKind::Class, compile(r"class\s+(\w+)")),
                (StructuralKind::Function, compile(r"def\s+(\w+)")),
                (
                    StructuralKind::Import,
                    compile(r"(?:from\s+\w+\s+)?import\s+([\w\.,\s]+)"),
                ),
                (StructuralKind::Decorator, compile(r"@(\w+)")),
            ],
        },
        LanguageProfile {
            name: "javascript",
            extensions: &[".js", ".ts", ".jsx", ".tsx"],
            patterns: vec![
                (
                    StructuralKind::Function,
                    compile(
                        r"(?:function\s+(\w+)|(\w+)\s*=\s*(?:async\s+)?(?:function|\()|(?:async\s+)?(\w+)\s*\()",
                    ),
                ),
                (StructuralKind::Class, compile(r"class\s+(\w+)")),
                (
                    StructuralKind::Import,
                    compile(r#"import\s+(?:\{[^}]+\}|\w+)\s+from\s+['"][^'"]+['"]"#),
                ),
                (
                    StructuralKind::Export,
                    compile(r"export\s+(?:default\s+)?(?:class|function|const|let|var)\s+(\w+)"),
                ),
            ],
        },
        // Catch-all: no structural extraction, idiom detection only.
        LanguageProfile {
            name: GENERAL,
            extensions: &[],
            patterns: vec![],
        },
    ]
});

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static language pattern must compile")
}

/// Resolve the profile for a file path by extension.
///
/// Unknown extensions (or extensionless paths) map to the "general"
/// profile.
pub fn profile_for_path(path: &str) -> &'static LanguageProfile {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let ext = file_name
        .rfind('.')
        .map(|i| file_name[i..].to_ascii_lowercase())
        .unwrap_or_default();

    PROFILES
        .iter()
        .find(|p| p.extensions.contains(&ext.as_str()))
        .unwrap_or_else(|| PROFILES.last().expect("general profile is always present"))
}

/// Idiom detection table: an idiom is present when ANY of its keywords
/// occurs as a substring of the lower-cased added text.
pub const IDIOM_KEYWORDS: &[(&str, &[&str])] = &[
    ("middleware", &["middleware", "decorator", "@app.", "@route"]),
    (
        "api_endpoint",
        &["@app.route", "def get_", "def post_", "def put_", "def delete_", "api"],
    ),
    (
        "database",
        &["select", "insert", "create table", "migration", "query", "model"],
    ),
    ("validation", &["validate", "schema", "required", "optional", "check"]),
    ("error_handling", &["try:", "except:", "raise", "error", "exception"]),
    (
        "logging",
        &["logger", "log.", "print(", "debug", "info", "warning", "error"],
    ),
    ("testing", &["assert", "test_", "mock", "fixture", "should", "expect"]),
    (
        "authentication",
        &["auth", "login", "token", "jwt", "session", "password"],
    ),
    ("async", &["async", "await", "promise", "callback"]),
    (
        "configuration",
        &["config", "settings", "env", "constant", "parameter"],
    ),
];

/// Detect idioms in a block of added text. Multiple idioms may co-occur.
pub fn detect_idioms(added_text: &str) -> BTreeSet<&'static str> {
    let lower = added_text.to_lowercase();
    IDIOM_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(name, _)| *name)
        .collect()
}
