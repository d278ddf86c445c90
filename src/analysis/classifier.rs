//! Change classification: category scoring, scope derivation, breaking
//! change detection and confidence refinement.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::debug;

use crate::analysis::catalog::Category;
use crate::analysis::language::GENERAL;
use crate::analysis::signal::{self, AddedIdentifiers, FileSignal};

/// Per-file signal extraction is bounded to the first N files for cost
/// control; files beyond the bound still count in the path lists.
pub const MAX_ANALYZED_FILES: usize = 10;

/// Textual indicators that a change is breaking.
const BREAKING_PHRASES: &[&str] = &[
    "breaking change",
    "removed function",
    "deleted class",
    "changed signature",
    "deprecated",
    "renamed class",
    "removed parameter",
    "changed return type",
];

// Removed-public-symbol patterns. Python/JavaScript-biased on purpose:
// other languages are never flagged through this path.
static REMOVED_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*def\s+(\w+)").expect("static pattern must compile"));
static REMOVED_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*export\s+(?:function|class)\s+\w+").expect("static pattern must compile")
});
static REMOVED_PUBLIC_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*public\s+\w+\s+\w+").expect("static pattern must compile")
});

/// Final classification of one change batch. Immutable once built;
/// consumed by the synthesizer and by metrics recording.
#[derive(Debug, Clone)]
pub struct Classification {
    pub category: Category,
    /// In [0, 1].
    pub confidence: f64,
    /// Parenthesized scope, e.g. `"(auth)"`, or empty.
    pub scope: String,
    pub breaking_change: bool,
    pub idioms: BTreeSet<&'static str>,
    pub languages: BTreeSet<&'static str>,
    /// Total non-blank added lines across analyzed files.
    pub complexity_score: usize,
    pub files_modified: Vec<String>,
    pub files_added: Vec<String>,
    /// Identifiers introduced by the change, merged across files.
    pub identifiers: AddedIdentifiers,
    pub diff_text: String,
}

impl Classification {
    pub fn file_count(&self) -> usize {
        self.files_modified.len() + self.files_added.len()
    }
}

/// Heuristic change classifier.
///
/// Holds no mutable state; `classify` is a pure function of the diff text,
/// the path lists and the on-disk presence of the files under `root`.
pub struct Classifier {
    root: PathBuf,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new()
    }
}

impl Classifier {
    pub fn new() -> Self {
        Classifier { root: PathBuf::from(".") }
    }

    /// Resolve candidate file paths against `root` when checking whether
    /// they exist on disk.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Classifier { root: root.into() }
    }

    /// Classify a change batch. Never fails: an empty or unusable diff
    /// degrades to the default chore classification with confidence 0.3.
    pub fn classify(
        &self,
        diff_text: &str,
        staged: &[String],
        untracked: &[String],
    ) -> Classification {
        let all_files: Vec<String> = staged.iter().chain(untracked).cloned().collect();
        let signals = self.extract_signals(diff_text, &all_files);

        let mut idioms: BTreeSet<&'static str> = BTreeSet::new();
        for s in &signals {
            idioms.extend(s.idioms.iter().copied());
        }

        let (category, base_confidence) = score_categories(diff_text, &all_files, &idioms);
        let diff_lower = diff_text.to_lowercase();
        let confidence =
            refine_confidence(base_confidence, category, &all_files, &signals, &idioms, &diff_lower);

        let mut identifiers = AddedIdentifiers::default();
        for s in &signals {
            identifiers.functions.extend(s.identifiers.functions.iter().take(2).cloned());
            identifiers.classes.extend(s.identifiers.classes.iter().take(2).cloned());
            identifiers.imports.extend(s.identifiers.imports.iter().take(3).cloned());
        }

        Classification {
            category,
            confidence,
            scope: derive_scope(&all_files, &signals, &idioms),
            breaking_change: detect_breaking_change(diff_text),
            idioms,
            languages: signals.iter().map(|s| s.language).collect(),
            complexity_score: signals.iter().map(|s| s.added_line_count).sum(),
            files_modified: staged.to_vec(),
            files_added: untracked.to_vec(),
            identifiers,
            diff_text: diff_text.to_string(),
        }
    }

    /// Diagnostic text: which signals were detected and why the winning
    /// category was chosen.
    pub fn explain(&self, c: &Classification) -> String {
        let mut out = Vec::new();
        out.push("Change analysis:".to_string());
        out.push(format!(
            "  category: {} (confidence {:.0}%)",
            c.category,
            c.confidence * 100.0
        ));
        if !c.scope.is_empty() {
            out.push(format!("  scope: {}", c.scope));
        }
        if c.breaking_change {
            out.push("  breaking change detected".to_string());
        }
        if !c.idioms.is_empty() {
            let shown: Vec<&str> = c.idioms.iter().copied().take(3).collect();
            out.push(format!("  idioms: {}", shown.join(", ")));
        }
        if c.complexity_score > 0 {
            out.push(format!("  complexity: {} added lines", c.complexity_score));
        }
        out.push(format!("  files affected: {}", c.file_count()));

        out.push(format!("Why '{}':", c.category));
        let mut reasons = Vec::new();
        if c.idioms.contains("api_endpoint") {
            reasons.push("API endpoint patterns detected".to_string());
        }
        if c.idioms.contains("testing") {
            reasons.push("test code detected".to_string());
        }
        if c.idioms.contains("error_handling") && c.category == Category::Fix {
            reasons.push("improved error handling".to_string());
        }
        let diff_lower = c.diff_text.to_lowercase();
        let matched: Vec<&str> = c
            .category
            .keywords()
            .iter()
            .copied()
            .filter(|k| diff_lower.contains(k))
            .take(3)
            .collect();
        if !matched.is_empty() {
            reasons.push(format!("matched keywords: {}", matched.join(", ")));
        }
        if reasons.is_empty() {
            reasons.push("heuristic analysis of the modified files".to_string());
        }
        for reason in reasons {
            out.push(format!("  - {reason}"));
        }

        out.join("\n")
    }

    /// Extract per-file signals for the first [`MAX_ANALYZED_FILES`] paths.
    /// Files absent on disk are skipped, not errored.
    fn extract_signals(&self, diff_text: &str, files: &[String]) -> Vec<FileSignal> {
        files
            .iter()
            .take(MAX_ANALYZED_FILES)
            .filter(|path| {
                let exists = self.root.join(path).exists();
                if !exists {
                    debug!("skipping signal extraction for missing file: {path}");
                }
                exists
            })
            .map(|path| signal::extract_signal(path, diff_text))
            .collect()
    }
}

/// Accumulate the category score vector and pick the winner.
///
/// Ties break by catalog declaration order: the first-declared category
/// among the tied set wins.
fn score_categories(
    diff_text: &str,
    files: &[String],
    idioms: &BTreeSet<&'static str>,
) -> (Category, f64) {
    if diff_text.is_empty() {
        return (Category::Chore, 0.3);
    }

    let diff_lower = diff_text.to_lowercase();
    let mut scores = [0.0f64; Category::ALL.len()];

    // Keyword term
    for cat in Category::ALL {
        let matches = cat.keywords().iter().filter(|k| diff_lower.contains(*k)).count();
        scores[cat as usize] += matches as f64 * cat.weight() * 0.3;
    }

    // Idiom term
    for idiom in idioms {
        for cat in idiom_boosts(idiom) {
            scores[*cat as usize] += 0.4;
        }
    }

    // Delta-shape term: mutually exclusive branches, evaluated in priority
    // order.
    let added = diff_text.matches("\n+").count();
    let removed = diff_text.matches("\n-").count();
    if removed as f64 > added as f64 * 1.5 {
        scores[Category::Remove as usize] += 0.5;
    } else if added as f64 > removed as f64 * 2.0 && added > 5 {
        scores[Category::Feat as usize] += 0.3;
    } else if added > 0 && removed > 0 {
        scores[Category::Refactor as usize] += 0.2;
    }

    // File-type term
    if files.iter().any(|f| f.contains("test")) {
        scores[Category::Test as usize] += 0.6;
    }
    if files
        .iter()
        .any(|f| f.ends_with(".md") || f.ends_with(".txt") || f.ends_with(".rst"))
    {
        scores[Category::Docs as usize] += 0.7;
    }
    if files.iter().any(|f| {
        let lower = f.to_lowercase();
        lower.contains("config")
            || lower.ends_with(".json")
            || lower.ends_with(".yml")
            || lower.ends_with(".yaml")
            || lower.ends_with(".toml")
    }) {
        scores[Category::Chore as usize] += 0.5;
    }

    let mut best = Category::ALL[0];
    let mut best_score = scores[best as usize];
    for cat in Category::ALL {
        if scores[cat as usize] > best_score {
            best = cat;
            best_score = scores[cat as usize];
        }
    }

    (best, best_score.min(1.0))
}

/// Categories boosted by each detected idiom.
fn idiom_boosts(idiom: &str) -> &'static [Category] {
    match idiom {
        "api_endpoint" => &[Category::Feat, Category::Update],
        "database" => &[Category::Feat, Category::Update, Category::Fix],
        "error_handling" => &[Category::Fix, Category::Refactor],
        "testing" => &[Category::Test],
        "authentication" => &[Category::Feat, Category::Security],
        "configuration" => &[Category::Chore, Category::Update],
        "middleware" => &[Category::Feat, Category::Refactor],
        "validation" => &[Category::Fix, Category::Feat],
        _ => &[],
    }
}

/// Derive the parenthesized scope: common parent directory, then idiom,
/// then sole non-general language, else empty.
fn derive_scope(
    files: &[String],
    signals: &[FileSignal],
    idioms: &BTreeSet<&'static str>,
) -> String {
    if files.is_empty() {
        return String::new();
    }

    let dirs: Vec<&Path> = files
        .iter()
        .filter_map(|f| Path::new(f).parent())
        .filter(|p| !p.as_os_str().is_empty())
        .collect();
    if !dirs.is_empty()
        && let Some(common) = common_parent(&dirs)
        && let Some(name) = common.file_name()
    {
        return format!("({})", name.to_string_lossy());
    }

    for (idiom, scope) in [
        ("api_endpoint", "api"),
        ("database", "db"),
        ("authentication", "auth"),
        ("testing", "tests"),
        ("configuration", "config"),
    ] {
        if idioms.contains(idiom) {
            return format!("({scope})");
        }
    }

    let languages: BTreeSet<&str> = signals.iter().map(|s| s.language).collect();
    if languages.len() == 1 {
        let lang = languages.iter().next().expect("len checked above");
        if *lang != GENERAL {
            return format!("({lang})");
        }
    }

    String::new()
}

/// Longest common ancestor of a set of directories, or None when it is the
/// repository root.
fn common_parent(dirs: &[&Path]) -> Option<PathBuf> {
    let mut iter = dirs.iter();
    let mut common = iter.next()?.to_path_buf();
    for dir in iter {
        while !dir.starts_with(&common) {
            if !common.pop() {
                return None;
            }
        }
    }
    if common.as_os_str().is_empty() || common == Path::new(".") {
        None
    } else {
        Some(common)
    }
}

/// Conservative breaking-change detection: a textual phrase OR a removed
/// public symbol trips it.
fn detect_breaking_change(diff_text: &str) -> bool {
    let lower = diff_text.to_lowercase();
    if BREAKING_PHRASES.iter().any(|p| lower.contains(p)) {
        return true;
    }

    let removed = signal::removed_lines(diff_text).join("\n");
    if REMOVED_DEF
        .captures_iter(&removed)
        .any(|caps| !caps[1].starts_with('_'))
    {
        return true;
    }

    REMOVED_EXPORT.is_match(&removed) || REMOVED_PUBLIC_METHOD.is_match(&removed)
}

/// Boost the base confidence where independent signals corroborate the
/// winning category. Capped at 1.0.
fn refine_confidence(
    base: f64,
    category: Category,
    files: &[String],
    signals: &[FileSignal],
    idioms: &BTreeSet<&'static str>,
    diff_lower: &str,
) -> f64 {
    let mut bonus = 0.0;

    match category {
        Category::Test if files.iter().any(|f| f.contains("test")) => bonus += 0.3,
        Category::Docs
            if files.iter().any(|f| f.ends_with(".md") || f.ends_with(".txt")) =>
        {
            bonus += 0.3
        }
        Category::Feat
            if signals
                .iter()
                .any(|s| !s.identifiers.functions.is_empty() || !s.identifiers.classes.is_empty()) =>
        {
            bonus += 0.2
        }
        _ => {}
    }

    bonus += idioms.len() as f64 * 0.1;

    if category.keywords().iter().any(|k| diff_lower.contains(k)) {
        bonus += 0.2;
    }

    (base + bonus).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(diff: &str, staged: &[&str], untracked: &[&str]) -> Classification {
        let staged: Vec<String> = staged.iter().map(|s| s.to_string()).collect();
        let untracked: Vec<String> = untracked.iter().map(|s| s.to_string()).collect();
        Classifier::new().classify(diff, &staged, &untracked)
    }

    #[test]
    fn test_empty_diff_degrades_to_chore() {
        let c = classify("", &[], &[]);
        assert_eq!(c.category, Category::Chore);
        assert!((c.confidence - 0.3).abs() < 1e-9);
        assert_eq!(c.scope, "");
        assert!(!c.breaking_change);
    }

    #[test]
    fn test_confidence_always_in_unit_interval() {
        let diffs = [
            "",
            "+fix the bug fix fix error crash exception issue resolve repair correct\n-old\n",
            "+add create implement introduce new feature endpoint component\n",
        ];
        for diff in diffs {
            let c = classify(diff, &["src/app.py".into()], &[]);
            assert!(c.confidence >= 0.0 && c.confidence <= 1.0, "diff: {diff}");
        }
    }

    #[test]
    fn test_docs_only_change() {
        let diff = "diff --git a/docs/guide.md b/docs/guide.md\n+# Guide\n+How to use the tool.\n";
        let c = classify(diff, &[], &["docs/guide.md"]);
        assert_eq!(c.category, Category::Docs);
        assert!(c.confidence >= 0.7);
        assert!(c.scope.is_empty() || c.scope == "(docs)");
    }

    #[test]
    fn test_removal_heavy_diff_classifies_as_remove() {
        // 1 added marker vs 8 removed, no keyword interference.
        let diff = "\n+x\n-a\n-b\n-c\n-d\n-e\n-f\n-g\n-h\n";
        let c = classify(
            diff,
            &["one", "two", "three", "four", "five"],
            &[],
        );
        assert_eq!(c.category, Category::Remove);
    }

    #[test]
    fn test_tie_breaks_by_declaration_order() {
        // "upgrade" hits only update (weight 0.8), "obsolete" only remove
        // (weight 0.8): equal scores, update is declared first.
        let diff = "upgrade obsolete";
        let c = classify(diff, &[], &[]);
        assert_eq!(c.category, Category::Update);
        // Deterministic across repeated calls.
        for _ in 0..5 {
            assert_eq!(classify(diff, &[], &[]).category, Category::Update);
        }
    }

    #[test]
    fn test_breaking_change_on_removed_public_function() {
        let diff = "-def public_function(x):\n-    return x\n";
        let c = classify(diff, &["api.py"], &[]);
        assert!(c.breaking_change);
    }

    #[test]
    fn test_no_breaking_change_on_private_function_removal() {
        let diff = "-def _internal_helper(x):\n-    return x\n+def _internal_helper(x, y):\n+    return x + y\n";
        assert!(!detect_breaking_change(diff));
    }

    #[test]
    fn test_breaking_change_on_phrase() {
        assert!(detect_breaking_change("+this is a BREAKING CHANGE: renamed api\n"));
    }

    #[test]
    fn test_breaking_change_on_removed_export() {
        assert!(detect_breaking_change("-export function renderChart(data) {\n"));
    }

    #[test]
    fn test_breaking_change_never_flagged_for_other_languages() {
        // Rust public symbol removal goes undetected by design.
        assert!(!detect_breaking_change("-pub fn widely_used() {}\n"));
    }

    #[test]
    fn test_scope_from_common_parent_directory() {
        let diff = "+line\n";
        let c = classify(diff, &["auth/login.rs", "auth/session.rs"], &[]);
        assert_eq!(c.scope, "(auth)");
    }

    #[test]
    fn test_scope_empty_for_root_level_files() {
        let c = classify("+line\n", &["one.xyz", "two.xyz"], &[]);
        assert_eq!(c.scope, "");
    }

    #[test]
    fn test_scope_nested_common_parent_uses_last_component() {
        let c = classify(
            "+line\n",
            &["src/server/routes.xyz", "src/server/handlers.xyz"],
            &[],
        );
        assert_eq!(c.scope, "(server)");
    }

    #[test]
    fn test_classify_is_idempotent() {
        let diff = "+def new_feature():\n+    return 42\n-old = 1\n";
        let staged = vec!["core/feature.py".to_string()];
        let first = Classifier::new().classify(diff, &staged, &[]);
        let second = Classifier::new().classify(diff, &staged, &[]);
        assert_eq!(first.category, second.category);
        assert_eq!(first.confidence, second.confidence);
        assert_eq!(first.scope, second.scope);
        assert_eq!(first.breaking_change, second.breaking_change);
    }

    #[test]
    fn test_test_paths_boost_test_category() {
        let diff = "+assert result == expected\n+def test_rounding():\n";
        let c = classify(diff, &["tests/test_rounding.xyz"], &[]);
        assert_eq!(c.category, Category::Test);
        assert!(c.confidence >= 0.6);
    }

    #[test]
    fn test_config_files_boost_chore() {
        let diff = "+timeout = 30\n";
        let c = classify(diff, &["settings/app.toml"], &[]);
        assert_eq!(c.category, Category::Chore);
    }

    #[test]
    fn test_files_beyond_bound_kept_in_path_lists() {
        let files: Vec<String> = (0..15).map(|i| format!("mod{i}.xyz")).collect();
        let c = Classifier::new().classify("+line\n", &files, &[]);
        assert_eq!(c.files_modified.len(), 15);
    }

    #[test]
    fn test_explain_names_the_category() {
        let diff = "+fix crash in parser\n-broken\n";
        let c = classify(diff, &["parser.py"], &[]);
        let text = Classifier::new().explain(&c);
        assert!(text.contains(c.category.id()));
        assert!(text.contains("confidence"));
    }

    #[test]
    fn test_common_parent_of_divergent_dirs_is_none() {
        let a = Path::new("alpha/x");
        let b = Path::new("beta/y");
        assert_eq!(common_parent(&[a, b]), None);
    }
}
