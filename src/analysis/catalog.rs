//! The commit category catalog.
//!
//! A closed set of conventional-commit types, each with an emoji, a
//! weighted keyword list and a rule-based default phrase. The catalog is
//! pure data: classification logic lives in [`crate::analysis::classifier`].

use std::fmt;

/// One conventional-commit category.
///
/// Declaration order doubles as the tie-break order: when two categories
/// accumulate equal scores, the earlier-declared one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Perf,
    Test,
    Chore,
    Security,
    Update,
    Remove,
    Init,
    Hotfix,
    Ci,
}

impl Category {
    /// All categories in declaration (tie-break) order.
    pub const ALL: [Category; 14] = [
        Category::Feat,
        Category::Fix,
        Category::Docs,
        Category::Style,
        Category::Refactor,
        Category::Perf,
        Category::Test,
        Category::Chore,
        Category::Security,
        Category::Update,
        Category::Remove,
        Category::Init,
        Category::Hotfix,
        Category::Ci,
    ];

    /// The conventional-commit type id, e.g. `"feat"`.
    pub fn id(&self) -> &'static str {
        match self {
            Category::Feat => "feat",
            Category::Fix => "fix",
            Category::Docs => "docs",
            Category::Style => "style",
            Category::Refactor => "refactor",
            Category::Perf => "perf",
            Category::Test => "test",
            Category::Chore => "chore",
            Category::Security => "security",
            Category::Update => "update",
            Category::Remove => "remove",
            Category::Init => "init",
            Category::Hotfix => "hotfix",
            Category::Ci => "ci",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Feat => "✨",
            Category::Fix => "🐛",
            Category::Docs => "📚",
            Category::Style => "💅",
            Category::Refactor => "♻️",
            Category::Perf => "⚡",
            Category::Test => "🧪",
            Category::Chore => "🔧",
            Category::Security => "🔒",
            Category::Update => "🔄",
            Category::Remove => "🗑️",
            Category::Init => "🎉",
            Category::Hotfix => "🚑",
            Category::Ci => "👷",
        }
    }

    /// Scoring weight applied to keyword matches for this category.
    pub fn weight(&self) -> f64 {
        match self {
            Category::Feat => 1.0,
            Category::Fix => 1.2,
            Category::Docs => 0.8,
            Category::Style => 0.6,
            Category::Refactor => 0.9,
            Category::Perf => 1.1,
            Category::Test => 0.9,
            Category::Chore => 0.7,
            Category::Security => 1.3,
            Category::Update => 0.8,
            Category::Remove => 0.8,
            Category::Init => 1.0,
            Category::Hotfix => 1.5,
            Category::Ci => 0.7,
        }
    }

    /// Keywords whose presence in a diff counts toward this category.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Feat => &[
                "add", "create", "implement", "introduce", "new", "feature", "endpoint",
                "component",
            ],
            Category::Fix => &[
                "fix", "resolve", "correct", "repair", "bug", "error", "issue", "crash",
                "exception",
            ],
            Category::Docs => &[
                "readme", "documentation", "comment", "doc", "guide", "tutorial", "example",
            ],
            Category::Style => &[
                "format", "style", "lint", "prettier", "whitespace", "semicolon", "indent",
            ],
            Category::Refactor => &[
                "refactor", "restructure", "reorganize", "rename", "move", "extract", "split",
            ],
            Category::Perf => &[
                "performance", "optimize", "speed", "faster", "cache", "memory", "efficient",
            ],
            Category::Test => &[
                "test", "spec", "unittest", "testing", "mock", "fixture", "assert",
            ],
            Category::Chore => &[
                "config", "build", "deps", "dependency", "package", "setup", "tool",
            ],
            Category::Security => &[
                "security", "auth", "permission", "vulnerability", "sanitize", "encrypt",
            ],
            Category::Update => &[
                "update", "upgrade", "bump", "change", "modify", "version", "migrate",
            ],
            Category::Remove => &[
                "remove", "delete", "clean", "unused", "deprecated", "obsolete",
            ],
            Category::Init => &[
                "initial", "first", "setup", "scaffold", "bootstrap", "initialize",
            ],
            Category::Hotfix => &["hotfix", "critical", "urgent", "emergency", "production"],
            Category::Ci => &["ci", "pipeline", "workflow", "action", "deploy", "build"],
        }
    }

    /// Default description used by the rule-based fallback generator.
    pub fn default_phrase(&self) -> &'static str {
        match self {
            Category::Feat => "add new functionality",
            Category::Fix => "resolve issue",
            Category::Refactor => "improve code structure",
            Category::Docs => "update documentation",
            Category::Test => "add tests",
            Category::Chore => "update configuration",
            Category::Perf => "improve performance",
            Category::Security => "enhance security",
            Category::Update => "update dependencies",
            Category::Remove => "remove unused code",
            Category::Style | Category::Init | Category::Hotfix | Category::Ci => "make changes",
        }
    }

    /// Look up a category by its conventional-commit id.
    pub fn from_id(id: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.id() == id)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
