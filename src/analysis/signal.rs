//! Per-file signal extraction from diff text.

use std::collections::BTreeSet;

use crate::analysis::language::{self, LanguageProfile, StructuralKind};

/// Identifiers introduced by the added lines of a diff.
#[derive(Debug, Clone, Default)]
pub struct AddedIdentifiers {
    pub imports: Vec<String>,
    pub functions: Vec<String>,
    pub classes: Vec<String>,
}

impl AddedIdentifiers {
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.functions.is_empty() && self.classes.is_empty()
    }

    /// Merge another set of identifiers into this one.
    pub fn extend(&mut self, other: AddedIdentifiers) {
        self.imports.extend(other.imports);
        self.functions.extend(other.functions);
        self.classes.extend(other.classes);
    }
}

/// Signals extracted for one changed file.
///
/// Deterministic: the same (path, diff) always yields the same signal.
/// Discarded after classification, never persisted.
#[derive(Debug, Clone)]
pub struct FileSignal {
    pub path: String,
    pub language: &'static str,
    pub identifiers: AddedIdentifiers,
    /// Count of non-blank added lines.
    pub added_line_count: usize,
    pub idioms: BTreeSet<&'static str>,
}

/// Extract the added-line block from a unified diff: every line prefixed
/// with `+`, with the marker stripped.
pub fn added_lines(diff_text: &str) -> Vec<&str> {
    diff_text
        .lines()
        .filter(|line| line.starts_with('+'))
        .map(|line| &line[1..])
        .collect()
}

/// Extract the removed-line block: every line prefixed with `-`, with the
/// marker stripped.
pub fn removed_lines(diff_text: &str) -> Vec<&str> {
    diff_text
        .lines()
        .filter(|line| line.starts_with('-'))
        .map(|line| &line[1..])
        .collect()
}

/// Extract a [`FileSignal`] for one file from the batch diff.
///
/// The language is chosen by the file's extension; the structural patterns
/// then run over the whole batch's added-line block. Unknown extensions get
/// idiom detection only.
pub fn extract_signal(path: &str, diff_text: &str) -> FileSignal {
    let profile = language::profile_for_path(path);
    let added = added_lines(diff_text);
    let added_block = added.join("\n");

    FileSignal {
        path: path.to_string(),
        language: profile.name,
        identifiers: extract_identifiers(profile, &added_block),
        added_line_count: added.iter().filter(|l| !l.trim().is_empty()).count(),
        idioms: language::detect_idioms(&added_block),
    }
}

fn extract_identifiers(profile: &LanguageProfile, added_block: &str) -> AddedIdentifiers {
    let mut ids = AddedIdentifiers::default();

    for (kind, regex) in &profile.patterns {
        let target = match kind {
            StructuralKind::Function | StructuralKind::Export => &mut ids.functions,
            StructuralKind::Class => &mut ids.classes,
            StructuralKind::Import => &mut ids.imports,
            // Decorators flag idioms elsewhere; the names themselves are
            // not interesting to the prompt.
            StructuralKind::Decorator => continue,
        };

        for caps in regex.captures_iter(added_block) {
            // First non-empty capture group, else the whole match (for
            // patterns with no capturing groups, like JS imports).
            let captured = (1..caps.len())
                .filter_map(|i| caps.get(i))
                .map(|m| m.as_str().trim())
                .find(|s| !s.is_empty())
                .or_else(|| caps.get(0).map(|m| m.as_str().trim()));

            if let Some(name) = captured
                && !name.is_empty()
            {
                target.push(name.to_string());
            }
        }
    }

    ids
}
