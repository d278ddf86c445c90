//! Format repair, validation and the rule-based fallback generator.
//!
//! Backend output is never trusted: it is repaired into the canonical
//! `<emoji> <type><scope>: <description>` shape, then validated. Anything
//! that survives both is acceptable; anything else advances the fallback
//! chain.

use crate::analysis::{Category, Classification};

/// Hard subject-line ceiling, counted in characters.
pub const MAX_MESSAGE_CHARS: usize = 72;

/// Below this a message carries no information worth committing.
pub const MIN_MESSAGE_CHARS: usize = 10;

/// Coerce raw backend output into the canonical message shape.
///
/// Tolerates the usual model tics: a "Commit message:" label, surrounding
/// quotes, a missing emoji prefix. Over-long output is truncated to
/// [`MAX_MESSAGE_CHARS`], preserving the prefix.
pub fn repair_message(raw: &str, category: Category, scope: &str) -> String {
    let mut message = raw.trim();

    for label in ["Commit message:", "commit message:", "Message:"] {
        if let Some(rest) = message.strip_prefix(label) {
            message = rest.trim();
        }
    }
    message = message
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim();

    // Keep the subject line only.
    let message = message.lines().next().unwrap_or("").trim();

    let rebuilt = if message.starts_with(category.emoji()) {
        message.to_string()
    } else {
        // Salvage the description: whatever follows the first colon, or
        // the whole line when there is none.
        let description = match message.split_once(':') {
            Some((_, rest)) => rest.trim(),
            None => message,
        };
        format!("{} {}{}: {}", category.emoji(), category.id(), scope, description)
    };

    truncate_chars(&rebuilt, MAX_MESSAGE_CHARS)
}

/// Check a repaired message against the format contract.
pub fn validate_message(message: &str, category: Category) -> bool {
    let char_count = message.chars().count();
    let has_description = message
        .split_once(':')
        .map(|(_, description)| !description.trim().is_empty())
        .unwrap_or(false);

    char_count >= MIN_MESSAGE_CHARS
        && char_count <= MAX_MESSAGE_CHARS
        && message.starts_with(category.emoji())
        && message.contains(category.id())
        && has_description
}

/// Deterministic message built without any backend. Always valid.
pub fn rule_based_message(classification: &Classification) -> String {
    let category = classification.category;
    let mut phrase = category.default_phrase().to_string();

    // Sharpen the phrase from the first few file extensions.
    let extensions: Vec<&str> = classification
        .files_modified
        .iter()
        .chain(&classification.files_added)
        .take(3)
        .filter_map(|f| f.rsplit_once('.').map(|(_, ext)| ext))
        .collect();

    if extensions.iter().any(|e| *e == "py") {
        phrase.push_str(" in Python modules");
    } else if extensions.iter().any(|e| *e == "js" || *e == "ts") {
        phrase.push_str(" in JavaScript components");
    } else if extensions.iter().any(|e| *e == "md") {
        phrase = "update documentation files".to_string();
    }

    let message = format!(
        "{} {}{}: {}",
        category.emoji(),
        category.id(),
        classification.scope,
        phrase
    );
    truncate_chars(&message, MAX_MESSAGE_CHARS)
}

/// Char-count truncation. Byte-index slicing would panic inside multi-byte
/// characters, emoji prefixes included.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
