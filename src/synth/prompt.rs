//! Prompt assembly for the generation backends.

use crate::analysis::Classification;

/// How much raw diff the model sees. Classification already distilled the
/// rest into structured context.
const DIFF_EXCERPT_CHARS: usize = 800;

/// One fully-assembled generation request, independent of which backend
/// ends up serving it.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Build the request for a classified change batch.
///
/// `language` is the natural language the description should be written in,
/// e.g. `"English"`.
pub fn build_request(classification: &Classification, language: &str) -> GenerationRequest {
    let cat = classification.category;

    let system = format!(
        "You are an expert at writing conventional commit messages. \
         ALWAYS use type '{}' with emoji '{}'. Respond with the commit \
         message only, no explanation and no surrounding quotes.",
        cat.id(),
        cat.emoji()
    );

    let mut user = String::new();
    user.push_str(&format!(
        "Write a commit message for a '{}' change (confidence {:.0}%).\n",
        cat.id(),
        classification.confidence * 100.0
    ));
    if !classification.scope.is_empty() {
        user.push_str(&format!("Scope: {}\n", classification.scope));
    }
    user.push_str(&format!(
        "Complexity: {} added lines across {} files.\n",
        classification.complexity_score,
        classification.file_count()
    ));
    if !classification.languages.is_empty() {
        let langs: Vec<&str> = classification.languages.iter().copied().collect();
        user.push_str(&format!("Languages: {}\n", langs.join(", ")));
    }
    if classification.breaking_change {
        user.push_str("This change is BREAKING: call that out in the description.\n");
    }
    if !classification.idioms.is_empty() {
        let idioms: Vec<&str> = classification.idioms.iter().copied().take(3).collect();
        user.push_str(&format!("Detected patterns: {}\n", idioms.join(", ")));
    }

    let ids = &classification.identifiers;
    if !ids.functions.is_empty() {
        user.push_str(&format!("New functions: {}\n", join_first(&ids.functions, 3)));
    }
    if !ids.classes.is_empty() {
        user.push_str(&format!("New classes: {}\n", join_first(&ids.classes, 2)));
    }
    if !ids.imports.is_empty() {
        user.push_str(&format!("New imports: {}\n", join_first(&ids.imports, 3)));
    }
    if !classification.files_modified.is_empty() {
        user.push_str(&format!(
            "Modified files: {}\n",
            join_first(&classification.files_modified, 3)
        ));
    }
    if !classification.files_added.is_empty() {
        user.push_str(&format!(
            "Added files: {}\n",
            join_first(&classification.files_added, 3)
        ));
    }

    let excerpt: String = classification.diff_text.chars().take(DIFF_EXCERPT_CHARS).collect();
    if !excerpt.is_empty() {
        user.push_str(&format!("\nDiff excerpt:\n{excerpt}\n"));
    }

    user.push_str(&format!(
        "\nStrict requirements:\n\
         - Format: exactly '{} {}{}: <description>'\n\
         - At most 72 characters total\n\
         - Imperative mood, no trailing period\n\
         - Description in {language}\n\
         \nGood examples:\n\
         ✨ feat(auth): add JWT token refresh\n\
         🐛 fix(api): handle empty response body\n\
         📚 docs: update installation guide\n",
        cat.emoji(),
        cat.id(),
        classification.scope
    ));

    GenerationRequest { system, user, max_tokens: 100, temperature: 0.1 }
}

fn join_first(items: &[String], n: usize) -> String {
    items
        .iter()
        .take(n)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
