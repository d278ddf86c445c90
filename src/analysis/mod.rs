//! Change analysis: category catalog, per-file signal extraction and the
//! heuristic classifier.

pub mod catalog;
pub mod classifier;
pub mod language;
pub mod signal;

pub use catalog::Category;
pub use classifier::{Classification, Classifier, MAX_ANALYZED_FILES};
pub use language::{LanguageProfile, StructuralKind, GENERAL};
pub use signal::{AddedIdentifiers, FileSignal};
