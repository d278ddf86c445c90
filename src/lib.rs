//! scribe: classify pending git changes and synthesize a conventional
//! commit message for them.
//!
//! The pipeline is diff collection ([`git`]), heuristic classification
//! ([`analysis`]) and message synthesis with LLM fallback ([`synth`]).
//! Outcomes are recorded as JSONL metrics ([`metrics`]).

pub mod analysis;
pub mod config;
pub mod error;
pub mod git;
pub mod metrics;
pub mod synth;

pub use analysis::{Category, Classification, Classifier};
pub use config::Config;
pub use git::{collect_changes, stage_and_commit, WorkingTreeChanges};
pub use synth::{BackendChain, GenerationBackend, OpenRouterClient, Synthesizer};
