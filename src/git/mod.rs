//! Git plumbing: working tree diff collection and commit creation.

pub mod commit;
pub mod diff;

pub use commit::stage_and_commit;
pub use diff::{collect_changes, WorkingTreeChanges};
