//! Submission update engine
//!
//! Handles the clone-patch-commit workflow for a submission:
//! 1. Acquire - resume a pending submission or clone the published one
//! 2. Patch - merge the selected sections of the caller's data locally
//! 3. Execute - replace remotely, upload the package, optionally commit

mod execute;
mod options;
mod patch;
mod progress;

pub use execute::{commit_pending_submission, update_submission};
pub use options::{PackageMode, PublishSettings, UpdateOptions};
pub use patch::patch_submission;
pub use progress::{NoopProgress, Phase, ProgressCallback};
