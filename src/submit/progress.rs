//! Progress callback trait for interface-agnostic updates
//!
//! This trait allows different interfaces (CLI, CI log, etc.) to receive
//! progress updates while a submission is being updated.

use crate::error::Error;
use crate::types::{SubmissionStatus, SubmissionTarget};
use async_trait::async_trait;
use std::fmt;

/// Update phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Checking submission data against the target
    Validating,
    /// Removing an existing pending submission (force)
    RemovingPending,
    /// Cloning the published submission
    Cloning,
    /// Fetching an existing pending submission to resume
    Resuming,
    /// Merging caller data into the clone
    Patching,
    /// Replacing the remote submission content
    Replacing,
    /// Uploading the package archive
    Uploading,
    /// Committing the submission
    Committing,
    /// Update complete
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validating => "Validating submission data",
            Self::RemovingPending => "Checking for a pending submission",
            Self::Cloning => "Cloning the published submission",
            Self::Resuming => "Fetching the pending submission",
            Self::Patching => "Patching submission",
            Self::Replacing => "Updating remote submission",
            Self::Uploading => "Uploading package",
            Self::Committing => "Committing submission",
            Self::Complete => "Done",
        })
    }
}

/// Progress callback trait
///
/// Implement this trait to receive progress updates during an update.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called as soon as a working submission exists remotely
    async fn on_submission_created(&self, target: &SubmissionTarget, submission_id: &str);

    /// Called when a commit is accepted
    async fn on_committed(&self, submission_id: &str, status: SubmissionStatus);

    /// Called when an error occurs (non-fatal)
    async fn on_error(&self, error: &Error);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_submission_created(&self, _target: &SubmissionTarget, _submission_id: &str) {}
    async fn on_committed(&self, _submission_id: &str, _status: SubmissionStatus) {}
    async fn on_error(&self, _error: &Error) {}
    async fn on_message(&self, _message: &str) {}
}
