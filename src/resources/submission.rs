//! Submission accessors for apps, flights and in-app products

use crate::error::{Error, Result, ResultExt};
use crate::transport::RestTransport;
use crate::types::{Submission, SubmissionStatus, SubmissionStatusReport, SubmissionTarget};
use reqwest::Method;
use serde_json::Value;
use tracing::{info, warn};

/// Get a submission by id
pub async fn get_submission(
    transport: &dyn RestTransport,
    target: &SubmissionTarget,
    submission_id: &str,
) -> Result<Submission> {
    let value = transport
        .invoke(Method::GET, &target.submission_path(submission_id), None)
        .await
        .context(|| format!("getting submission {submission_id} of {target}"))?;
    Ok(serde_json::from_value(value)?)
}

/// Clone the currently published submission into a new pending one
pub async fn new_submission(transport: &dyn RestTransport, target: &SubmissionTarget) -> Result<Submission> {
    let value = transport
        .invoke(Method::POST, &target.submissions_path(), None)
        .await
        .context(|| format!("cloning the published submission of {target}"))?;
    let submission: Submission = serde_json::from_value(value)?;
    info!(%target, submission_id = %submission.id, "created pending submission");
    Ok(submission)
}

/// Replace the remote content of a pending submission
pub async fn set_submission(
    transport: &dyn RestTransport,
    target: &SubmissionTarget,
    submission: &Submission,
) -> Result<Submission> {
    let body = serde_json::to_value(submission)?;
    let value = transport
        .invoke(Method::PUT, &target.submission_path(&submission.id), Some(&body))
        .await
        .context(|| format!("replacing submission {} of {target}", submission.id))?;
    Ok(serde_json::from_value(value)?)
}

/// Delete a pending submission
pub async fn remove_submission(
    transport: &dyn RestTransport,
    target: &SubmissionTarget,
    submission_id: &str,
) -> Result<()> {
    transport
        .invoke(Method::DELETE, &target.submission_path(submission_id), None)
        .await
        .context(|| format!("removing submission {submission_id} of {target}"))?;
    info!(%target, submission_id, "removed pending submission");
    Ok(())
}

/// Start certification of a pending submission
pub async fn commit_submission(
    transport: &dyn RestTransport,
    target: &SubmissionTarget,
    submission_id: &str,
) -> Result<SubmissionStatus> {
    let path = format!("{}/commit", target.submission_path(submission_id));
    let value = transport
        .invoke(Method::POST, &path, None)
        .await
        .context(|| format!("committing submission {submission_id} of {target}"))?;

    let status = match value.get("status") {
        Some(status) => serde_json::from_value(status.clone())?,
        None => SubmissionStatus::CommitStarted,
    };
    info!(%target, submission_id, %status, "committed submission");
    Ok(status)
}

/// Get the current status of a submission
pub async fn get_submission_status(
    transport: &dyn RestTransport,
    target: &SubmissionTarget,
    submission_id: &str,
) -> Result<SubmissionStatusReport> {
    let path = format!("{}/status", target.submission_path(submission_id));
    let value = transport
        .invoke(Method::GET, &path, None)
        .await
        .context(|| format!("getting status of submission {submission_id} of {target}"))?;
    Ok(serde_json::from_value(value)?)
}

/// Id of the product's pending submission, if one exists
pub async fn get_pending_submission_id(
    transport: &dyn RestTransport,
    target: &SubmissionTarget,
) -> Result<Option<String>> {
    let product = transport
        .invoke(Method::GET, &target.resource_path(), None)
        .await
        .context(|| format!("getting {target}"))?;

    Ok(product
        .get(target.pending_field())
        .and_then(|pending| pending.get("id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string))
}

/// Make sure no pending submission blocks a new clone
///
/// The service allows one pending submission per product or flight. When
/// one exists it is deleted if `force` is set; otherwise this fails before
/// anything is changed remotely. Returns the id of the deleted submission.
pub async fn ensure_no_pending_submission(
    transport: &dyn RestTransport,
    target: &SubmissionTarget,
    force: bool,
) -> Result<Option<String>> {
    let Some(pending_id) = get_pending_submission_id(transport, target).await? else {
        return Ok(None);
    };

    if !force {
        return Err(Error::Precondition(format!(
            "{target} already has pending submission {pending_id}; delete it with Force or resume it by passing its submission id"
        )));
    }

    warn!(%target, submission_id = %pending_id, "deleting existing pending submission");
    remove_submission(transport, target, &pending_id).await?;
    Ok(Some(pending_id))
}
