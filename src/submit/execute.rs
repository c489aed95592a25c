//! Clone, patch, replace, upload, commit
//!
//! Every step is awaited before the next one starts. Failures before the
//! replace abort the update; a failed package upload propagates too.

use crate::config::Config;
use crate::error::{Error, Result, ResultExt};
use crate::resources::{
    commit_submission, ensure_no_pending_submission, get_submission, new_submission, set_submission,
};
use crate::submit::{patch_submission, Phase, ProgressCallback, UpdateOptions};
use crate::transport::RestTransport;
use crate::types::{Submission, SubmissionData, SubmissionHandle, SubmissionStatus, SubmissionTarget};
use crate::upload::{redact_sas, upload_asset, AssetUploader, RetryPolicy};
use tracing::{info, warn};

/// Update a submission of `target` with the selected sections of `data`
///
/// Returns the submission id and upload URL whether or not upload and
/// commit happened, so the caller can always finish the remaining steps.
pub async fn update_submission(
    transport: &dyn RestTransport,
    uploader: &dyn AssetUploader,
    config: &Config,
    target: &SubmissionTarget,
    data: &SubmissionData,
    options: &UpdateOptions,
    progress: &dyn ProgressCallback,
) -> Result<SubmissionHandle> {
    progress.on_phase(Phase::Validating).await;
    validate_product_id(target, data)?;
    options.validate(target.kind(), data)?;
    if let Some(path) = &options.package_path {
        if !path.is_file() {
            return Err(Error::Validation(format!(
                "package {} does not exist or is not a file",
                path.display()
            )));
        }
    }

    let working = acquire_submission(transport, target, options, progress).await?;
    let submission_id = working.id.clone();
    let resume_hint = || {
        format!("updating submission {submission_id} of {target} (resume with --submission-id {submission_id})")
    };

    progress.on_phase(Phase::Patching).await;
    let patched = patch_submission(&working, data, options, target.kind()).context(resume_hint)?;

    progress.on_phase(Phase::Replacing).await;
    let replaced = match set_submission(transport, target, &patched).await {
        Ok(replaced) => replaced,
        Err(e) => {
            progress.on_error(&e).await;
            return Err(e).context(resume_hint);
        }
    };

    let handle = SubmissionHandle {
        submission_id: replaced.id.clone(),
        upload_url: replaced.file_upload_url.clone().or(working.file_upload_url),
    };

    match (&options.package_path, &handle.upload_url) {
        (Some(path), Some(url)) => {
            progress.on_phase(Phase::Uploading).await;
            upload_asset(uploader, path, url, RetryPolicy::from_config(config))
                .await
                .context(resume_hint)?;
        }
        (Some(_), None) => {
            return Err(Error::Precondition(format!(
                "submission {} of {target} has no upload URL",
                handle.submission_id
            )));
        }
        (None, url) if !options.auto_commit => {
            let url = url.as_deref().map_or_else(|| "<none>".to_string(), redact_sas);
            progress
                .on_message(&format!(
                    "Upload the package for submission {} to {url} before committing",
                    handle.submission_id
                ))
                .await;
        }
        (None, _) => {}
    }

    if options.auto_commit {
        progress.on_phase(Phase::Committing).await;
        refresh_stale_token(transport, config).await?;
        let status = commit_submission(transport, target, &handle.submission_id).await?;
        progress.on_committed(&handle.submission_id, status).await;
    }

    progress.on_phase(Phase::Complete).await;
    Ok(handle)
}

/// Commit a pending submission, refreshing a stale token first
pub async fn commit_pending_submission(
    transport: &dyn RestTransport,
    config: &Config,
    target: &SubmissionTarget,
    submission_id: &str,
) -> Result<SubmissionStatus> {
    refresh_stale_token(transport, config).await?;
    commit_submission(transport, target, submission_id).await
}

fn validate_product_id(target: &SubmissionTarget, data: &SubmissionData) -> Result<()> {
    match data.product_id.as_deref() {
        None => {
            warn!(%target, "submission data carries no product id; cannot verify it was generated for this product");
        }
        Some(id) if id != target.product_id() => {
            return Err(Error::Validation(format!(
                "submission data is for product {id}, not {target}"
            )));
        }
        Some(_) => {}
    }

    if let (SubmissionTarget::Flight { flight_id, .. }, Some(data_flight)) = (target, &data.flight_id) {
        if data_flight != flight_id {
            return Err(Error::Validation(format!(
                "submission data is for flight {data_flight}, not {target}"
            )));
        }
    }
    Ok(())
}

/// Resume the requested pending submission, or clone a new one
async fn acquire_submission(
    transport: &dyn RestTransport,
    target: &SubmissionTarget,
    options: &UpdateOptions,
    progress: &dyn ProgressCallback,
) -> Result<Submission> {
    if let Some(id) = &options.submission_id {
        progress.on_phase(Phase::Resuming).await;
        let submission = get_submission(transport, target, id).await?;
        if submission.status != SubmissionStatus::PendingCommit {
            return Err(Error::Precondition(format!(
                "submission {id} of {target} is {}, only PendingCommit submissions can be modified",
                submission.status
            )));
        }
        info!(%target, submission_id = %id, "resuming pending submission");
        return Ok(submission);
    }

    progress.on_phase(Phase::RemovingPending).await;
    if let Some(removed) = ensure_no_pending_submission(transport, target, options.force).await? {
        progress
            .on_message(&format!("Deleted pending submission {removed} of {target}"))
            .await;
    }

    progress.on_phase(Phase::Cloning).await;
    let clone = new_submission(transport, target).await?;
    progress.on_submission_created(target, &clone.id).await;
    Ok(clone)
}

async fn refresh_stale_token(transport: &dyn RestTransport, config: &Config) -> Result<()> {
    if let Some(age) = transport.token_age().await {
        if age >= config.token_lifetime() {
            info!(age_secs = age.as_secs(), "access token may have expired, reauthenticating");
            transport.reauthenticate().await?;
        }
    }
    Ok(())
}
