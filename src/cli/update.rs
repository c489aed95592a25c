//! Update command - clone, patch, replace, upload, optionally commit

use crate::cli::confirm;
use crate::cli::progress::CliProgress;
use crate::cli::style::{hyperlink_url, Stream, Stylize};
use anstream::println;
use std::path::Path;
use store_submit::config::Config;
use store_submit::error::{Error, Result};
use store_submit::submit::{update_submission, UpdateOptions};
use store_submit::transport::create_transport;
use store_submit::types::{SubmissionData, SubmissionTarget};
use store_submit::upload::{redact_sas, BlobUploader};

/// Run the update command
pub async fn run_update(
    config: &Config,
    target: &SubmissionTarget,
    data_path: &Path,
    options: &UpdateOptions,
    yes: bool,
) -> Result<()> {
    let data = read_submission_data(data_path)?;

    if options.force
        && options.submission_id.is_none()
        && !yes
        && !confirm(&format!(
            "Delete any pending submission of {target} before cloning?"
        ))?
    {
        println!("Aborted");
        return Ok(());
    }

    let transport = create_transport(config)?;
    let uploader = BlobUploader::new(config)?;
    let progress = CliProgress::new();

    let handle = update_submission(
        transport.as_ref(),
        &uploader,
        config,
        target,
        &data,
        options,
        &progress,
    )
    .await?;

    println!();
    println!("Submission: {}", handle.submission_id.accent());
    if let Some(url) = &handle.upload_url {
        if options.package_path.is_none() {
            // The caller uploads manually; the full SAS URL is required
            println!("Upload URL: {}", hyperlink_url(Stream::Stdout, url));
        } else {
            println!("Upload URL: {}", redact_sas(url).muted());
        }
    }
    if !options.auto_commit {
        println!(
            "{}",
            format!(
                "Commit with: store-submit commit {} --submission-id {}",
                target_flags(target),
                handle.submission_id
            )
            .muted()
        );
    }
    Ok(())
}

/// Read and parse the JSON submission data file
pub fn read_submission_data(path: &Path) -> Result<SubmissionData> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::Validation(format!("cannot read submission data {}: {e}", path.display()))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        Error::Validation(format!("cannot parse submission data {}: {e}", path.display()))
    })
}

/// CLI flags that select `target`
pub fn target_flags(target: &SubmissionTarget) -> String {
    match target {
        SubmissionTarget::App { app_id } => format!("--app {app_id}"),
        SubmissionTarget::Flight { app_id, flight_id } => {
            format!("--app {app_id} --flight {flight_id}")
        }
        SubmissionTarget::InAppProduct { iap_id } => format!("--iap {iap_id}"),
    }
}
