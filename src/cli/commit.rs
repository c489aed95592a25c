//! Commit, status and remove-submission commands

use crate::cli::confirm;
use crate::cli::style::{bullet, check, hyperlink_url, Stream, Stylize};
use anstream::println;
use store_submit::config::Config;
use store_submit::error::Result;
use store_submit::resources::{get_submission_status, remove_submission};
use store_submit::submit::commit_pending_submission;
use store_submit::transport::create_transport;
use store_submit::types::{StatusDetails, SubmissionTarget};

/// Run the commit command
pub async fn run_commit(config: &Config, target: &SubmissionTarget, submission_id: &str) -> Result<()> {
    let transport = create_transport(config)?;
    let status = commit_pending_submission(transport.as_ref(), config, target, submission_id).await?;

    println!(
        "{} Committed submission {} of {} ({})",
        check(),
        submission_id.accent(),
        target.to_string().emphasis(),
        status.as_str().muted()
    );
    Ok(())
}

/// Run the status command
pub async fn run_status(config: &Config, target: &SubmissionTarget, submission_id: &str) -> Result<()> {
    let transport = create_transport(config)?;
    let report = get_submission_status(transport.as_ref(), target, submission_id).await?;

    let status = report.status.as_str();
    if report.status.is_failure() {
        println!("{}: {}", submission_id.accent(), status.error().for_stdout());
    } else {
        println!("{}: {}", submission_id.accent(), status.emphasis());
    }
    print_details(&report.status_details);
    Ok(())
}

/// Run the remove-submission command
pub async fn run_remove_submission(
    config: &Config,
    target: &SubmissionTarget,
    submission_id: &str,
    yes: bool,
) -> Result<()> {
    if !yes && !confirm(&format!("Delete submission {submission_id} of {target}?"))? {
        println!("Aborted");
        return Ok(());
    }

    let transport = create_transport(config)?;
    remove_submission(transport.as_ref(), target, submission_id).await?;
    println!("{} Removed submission {}", check(), submission_id.accent());
    Ok(())
}

fn print_details(details: &StatusDetails) {
    if !details.errors.is_empty() {
        println!("Errors:");
        for issue in &details.errors {
            println!("  {} {}: {}", bullet(), issue.code.error().for_stdout(), issue.details);
        }
    }
    if !details.warnings.is_empty() {
        println!("Warnings:");
        for issue in &details.warnings {
            println!("  {} {}: {}", bullet(), issue.code.warn().for_stdout(), issue.details);
        }
    }
    if !details.certification_reports.is_empty() {
        println!("Certification reports:");
        for cert in &details.certification_reports {
            println!(
                "  {} {} {}",
                bullet(),
                cert.date.muted(),
                hyperlink_url(Stream::Stdout, &cert.report_url)
            );
        }
    }
}
