//! Shared CLI progress callbacks with styled output and spinners

use crate::cli::style::{arrow, check, cross, spinner, Stylize};
use anstream::{eprintln, println};
use async_trait::async_trait;
use indicatif::ProgressBar;
use std::sync::Mutex;
use store_submit::error::Error;
use store_submit::monitor::StatusObserver;
use store_submit::submit::{Phase, ProgressCallback};
use store_submit::types::{SubmissionStatus, SubmissionStatusReport, SubmissionTarget};

/// CLI progress callback for `update`
///
/// Long phases (upload) run under a spinner; everything else prints a line.
pub struct CliProgress {
    active: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    /// Create a progress printer
    pub const fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }

    fn finish_spinner(&self) {
        if let Some(bar) = self.active.lock().ok().and_then(|mut guard| guard.take()) {
            bar.finish_and_clear();
        }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        self.finish_spinner();
        match phase {
            Phase::Uploading | Phase::Committing => {
                let bar = spinner(format!("{phase}..."));
                if let Ok(mut guard) = self.active.lock() {
                    *guard = Some(bar);
                }
            }
            Phase::Complete => println!("{} {}", check(), phase.to_string().emphasis()),
            _ => println!("{}...", phase.to_string().emphasis()),
        }
    }

    async fn on_submission_created(&self, target: &SubmissionTarget, submission_id: &str) {
        println!(
            "  {} Created pending submission {} for {}",
            check(),
            submission_id.accent(),
            target.to_string().emphasis()
        );
    }

    async fn on_committed(&self, submission_id: &str, status: SubmissionStatus) {
        self.finish_spinner();
        println!(
            "  {} Committed submission {} ({})",
            check(),
            submission_id.accent(),
            status.as_str().muted()
        );
    }

    async fn on_error(&self, err: &Error) {
        self.finish_spinner();
        eprintln!("  {} {}", cross(), err.to_string().error());
    }

    async fn on_message(&self, message: &str) {
        println!("  {} {message}", arrow());
    }
}

/// Prints each status change observed by the monitor
pub struct CliStatusPrinter;

#[async_trait]
impl StatusObserver for CliStatusPrinter {
    async fn on_status_change(&self, previous: Option<SubmissionStatus>, report: &SubmissionStatusReport) {
        let now = chrono::Local::now().format("%H:%M:%S");
        let status = report.status.as_str();
        let styled = if report.status.is_failure() {
            status.error().for_stdout().to_string()
        } else {
            status.accent().to_string()
        };

        match previous {
            Some(previous) => println!(
                "{} {} {} {styled}",
                now.to_string().muted(),
                previous.as_str().muted(),
                arrow()
            ),
            None => println!("{} {styled}", now.to_string().muted()),
        }

        for issue in &report.status_details.errors {
            println!("    {} {}: {}", cross(), issue.code.error().for_stdout(), issue.details);
        }
        for issue in &report.status_details.warnings {
            println!("    {}: {}", issue.code.warn().for_stdout(), issue.details);
        }
    }
}
