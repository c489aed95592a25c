//! Submission monitor
//!
//! Polls a committed submission until it fails or reaches the last status
//! its publish mode leads to. Only transitions are logged and mailed.
//! Dropping the future stops watching; remote state is unaffected.

mod notify;

pub use notify::{notify_best_effort, GraphMailer, Notifier};

use crate::config::Config;
use crate::error::{Result, ResultExt};
use crate::resources::{get_submission, get_submission_status};
use crate::transport::RestTransport;
use crate::types::{
    PublishMode, StatusDetails, SubmissionStatus, SubmissionStatusReport, SubmissionTarget,
};
use crate::upload::RetryPolicy;
use async_trait::async_trait;
use std::fmt::Write;
use std::time::Duration;
use tracing::{info, warn};

/// One monitoring run; lives only as long as the call
#[derive(Debug, Clone)]
pub struct MonitorSession {
    /// Product or flight being watched
    pub target: SubmissionTarget,
    /// Submission being watched
    pub submission_id: String,
    /// Pause between polls
    pub poll_interval: Duration,
    /// Mail recipients for status changes
    pub recipients: Vec<String>,
}

impl MonitorSession {
    /// Session with the configured poll interval and no recipients
    pub fn new(target: SubmissionTarget, submission_id: impl Into<String>, config: &Config) -> Self {
        Self {
            target,
            submission_id: submission_id.into(),
            poll_interval: config.poll_interval(),
            recipients: Vec::new(),
        }
    }
}

/// Receives every observed status change
#[async_trait]
pub trait StatusObserver: Send + Sync {
    /// Called once per transition, including the first observed status
    async fn on_status_change(&self, previous: Option<SubmissionStatus>, report: &SubmissionStatusReport);
}

/// Observer that ignores every change
pub struct NoopObserver;

#[async_trait]
impl StatusObserver for NoopObserver {
    async fn on_status_change(&self, _previous: Option<SubmissionStatus>, _report: &SubmissionStatusReport) {}
}

/// How a monitoring run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorOutcome {
    /// Publish mode the terminal state was derived from
    pub publish_mode: PublishMode,
    /// Last observed status
    pub final_status: SubmissionStatus,
    /// Every distinct status observed, in order
    pub transitions: Vec<SubmissionStatus>,
    /// Details reported with the last status
    pub status_details: StatusDetails,
}

impl MonitorOutcome {
    /// Whether the submission ended without failing
    pub const fn succeeded(&self) -> bool {
        !self.final_status.is_failure()
    }
}

/// Whether polling stops at `status` for a submission in `mode`
pub fn is_terminal(status: SubmissionStatus, mode: PublishMode) -> bool {
    status.is_failure() || status == mode.final_status() || status == SubmissionStatus::Published
}

/// Poll until the submission fails or reaches its final state
///
/// A failed poll ends the session with the error; only the transport's own
/// retries apply.
pub async fn monitor_submission(
    transport: &dyn RestTransport,
    session: &MonitorSession,
    notifier: Option<&dyn Notifier>,
    mail_policy: RetryPolicy,
    observer: &dyn StatusObserver,
) -> Result<MonitorOutcome> {
    let target = &session.target;
    let submission_id = session.submission_id.as_str();

    let submission = get_submission(transport, target, submission_id).await?;
    let publish_mode = submission.target_publish_mode.unwrap_or_default();
    info!(
        %target,
        submission_id,
        %publish_mode,
        final_status = %publish_mode.final_status(),
        "monitoring submission"
    );

    let mut transitions: Vec<SubmissionStatus> = Vec::new();
    loop {
        let report = get_submission_status(transport, target, submission_id)
            .await
            .context(|| format!("monitoring submission {submission_id} of {target}"))?;
        let previous = transitions.last().copied();

        if previous != Some(report.status) {
            info!(%target, submission_id, status = %report.status, "submission status changed");
            for issue in &report.status_details.errors {
                warn!(code = %issue.code, details = %issue.details, "submission error");
            }
            transitions.push(report.status);
            observer.on_status_change(previous, &report).await;

            if let Some(notifier) = notifier {
                let (subject, body) = format_notification(session, previous, &report);
                notify_best_effort(notifier, &subject, &body, &session.recipients, mail_policy).await;
            }
        }

        if is_terminal(report.status, publish_mode) {
            return Ok(MonitorOutcome {
                publish_mode,
                final_status: report.status,
                transitions,
                status_details: report.status_details,
            });
        }

        tokio::time::sleep(session.poll_interval).await;
    }
}

/// Subject and plain-text body for a status change mail
pub fn format_notification(
    session: &MonitorSession,
    previous: Option<SubmissionStatus>,
    report: &SubmissionStatusReport,
) -> (String, String) {
    let subject = format!(
        "[{}] submission {} is now {}",
        session.target, session.submission_id, report.status
    );

    let mut body = String::new();
    let _ = writeln!(body, "Target: {}", session.target);
    let _ = writeln!(body, "Submission: {}", session.submission_id);
    match previous {
        Some(previous) => {
            let _ = writeln!(body, "Status: {previous} -> {}", report.status);
        }
        None => {
            let _ = writeln!(body, "Status: {}", report.status);
        }
    }

    let details = &report.status_details;
    for (label, issues) in [("Errors", &details.errors), ("Warnings", &details.warnings)] {
        if !issues.is_empty() {
            let _ = writeln!(body, "\n{label}:");
            for issue in issues {
                let _ = writeln!(body, "  {}: {}", issue.code, issue.details);
            }
        }
    }
    if !details.certification_reports.is_empty() {
        let _ = writeln!(body, "\nCertification reports:");
        for cert in &details.certification_reports {
            let _ = writeln!(body, "  {} {}", cert.date, cert.report_url);
        }
    }

    (subject, body)
}
