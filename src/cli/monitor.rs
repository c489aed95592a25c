//! Monitor command - poll a submission until it settles

use crate::cli::progress::CliStatusPrinter;
use crate::cli::style::{check, cross, Stylize};
use anstream::{eprintln, println};
use std::time::Duration;
use store_submit::auth::get_store_auth;
use store_submit::config::Config;
use store_submit::error::{Error, Result};
use store_submit::monitor::{monitor_submission, GraphMailer, MonitorSession, Notifier};
use store_submit::transport::create_transport;
use store_submit::types::SubmissionTarget;
use store_submit::upload::RetryPolicy;

/// Run the monitor command
pub async fn run_monitor(
    config: &Config,
    target: &SubmissionTarget,
    submission_id: &str,
    interval: Option<u64>,
    recipients: Vec<String>,
) -> Result<()> {
    let transport = create_transport(config)?;

    let mailer = if recipients.is_empty() {
        None
    } else {
        Some(GraphMailer::new(config, get_store_auth()?)?)
    };
    let notifier = mailer.as_ref().map(|m| m as &dyn Notifier);

    let mut session = MonitorSession::new(target.clone(), submission_id, config);
    if let Some(secs) = interval {
        session.poll_interval = Duration::from_secs(secs);
    }
    session.recipients = recipients;

    println!(
        "Monitoring submission {} of {} every {}s (Ctrl-C to stop)",
        submission_id.accent(),
        target.to_string().emphasis(),
        session.poll_interval.as_secs()
    );

    let mail_policy = RetryPolicy {
        attempts: config.mail_retries.max(1),
        backoff: config.mail_retry_backoff(),
    };
    let outcome = monitor_submission(
        transport.as_ref(),
        &session,
        notifier,
        mail_policy,
        &CliStatusPrinter,
    )
    .await?;

    if outcome.succeeded() {
        println!(
            "{} Submission {} reached {} ({} publish mode)",
            check(),
            submission_id.accent(),
            outcome.final_status.as_str().success(),
            outcome.publish_mode
        );
        Ok(())
    } else {
        eprintln!(
            "{} Submission {} ended in {}",
            cross(),
            submission_id,
            outcome.final_status.as_str().error()
        );
        Err(Error::Precondition(format!(
            "submission {submission_id} of {target} ended in {}",
            outcome.final_status
        )))
    }
}
