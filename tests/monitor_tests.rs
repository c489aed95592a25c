//! Submission monitor tests with scripted status sequences

mod common;

use async_trait::async_trait;
use common::{MockStoreService, app_target, make_published_submission, make_submission, test_config};
use reqwest::Method;
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;
use store_submit::error::{Error, Result};
use store_submit::monitor::{MonitorSession, NoopObserver, Notifier, StatusObserver, monitor_submission};
use store_submit::types::{SubmissionStatus, SubmissionStatusReport};
use store_submit::upload::RetryPolicy;

use SubmissionStatus::{
    CertificationFailed, Certification, CommitStarted, PendingPublication, PreProcessing, Published,
    Publishing, Release,
};

const SUBMISSION_ID: &str = "1152921504628000001";

/// Records every mail; optionally fails the first `failures` sends
#[derive(Default)]
struct RecordingNotifier {
    subjects: Mutex<Vec<String>>,
    failures: Mutex<u32>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_mail(&self, subject: &str, _body: &str, _recipients: &[String]) -> Result<()> {
        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(Error::Internal("smtp down".to_string()));
        }
        self.subjects.lock().unwrap().push(subject.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingObserver {
    changes: Mutex<Vec<(Option<SubmissionStatus>, SubmissionStatus)>>,
}

#[async_trait]
impl StatusObserver for RecordingObserver {
    async fn on_status_change(&self, previous: Option<SubmissionStatus>, report: &SubmissionStatusReport) {
        self.changes.lock().unwrap().push((previous, report.status));
    }
}

fn service_with_mode(mode: &str, statuses: &[SubmissionStatus]) -> MockStoreService {
    let service = MockStoreService::new(app_target(), make_published_submission(&[]));
    let mut submission = make_submission(SUBMISSION_ID, "CommitStarted");
    submission["targetPublishMode"] = json!(mode);
    service.add_submission(submission);
    service.set_status_sequence(statuses);
    service
}

fn session(recipients: &[&str]) -> MonitorSession {
    let mut session = MonitorSession::new(app_target(), SUBMISSION_ID, &test_config());
    session.poll_interval = Duration::ZERO;
    session.recipients = recipients.iter().map(ToString::to_string).collect();
    session
}

fn mail_policy() -> RetryPolicy {
    RetryPolicy {
        attempts: 3,
        backoff: Duration::ZERO,
    }
}

#[tokio::test]
async fn test_manual_mode_stops_at_pending_publication() {
    let service = service_with_mode(
        "Manual",
        &[CommitStarted, PreProcessing, Certification, Release, PendingPublication, Published],
    );

    let outcome = monitor_submission(&service, &session(&[]), None, mail_policy(), &NoopObserver)
        .await
        .unwrap();

    assert_eq!(outcome.final_status, PendingPublication);
    assert!(outcome.succeeded());
    assert_eq!(service.get_status_calls().len(), 5);
}

#[tokio::test]
async fn test_immediate_mode_runs_to_published() {
    let service = service_with_mode(
        "Immediate",
        &[CommitStarted, Certification, PendingPublication, Publishing, Published],
    );

    let outcome = monitor_submission(&service, &session(&[]), None, mail_policy(), &NoopObserver)
        .await
        .unwrap();

    assert_eq!(outcome.final_status, Published);
    assert_eq!(
        outcome.transitions,
        vec![CommitStarted, Certification, PendingPublication, Publishing, Published]
    );
}

#[tokio::test]
async fn test_specific_date_stops_at_pending_publication() {
    let service = service_with_mode(
        "SpecificDate",
        &[Certification, PendingPublication, Published],
    );

    let outcome = monitor_submission(&service, &session(&[]), None, mail_policy(), &NoopObserver)
        .await
        .unwrap();

    assert_eq!(outcome.final_status, PendingPublication);
}

#[tokio::test]
async fn test_failure_stops_regardless_of_mode() {
    for mode in ["Manual", "Immediate", "SpecificDate"] {
        let service = service_with_mode(mode, &[CommitStarted, CertificationFailed, Published]);

        let outcome = monitor_submission(&service, &session(&[]), None, mail_policy(), &NoopObserver)
            .await
            .unwrap();

        assert_eq!(outcome.final_status, CertificationFailed, "mode {mode}");
        assert!(!outcome.succeeded());
        assert_eq!(service.get_status_calls().len(), 2);
    }
}

#[tokio::test]
async fn test_notifies_only_on_transitions() {
    let service = service_with_mode(
        "Manual",
        &[
            CommitStarted,
            CommitStarted,
            CommitStarted,
            Certification,
            Certification,
            PendingPublication,
        ],
    );
    let notifier = RecordingNotifier::default();
    let observer = RecordingObserver::default();

    monitor_submission(
        &service,
        &session(&["release@contoso.com"]),
        Some(&notifier as &dyn Notifier),
        mail_policy(),
        &observer,
    )
    .await
    .unwrap();

    assert_eq!(service.get_status_calls().len(), 6);
    let subjects = notifier.subjects.lock().unwrap().clone();
    assert_eq!(subjects.len(), 3);
    assert!(subjects[2].ends_with("is now PendingPublication"));
    assert_eq!(
        *observer.changes.lock().unwrap(),
        vec![
            (None, CommitStarted),
            (Some(CommitStarted), Certification),
            (Some(Certification), PendingPublication),
        ]
    );
}

#[tokio::test]
async fn test_mail_failure_does_not_stop_monitoring() {
    let service = service_with_mode("Immediate", &[Certification, Published]);
    let notifier = RecordingNotifier {
        failures: Mutex::new(10),
        ..RecordingNotifier::default()
    };

    let outcome = monitor_submission(
        &service,
        &session(&["release@contoso.com"]),
        Some(&notifier as &dyn Notifier),
        mail_policy(),
        &NoopObserver,
    )
    .await
    .unwrap();

    assert_eq!(outcome.final_status, Published);
    assert!(notifier.subjects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_poll_error_ends_session() {
    let service = service_with_mode("Immediate", &[Certification]);
    service.fail_on(Method::GET, "/status", 500);

    let err = monitor_submission(&service, &session(&[]), None, mail_policy(), &NoopObserver)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("monitoring submission"));
    assert_eq!(service.get_status_calls().len(), 1);
}
