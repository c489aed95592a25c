//! Asset upload tests: batch resilience and listing media

mod common;

use common::{
    APP_ID, MockStoreService, MockUploader, app_target, make_listing_image, make_published_submission,
    test_config,
};
use std::path::Path;
use std::time::Duration;
use store_submit::upload::{MediaAsset, RetryPolicy, upload_asset_batch, upload_listing_media};
use tempfile::TempDir;

const SUBMISSION_ID: &str = "1152921504628000001";

fn policy() -> RetryPolicy {
    RetryPolicy {
        attempts: 2,
        backoff: Duration::ZERO,
    }
}

fn media_dir(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in files {
        std::fs::write(dir.path().join(name), b"png").unwrap();
    }
    dir
}

fn asset(dir: &Path, name: &str, sas: Option<&str>) -> MediaAsset {
    MediaAsset {
        id: format!("id-{name}"),
        name: name.to_string(),
        local_path: dir.join(name),
        sas_uri: sas.map(ToString::to_string),
    }
}

fn names(assets: &[MediaAsset]) -> Vec<&str> {
    assets.iter().map(|asset| asset.name.as_str()).collect()
}

fn image_path(image_id: &str) -> String {
    format!("products/{APP_ID}/listings/en-us/images/{image_id}?submissionId={SUBMISSION_ID}")
}

#[tokio::test]
async fn test_batch_continues_past_failed_asset() {
    let dir = media_dir(&["a.png", "b.png", "c.png"]);
    let uploader = MockUploader::new();
    uploader.fail_for("b.png");
    let assets = vec![
        asset(dir.path(), "a.png", Some("https://sas/a")),
        asset(dir.path(), "b.png", Some("https://sas/b")),
        asset(dir.path(), "c.png", Some("https://sas/c")),
    ];

    let report = upload_asset_batch(&uploader, &assets, policy()).await;

    assert_eq!(names(&report.uploaded), vec!["a.png", "c.png"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0.name, "b.png");
    assert_eq!(report.failed[0].0.id, "id-b.png");
    assert!(!report.is_complete());
    // Non-retryable failures are attempted once
    assert_eq!(uploader.get_calls().len(), 3);
}

#[tokio::test]
async fn test_batch_skips_assets_without_url() {
    let dir = media_dir(&["a.png", "b.png"]);
    let uploader = MockUploader::new();
    let assets = vec![
        asset(dir.path(), "a.png", None),
        asset(dir.path(), "b.png", Some("https://sas/b")),
    ];

    let report = upload_asset_batch(&uploader, &assets, policy()).await;

    assert_eq!(names(&report.skipped), vec!["a.png"]);
    assert_eq!(names(&report.uploaded), vec!["b.png"]);
    assert!(report.is_complete());
    assert_eq!(uploader.get_calls().len(), 1);
}

#[tokio::test]
async fn test_batch_reports_missing_local_file() {
    let dir = media_dir(&["a.png"]);
    let uploader = MockUploader::new();
    let assets = vec![
        asset(dir.path(), "missing.png", Some("https://sas/m")),
        asset(dir.path(), "a.png", Some("https://sas/a")),
    ];

    let report = upload_asset_batch(&uploader, &assets, policy()).await;

    assert_eq!(report.failed[0].0.name, "missing.png");
    assert_eq!(names(&report.uploaded), vec!["a.png"]);
}

#[tokio::test]
async fn test_listing_media_uploads_pending_images_and_marks_them() {
    let service = MockStoreService::new(app_target(), make_published_submission(&[]));
    service.add_document(
        &image_path("img1"),
        make_listing_image("img1", "shot1.png", "PendingUpload", Some("https://sas/shot1?sig=x")),
    );
    service.add_document(
        &image_path("img2"),
        make_listing_image("img2", "shot2.png", "Uploaded", None),
    );
    service.add_document(
        &image_path("img3"),
        make_listing_image("img3", "shot3.png", "PendingUpload", Some("https://sas/shot3?sig=y")),
    );
    let dir = media_dir(&["shot1.png", "shot3.png"]);
    let uploader = MockUploader::new();
    uploader.fail_for("shot3.png");

    let report = upload_listing_media(
        &service,
        &uploader,
        &test_config(),
        APP_ID,
        SUBMISSION_ID,
        "en-us",
        dir.path(),
    )
    .await
    .unwrap();

    assert_eq!(names(&report.uploaded), vec!["shot1.png"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0.id, "img3");

    let calls = uploader.get_calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| !c.path.ends_with("shot2.png")));

    assert_eq!(service.document(&image_path("img1")).unwrap()["state"], "Uploaded");
    assert_eq!(service.document(&image_path("img3")).unwrap()["state"], "PendingUpload");
}

#[tokio::test]
async fn test_listing_media_read_failure_is_fatal() {
    let service = MockStoreService::new(app_target(), make_published_submission(&[]));
    service.fail_on(reqwest::Method::GET, "/images", 503);
    let dir = media_dir(&[]);

    let err = upload_listing_media(
        &service,
        &MockUploader::new(),
        &test_config(),
        APP_ID,
        SUBMISSION_ID,
        "en-us",
        dir.path(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_listing_media_matches_images_by_id() {
    let service = MockStoreService::new(app_target(), make_published_submission(&[]));
    service.add_document(
        &image_path("img1"),
        make_listing_image("img1", "shot.png", "PendingUpload", Some("https://sas/img1?sig=x")),
    );
    service.add_document(
        &image_path("img2"),
        make_listing_image("img2", "shot.png", "PendingUpload", Some("https://sas/img2?sig=y")),
    );
    let dir = media_dir(&["shot.png"]);
    let uploader = MockUploader::new();

    let report = upload_listing_media(
        &service,
        &uploader,
        &test_config(),
        APP_ID,
        SUBMISSION_ID,
        "en-us",
        dir.path(),
    )
    .await
    .unwrap();

    let mut ids: Vec<&str> = report.uploaded.iter().map(|asset| asset.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["img1", "img2"]);
    assert_eq!(uploader.get_calls().len(), 2);
    assert_eq!(service.document(&image_path("img1")).unwrap()["state"], "Uploaded");
    assert_eq!(service.document(&image_path("img2")).unwrap()["state"], "Uploaded");
}

#[tokio::test]
async fn test_listing_media_refuses_names_outside_media_dir() {
    let service = MockStoreService::new(app_target(), make_published_submission(&[]));
    service.add_document(
        &image_path("img1"),
        make_listing_image("img1", "../secret.png", "PendingUpload", Some("https://sas/img1?sig=x")),
    );
    service.add_document(
        &image_path("img2"),
        make_listing_image("img2", "/etc/hosts", "PendingUpload", Some("https://sas/img2?sig=y")),
    );
    service.add_document(
        &image_path("img3"),
        make_listing_image("img3", "shot3.png", "PendingUpload", Some("https://sas/img3?sig=z")),
    );
    let parent = tempfile::tempdir().unwrap();
    std::fs::write(parent.path().join("secret.png"), b"secret").unwrap();
    let dir = parent.path().join("media");
    std::fs::create_dir(&dir).unwrap();
    std::fs::write(dir.join("shot3.png"), b"png").unwrap();
    let uploader = MockUploader::new();

    let report = upload_listing_media(
        &service,
        &uploader,
        &test_config(),
        APP_ID,
        SUBMISSION_ID,
        "en-us",
        &dir,
    )
    .await
    .unwrap();

    assert_eq!(names(&report.uploaded), vec!["shot3.png"]);
    let mut refused: Vec<&str> = report.failed.iter().map(|(asset, _)| asset.id.as_str()).collect();
    refused.sort_unstable();
    assert_eq!(refused, vec!["img1", "img2"]);

    let calls = uploader.get_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, dir.join("shot3.png"));
    assert_eq!(service.document(&image_path("img1")).unwrap()["state"], "PendingUpload");
}
