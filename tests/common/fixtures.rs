//! Test data factories for store-submit types
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use serde_json::{Value, json};
use store_submit::config::Config;
use store_submit::types::{FileStatus, PackageRef, SubmissionData, SubmissionTarget};

pub const APP_ID: &str = "0ABCDEF12345";
pub const PUBLISHED_ID: &str = "1152921504621243610";

/// Target for the test application
pub fn app_target() -> SubmissionTarget {
    SubmissionTarget::App {
        app_id: APP_ID.to_string(),
    }
}

/// Target for a flight of the test application
pub fn flight_target(flight_id: &str) -> SubmissionTarget {
    SubmissionTarget::Flight {
        app_id: APP_ID.to_string(),
        flight_id: flight_id.to_string(),
    }
}

/// Config with retries but no waiting
pub fn test_config() -> Config {
    Config {
        upload_retries: 2,
        upload_retry_backoff_secs: 0,
        mail_retries: 2,
        mail_retry_backoff_secs: 0,
        poll_interval_secs: 0,
        ..Config::default()
    }
}

/// Create a package entry with the given upload state
pub fn make_package(file_name: &str, status: FileStatus) -> PackageRef {
    PackageRef {
        id: None,
        file_name: file_name.to_string(),
        file_status: status,
        extra: serde_json::Map::new(),
    }
}

/// Published app submission containing the given package files
pub fn make_published_submission(packages: &[&str]) -> Value {
    let packages: Vec<Value> = packages
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "id": format!("pkg-{i}"),
                "fileName": name,
                "fileStatus": "Uploaded",
                "version": "1.0.0.0",
            })
        })
        .collect();

    json!({
        "id": PUBLISHED_ID,
        "status": "Published",
        "targetPublishMode": "Immediate",
        "visibility": "Public",
        "applicationCategory": "DeveloperTools",
        "pricing": { "trialPeriod": "NoFreeTrial", "priceId": "Free" },
        "notesForCertification": "",
        "applicationPackages": packages,
        "listings": {
            "en-us": {
                "baseListing": {
                    "title": "Contoso Notes",
                    "description": "Take notes.",
                    "images": [{ "fileName": "shot1.png", "fileStatus": "Uploaded", "imageType": "Screenshot" }]
                }
            }
        }
    })
}

/// A pending (or other status) submission with an upload URL
pub fn make_submission(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "status": status,
        "targetPublishMode": "Immediate",
        "applicationPackages": [],
        "fileUploadUrl": format!("https://store.blob.core.windows.net/uploads/{id}?sig=secret"),
    })
}

/// Submission data carrying the given packages for the test application
pub fn make_submission_data(packages: &[&str]) -> SubmissionData {
    SubmissionData {
        product_id: Some(APP_ID.to_string()),
        application_packages: Some(
            packages
                .iter()
                .map(|name| make_package(name, FileStatus::PendingUpload))
                .collect(),
        ),
        ..SubmissionData::default()
    }
}

/// A listing image document as the service returns it
pub fn make_listing_image(id: &str, file_name: &str, state: &str, sas: Option<&str>) -> Value {
    let mut image = json!({
        "id": id,
        "type": "Screenshot",
        "fileName": file_name,
        "state": state,
        "revisionToken": format!("seed-{id}"),
    });
    if let Some(sas) = sas {
        image["fileSasUri"] = json!(sas);
    }
    image
}

/// File names of the application packages in a submission body
pub fn package_names(submission: &Value) -> Vec<String> {
    submission["applicationPackages"]
        .as_array()
        .map(|packages| {
            packages
                .iter()
                .filter_map(|p| p["fileName"].as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}
