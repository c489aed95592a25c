//! Core types for store-submit

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Fields the client does not model, preserved verbatim on write-back
pub type Extensions = Map<String, Value>;

/// Lifecycle status of a submission
///
/// Closed set; an unknown value from the service fails deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SubmissionStatus {
    /// No status reported
    #[default]
    #[serde(rename = "None")]
    NotSet,
    /// Submission was canceled
    Canceled,
    /// Mutable draft awaiting commit
    PendingCommit,
    /// Commit accepted, processing begins
    CommitStarted,
    /// Commit was rejected
    CommitFailed,
    /// Packages are being pre-processed
    PreProcessing,
    /// Pre-processing failed
    PreProcessingFailed,
    /// In certification
    Certification,
    /// Certification failed
    CertificationFailed,
    /// Being released
    Release,
    /// Release failed
    ReleaseFailed,
    /// Being published
    Publishing,
    /// Certified, waiting for a manual or scheduled publish
    PendingPublication,
    /// Live
    Published,
    /// Publishing failed
    PublishFailed,
    /// Generic failure
    Failed,
}

impl SubmissionStatus {
    /// Whether the status is a failure (ends monitoring regardless of publish mode)
    pub const fn is_failure(self) -> bool {
        matches!(
            self,
            Self::Canceled
                | Self::CommitFailed
                | Self::PreProcessingFailed
                | Self::CertificationFailed
                | Self::ReleaseFailed
                | Self::PublishFailed
                | Self::Failed
        )
    }

    /// Status name as the service spells it
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotSet => "None",
            Self::Canceled => "Canceled",
            Self::PendingCommit => "PendingCommit",
            Self::CommitStarted => "CommitStarted",
            Self::CommitFailed => "CommitFailed",
            Self::PreProcessing => "PreProcessing",
            Self::PreProcessingFailed => "PreProcessingFailed",
            Self::Certification => "Certification",
            Self::CertificationFailed => "CertificationFailed",
            Self::Release => "Release",
            Self::ReleaseFailed => "ReleaseFailed",
            Self::Publishing => "Publishing",
            Self::PendingPublication => "PendingPublication",
            Self::Published => "Published",
            Self::PublishFailed => "PublishFailed",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a certified submission goes live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PublishMode {
    /// Service default for the product
    #[default]
    Default,
    /// Publish as soon as certification passes
    Immediate,
    /// Wait for an explicit publish action
    Manual,
    /// Publish at `targetPublishDate`
    SpecificDate,
}

impl PublishMode {
    /// Canonical spelling
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Immediate => "Immediate",
            Self::Manual => "Manual",
            Self::SpecificDate => "SpecificDate",
        }
    }

    /// Last status a successful submission reaches in this mode
    pub const fn final_status(self) -> SubmissionStatus {
        match self {
            Self::Default | Self::Immediate => SubmissionStatus::Published,
            Self::Manual | Self::SpecificDate => SubmissionStatus::PendingPublication,
        }
    }
}

impl fmt::Display for PublishMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublishMode {
    type Err = Error;

    /// Parse case-insensitively, normalizing to the canonical variant
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "notset" => Ok(Self::Default),
            "immediate" => Ok(Self::Immediate),
            "manual" => Ok(Self::Manual),
            "specificdate" => Ok(Self::SpecificDate),
            other => Err(Error::Validation(format!(
                "unknown publish mode '{other}' (expected Immediate, Manual, SpecificDate or Default)"
            ))),
        }
    }
}

impl Serialize for PublishMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PublishMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Upload state of a package or media file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FileStatus {
    /// No state reported
    #[default]
    #[serde(rename = "None")]
    NotSet,
    /// Entry exists, binary not yet uploaded
    PendingUpload,
    /// Binary uploaded
    Uploaded,
    /// Entry will be removed by the service on commit
    PendingDelete,
}

/// Kind of product a submission belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKind {
    /// Application
    App,
    /// Package flight of an application
    Flight,
    /// In-app product (add-on)
    InAppProduct,
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::App => "app",
            Self::Flight => "flight",
            Self::InAppProduct => "in-app product",
        })
    }
}

/// The product (or flight) whose submissions are being managed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionTarget {
    /// An application
    App {
        /// Store application id
        app_id: String,
    },
    /// A package flight of an application
    Flight {
        /// Store application id
        app_id: String,
        /// Flight id
        flight_id: String,
    },
    /// An in-app product
    InAppProduct {
        /// In-app product id
        iap_id: String,
    },
}

impl SubmissionTarget {
    /// Product kind of this target
    pub const fn kind(&self) -> ProductKind {
        match self {
            Self::App { .. } => ProductKind::App,
            Self::Flight { .. } => ProductKind::Flight,
            Self::InAppProduct { .. } => ProductKind::InAppProduct,
        }
    }

    /// Identifier the submission data must carry (app id or IAP id)
    pub fn product_id(&self) -> &str {
        match self {
            Self::App { app_id } | Self::Flight { app_id, .. } => app_id,
            Self::InAppProduct { iap_id } => iap_id,
        }
    }

    /// URI fragment of the product (or flight) resource
    pub fn resource_path(&self) -> String {
        match self {
            Self::App { app_id } => format!("applications/{}", encode(app_id)),
            Self::Flight { app_id, flight_id } => format!(
                "applications/{}/flights/{}",
                encode(app_id),
                encode(flight_id)
            ),
            Self::InAppProduct { iap_id } => format!("inappproducts/{}", encode(iap_id)),
        }
    }

    /// URI fragment of the submission collection
    pub fn submissions_path(&self) -> String {
        format!("{}/submissions", self.resource_path())
    }

    /// URI fragment of a single submission
    pub fn submission_path(&self, submission_id: &str) -> String {
        format!("{}/{}", self.submissions_path(), encode(submission_id))
    }

    /// Field on the product resource that points at its pending submission
    pub const fn pending_field(&self) -> &'static str {
        match self {
            Self::App { .. } => "pendingApplicationSubmission",
            Self::Flight { .. } => "pendingFlightSubmission",
            Self::InAppProduct { .. } => "pendingInAppProductSubmission",
        }
    }
}

impl fmt::Display for SubmissionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App { app_id } => write!(f, "app {app_id}"),
            Self::Flight { app_id, flight_id } => write!(f, "flight {flight_id} of app {app_id}"),
            Self::InAppProduct { iap_id } => write!(f, "in-app product {iap_id}"),
        }
    }
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// A package entry of a submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRef {
    /// Service-assigned package id (absent for new entries)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// File name inside the uploaded archive
    pub file_name: String,
    /// Upload state
    #[serde(default)]
    pub file_status: FileStatus,
    /// Remaining package fields (version, architecture, ...)
    #[serde(flatten)]
    pub extra: Extensions,
}

/// A service-reported error or warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusIssue {
    /// Machine-readable code
    #[serde(default)]
    pub code: String,
    /// Human-readable details
    #[serde(default)]
    pub details: String,
}

/// A certification report link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationReport {
    /// Report timestamp as sent by the service
    #[serde(default)]
    pub date: String,
    /// Link to the report
    #[serde(default)]
    pub report_url: String,
}

/// Errors, warnings and certification reports attached to a submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDetails {
    /// Blocking errors
    #[serde(default)]
    pub errors: Vec<StatusIssue>,
    /// Non-blocking warnings
    #[serde(default)]
    pub warnings: Vec<StatusIssue>,
    /// Certification report links
    #[serde(default)]
    pub certification_reports: Vec<CertificationReport>,
}

/// A submission as returned by the service
///
/// Only the fields the client reasons about are typed; everything else
/// (listings, pricing, properties, ...) lives in `extra` and round-trips
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Submission id
    pub id: String,
    /// Lifecycle status
    #[serde(default)]
    pub status: SubmissionStatus,
    /// Status details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_details: Option<StatusDetails>,
    /// Publish mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_publish_mode: Option<PublishMode>,
    /// Publish date, meaningful only for `SpecificDate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_publish_date: Option<DateTime<Utc>>,
    /// Upload URL, present while the submission is `PendingCommit`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_upload_url: Option<String>,
    /// Free-text notes for certification testers (apps only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_for_certification: Option<String>,
    /// Packages of an app submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_packages: Option<Vec<PackageRef>>,
    /// Packages of a flight submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_packages: Option<Vec<PackageRef>>,
    /// Unmodeled fields
    #[serde(flatten)]
    pub extra: Extensions,
}

impl Submission {
    /// Mutable package list for the given product kind, created if absent
    pub fn packages_mut(&mut self, kind: ProductKind) -> Option<&mut Vec<PackageRef>> {
        match kind {
            ProductKind::App => Some(self.application_packages.get_or_insert_with(Vec::new)),
            ProductKind::Flight => Some(self.flight_packages.get_or_insert_with(Vec::new)),
            ProductKind::InAppProduct => None,
        }
    }

    /// Package list for the given product kind
    pub fn packages(&self, kind: ProductKind) -> &[PackageRef] {
        let list = match kind {
            ProductKind::App => self.application_packages.as_deref(),
            ProductKind::Flight => self.flight_packages.as_deref(),
            ProductKind::InAppProduct => None,
        };
        list.unwrap_or_default()
    }
}

/// Status-only view returned by the status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionStatusReport {
    /// Lifecycle status
    pub status: SubmissionStatus,
    /// Status details
    #[serde(default)]
    pub status_details: StatusDetails,
}

/// Caller-supplied submission payload (the JSON file given to `update`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionData {
    /// Product the payload was generated for
    #[serde(default, alias = "appId", alias = "iapId", skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Flight the payload was generated for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_id: Option<String>,
    /// Publish mode to apply with `UpdatePublishMode`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_publish_mode: Option<PublishMode>,
    /// Publish date to apply with `UpdatePublishMode`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_publish_date: Option<DateTime<Utc>>,
    /// Certification notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_for_certification: Option<String>,
    /// App packages to add or replace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_packages: Option<Vec<PackageRef>>,
    /// Flight packages to add or replace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_packages: Option<Vec<PackageRef>>,
    /// Listings keyed by language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listings: Option<BTreeMap<String, Value>>,
    /// Remaining submission sections (pricing, properties, ...)
    #[serde(flatten)]
    pub extra: Extensions,
}

impl SubmissionData {
    /// Packages carried for the given product kind
    pub fn packages(&self, kind: ProductKind) -> &[PackageRef] {
        let list = match kind {
            ProductKind::App => self.application_packages.as_deref(),
            ProductKind::Flight => self.flight_packages.as_deref(),
            ProductKind::InAppProduct => None,
        };
        list.unwrap_or_default()
    }
}

/// Identifiers handed back by `update_submission`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionHandle {
    /// Persisted submission id
    pub submission_id: String,
    /// Upload URL for the package archive
    pub upload_url: Option<String>,
}
