//! Asset upload manager
//!
//! Pushes package archives and media files to the time-limited SAS URLs the
//! service hands out. Single uploads fail loudly; batch uploads are
//! best-effort per item.

mod blob;
mod media;

pub use blob::BlobUploader;
pub use media::upload_listing_media;

use crate::config::Config;
use crate::error::{Error, Result, ResultExt};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Binary transfer to a pre-authorized URL
#[async_trait]
pub trait AssetUploader: Send + Sync {
    /// Upload the file at `path` to `sas_uri`
    async fn put_blob(&self, sas_uri: &str, path: &Path) -> Result<()>;
}

/// Attempts and backoff for one asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts (at least one)
    pub attempts: u32,
    /// Pause between attempts
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Upload policy from configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            attempts: config.upload_retries.max(1),
            backoff: config.upload_retry_backoff(),
        }
    }
}

/// A media file and where the service wants it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    /// Service id of the asset; unique within a batch
    pub id: String,
    /// Display name (usually the file name)
    pub name: String,
    /// Local file to upload
    pub local_path: PathBuf,
    /// Upload target; `None` means the service did not ask for this file
    pub sas_uri: Option<String>,
}

/// Outcome of a batch upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Assets uploaded
    pub uploaded: Vec<MediaAsset>,
    /// Assets without an upload target
    pub skipped: Vec<MediaAsset>,
    /// Assets whose upload failed, with the error text
    pub failed: Vec<(MediaAsset, String)>,
}

impl BatchReport {
    /// Whether every linked asset was uploaded
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Upload one file, retrying transient failures
///
/// Errors propagate: a failed package upload invalidates the submission.
pub async fn upload_asset(
    uploader: &dyn AssetUploader,
    local_path: &Path,
    sas_uri: &str,
    policy: RetryPolicy,
) -> Result<()> {
    if !local_path.is_file() {
        return Err(Error::Validation(format!(
            "{} does not exist or is not a file",
            local_path.display()
        )));
    }

    let target = redact_sas(sas_uri);
    let mut attempt = 1;
    loop {
        debug!(path = %local_path.display(), url = %target, attempt, "uploading asset");
        match uploader.put_blob(sas_uri, local_path).await {
            Ok(()) => {
                info!(path = %local_path.display(), "uploaded asset");
                return Ok(());
            }
            Err(e) if e.is_transient() && attempt < policy.attempts => {
                warn!(path = %local_path.display(), attempt, error = %e, "upload failed, retrying");
                attempt += 1;
                tokio::time::sleep(policy.backoff).await;
            }
            Err(e) => {
                return Err(e).context(|| format!("uploading {} to {target}", local_path.display()));
            }
        }
    }
}

/// Upload every linked asset, continuing past individual failures
pub async fn upload_asset_batch(
    uploader: &dyn AssetUploader,
    assets: &[MediaAsset],
    policy: RetryPolicy,
) -> BatchReport {
    let mut report = BatchReport::default();

    for asset in assets {
        let Some(sas_uri) = asset.sas_uri.as_deref() else {
            debug!(asset = %asset.name, id = %asset.id, "no upload URL, skipping");
            report.skipped.push(asset.clone());
            continue;
        };

        match upload_asset(uploader, &asset.local_path, sas_uri, policy).await {
            Ok(()) => report.uploaded.push(asset.clone()),
            Err(e) => {
                error!(asset = %asset.name, id = %asset.id, error = %e, "asset upload failed, continuing");
                report.failed.push((asset.clone(), e.to_string()));
            }
        }
    }

    report
}

/// Strip the signature from a SAS URL so it can be logged
pub fn redact_sas(url: &str) -> String {
    static SIG: OnceLock<Regex> = OnceLock::new();
    SIG.get_or_init(|| Regex::new(r"(?i)([?&]sig=)[^&]*").expect("hardcoded regex is valid"))
        .replace_all(url, "${1}REDACTED")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FlakyUploader {
        failures_left: Mutex<u32>,
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl AssetUploader for FlakyUploader {
        async fn put_blob(&self, _sas_uri: &str, path: &Path) -> Result<()> {
            *self.calls.lock().unwrap() += 1;
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(Error::Upload {
                    path: path.display().to_string(),
                    message: "HTTP 503".to_string(),
                    retryable: true,
                });
            }
            Ok(())
        }
    }

    fn flaky(failures: u32) -> FlakyUploader {
        FlakyUploader {
            failures_left: Mutex::new(failures),
            calls: Mutex::new(0),
        }
    }

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            backoff: Duration::ZERO,
        }
    }

    #[test]
    fn test_redact_sas() {
        let url = "https://x.blob.core.windows.net/c/b?sv=2017&sr=b&sig=abc%2Bdef&se=2026";
        assert_eq!(
            redact_sas(url),
            "https://x.blob.core.windows.net/c/b?sv=2017&sr=b&sig=REDACTED&se=2026"
        );
        assert_eq!(redact_sas("https://plain/url"), "https://plain/url");
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let uploader = flaky(2);

        upload_asset(&uploader, file.path(), "https://sas", policy(3))
            .await
            .unwrap();
        assert_eq!(*uploader.calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_propagate() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let uploader = flaky(5);

        let err = upload_asset(&uploader, file.path(), "https://sas?sig=secret", policy(2))
            .await
            .unwrap_err();
        assert_eq!(*uploader.calls.lock().unwrap(), 2);
        assert!(!err.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_attempted() {
        let uploader = flaky(0);
        let err = upload_asset(&uploader, Path::new("/nonexistent/pkg.zip"), "https://sas", policy(3))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(*uploader.calls.lock().unwrap(), 0);
    }
}
