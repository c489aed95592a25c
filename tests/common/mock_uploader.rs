//! Recording asset uploader for testing

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use store_submit::error::{Error, Result};
use store_submit::upload::AssetUploader;

/// Call record for `put_blob`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutBlobCall {
    pub sas_uri: String,
    pub path: PathBuf,
}

/// Uploader that records transfers and fails for chosen file names
#[derive(Default)]
pub struct MockUploader {
    calls: Mutex<Vec<PutBlobCall>>,
    failing: Mutex<HashSet<String>>,
}

impl MockUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every upload of a file with this name (not retryable)
    pub fn fail_for(&self, file_name: &str) {
        self.failing.lock().unwrap().insert(file_name.to_string());
    }

    pub fn get_calls(&self) -> Vec<PutBlobCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetUploader for MockUploader {
    async fn put_blob(&self, sas_uri: &str, path: &Path) -> Result<()> {
        self.calls.lock().unwrap().push(PutBlobCall {
            sas_uri: sas_uri.to_string(),
            path: path.to_path_buf(),
        });

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing.lock().unwrap().contains(&name) {
            return Err(Error::Upload {
                path: path.display().to_string(),
                message: "HTTP 403: signature expired".to_string(),
                retryable: false,
            });
        }
        Ok(())
    }
}
