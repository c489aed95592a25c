//! Azure blob uploads over SAS URLs
//!
//! Files up to one block go up with a single Put Blob. Larger files are
//! read one block at a time and sent as Put Block calls, then committed
//! with Put Block List, so memory use is bounded by the block size.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::upload::{redact_sas, AssetUploader, RetryPolicy};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::{Client, Response, StatusCode};
use std::fmt::Write as _;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};
use url::Url;

/// Uploads files as block blobs
pub struct BlobUploader {
    client: Client,
    block_size: usize,
    block_policy: RetryPolicy,
}

impl BlobUploader {
    /// Create an uploader with its own client
    ///
    /// No request timeout is applied: large packages can take far longer
    /// than an API call.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("store-submit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create an uploader sharing an existing client
    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            block_size: config.upload_block_size(),
            block_policy: RetryPolicy::from_config(config),
        }
    }

    async fn put_single(&self, sas_uri: &str, path: &Path, body: Vec<u8>) -> Result<()> {
        let response = self
            .client
            .put(sas_uri)
            .header("x-ms-blob-type", "BlockBlob")
            .body(body)
            .send()
            .await
            .map_err(|e| send_error(path, &e))?;
        check_response(path, response).await
    }

    async fn put_blocks(&self, sas_uri: &str, path: &Path, mut file: tokio::fs::File) -> Result<()> {
        let base = Url::parse(sas_uri)?;
        let mut block_ids = Vec::new();
        let mut buffer = vec![0; self.block_size];

        loop {
            let filled = read_block(&mut file, &mut buffer).await?;
            if filled == 0 {
                break;
            }
            let block_id = BASE64.encode(format!("block-{:08}", block_ids.len()));
            let mut url = base.clone();
            url.query_pairs_mut()
                .append_pair("comp", "block")
                .append_pair("blockid", &block_id);

            self.put_block(url.as_str(), path, &buffer[..filled], block_ids.len())
                .await?;
            block_ids.push(block_id);
        }

        let mut list = String::from(r#"<?xml version="1.0" encoding="utf-8"?><BlockList>"#);
        for id in &block_ids {
            let _ = write!(list, "<Latest>{id}</Latest>");
        }
        list.push_str("</BlockList>");

        let mut url = base;
        url.query_pairs_mut().append_pair("comp", "blocklist");
        debug!(path = %path.display(), blocks = block_ids.len(), "committing block list");
        let response = self
            .client
            .put(url.as_str())
            .header("content-type", "application/xml")
            .body(list)
            .send()
            .await
            .map_err(|e| send_error(path, &e))?;
        check_response(path, response).await
    }

    /// One block, retried on its own; a block that keeps failing ends the upload
    async fn put_block(&self, url: &str, path: &Path, block: &[u8], index: usize) -> Result<()> {
        let mut attempt = 1;
        loop {
            let result = match self.client.put(url).body(block.to_vec()).send().await {
                Ok(response) => check_response(path, response).await,
                Err(e) => Err(send_error(path, &e)),
            };
            match result {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() && attempt < self.block_policy.attempts => {
                    warn!(path = %path.display(), block = index, attempt, error = %e, "block upload failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(self.block_policy.backoff).await;
                }
                Err(Error::Upload { path, message, .. }) => {
                    return Err(Error::Upload {
                        path,
                        message: format!("block {index}: {message}"),
                        retryable: false,
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl AssetUploader for BlobUploader {
    async fn put_blob(&self, sas_uri: &str, path: &Path) -> Result<()> {
        let mut file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();

        if usize::try_from(size).is_ok_and(|size| size <= self.block_size) {
            let mut body = Vec::new();
            file.read_to_end(&mut body).await?;
            return self.put_single(sas_uri, path, body).await;
        }
        self.put_blocks(sas_uri, path, file).await
    }
}

/// Fill `buffer` from `file`; fewer bytes only at end of file
async fn read_block(file: &mut tokio::fs::File, buffer: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let read = file.read(&mut buffer[filled..]).await?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(filled)
}

fn send_error(path: &Path, error: &reqwest::Error) -> Error {
    Error::Upload {
        path: path.display().to_string(),
        message: redact_sas(&error.to_string()),
        retryable: true,
    }
}

async fn check_response(path: &Path, response: Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Upload {
        path: path.display().to_string(),
        message: format!("HTTP {}: {}", status.as_u16(), body.trim()),
        retryable: status.is_server_error()
            || status == StatusCode::REQUEST_TIMEOUT
            || status == StatusCode::TOO_MANY_REQUESTS,
    })
}
