//! Listing media uploads for a pending submission

use crate::config::Config;
use crate::error::{Error, Result};
use crate::resources::{list_listing_images, set_listing_image, ListingImage};
use crate::transport::RestTransport;
use crate::types::FileStatus;
use crate::upload::{upload_asset_batch, AssetUploader, BatchReport, MediaAsset, RetryPolicy};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::{error, info};

/// Upload every pending image of one language listing from `media_dir`
///
/// Images the service is not waiting for are skipped. Each uploaded image
/// is marked `Uploaded`, echoing the revision token from the listing read.
/// Individual failures end up in the report; only the initial listing read
/// is fatal.
pub async fn upload_listing_media(
    transport: &dyn RestTransport,
    uploader: &dyn AssetUploader,
    config: &Config,
    product_id: &str,
    submission_id: &str,
    language_code: &str,
    media_dir: &Path,
) -> Result<BatchReport> {
    let images = list_listing_images(
        transport,
        product_id,
        submission_id,
        language_code,
        config.page_request(),
    )
    .await?;

    let mut pending: HashMap<&str, &ListingImage> = HashMap::new();
    let mut assets = Vec::new();
    let mut rejected = Vec::new();
    for image in images.iter().filter(|image| image.state == FileStatus::PendingUpload) {
        let id = image.id.as_deref().unwrap_or_default();
        let mut asset = MediaAsset {
            id: id.to_string(),
            name: image.file_name.clone(),
            local_path: PathBuf::new(),
            sas_uri: image.file_sas_uri.clone(),
        };
        let checked = if id.is_empty() {
            Err(Error::Validation(format!("image {} has no id", image.file_name)))
        } else if pending.contains_key(id) {
            Err(Error::Validation(format!("image id {id} is listed twice")))
        } else {
            pending.insert(id, image);
            media_file(media_dir, &image.file_name)
        };
        match checked {
            Ok(path) => {
                asset.local_path = path;
                assets.push(asset);
            }
            Err(e) => {
                error!(image = %image.file_name, id, error = %e, "skipping image");
                rejected.push((asset, e.to_string()));
            }
        }
    }
    info!(
        product_id,
        submission_id,
        language_code,
        total = images.len(),
        pending = assets.len() + rejected.len(),
        "uploading listing media"
    );

    let mut report = upload_asset_batch(uploader, &assets, RetryPolicy::from_config(config)).await;
    report.failed.extend(rejected);

    let mut marked = Vec::with_capacity(report.uploaded.len());
    for asset in std::mem::take(&mut report.uploaded) {
        let Some(image) = pending.get(asset.id.as_str()) else {
            continue;
        };
        let mut updated = (*image).clone();
        updated.state = FileStatus::Uploaded;

        match set_listing_image(transport, product_id, submission_id, language_code, &updated).await {
            Ok(_) => marked.push(asset),
            Err(e) => {
                error!(image = %asset.name, id = %asset.id, error = %e, "uploaded but could not mark image as uploaded");
                let message = e.to_string();
                report.failed.push((asset, message));
            }
        }
    }
    report.uploaded = marked;

    Ok(report)
}

/// Resolve an image file name inside `media_dir`
///
/// Names come from the service, so only plain relative paths are accepted.
fn media_file(media_dir: &Path, file_name: &str) -> Result<PathBuf> {
    let relative = Path::new(file_name);
    let plain = relative.components().next().is_some()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if !plain {
        return Err(Error::Validation(format!(
            "image file name '{file_name}' must be a relative path inside the media directory"
        )));
    }
    Ok(media_dir.join(relative))
}
