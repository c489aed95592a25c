//! Upload-media command - push listing images of a pending submission

use crate::cli::style::{check, cross, spinner, Stylize};
use anstream::{eprintln, println};
use std::path::Path;
use store_submit::config::Config;
use store_submit::error::{Error, Result};
use store_submit::transport::create_transport;
use store_submit::upload::{upload_listing_media, BlobUploader};

/// Run the upload-media command
pub async fn run_upload_media(
    config: &Config,
    app_id: &str,
    submission_id: &str,
    language_code: &str,
    media_dir: &Path,
) -> Result<()> {
    if !media_dir.is_dir() {
        return Err(Error::Validation(format!(
            "{} is not a directory",
            media_dir.display()
        )));
    }

    let transport = create_transport(config)?;
    let uploader = BlobUploader::new(config)?;

    let bar = spinner(format!("Uploading {language_code} listing images..."));
    let result = upload_listing_media(
        transport.as_ref(),
        &uploader,
        config,
        app_id,
        submission_id,
        language_code,
        media_dir,
    )
    .await;
    bar.finish_and_clear();
    let report = result?;

    for asset in &report.uploaded {
        println!("  {} {} {}", check(), asset.name.accent(), asset.id.muted());
    }
    for asset in &report.skipped {
        println!("  {} {} {}", "-".muted(), asset.name, "(no upload URL)".muted());
    }
    for (asset, message) in &report.failed {
        eprintln!("  {} {}: {}", cross(), asset.name.accent().for_stderr(), message.error());
    }

    println!(
        "Uploaded {}, skipped {}, failed {}",
        report.uploaded.len(),
        report.skipped.len(),
        report.failed.len()
    );

    if !report.is_complete() {
        eprintln!(
            "{}",
            "Some images were not uploaded; rerun upload-media to retry them".warn()
        );
    }
    Ok(())
}
