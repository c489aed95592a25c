//! Local merge of caller data into a cloned submission
//!
//! Pure: the clone passed in is never modified, a patched copy is returned.

use crate::error::{Error, Result};
use crate::submit::{PackageMode, UpdateOptions};
use crate::types::{FileStatus, ProductKind, PublishMode, Submission, SubmissionData};
use serde_json::Value;
use tracing::{debug, warn};

const PRICING_AND_AVAILABILITY_FIELDS: &[&str] = &[
    "pricing",
    "allowTargetFutureDeviceFamilies",
    "allowMicrosoftDecideAppAvailabilityToFutureDeviceFamilies",
    "enterpriseLicensing",
];

const APP_PROPERTY_FIELDS: &[&str] = &[
    "applicationCategory",
    "hardwarePreferences",
    "hasExternalInAppProducts",
    "meetAccessibilityGuidelines",
    "canInstallOnRemovableMedia",
    "automaticBackupEnabled",
    "isGameDvrEnabled",
];

const IAP_PROPERTY_FIELDS: &[&str] = &["contentType", "keywords", "lifetime", "tag"];

/// Apply the selected sections of `data` to a copy of `clone`
pub fn patch_submission(
    clone: &Submission,
    data: &SubmissionData,
    options: &UpdateOptions,
    kind: ProductKind,
) -> Result<Submission> {
    options.validate_for(kind)?;

    if !options.has_modifications() {
        warn!(
            submission_id = %clone.id,
            "no modification options were given; the new submission will duplicate the published one"
        );
    }

    let mut patched = clone.clone();

    patch_packages(&mut patched, data, options.packages, kind)?;
    patch_publish_mode(&mut patched, data, options, kind)?;

    if options.update_listings {
        patch_listings(&mut patched, data)?;
    }
    if options.update_pricing_and_availability {
        copy_fields(&mut patched, data, PRICING_AND_AVAILABILITY_FIELDS);
    }
    if options.update_app_properties {
        copy_fields(&mut patched, data, APP_PROPERTY_FIELDS);
    }
    if options.update_properties {
        copy_fields(&mut patched, data, IAP_PROPERTY_FIELDS);
    }
    if options.update_gaming_options {
        copy_fields(&mut patched, data, &["gamingOptions"]);
    }
    if options.update_trailers {
        copy_fields(&mut patched, data, &["trailers"]);
    }
    if options.update_notes_for_certification {
        patched
            .notes_for_certification
            .clone_from(&data.notes_for_certification);
    }

    Ok(patched)
}

fn patch_packages(
    patched: &mut Submission,
    data: &SubmissionData,
    mode: PackageMode,
    kind: ProductKind,
) -> Result<()> {
    if mode == PackageMode::Keep {
        return Ok(());
    }

    let incoming = data.packages(kind);
    let Some(packages) = patched.packages_mut(kind) else {
        return Err(Error::Validation(format!("{kind} submissions carry no packages")));
    };

    if mode == PackageMode::Replace {
        for package in packages.iter_mut() {
            package.file_status = FileStatus::PendingDelete;
        }
    }
    packages.extend(incoming.iter().cloned());

    debug!(added = incoming.len(), total = packages.len(), ?mode, "patched packages");
    Ok(())
}

fn patch_publish_mode(
    patched: &mut Submission,
    data: &SubmissionData,
    options: &UpdateOptions,
    kind: ProductKind,
) -> Result<()> {
    let from_data = options.update_publish_mode_and_visibility;
    let mut settings = options.publish_settings(data)?;
    if settings.is_empty() && !from_data {
        return Ok(());
    }

    let effective = settings
        .mode
        .or(patched.target_publish_mode)
        .unwrap_or_default();
    // A clone already scheduled for a date keeps it unless a new one is given
    if settings.mode.is_none() && effective == PublishMode::SpecificDate {
        settings.date = settings.date.or(patched.target_publish_date);
    }
    settings.check_against(effective)?;

    if let Some(mode) = settings.mode {
        patched.target_publish_mode = Some(mode);
    }
    patched.target_publish_date = if effective == PublishMode::SpecificDate {
        settings.date
    } else {
        None
    };

    if from_data && kind != ProductKind::Flight {
        copy_fields(patched, data, &["visibility"]);
    }
    Ok(())
}

/// Replace listings, keeping old images of shared languages flagged for deletion
fn patch_listings(patched: &mut Submission, data: &SubmissionData) -> Result<()> {
    let Some(incoming) = &data.listings else {
        return Err(Error::Validation(
            "listings update requested but the submission data has no listings".to_string(),
        ));
    };

    let existing = patched.extra.get("listings").and_then(Value::as_object);
    let mut listings = serde_json::Map::new();

    for (language, listing) in incoming {
        let mut listing = listing.clone();
        let old_images = existing
            .and_then(|map| map.get(language))
            .and_then(|old| old.pointer("/baseListing/images"))
            .and_then(Value::as_array);

        if let Some(old_images) = old_images.filter(|images| !images.is_empty()) {
            let images = listing_images_mut(&mut listing, language)?;
            for image in old_images {
                let mut image = image.clone();
                if let Some(fields) = image.as_object_mut() {
                    fields.insert("fileStatus".to_string(), Value::String("PendingDelete".to_string()));
                }
                images.push(image);
            }
        }
        listings.insert(language.clone(), listing);
    }

    patched.extra.insert("listings".to_string(), Value::Object(listings));
    Ok(())
}

/// The `baseListing.images` array of a listing, created when missing
fn listing_images_mut<'a>(listing: &'a mut Value, language: &str) -> Result<&'a mut Vec<Value>> {
    let malformed = || Error::Validation(format!("listing {language} is not an object with a baseListing object"));

    let base = listing
        .as_object_mut()
        .ok_or_else(malformed)?
        .entry("baseListing")
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    base.as_object_mut()
        .ok_or_else(malformed)?
        .entry("images")
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or_else(|| Error::Validation(format!("listing {language} has images that are not an array")))
}

fn copy_fields(patched: &mut Submission, data: &SubmissionData, fields: &[&str]) {
    for field in fields {
        match data.extra.get(*field) {
            Some(value) => {
                patched.extra.insert((*field).to_string(), value.clone());
            }
            None => debug!(field, "not present in submission data, left unchanged"),
        }
    }
}
