//! Update options: which parts of a submission to touch

use crate::error::{Error, Result};
use crate::types::{ProductKind, PublishMode, SubmissionData};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// How the caller's packages are merged into the clone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageMode {
    /// Leave packages untouched
    #[default]
    Keep,
    /// Append the caller's packages
    Add,
    /// Flag existing packages for deletion, then append the caller's packages
    Replace,
}

impl PackageMode {
    /// Build from the two CLI switches, which are mutually exclusive
    pub fn from_flags(add: bool, replace: bool) -> Result<Self> {
        match (add, replace) {
            (true, true) => Err(Error::Validation(
                "AddPackages and ReplacePackages cannot be used together".to_string(),
            )),
            (true, false) => Ok(Self::Add),
            (false, true) => Ok(Self::Replace),
            (false, false) => Ok(Self::Keep),
        }
    }
}

/// Publish mode and date after overrides are applied to the submission data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishSettings {
    /// Mode to write, `None` keeps the clone's mode
    pub mode: Option<PublishMode>,
    /// Date to write
    pub date: Option<DateTime<Utc>>,
}

impl PublishSettings {
    /// Whether the publish section of the clone is touched at all
    pub const fn is_empty(&self) -> bool {
        self.mode.is_none() && self.date.is_none()
    }

    /// Check a date against the mode it will be published with
    pub fn check_against(&self, mode: PublishMode) -> Result<()> {
        match (mode, self.date) {
            (PublishMode::SpecificDate, None) => Err(Error::Validation(
                "publish mode SpecificDate requires a target publish date".to_string(),
            )),
            (other, Some(date)) if other != PublishMode::SpecificDate => Err(Error::Validation(format!(
                "target publish date {date} given but publish mode is {other}; use SpecificDate"
            ))),
            _ => Ok(()),
        }
    }
}

/// Options for `update_submission`
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Package merge mode
    pub packages: PackageMode,
    /// Replace listings (app, in-app product)
    pub update_listings: bool,
    /// Copy publish mode, date and visibility from the submission data
    pub update_publish_mode_and_visibility: bool,
    /// Copy pricing and availability fields (app, in-app product)
    pub update_pricing_and_availability: bool,
    /// Copy app properties (app)
    pub update_app_properties: bool,
    /// Copy in-app product properties (in-app product)
    pub update_properties: bool,
    /// Copy gaming options (app)
    pub update_gaming_options: bool,
    /// Copy trailers (app)
    pub update_trailers: bool,
    /// Copy notes for certification (app)
    pub update_notes_for_certification: bool,
    /// Publish mode override; beats the value in the submission data
    pub target_publish_mode: Option<PublishMode>,
    /// Publish date override; beats the value in the submission data
    pub target_publish_date: Option<DateTime<Utc>>,
    /// Package archive to upload after the replace
    pub package_path: Option<PathBuf>,
    /// Resume this pending submission instead of cloning
    pub submission_id: Option<String>,
    /// Commit once the submission is replaced and uploaded
    pub auto_commit: bool,
    /// Delete an existing pending submission before cloning
    pub force: bool,
}

impl UpdateOptions {
    /// Whether anything would be changed in the clone
    pub fn has_modifications(&self) -> bool {
        self.packages != PackageMode::Keep
            || self.update_listings
            || self.update_publish_mode_and_visibility
            || self.update_pricing_and_availability
            || self.update_app_properties
            || self.update_properties
            || self.update_gaming_options
            || self.update_trailers
            || self.update_notes_for_certification
            || self.target_publish_mode.is_some()
            || self.target_publish_date.is_some()
    }

    /// Everything that can be checked before the first network call
    pub fn validate(&self, kind: ProductKind, data: &SubmissionData) -> Result<()> {
        self.validate_for(kind)?;
        self.publish_settings(data)?;
        if self.update_listings && data.listings.is_none() {
            return Err(Error::Validation(
                "listings update requested but the submission data has no listings".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve publish mode and date; explicit overrides beat the submission data
    ///
    /// An explicit mode other than SpecificDate discards the data's date. A
    /// date without any mode is checked later against the clone's mode.
    pub fn publish_settings(&self, data: &SubmissionData) -> Result<PublishSettings> {
        let from_data = self.update_publish_mode_and_visibility;
        let data_mode = data.target_publish_mode.filter(|_| from_data);
        let data_date = data.target_publish_date.filter(|_| from_data);

        let settings = match self.target_publish_mode {
            Some(PublishMode::SpecificDate) => PublishSettings {
                mode: Some(PublishMode::SpecificDate),
                date: self.target_publish_date.or(data_date),
            },
            Some(mode) => PublishSettings {
                mode: Some(mode),
                date: self.target_publish_date,
            },
            None if self.target_publish_date.is_some() => PublishSettings {
                mode: data_mode,
                date: self.target_publish_date,
            },
            None => PublishSettings {
                mode: data_mode,
                date: data_date,
            },
        };

        if let Some(mode) = settings.mode {
            settings.check_against(mode)?;
        }
        Ok(settings)
    }

    /// Reject sections the product kind does not have
    pub fn validate_for(&self, kind: ProductKind) -> Result<()> {
        let unsupported = |section: &str| {
            Err(Error::Validation(format!(
                "{section} cannot be updated on a submission of this {kind}"
            )))
        };

        if kind == ProductKind::InAppProduct && self.packages != PackageMode::Keep {
            return unsupported("packages");
        }
        if kind == ProductKind::Flight {
            if self.update_listings {
                return unsupported("listings");
            }
            if self.update_pricing_and_availability {
                return unsupported("pricing and availability");
            }
        }
        if kind != ProductKind::App {
            if self.update_app_properties {
                return unsupported("app properties");
            }
            if self.update_gaming_options {
                return unsupported("gaming options");
            }
            if self.update_trailers {
                return unsupported("trailers");
            }
            if self.update_notes_for_certification {
                return unsupported("notes for certification");
            }
        }
        if kind != ProductKind::InAppProduct && self.update_properties {
            return unsupported("in-app product properties");
        }
        Ok(())
    }
}
