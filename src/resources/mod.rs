//! Per-resource accessors
//!
//! Thin Get/List/New/Set/Remove wrappers over [`RestTransport`]. Versioned
//! resources carry a `revisionToken`; every `set` must echo the token from
//! the most recent read, and the service rejects stale tokens.

mod availability;
mod flight;
mod group;
mod listing;
mod listing_image;
mod package_configuration;
mod property;
mod submission;

pub use availability::{
    get_feature_availability, get_product_availability, list_feature_availabilities,
    list_product_availabilities, new_feature_availability, new_product_availability,
    remove_feature_availability, remove_product_availability, set_feature_availability,
    set_product_availability, FeatureAvailability, ProductAvailability,
};
pub use flight::{get_flight, list_flights, new_flight, remove_flight, set_flight, Flight};
pub use group::{get_group, list_groups, new_group, remove_group, set_group, Group};
pub use listing::{get_listing, list_listings, new_listing, remove_listing, set_listing, Listing};
pub use listing_image::{
    get_listing_image, list_listing_images, new_listing_image, remove_listing_image,
    set_listing_image, ListingImage,
};
pub use package_configuration::{
    get_package_configuration, list_package_configurations, new_package_configuration,
    remove_package_configuration, set_package_configuration, PackageConfiguration,
};
pub use property::{
    get_product_property, list_product_properties, new_product_property, remove_product_property,
    set_product_property, ProductProperty,
};
pub use submission::{
    commit_submission, ensure_no_pending_submission, get_pending_submission_id, get_submission,
    get_submission_status, new_submission, remove_submission, set_submission,
};

use crate::error::{Error, Result, ResultExt};
use crate::transport::{PageRequest, RestTransport};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A resource guarded by an optimistic-concurrency revision token
pub trait VersionedResource: Serialize + DeserializeOwned + Send + Sync {
    /// Resource kind, used in error messages
    const KIND: &'static str;

    /// Token from the most recent read, if this value came from the service
    fn revision_token(&self) -> Option<&str>;
}

/// Append the `submissionId` scope to a resource path
pub(crate) fn scoped(path: &str, submission_id: Option<&str>) -> String {
    match submission_id {
        Some(id) => {
            let separator = if path.contains('?') { '&' } else { '?' };
            format!("{path}{separator}submissionId={}", urlencoding::encode(id))
        }
        None => path.to_string(),
    }
}

pub(crate) fn product_path(product_id: &str) -> String {
    format!("products/{}", urlencoding::encode(product_id))
}

pub(crate) async fn get_resource<T: VersionedResource>(transport: &dyn RestTransport, path: &str) -> Result<T> {
    let value = transport
        .invoke(Method::GET, path, None)
        .await
        .context(|| format!("getting {} at {path}", T::KIND))?;
    Ok(serde_json::from_value(value)?)
}

pub(crate) async fn list_resources<T: VersionedResource>(
    transport: &dyn RestTransport,
    path: &str,
    page: PageRequest,
) -> Result<Vec<T>> {
    let values = transport
        .invoke_multiple_page(path, page)
        .await
        .context(|| format!("listing {} at {path}", T::KIND))?;
    values
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(Error::from))
        .collect()
}

pub(crate) async fn create_resource<T: VersionedResource>(
    transport: &dyn RestTransport,
    path: &str,
    resource: &T,
) -> Result<T> {
    let body = serde_json::to_value(resource)?;
    let value = transport
        .invoke(Method::POST, path, Some(&body))
        .await
        .context(|| format!("creating {} at {path}", T::KIND))?;
    Ok(serde_json::from_value(value)?)
}

/// PUT a resource, refusing values that never came from a read
pub(crate) async fn replace_resource<T: VersionedResource>(
    transport: &dyn RestTransport,
    path: &str,
    resource: &T,
) -> Result<T> {
    if resource.revision_token().is_none_or(str::is_empty) {
        return Err(Error::Validation(format!(
            "{} at {path} has no revisionToken; read it before updating",
            T::KIND
        )));
    }

    let body = serde_json::to_value(resource)?;
    let value = transport
        .invoke(Method::PUT, path, Some(&body))
        .await
        .context(|| format!("updating {} at {path}", T::KIND))?;
    Ok(serde_json::from_value(value)?)
}

pub(crate) async fn remove_resource(transport: &dyn RestTransport, kind: &str, path: &str) -> Result<()> {
    transport
        .invoke(Method::DELETE, path, None)
        .await
        .context(|| format!("removing {kind} at {path}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_appends_submission_id() {
        assert_eq!(
            scoped("products/1/listings", Some("42")),
            "products/1/listings?submissionId=42"
        );
        assert_eq!(
            scoped("products/1/listings?x=1", Some("42")),
            "products/1/listings?x=1&submissionId=42"
        );
        assert_eq!(scoped("groups", None), "groups");
    }
}
