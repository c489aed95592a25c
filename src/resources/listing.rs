//! Store listings (per-language text of a product)

use crate::error::Result;
use crate::resources::{
    create_resource, get_resource, list_resources, product_path, remove_resource,
    replace_resource, scoped, VersionedResource,
};
use crate::transport::{PageRequest, RestTransport};
use crate::types::Extensions;
use serde::{Deserialize, Serialize};

/// Listing text for one language
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Language code (e.g. `en-us`)
    pub language_code: String,
    /// Display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Short title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_title: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    /// Release notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,
    /// Search keywords
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Feature bullet points
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    /// Concurrency token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_token: Option<String>,
    /// Unmodeled fields
    #[serde(flatten)]
    pub extra: Extensions,
}

impl VersionedResource for Listing {
    const KIND: &'static str = "listing";

    fn revision_token(&self) -> Option<&str> {
        self.revision_token.as_deref()
    }
}

fn collection(product_id: &str) -> String {
    format!("{}/listings", product_path(product_id))
}

fn item(product_id: &str, language_code: &str) -> String {
    format!("{}/{}", collection(product_id), urlencoding::encode(language_code))
}

/// Get the listing for one language
pub async fn get_listing(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    language_code: &str,
) -> Result<Listing> {
    get_resource(transport, &scoped(&item(product_id, language_code), Some(submission_id))).await
}

/// List all listings of a submission
pub async fn list_listings(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    page: PageRequest,
) -> Result<Vec<Listing>> {
    list_resources(transport, &scoped(&collection(product_id), Some(submission_id)), page).await
}

/// Add a listing language
pub async fn new_listing(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    listing: &Listing,
) -> Result<Listing> {
    create_resource(transport, &scoped(&collection(product_id), Some(submission_id)), listing).await
}

/// Replace a listing; `listing` must come from a prior read
pub async fn set_listing(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    listing: &Listing,
) -> Result<Listing> {
    let path = scoped(&item(product_id, &listing.language_code), Some(submission_id));
    replace_resource(transport, &path, listing).await
}

/// Remove a listing language
pub async fn remove_listing(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    language_code: &str,
) -> Result<()> {
    let path = scoped(&item(product_id, language_code), Some(submission_id));
    remove_resource(transport, Listing::KIND, &path).await
}
