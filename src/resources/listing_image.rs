//! Listing images (screenshots, logos, trailers' thumbnails)

use crate::error::{Error, Result};
use crate::resources::{
    create_resource, get_resource, list_resources, product_path, remove_resource,
    replace_resource, scoped, VersionedResource,
};
use crate::transport::{PageRequest, RestTransport};
use crate::types::{Extensions, FileStatus};
use serde::{Deserialize, Serialize};

/// An image attached to a language listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingImage {
    /// Image id (absent before creation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Image type (e.g. `Screenshot`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    /// Local file name of the image
    pub file_name: String,
    /// Upload target, present while the binary is expected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_sas_uri: Option<String>,
    /// Upload state
    #[serde(default)]
    pub state: FileStatus,
    /// Caption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Concurrency token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_token: Option<String>,
    /// Unmodeled fields
    #[serde(flatten)]
    pub extra: Extensions,
}

impl VersionedResource for ListingImage {
    const KIND: &'static str = "listing image";

    fn revision_token(&self) -> Option<&str> {
        self.revision_token.as_deref()
    }
}

fn collection(product_id: &str, language_code: &str) -> String {
    format!(
        "{}/listings/{}/images",
        product_path(product_id),
        urlencoding::encode(language_code)
    )
}

fn item(product_id: &str, language_code: &str, image_id: &str) -> String {
    format!(
        "{}/{}",
        collection(product_id, language_code),
        urlencoding::encode(image_id)
    )
}

/// Get one listing image
pub async fn get_listing_image(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    language_code: &str,
    image_id: &str,
) -> Result<ListingImage> {
    let path = scoped(&item(product_id, language_code, image_id), Some(submission_id));
    get_resource(transport, &path).await
}

/// List the images of one language listing
pub async fn list_listing_images(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    language_code: &str,
    page: PageRequest,
) -> Result<Vec<ListingImage>> {
    let path = scoped(&collection(product_id, language_code), Some(submission_id));
    list_resources(transport, &path, page).await
}

/// Create an image entry; the response carries the upload SAS URI
pub async fn new_listing_image(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    language_code: &str,
    image: &ListingImage,
) -> Result<ListingImage> {
    let path = scoped(&collection(product_id, language_code), Some(submission_id));
    create_resource(transport, &path, image).await
}

/// Replace an image entry; `image` must come from a prior read
pub async fn set_listing_image(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    language_code: &str,
    image: &ListingImage,
) -> Result<ListingImage> {
    let Some(image_id) = image.id.as_deref() else {
        return Err(Error::Validation(format!(
            "listing image {} has no id; read it before updating",
            image.file_name
        )));
    };
    let path = scoped(&item(product_id, language_code, image_id), Some(submission_id));
    replace_resource(transport, &path, image).await
}

/// Remove an image entry
pub async fn remove_listing_image(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    language_code: &str,
    image_id: &str,
) -> Result<()> {
    let path = scoped(&item(product_id, language_code, image_id), Some(submission_id));
    remove_resource(transport, ListingImage::KIND, &path).await
}
