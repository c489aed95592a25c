//! Product and feature availability (visibility, markets, pricing)

use crate::error::{Error, Result};
use crate::resources::{
    create_resource, get_resource, list_resources, product_path, remove_resource, replace_resource,
    scoped, VersionedResource,
};
use crate::transport::{PageRequest, RestTransport};
use crate::types::Extensions;
use serde::{Deserialize, Serialize};

/// Who can see and acquire the product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAvailability {
    /// Resource id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Visibility (e.g. `Public`, `Private`, `Hidden`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    /// Restricted audience groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<serde_json::Value>,
    /// Concurrency token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_token: Option<String>,
    /// Unmodeled fields
    #[serde(flatten)]
    pub extra: Extensions,
}

impl VersionedResource for ProductAvailability {
    const KIND: &'static str = "product availability";

    fn revision_token(&self) -> Option<&str> {
        self.revision_token.as_deref()
    }
}

/// Markets, pricing and trial settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureAvailability {
    /// Resource id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Trial configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial: Option<serde_json::Value>,
    /// Pricing configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<serde_json::Value>,
    /// Concurrency token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_token: Option<String>,
    /// Unmodeled fields
    #[serde(flatten)]
    pub extra: Extensions,
}

impl VersionedResource for FeatureAvailability {
    const KIND: &'static str = "feature availability";

    fn revision_token(&self) -> Option<&str> {
        self.revision_token.as_deref()
    }
}

fn require_id<'a>(kind: &str, id: Option<&'a str>) -> Result<&'a str> {
    id.ok_or_else(|| Error::Validation(format!("{kind} has no id; read it before updating")))
}

fn product_collection(product_id: &str) -> String {
    format!("{}/productAvailabilities", product_path(product_id))
}

fn feature_collection(product_id: &str) -> String {
    format!("{}/featureAvailabilities", product_path(product_id))
}

/// Get one product availability
pub async fn get_product_availability(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    availability_id: &str,
) -> Result<ProductAvailability> {
    let path = format!("{}/{}", product_collection(product_id), urlencoding::encode(availability_id));
    get_resource(transport, &scoped(&path, Some(submission_id))).await
}

/// List product availabilities of a submission
pub async fn list_product_availabilities(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    page: PageRequest,
) -> Result<Vec<ProductAvailability>> {
    list_resources(transport, &scoped(&product_collection(product_id), Some(submission_id)), page).await
}

/// Create a product availability
pub async fn new_product_availability(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    availability: &ProductAvailability,
) -> Result<ProductAvailability> {
    let path = scoped(&product_collection(product_id), Some(submission_id));
    create_resource(transport, &path, availability).await
}

/// Replace a product availability read earlier
pub async fn set_product_availability(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    availability: &ProductAvailability,
) -> Result<ProductAvailability> {
    let id = require_id(ProductAvailability::KIND, availability.id.as_deref())?;
    let path = format!("{}/{}", product_collection(product_id), urlencoding::encode(id));
    replace_resource(transport, &scoped(&path, Some(submission_id)), availability).await
}

/// Remove a product availability
pub async fn remove_product_availability(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    availability_id: &str,
) -> Result<()> {
    let path = format!("{}/{}", product_collection(product_id), urlencoding::encode(availability_id));
    remove_resource(transport, ProductAvailability::KIND, &scoped(&path, Some(submission_id))).await
}

/// Get one feature availability
pub async fn get_feature_availability(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    availability_id: &str,
) -> Result<FeatureAvailability> {
    let path = format!("{}/{}", feature_collection(product_id), urlencoding::encode(availability_id));
    get_resource(transport, &scoped(&path, Some(submission_id))).await
}

/// List feature availabilities of a submission
pub async fn list_feature_availabilities(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    page: PageRequest,
) -> Result<Vec<FeatureAvailability>> {
    list_resources(transport, &scoped(&feature_collection(product_id), Some(submission_id)), page).await
}

/// Create a feature availability
pub async fn new_feature_availability(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    availability: &FeatureAvailability,
) -> Result<FeatureAvailability> {
    let path = scoped(&feature_collection(product_id), Some(submission_id));
    create_resource(transport, &path, availability).await
}

/// Replace a feature availability read earlier
pub async fn set_feature_availability(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    availability: &FeatureAvailability,
) -> Result<FeatureAvailability> {
    let id = require_id(FeatureAvailability::KIND, availability.id.as_deref())?;
    let path = format!("{}/{}", feature_collection(product_id), urlencoding::encode(id));
    replace_resource(transport, &scoped(&path, Some(submission_id)), availability).await
}

/// Remove a feature availability
pub async fn remove_feature_availability(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    availability_id: &str,
) -> Result<()> {
    let path = format!("{}/{}", feature_collection(product_id), urlencoding::encode(availability_id));
    remove_resource(transport, FeatureAvailability::KIND, &scoped(&path, Some(submission_id))).await
}
