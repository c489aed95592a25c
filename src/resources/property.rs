//! Product properties (category, support info, hardware requirements)

use crate::error::{Error, Result};
use crate::resources::{
    create_resource, get_resource, list_resources, product_path, remove_resource, replace_resource,
    scoped, VersionedResource,
};
use crate::transport::{PageRequest, RestTransport};
use crate::types::Extensions;
use serde::{Deserialize, Serialize};

/// Product-level properties of a submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductProperty {
    /// Resource id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Store category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Store subcategories
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<String>,
    /// Privacy policy link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_policy_url: Option<String>,
    /// Support contact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_contact_info: Option<String>,
    /// Concurrency token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_token: Option<String>,
    /// Unmodeled fields
    #[serde(flatten)]
    pub extra: Extensions,
}

impl VersionedResource for ProductProperty {
    const KIND: &'static str = "product property";

    fn revision_token(&self) -> Option<&str> {
        self.revision_token.as_deref()
    }
}

fn collection(product_id: &str) -> String {
    format!("{}/properties", product_path(product_id))
}

/// Get one product property
pub async fn get_product_property(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    property_id: &str,
) -> Result<ProductProperty> {
    let path = format!("{}/{}", collection(product_id), urlencoding::encode(property_id));
    get_resource(transport, &scoped(&path, Some(submission_id))).await
}

/// List product properties of a submission
pub async fn list_product_properties(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    page: PageRequest,
) -> Result<Vec<ProductProperty>> {
    list_resources(transport, &scoped(&collection(product_id), Some(submission_id)), page).await
}

/// Replace a product property read earlier
pub async fn set_product_property(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    property: &ProductProperty,
) -> Result<ProductProperty> {
    let id = property
        .id
        .as_deref()
        .ok_or_else(|| Error::Validation("product property has no id; read it before updating".to_string()))?;
    let path = format!("{}/{}", collection(product_id), urlencoding::encode(id));
    replace_resource(transport, &scoped(&path, Some(submission_id)), property).await
}

/// Create a product property
pub async fn new_product_property(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    property: &ProductProperty,
) -> Result<ProductProperty> {
    create_resource(transport, &scoped(&collection(product_id), Some(submission_id)), property).await
}

/// Remove a product property
pub async fn remove_product_property(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    property_id: &str,
) -> Result<()> {
    let path = format!("{}/{}", collection(product_id), urlencoding::encode(property_id));
    remove_resource(transport, ProductProperty::KIND, &scoped(&path, Some(submission_id))).await
}
