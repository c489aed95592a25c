//! Package configuration (delivery options, mandatory updates)

use crate::error::{Error, Result};
use crate::resources::{
    create_resource, get_resource, list_resources, product_path, remove_resource, replace_resource,
    scoped, VersionedResource,
};
use crate::transport::{PageRequest, RestTransport};
use crate::types::Extensions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How packages of a submission are delivered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageConfiguration {
    /// Resource id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Whether the update is mandatory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mandatory_update: Option<bool>,
    /// When a mandatory update takes effect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory_update_effective_date: Option<DateTime<Utc>>,
    /// Gradual rollout settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_rollout: Option<serde_json::Value>,
    /// Concurrency token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_token: Option<String>,
    /// Unmodeled fields
    #[serde(flatten)]
    pub extra: Extensions,
}

impl VersionedResource for PackageConfiguration {
    const KIND: &'static str = "package configuration";

    fn revision_token(&self) -> Option<&str> {
        self.revision_token.as_deref()
    }
}

fn collection(product_id: &str) -> String {
    format!("{}/packageConfigurations", product_path(product_id))
}

/// Get one package configuration
pub async fn get_package_configuration(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    configuration_id: &str,
) -> Result<PackageConfiguration> {
    let path = format!("{}/{}", collection(product_id), urlencoding::encode(configuration_id));
    get_resource(transport, &scoped(&path, Some(submission_id))).await
}

/// List package configurations of a submission
pub async fn list_package_configurations(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    page: PageRequest,
) -> Result<Vec<PackageConfiguration>> {
    list_resources(transport, &scoped(&collection(product_id), Some(submission_id)), page).await
}

/// Replace a package configuration read earlier
pub async fn set_package_configuration(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    configuration: &PackageConfiguration,
) -> Result<PackageConfiguration> {
    let id = configuration.id.as_deref().ok_or_else(|| {
        Error::Validation("package configuration has no id; read it before updating".to_string())
    })?;
    let path = format!("{}/{}", collection(product_id), urlencoding::encode(id));
    replace_resource(transport, &scoped(&path, Some(submission_id)), configuration).await
}

/// Create a package configuration
pub async fn new_package_configuration(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    configuration: &PackageConfiguration,
) -> Result<PackageConfiguration> {
    create_resource(transport, &scoped(&collection(product_id), Some(submission_id)), configuration).await
}

/// Remove a package configuration
pub async fn remove_package_configuration(
    transport: &dyn RestTransport,
    product_id: &str,
    submission_id: &str,
    configuration_id: &str,
) -> Result<()> {
    let path = format!("{}/{}", collection(product_id), urlencoding::encode(configuration_id));
    remove_resource(transport, PackageConfiguration::KIND, &scoped(&path, Some(submission_id))).await
}
