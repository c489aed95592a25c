//! Flight groups (lists of tester accounts)

use crate::error::{Error, Result};
use crate::resources::{
    create_resource, get_resource, list_resources, remove_resource, replace_resource,
    VersionedResource,
};
use crate::transport::{PageRequest, RestTransport};
use crate::types::Extensions;
use serde::{Deserialize, Serialize};

/// A named group of tester accounts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Group id (absent before creation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    pub name: String,
    /// Member account emails
    #[serde(default)]
    pub members: Vec<String>,
    /// Concurrency token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_token: Option<String>,
    /// Unmodeled fields
    #[serde(flatten)]
    pub extra: Extensions,
}

impl VersionedResource for Group {
    const KIND: &'static str = "group";

    fn revision_token(&self) -> Option<&str> {
        self.revision_token.as_deref()
    }
}

fn item(group_id: &str) -> String {
    format!("groups/{}", urlencoding::encode(group_id))
}

/// Get one group
pub async fn get_group(transport: &dyn RestTransport, group_id: &str) -> Result<Group> {
    get_resource(transport, &item(group_id)).await
}

/// List all groups of the account
pub async fn list_groups(transport: &dyn RestTransport, page: PageRequest) -> Result<Vec<Group>> {
    list_resources(transport, "groups", page).await
}

/// Create a group
pub async fn new_group(transport: &dyn RestTransport, group: &Group) -> Result<Group> {
    create_resource(transport, "groups", group).await
}

/// Replace a group read earlier
pub async fn set_group(transport: &dyn RestTransport, group: &Group) -> Result<Group> {
    let id = group
        .id
        .as_deref()
        .ok_or_else(|| Error::Validation(format!("group '{}' has no id; read it before updating", group.name)))?;
    replace_resource(transport, &item(id), group).await
}

/// Delete a group
pub async fn remove_group(transport: &dyn RestTransport, group_id: &str) -> Result<()> {
    remove_resource(transport, Group::KIND, &item(group_id)).await
}
