//! Package flights of a product

use crate::error::{Error, Result};
use crate::resources::{
    create_resource, get_resource, list_resources, product_path, remove_resource,
    replace_resource, VersionedResource,
};
use crate::transport::{PageRequest, RestTransport};
use crate::types::Extensions;
use serde::{Deserialize, Serialize};

/// A distribution ring with its own submission lifecycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    /// Flight id (absent before creation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    pub name: String,
    /// Groups allowed into the flight
    #[serde(default)]
    pub group_ids: Vec<String>,
    /// Rank relative to other flights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_rank: Option<i64>,
    /// Concurrency token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_token: Option<String>,
    /// Unmodeled fields
    #[serde(flatten)]
    pub extra: Extensions,
}

impl VersionedResource for Flight {
    const KIND: &'static str = "flight";

    fn revision_token(&self) -> Option<&str> {
        self.revision_token.as_deref()
    }
}

fn collection(product_id: &str) -> String {
    format!("{}/flights", product_path(product_id))
}

fn item(product_id: &str, flight_id: &str) -> String {
    format!("{}/{}", collection(product_id), urlencoding::encode(flight_id))
}

/// Get one flight
pub async fn get_flight(transport: &dyn RestTransport, product_id: &str, flight_id: &str) -> Result<Flight> {
    get_resource(transport, &item(product_id, flight_id)).await
}

/// List flights of a product
pub async fn list_flights(
    transport: &dyn RestTransport,
    product_id: &str,
    page: PageRequest,
) -> Result<Vec<Flight>> {
    list_resources(transport, &collection(product_id), page).await
}

/// Create a flight
pub async fn new_flight(transport: &dyn RestTransport, product_id: &str, flight: &Flight) -> Result<Flight> {
    create_resource(transport, &collection(product_id), flight).await
}

/// Replace a flight read earlier
pub async fn set_flight(transport: &dyn RestTransport, product_id: &str, flight: &Flight) -> Result<Flight> {
    let id = flight
        .id
        .as_deref()
        .ok_or_else(|| Error::Validation(format!("flight '{}' has no id; read it before updating", flight.name)))?;
    replace_resource(transport, &item(product_id, id), flight).await
}

/// Delete a flight
pub async fn remove_flight(transport: &dyn RestTransport, product_id: &str, flight_id: &str) -> Result<()> {
    remove_resource(transport, Flight::KIND, &item(product_id, flight_id)).await
}
