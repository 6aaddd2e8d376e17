//! User profiles.
//!
//! Accounts and credentials belong to the authentication provider. This
//! module only keeps the profile document written at registration.

use common::{AddressId, UserId};
use document_store::{DocumentStore, DocumentStoreExt, Query, to_fields};
use serde::{Deserialize, Serialize};

use crate::collections;
use crate::error::{DomainError, Result};
use crate::product::GeoPoint;

/// Shown when a seller has not set a farm address.
pub const UNKNOWN_FARM_ADDRESS: &str = "Lokasi tidak tersedia";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    Petani,
    #[default]
    Konsumen,
}

/// Profile record of a registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    /// Primary delivery address.
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub farm_address: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

impl UserProfile {
    pub fn farm_location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub id: AddressId,
    pub label: String,
    pub detail: String,
}

#[derive(Serialize)]
struct FarmLocation<'a> {
    farm_address: &'a str,
    lat: f64,
    lng: f64,
}

/// Service for profile documents.
pub struct UserService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> UserService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Writes the profile created at registration.
    #[tracing::instrument(skip(self, profile), fields(uid = %profile.uid))]
    pub async fn create_profile(&self, profile: UserProfile) -> Result<UserProfile> {
        if profile.uid.is_empty() {
            return Err(DomainError::required("uid"));
        }
        if profile.name.trim().is_empty() {
            return Err(DomainError::required("name"));
        }
        if profile.email.trim().is_empty() {
            return Err(DomainError::required("email"));
        }

        self.store
            .set(collections::user(&profile.uid), &profile)
            .await?;
        tracing::info!(role = ?profile.role, "profile created");
        Ok(profile)
    }

    pub async fn get_profile(&self, uid: &UserId) -> Result<Option<UserProfile>> {
        Ok(self.store.get_as(&collections::user(uid)).await?)
    }

    /// Replaces the primary delivery address.
    #[tracing::instrument(skip(self, address))]
    pub async fn update_primary_address(&self, uid: &UserId, address: &str) -> Result<()> {
        let fields = to_fields(&serde_json::json!({ "address": address }))?;
        self.store
            .update(collections::user(uid), fields)
            .await
            .map_err(|e| DomainError::from_store("user", e))?;
        Ok(())
    }

    /// Sets where a farmer's produce ships from.
    #[tracing::instrument(skip(self, farm_address))]
    pub async fn update_farm_location(
        &self,
        uid: &UserId,
        farm_address: &str,
        location: GeoPoint,
    ) -> Result<()> {
        let fields = to_fields(&FarmLocation {
            farm_address,
            lat: location.lat,
            lng: location.lng,
        })?;
        self.store
            .update(collections::user(uid), fields)
            .await
            .map_err(|e| DomainError::from_store("user", e))?;
        Ok(())
    }

    /// The farm address shown on a seller's store page.
    pub async fn seller_farm_address(&self, farmer_id: &UserId) -> Result<String> {
        let address = self
            .get_profile(farmer_id)
            .await?
            .map(|p| p.farm_address)
            .filter(|a| !a.trim().is_empty());
        Ok(address.unwrap_or_else(|| UNKNOWN_FARM_ADDRESS.to_string()))
    }

    /// Lists a user's saved addresses.
    pub async fn addresses(&self, uid: &UserId) -> Result<Vec<Address>> {
        let docs = self
            .store
            .query(&Query::collection(collections::addresses(uid)))
            .await?;
        docs.iter()
            .map(|doc| -> Result<Address> {
                let mut address: Address = doc.deserialize()?;
                address.id = AddressId::new(doc.id());
                Ok(address)
            })
            .collect()
    }
}
