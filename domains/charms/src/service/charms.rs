//! Charm creation, lookup, and archival

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::Charm;
use crate::error::Result;
use crate::repository::CharmsStores;
use crate::service::require_charm;
use mamori_catalog::CatalogService;

pub struct CharmService {
    stores: CharmsStores,
    catalog: Arc<dyn CatalogService>,
}

impl CharmService {
    pub fn new(stores: CharmsStores, catalog: Arc<dyn CatalogService>) -> Self {
        Self { stores, catalog }
    }

    /// Create a new draft charm.
    ///
    /// When no frame is supplied, the catalog's default frame is applied so
    /// every charm starts with a frame reference in place.
    pub async fn create(
        &self,
        owner_id: Uuid,
        title: String,
        description: Option<String>,
        color_id: Option<String>,
        frame_id: Option<String>,
    ) -> Result<Charm> {
        let frame_id = match frame_id {
            Some(frame) => frame,
            None => self.catalog.default_frame().await?.key,
        };

        let charm = Charm::new(owner_id, title, description, color_id, Some(frame_id))?;
        let created = self.stores.charms.create(&charm).await?;

        tracing::info!(charm_id = %created.id, owner_id = %owner_id, "charm created");
        Ok(created)
    }

    /// Fetch a charm by ID.
    pub async fn get(&self, charm_id: Uuid) -> Result<Charm> {
        require_charm(&self.stores.charms, charm_id).await
    }

    /// Soft-delete a charm: hide its dependent public content and remove its
    /// elements along with the record's visibility, in one transaction.
    pub async fn archive(&self, charm_id: Uuid) -> Result<()> {
        self.stores.charms.archive(charm_id).await?;
        tracing::info!(charm_id = %charm_id, "charm archived");
        Ok(())
    }
}
