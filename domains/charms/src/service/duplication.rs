//! Deep duplication of a charm and its element set

use uuid::Uuid;

use crate::domain::entities::{Charm, Element};
use crate::error::{CharmError, Result};
use crate::repository::CharmsStores;

#[derive(Clone)]
pub struct DuplicationService {
    stores: CharmsStores,
}

impl DuplicationService {
    pub fn new(stores: CharmsStores) -> Self {
        Self { stores }
    }

    /// Copy a charm and all its elements into a new draft owned by the
    /// requester.
    ///
    /// Ownership is re-checked here with a strict equality test. The charm
    /// copy and every element copy are written in one transaction; a failed
    /// element copy rolls the whole duplication back.
    pub async fn duplicate(&self, requesting_user_id: Uuid, source_id: Uuid) -> Result<Charm> {
        let source = self
            .stores
            .charms
            .find(source_id)
            .await?
            .ok_or(CharmError::NotFound)?;
        if source.owner_id != requesting_user_id {
            return Err(CharmError::Forbidden);
        }

        let elements = self.stores.elements.list(source_id).await?;

        let copy = source.derive_copy(requesting_user_id);
        let element_copies: Vec<Element> =
            elements.iter().map(|e| e.copy_for(copy.id)).collect();

        let created = self
            .stores
            .charms
            .create_with_elements(&copy, &element_copies)
            .await?;

        tracing::info!(
            source_id = %source_id,
            charm_id = %created.id,
            elements = element_copies.len(),
            "charm duplicated"
        );
        Ok(created)
    }
}
