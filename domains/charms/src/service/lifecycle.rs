//! Charm lifecycle: publish and save-draft transitions

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::Charm;
use crate::domain::state::publish_violations;
use crate::error::{CharmError, Result};
use crate::repository::CharmsStores;
use crate::service::require_charm;

#[derive(Clone)]
pub struct LifecycleService {
    stores: CharmsStores,
}

impl LifecycleService {
    pub fn new(stores: CharmsStores) -> Self {
        Self { stores }
    }

    /// Publish a draft charm.
    ///
    /// All readiness rules are evaluated together; a failure reports every
    /// violated rule in one response and changes nothing. Publishing an
    /// already-published charm is a no-op that returns the current state
    /// without re-running validation or touching `published_at`. Each
    /// draft→published transition stamps a fresh `published_at`.
    pub async fn publish(&self, charm_id: Uuid) -> Result<Charm> {
        let charm = require_charm(&self.stores.charms, charm_id).await?;
        if charm.is_published() {
            tracing::debug!(charm_id = %charm_id, "publish no-op: already published");
            return Ok(charm);
        }

        let foreground_count = self.stores.elements.count_foreground(charm_id).await?;
        let violations = publish_violations(&charm, foreground_count);
        if !violations.is_empty() {
            return Err(CharmError::PublishValidation(violations));
        }

        let published = self.stores.charms.publish(charm_id, Utc::now()).await?;
        tracing::info!(charm_id = %charm_id, "charm published");
        Ok(published)
    }

    /// Return a charm to draft.
    ///
    /// Always allowed. On a published charm this clears `published_at` and
    /// hides dependent public content in the same transaction; on a draft it
    /// is a no-op, and the hide call is not made again.
    pub async fn save_draft(&self, charm_id: Uuid) -> Result<Charm> {
        let charm = require_charm(&self.stores.charms, charm_id).await?;
        if !charm.is_published() {
            tracing::debug!(charm_id = %charm_id, "save-draft no-op: already a draft");
            return Ok(charm);
        }

        let demoted = self.stores.charms.save_draft(charm_id).await?;
        tracing::info!(charm_id = %charm_id, "charm returned to draft");
        Ok(demoted)
    }
}
