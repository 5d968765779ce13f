//! Domain services for the Charms domain
//!
//! Each service is the transaction-scoped entry point for one slice of the
//! core: element composition, lifecycle transitions, duplication, and charm
//! creation/archival. Callers (the API layer) are expected to have
//! authenticated and authorized the user before invoking anything here;
//! duplication re-checks ownership itself.

pub mod charms;
pub mod composition;
pub mod duplication;
pub mod lifecycle;

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::Charm;
use crate::error::{CharmError, Result};
use crate::repository::CharmStore;

pub use charms::CharmService;
pub use composition::{CompositionService, ElementPatch};
pub use duplication::DuplicationService;
pub use lifecycle::LifecycleService;

/// Resolve a charm or fail with `NotFound`.
pub(crate) async fn require_charm(store: &Arc<dyn CharmStore>, charm_id: Uuid) -> Result<Charm> {
    store
        .find(charm_id)
        .await?
        .ok_or(CharmError::NotFound)
}
