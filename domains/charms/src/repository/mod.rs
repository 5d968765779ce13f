//! Store ports and implementations for the Charms domain
//!
//! Services depend on the [`CharmStore`] and [`ElementStore`] traits so the
//! same logic runs against Postgres in production and the in-memory store in
//! tests. Composite operations (reorder rewrite, delete with layer
//! compaction, draft demotion with dependent hiding, duplication, archival)
//! are single methods here so each implementation can make them atomic.

pub mod charms;
pub mod elements;
pub mod memory;
pub mod transactions;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Charm, Element};
use crate::domain::layout::LayerAssignment;
use mamori_common::RepositoryError;

pub use charms::PgCharmStore;
pub use elements::PgElementStore;
pub use memory::InMemoryStore;

type StoreResult<T> = std::result::Result<T, RepositoryError>;

/// Persistence port for charm records and their composite lifecycle writes.
#[async_trait]
pub trait CharmStore: Send + Sync {
    /// Find a charm by ID. Archived charms do not resolve.
    async fn find(&self, id: Uuid) -> StoreResult<Option<Charm>>;

    /// Persist a new charm.
    async fn create(&self, charm: &Charm) -> StoreResult<Charm>;

    /// Flip a charm to published with the given timestamp.
    async fn publish(&self, id: Uuid, published_at: DateTime<Utc>) -> StoreResult<Charm>;

    /// Flip a charm back to draft, clearing its publish timestamp and hiding
    /// dependent public content, as one atomic unit.
    async fn save_draft(&self, id: Uuid) -> StoreResult<Charm>;

    /// Persist a charm together with its full element set, all-or-nothing.
    /// Used by duplication; a failed element write rolls back the charm too.
    async fn create_with_elements(&self, charm: &Charm, elements: &[Element])
        -> StoreResult<Charm>;

    /// Soft-delete a charm: mark it archived, hide dependent public content,
    /// and remove its elements, in that order, as one atomic unit.
    async fn archive(&self, id: Uuid) -> StoreResult<()>;
}

/// Persistence port for the element collection of a charm.
#[async_trait]
pub trait ElementStore: Send + Sync {
    /// Find an element by its own ID, regardless of owning charm.
    async fn find_by_id(&self, element_id: Uuid) -> StoreResult<Option<Element>>;

    /// List a charm's elements ordered by layer ascending (background first).
    async fn list(&self, charm_id: Uuid) -> StoreResult<Vec<Element>>;

    /// The charm's background element, if any.
    async fn find_background(&self, charm_id: Uuid) -> StoreResult<Option<Element>>;

    /// Next free foreground layer: MAX(layer) + 1 over non-background
    /// elements, 1 when none exist.
    async fn next_layer(&self, charm_id: Uuid) -> StoreResult<i32>;

    /// Count of non-background elements.
    async fn count_foreground(&self, charm_id: Uuid) -> StoreResult<i64>;

    /// Insert an element. A layer collision surfaces as `AlreadyExists`
    /// (unique constraint on charm + layer is the storage backstop).
    async fn insert(&self, element: &Element) -> StoreResult<Element>;

    /// Patch props and/or transform; `None` leaves the field untouched.
    async fn update_content(
        &self,
        element_id: Uuid,
        props: Option<serde_json::Value>,
        transform: Option<serde_json::Value>,
    ) -> StoreResult<Element>;

    /// Delete an element and close the layer gap it leaves behind, as one
    /// atomic unit. Returns false when no such element exists on the charm.
    async fn delete(&self, charm_id: Uuid, element_id: Uuid) -> StoreResult<bool>;

    /// Apply a full foreground relayering, all-or-nothing.
    async fn rewrite_layers(
        &self,
        charm_id: Uuid,
        assignments: &[LayerAssignment],
    ) -> StoreResult<()>;
}

/// Combined store access for the Charms domain
#[derive(Clone)]
pub struct CharmsStores {
    pub charms: Arc<dyn CharmStore>,
    pub elements: Arc<dyn ElementStore>,
}

impl CharmsStores {
    /// Postgres-backed stores sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            charms: Arc::new(PgCharmStore::new(pool.clone())),
            elements: Arc::new(PgElementStore::new(pool)),
        }
    }

    /// In-memory stores sharing one state, for tests and local development.
    /// The concrete store handle is returned alongside for test assertions.
    pub fn in_memory() -> (Self, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let stores = Self {
            charms: store.clone(),
            elements: store.clone(),
        };
        (stores, store)
    }
}
