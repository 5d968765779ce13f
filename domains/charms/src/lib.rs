//! Charms domain: layered element composition, draft/published lifecycle,
//! and deep duplication of charms.

pub mod domain;
pub mod error;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Charm, CharmStatus, Element, ElementKind, BACKGROUND_LAYER};
pub use domain::layout::{plan_reorder, LayerAssignment};
pub use domain::state::{publish_violations, PublishRule};
pub use error::{CharmError, Result};

// Re-export repository types
pub use repository::memory::InMemoryStore;
pub use repository::{CharmStore, CharmsStores, ElementStore};

// Re-export services
pub use service::{
    CharmService, CompositionService, DuplicationService, ElementPatch, LifecycleService,
};
