//! Shared fixtures for the core integration tests

use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use mamori_catalog::mock::MockCatalogService;
use mamori_charms::{
    Charm, CharmService, CharmStore, CharmsStores, CompositionService, DuplicationService,
    InMemoryStore, LifecycleService,
};

/// The full core wired against in-memory stores and a mock catalog.
pub struct TestCore {
    pub store: Arc<InMemoryStore>,
    pub catalog: Arc<MockCatalogService>,
    pub charms: CharmService,
    pub composition: CompositionService,
    pub lifecycle: LifecycleService,
    pub duplication: DuplicationService,
}

impl TestCore {
    pub fn new() -> Self {
        mamori_common::init_tracing();

        let (stores, store) = CharmsStores::in_memory();
        let catalog = Arc::new(MockCatalogService::new());

        Self {
            charms: CharmService::new(stores.clone(), catalog.clone()),
            composition: CompositionService::new(stores.clone()),
            lifecycle: LifecycleService::new(stores.clone()),
            duplication: DuplicationService::new(stores),
            store,
            catalog,
        }
    }

    /// A draft charm with color and frame applied, ready to take elements.
    pub async fn draft_charm(&self, owner: Uuid) -> Charm {
        self.charms
            .create(
                owner,
                "Travel safety".to_string(),
                Some("For the road".to_string()),
                Some("color_vermilion".to_string()),
                Some("frame_classic".to_string()),
            )
            .await
            .expect("fixture charm should be created")
    }

    /// A draft charm persisted directly through the store, bypassing the
    /// creation service's default-frame behavior. Used to exercise publish
    /// guards that the creation path normally makes unreachable.
    pub async fn stored_charm(
        &self,
        owner: Uuid,
        color_id: Option<&str>,
        frame_id: Option<&str>,
    ) -> Charm {
        let charm = Charm::new(
            owner,
            "Bare charm".to_string(),
            None,
            color_id.map(String::from),
            frame_id.map(String::from),
        )
        .expect("fixture charm should validate");
        let store: Arc<dyn CharmStore> = self.store.clone();
        store
            .create(&charm)
            .await
            .expect("fixture charm should persist")
    }

    /// Add a text element and return it.
    pub async fn add_text(&self, charm_id: Uuid, content: &str) -> mamori_charms::Element {
        self.composition
            .add_element(charm_id, "text", Some(json!({"content": content})), None)
            .await
            .expect("text element should be added")
    }

    /// All elements of a charm, ordered by layer (background first).
    pub async fn list_elements(&self, charm_id: Uuid) -> Vec<mamori_charms::Element> {
        let store: Arc<dyn mamori_charms::ElementStore> = self.store.clone();
        store
            .list(charm_id)
            .await
            .expect("element list should load")
    }

    /// Layers of the charm's foreground elements, in list order.
    pub async fn foreground_layers(&self, charm_id: Uuid) -> Vec<(Uuid, i32)> {
        let store: Arc<dyn mamori_charms::ElementStore> = self.store.clone();
        store
            .list(charm_id)
            .await
            .expect("element list should load")
            .into_iter()
            .filter(|e| !e.kind.is_background())
            .map(|e| (e.id, e.layer))
            .collect()
    }
}

pub fn stamp_props() -> Value {
    json!({"asset_key": "stamp_crane"})
}

pub fn background_props() -> Value {
    json!({"kind": "gradient", "from": "#fff", "to": "#f4e8d0"})
}

/// Assert that a charm's foreground layers are exactly 1..=N in list order.
pub async fn assert_contiguous_layers(core: &TestCore, charm_id: Uuid) {
    let layers: Vec<i32> = core
        .foreground_layers(charm_id)
        .await
        .into_iter()
        .map(|(_, layer)| layer)
        .collect();
    let expected: Vec<i32> = (1..=layers.len() as i32).collect();
    assert_eq!(layers, expected, "foreground layers must be contiguous 1..=N");
}
