//! In-memory store implementation
//!
//! Backs the service-level tests and local development. One mutex around the
//! whole state gives every composite operation the same all-or-nothing
//! visibility the Postgres stores get from transactions; mutations are
//! validated against the final state before they are applied.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{Charm, CharmStatus, Element};
use crate::domain::layout::LayerAssignment;
use crate::repository::{CharmStore, ElementStore};
use mamori_common::RepositoryError;

#[derive(Debug, Default)]
struct State {
    charms: HashMap<Uuid, Charm>,
    elements: HashMap<Uuid, Element>,
    /// Charm IDs whose dependent content was hidden, one entry per hide call.
    hidden_dependents: Vec<Uuid>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times dependent content was hidden for this charm.
    pub fn hidden_dependent_count(&self, charm_id: Uuid) -> usize {
        self.lock()
            .hidden_dependents
            .iter()
            .filter(|id| **id == charm_id)
            .count()
    }

    /// Total number of charm records, archived included.
    pub fn charm_count(&self) -> usize {
        self.lock().charms.len()
    }

    /// Total number of element records across all charms.
    pub fn element_count(&self) -> usize {
        self.lock().elements.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .expect("store lock poisoned — prior test panicked")
    }
}

fn layer_taken(state: &State, charm_id: Uuid, layer: i32, except: Uuid) -> bool {
    state
        .elements
        .values()
        .any(|e| e.charm_id == charm_id && e.layer == layer && e.id != except)
}

#[async_trait]
impl CharmStore for InMemoryStore {
    async fn find(&self, id: Uuid) -> Result<Option<Charm>, RepositoryError> {
        let state = self.lock();
        Ok(state
            .charms
            .get(&id)
            .filter(|c| c.archived_at.is_none())
            .cloned())
    }

    async fn create(&self, charm: &Charm) -> Result<Charm, RepositoryError> {
        let mut state = self.lock();
        if state.charms.contains_key(&charm.id) {
            return Err(RepositoryError::AlreadyExists);
        }
        state.charms.insert(charm.id, charm.clone());
        Ok(charm.clone())
    }

    async fn publish(
        &self,
        id: Uuid,
        published_at: DateTime<Utc>,
    ) -> Result<Charm, RepositoryError> {
        let mut state = self.lock();
        let charm = state
            .charms
            .get_mut(&id)
            .filter(|c| c.archived_at.is_none())
            .ok_or(RepositoryError::NotFound)?;
        charm.status = CharmStatus::Published;
        charm.published_at = Some(published_at);
        charm.updated_at = Utc::now();
        Ok(charm.clone())
    }

    async fn save_draft(&self, id: Uuid) -> Result<Charm, RepositoryError> {
        let mut state = self.lock();
        let charm = state
            .charms
            .get_mut(&id)
            .filter(|c| c.archived_at.is_none())
            .ok_or(RepositoryError::NotFound)?;
        charm.status = CharmStatus::Draft;
        charm.published_at = None;
        charm.updated_at = Utc::now();
        let demoted = charm.clone();
        state.hidden_dependents.push(id);
        Ok(demoted)
    }

    async fn create_with_elements(
        &self,
        charm: &Charm,
        elements: &[Element],
    ) -> Result<Charm, RepositoryError> {
        let mut state = self.lock();
        if state.charms.contains_key(&charm.id) {
            return Err(RepositoryError::AlreadyExists);
        }
        for element in elements {
            if state.elements.contains_key(&element.id)
                || layer_taken(&state, element.charm_id, element.layer, element.id)
            {
                // Nothing was applied yet, so the failed batch is invisible.
                return Err(RepositoryError::AlreadyExists);
            }
        }

        state.charms.insert(charm.id, charm.clone());
        for element in elements {
            state.elements.insert(element.id, element.clone());
        }
        Ok(charm.clone())
    }

    async fn archive(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        let charm = state
            .charms
            .get_mut(&id)
            .filter(|c| c.archived_at.is_none())
            .ok_or(RepositoryError::NotFound)?;
        charm.archived_at = Some(Utc::now());
        charm.updated_at = Utc::now();
        state.hidden_dependents.push(id);
        state.elements.retain(|_, e| e.charm_id != id);
        Ok(())
    }
}

#[async_trait]
impl ElementStore for InMemoryStore {
    async fn find_by_id(&self, element_id: Uuid) -> Result<Option<Element>, RepositoryError> {
        Ok(self.lock().elements.get(&element_id).cloned())
    }

    async fn list(&self, charm_id: Uuid) -> Result<Vec<Element>, RepositoryError> {
        let state = self.lock();
        let mut elements: Vec<Element> = state
            .elements
            .values()
            .filter(|e| e.charm_id == charm_id)
            .cloned()
            .collect();
        elements.sort_by_key(|e| e.layer);
        Ok(elements)
    }

    async fn find_background(&self, charm_id: Uuid) -> Result<Option<Element>, RepositoryError> {
        let state = self.lock();
        Ok(state
            .elements
            .values()
            .find(|e| e.charm_id == charm_id && e.kind.is_background())
            .cloned())
    }

    async fn next_layer(&self, charm_id: Uuid) -> Result<i32, RepositoryError> {
        let state = self.lock();
        let max = state
            .elements
            .values()
            .filter(|e| e.charm_id == charm_id && !e.kind.is_background())
            .map(|e| e.layer)
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn count_foreground(&self, charm_id: Uuid) -> Result<i64, RepositoryError> {
        let state = self.lock();
        Ok(state
            .elements
            .values()
            .filter(|e| e.charm_id == charm_id && !e.kind.is_background())
            .count() as i64)
    }

    async fn insert(&self, element: &Element) -> Result<Element, RepositoryError> {
        let mut state = self.lock();
        if state.elements.contains_key(&element.id)
            || layer_taken(&state, element.charm_id, element.layer, element.id)
        {
            return Err(RepositoryError::AlreadyExists);
        }
        state.elements.insert(element.id, element.clone());
        Ok(element.clone())
    }

    async fn update_content(
        &self,
        element_id: Uuid,
        props: Option<serde_json::Value>,
        transform: Option<serde_json::Value>,
    ) -> Result<Element, RepositoryError> {
        let mut state = self.lock();
        let element = state
            .elements
            .get_mut(&element_id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(props) = props {
            element.props.0 = props;
        }
        if let Some(transform) = transform {
            element.transform.0 = transform;
        }
        element.updated_at = Utc::now();
        Ok(element.clone())
    }

    async fn delete(&self, charm_id: Uuid, element_id: Uuid) -> Result<bool, RepositoryError> {
        let mut state = self.lock();
        let Some(removed) = state
            .elements
            .get(&element_id)
            .filter(|e| e.charm_id == charm_id)
            .cloned()
        else {
            return Ok(false);
        };
        state.elements.remove(&element_id);

        if !removed.kind.is_background() {
            for element in state.elements.values_mut() {
                if element.charm_id == charm_id
                    && !element.kind.is_background()
                    && element.layer > removed.layer
                {
                    element.layer -= 1;
                    element.updated_at = Utc::now();
                }
            }
        }
        Ok(true)
    }

    async fn rewrite_layers(
        &self,
        charm_id: Uuid,
        assignments: &[LayerAssignment],
    ) -> Result<(), RepositoryError> {
        let mut state = self.lock();

        // Validate the whole batch before touching anything, mirroring the
        // deferred constraint check the Postgres store relies on.
        for assignment in assignments {
            match state.elements.get(&assignment.element_id) {
                Some(e) if e.charm_id == charm_id && !e.kind.is_background() => {}
                _ => {
                    return Err(RepositoryError::InvalidData(format!(
                        "element {} is no longer part of charm {charm_id}",
                        assignment.element_id
                    )));
                }
            }
        }
        let mut layers: Vec<i32> = assignments.iter().map(|a| a.layer).collect();
        layers.sort_unstable();
        layers.dedup();
        if layers.len() != assignments.len() {
            return Err(RepositoryError::AlreadyExists);
        }

        for assignment in assignments {
            let element = state
                .elements
                .get_mut(&assignment.element_id)
                .expect("validated above");
            element.layer = assignment.layer;
            element.updated_at = Utc::now();
        }
        Ok(())
    }
}
