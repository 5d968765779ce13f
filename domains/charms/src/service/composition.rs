//! Element composition: add, update, delete, background upsert, reorder

use serde_json::Value;
use uuid::Uuid;

use crate::domain::entities::{Element, ElementKind};
use crate::domain::layout::plan_reorder;
use crate::error::{CharmError, Result};
use crate::repository::CharmsStores;
use crate::service::require_charm;
use mamori_common::RepositoryError;

/// Whitelisted element fields a caller may patch.
///
/// `kind` and `layer` are deliberately unrepresentable here: the request
/// boundary above the core rejects payloads carrying them rather than
/// silently dropping the fields.
#[derive(Debug, Clone, Default)]
pub struct ElementPatch {
    pub props: Option<Value>,
    pub transform: Option<Value>,
}

impl ElementPatch {
    pub fn is_empty(&self) -> bool {
        self.props.is_none() && self.transform.is_none()
    }
}

#[derive(Clone)]
pub struct CompositionService {
    stores: CharmsStores,
}

impl CompositionService {
    pub fn new(stores: CharmsStores) -> Self {
        Self { stores }
    }

    /// Add an element to a charm.
    ///
    /// Background kinds are routed through the singleton upsert; text and
    /// stamp elements take the next free foreground layer. Props and
    /// transform default to empty documents when omitted.
    pub async fn add_element(
        &self,
        charm_id: Uuid,
        kind: &str,
        props: Option<Value>,
        transform: Option<Value>,
    ) -> Result<Element> {
        let kind = ElementKind::parse(kind)?;
        require_charm(&self.stores.charms, charm_id).await?;

        let props = props.unwrap_or_else(empty_document);
        let transform = transform.unwrap_or_else(empty_document);

        if kind.is_background() {
            return self.upsert_background_inner(charm_id, props, transform).await;
        }

        // The unique constraint on (charm, layer) backstops concurrent adds;
        // one lost race is retried with a recomputed layer before giving up.
        let mut retried = false;
        loop {
            let layer = self.stores.elements.next_layer(charm_id).await?;
            let element =
                Element::foreground(charm_id, kind, layer, props.clone(), transform.clone())?;
            match self.stores.elements.insert(&element).await {
                Ok(created) => {
                    tracing::debug!(charm_id = %charm_id, element_id = %created.id, layer, %kind, "element added");
                    return Ok(created);
                }
                Err(RepositoryError::AlreadyExists) if !retried => {
                    tracing::debug!(charm_id = %charm_id, layer, "layer assignment collided, retrying");
                    retried = true;
                }
                Err(RepositoryError::AlreadyExists) => {
                    return Err(CharmError::Conflict(
                        "Layer assignment conflicted after retry".to_string(),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Create or overwrite the charm's background element.
    ///
    /// The background is a singleton at layer 0: when one exists its props
    /// and transform are overwritten in place, preserving its identity.
    pub async fn upsert_background(
        &self,
        charm_id: Uuid,
        props: Option<Value>,
        transform: Option<Value>,
    ) -> Result<Element> {
        require_charm(&self.stores.charms, charm_id).await?;
        self.upsert_background_inner(
            charm_id,
            props.unwrap_or_else(empty_document),
            transform.unwrap_or_else(empty_document),
        )
        .await
    }

    async fn upsert_background_inner(
        &self,
        charm_id: Uuid,
        props: Value,
        transform: Value,
    ) -> Result<Element> {
        // Validate through the constructor even on the overwrite path, so a
        // background can never hold structurally invalid props.
        let fresh = Element::background(charm_id, props, transform)?;

        match self.stores.elements.find_background(charm_id).await? {
            Some(existing) => {
                let updated = self
                    .stores
                    .elements
                    .update_content(
                        existing.id,
                        Some(fresh.props.0),
                        Some(fresh.transform.0),
                    )
                    .await?;
                tracing::debug!(charm_id = %charm_id, element_id = %existing.id, "background overwritten");
                Ok(updated)
            }
            None => {
                let created = self.stores.elements.insert(&fresh).await?;
                tracing::debug!(charm_id = %charm_id, element_id = %created.id, "background created");
                Ok(created)
            }
        }
    }

    /// Patch an element's props and/or transform. Absent fields are left
    /// untouched, never reset.
    pub async fn update_element(
        &self,
        charm_id: Uuid,
        element_id: Uuid,
        patch: ElementPatch,
    ) -> Result<Element> {
        let element = self.owned_element(charm_id, element_id).await?;
        if patch.is_empty() {
            return Ok(element);
        }

        Ok(self
            .stores
            .elements
            .update_content(element_id, patch.props, patch.transform)
            .await?)
    }

    /// Remove an element from a charm. Foreground layers above it shift down
    /// so the remaining set stays contiguous.
    pub async fn delete_element(&self, charm_id: Uuid, element_id: Uuid) -> Result<()> {
        self.owned_element(charm_id, element_id).await?;
        let deleted = self.stores.elements.delete(charm_id, element_id).await?;
        if !deleted {
            return Err(CharmError::NotFound);
        }
        tracing::debug!(charm_id = %charm_id, element_id = %element_id, "element deleted");
        Ok(())
    }

    /// Replace the foreground layering with the caller's front-to-back list.
    ///
    /// The list must be a permutation of the charm's current foreground
    /// element IDs; anything else fails with `ReorderMismatch` and changes
    /// nothing.
    pub async fn reorder_elements(&self, charm_id: Uuid, ordered_ids: &[Uuid]) -> Result<()> {
        require_charm(&self.stores.charms, charm_id).await?;

        let elements = self.stores.elements.list(charm_id).await?;
        let current: Vec<Uuid> = elements
            .iter()
            .filter(|e| !e.kind.is_background())
            .map(|e| e.id)
            .collect();

        let plan = plan_reorder(&current, ordered_ids)?;
        self.stores
            .elements
            .rewrite_layers(charm_id, &plan)
            .await?;

        tracing::debug!(charm_id = %charm_id, count = plan.len(), "elements reordered");
        Ok(())
    }

    async fn owned_element(&self, charm_id: Uuid, element_id: Uuid) -> Result<Element> {
        let element = self
            .stores
            .elements
            .find_by_id(element_id)
            .await?
            .ok_or(CharmError::NotFound)?;
        if element.charm_id != charm_id {
            return Err(CharmError::ElementNotInCharm);
        }
        Ok(element)
    }
}

fn empty_document() -> Value {
    Value::Object(serde_json::Map::new())
}
