//! Domain entities for the Charms domain
//!
//! A charm is a composite visual artifact assembled from layered elements.
//! Entities validate their own invariants at construction; layer bookkeeping
//! across an element set lives in [`crate::domain::layout`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::CharmError;

/// The layer reserved for the background element
pub const BACKGROUND_LAYER: i32 = 0;

/// Maximum title length (varchar(120))
const MAX_TITLE_LENGTH: usize = 120;

/// Maximum description length
const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Charm lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "charm_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CharmStatus {
    #[default]
    Draft,
    Published,
}

impl std::fmt::Display for CharmStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CharmStatus::Draft => write!(f, "draft"),
            CharmStatus::Published => write!(f, "published"),
        }
    }
}

/// Element kind — what a layer renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "element_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Background,
    Text,
    Stamp,
}

impl ElementKind {
    /// Whether this kind is the singleton background layer
    pub fn is_background(&self) -> bool {
        matches!(self, Self::Background)
    }

    /// Parse a caller-supplied kind string.
    ///
    /// The kind arrives as free text at the API boundary; anything outside
    /// the known set is rejected here, before an element is created.
    pub fn parse(kind: &str) -> Result<Self, CharmError> {
        match kind {
            "background" => Ok(Self::Background),
            "text" => Ok(Self::Text),
            "stamp" => Ok(Self::Stamp),
            other => Err(CharmError::InvalidElementKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementKind::Background => write!(f, "background"),
            ElementKind::Text => write!(f, "text"),
            ElementKind::Stamp => write!(f, "stamp"),
        }
    }
}

/// Charm entity — the composite artifact a user assembles and publishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Charm {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: CharmStatus,
    pub color_id: Option<String>,
    pub frame_id: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Charm {
    /// Create a new draft charm
    pub fn new(
        owner_id: Uuid,
        title: String,
        description: Option<String>,
        color_id: Option<String>,
        frame_id: Option<String>,
    ) -> Result<Self, CharmError> {
        let charm = Self {
            id: Uuid::new_v4(),
            owner_id,
            title,
            description,
            status: CharmStatus::Draft,
            color_id,
            frame_id,
            published_at: None,
            archived_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        charm.validate()?;
        Ok(charm)
    }

    pub fn is_published(&self) -> bool {
        self.status == CharmStatus::Published
    }

    /// Value-copy this charm for duplication: fresh identity and timestamps,
    /// requested owner, always a draft. Title, description, and the applied
    /// color/frame references carry over verbatim.
    pub fn derive_copy(&self, new_owner: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: new_owner,
            title: self.title.clone(),
            description: self.description.clone(),
            status: CharmStatus::Draft,
            color_id: self.color_id.clone(),
            frame_id: self.frame_id.clone(),
            published_at: None,
            archived_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<(), CharmError> {
        if self.title.trim().is_empty() {
            return Err(CharmError::InvalidMetadata(
                "Title must not be empty".to_string(),
            ));
        }
        if self.title.len() > MAX_TITLE_LENGTH {
            return Err(CharmError::InvalidMetadata(format!(
                "Title must be at most {} characters",
                MAX_TITLE_LENGTH
            )));
        }
        if let Some(ref description) = self.description {
            if description.len() > MAX_DESCRIPTION_LENGTH {
                return Err(CharmError::InvalidMetadata(format!(
                    "Description must be at most {} characters",
                    MAX_DESCRIPTION_LENGTH
                )));
            }
        }

        // Lifecycle invariant: published_at tracks status exactly
        match self.status {
            CharmStatus::Published if self.published_at.is_none() => {
                return Err(CharmError::InvalidMetadata(
                    "Published charms require a publish timestamp".to_string(),
                ));
            }
            CharmStatus::Draft if self.published_at.is_some() => {
                return Err(CharmError::InvalidMetadata(
                    "Draft charms must not carry a publish timestamp".to_string(),
                ));
            }
            _ => {}
        }

        Ok(())
    }
}

/// Element entity — one layered component of a charm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Element {
    pub id: Uuid,
    pub charm_id: Uuid,
    pub kind: ElementKind,
    pub layer: i32,
    pub props: Json<Value>,
    pub transform: Json<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Element {
    /// Create the background element for a charm, pinned to layer 0
    pub fn background(
        charm_id: Uuid,
        props: Value,
        transform: Value,
    ) -> Result<Self, CharmError> {
        validate_props(ElementKind::Background, &props)?;
        Ok(Self::build(
            charm_id,
            ElementKind::Background,
            BACKGROUND_LAYER,
            props,
            transform,
        ))
    }

    /// Create a foreground (text or stamp) element at the given layer
    pub fn foreground(
        charm_id: Uuid,
        kind: ElementKind,
        layer: i32,
        props: Value,
        transform: Value,
    ) -> Result<Self, CharmError> {
        if kind.is_background() {
            return Err(CharmError::InvalidProps(
                "Background elements are created through the background upsert".to_string(),
            ));
        }
        if layer < 1 {
            return Err(CharmError::InvalidProps(format!(
                "Foreground elements require a layer >= 1, got {layer}"
            )));
        }
        validate_props(kind, &props)?;
        Ok(Self::build(charm_id, kind, layer, props, transform))
    }

    fn build(charm_id: Uuid, kind: ElementKind, layer: i32, props: Value, transform: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            charm_id,
            kind,
            layer,
            props: Json(props),
            transform: Json(transform),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Value-copy this element under a new charm: identical kind, layer,
    /// props, and transform; fresh identity and timestamps.
    pub fn copy_for(&self, new_charm_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            charm_id: new_charm_id,
            kind: self.kind,
            layer: self.layer,
            props: self.props.clone(),
            transform: self.transform.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

/// Structural props rules, enforced at element creation.
///
/// Props are otherwise opaque documents owned by the rendering layer; only
/// the fields other parts of the system depend on are checked here.
fn validate_props(kind: ElementKind, props: &Value) -> Result<(), CharmError> {
    let required = match kind {
        ElementKind::Stamp => Some("asset_key"),
        ElementKind::Background => Some("kind"),
        ElementKind::Text => None,
    };

    if let Some(field) = required {
        match props.get(field).and_then(Value::as_str) {
            Some(value) if !value.trim().is_empty() => {}
            _ => {
                return Err(CharmError::InvalidProps(format!(
                    "{kind} elements require props with a non-empty \"{field}\""
                )));
            }
        }
    }

    Ok(())
}
