//! Error types for the Charms domain

use thiserror::Error;

use crate::domain::state::PublishRule;
use mamori_catalog::CatalogError;
use mamori_common::RepositoryError;

/// Result type for charm operations
pub type Result<T> = std::result::Result<T, CharmError>;

/// Typed failures surfaced by the charm services.
///
/// Every failure is reported to the immediate caller; nothing is swallowed
/// or auto-corrected.
#[derive(Debug, Error)]
pub enum CharmError {
    #[error("Charm or element not found")]
    NotFound,

    #[error("Requesting user does not own this charm")]
    Forbidden,

    #[error("Element belongs to a different charm")]
    ElementNotInCharm,

    #[error("Unknown element kind: {0}")]
    InvalidElementKind(String),

    #[error("Invalid element props: {0}")]
    InvalidProps(String),

    #[error("Invalid charm metadata: {0}")]
    InvalidMetadata(String),

    #[error("Reorder list rejected: {0}")]
    ReorderMismatch(String),

    #[error("Charm is not ready to publish; failed rules: {}", rules_csv(.0))]
    PublishValidation(Vec<PublishRule>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Catalog lookup failed: {0}")]
    Catalog(#[source] CatalogError),

    #[error(transparent)]
    Storage(RepositoryError),
}

fn rules_csv(rules: &[PublishRule]) -> String {
    rules
        .iter()
        .map(PublishRule::id)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<RepositoryError> for CharmError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => CharmError::NotFound,
            RepositoryError::AlreadyExists => {
                CharmError::Conflict("Stored record conflicts with an existing one".to_string())
            }
            other => CharmError::Storage(other),
        }
    }
}

impl From<CatalogError> for CharmError {
    fn from(err: CatalogError) -> Self {
        CharmError::Catalog(err)
    }
}

/// Mapping into the application-wide error for the API layer above the core.
impl From<CharmError> for mamori_common::Error {
    fn from(err: CharmError) -> Self {
        use mamori_common::Error;
        match err {
            CharmError::NotFound => Error::NotFound("Charm or element not found".to_string()),
            CharmError::Forbidden => {
                Error::Authorization("Requesting user does not own this charm".to_string())
            }
            CharmError::Conflict(msg) => Error::Conflict(msg),
            CharmError::Storage(repo) => repo.into(),
            CharmError::Catalog(e) => Error::Internal(e.to_string()),
            other => Error::Validation(other.to_string()),
        }
    }
}
