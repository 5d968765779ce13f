//! Mamori catalog service
//!
//! Resolves charm color and frame references against the catalog tables.
//! The composition core only consumes `default_frame` (applied when a charm
//! is created without an explicit frame); the existence checks back the
//! request-validation layer above the core.
//!
//! Provides:
//! - Postgres-backed catalog for production
//! - Mock catalog service for testing and development

pub mod mock;
pub mod pg;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog configuration error: {0}")]
    Configuration(String),

    #[error("Catalog has no default frame")]
    MissingDefaultFrame,

    #[error("Catalog lookup error: {0}")]
    Lookup(#[from] sqlx::Error),
}

/// A frame reference resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FrameRef {
    pub key: String,
    pub display_name: String,
}

/// Catalog service configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Catalog provider (postgres, mock)
    pub provider: String,
}

impl CatalogConfig {
    /// Create catalog config from environment variables.
    pub fn from_env() -> Self {
        let provider = std::env::var("CATALOG_PROVIDER").unwrap_or_else(|_| "mock".to_string());
        Self { provider }
    }
}

/// Catalog service trait for different implementations.
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// The frame applied to charms created without an explicit frame.
    async fn default_frame(&self) -> Result<FrameRef, CatalogError>;

    /// Whether a frame with this key exists.
    async fn frame_exists(&self, key: &str) -> Result<bool, CatalogError>;

    /// Whether a color with this key exists.
    async fn color_exists(&self, key: &str) -> Result<bool, CatalogError>;
}

/// Factory for creating CatalogService implementations.
pub struct CatalogServiceFactory;

impl CatalogServiceFactory {
    /// Create a CatalogService based on configuration.
    pub fn create(
        config: CatalogConfig,
        pool: Option<sqlx::PgPool>,
    ) -> Result<Box<dyn CatalogService>, CatalogError> {
        match config.provider.as_str() {
            "postgres" => {
                tracing::info!("Creating Postgres catalog service");
                let pool = pool.ok_or_else(|| {
                    CatalogError::Configuration(
                        "a database pool is required for the postgres catalog provider"
                            .to_string(),
                    )
                })?;
                Ok(Box::new(pg::PgCatalogService::new(pool)))
            }
            "mock" => {
                tracing::info!("Creating mock catalog service");
                Ok(Box::new(mock::MockCatalogService::new()))
            }
            other => Err(CatalogError::Configuration(format!(
                "Unknown catalog provider: {other}"
            ))),
        }
    }
}
