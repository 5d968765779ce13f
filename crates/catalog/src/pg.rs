//! Postgres-backed catalog lookups

use crate::{CatalogError, CatalogService, FrameRef};
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgCatalogService {
    pool: PgPool,
}

impl PgCatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogService for PgCatalogService {
    async fn default_frame(&self) -> Result<FrameRef, CatalogError> {
        let frame = sqlx::query_as::<_, FrameRef>(
            "SELECT key, display_name FROM charm_frames WHERE is_default ORDER BY key LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        frame.ok_or(CatalogError::MissingDefaultFrame)
    }

    async fn frame_exists(&self, key: &str) -> Result<bool, CatalogError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM charm_frames WHERE key = $1)",
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn color_exists(&self, key: &str) -> Result<bool, CatalogError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM charm_colors WHERE key = $1)",
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
