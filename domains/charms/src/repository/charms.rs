//! Postgres charm store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Charm, CharmStatus, Element};
use crate::repository::transactions::{
    create_charm_tx, create_element_tx, hide_dependent_posts_tx, CHARM_COLUMNS,
};
use crate::repository::CharmStore;
use mamori_common::RepositoryError;

#[derive(Clone)]
pub struct PgCharmStore {
    pool: PgPool,
}

impl PgCharmStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CharmStore for PgCharmStore {
    async fn find(&self, id: Uuid) -> Result<Option<Charm>, RepositoryError> {
        let query =
            format!("SELECT {CHARM_COLUMNS} FROM charms WHERE id = $1 AND archived_at IS NULL");
        let charm = sqlx::query_as::<_, Charm>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(charm)
    }

    async fn create(&self, charm: &Charm) -> Result<Charm, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let created = create_charm_tx(&mut tx, charm)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        tx.commit().await?;

        Ok(created)
    }

    async fn publish(
        &self,
        id: Uuid,
        published_at: DateTime<Utc>,
    ) -> Result<Charm, RepositoryError> {
        let query = format!(
            "UPDATE charms SET status = $2, published_at = $3, updated_at = NOW() \
             WHERE id = $1 AND archived_at IS NULL \
             RETURNING {CHARM_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Charm>(&query)
            .bind(id)
            .bind(CharmStatus::Published)
            .bind(published_at)
            .fetch_optional(&self.pool)
            .await?;

        updated.ok_or(RepositoryError::NotFound)
    }

    async fn save_draft(&self, id: Uuid) -> Result<Charm, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            "UPDATE charms SET status = $2, published_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND archived_at IS NULL \
             RETURNING {CHARM_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Charm>(&query)
            .bind(id)
            .bind(CharmStatus::Draft)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let hidden = hide_dependent_posts_tx(&mut tx, id).await?;
        tx.commit().await?;

        tracing::debug!(charm_id = %id, hidden_posts = hidden, "charm demoted to draft");
        Ok(updated)
    }

    async fn create_with_elements(
        &self,
        charm: &Charm,
        elements: &[Element],
    ) -> Result<Charm, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let created = create_charm_tx(&mut tx, charm)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        for element in elements {
            create_element_tx(&mut tx, element)
                .await
                .map_err(RepositoryError::from_sqlx)?;
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn archive(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE charms SET archived_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND archived_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        hide_dependent_posts_tx(&mut tx, id).await?;
        sqlx::query("DELETE FROM charm_elements WHERE charm_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
