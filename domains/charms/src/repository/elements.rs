//! Postgres element store

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Element, ElementKind};
use crate::domain::layout::LayerAssignment;
use crate::repository::transactions::{defer_layer_constraint_tx, ELEMENT_COLUMNS};
use crate::repository::ElementStore;
use mamori_common::RepositoryError;

#[derive(Clone)]
pub struct PgElementStore {
    pool: PgPool,
}

impl PgElementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ElementStore for PgElementStore {
    async fn find_by_id(&self, element_id: Uuid) -> Result<Option<Element>, RepositoryError> {
        let query = format!("SELECT {ELEMENT_COLUMNS} FROM charm_elements WHERE id = $1");
        let element = sqlx::query_as::<_, Element>(&query)
            .bind(element_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(element)
    }

    async fn list(&self, charm_id: Uuid) -> Result<Vec<Element>, RepositoryError> {
        let query = format!(
            "SELECT {ELEMENT_COLUMNS} FROM charm_elements \
             WHERE charm_id = $1 ORDER BY layer ASC"
        );
        let elements = sqlx::query_as::<_, Element>(&query)
            .bind(charm_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(elements)
    }

    async fn find_background(&self, charm_id: Uuid) -> Result<Option<Element>, RepositoryError> {
        let query = format!(
            "SELECT {ELEMENT_COLUMNS} FROM charm_elements \
             WHERE charm_id = $1 AND kind = $2"
        );
        let element = sqlx::query_as::<_, Element>(&query)
            .bind(charm_id)
            .bind(ElementKind::Background)
            .fetch_optional(&self.pool)
            .await?;

        Ok(element)
    }

    async fn next_layer(&self, charm_id: Uuid) -> Result<i32, RepositoryError> {
        let max = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(layer) FROM charm_elements WHERE charm_id = $1 AND kind <> $2",
        )
        .bind(charm_id)
        .bind(ElementKind::Background)
        .fetch_one(&self.pool)
        .await?;

        Ok(max.unwrap_or(0) + 1)
    }

    async fn count_foreground(&self, charm_id: Uuid) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM charm_elements WHERE charm_id = $1 AND kind <> $2",
        )
        .bind(charm_id)
        .bind(ElementKind::Background)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn insert(&self, element: &Element) -> Result<Element, RepositoryError> {
        let query = format!(
            "INSERT INTO charm_elements ({ELEMENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {ELEMENT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Element>(&query)
            .bind(element.id)
            .bind(element.charm_id)
            .bind(element.kind)
            .bind(element.layer)
            .bind(&element.props)
            .bind(&element.transform)
            .bind(element.created_at)
            .bind(element.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;

        Ok(created)
    }

    async fn update_content(
        &self,
        element_id: Uuid,
        props: Option<serde_json::Value>,
        transform: Option<serde_json::Value>,
    ) -> Result<Element, RepositoryError> {
        let query = format!(
            "UPDATE charm_elements \
             SET props = COALESCE($2, props), \
                 transform = COALESCE($3, transform), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {ELEMENT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Element>(&query)
            .bind(element_id)
            .bind(props.map(Json))
            .bind(transform.map(Json))
            .fetch_optional(&self.pool)
            .await?;

        updated.ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, charm_id: Uuid, element_id: Uuid) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        defer_layer_constraint_tx(&mut tx).await?;

        let deleted = sqlx::query_as::<_, (ElementKind, i32)>(
            "DELETE FROM charm_elements WHERE charm_id = $1 AND id = $2 \
             RETURNING kind, layer",
        )
        .bind(charm_id)
        .bind(element_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((kind, layer)) = deleted else {
            return Ok(false);
        };

        // Close the gap so foreground layers stay contiguous 1..=N.
        if !kind.is_background() {
            sqlx::query(
                "UPDATE charm_elements SET layer = layer - 1, updated_at = NOW() \
                 WHERE charm_id = $1 AND kind <> $2 AND layer > $3",
            )
            .bind(charm_id)
            .bind(ElementKind::Background)
            .bind(layer)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn rewrite_layers(
        &self,
        charm_id: Uuid,
        assignments: &[LayerAssignment],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        defer_layer_constraint_tx(&mut tx).await?;

        for assignment in assignments {
            let result = sqlx::query(
                "UPDATE charm_elements SET layer = $3, updated_at = NOW() \
                 WHERE charm_id = $1 AND id = $2 AND kind <> $4",
            )
            .bind(charm_id)
            .bind(assignment.element_id)
            .bind(assignment.layer)
            .bind(ElementKind::Background)
            .execute(&mut *tx)
            .await?;

            // The plan was validated against a snapshot; a vanished row means
            // a concurrent write won the race. Dropping the transaction rolls
            // everything back.
            if result.rows_affected() != 1 {
                return Err(RepositoryError::InvalidData(format!(
                    "element {} is no longer part of charm {charm_id}",
                    assignment.element_id
                )));
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
