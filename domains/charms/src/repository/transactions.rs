//! Transactional free functions shared by composite store operations

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entities::{Charm, Element};

pub(crate) const CHARM_COLUMNS: &str = "\
    id, owner_id, title, description, status, \
    color_id, frame_id, \
    published_at, archived_at, created_at, updated_at";

pub(crate) const ELEMENT_COLUMNS: &str =
    "id, charm_id, kind, layer, props, transform, created_at, updated_at";

/// Create a charm within an existing transaction.
pub async fn create_charm_tx(
    tx: &mut Transaction<'_, Postgres>,
    charm: &Charm,
) -> std::result::Result<Charm, sqlx::Error> {
    let query = format!(
        "INSERT INTO charms ({CHARM_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {CHARM_COLUMNS}"
    );
    let created = sqlx::query_as::<_, Charm>(&query)
        .bind(charm.id)
        .bind(charm.owner_id)
        .bind(&charm.title)
        .bind(&charm.description)
        .bind(charm.status)
        .bind(&charm.color_id)
        .bind(&charm.frame_id)
        .bind(charm.published_at)
        .bind(charm.archived_at)
        .bind(charm.created_at)
        .bind(charm.updated_at)
        .fetch_one(&mut **tx)
        .await?;

    Ok(created)
}

/// Create an element within an existing transaction.
pub async fn create_element_tx(
    tx: &mut Transaction<'_, Postgres>,
    element: &Element,
) -> std::result::Result<Element, sqlx::Error> {
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
        .fetch_one(&mut **tx)
        .await?;

    Ok(created)
}

/// Hide every public post that surfaces this charm, within an existing
/// transaction. Runs as part of the published -> draft demotion and of
/// archival, so dependents never outlive the visibility of their charm.
pub async fn hide_dependent_posts_tx(
    tx: &mut Transaction<'_, Postgres>,
    charm_id: Uuid,
) -> std::result::Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE posts SET is_public = FALSE, updated_at = NOW() \
         WHERE charm_id = $1 AND is_public",
    )
    .bind(charm_id)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// Relax the layer-uniqueness constraint until commit so a bulk relayering
/// or gap-closing shift can pass through transient duplicates.
pub async fn defer_layer_constraint_tx(
    tx: &mut Transaction<'_, Postgres>,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query("SET CONSTRAINTS charm_elements_layer_uniq DEFERRED")
        .execute(&mut **tx)
        .await?;
    Ok(())
}
