//! Charm creation and archival tests

use uuid::Uuid;

use mamori_charms::CharmError;

use crate::common::{background_props, TestCore};

#[tokio::test]
async fn test_create_applies_the_catalog_default_frame() {
    let core = TestCore::new();

    let charm = core
        .charms
        .create(Uuid::new_v4(), "School charm".to_string(), None, None, None)
        .await
        .unwrap();

    assert_eq!(charm.frame_id.as_deref(), Some("frame_classic"));
    assert!(core
        .catalog
        .recorded_lookups()
        .contains(&"default_frame".to_string()));
}

#[tokio::test]
async fn test_create_keeps_an_explicit_frame() {
    let core = TestCore::new();

    let charm = core
        .charms
        .create(
            Uuid::new_v4(),
            "Shrine charm".to_string(),
            None,
            None,
            Some("frame_shrine_gate".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(charm.frame_id.as_deref(), Some("frame_shrine_gate"));
    assert!(core.catalog.recorded_lookups().is_empty());
}

#[tokio::test]
async fn test_create_rejects_invalid_metadata() {
    let core = TestCore::new();

    let err = core
        .charms
        .create(Uuid::new_v4(), "a".repeat(121), None, None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, CharmError::InvalidMetadata(_)));
    assert_eq!(core.store.charm_count(), 0);
}

#[tokio::test]
async fn test_get_missing_charm_fails() {
    let core = TestCore::new();

    let err = core.charms.get(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, CharmError::NotFound));
}

#[tokio::test]
async fn test_archive_hides_dependents_and_removes_elements() {
    let core = TestCore::new();
    let charm = core.draft_charm(Uuid::new_v4()).await;
    core.composition
        .upsert_background(charm.id, Some(background_props()), None)
        .await
        .unwrap();
    core.add_text(charm.id, "家内安全").await;

    core.charms.archive(charm.id).await.unwrap();

    assert!(matches!(
        core.charms.get(charm.id).await.unwrap_err(),
        CharmError::NotFound
    ));
    assert_eq!(core.store.element_count(), 0);
    assert_eq!(core.store.hidden_dependent_count(charm.id), 1);
}

#[tokio::test]
async fn test_archive_twice_fails_the_second_time() {
    let core = TestCore::new();
    let charm = core.draft_charm(Uuid::new_v4()).await;

    core.charms.archive(charm.id).await.unwrap();
    let err = core.charms.archive(charm.id).await.unwrap_err();

    assert!(matches!(err, CharmError::NotFound));
}
