//! Duplication tests: deep-copy fidelity and ownership enforcement

use serde_json::json;
use uuid::Uuid;

use mamori_charms::{CharmError, CharmStatus, ElementKind, ElementPatch};

use crate::common::{background_props, stamp_props, TestCore};

#[tokio::test]
async fn test_duplicate_copies_every_element_by_position() {
    let core = TestCore::new();
    let owner = Uuid::new_v4();
    let source = core.draft_charm(owner).await;

    core.composition
        .upsert_background(source.id, Some(background_props()), None)
        .await
        .unwrap();
    core.add_text(source.id, "厄除").await;
    core.composition
        .add_element(
            source.id,
            "stamp",
            Some(stamp_props()),
            Some(json!({"rotation": 15})),
        )
        .await
        .unwrap();

    let copy = core.duplication.duplicate(owner, source.id).await.unwrap();

    assert_ne!(copy.id, source.id);
    assert_eq!(copy.owner_id, owner);
    assert_eq!(copy.status, CharmStatus::Draft);
    assert!(copy.published_at.is_none());
    assert_eq!(copy.title, source.title);
    assert_eq!(copy.color_id, source.color_id);
    assert_eq!(copy.frame_id, source.frame_id);

    let source_elements = core.list_elements(source.id).await;
    let copy_elements = core.list_elements(copy.id).await;
    assert_eq!(source_elements.len(), 3);
    assert_eq!(copy_elements.len(), 3);

    for (original, copied) in source_elements.iter().zip(copy_elements.iter()) {
        assert_ne!(copied.id, original.id);
        assert_eq!(copied.charm_id, copy.id);
        assert_eq!(copied.kind, original.kind);
        assert_eq!(copied.layer, original.layer);
        assert_eq!(copied.props, original.props);
        assert_eq!(copied.transform, original.transform);
    }
    assert_eq!(copy_elements[0].kind, ElementKind::Background);
}

#[tokio::test]
async fn test_duplicate_of_published_charm_is_a_draft() {
    let core = TestCore::new();
    let owner = Uuid::new_v4();
    let source = core.draft_charm(owner).await;
    core.add_text(source.id, "商売繁盛").await;
    core.lifecycle.publish(source.id).await.unwrap();

    let copy = core.duplication.duplicate(owner, source.id).await.unwrap();

    assert_eq!(copy.status, CharmStatus::Draft);
    assert!(copy.published_at.is_none());

    // The source keeps its published state.
    let source_after = core.charms.get(source.id).await.unwrap();
    assert_eq!(source_after.status, CharmStatus::Published);
}

#[tokio::test]
async fn test_duplicate_by_non_owner_is_forbidden_and_writes_nothing() {
    let core = TestCore::new();
    let owner = Uuid::new_v4();
    let source = core.draft_charm(owner).await;
    core.add_text(source.id, "mine").await;

    let charms_before = core.store.charm_count();
    let elements_before = core.store.element_count();

    let err = core
        .duplication
        .duplicate(Uuid::new_v4(), source.id)
        .await
        .unwrap_err();

    assert!(matches!(err, CharmError::Forbidden));
    assert_eq!(core.store.charm_count(), charms_before);
    assert_eq!(core.store.element_count(), elements_before);
}

#[tokio::test]
async fn test_duplicate_of_missing_charm_fails() {
    let core = TestCore::new();

    let err = core
        .duplication
        .duplicate(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, CharmError::NotFound));
}

#[tokio::test]
async fn test_copy_is_independent_of_the_source() {
    let core = TestCore::new();
    let owner = Uuid::new_v4();
    let source = core.draft_charm(owner).await;
    let original = core.add_text(source.id, "original").await;

    let copy = core.duplication.duplicate(owner, source.id).await.unwrap();
    let copied_element = core.list_elements(copy.id).await.remove(0);

    core.composition
        .update_element(
            copy.id,
            copied_element.id,
            ElementPatch {
                props: Some(json!({"content": "edited"})),
                transform: None,
            },
        )
        .await
        .unwrap();

    let source_element = core.list_elements(source.id).await.remove(0);
    assert_eq!(source_element.id, original.id);
    assert_eq!(source_element.props.0["content"], "original");
}
