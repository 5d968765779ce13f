//! Lifecycle tests: publish guards, idempotence, and the draft round trip

use uuid::Uuid;

use mamori_charms::{CharmError, CharmStatus, PublishRule};

use crate::common::TestCore;

#[tokio::test]
async fn test_publish_reports_every_violated_rule() {
    let core = TestCore::new();
    let charm = core.stored_charm(Uuid::new_v4(), None, None).await;

    let err = core.lifecycle.publish(charm.id).await.unwrap_err();

    let CharmError::PublishValidation(violations) = err else {
        panic!("expected PublishValidation, got {err:?}");
    };
    assert_eq!(
        violations,
        vec![
            PublishRule::ColorApplied,
            PublishRule::FrameApplied,
            PublishRule::HasForegroundElement,
        ]
    );

    // Nothing changed.
    let stored = core.charms.get(charm.id).await.unwrap();
    assert_eq!(stored.status, CharmStatus::Draft);
    assert!(stored.published_at.is_none());
}

#[tokio::test]
async fn test_publish_reports_only_the_color_rule() {
    let core = TestCore::new();
    let charm = core
        .stored_charm(Uuid::new_v4(), None, Some("frame_classic"))
        .await;
    core.add_text(charm.id, "開運").await;

    let err = core.lifecycle.publish(charm.id).await.unwrap_err();

    let CharmError::PublishValidation(violations) = err else {
        panic!("expected PublishValidation, got {err:?}");
    };
    assert_eq!(violations, vec![PublishRule::ColorApplied]);
}

#[tokio::test]
async fn test_background_alone_does_not_satisfy_the_element_rule() {
    let core = TestCore::new();
    let charm = core.draft_charm(Uuid::new_v4()).await;
    core.composition
        .upsert_background(charm.id, Some(crate::common::background_props()), None)
        .await
        .unwrap();

    let err = core.lifecycle.publish(charm.id).await.unwrap_err();

    let CharmError::PublishValidation(violations) = err else {
        panic!("expected PublishValidation, got {err:?}");
    };
    assert_eq!(violations, vec![PublishRule::HasForegroundElement]);
}

#[tokio::test]
async fn test_publish_succeeds_and_stamps_timestamp() {
    let core = TestCore::new();
    let charm = core.draft_charm(Uuid::new_v4()).await;
    core.add_text(charm.id, "合格").await;

    let published = core.lifecycle.publish(charm.id).await.unwrap();

    assert_eq!(published.status, CharmStatus::Published);
    assert!(published.published_at.is_some());
}

#[tokio::test]
async fn test_republishing_is_a_noop_preserving_timestamp() {
    let core = TestCore::new();
    let charm = core.draft_charm(Uuid::new_v4()).await;
    core.add_text(charm.id, "良縁").await;

    let first = core.lifecycle.publish(charm.id).await.unwrap();
    let second = core.lifecycle.publish(charm.id).await.unwrap();

    assert_eq!(second.status, CharmStatus::Published);
    assert_eq!(second.published_at, first.published_at);
}

#[tokio::test]
async fn test_save_draft_clears_timestamp_and_hides_dependents_once() {
    let core = TestCore::new();
    let charm = core.draft_charm(Uuid::new_v4()).await;
    core.add_text(charm.id, "安産").await;

    core.lifecycle.publish(charm.id).await.unwrap();
    let demoted = core.lifecycle.save_draft(charm.id).await.unwrap();

    assert_eq!(demoted.status, CharmStatus::Draft);
    assert!(demoted.published_at.is_none());
    assert_eq!(core.store.hidden_dependent_count(charm.id), 1);

    // Draft -> draft is a no-op; dependents are not hidden again.
    let still_draft = core.lifecycle.save_draft(charm.id).await.unwrap();
    assert_eq!(still_draft.status, CharmStatus::Draft);
    assert_eq!(core.store.hidden_dependent_count(charm.id), 1);
}

#[tokio::test]
async fn test_save_draft_on_a_fresh_draft_never_hides_dependents() {
    let core = TestCore::new();
    let charm = core.draft_charm(Uuid::new_v4()).await;

    let unchanged = core.lifecycle.save_draft(charm.id).await.unwrap();

    assert_eq!(unchanged.status, CharmStatus::Draft);
    assert_eq!(core.store.hidden_dependent_count(charm.id), 0);
}

#[tokio::test]
async fn test_publish_draft_publish_restamps_the_timestamp() {
    let core = TestCore::new();
    let charm = core.draft_charm(Uuid::new_v4()).await;
    core.add_text(charm.id, "長寿").await;

    let first = core.lifecycle.publish(charm.id).await.unwrap();
    core.lifecycle.save_draft(charm.id).await.unwrap();
    let second = core.lifecycle.publish(charm.id).await.unwrap();

    assert_eq!(second.status, CharmStatus::Published);
    assert!(second.published_at.is_some());
    assert_ne!(second.published_at, first.published_at);
}

#[tokio::test]
async fn test_lifecycle_operations_on_missing_charm_fail() {
    let core = TestCore::new();

    assert!(matches!(
        core.lifecycle.publish(Uuid::new_v4()).await.unwrap_err(),
        CharmError::NotFound
    ));
    assert!(matches!(
        core.lifecycle.save_draft(Uuid::new_v4()).await.unwrap_err(),
        CharmError::NotFound
    ));
}
