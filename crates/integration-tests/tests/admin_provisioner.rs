//! Integration tests for idempotent schema provisioning.
//!
//! The mock Admin endpoint remembers which definitions exist, so a second
//! run exercises the "already exists" user-error path end to end.

use copihue_admin::provision::definitions::{METAFIELD_DEFINITIONS, METAOBJECT_DEFINITIONS};
use copihue_admin::provision::{ensure_metafield_definitions, ensure_metaobject_definitions};
use copihue_integration_tests::mock::MockShopify;

// =============================================================================
// Metafield Provisioning Tests
// =============================================================================

#[tokio::test]
async fn test_first_metafield_run_creates_everything() {
    let mock = MockShopify::start().await;
    let client = mock.admin_client();

    let summary = ensure_metafield_definitions(&client).await.expect("run");

    assert_eq!(summary.created, METAFIELD_DEFINITIONS.len());
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed, 0);
    assert!(summary.is_success());
}

#[tokio::test]
async fn test_second_metafield_run_skips_everything() {
    let mock = MockShopify::start().await;
    let client = mock.admin_client();

    ensure_metafield_definitions(&client)
        .await
        .expect("first run");
    let summary = ensure_metafield_definitions(&client)
        .await
        .expect("second run");

    assert_eq!(summary.created, 0);
    assert_eq!(summary.skipped, METAFIELD_DEFINITIONS.len());
    assert_eq!(summary.failed, 0);
    assert!(summary.is_success());
}

#[tokio::test]
async fn test_one_failed_definition_does_not_stop_the_walk() {
    let mock = MockShopify::start().await;
    mock.state()
        .failing_definitions
        .insert("custom.isbn".to_string());

    let client = mock.admin_client();
    let summary = ensure_metafield_definitions(&client).await.expect("run");

    assert_eq!(summary.created, METAFIELD_DEFINITIONS.len() - 1);
    assert_eq!(summary.failed, 1);
    assert!(!summary.is_success());

    // Everything after the failure was still attempted and created.
    assert!(mock.state().definitions.contains("custom.ano"));
}

// =============================================================================
// Metaobject Provisioning Tests
// =============================================================================

#[tokio::test]
async fn test_metaobject_runs_are_idempotent() {
    let mock = MockShopify::start().await;
    let client = mock.admin_client();

    let first = ensure_metaobject_definitions(&client)
        .await
        .expect("first run");
    let second = ensure_metaobject_definitions(&client)
        .await
        .expect("second run");

    assert_eq!(first.created, METAOBJECT_DEFINITIONS.len());
    assert_eq!(first.skipped, 0);
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, METAOBJECT_DEFINITIONS.len());
    assert!(first.is_success() && second.is_success());
}

#[tokio::test]
async fn test_full_provisioning_pass() {
    let mock = MockShopify::start().await;
    let client = mock.admin_client();

    let mut summary = ensure_metafield_definitions(&client)
        .await
        .expect("metafields");
    summary.merge(
        ensure_metaobject_definitions(&client)
            .await
            .expect("metaobjects"),
    );

    assert_eq!(
        summary.created,
        METAFIELD_DEFINITIONS.len() + METAOBJECT_DEFINITIONS.len()
    );
    assert_eq!(
        summary.to_string(),
        format!("{} created, 0 skipped, 0 failed", summary.created)
    );
}
