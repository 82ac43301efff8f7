//! Tests for StateManager

use super::*;
use crate::error::Error;
use crate::partition::PartitionContext;
use tempfile::tempdir;

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_state_manager_new() {
    let manager = StateManager::new("/tmp/tap-woo-state.json");
    assert!(!manager.is_in_memory());
    assert_eq!(manager.path().to_str().unwrap(), "/tmp/tap-woo-state.json");
}

#[test]
fn test_state_manager_in_memory() {
    let manager = StateManager::in_memory();
    assert!(manager.is_in_memory());
}

#[tokio::test]
async fn test_from_json() {
    let manager = StateManager::from_json(
        r#"{"bookmarks": {"orders": {"replication_key": "date_modified_gmt", "replication_key_value": "2024-03-01T00:00:00"}}}"#,
    )
    .unwrap();

    assert_eq!(
        manager.get_bookmark("orders", &PartitionContext::new()).await,
        Some("2024-03-01T00:00:00".to_string())
    );
}

#[test]
fn test_from_json_invalid() {
    let err = StateManager::from_json("{not json").unwrap_err();
    assert!(matches!(err, Error::State { .. }));
}

// ============================================================================
// Bookmark Tests
// ============================================================================

#[tokio::test]
async fn test_get_set_bookmark() {
    let manager = StateManager::in_memory();
    let global = PartitionContext::new();

    assert!(manager.get_bookmark("orders", &global).await.is_none());

    manager
        .set_bookmark("orders", &global, "date_modified_gmt", "2024-01-01T00:00:00")
        .await;
    manager
        .set_bookmark("orders", &global, "date_modified_gmt", "2024-01-02T00:00:00")
        .await;

    assert_eq!(
        manager.get_bookmark("orders", &global).await,
        Some("2024-01-02T00:00:00".to_string())
    );
}

#[tokio::test]
async fn test_partition_bookmarks() {
    let manager = StateManager::in_memory();
    let ctx = PartitionContext::new().with_value("subscription_id", 9);

    manager
        .set_bookmark("subscription_orders", &ctx, "date_modified_gmt", "2024-02-01T00:00:00")
        .await;

    assert_eq!(
        manager.get_bookmark("subscription_orders", &ctx).await,
        Some("2024-02-01T00:00:00".to_string())
    );
    assert!(manager
        .get_bookmark("subscription_orders", &PartitionContext::new())
        .await
        .is_none());
}

#[tokio::test]
async fn test_clone_shares_state() {
    let manager = StateManager::in_memory();
    let clone = manager.clone();

    manager
        .set_bookmark("orders", &PartitionContext::new(), "date_modified_gmt", "x")
        .await;

    assert_eq!(
        clone.get_bookmark("orders", &PartitionContext::new()).await,
        Some("x".to_string())
    );
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::from_file(&path).unwrap();
    manager
        .set_bookmark(
            "orders",
            &PartitionContext::new(),
            "date_modified_gmt",
            "2024-01-02T03:04:05",
        )
        .await;
    manager.save().await.unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());

    let reloaded = StateManager::from_file(&path).unwrap();
    assert_eq!(
        reloaded.get_bookmark("orders", &PartitionContext::new()).await,
        Some("2024-01-02T03:04:05".to_string())
    );
}

#[tokio::test]
async fn test_bookmark_not_written_until_saved() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::from_file(&path).unwrap();
    manager
        .set_bookmark("orders", &PartitionContext::new(), "date_modified_gmt", "x")
        .await;

    assert!(!path.exists());
}

#[test]
fn test_load_nonexistent_file() {
    let dir = tempdir().unwrap();
    let manager = StateManager::from_file(dir.path().join("missing.json")).unwrap();
    assert!(!manager.is_in_memory());
}

#[test]
fn test_load_empty_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "").unwrap();

    assert!(StateManager::from_file(&path).is_ok());
}

#[test]
fn test_load_invalid_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "not valid json").unwrap();

    let err = StateManager::from_file(&path).unwrap_err();
    assert!(matches!(err, Error::State { .. }));
}

#[tokio::test]
async fn test_save_in_memory_noop() {
    let manager = StateManager::in_memory();
    manager
        .set_bookmark("orders", &PartitionContext::new(), "date_modified_gmt", "x")
        .await;
    manager.save().await.unwrap();
}

#[tokio::test]
async fn test_snapshot_and_json() {
    let manager = StateManager::in_memory();
    manager
        .set_bookmark("orders", &PartitionContext::new(), "date_modified_gmt", "x")
        .await;

    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.bookmark("orders", &PartitionContext::new()), Some("x"));

    let json: serde_json::Value = serde_json::from_str(&manager.to_json().await.unwrap()).unwrap();
    assert_eq!(json["bookmarks"]["orders"]["replication_key_value"], "x");
}
