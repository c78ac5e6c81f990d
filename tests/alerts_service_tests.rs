mod common;

use std::sync::Arc;

use common::{test_state, RecordingNotifier, ScriptedFeed};
use optwatch::error::OptWatchError;
use optwatch::models::Alert;
use optwatch::services::alerts_service;
use optwatch::AppState;

async fn store_and_cache(state: &AppState) -> (Vec<Alert>, Vec<Alert>) {
    let book = state.alerts.lock().await;
    let stored = book.store.list_all().await.expect("list_all");
    (stored, book.cache.snapshot())
}

async fn fresh_state() -> AppState {
    test_state(
        Arc::new(ScriptedFeed::new()),
        Arc::new(RecordingNotifier::new()),
    )
    .await
}

#[tokio::test]
async fn create_lands_in_store_and_cache() {
    let state = fresh_state().await;

    let alert = alerts_service::create_alert(&state, 7, 1, 50.0, "JUN-24".to_string(), 4500)
        .await
        .expect("create");

    let (stored, cached) = store_and_cache(&state).await;
    assert_eq!(stored, vec![alert.clone()]);
    assert_eq!(cached, vec![alert]);
}

#[tokio::test]
async fn duplicate_id_is_rejected_and_leaves_state_untouched() {
    let state = fresh_state().await;

    alerts_service::create_alert(&state, 7, 1, 50.0, "JUN-24".to_string(), 4500)
        .await
        .expect("first create");

    let err = alerts_service::create_alert(&state, 8, 1, 60.0, "JUL-24".to_string(), 4600)
        .await
        .unwrap_err();
    assert!(matches!(err, OptWatchError::Persistence(_)));

    let (stored, cached) = store_and_cache(&state).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(cached.len(), 1);
    assert_eq!(stored[0].owner_id, 7);
}

#[tokio::test]
async fn listing_is_scoped_to_the_owner_in_insertion_order() {
    let state = fresh_state().await;

    alerts_service::create_alert(&state, 7, 1, 50.0, "JUN-24".to_string(), 4500)
        .await
        .expect("create 1");
    alerts_service::create_alert(&state, 8, 2, 55.0, "JUN-24".to_string(), 4400)
        .await
        .expect("create 2");
    alerts_service::create_alert(&state, 7, 3, 60.0, "JUL-24".to_string(), 4300)
        .await
        .expect("create 3");

    let mine = alerts_service::list_owner_alerts(&state, 7).await.expect("list");
    let ids: Vec<i64> = mine.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn delete_removes_from_store_and_cache_together() {
    let state = fresh_state().await;

    alerts_service::create_alert(&state, 7, 1, 50.0, "JUN-24".to_string(), 4500)
        .await
        .expect("create 1");
    alerts_service::create_alert(&state, 7, 2, 55.0, "JUL-24".to_string(), 4400)
        .await
        .expect("create 2");

    alerts_service::delete_alert(&state, 7, 1).await.expect("delete");

    let (stored, cached) = store_and_cache(&state).await;
    assert_eq!(stored, cached);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, 2);
}

#[tokio::test]
async fn deleting_an_unknown_id_is_a_noop() {
    let state = fresh_state().await;

    alerts_service::create_alert(&state, 7, 1, 50.0, "JUN-24".to_string(), 4500)
        .await
        .expect("create");

    alerts_service::delete_alert(&state, 7, 999)
        .await
        .expect("delete of missing id");

    let (stored, cached) = store_and_cache(&state).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(cached.len(), 1);
}

#[tokio::test]
async fn deleting_another_users_alert_is_a_noop() {
    let state = fresh_state().await;

    alerts_service::create_alert(&state, 7, 1, 50.0, "JUN-24".to_string(), 4500)
        .await
        .expect("create");

    alerts_service::delete_alert(&state, 8, 1)
        .await
        .expect("delete with wrong owner");

    let (stored, cached) = store_and_cache(&state).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(cached.len(), 1);
}

#[tokio::test]
async fn cache_matches_store_after_a_mixed_sequence() {
    let state = fresh_state().await;

    for id in 1..=5 {
        alerts_service::create_alert(&state, 7, id, 50.0, "JUN-24".to_string(), 4500)
            .await
            .expect("create");
    }
    alerts_service::delete_alert(&state, 7, 2).await.expect("delete 2");
    alerts_service::delete_alert(&state, 7, 4).await.expect("delete 4");
    alerts_service::create_alert(&state, 7, 6, 70.0, "AUG-24".to_string(), 4200)
        .await
        .expect("create 6");

    let (stored, cached) = store_and_cache(&state).await;
    assert_eq!(stored, cached);

    let ids: Vec<i64> = cached.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![1, 3, 5, 6]);
}

#[tokio::test]
async fn warm_cache_reloads_the_stored_alerts() {
    let state = fresh_state().await;

    alerts_service::create_alert(&state, 7, 1, 50.0, "JUN-24".to_string(), 4500)
        .await
        .expect("create");

    let mut book = state.alerts.lock().await;
    book.cache.load(Vec::new());
    book.warm_cache().await.expect("warm cache");

    assert_eq!(book.cache.len(), 1);
    assert!(book.cache.contains(1));
}
