use crate::error::OptWatchError;
use crate::models::Alert;
use crate::AppState;

use super::alert_cache::AlertCache;
use super::alert_store::AlertStore;

/// Store and cache behind one lock.
///
/// Every path that mutates alerts (create, user delete, cycle trigger)
/// goes through a locked `AlertBook`, which keeps the cache set-equal to
/// the store at every quiescent point.
pub struct AlertBook {
    pub store: AlertStore,
    pub cache: AlertCache,
}

impl AlertBook {
    pub fn new(store: AlertStore) -> Self {
        Self {
            store,
            cache: AlertCache::new(),
        }
    }

    /// Fill the cache from the store at startup.
    pub async fn warm_cache(&mut self) -> Result<(), OptWatchError> {
        let alerts = self.store.list_all().await?;
        self.cache.load(alerts);
        Ok(())
    }

    pub async fn insert(&mut self, alert: Alert) -> Result<(), OptWatchError> {
        let mut txn = self.store.begin().await?;
        txn.insert(&alert).await?;
        txn.commit().await?;

        self.cache.push(alert);
        Ok(())
    }

    pub async fn remove_for_owner(&mut self, id: i64, owner_id: i64) -> Result<(), OptWatchError> {
        let mut txn = self.store.begin().await?;
        txn.delete_for_owner(id, owner_id).await?;
        txn.commit().await?;

        self.cache.remove_for_owner(id, owner_id);
        Ok(())
    }

    /// Retire a triggered alert from store and cache. The store commit
    /// lands first; the cache is only touched once the delete is durable.
    pub async fn retire(&mut self, id: i64) -> Result<(), OptWatchError> {
        let mut txn = self.store.begin().await?;
        txn.delete(id).await?;
        txn.commit().await?;

        self.cache.remove(id);
        Ok(())
    }
}

pub async fn create_alert(
    state: &AppState,
    owner_id: i64,
    id: i64,
    threshold: f64,
    expiry: String,
    strike: i64,
) -> Result<Alert, OptWatchError> {
    let alert = Alert {
        id,
        owner_id,
        threshold,
        expiry,
        strike,
    };

    let mut book = state.alerts.lock().await;
    book.insert(alert.clone()).await?;

    Ok(alert)
}

pub async fn list_owner_alerts(state: &AppState, owner_id: i64) -> Result<Vec<Alert>, OptWatchError> {
    let book = state.alerts.lock().await;
    book.store.list_by_owner(owner_id).await
}

/// Idempotent: unknown ids and other users' alerts are no-ops.
pub async fn delete_alert(state: &AppState, owner_id: i64, id: i64) -> Result<(), OptWatchError> {
    let mut book = state.alerts.lock().await;
    book.remove_for_owner(id, owner_id).await
}
