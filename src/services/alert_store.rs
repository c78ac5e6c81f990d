use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::OptWatchError;
use crate::models::Alert;

/// Durable side of the alert book: a small sqlite table keyed by alert id.
///
/// Writes are staged on an [`AlertTxn`] and become durable only when the
/// caller commits, so a trigger can batch its delete with the commit.
#[derive(Clone)]
pub struct AlertStore {
    pool: SqlitePool,
}

impl AlertStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<AlertTxn, OptWatchError> {
        Ok(AlertTxn {
            tx: self.pool.begin().await?,
        })
    }

    /// Every stored alert, in insertion order.
    pub async fn list_all(&self) -> Result<Vec<Alert>, OptWatchError> {
        let alerts = sqlx::query_as::<_, Alert>(
            "select id, owner_id, threshold, expiry, strike from alerts order by rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }

    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Alert>, OptWatchError> {
        let alerts = sqlx::query_as::<_, Alert>(
            "select id, owner_id, threshold, expiry, strike from alerts
             where owner_id = ?1 order by rowid",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }

    pub async fn ping(&self) -> Result<(), OptWatchError> {
        sqlx::query("select 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Staged writes against the alerts table. Nothing here is visible to
/// other connections until `commit`.
pub struct AlertTxn {
    tx: Transaction<'static, Sqlite>,
}

impl AlertTxn {
    /// Fails on a duplicate id; colliding ids are a caller bug, never an
    /// overwrite.
    pub async fn insert(&mut self, alert: &Alert) -> Result<(), OptWatchError> {
        sqlx::query(
            "insert into alerts (id, owner_id, threshold, expiry, strike)
             values (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(alert.id)
        .bind(alert.owner_id)
        .bind(alert.threshold)
        .bind(&alert.expiry)
        .bind(alert.strike)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    /// Idempotent; deleting an absent id is a no-op.
    pub async fn delete(&mut self, id: i64) -> Result<(), OptWatchError> {
        sqlx::query("delete from alerts where id = ?1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    /// Idempotent delete scoped to the owner, so users cannot remove each
    /// other's alerts.
    pub async fn delete_for_owner(&mut self, id: i64, owner_id: i64) -> Result<(), OptWatchError> {
        sqlx::query("delete from alerts where id = ?1 and owner_id = ?2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    pub async fn commit(self) -> Result<(), OptWatchError> {
        self.tx.commit().await?;
        Ok(())
    }
}
