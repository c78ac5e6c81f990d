use sqlx::SqlitePool;

use crate::error::OptWatchError;

pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), OptWatchError> {
    sqlx::query(
        r"create table if not exists alerts (
            id integer primary key,
            owner_id integer not null,
            threshold real not null,
            expiry text not null,
            strike integer not null
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}
