use serde::{Deserialize, Serialize};

/// One persisted rule: notify the owner once this option's bid
/// crosses above `threshold`. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Alert {
    pub id: i64,
    pub owner_id: i64,
    pub threshold: f64,

    // Normalized contract expiry, e.g. "JUN-24".
    pub expiry: String,
    pub strike: i64,
}
