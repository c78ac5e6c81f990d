use crate::models::Alert;

/// In-memory working set of alerts, kept set-equal to the store between
/// cycles. The polling loop reads this instead of re-querying sqlite.
///
/// Iteration order is insertion order.
#[derive(Debug, Default)]
pub struct AlertCache {
    alerts: Vec<Alert>,
}

impl AlertCache {
    pub fn new() -> Self {
        Self { alerts: Vec::new() }
    }

    pub fn load(&mut self, alerts: Vec<Alert>) {
        self.alerts = alerts;
    }

    pub fn push(&mut self, alert: Alert) {
        self.alerts.push(alert);
    }

    /// Removes in place; alerts after the removed one keep their order.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        self.alerts.len() != before
    }

    pub fn remove_for_owner(&mut self, id: i64, owner_id: i64) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| !(a.id == id && a.owner_id == owner_id));
        self.alerts.len() != before
    }

    pub fn contains(&self, id: i64) -> bool {
        self.alerts.iter().any(|a| a.id == id)
    }

    /// Clone of the current contents, for iterating a cycle without
    /// holding the book lock across feed calls.
    pub fn snapshot(&self) -> Vec<Alert> {
        self.alerts.clone()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
