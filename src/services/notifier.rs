use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::OptWatchError;

/// A message bound for one chat channel.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelMessage {
    pub channel_id: i64,
    pub text: String,
}

/// Delivery seam for trigger notifications. No acknowledgement beyond
/// success/failure of the send itself.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_to_channel(&self, channel_id: i64, text: &str) -> Result<(), OptWatchError>;
}

/// Publishes onto the realtime event stream; the chat gateway subscribed
/// at `/events` does the actual delivery.
pub struct ChannelNotifier {
    events_tx: broadcast::Sender<ChannelMessage>,
}

impl ChannelNotifier {
    pub fn new(events_tx: broadcast::Sender<ChannelMessage>) -> Self {
        Self { events_tx }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn send_to_channel(&self, channel_id: i64, text: &str) -> Result<(), OptWatchError> {
        self.events_tx
            .send(ChannelMessage {
                channel_id,
                text: text.to_string(),
            })
            .map_err(|e| OptWatchError::Notify(e.to_string()))?;

        Ok(())
    }
}
