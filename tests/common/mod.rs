//! Shared state builder and scripted collaborators for the integration
//! tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::{broadcast, Mutex};

use optwatch::config::Settings;
use optwatch::error::OptWatchError;
use optwatch::services::alert_store::AlertStore;
use optwatch::services::alerts_service::AlertBook;
use optwatch::services::db_init;
use optwatch::services::ig_feed::{InstrumentQuote, PriceFeed, PriceSnapshot};
use optwatch::services::notifier::{ChannelMessage, Notifier};
use optwatch::AppState;

pub const TEST_CHANNEL: i64 = 42;

pub fn test_settings() -> Settings {
    Settings {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        ig_base_url: "http://localhost:0".to_string(),
        ig_api_key: String::new(),
        ig_username: String::new(),
        ig_password: String::new(),
        feed_timeout_secs: 1,
        report_channel_id: TEST_CHANNEL,
        reference_epic: "IX.D.SPTRD.DAILY.IP".to_string(),
        underlying_query: "US 500".to_string(),
        poll_interval_secs: 300,
        // No rate-limit pauses in tests.
        poll_pause_secs: 0,
        options_cooldown_secs: 30,
    }
}

pub async fn test_state(feed: Arc<ScriptedFeed>, notifier: Arc<RecordingNotifier>) -> AppState {
    let settings = test_settings();

    // A single connection so the in-memory database is shared.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite pool");

    db_init::ensure_schema(&pool).await.expect("alerts schema");

    let book = AlertBook::new(AlertStore::new(pool));
    let (events_tx, _events_rx) = broadcast::channel::<ChannelMessage>(16);

    AppState {
        settings,
        alerts: Arc::new(Mutex::new(book)),
        feed,
        notifier,
        events_tx,
        cooldowns: Arc::new(Mutex::new(HashMap::new())),
    }
}

pub fn quote(epic: &str, expiry: &str, bid: f64) -> InstrumentQuote {
    InstrumentQuote {
        epic: epic.to_string(),
        expiry: expiry.to_string(),
        bid,
        instrument_name: format!("{epic} quote"),
    }
}

/// Feed double that replays stubbed responses keyed by search query.
#[derive(Default)]
pub struct ScriptedFeed {
    daily: StdMutex<Option<PriceSnapshot>>,
    searches: StdMutex<HashMap<String, Vec<InstrumentQuote>>>,
    failing: StdMutex<HashSet<String>>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_daily(&self, snapshot: PriceSnapshot) {
        *self.daily.lock().unwrap() = Some(snapshot);
    }

    pub fn stub_search(&self, query: &str, results: Vec<InstrumentQuote>) {
        self.searches
            .lock()
            .unwrap()
            .insert(query.to_string(), results);
    }

    pub fn fail_search(&self, query: &str) {
        self.failing.lock().unwrap().insert(query.to_string());
    }
}

#[async_trait]
impl PriceFeed for ScriptedFeed {
    async fn snapshot(&self, _epic: &str) -> Result<PriceSnapshot, OptWatchError> {
        self.daily
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| OptWatchError::Feed("no snapshot scripted".to_string()))
    }

    async fn search(&self, query: &str) -> Result<Vec<InstrumentQuote>, OptWatchError> {
        if self.failing.lock().unwrap().contains(query) {
            return Err(OptWatchError::Feed(format!("scripted failure for '{query}'")));
        }

        Ok(self
            .searches
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }
}

/// Notifier double that records every message instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: StdMutex<Vec<(i64, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_to_channel(&self, channel_id: i64, text: &str) -> Result<(), OptWatchError> {
        self.sent
            .lock()
            .unwrap()
            .push((channel_id, text.to_string()));
        Ok(())
    }
}
