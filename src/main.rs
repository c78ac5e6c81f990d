use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::{broadcast, oneshot, watch, Mutex};

use optwatch::services::alert_monitor;
use optwatch::services::alert_store::AlertStore;
use optwatch::services::alerts_service::AlertBook;
use optwatch::services::db_init;
use optwatch::services::ig_feed::IgFeedClient;
use optwatch::services::notifier::{ChannelMessage, ChannelNotifier};
use optwatch::{config, routes, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await
        .expect("Failed to open the alerts database");

    db_init::ensure_schema(&pool)
        .await
        .expect("Failed to create the alerts table");

    let mut book = AlertBook::new(AlertStore::new(pool));
    book.warm_cache()
        .await
        .expect("Failed to load alerts into memory");
    tracing::info!(alerts = book.cache.len(), "loaded alerts from store");

    let feed = IgFeedClient::login(&settings)
        .await
        .expect("IG session login failed");

    let (events_tx, _events_rx) = broadcast::channel::<ChannelMessage>(64);
    let notifier = ChannelNotifier::new(events_tx.clone());

    let state = AppState {
        settings: settings.clone(),
        alerts: Arc::new(Mutex::new(book)),
        feed: Arc::new(feed),
        notifier: Arc::new(notifier),
        events_tx,
        cooldowns: Arc::new(Mutex::new(HashMap::new())),
    };

    let (ready_tx, ready_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = alert_monitor::spawn_alert_monitor(state.clone(), ready_rx, shutdown_rx.clone());

    let app = routes::app(state);

    let addr = SocketAddr::from((
        settings.host.parse::<std::net::IpAddr>().unwrap(),
        settings.port,
    ));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // The monitor holds off its first cycle until we are serving.
    let _ = ready_tx.send(());

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        let _ = shutdown_tx.send(true);
    });

    let mut serve_shutdown = shutdown_rx;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = serve_shutdown.changed().await;
        })
        .await
        .unwrap();

    let _ = monitor.await;
    tracing::info!("shut down");
}
