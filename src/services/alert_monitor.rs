use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use crate::error::OptWatchError;
use crate::models::Alert;
use crate::AppState;

/// Spawn the polling loop.
///
/// Waits for the host's `ready` signal once, then runs one cycle every
/// `poll_interval_secs` until `shutdown` flips. Shutdown also aborts a
/// pending per-alert pause, so the task stops promptly mid-pass.
pub fn spawn_alert_monitor(
    state: AppState,
    ready: oneshot::Receiver<()>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = ready => {}
            _ = shutdown.changed() => return,
        }

        let mut interval =
            time::interval(Duration::from_secs(state.settings.poll_interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown.changed() => break,
            }

            run_cycle(&state, &mut shutdown).await;

            if *shutdown.borrow() {
                break;
            }
        }

        info!("alert monitor stopped");
    })
}

/// One full pass over the cached alerts.
///
/// The pass iterates a snapshot of the cache so a trigger's in-place
/// removal leaves the remaining alerts untouched; a delete arriving
/// mid-pass simply wins the race (the trigger path re-checks presence
/// under the book lock). A feed failure for one alert is logged and the
/// pass moves on; that alert is evaluated again next cycle.
pub async fn run_cycle(state: &AppState, shutdown: &mut watch::Receiver<bool>) {
    let snapshot = {
        let book = state.alerts.lock().await;
        book.cache.snapshot()
    };

    let evaluated = snapshot.len();
    let pause = Duration::from_secs(state.settings.poll_pause_secs);

    for alert in snapshot {
        if *shutdown.borrow() {
            return;
        }

        match evaluate_alert(state, &alert).await {
            Ok(Some(price)) => {
                if let Err(e) = trigger_alert(state, &alert, price).await {
                    warn!(alert_id = alert.id, error = %e, "failed to retire triggered alert");
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(alert_id = alert.id, error = %e, "feed lookup failed, retrying next cycle");
            }
        }

        // Stay under the feed's request quota. Unrelated to the trigger
        // condition.
        tokio::select! {
            _ = time::sleep(pause) => {}
            _ = shutdown.changed() => return,
        }
    }

    info!(alerts = evaluated, "price poll cycle completed");
}

/// Returns the observed bid when the alert should fire: a search result
/// matching the alert's expiry with a bid strictly above the threshold.
/// No matching result is a skip, not an error.
async fn evaluate_alert(state: &AppState, alert: &Alert) -> Result<Option<f64>, OptWatchError> {
    let query = format!("{} {} PUT", state.settings.underlying_query, alert.strike);
    let results = state.feed.search(&query).await?;

    let Some(hit) = results.iter().find(|r| r.expiry == alert.expiry) else {
        return Ok(None);
    };

    if hit.bid > alert.threshold {
        Ok(Some(hit.bid))
    } else {
        Ok(None)
    }
}

async fn trigger_alert(state: &AppState, alert: &Alert, price: f64) -> Result<(), OptWatchError> {
    {
        let mut book = state.alerts.lock().await;

        // A user delete may have raced us since the snapshot; whoever
        // removed the alert first wins, and it must not fire twice.
        if !book.cache.contains(alert.id) {
            return Ok(());
        }

        book.retire(alert.id).await?;
    }

    // Retire before notifying: a crash in between drops the message
    // rather than repeating it on restart.
    let text = format!(
        "<@{}> `{} {}p` is at ${}.",
        alert.owner_id, alert.expiry, alert.strike, price
    );

    state
        .notifier
        .send_to_channel(state.settings.report_channel_id, &text)
        .await?;

    info!(alert_id = alert.id, owner_id = alert.owner_id, price, "alert triggered");
    Ok(())
}
