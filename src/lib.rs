//! Library entrypoint for OptWatch.
//!
//! This file exists mainly to make the integration tests easy (tests
//! under `tests/` can import the app state, routers, controllers, services).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

pub mod config;
pub mod error;
pub mod models;

pub mod services;

pub mod events;

pub mod controllers;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub alerts: Arc<tokio::sync::Mutex<services::alerts_service::AlertBook>>,
    pub feed: Arc<dyn services::ig_feed::PriceFeed>,
    pub notifier: Arc<dyn services::notifier::Notifier>,
    pub events_tx: tokio::sync::broadcast::Sender<services::notifier::ChannelMessage>,
    pub cooldowns: Arc<tokio::sync::Mutex<HashMap<i64, Instant>>>,
}
