pub mod db_init;
pub mod ig_feed;
pub mod notifier;

pub mod alert_cache;
pub mod alert_monitor;
pub mod alert_store;
pub mod alerts_service;
pub mod expiry;
pub mod options_chain;
