use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub database_url: String,

    pub ig_base_url: String,
    pub ig_api_key: String,
    pub ig_username: String,
    pub ig_password: String,
    pub feed_timeout_secs: u64,

    // Chat channel that receives trigger notifications.
    pub report_channel_id: i64,

    pub reference_epic: String,
    pub underlying_query: String,

    pub poll_interval_secs: u64,
    pub poll_pause_secs: u64,
    pub options_cooldown_secs: u64,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let database_url = env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://trade.db?mode=rwc".to_string());

    let ig_base_url = env::var("IG_URL")
        .unwrap_or_else(|_| "https://demo-api.ig.com/gateway/deal".to_string());
    let ig_api_key = env::var("IG_TOKEN").unwrap_or_default();
    let ig_username = env::var("IG_USERNAME").unwrap_or_default();
    let ig_password = env::var("IG_PASSWORD").unwrap_or_default();

    let feed_timeout_secs = env::var("FEED_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10);

    let report_channel_id = env::var("REPORT_CHANNEL")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0);

    let reference_epic = env::var("REFERENCE_EPIC")
        .unwrap_or_else(|_| "IX.D.SPTRD.DAILY.IP".to_string());

    let underlying_query = env::var("UNDERLYING_QUERY")
        .unwrap_or_else(|_| "US 500".to_string());

    let poll_interval_secs = env::var("POLL_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(300);

    let poll_pause_secs = env::var("POLL_PAUSE_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(1);

    let options_cooldown_secs = env::var("OPTIONS_COOLDOWN_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(30);

    Settings {
        host,
        port,
        database_url,
        ig_base_url,
        ig_api_key,
        ig_username,
        ig_password,
        feed_timeout_secs,
        report_channel_id,
        reference_epic,
        underlying_query,
        poll_interval_secs,
        poll_pause_secs,
        options_cooldown_secs,
    }
}
