use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::Settings;
use crate::error::OptWatchError;

/// One instrument's bid/offer at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub name: String,
    pub expiry: String,
    pub bid: f64,
    pub offer: f64,
}

/// One row of a market search.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentQuote {
    pub epic: String,
    pub expiry: String,
    pub bid: f64,
    pub instrument_name: String,
}

/// Seam over the quoting service so the monitor and the options chain
/// can run against scripted responses in tests.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn snapshot(&self, epic: &str) -> Result<PriceSnapshot, OptWatchError>;
    async fn search(&self, query: &str) -> Result<Vec<InstrumentQuote>, OptWatchError>;
}

/// IG REST client. Logs in once at startup; the session tokens from the
/// login response ride along on every later call.
pub struct IgFeedClient {
    http: Client,
    base_url: String,
    api_key: String,
    cst: String,
    security_token: String,
}

impl IgFeedClient {
    pub async fn login(settings: &Settings) -> Result<Self, OptWatchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.feed_timeout_secs))
            .build()?;

        let res = http
            .post(format!("{}/session", settings.ig_base_url))
            .header("X-IG-API-KEY", &settings.ig_api_key)
            .header("version", "2")
            .json(&json!({
                "identifier": settings.ig_username,
                "password": settings.ig_password,
            }))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(OptWatchError::Feed(format!("IG login failed: {status} {body}")));
        }

        let cst = header_string(&res, "CST")?;
        let security_token = header_string(&res, "X-SECURITY-TOKEN")?;

        Ok(Self {
            http,
            base_url: settings.ig_base_url.clone(),
            api_key: settings.ig_api_key.clone(),
            cst,
            security_token,
        })
    }
}

fn header_string(res: &reqwest::Response, name: &str) -> Result<String, OptWatchError> {
    res.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| OptWatchError::Feed(format!("missing {name} header in session response")))
}

#[async_trait]
impl PriceFeed for IgFeedClient {
    async fn snapshot(&self, epic: &str) -> Result<PriceSnapshot, OptWatchError> {
        let res = self
            .http
            .get(format!("{}/markets/{}", self.base_url, epic))
            .header("X-IG-API-KEY", &self.api_key)
            .header("CST", &self.cst)
            .header("X-SECURITY-TOKEN", &self.security_token)
            .header("version", "2")
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(OptWatchError::Feed(format!("market lookup failed: {status} {body}")));
        }

        let details = res.json::<MarketDetails>().await?;

        Ok(PriceSnapshot {
            name: details.instrument.name,
            expiry: details.instrument.expiry,
            bid: details.snapshot.bid,
            offer: details.snapshot.offer,
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<InstrumentQuote>, OptWatchError> {
        let res = self
            .http
            .get(format!("{}/markets", self.base_url))
            .query(&[("searchTerm", query)])
            .header("X-IG-API-KEY", &self.api_key)
            .header("CST", &self.cst)
            .header("X-SECURITY-TOKEN", &self.security_token)
            .header("version", "1")
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(OptWatchError::Feed(format!("market search failed: {status} {body}")));
        }

        let body = res.json::<SearchResponse>().await?;

        Ok(body
            .markets
            .into_iter()
            .map(|m| InstrumentQuote {
                epic: m.epic,
                expiry: m.expiry,
                bid: m.bid,
                instrument_name: m.instrument_name,
            })
            .collect())
    }
}

// ---------------- Wire types ----------------

#[derive(Debug, Deserialize)]
struct MarketDetails {
    instrument: InstrumentDetails,
    snapshot: MarketSnapshot,
}

#[derive(Debug, Deserialize)]
struct InstrumentDetails {
    name: String,
    expiry: String,
}

#[derive(Debug, Deserialize)]
struct MarketSnapshot {
    bid: f64,
    offer: f64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    markets: Vec<MarketResult>,
}

#[derive(Debug, Deserialize)]
struct MarketResult {
    epic: String,
    expiry: String,
    bid: f64,

    #[serde(rename = "instrumentName")]
    instrument_name: String,
}
