//! Blocking DataGolf client.
//!
//! Endpoint paths come from configuration; the API key comes from the
//! `DATAGOLF_API_KEY` environment variable. Every response is cached on
//! disk (see `http_cache`) with conservative pre-tournament TTLs.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde_json::Value;

use crate::config::DataGolfConfig;
use crate::http_cache::{cache_read, cache_write};

const SOURCE: &str = "datagolf";
const ATTEMPTS: u32 = 3;
const USER_AGENT_VALUE: &str = "tourcast (+local)";

pub struct DataGolfClient {
    client: Client,
    cfg: DataGolfConfig,
    api_key: String,
}

impl DataGolfClient {
    pub fn new(cfg: DataGolfConfig) -> Result<Self> {
        let api_key = std::env::var("DATAGOLF_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow!("DATAGOLF_API_KEY not set"))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("building http client")?;
        Ok(Self {
            client,
            cfg,
            api_key,
        })
    }

    pub fn fetch_schedule(&self, tour: &str, upcoming_only: bool, refresh: bool) -> Result<Value> {
        self.request(
            "schedule",
            &[
                ("tour", tour.to_string()),
                (
                    "upcoming_only",
                    if upcoming_only { "yes" } else { "no" }.to_string(),
                ),
            ],
            refresh,
        )
    }

    pub fn fetch_skill_ratings(&self, tour: &str) -> Result<Value> {
        self.request(
            "skill_ratings",
            &[("tour", tour.to_string()), ("display", "value".to_string())],
            false,
        )
    }

    pub fn fetch_player_decomp(&self, tour: &str) -> Result<Value> {
        self.request("player_decomp", &[("tour", tour.to_string())], false)
    }

    pub fn fetch_approach_skill(&self, tour: &str, period: &str) -> Result<Value> {
        self.request(
            "approach_skill",
            &[("tour", tour.to_string()), ("period", period.to_string())],
            false,
        )
    }

    pub fn fetch_pre_tournament(&self, event_id: i64, tour: &str, refresh: bool) -> Result<Value> {
        self.request(
            "pre_tournament",
            &[
                ("tour", tour.to_string()),
                ("event_id", event_id.to_string()),
                ("odds_format", "percent".to_string()),
            ],
            refresh,
        )
    }

    fn request(&self, endpoint_key: &str, params: &[(&str, String)], refresh: bool) -> Result<Value> {
        let endpoint = self
            .cfg
            .endpoints
            .get(endpoint_key)
            .ok_or_else(|| anyhow!("unknown endpoint key: {endpoint_key}"))?;

        let mut all_params: Vec<(String, String)> = self
            .cfg
            .defaults
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        all_params.extend(params.iter().map(|(k, v)| (k.to_string(), v.clone())));
        all_params.push(("key".to_string(), self.api_key.clone()));

        let ttl = endpoint_ttl(endpoint_key);
        if let Some(body) = cache_read(SOURCE, endpoint, &all_params, ttl, refresh) {
            if let Ok(payload) = serde_json::from_str::<Value>(&body) {
                log::debug!("datagolf cache hit: {endpoint_key}");
                return Ok(payload);
            }
        }

        let url = format!("{}{}", self.cfg.base_url.trim_end_matches('/'), endpoint);
        let mut last_err: Option<anyhow::Error> = None;
        for attempt in 1..=ATTEMPTS {
            match self.send(&url, &all_params) {
                Ok(body) => {
                    if let Err(err) = cache_write(SOURCE, endpoint, &all_params, &body) {
                        log::warn!("datagolf cache write failed: {err:#}");
                    }
                    log::info!("datagolf fetched: {endpoint_key}");
                    return serde_json::from_str(&body)
                        .with_context(|| format!("parsing {endpoint_key} payload"));
                }
                Err(FetchFailure::Http(err)) => return Err(err),
                Err(FetchFailure::Transient(err)) => {
                    last_err = Some(err);
                    if attempt < ATTEMPTS {
                        thread::sleep(Duration::from_millis(750 * attempt as u64));
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("datagolf request failed for {endpoint_key}")))
    }

    fn send(&self, url: &str, params: &[(String, String)]) -> std::result::Result<String, FetchFailure> {
        let resp = self
            .client
            .get(url)
            .query(params)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .send()
            .map_err(|e| FetchFailure::Transient(anyhow!("request failed: {e}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| FetchFailure::Transient(anyhow!("reading response body: {e}")))?;
        if !status.is_success() {
            let snippet: String = body.chars().take(300).collect();
            return Err(FetchFailure::Http(anyhow!("{url} -> {status}: {snippet}")));
        }
        Ok(body)
    }
}

/// Non-2xx responses abort immediately; transport errors retry.
enum FetchFailure {
    Http(anyhow::Error),
    Transient(anyhow::Error),
}

/// Conservative pre-tournament TTLs: the schedule barely moves, the
/// prediction feeds refresh a few times a day.
fn endpoint_ttl(endpoint_key: &str) -> Duration {
    if endpoint_key == "schedule" {
        Duration::from_secs(24 * 3600)
    } else {
        Duration::from_secs(6 * 3600)
    }
}
