// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::{path::Path, time::Duration};
use tokio::{fs, time::sleep};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::FetchConfig;

/// HTTP client with the configured timeout and user agent.
pub fn build_client(cfg: &FetchConfig) -> Result<Client> {
    Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .cookie_store(true)
        .gzip(true)
        .build()
        .context("building HTTP client")
}

async fn get_text_core(client: &Client, url: &Url) -> Result<String> {
    debug!("Fetching text from {}", url);
    client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .text()
        .await
        .with_context(|| format!("Reading text from {}", url))
}

/// Delay before retry number `attempt` (1-based): doubles each time.
fn backoff_delay(initial_ms: u64, attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_millis(initial_ms.saturating_mul(factor))
}

/// GET `url` as text, retrying failed attempts with exponential backoff.
#[instrument(level = "info", skip(client, cfg), fields(%url))]
pub async fn fetch_page(client: &Client, url: &Url, cfg: &FetchConfig) -> Result<String> {
    let mut attempts = 0;
    loop {
        match get_text_core(client, url).await {
            Ok(body) => {
                info!(bytes = body.len(), "page fetched");
                return Ok(body);
            }
            Err(e) if attempts < cfg.max_retries => {
                attempts += 1;
                let delay = backoff_delay(cfg.backoff_ms, attempts);
                warn!(attempt = attempts, delay_ms = delay.as_millis() as u64, error = %e, "Retrying");
                sleep(delay).await;
            }
            Err(e) => {
                error!(error = %e, "Exhausted retries");
                return Err(e);
            }
        }
    }
}

/// Load a saved copy of the page instead of fetching it.
pub async fn read_page<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let body = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading page {:?}", path))?;
    info!(?path, bytes = body.len(), "page loaded from file");
    Ok(body)
}
