use std::sync::Arc;
use std::time::Duration;

use bitcoin::Txid;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::error::CoreError;
use crate::limiter::RateLimiter;

use super::types::{AddressTx, EsploraTx, Outspend};

/// Per-request timeout for provider calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// TCP connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Back-off before the single retry after an HTTP 429.
const RATE_LIMITED_BACKOFF: Duration = Duration::from_secs(2);

/// Client for one Esplora-compatible HTTP endpoint.
///
/// Every request is guarded by the endpoint's [`RateLimiter`]. The public
/// fetch methods never fail: a 404, transport error, timeout, or decode
/// failure all degrade to "not found", logged at debug level. A 429 is
/// retried once after a fixed back-off.
pub struct EsploraClient {
    http: reqwest::Client,
    base_url: String,
    limiter: Arc<RateLimiter>,
}

impl EsploraClient {
    pub fn new(base_url: impl Into<String>, limiter: Arc<RateLimiter>) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client builder uses valid static config");

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            limiter,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a transaction record; `None` when missing or on any failure.
    pub async fn fetch_tx(&self, txid: &Txid) -> Option<EsploraTx> {
        match self.get_json::<EsploraTx>(&format!("/tx/{txid}")).await {
            Ok(tx) => tx,
            Err(err) => {
                debug!(%txid, base = %self.base_url, error = %err, "tx fetch failed");
                None
            }
        }
    }

    /// Fetch per-output spend records; `None` when missing or on any failure.
    pub async fn fetch_outspends(&self, txid: &Txid) -> Option<Vec<Outspend>> {
        match self
            .get_json::<Vec<Outspend>>(&format!("/tx/{txid}/outspends"))
            .await
        {
            Ok(outspends) => outspends,
            Err(err) => {
                debug!(%txid, base = %self.base_url, error = %err, "outspends fetch failed");
                None
            }
        }
    }

    /// Fetch up to `limit` recent txids for an address; `None` on any failure
    /// so the caller can distinguish "no history" from "endpoint down".
    pub async fn fetch_address_txids(&self, address: &str, limit: usize) -> Option<Vec<Txid>> {
        match self
            .get_json::<Vec<AddressTx>>(&format!("/address/{address}/txs"))
            .await
        {
            Ok(Some(txs)) => Some(txs.into_iter().take(limit).map(|tx| tx.txid).collect()),
            Ok(None) => None,
            Err(err) => {
                debug!(%address, base = %self.base_url, error = %err, "address txs fetch failed");
                None
            }
        }
    }

    /// GET a JSON document under the rate limiter. `Ok(None)` is a 404;
    /// `Err` covers transport, decode, and non-retryable status failures.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, CoreError> {
        let _permit = self.limiter.acquire().await;

        let url = format!("{}{path}", self.base_url);
        debug!(%url, "provider request");

        let mut response = self.http.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            trace!(%url, "provider returned 429, backing off");
            tokio::time::sleep(RATE_LIMITED_BACKOFF).await;
            response = self.http.get(&url).send().await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
        }

        let response = response.error_for_status()?;
        let decoded = response.json::<T>().await?;
        Ok(Some(decoded))
    }
}
