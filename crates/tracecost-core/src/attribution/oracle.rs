//! Remote entity oracles for attribution tiers 2 and 3.
//!
//! Both clients return `Result<Option<_>, CoreError>`: `Ok(None)` is a clean
//! miss, `Err` a transport or decode failure. The pipeline coerces errors to
//! misses, so a flaky oracle can never abort an analysis.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::CoreError;
use crate::limiter::RateLimiter;
use crate::types::{AttributionConfidence, AttributionResult, AttributionSource};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("reqwest client builder uses valid static config")
}

// ==============================================================================
// Cluster Oracle (Tier 2)
// ==============================================================================

/// Wallet-cluster lookup service. Heavily rate limited upstream (0.8 req/s),
/// which is why the attribution pass caps how many addresses it sends here.
pub struct ClusterOracle {
    http: reqwest::Client,
    base_url: String,
    caller: String,
    limiter: Arc<RateLimiter>,
}

/// Response shape varies across deployments of the cluster API: the match
/// flag arrives as `found` or `_found`, the label as `label` or
/// `wallet_name`. Both spellings are accepted, neither is normalized away.
#[derive(Debug, Deserialize)]
struct ClusterRecord {
    #[serde(default)]
    found: Option<bool>,
    #[serde(default, rename = "_found")]
    legacy_found: Option<bool>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    wallet_name: Option<String>,
}

impl ClusterOracle {
    pub const DEFAULT_URL: &'static str = "https://www.walletexplorer.com/api/1/address";

    pub fn new(
        base_url: impl Into<String>,
        caller: impl Into<String>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            http: build_http_client(),
            base_url: base_url.into(),
            caller: caller.into(),
            limiter,
        }
    }

    /// Look up the cluster label for an address.
    pub async fn lookup(&self, address: &str) -> Result<Option<String>, CoreError> {
        let _permit = self.limiter.acquire().await;

        debug!(%address, "cluster oracle lookup");
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("address", address), ("caller", self.caller.as_str())])
            .send()
            .await?
            .error_for_status()?;
        let record: ClusterRecord = response.json().await?;

        if record.found.unwrap_or(false) || record.legacy_found.unwrap_or(false) {
            Ok(record.label.or(record.wallet_name))
        } else {
            Ok(None)
        }
    }
}

// ==============================================================================
// Premium Oracle (Tier 3)
// ==============================================================================

/// Commercial intelligence API, enabled only when the caller supplies a key.
pub struct PremiumOracle {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    limiter: Arc<RateLimiter>,
}

#[derive(Debug, Deserialize)]
struct PremiumRecord {
    #[serde(default, rename = "arkhamEntity")]
    entity: Option<PremiumEntity>,
    #[serde(default, rename = "arkhamLabel")]
    label: Option<PremiumLabel>,
}

#[derive(Debug, Deserialize)]
struct PremiumEntity {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    entity_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PremiumLabel {
    #[serde(default)]
    name: Option<String>,
}

impl PremiumOracle {
    pub const DEFAULT_URL: &'static str = "https://api.arkhamintelligence.com/intelligence/address";

    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            http: build_http_client(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            limiter,
        }
    }

    /// Look up an address; entity name comes from `arkhamEntity.name` with
    /// `arkhamLabel.name` as fallback, the category from `arkhamEntity.type`.
    pub async fn lookup(&self, address: &str) -> Result<Option<AttributionResult>, CoreError> {
        let _permit = self.limiter.acquire().await;

        debug!(%address, "premium oracle lookup");
        let response = self
            .http
            .get(format!("{}/{address}", self.base_url))
            .header("API-Key", &self.api_key)
            .send()
            .await?
            .error_for_status()?;
        let record: PremiumRecord = response.json().await?;

        let entity_name = record
            .entity
            .as_ref()
            .and_then(|e| e.name.clone())
            .or_else(|| record.label.as_ref().and_then(|l| l.name.clone()))
            .filter(|name| !name.is_empty());
        let Some(entity) = entity_name else {
            return Ok(None);
        };

        let category = record
            .entity
            .as_ref()
            .and_then(|e| e.entity_type.clone())
            .unwrap_or_default()
            .to_lowercase();

        Ok(Some(AttributionResult {
            address: address.to_owned(),
            entity,
            source: AttributionSource::PremiumOracle,
            category,
            confidence: AttributionConfidence::Probable,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_record_accepts_both_found_spellings() {
        let current: ClusterRecord =
            serde_json::from_str(r#"{"found": true, "label": "Mt.Gox"}"#).unwrap();
        assert!(current.found.unwrap());
        assert_eq!(current.label.as_deref(), Some("Mt.Gox"));

        let legacy: ClusterRecord =
            serde_json::from_str(r#"{"_found": true, "wallet_name": "OldWallet"}"#).unwrap();
        assert!(legacy.legacy_found.unwrap());
        assert_eq!(legacy.wallet_name.as_deref(), Some("OldWallet"));
    }

    #[test]
    fn cluster_record_miss_parses() {
        let miss: ClusterRecord = serde_json::from_str(r#"{"found": false}"#).unwrap();
        assert!(!miss.found.unwrap());
        assert!(miss.label.is_none());
    }

    #[test]
    fn premium_record_prefers_entity_over_label() {
        let record: PremiumRecord = serde_json::from_str(
            r#"{
                "arkhamEntity": {"name": "Coinbase", "type": "CEX"},
                "arkhamLabel": {"name": "Coinbase Deposit"}
            }"#,
        )
        .unwrap();

        assert_eq!(
            record.entity.as_ref().and_then(|e| e.name.as_deref()),
            Some("Coinbase")
        );
        assert_eq!(
            record.entity.as_ref().and_then(|e| e.entity_type.as_deref()),
            Some("CEX")
        );
    }

    #[test]
    fn premium_record_falls_back_to_label() {
        let record: PremiumRecord =
            serde_json::from_str(r#"{"arkhamLabel": {"name": "Some Label"}}"#).unwrap();
        assert!(record.entity.is_none());
        assert_eq!(
            record.label.as_ref().and_then(|l| l.name.as_deref()),
            Some("Some Label")
        );
    }
}
