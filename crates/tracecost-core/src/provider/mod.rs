//! Esplora provider abstraction layer.
//!
//! Defines the [`TxProvider`] trait the traversal engine consumes, the HTTP
//! implementation ([`EsploraClient`]), the primary/fallback pair
//! ([`FailoverApi`]), and a test mock (`mock::MockProvider`).

mod http;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use http::EsploraClient;

use std::num::NonZeroUsize;

use async_trait::async_trait;
use bitcoin::Txid;
use lru::LruCache;
use tokio::sync::Mutex;

use types::{EsploraTx, Outspend};

/// Number of fetched transactions kept in memory across a run. The visited
/// set already dedups BFS fetches; this mostly spares the re-fetch of a root
/// transaction that target resolution just validated.
const TX_CACHE_CAP: usize = 4096;

/// The provider operations the traversal engine needs.
///
/// All operations are best-effort and never fail: a missing transaction and
/// a transport failure both surface as `None` (or an empty txid list), and
/// the caller accounts for the gap quantitatively.
#[async_trait]
pub trait TxProvider: Send + Sync {
    /// Fetch a transaction record by txid.
    async fn fetch_tx(&self, txid: &Txid) -> Option<EsploraTx>;

    /// Fetch the per-output spend records for a transaction.
    async fn fetch_outspends(&self, txid: &Txid) -> Option<Vec<Outspend>>;

    /// Fetch up to `limit` recent txids for an address. Empty on failure.
    async fn fetch_address_txids(&self, address: &str, limit: usize) -> Vec<Txid>;
}

// ==============================================================================
// Failover Pair
// ==============================================================================

/// Primary provider with transparent fallback.
///
/// Every operation is attempted against the primary endpoint first; a
/// not-found result (for any reason) retries against the fallback. Both
/// endpoints speak the same Esplora surface, so the wire types are shared.
/// Fetched transactions are cached so the same txid is only requested once
/// per process.
pub struct FailoverApi {
    primary: EsploraClient,
    fallback: EsploraClient,
    tx_cache: Mutex<LruCache<Txid, EsploraTx>>,
}

impl FailoverApi {
    pub fn new(primary: EsploraClient, fallback: EsploraClient) -> Self {
        Self {
            primary,
            fallback,
            tx_cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(TX_CACHE_CAP).expect("TX_CACHE_CAP is non-zero"),
            )),
        }
    }
}

#[async_trait]
impl TxProvider for FailoverApi {
    async fn fetch_tx(&self, txid: &Txid) -> Option<EsploraTx> {
        if let Some(cached) = self.tx_cache.lock().await.get(txid) {
            return Some(cached.clone());
        }

        let mut fetched = self.primary.fetch_tx(txid).await;
        if fetched.is_none() {
            fetched = self.fallback.fetch_tx(txid).await;
        }

        if let Some(tx) = &fetched {
            self.tx_cache.lock().await.put(*txid, tx.clone());
        }
        fetched
    }

    async fn fetch_outspends(&self, txid: &Txid) -> Option<Vec<Outspend>> {
        match self.primary.fetch_outspends(txid).await {
            Some(outspends) => Some(outspends),
            None => self.fallback.fetch_outspends(txid).await,
        }
    }

    async fn fetch_address_txids(&self, address: &str, limit: usize) -> Vec<Txid> {
        if let Some(txids) = self.primary.fetch_address_txids(address, limit).await {
            return txids;
        }
        self.fallback
            .fetch_address_txids(address, limit)
            .await
            .unwrap_or_default()
    }
}
