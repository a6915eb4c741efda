//! Mock [`TxProvider`] implementation for unit tests.
//!
//! Uses a builder pattern (`MockProvider::builder()`) to register canned
//! transactions, outspend lists, and address histories.

use std::collections::HashMap;

use async_trait::async_trait;
use bitcoin::Txid;

use super::types::{EsploraTx, Outspend};
use super::TxProvider;

/// A mock provider backed by `HashMap`s of canned responses. Anything not
/// registered behaves as not-found, which is exactly how the HTTP client
/// reports a failed fetch.
pub struct MockProvider {
    transactions: HashMap<Txid, EsploraTx>,
    outspends: HashMap<Txid, Vec<Outspend>>,
    address_txids: HashMap<String, Vec<Txid>>,
}

impl MockProvider {
    pub fn builder() -> MockProviderBuilder {
        MockProviderBuilder {
            transactions: HashMap::new(),
            outspends: HashMap::new(),
            address_txids: HashMap::new(),
        }
    }
}

/// Builder for configuring a [`MockProvider`] with canned data.
pub struct MockProviderBuilder {
    transactions: HashMap<Txid, EsploraTx>,
    outspends: HashMap<Txid, Vec<Outspend>>,
    address_txids: HashMap<String, Vec<Txid>>,
}

impl MockProviderBuilder {
    /// Register a transaction, keyed by its `txid`.
    pub fn with_tx(mut self, tx: EsploraTx) -> Self {
        self.transactions.insert(tx.txid, tx);
        self
    }

    /// Register the outspend list for a transaction.
    pub fn with_outspends(mut self, txid: Txid, outspends: Vec<Outspend>) -> Self {
        self.outspends.insert(txid, outspends);
        self
    }

    /// Register an address's recent transaction history.
    pub fn with_address(mut self, address: impl Into<String>, txids: Vec<Txid>) -> Self {
        self.address_txids.insert(address.into(), txids);
        self
    }

    pub fn build(self) -> MockProvider {
        MockProvider {
            transactions: self.transactions,
            outspends: self.outspends,
            address_txids: self.address_txids,
        }
    }
}

#[async_trait]
impl TxProvider for MockProvider {
    async fn fetch_tx(&self, txid: &Txid) -> Option<EsploraTx> {
        self.transactions.get(txid).cloned()
    }

    async fn fetch_outspends(&self, txid: &Txid) -> Option<Vec<Outspend>> {
        // A transaction known to the mock but without registered outspends
        // yields an all-unspent list, mirroring a real confirmed tx whose
        // outputs nobody has spent yet.
        if let Some(outspends) = self.outspends.get(txid) {
            return Some(outspends.clone());
        }
        self.transactions.get(txid).map(|tx| {
            tx.vout
                .iter()
                .map(|_| Outspend {
                    spent: false,
                    txid: None,
                })
                .collect()
        })
    }

    async fn fetch_address_txids(&self, address: &str, limit: usize) -> Vec<Txid> {
        self.address_txids
            .get(address)
            .map(|txids| txids.iter().take(limit).copied().collect())
            .unwrap_or_default()
    }
}
