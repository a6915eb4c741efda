//! Wire records for the Esplora HTTP JSON surface.
//!
//! These deserialize the relevant subset of `/tx/{txid}`,
//! `/tx/{txid}/outspends`, and `/address/{addr}/txs` responses. Fields the
//! pipeline does not consume are simply not declared.

use bitcoin::Txid;
use serde::Deserialize;

fn final_sequence() -> u32 {
    0xFFFF_FFFF
}

/// A transaction record from `GET /tx/{txid}`.
#[derive(Debug, Clone, Deserialize)]
pub struct EsploraTx {
    pub txid: Txid,
    #[serde(default)]
    pub vin: Vec<EsploraVin>,
    #[serde(default)]
    pub vout: Vec<EsploraVout>,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub weight: u64,
    #[serde(default)]
    pub status: EsploraStatus,
}

/// Confirmation status embedded in a transaction record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EsploraStatus {
    #[serde(default)]
    pub confirmed: bool,
    pub block_height: Option<u32>,
    pub block_time: Option<u64>,
}

/// A transaction input. Coinbase inputs carry `is_coinbase = true` and no
/// usable prevout.
#[derive(Debug, Clone, Deserialize)]
pub struct EsploraVin {
    pub txid: Option<Txid>,
    #[serde(default)]
    pub vout: u32,
    pub prevout: Option<EsploraPrevout>,
    #[serde(default)]
    pub is_coinbase: bool,
    #[serde(default = "final_sequence")]
    pub sequence: u32,
}

/// The spent output's metadata, embedded in each input.
#[derive(Debug, Clone, Deserialize)]
pub struct EsploraPrevout {
    pub scriptpubkey_address: Option<String>,
    #[serde(default)]
    pub value: u64,
    #[serde(default)]
    pub scriptpubkey_type: String,
}

/// A transaction output.
#[derive(Debug, Clone, Deserialize)]
pub struct EsploraVout {
    pub scriptpubkey_address: Option<String>,
    #[serde(default)]
    pub value: u64,
    #[serde(default)]
    pub scriptpubkey_type: String,
}

/// One entry of `GET /tx/{txid}/outspends`, indexed by vout.
#[derive(Debug, Clone, Deserialize)]
pub struct Outspend {
    #[serde(default)]
    pub spent: bool,
    pub txid: Option<Txid>,
}

/// The slice of `GET /address/{addr}/txs` entries the resolver needs.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressTx {
    pub txid: Txid,
}
