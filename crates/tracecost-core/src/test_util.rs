//! Shared test helpers for `tracecost-core` unit tests.
//!
//! Consolidates builder functions for Esplora wire records (`esplora_tx`,
//! `spending_vin`, ...) and domain types (`simple_node`, `make_graph`) so
//! tests across modules share one source of truth for dummy data.

use std::collections::HashMap;

use bitcoin::hashes::Hash;
use bitcoin::{Amount, Txid};

use crate::provider::types::{EsploraPrevout, EsploraStatus, EsploraTx, EsploraVin, EsploraVout, Outspend};
use crate::types::{GraphNode, GraphResult, ScriptType, TxInput, TxOutput};

// ==============================================================================
// Txid Helpers
// ==============================================================================

/// Create a deterministic `Txid` from a single distinguishing byte.
pub fn txid_from_byte(b: u8) -> Txid {
    let mut bytes = [0u8; 32];
    bytes[0] = b;
    Txid::from_byte_array(bytes)
}

// ==============================================================================
// Esplora Wire Record Builders
// ==============================================================================

/// Build a confirmed `EsploraTx` with sane defaults for test use.
pub fn esplora_tx(txid: Txid, vin: Vec<EsploraVin>, vout: Vec<EsploraVout>) -> EsploraTx {
    EsploraTx {
        txid,
        vin,
        vout,
        fee: 1000,
        size: 250,
        weight: 1000,
        status: EsploraStatus {
            confirmed: true,
            block_height: Some(800_000),
            block_time: Some(1_700_000_000),
        },
    }
}

/// A coinbase input (no prevout, final sequence).
pub fn coinbase_vin() -> EsploraVin {
    EsploraVin {
        txid: Some(Txid::from_byte_array([0u8; 32])),
        vout: 0xFFFF_FFFF,
        prevout: None,
        is_coinbase: true,
        sequence: 0xFFFF_FFFF,
    }
}

/// A spending input with a resolved prevout at `prev_txid:vout`.
pub fn spending_vin(prev_txid: Txid, vout: u32, address: &str, value: u64) -> EsploraVin {
    EsploraVin {
        txid: Some(prev_txid),
        vout,
        prevout: Some(EsploraPrevout {
            scriptpubkey_address: Some(address.to_owned()),
            value,
            scriptpubkey_type: "v0_p2wpkh".to_owned(),
        }),
        is_coinbase: false,
        sequence: 0xFFFF_FFFE,
    }
}

/// A P2WPKH output paying `value` sats to `address`.
pub fn esplora_vout(address: &str, value: u64) -> EsploraVout {
    EsploraVout {
        scriptpubkey_address: Some(address.to_owned()),
        value,
        scriptpubkey_type: "v0_p2wpkh".to_owned(),
    }
}

/// Outspend entry marking the output as spent by `txid`.
pub fn outspend_to(txid: Txid) -> Outspend {
    Outspend {
        spent: true,
        txid: Some(txid),
    }
}

/// Outspend entry for an unspent output.
pub fn unspent() -> Outspend {
    Outspend {
        spent: false,
        txid: None,
    }
}

// ==============================================================================
// Domain Type Builders (GraphNode, GraphResult)
// ==============================================================================

/// Build a resolved node with `n_inputs`/`n_outputs` at the given depth,
/// P2WPKH throughout, with deterministic per-node addresses.
pub fn simple_node(name: u8, n_inputs: usize, n_outputs: usize, depth: usize) -> GraphNode {
    node_with(name, n_inputs, n_outputs, depth, 50_000_000, ScriptType::P2wpkh)
}

/// Like [`simple_node`] with an explicit output value and script type.
pub fn node_with(
    name: u8,
    n_inputs: usize,
    n_outputs: usize,
    depth: usize,
    output_value: u64,
    script_type: ScriptType,
) -> GraphNode {
    let inputs = (0..n_inputs)
        .map(|i| TxInput {
            prev_txid: Some(txid_from_byte(name.wrapping_add(100))),
            prev_vout: i as u32,
            address: Some(format!("addr_in_{name}_{i}")),
            value: Amount::from_sat(output_value * n_outputs as u64),
            script_type,
        })
        .collect();
    let outputs = (0..n_outputs)
        .map(|i| TxOutput {
            address: Some(format!("addr_out_{name}_{i}")),
            value: Amount::from_sat(output_value),
            script_type,
            spent: false,
            spending_txid: None,
        })
        .collect();

    GraphNode {
        txid: txid_from_byte(name),
        inputs,
        outputs,
        fee: Amount::from_sat(1000),
        size: 250,
        weight: 1000,
        block_time: Some(1_700_000_000),
        block_height: Some(800_000),
        depth,
        is_coinbase: false,
        rbf_signaled: false,
        resolved: true,
        attributed_entities: HashMap::new(),
    }
}

/// An output with only an address and value, unspent, P2WPKH.
pub fn plain_output(address: &str, value: u64) -> TxOutput {
    TxOutput {
        address: Some(address.to_owned()),
        value: Amount::from_sat(value),
        script_type: ScriptType::P2wpkh,
        spent: false,
        spending_txid: None,
    }
}

/// Build a minimal `GraphResult` from a list of nodes: the first node is the
/// root, `addresses_seen` and `max_depth_reached` are derived.
pub fn make_graph(nodes: Vec<GraphNode>) -> GraphResult {
    let root_txid = nodes.first().map(|n| n.txid);
    let mut result = GraphResult::new("test", root_txid);
    result.max_depth_reached = nodes.iter().map(|n| n.depth).max().unwrap_or(0);
    for node in nodes {
        for input in &node.inputs {
            if let Some(addr) = &input.address {
                result.addresses_seen.insert(addr.clone());
            }
        }
        for output in &node.outputs {
            if let Some(addr) = &output.address {
                result.addresses_seen.insert(addr.clone());
            }
        }
        result.nodes.insert(node.txid, node);
    }
    result
}
