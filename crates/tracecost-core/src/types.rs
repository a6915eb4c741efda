//! Domain types for TraceCost's transaction-graph model.
//!
//! Contains the traversed transaction types (`GraphNode`, `TxInput`,
//! `TxOutput`), the graph result structure (`GraphResult`, `GraphEdge`),
//! traversal limits, and the attribution records shared across tiers.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use bitcoin::{Amount, Txid};
use serde::{Deserialize, Serialize};

/// Any non-coinbase input with a sequence below this sentinel signals
/// replace-by-fee. Both opt-in and full-RBF policy are reported the same way.
pub const RBF_SENTINEL: u32 = 0xFFFF_FFFE;

// ==============================================================================
// Script Type Classification
// ==============================================================================

/// Classifies an output script type, as reported by the Esplora
/// `scriptpubkey_type` tag. Detection happens provider-side; this crate only
/// maps the tag strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptType {
    P2pkh,
    P2sh,
    P2wpkh,
    P2wsh,
    P2tr,
    Unknown,
}

impl ScriptType {
    /// Map an Esplora `scriptpubkey_type` string to a [`ScriptType`].
    ///
    /// Total on its input: the five known tags map to their variant, every
    /// other tag (including future script classes) maps to `Unknown`.
    pub fn from_esplora(tag: &str) -> Self {
        match tag {
            "p2pkh" => Self::P2pkh,
            "p2sh" => Self::P2sh,
            "v0_p2wpkh" => Self::P2wpkh,
            "v0_p2wsh" => Self::P2wsh,
            "v1_p2tr" => Self::P2tr,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ScriptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::P2pkh => write!(f, "p2pkh"),
            Self::P2sh => write!(f, "p2sh"),
            Self::P2wpkh => write!(f, "p2wpkh"),
            Self::P2wsh => write!(f, "p2wsh"),
            Self::P2tr => write!(f, "p2tr"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ==============================================================================
// Traversal Configuration
// ==============================================================================

/// Which spending relationships the traversal follows from each node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Follow spent outputs to their spending transactions.
    Forward,
    /// Follow inputs back to their funding transactions.
    Backward,
    /// Both of the above.
    Both,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forward" => Ok(Self::Forward),
            "backward" => Ok(Self::Backward),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "invalid direction `{other}` (expected forward, backward, or both)"
            )),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Backward => write!(f, "backward"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// Configurable limits for graph traversal.
#[derive(Debug, Clone)]
pub struct TraversalLimits {
    /// Maximum BFS hops from the root transaction.
    pub max_depth: usize,
    /// Maximum transaction nodes to visit.
    pub node_limit: usize,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            max_depth: 5,
            node_limit: 500,
        }
    }
}

// ==============================================================================
// Transaction Types
// ==============================================================================

/// A single transaction input. For coinbase inputs `prev_txid` is `None`.
#[derive(Debug, Clone)]
pub struct TxInput {
    /// Funding transaction. `None` for coinbase inputs.
    pub prev_txid: Option<Txid>,
    pub prev_vout: u32,
    /// Address of the spent output; `None` when the prevout is unparseable.
    pub address: Option<String>,
    pub value: Amount,
    pub script_type: ScriptType,
}

/// A single transaction output, with outspend data merged in.
#[derive(Debug, Clone)]
pub struct TxOutput {
    /// `None` for OP_RETURN or unparseable scripts.
    pub address: Option<String>,
    pub value: Amount,
    pub script_type: ScriptType,
    pub spent: bool,
    pub spending_txid: Option<Txid>,
}

/// A node in the traversed graph. Each node is one transaction; addresses
/// appear as fields within its inputs and outputs.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub txid: Txid,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub fee: Amount,
    pub size: u64,
    pub weight: u64,
    /// Block timestamp (Unix epoch); `None` for unconfirmed transactions.
    pub block_time: Option<u64>,
    pub block_height: Option<u32>,
    /// BFS depth from the root transaction.
    pub depth: usize,
    pub is_coinbase: bool,
    /// True when any non-coinbase input's sequence is below [`RBF_SENTINEL`].
    pub rbf_signaled: bool,
    /// False when the provider fetch failed and this is a stub node.
    pub resolved: bool,
    /// Address → entity name, filled in by the attribution pass.
    pub attributed_entities: HashMap<String, String>,
}

impl GraphNode {
    /// A stub node recorded when the fetch failed on every provider.
    pub fn unresolved(txid: Txid, depth: usize) -> Self {
        Self {
            txid,
            inputs: Vec::new(),
            outputs: Vec::new(),
            fee: Amount::ZERO,
            size: 0,
            weight: 0,
            block_time: None,
            block_height: None,
            depth,
            is_coinbase: false,
            rbf_signaled: false,
            resolved: false,
            attributed_entities: HashMap::new(),
        }
    }
}

/// Directed edge linking two transactions via a spent output.
#[derive(Debug, Clone)]
pub struct GraphEdge {
    pub from_txid: Txid,
    pub to_txid: Txid,
    pub address: Option<String>,
    pub value: Amount,
    pub vout_index: u32,
}

// ==============================================================================
// Attribution Records
// ==============================================================================

/// Which attribution tier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionSource {
    Local,
    ClusterOracle,
    PremiumOracle,
}

impl std::fmt::Display for AttributionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::ClusterOracle => write!(f, "cluster_oracle"),
            Self::PremiumOracle => write!(f, "premium_oracle"),
        }
    }
}

/// How strongly an attribution ties an address to the named entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionConfidence {
    Confirmed,
    Probable,
    Cluster,
}

impl AttributionConfidence {
    /// Parse a stored confidence tag, defaulting to `Confirmed` — the store
    /// schema declares `confidence DEFAULT 'confirmed'`.
    pub fn from_store_tag(tag: &str) -> Self {
        match tag {
            "probable" => Self::Probable,
            "cluster" => Self::Cluster,
            _ => Self::Confirmed,
        }
    }
}

impl std::fmt::Display for AttributionConfidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirmed => write!(f, "confirmed"),
            Self::Probable => write!(f, "probable"),
            Self::Cluster => write!(f, "cluster"),
        }
    }
}

/// Attribution result for a single address from any source.
#[derive(Debug, Clone)]
pub struct AttributionResult {
    pub address: String,
    pub entity: String,
    pub source: AttributionSource,
    /// "exchange", "mining_pool", "service", "notable", ...; may be empty.
    pub category: String,
    pub confidence: AttributionConfidence,
}

/// Aggregate attribution statistics across all sources.
#[derive(Debug, Clone, Default)]
pub struct AttributionSummary {
    pub total_addresses: usize,
    pub attributed_count: usize,
    pub by_source: HashMap<AttributionSource, usize>,
    pub by_category: HashMap<String, usize>,
    pub coverage_rate: f64,
    pub sources_used: Vec<AttributionSource>,
}

// ==============================================================================
// Graph Result
// ==============================================================================

/// Complete result of a traversal, mutated in place by the attribution pass
/// and then only read by the complexity and cost stages.
#[derive(Debug, Clone)]
pub struct GraphResult {
    /// Original user input (txid or address).
    pub root_input: String,
    /// Resolved root transaction; `None` when the target was unresolvable.
    pub root_txid: Option<Txid>,
    pub nodes: HashMap<Txid, GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Union of all non-null addresses across resolved nodes.
    pub addresses_seen: HashSet<String>,
    pub max_depth_reached: usize,
    /// The depth the caller asked for.
    pub requested_max_depth: usize,
    pub node_limit_hit: bool,
    /// Count of nodes whose fetch failed on every provider.
    pub unresolved_count: usize,
    /// True when the target address has received funds but never spent.
    pub is_dormant: bool,
    pub dormancy_note: Option<String>,
    /// Addresses actually sent to the cluster oracle.
    pub cluster_queried: usize,
    /// Addresses still unmatched after the local store pass.
    pub cluster_unmatched: usize,
    pub warnings: Vec<String>,
    pub attribution_results: Vec<AttributionResult>,
    pub attribution_summary: Option<AttributionSummary>,
}

impl GraphResult {
    pub fn new(root_input: impl Into<String>, root_txid: Option<Txid>) -> Self {
        Self {
            root_input: root_input.into(),
            root_txid,
            nodes: HashMap::new(),
            edges: Vec::new(),
            addresses_seen: HashSet::new(),
            max_depth_reached: 0,
            requested_max_depth: 0,
            node_limit_hit: false,
            unresolved_count: 0,
            is_dormant: false,
            dormancy_note: None,
            cluster_queried: 0,
            cluster_unmatched: 0,
            warnings: Vec::new(),
            attribution_results: Vec::new(),
            attribution_summary: None,
        }
    }
}
