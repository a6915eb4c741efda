//! Graph complexity metrics and CoinJoin detection.
//!
//! Pure computation over a completed [`GraphResult`], no I/O and no async.
//! The output drives the cost model.

use std::collections::{HashMap, HashSet};

use bitcoin::{Amount, Txid};

use crate::types::{GraphNode, GraphResult, ScriptType};

/// Known CoinJoin denominations in satoshis: Wasabi v1 (0.1 BTC) plus the
/// Whirlpool/Ashigaru pool sizes.
const KNOWN_DENOMINATIONS: [Amount; 7] = [
    Amount::from_sat(10_000_000),
    Amount::from_sat(100_000),
    Amount::from_sat(1_000_000),
    Amount::from_sat(2_500_000),
    Amount::from_sat(5_000_000),
    Amount::from_sat(25_000_000),
    Amount::from_sat(50_000_000),
];

/// Below this output count a transaction is never flagged as CoinJoin.
const MIN_EQUAL_OUTPUTS_FOR_COINJOIN: usize = 5;

// ==============================================================================
// Metric Types
// ==============================================================================

/// Common Bitcoin transaction shapes, used to classify the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPattern {
    /// Many inputs merged into one or two outputs.
    Consolidation,
    /// The canonical payment + change pair.
    PeelChain,
    /// Batch payment: few inputs, many outputs.
    FanOut,
    /// Equal-value outputs breaking input/output linkability.
    Coinjoin,
    Simple,
}

impl TxPattern {
    /// Uppercase display label for terminal rendering.
    pub fn label(self) -> &'static str {
        match self {
            Self::Consolidation => "CONSOLIDATION",
            Self::PeelChain => "PEEL CHAIN",
            Self::FanOut => "FAN-OUT",
            Self::Coinjoin => "COINJOIN",
            Self::Simple => "SIMPLE",
        }
    }
}

impl std::fmt::Display for TxPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Consolidation => write!(f, "consolidation"),
            Self::PeelChain => write!(f, "peel_chain"),
            Self::FanOut => write!(f, "fan_out"),
            Self::Coinjoin => write!(f, "coinjoin"),
            Self::Simple => write!(f, "simple"),
        }
    }
}

/// Computed complexity metrics for a traversed graph.
#[derive(Debug, Clone)]
pub struct ComplexityMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub unique_addresses: usize,
    pub max_depth: usize,
    /// Mean and max outputs per resolved transaction (forward fan-out).
    pub avg_branch_factor: f64,
    pub max_branch_factor: usize,
    /// Mean and max inputs per resolved non-coinbase transaction.
    pub avg_fan_in: f64,
    pub max_fan_in: usize,
    pub attribution_rate: f64,
    pub attributed_addresses: usize,
    pub total_addresses: usize,
    /// Count of suspected CoinJoin transactions and their txids.
    pub mixing_signals: usize,
    pub mixing_txids: Vec<Txid>,
    pub coinjoin_detected: bool,
    pub taproot_ratio: f64,
    pub unresolved_paths: usize,
    /// Addresses checked against any attribution source.
    pub addresses_checked: usize,
    pub unattributed_addresses: usize,
    /// True when every available source was fully consulted.
    pub sources_exhausted: bool,
    pub root_pattern: Option<TxPattern>,
    /// e.g. "79-in → 1-out"
    pub root_pattern_detail: String,
    pub script_type_counts: HashMap<ScriptType, usize>,
    pub total_value: Amount,
}

impl ComplexityMetrics {
    /// Zeroed metrics for an empty graph.
    fn empty() -> Self {
        Self {
            node_count: 0,
            edge_count: 0,
            unique_addresses: 0,
            max_depth: 0,
            avg_branch_factor: 0.0,
            max_branch_factor: 0,
            avg_fan_in: 1.0,
            max_fan_in: 1,
            attribution_rate: 0.0,
            attributed_addresses: 0,
            total_addresses: 0,
            mixing_signals: 0,
            mixing_txids: Vec::new(),
            coinjoin_detected: false,
            taproot_ratio: 0.0,
            unresolved_paths: 0,
            addresses_checked: 0,
            unattributed_addresses: 0,
            sources_exhausted: false,
            root_pattern: None,
            root_pattern_detail: String::new(),
            script_type_counts: HashMap::new(),
            total_value: Amount::ZERO,
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

// ==============================================================================
// Metric Computation
// ==============================================================================

/// Compute all complexity metrics from a traversed graph.
///
/// Pure and deterministic: identical graphs produce identical metrics
/// regardless of call order. An empty graph yields zeroed metrics.
pub fn compute_complexity(graph: &GraphResult) -> ComplexityMetrics {
    if graph.nodes.is_empty() {
        return ComplexityMetrics::empty();
    }

    let nodes: Vec<&GraphNode> = graph.nodes.values().collect();
    let unique_addresses = graph.addresses_seen.len();

    // Branch factor over resolved nodes.
    let output_counts: Vec<usize> = nodes
        .iter()
        .filter(|n| n.resolved)
        .map(|n| n.outputs.len())
        .collect();
    let avg_branch = if output_counts.is_empty() {
        1.0
    } else {
        output_counts.iter().sum::<usize>() as f64 / output_counts.len() as f64
    };
    let max_branch = output_counts.iter().copied().max().unwrap_or(1);

    // Fan-in over resolved non-coinbase nodes.
    let input_counts: Vec<usize> = nodes
        .iter()
        .filter(|n| n.resolved && !n.is_coinbase)
        .map(|n| n.inputs.len())
        .collect();
    let avg_fan_in = if input_counts.is_empty() {
        1.0
    } else {
        input_counts.iter().sum::<usize>() as f64 / input_counts.len() as f64
    };
    let max_fan_in = input_counts.iter().copied().max().unwrap_or(1);

    // Attribution rate: distinct attributed addresses over addresses seen.
    let attributed: HashSet<&String> = nodes
        .iter()
        .flat_map(|n| n.attributed_entities.keys())
        .collect();
    let attributed_count = attributed.len();
    let attribution_rate = attributed_count as f64 / unique_addresses.max(1) as f64;

    // Coverage bookkeeping; prefer the attribution summary when present.
    let (addresses_checked, unattributed_addresses) = match &graph.attribution_summary {
        Some(summary) => (
            summary.total_addresses,
            summary.total_addresses - summary.attributed_count,
        ),
        None => (
            attributed_count + graph.cluster_queried,
            unique_addresses - attributed_count,
        ),
    };

    // CoinJoin detection per resolved node.
    let mut mixing_txids: Vec<Txid> = nodes
        .iter()
        .filter(|n| n.resolved && is_coinjoin(n))
        .map(|n| n.txid)
        .collect();
    mixing_txids.sort_unstable();
    let mixing_signals = mixing_txids.len();
    let coinjoin_detected = mixing_signals > 0;

    // Root transaction pattern.
    let root_node = graph.root_txid.and_then(|txid| graph.nodes.get(&txid));
    let (root_pattern, root_pattern_detail) = match root_node {
        Some(root) if root.resolved => {
            let root_is_coinjoin = coinjoin_detected && mixing_txids.contains(&root.txid);
            let (pattern, detail) = classify_tx_pattern(root, root_is_coinjoin);
            (Some(pattern), detail)
        }
        _ => (None, String::new()),
    };

    // Taproot ratio and script breakdown over addressed inputs/outputs.
    let mut script_types: Vec<ScriptType> = Vec::new();
    for node in nodes.iter().filter(|n| n.resolved) {
        for input in &node.inputs {
            if input.address.is_some() {
                script_types.push(input.script_type);
            }
        }
        for output in &node.outputs {
            if output.address.is_some() {
                script_types.push(output.script_type);
            }
        }
    }
    let taproot_count = script_types
        .iter()
        .filter(|st| **st == ScriptType::P2tr)
        .count();
    let taproot_ratio = if script_types.is_empty() {
        0.0
    } else {
        taproot_count as f64 / script_types.len() as f64
    };
    let mut script_type_counts: HashMap<ScriptType, usize> = HashMap::new();
    for st in &script_types {
        *script_type_counts.entry(*st).or_insert(0) += 1;
    }

    let unresolved = nodes.iter().filter(|n| !n.resolved).count();

    let total_value = nodes
        .iter()
        .filter(|n| n.resolved)
        .flat_map(|n| n.outputs.iter())
        .fold(Amount::ZERO, |acc, out| {
            acc.checked_add(out.value).unwrap_or(Amount::MAX_MONEY)
        });

    // Exhausted when the cluster oracle was not capped; covers the skipped
    // case where both counters are zero.
    let sources_exhausted = graph.cluster_queried >= graph.cluster_unmatched;

    ComplexityMetrics {
        node_count: nodes.len(),
        edge_count: graph.edges.len(),
        unique_addresses,
        max_depth: graph.max_depth_reached,
        avg_branch_factor: round2(avg_branch),
        max_branch_factor: max_branch,
        avg_fan_in: round2(avg_fan_in),
        max_fan_in,
        attribution_rate: round4(attribution_rate),
        attributed_addresses: attributed_count,
        total_addresses: unique_addresses,
        mixing_signals,
        mixing_txids,
        coinjoin_detected,
        taproot_ratio: round4(taproot_ratio),
        unresolved_paths: unresolved,
        addresses_checked,
        unattributed_addresses,
        sources_exhausted,
        root_pattern,
        root_pattern_detail,
        script_type_counts,
        total_value,
    }
}

// ==============================================================================
// CoinJoin Detection
// ==============================================================================

/// Whether a transaction looks like a CoinJoin.
///
/// Checks, in order, with the output-count shortcut applied first:
/// 1. three or more outputs at a known mixer denomination;
/// 2. a dominant equal-value group (5+ outputs, over half of all outputs),
///    which excludes exchange batch payments with many distinct amounts;
/// 3. three or more distinct values each repeated 3+ times (Wasabi-v2 style
///    multi-denomination rounds).
///
/// Zero-value outputs (OP_RETURN) are ignored throughout.
fn is_coinjoin(node: &GraphNode) -> bool {
    let outputs = &node.outputs;
    if outputs.len() < MIN_EQUAL_OUTPUTS_FOR_COINJOIN {
        return false;
    }

    let mut value_counts: HashMap<Amount, usize> = HashMap::new();
    for output in outputs {
        if output.value > Amount::ZERO {
            *value_counts.entry(output.value).or_insert(0) += 1;
        }
    }
    if value_counts.is_empty() {
        return false;
    }

    // Check 1: known denomination match.
    for (value, count) in &value_counts {
        if *count >= 3 && KNOWN_DENOMINATIONS.contains(value) {
            return true;
        }
    }

    // Check 2: dominant equal-value group at any denomination.
    let most_common_count = value_counts.values().copied().max().unwrap_or(0);
    if most_common_count >= MIN_EQUAL_OUTPUTS_FOR_COINJOIN {
        let equal_ratio = most_common_count as f64 / outputs.len() as f64;
        if equal_ratio > 0.5 {
            return true;
        }
    }

    // Check 3: several equal-value groups across denominations.
    let equal_groups = value_counts.values().filter(|count| **count >= 3).count();
    if equal_groups >= 3 {
        return true;
    }

    false
}

/// Classify a transaction into a common shape. The CoinJoin flag overrides
/// the structural checks; ties resolve in declaration order.
fn classify_tx_pattern(node: &GraphNode, is_coinjoin: bool) -> (TxPattern, String) {
    let n_in = node.inputs.len();
    let n_out = node.outputs.len();
    let detail = format!("{n_in}-in \u{2192} {n_out}-out");

    let pattern = if is_coinjoin {
        TxPattern::Coinjoin
    } else if n_in >= 5 && n_out <= 2 {
        TxPattern::Consolidation
    } else if n_in <= 2 && n_out == 2 {
        TxPattern::PeelChain
    } else if n_in <= 3 && n_out >= 5 {
        TxPattern::FanOut
    } else {
        TxPattern::Simple
    };

    (pattern, detail)
}

// ==============================================================================
// Tests
// ==============================================================================
