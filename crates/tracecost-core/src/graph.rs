//! Concurrent BFS traversal of the Bitcoin transaction graph.
//!
//! Starting from an address or txid, a fixed pool of worker tasks expands
//! the graph breadth-first against the rate-limited provider pair, bounded
//! by depth and node limits. The traversal is best-effort: a failed fetch
//! becomes an unresolved stub node, never an aborted run.

use std::collections::{HashMap, HashSet, VecDeque};

use bitcoin::{Amount, Txid};
use futures::future::join_all;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, warn};

use crate::provider::types::{EsploraTx, Outspend};
use crate::provider::TxProvider;
use crate::types::{
    Direction, GraphEdge, GraphNode, GraphResult, ScriptType, TraversalLimits, TxInput, TxOutput,
    RBF_SENTINEL,
};

/// Fixed size of the traversal worker pool.
const NUM_WORKERS: usize = 5;

/// How many recent txids to pull when resolving an address target.
const ADDRESS_HISTORY_LIMIT: usize = 25;

// ==============================================================================
// Traversal
// ==============================================================================

/// Traverse the transaction graph via concurrent BFS.
///
/// Resolves `target` (address or 64-char hex txid) to a root transaction,
/// then expands the graph in the requested direction until `limits` are
/// reached. An unresolvable target yields a graph with no root and a single
/// warning rather than an error.
pub async fn build_graph(
    provider: &dyn TxProvider,
    target: &str,
    limits: &TraversalLimits,
    direction: Direction,
) -> GraphResult {
    let target = target.trim();

    let Some(root_txid) = resolve_target(provider, target).await else {
        let mut result = GraphResult::new(target, None);
        result.requested_max_depth = limits.max_depth;
        result.warnings.push(format!("Could not resolve target: {target}"));
        return result;
    };

    let mut result = GraphResult::new(target, Some(root_txid));
    result.requested_max_depth = limits.max_depth;

    let result = Mutex::new(result);
    let scheduler = Scheduler::seeded(root_txid);

    let workers = (0..NUM_WORKERS)
        .map(|_| worker(provider, &scheduler, &result, limits, direction))
        .collect::<Vec<_>>();
    join_all(workers).await;

    let mut result = result.into_inner();
    result.node_limit_hit = scheduler.state.into_inner().limit_hit;

    result.edges = build_edges(&result);
    detect_dormancy(&mut result, target);

    debug!(
        nodes = result.nodes.len(),
        edges = result.edges.len(),
        max_depth = result.max_depth_reached,
        unresolved = result.unresolved_count,
        "traversal complete"
    );

    result
}

/// One traversal worker: pull a job, fetch and install the node, expand the
/// frontier, repeat until the scheduler reports global quiescence.
async fn worker(
    provider: &dyn TxProvider,
    scheduler: &Scheduler,
    result: &Mutex<GraphResult>,
    limits: &TraversalLimits,
    direction: Direction,
) {
    while let Some((txid, depth)) = scheduler.next_job().await {
        let Some(tx) = provider.fetch_tx(&txid).await else {
            warn!(%txid, depth, "fetch failed on all providers, recording stub node");
            {
                let mut result = result.lock().await;
                result.nodes.insert(txid, GraphNode::unresolved(txid, depth));
                result.unresolved_count += 1;
            }
            scheduler.finish_job(Vec::new(), 0, limits.node_limit).await;
            continue;
        };

        // Outspends drive forward expansion; backward-only traversals skip
        // the extra request entirely.
        let outspends = match direction {
            Direction::Forward | Direction::Both => provider.fetch_outspends(&txid).await,
            Direction::Backward => None,
        };

        let node = parse_node(&tx, depth, outspends.as_deref());
        let neighbors = if depth < limits.max_depth {
            node_neighbors(&node, direction)
        } else {
            Vec::new()
        };

        {
            let mut result = result.lock().await;
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
            if depth > result.max_depth_reached {
                result.max_depth_reached = depth;
            }
            result.nodes.insert(txid, node);
        }

        scheduler.finish_job(neighbors, depth + 1, limits.node_limit).await;
    }
}

// ==============================================================================
// Work Scheduling
// ==============================================================================

/// Shared BFS frontier with structured quiescence detection.
///
/// A worker that finds the queue empty exits only when no other worker is
/// mid-job; otherwise it parks on the `Notify` and rechecks after the next
/// job completion. This closes the race between "queue looks empty" and
/// "another worker is about to enqueue".
struct Scheduler {
    state: Mutex<Frontier>,
    wake: Notify,
}

struct Frontier {
    queue: VecDeque<(Txid, usize)>,
    visited: HashSet<Txid>,
    active: usize,
    limit_hit: bool,
}

impl Scheduler {
    fn seeded(root_txid: Txid) -> Self {
        Self {
            state: Mutex::new(Frontier {
                queue: VecDeque::from([(root_txid, 0)]),
                visited: HashSet::from([root_txid]),
                active: 0,
                limit_hit: false,
            }),
            wake: Notify::new(),
        }
    }

    /// Pull the next `(txid, depth)` job, or `None` once the traversal has
    /// quiesced (empty queue, no active workers).
    async fn next_job(&self) -> Option<(Txid, usize)> {
        loop {
            // Register with the Notify before inspecting the queue, so a
            // notification between unlock and park cannot be lost.
            let mut parked = std::pin::pin!(self.wake.notified());
            parked.as_mut().enable();
            {
                let mut state = self.state.lock().await;
                if let Some(job) = state.queue.pop_front() {
                    state.active += 1;
                    return Some(job);
                }
                if state.active == 0 {
                    // Release every parked worker so they observe quiescence.
                    self.wake.notify_waiters();
                    return None;
                }
            }
            parked.await;
        }
    }

    /// Mark the current job done and enqueue its not-yet-visited neighbors at
    /// `depth`, respecting the node limit.
    async fn finish_job(&self, neighbors: Vec<Txid>, depth: usize, node_limit: usize) {
        {
            let mut state = self.state.lock().await;
            for txid in neighbors {
                if state.visited.len() >= node_limit {
                    break;
                }
                if state.visited.insert(txid) {
                    state.queue.push_back((txid, depth));
                }
            }
            if state.visited.len() >= node_limit {
                state.limit_hit = true;
            }
            state.active -= 1;
        }
        self.wake.notify_waiters();
    }
}

// ==============================================================================
// Target Resolution
// ==============================================================================

/// A 64-character hex string is treated as a txid.
fn is_txid_pattern(target: &str) -> bool {
    target.len() == 64 && target.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Base58 / Bech32 mainnet address shape: `1...`, `3...`, or `bc1...` with an
/// alphanumeric body of 25–62 characters after the prefix.
fn is_address_pattern(target: &str) -> bool {
    let body = if let Some(rest) = target.strip_prefix("bc1") {
        rest
    } else if let Some(rest) = target.strip_prefix('1').or_else(|| target.strip_prefix('3')) {
        rest
    } else {
        return false;
    };
    (25..=62).contains(&body.len()) && body.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Resolve a user-provided target to a root txid: validate a txid by
/// fetching it, or take an address's most recent transaction.
async fn resolve_target(provider: &dyn TxProvider, target: &str) -> Option<Txid> {
    if is_txid_pattern(target) {
        let txid: Txid = target.parse().ok()?;
        return provider.fetch_tx(&txid).await.map(|_| txid);
    }

    if is_address_pattern(target) {
        let txids = provider
            .fetch_address_txids(target, ADDRESS_HISTORY_LIMIT)
            .await;
        return txids.first().copied();
    }

    None
}

// ==============================================================================
// Parsing
// ==============================================================================

/// Convert an Esplora transaction record into a [`GraphNode`], merging the
/// outspend list (when present) into the outputs by index.
fn parse_node(tx: &EsploraTx, depth: usize, outspends: Option<&[Outspend]>) -> GraphNode {
    let is_coinbase = tx.vin.iter().any(|vin| vin.is_coinbase);
    let rbf_signaled = tx
        .vin
        .iter()
        .filter(|vin| !vin.is_coinbase)
        .any(|vin| vin.sequence < RBF_SENTINEL);

    let inputs = tx
        .vin
        .iter()
        .map(|vin| TxInput {
            prev_txid: if vin.is_coinbase { None } else { vin.txid },
            prev_vout: vin.vout,
            address: vin
                .prevout
                .as_ref()
                .and_then(|p| p.scriptpubkey_address.clone()),
            value: Amount::from_sat(vin.prevout.as_ref().map_or(0, |p| p.value)),
            script_type: ScriptType::from_esplora(
                vin.prevout.as_ref().map_or("", |p| &p.scriptpubkey_type),
            ),
        })
        .collect();

    let outputs = tx
        .vout
        .iter()
        .enumerate()
        .map(|(i, vout)| {
            let outspend = outspends.and_then(|list| list.get(i));
            let spent = outspend.is_some_and(|os| os.spent);
            TxOutput {
                address: vout.scriptpubkey_address.clone(),
                value: Amount::from_sat(vout.value),
                script_type: ScriptType::from_esplora(&vout.scriptpubkey_type),
                spent,
                spending_txid: if spent {
                    outspend.and_then(|os| os.txid)
                } else {
                    None
                },
            }
        })
        .collect();

    GraphNode {
        txid: tx.txid,
        inputs,
        outputs,
        fee: Amount::from_sat(tx.fee),
        size: tx.size,
        weight: tx.weight,
        block_time: tx.status.block_time,
        block_height: tx.status.block_height,
        depth,
        is_coinbase,
        rbf_signaled,
        resolved: true,
        attributed_entities: HashMap::new(),
    }
}

// ==============================================================================
// Traversal Helpers
// ==============================================================================

/// Neighbor txids of a node for the given traversal direction.
fn node_neighbors(node: &GraphNode, direction: Direction) -> Vec<Txid> {
    let mut neighbors = Vec::new();

    if matches!(direction, Direction::Forward | Direction::Both) {
        for output in &node.outputs {
            if output.spent {
                if let Some(spender) = output.spending_txid {
                    neighbors.push(spender);
                }
            }
        }
    }

    if matches!(direction, Direction::Backward | Direction::Both) && !node.is_coinbase {
        for input in &node.inputs {
            if let Some(prev) = input.prev_txid {
                neighbors.push(prev);
            }
        }
    }

    neighbors
}

/// Build the edge list from resolved nodes' spent outputs whose spending
/// transaction is also part of the node set.
fn build_edges(result: &GraphResult) -> Vec<GraphEdge> {
    let mut edges = Vec::new();
    for node in result.nodes.values() {
        if !node.resolved {
            continue;
        }
        for (i, output) in node.outputs.iter().enumerate() {
            let Some(spender) = output.spending_txid.filter(|_| output.spent) else {
                continue;
            };
            if result.nodes.contains_key(&spender) {
                edges.push(GraphEdge {
                    from_txid: node.txid,
                    to_txid: spender,
                    address: output.address.clone(),
                    value: output.value,
                    vout_index: i as u32,
                });
            }
        }
    }
    edges
}

/// Flag an address target that has received funds but never spent: traversal
/// stayed at depth 0 and no resolved node lists the target as an input.
fn detect_dormancy(result: &mut GraphResult, target: &str) {
    if !is_address_pattern(target) || result.max_depth_reached != 0 {
        return;
    }

    let spent_from_target = result.nodes.values().any(|node| {
        node.resolved
            && node
                .inputs
                .iter()
                .any(|input| input.address.as_deref() == Some(target))
    });

    if !spent_from_target {
        result.is_dormant = true;
        result.dormancy_note = Some(
            "No outgoing transactions found. This address has received funds \
             but never spent. Nothing to trace."
                .to_owned(),
        );
    }
}

// ==============================================================================
// Tests
// ==============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;
    use crate::test_util::*;

    // 42-character bech32-shaped mainnet address.
    const TEST_ADDRESS: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";

    fn limits(max_depth: usize, node_limit: usize) -> TraversalLimits {
        TraversalLimits {
            max_depth,
            node_limit,
        }
    }

    /// coinbase-less chain a -> b -> c where each tx's single output is
    /// spent by the next.
    fn chain_provider() -> (MockProvider, Txid, Txid, Txid) {
        let txid_a = txid_from_byte(1);
        let txid_b = txid_from_byte(2);
        let txid_c = txid_from_byte(3);

        let tx_a = esplora_tx(
            txid_a,
            vec![coinbase_vin()],
            vec![esplora_vout("addr_a", 5000)],
        );
        let tx_b = esplora_tx(
            txid_b,
            vec![spending_vin(txid_a, 0, "addr_a", 5000)],
            vec![esplora_vout("addr_b", 4000)],
        );
        let tx_c = esplora_tx(
            txid_c,
            vec![spending_vin(txid_b, 0, "addr_b", 4000)],
            vec![esplora_vout("addr_c", 3000)],
        );

        let provider = MockProvider::builder()
            .with_tx(tx_a)
            .with_tx(tx_b)
            .with_tx(tx_c)
            .with_outspends(txid_a, vec![outspend_to(txid_b)])
            .with_outspends(txid_b, vec![outspend_to(txid_c)])
            .with_outspends(txid_c, vec![unspent()])
            .build();

        (provider, txid_a, txid_b, txid_c)
    }

    #[tokio::test]
    async fn forward_chain_traverses_to_tip() {
        let (provider, txid_a, txid_b, txid_c) = chain_provider();

        let graph = build_graph(
            &provider,
            &txid_a.to_string(),
            &limits(5, 500),
            Direction::Forward,
        )
        .await;

        assert_eq!(graph.root_txid, Some(txid_a));
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.max_depth_reached, 2);
        assert_eq!(graph.requested_max_depth, 5);
        assert!(!graph.node_limit_hit);
        assert_eq!(graph.unresolved_count, 0);

        // a->b and b->c edges; both endpoints present in the node map.
        assert_eq!(graph.edges.len(), 2);
        for edge in &graph.edges {
            assert!(graph.nodes.contains_key(&edge.from_txid));
            assert!(graph.nodes.contains_key(&edge.to_txid));
        }
        assert!(graph
            .edges
            .iter()
            .any(|e| e.from_txid == txid_a && e.to_txid == txid_b));
        assert!(graph
            .edges
            .iter()
            .any(|e| e.from_txid == txid_b && e.to_txid == txid_c));
    }

    #[tokio::test]
    async fn addresses_seen_covers_inputs_and_outputs() {
        let (provider, txid_a, _, _) = chain_provider();

        let graph = build_graph(
            &provider,
            &txid_a.to_string(),
            &limits(5, 500),
            Direction::Forward,
        )
        .await;

        for addr in ["addr_a", "addr_b", "addr_c"] {
            assert!(graph.addresses_seen.contains(addr), "missing {addr}");
        }
    }

    #[tokio::test]
    async fn depth_limit_stops_expansion() {
        let (provider, txid_a, _, _) = chain_provider();

        let graph = build_graph(
            &provider,
            &txid_a.to_string(),
            &limits(1, 500),
            Direction::Forward,
        )
        .await;

        // a (depth 0) and b (depth 1); c would be depth 2.
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.max_depth_reached, 1);
    }

    #[tokio::test]
    async fn node_limit_stops_expansion_and_sets_flag() {
        let (provider, txid_a, _, _) = chain_provider();

        let graph = build_graph(
            &provider,
            &txid_a.to_string(),
            &limits(5, 2),
            Direction::Forward,
        )
        .await;

        assert_eq!(graph.nodes.len(), 2);
        assert!(graph.node_limit_hit);
    }

    #[tokio::test]
    async fn backward_traversal_follows_inputs() {
        let (provider, txid_a, _, txid_c) = chain_provider();

        let graph = build_graph(
            &provider,
            &txid_c.to_string(),
            &limits(5, 500),
            Direction::Backward,
        )
        .await;

        assert_eq!(graph.nodes.len(), 3);
        assert!(graph.nodes.contains_key(&txid_a));
        // Backward traversal fetches no outspends, so no edges are derived.
        assert!(graph.edges.is_empty());
    }

    #[tokio::test]
    async fn both_direction_unions_neighbors() {
        let (provider, txid_a, txid_b, txid_c) = chain_provider();

        let graph = build_graph(
            &provider,
            &txid_b.to_string(),
            &limits(1, 500),
            Direction::Both,
        )
        .await;

        // One hop in each direction from b.
        assert!(graph.nodes.contains_key(&txid_a));
        assert!(graph.nodes.contains_key(&txid_b));
        assert!(graph.nodes.contains_key(&txid_c));
    }

    #[tokio::test]
    async fn backward_stops_at_coinbase() {
        let (provider, txid_a, _, _) = chain_provider();

        let graph = build_graph(
            &provider,
            &txid_a.to_string(),
            &limits(5, 500),
            Direction::Backward,
        )
        .await;

        // tx_a is a coinbase: nothing to follow backward.
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.nodes[&txid_a].is_coinbase);
    }

    #[tokio::test]
    async fn failed_fetch_becomes_stub_node() {
        let txid_a = txid_from_byte(1);
        let missing = txid_from_byte(9);

        let tx_a = esplora_tx(
            txid_a,
            vec![coinbase_vin()],
            vec![esplora_vout("addr_a", 5000)],
        );
        let provider = MockProvider::builder()
            .with_tx(tx_a)
            .with_outspends(txid_a, vec![outspend_to(missing)])
            .build();

        let graph = build_graph(
            &provider,
            &txid_a.to_string(),
            &limits(5, 500),
            Direction::Forward,
        )
        .await;

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.unresolved_count, 1);
        let stub = &graph.nodes[&missing];
        assert!(!stub.resolved);
        assert_eq!(stub.depth, 1);
        // a's spent output points at the stub, which is in the node map.
        assert_eq!(graph.edges.len(), 1);
    }

    #[tokio::test]
    async fn unresolvable_target_returns_empty_graph_with_warning() {
        let provider = MockProvider::builder().build();

        let graph = build_graph(
            &provider,
            "definitely-not-a-target",
            &limits(5, 500),
            Direction::Forward,
        )
        .await;

        assert!(graph.root_txid.is_none());
        assert!(graph.nodes.is_empty());
        assert_eq!(graph.warnings.len(), 1);
        assert!(graph.warnings[0].contains("Could not resolve target"));
    }

    #[tokio::test]
    async fn unknown_txid_is_unresolvable() {
        let provider = MockProvider::builder().build();
        let graph = build_graph(
            &provider,
            &txid_from_byte(7).to_string(),
            &limits(5, 500),
            Direction::Forward,
        )
        .await;
        assert!(graph.root_txid.is_none());
        assert_eq!(graph.warnings.len(), 1);
    }

    #[tokio::test]
    async fn address_target_resolves_to_most_recent_tx() {
        let txid_a = txid_from_byte(1);
        let tx_a = esplora_tx(
            txid_a,
            vec![coinbase_vin()],
            vec![esplora_vout(TEST_ADDRESS, 5000)],
        );
        let provider = MockProvider::builder()
            .with_tx(tx_a)
            .with_address(TEST_ADDRESS, vec![txid_a])
            .build();

        let graph = build_graph(&provider, TEST_ADDRESS, &limits(5, 500), Direction::Forward).await;

        assert_eq!(graph.root_txid, Some(txid_a));
        assert_eq!(graph.root_input, TEST_ADDRESS);
    }

    #[tokio::test]
    async fn received_only_address_is_dormant() {
        let txid_a = txid_from_byte(1);
        // The target address appears only in outputs, never spent from.
        let tx_a = esplora_tx(
            txid_a,
            vec![spending_vin(txid_from_byte(8), 0, "addr_funder", 6000)],
            vec![esplora_vout(TEST_ADDRESS, 5000)],
        );
        let provider = MockProvider::builder()
            .with_tx(tx_a)
            .with_address(TEST_ADDRESS, vec![txid_a])
            .with_outspends(txid_a, vec![unspent()])
            .build();

        // Forward from an unspent output: traversal cannot expand.
        let graph = build_graph(&provider, TEST_ADDRESS, &limits(5, 500), Direction::Forward).await;

        assert_eq!(graph.max_depth_reached, 0);
        assert!(graph.is_dormant);
        assert!(graph
            .dormancy_note
            .as_deref()
            .is_some_and(|note| note.contains("never spent")));
    }

    #[tokio::test]
    async fn spending_address_is_not_dormant() {
        let txid_a = txid_from_byte(1);
        let tx_a = esplora_tx(
            txid_a,
            vec![spending_vin(txid_from_byte(8), 0, TEST_ADDRESS, 6000)],
            vec![esplora_vout("addr_payee", 5000)],
        );
        let provider = MockProvider::builder()
            .with_tx(tx_a)
            .with_address(TEST_ADDRESS, vec![txid_a])
            .with_outspends(txid_a, vec![unspent()])
            .build();

        let graph = build_graph(&provider, TEST_ADDRESS, &limits(5, 500), Direction::Forward).await;

        assert_eq!(graph.max_depth_reached, 0);
        assert!(!graph.is_dormant);
    }

    #[tokio::test]
    async fn txid_target_is_never_dormant() {
        let txid_a = txid_from_byte(1);
        let tx_a = esplora_tx(
            txid_a,
            vec![coinbase_vin()],
            vec![esplora_vout("addr_a", 5000)],
        );
        let provider = MockProvider::builder().with_tx(tx_a).build();

        let graph = build_graph(
            &provider,
            &txid_a.to_string(),
            &limits(5, 500),
            Direction::Forward,
        )
        .await;

        assert_eq!(graph.max_depth_reached, 0);
        assert!(!graph.is_dormant);
    }

    // -- parsing ---------------------------------------------------------------

    #[test]
    fn parse_merges_outspends_by_index() {
        let txid = txid_from_byte(1);
        let spender = txid_from_byte(2);
        let tx = esplora_tx(
            txid,
            vec![coinbase_vin()],
            vec![esplora_vout("a", 100), esplora_vout("b", 200)],
        );
        let outspends = vec![outspend_to(spender), unspent()];

        let node = parse_node(&tx, 3, Some(&outspends));

        assert_eq!(node.depth, 3);
        assert!(node.outputs[0].spent);
        assert_eq!(node.outputs[0].spending_txid, Some(spender));
        assert!(!node.outputs[1].spent);
        assert!(node.outputs[1].spending_txid.is_none());
    }

    #[test]
    fn parse_without_outspends_marks_nothing_spent() {
        let tx = esplora_tx(
            txid_from_byte(1),
            vec![coinbase_vin()],
            vec![esplora_vout("a", 100)],
        );
        let node = parse_node(&tx, 0, None);
        assert!(!node.outputs[0].spent);
    }

    #[test]
    fn parse_detects_coinbase_and_clears_prev_txid() {
        let tx = esplora_tx(
            txid_from_byte(1),
            vec![coinbase_vin()],
            vec![esplora_vout("miner", 625_000_000)],
        );
        let node = parse_node(&tx, 0, None);
        assert!(node.is_coinbase);
        assert!(node.inputs[0].prev_txid.is_none());
        assert!(!node.rbf_signaled);
    }

    #[test]
    fn parse_detects_rbf_signaling() {
        let mut vin = spending_vin(txid_from_byte(9), 0, "addr", 1000);
        vin.sequence = 0xFFFF_FFFD;
        let tx = esplora_tx(txid_from_byte(1), vec![vin], vec![esplora_vout("a", 900)]);
        assert!(parse_node(&tx, 0, None).rbf_signaled);
    }

    #[test]
    fn parse_opt_out_sequence_is_not_rbf() {
        // 0xFFFFFFFE opts out of RBF while still enabling locktime.
        let vin = spending_vin(txid_from_byte(9), 0, "addr", 1000);
        assert_eq!(vin.sequence, 0xFFFF_FFFE);
        let tx = esplora_tx(txid_from_byte(1), vec![vin], vec![esplora_vout("a", 900)]);
        assert!(!parse_node(&tx, 0, None).rbf_signaled);
    }

    #[test]
    fn parse_extracts_values_and_script_types() {
        let tx = esplora_tx(
            txid_from_byte(1),
            vec![spending_vin(txid_from_byte(9), 2, "addr_in", 7000)],
            vec![esplora_vout("addr_out", 6500)],
        );
        let node = parse_node(&tx, 0, None);

        assert_eq!(node.inputs[0].prev_vout, 2);
        assert_eq!(node.inputs[0].address.as_deref(), Some("addr_in"));
        assert_eq!(node.inputs[0].value, Amount::from_sat(7000));
        assert_eq!(node.inputs[0].script_type, ScriptType::P2wpkh);
        assert_eq!(node.outputs[0].value, Amount::from_sat(6500));
        assert_eq!(node.fee, Amount::from_sat(1000));
        assert_eq!(node.block_height, Some(800_000));
    }

    // -- target patterns -------------------------------------------------------

    #[test]
    fn txid_pattern_requires_64_hex_chars() {
        assert!(is_txid_pattern(&"a".repeat(64)));
        assert!(is_txid_pattern(&"0123456789abcdefABCDEF".repeat(3)[..64].to_string()));
        assert!(!is_txid_pattern(&"a".repeat(63)));
        assert!(!is_txid_pattern(&"g".repeat(64)));
    }

    #[test]
    fn address_pattern_accepts_mainnet_prefixes() {
        assert!(is_address_pattern("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"));
        assert!(is_address_pattern("3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy"));
        assert!(is_address_pattern(TEST_ADDRESS));
    }

    #[test]
    fn address_pattern_rejects_other_shapes() {
        assert!(!is_address_pattern("2NEWaddressShapedString1234567890"));
        assert!(!is_address_pattern("1short"));
        assert!(!is_address_pattern("bc1"));
        assert!(!is_address_pattern(""));
    }
}
