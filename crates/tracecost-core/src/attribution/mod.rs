//! Multi-tier entity attribution for graph addresses.
//!
//! Runs as a batch pass after traversal so the slow, rate-limited oracles
//! never block graph construction:
//!
//! - Tier 1: local store lookup for every address (instant, offline).
//! - Tier 2: cluster oracle for addresses the store missed, capped by
//!   default because of the oracle's 0.8 req/s ceiling.
//! - Tier 3: premium oracle for the remainder, only when a key is supplied.
//!
//! Every tier treats lookup failures as misses; attribution can degrade but
//! never fail the analysis.

pub mod oracle;
pub mod store;

pub use oracle::{ClusterOracle, PremiumOracle};
pub use store::EntityStore;

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::error::CoreError;
use crate::types::{
    AttributionConfidence, AttributionResult, AttributionSource, AttributionSummary, GraphResult,
};

/// Default cap on Tier-2 lookups. At the cluster oracle's 0.8 req/s this is
/// roughly four minutes of wall-clock time.
pub const DEFAULT_CLUSTER_CAP: usize = 200;

// ==============================================================================
// Oracle Seam
// ==============================================================================

/// The two remote lookups the attribution pass performs. Backed by
/// [`HttpOracles`] in production and by a canned mock in tests.
#[async_trait]
pub trait OracleClient: Send + Sync {
    /// Tier-2 cluster label for an address.
    async fn cluster_lookup(&self, address: &str) -> Result<Option<String>, CoreError>;

    /// Tier-3 premium attribution for an address.
    async fn premium_lookup(&self, address: &str)
        -> Result<Option<AttributionResult>, CoreError>;
}

/// Production oracle pair. The premium client is optional; without it,
/// Tier-3 lookups report a miss.
pub struct HttpOracles {
    cluster: ClusterOracle,
    premium: Option<PremiumOracle>,
}

impl HttpOracles {
    pub fn new(cluster: ClusterOracle, premium: Option<PremiumOracle>) -> Self {
        Self { cluster, premium }
    }
}

#[async_trait]
impl OracleClient for HttpOracles {
    async fn cluster_lookup(&self, address: &str) -> Result<Option<String>, CoreError> {
        self.cluster.lookup(address).await
    }

    async fn premium_lookup(
        &self,
        address: &str,
    ) -> Result<Option<AttributionResult>, CoreError> {
        match &self.premium {
            Some(premium) => premium.lookup(address).await,
            None => Ok(None),
        }
    }
}

// ==============================================================================
// Options
// ==============================================================================

/// Caller-facing switches for the attribution pass.
#[derive(Debug, Clone)]
pub struct AttributionOptions {
    /// Skip Tier 2 entirely.
    pub skip_cluster_oracle: bool,
    /// Maximum addresses to send to the cluster oracle; `None` queries all
    /// unmatched addresses (thorough mode).
    pub cluster_cap: Option<usize>,
    /// Whether Tier 3 runs (a premium API key was supplied).
    pub premium_enabled: bool,
}

impl Default for AttributionOptions {
    fn default() -> Self {
        Self {
            skip_cluster_oracle: false,
            cluster_cap: Some(DEFAULT_CLUSTER_CAP),
            premium_enabled: false,
        }
    }
}

// ==============================================================================
// Attribution Pass
// ==============================================================================

/// Attribute graph addresses to known entities, mutating the graph in place.
///
/// Populates `attributed_entities` on every node referencing a matched
/// address, appends to `attribution_results`, records the Tier-2 cap
/// bookkeeping, and fills `attribution_summary`. Re-running the pass on an
/// already-attributed graph is a no-op diff: every `(address, entity)`
/// assignment is idempotent.
pub async fn attribute_graph(
    store: &EntityStore,
    oracles: &dyn OracleClient,
    graph: &mut GraphResult,
    opts: &AttributionOptions,
) {
    // Index every referenced address to the nodes that mention it. Collect
    // addresses in first-seen order so the Tier-2 cap slices a stable list.
    let mut address_nodes: HashMap<String, Vec<bitcoin::Txid>> = HashMap::new();
    let mut all_addresses: Vec<String> = Vec::new();
    for node in graph.nodes.values() {
        let referenced = node
            .inputs
            .iter()
            .filter_map(|input| input.address.as_ref())
            .chain(node.outputs.iter().filter_map(|output| output.address.as_ref()));
        for address in referenced {
            let txids = address_nodes.entry(address.clone()).or_insert_with(|| {
                all_addresses.push(address.clone());
                Vec::new()
            });
            txids.push(node.txid);
        }
    }

    let total = all_addresses.len();
    let mut tally = Tally::default();

    // -- Tier 1: local store, no I/O, no rate limit ---------------------------
    for address in &all_addresses {
        if let Some(hit) = store.lookup(address) {
            tally.record(graph, &address_nodes, hit);
        }
    }

    // -- Tier 2: cluster oracle over the store's misses -----------------------
    let unmatched: Vec<String> = all_addresses
        .iter()
        .filter(|address| !tally.resolved.contains_key(*address))
        .cloned()
        .collect();

    if opts.skip_cluster_oracle {
        graph.cluster_queried = 0;
        graph.cluster_unmatched = unmatched.len();
    } else {
        let to_query: &[String] = match opts.cluster_cap {
            Some(cap) if unmatched.len() > cap => {
                graph.warnings.push(format!(
                    "Cluster oracle: queried {cap} of {} unattributed addresses \
                     (capped for speed). Use --thorough to check all.",
                    unmatched.len()
                ));
                &unmatched[..cap]
            }
            _ => &unmatched,
        };

        for address in to_query {
            match oracles.cluster_lookup(address).await {
                Ok(Some(entity)) => {
                    tally.record(
                        graph,
                        &address_nodes,
                        AttributionResult {
                            address: address.clone(),
                            entity,
                            source: AttributionSource::ClusterOracle,
                            category: String::new(),
                            confidence: AttributionConfidence::Cluster,
                        },
                    );
                }
                Ok(None) => {}
                Err(err) => {
                    debug!(%address, error = %err, "cluster oracle lookup failed");
                }
            }
        }

        graph.cluster_queried = to_query.len();
        graph.cluster_unmatched = unmatched.len();
    }

    // -- Tier 3: premium oracle for whatever is still unknown -----------------
    if opts.premium_enabled {
        let still_unmatched: Vec<String> = all_addresses
            .iter()
            .filter(|address| !tally.resolved.contains_key(*address))
            .cloned()
            .collect();
        for address in &still_unmatched {
            match oracles.premium_lookup(address).await {
                Ok(Some(hit)) => tally.record(graph, &address_nodes, hit),
                Ok(None) => {}
                Err(err) => {
                    debug!(%address, error = %err, "premium oracle lookup failed");
                }
            }
        }
    }

    // -- Summary --------------------------------------------------------------
    let mut sources_used = vec![AttributionSource::Local];
    if !opts.skip_cluster_oracle {
        sources_used.push(AttributionSource::ClusterOracle);
    }
    if opts.premium_enabled {
        sources_used.push(AttributionSource::PremiumOracle);
    }

    let attributed_count = tally.resolved.len();
    graph.attribution_results = tally.results;
    graph.attribution_summary = Some(AttributionSummary {
        total_addresses: total,
        attributed_count,
        by_source: tally.by_source,
        by_category: tally.by_category,
        coverage_rate: attributed_count as f64 / total.max(1) as f64,
        sources_used,
    });
}

/// Running totals of the attribution pass across the three tiers.
#[derive(Default)]
struct Tally {
    results: Vec<AttributionResult>,
    resolved: HashMap<String, AttributionSource>,
    by_source: HashMap<AttributionSource, usize>,
    by_category: HashMap<String, usize>,
}

impl Tally {
    /// Apply a hit to the graph and fold it into the summary counters.
    fn record(
        &mut self,
        graph: &mut GraphResult,
        address_nodes: &HashMap<String, Vec<bitcoin::Txid>>,
        hit: AttributionResult,
    ) {
        apply_attribution(graph, &address_nodes[&hit.address], &hit.address, &hit.entity);
        *self.by_source.entry(hit.source).or_insert(0) += 1;
        if !hit.category.is_empty() {
            *self.by_category.entry(hit.category.clone()).or_insert(0) += 1;
        }
        self.resolved.insert(hit.address.clone(), hit.source);
        self.results.push(hit);
    }
}

/// Write an attribution onto every node that references the address.
fn apply_attribution(
    graph: &mut GraphResult,
    txids: &[bitcoin::Txid],
    address: &str,
    entity: &str,
) {
    for txid in txids {
        if let Some(node) = graph.nodes.get_mut(txid) {
            node.attributed_entities
                .insert(address.to_owned(), entity.to_owned());
        }
    }
}
