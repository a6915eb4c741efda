//! Structured JSON emission for programmatic consumers.
//!
//! The key set here is a wire contract: renderers and downstream tooling
//! key on these names, including the historical `we_addresses_*` spellings
//! for the cluster-oracle bookkeeping.

use serde_json::{json, Map, Value};

use crate::complexity::ComplexityMetrics;
use crate::cost::CostEstimate;
use crate::types::GraphResult;

/// Build the analysis report as a JSON value.
pub fn render_json(
    graph: &GraphResult,
    metrics: &ComplexityMetrics,
    estimate: &CostEstimate,
) -> Value {
    let mut cost_estimate = Map::new();
    for tier in &estimate.tiers {
        let key = tier.tier_name.to_lowercase().replace(' ', "_");
        cost_estimate.insert(
            key,
            json!({
                "hourly_rate": tier.hourly_rate,
                "tooling_overhead": tier.tooling_overhead,
                "hours_low": tier.hours_low,
                "hours_high": tier.hours_high,
                "total_low": tier.total_low,
                "total_high": tier.total_high,
            }),
        );
    }

    json!({
        "input": graph.root_input.clone(),
        "root_txid": graph.root_txid.map(|t| t.to_string()).unwrap_or_default(),
        "depth": metrics.max_depth,
        "requested_depth": graph.requested_max_depth,
        "is_dormant": graph.is_dormant,
        "dormancy_note": if graph.is_dormant { graph.dormancy_note.clone() } else { None },
        "graph": {
            "node_count": metrics.node_count,
            "edge_count": metrics.edge_count,
            "unique_addresses": metrics.unique_addresses,
            "branch_factor": metrics.avg_branch_factor,
            "avg_fan_in": metrics.avg_fan_in,
            "max_fan_in": metrics.max_fan_in,
            "root_pattern": metrics.root_pattern.map(|p| p.to_string()),
            "root_pattern_detail": (!metrics.root_pattern_detail.is_empty())
                .then(|| metrics.root_pattern_detail.clone()),
            "attribution_rate": metrics.attribution_rate,
            "addresses_checked": metrics.addresses_checked,
            "unattributed_addresses": metrics.unattributed_addresses,
            "we_addresses_queried": graph.cluster_queried,
            "we_addresses_skipped": graph.cluster_unmatched.saturating_sub(graph.cluster_queried),
            "mixing_detected": metrics.coinjoin_detected,
            "mixing_signals": metrics.mixing_signals,
            "taproot_ratio": metrics.taproot_ratio,
            "fetch_failures": metrics.unresolved_paths,
            "node_limit_hit": graph.node_limit_hit,
        },
        "time_estimate": {
            "base_hours_per_hop": estimate.base_hours_per_hop,
            "total_hops": estimate.total_hops,
            "multipliers": {
                "mixing": estimate.mixing_multiplier,
                "branching": estimate.branching_multiplier,
                "taproot": estimate.taproot_multiplier,
                "fan_in": estimate.fan_in_multiplier,
            },
            "unresolved_additional_hours": estimate.unresolved_hours,
            "confidence": estimate.confidence.to_string(),
            "confidence_note": estimate.confidence_note.clone(),
        },
        "cost_estimate": cost_estimate,
        "privacy_floor": {
            "rating": estimate.privacy_floor.to_string(),
            "label": format!("{} {}", estimate.privacy_floor.emoji(), estimate.privacy_floor.label()),
            "summary": estimate.privacy_floor_summary.clone(),
        },
        "attribution": attribution_json(graph),
        "warnings": graph.warnings.clone(),
    })
}

/// Attribution section: summary plus a per-address map. `null` when the
/// attribution pass did not run.
fn attribution_json(graph: &GraphResult) -> Value {
    let Some(summary) = &graph.attribution_summary else {
        return Value::Null;
    };

    let mut per_address = Map::new();
    for result in &graph.attribution_results {
        per_address.insert(
            result.address.clone(),
            json!({
                "entity": result.entity,
                "source": result.source.to_string(),
                "category": result.category,
                "confidence": result.confidence.to_string(),
            }),
        );
    }

    let by_source: Map<String, Value> = summary
        .by_source
        .iter()
        .map(|(source, count)| (source.to_string(), json!(count)))
        .collect();

    json!({
        "total_addresses": summary.total_addresses,
        "attributed_count": summary.attributed_count,
        "coverage_rate": (summary.coverage_rate * 10_000.0).round() / 10_000.0,
        "by_source": by_source,
        "by_category": summary.by_category.clone(),
        "sources_used": summary.sources_used.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        "addresses": per_address,
    })
}
