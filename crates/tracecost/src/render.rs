//! Terminal rendering of the analysis report.

use colored::Colorize;

use tracecost_core::complexity::{ComplexityMetrics, TxPattern};
use tracecost_core::cost::{format_usd, CostEstimate};
use tracecost_core::types::GraphResult;

/// Render the full analysis as a human-readable terminal report.
pub fn render_terminal(graph: &GraphResult, metrics: &ComplexityMetrics, estimate: &CostEstimate) {
    println!();
    println!(
        "{} {} {}",
        "TraceCost".bold(),
        "\u{2014}".dimmed(),
        "economic privacy estimator".dimmed()
    );
    println!("{}", "\u{2501}".repeat(50).dimmed());
    println!();

    let mut target = graph.root_input.clone();
    if target.len() > 50 {
        target = format!("{}..{}", &target[..24], &target[target.len() - 24..]);
    }
    println!("  {}{target}", format!("{:<17}", "Target:").dimmed());
    if let Some(root_txid) = graph.root_txid {
        let short = &root_txid.to_string()[..16];
        println!("  {}{short}...", format!("{:<17}", "Root txid:").dimmed());
    }
    let depth_label = format!("{:<17}", "Depth analyzed:").dimmed();
    if graph.requested_max_depth > metrics.max_depth {
        println!(
            "  {depth_label}{} / {} requested",
            metrics.max_depth, graph.requested_max_depth
        );
        if metrics.max_depth == 0 {
            println!(
                "  {}",
                "(no outgoing transactions from root \u{2014} traversal could not expand)".dimmed()
            );
        }
    } else {
        println!("  {depth_label}{} hops", metrics.max_depth);
    }
    println!(
        "  {}{}",
        format!("{:<17}", "Nodes traversed:").dimmed(),
        metrics.node_count
    );
    if graph.node_limit_hit {
        println!("  {}", "\u{26A0} Node limit reached".yellow());
    }
    println!();

    // Dormant address: nothing to price.
    if graph.is_dormant {
        if let Some(note) = &graph.dormancy_note {
            println!("  {}", note.yellow().bold());
        }
        println!();
        println!("  {}", "No cost estimate applicable.".dimmed());
        println!();
        return;
    }

    render_complexity(graph, metrics);
    render_attribution(graph);
    render_cost(estimate);
    render_warnings(graph);
}

fn render_complexity(graph: &GraphResult, metrics: &ComplexityMetrics) {
    println!("{}", "GRAPH COMPLEXITY".bold());
    println!(
        "  Branch factor:      {} ({})",
        metrics.avg_branch_factor,
        describe_branch_factor(metrics.avg_branch_factor)
    );
    if metrics.avg_fan_in > 1.5 {
        println!(
            "  Fan-in (backward):  {} ({})",
            metrics.avg_fan_in,
            describe_fan_in(metrics.avg_fan_in)
        );
    }

    let mut attribution_line = format!(
        "  Attribution rate:   {:.0}% ({}/{} addresses)",
        metrics.attribution_rate * 100.0,
        metrics.attributed_addresses,
        metrics.total_addresses
    );
    let skipped = graph.cluster_unmatched.saturating_sub(graph.cluster_queried);
    if skipped > 0 {
        attribution_line.push_str(&format!(
            "  {}",
            format!(
                "(checked {}/{} via cluster oracle)",
                graph.cluster_queried, graph.cluster_unmatched
            )
            .dimmed()
        ));
    }
    println!("{attribution_line}");

    if metrics.coinjoin_detected {
        println!(
            "  {}",
            format!("Mixing detected:    Yes ({} txs)", metrics.mixing_signals)
                .red()
                .bold()
        );
    } else {
        println!("  Mixing detected:    No");
    }
    println!("  Taproot ratio:      {:.0}%", metrics.taproot_ratio * 100.0);
    if metrics.unresolved_paths > 0 {
        println!("  Fetch failures:     {}", metrics.unresolved_paths);
    }
    if let Some(pattern) = metrics.root_pattern {
        println!(
            "  Root pattern:       {} ({})",
            pattern.label(),
            metrics.root_pattern_detail
        );
        if pattern == TxPattern::Consolidation {
            println!(
                "  {}",
                "\u{26A0} Forward estimate only; tracing all consolidated inputs costs more."
                    .yellow()
            );
        }
    }
    println!();
}

fn render_attribution(graph: &GraphResult) {
    let Some(summary) = &graph.attribution_summary else {
        return;
    };

    println!("{}", "ATTRIBUTION SOURCES".bold());
    println!(
        "  {} of {} addresses attributed ({:.0}%)",
        summary.attributed_count,
        summary.total_addresses,
        summary.coverage_rate * 100.0
    );
    for (source, count) in &summary.by_source {
        println!("  {}{count}", format!("{:<17}", format!("{source}:")).dimmed());
    }
    if !graph.attribution_results.is_empty() {
        let mut entities: Vec<&str> = graph
            .attribution_results
            .iter()
            .map(|r| r.entity.as_str())
            .collect();
        entities.sort_unstable();
        entities.dedup();
        let preview: Vec<&str> = entities.iter().take(8).copied().collect();
        println!(
            "  {}{}",
            format!("{:<17}", "Entities:").dimmed(),
            preview.join(", ")
        );
    }
    println!();
}

fn render_cost(estimate: &CostEstimate) {
    println!("{}", "COST TO TRACE".bold());
    println!(
        "  Base time/hop:      {} ({})",
        format_hours(estimate.base_hours_per_hop),
        describe_base_time(estimate.base_hours_per_hop)
    );
    println!("  Hops:               {}", estimate.total_hops);

    let multipliers = [
        ("mixing", estimate.mixing_multiplier),
        ("branching", estimate.branching_multiplier),
        ("taproot", estimate.taproot_multiplier),
        ("fan-in", estimate.fan_in_multiplier),
    ];
    let active: Vec<String> = multipliers
        .iter()
        .filter(|(_, value)| *value > 1.0)
        .map(|(name, value)| format!("{name} \u{00D7}{value}"))
        .collect();
    if !active.is_empty() {
        println!("  Multipliers:        {}", active.join(", "));
    }
    if estimate.unresolved_hours > 0.0 {
        println!(
            "  Unresolved paths:   +{} on the high estimate",
            format_hours(estimate.unresolved_hours)
        );
    }
    println!();

    for tier in &estimate.tiers {
        println!(
            "  {:<20} ${}/hr{:<14} {}\u{2013}{} hrs    ${}\u{2013}${}",
            tier.tier_name,
            tier.hourly_rate,
            if tier.tooling_overhead > 0.0 {
                format!(" +${}/hr tools", tier.tooling_overhead)
            } else {
                String::new()
            },
            tier.hours_low,
            tier.hours_high,
            format_usd(tier.total_low),
            format_usd(tier.total_high)
        );
    }
    println!();

    println!("{}", "PRIVACY FLOOR".bold());
    let label = format!(
        "  {} {}",
        estimate.privacy_floor.emoji(),
        estimate.privacy_floor.label()
    );
    println!("{}", label.bold());
    println!("  {}", estimate.privacy_floor_summary);
    println!();
    println!("  Confidence: {}", estimate.confidence);
    if let Some(note) = &estimate.confidence_note {
        println!("  {}", note.dimmed());
    }
    if let Some(note) = &estimate.minimum_case_threshold_note {
        println!("  {}", note.dimmed());
    }
    println!();
}

fn render_warnings(graph: &GraphResult) {
    for warning in &graph.warnings {
        println!("  {} {}", "\u{26A0}".yellow(), warning.yellow());
    }
    if !graph.warnings.is_empty() {
        println!();
    }
}

fn describe_branch_factor(branch_factor: f64) -> &'static str {
    if branch_factor <= 2.0 {
        "low fragmentation"
    } else if branch_factor <= 5.0 {
        "moderate fragmentation"
    } else {
        "high fragmentation"
    }
}

fn describe_fan_in(fan_in: f64) -> &'static str {
    if fan_in <= 2.0 {
        "low consolidation"
    } else if fan_in <= 5.0 {
        "moderate consolidation"
    } else {
        "heavy consolidation"
    }
}

fn describe_base_time(hours: f64) -> &'static str {
    if hours <= 0.25 {
        "fast \u{2014} most nodes known"
    } else if hours <= 1.0 {
        "moderate attribution"
    } else if hours <= 4.0 {
        "slow \u{2014} few anchors"
    } else {
        "very slow \u{2014} essentially unattributed"
    }
}

fn format_hours(hours: f64) -> String {
    if hours < 1.0 {
        format!("{:.0} min", hours * 60.0)
    } else {
        format!("{hours:.1} hrs")
    }
}
