mod cli;
mod render;

use clap::Parser;
use eyre::eyre;

use tracecost_core::attribution::{
    attribute_graph, AttributionOptions, ClusterOracle, EntityStore, HttpOracles, PremiumOracle,
    DEFAULT_CLUSTER_CAP,
};
use tracecost_core::complexity::compute_complexity;
use tracecost_core::cost::compute_cost;
use tracecost_core::graph::build_graph;
use tracecost_core::limiter::ApiLimiters;
use tracecost_core::provider::{EsploraClient, FailoverApi};
use tracecost_core::report::render_json;
use tracecost_core::TraversalLimits;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    tokio::select! {
        result = run(&args) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!();
            eprintln!("Interrupted.");
            std::process::exit(130);
        }
    }
}

async fn run(args: &cli::Cli) -> eyre::Result<()> {
    tracing::debug!(
        target = %args.target,
        depth = args.depth,
        node_limit = args.node_limit,
        direction = %args.direction,
        "starting analysis"
    );

    let limiters = ApiLimiters::default();
    let provider = FailoverApi::new(
        EsploraClient::new(args.primary_url.as_str(), limiters.primary.clone()),
        EsploraClient::new(args.fallback_url.as_str(), limiters.fallback.clone()),
    );

    let store = EntityStore::open(&args.entity_db, &args.entity_json);
    let oracles = HttpOracles::new(
        ClusterOracle::new(ClusterOracle::DEFAULT_URL, "tracecost", limiters.cluster.clone()),
        args.premium_key
            .as_deref()
            .map(|key| PremiumOracle::new(PremiumOracle::DEFAULT_URL, key, limiters.premium.clone())),
    );

    let limits = TraversalLimits {
        max_depth: args.depth as usize,
        node_limit: args.node_limit as usize,
    };

    if !args.json {
        println!();
        println!("Traversing transaction graph...");
    }

    let mut graph = build_graph(&provider, &args.target, &limits, args.direction).await;

    if graph.root_txid.is_none() {
        return Err(eyre!(
            "could not resolve target `{}`; check that the address or txid is valid",
            args.target
        ));
    }

    if !args.json {
        println!(
            "  {} nodes, {} addresses",
            graph.nodes.len(),
            graph.addresses_seen.len()
        );
        println!("Attributing addresses...");
        if args.thorough && !args.no_cluster_oracle {
            let address_count = graph.addresses_seen.len();
            let est_minutes = address_count as f64 / 0.8 / 60.0;
            println!(
                "  --thorough: ~{address_count} addresses to check, \
                 est. ~{est_minutes:.0} min at 0.8 req/s"
            );
        }
    }

    let attribution_opts = AttributionOptions {
        skip_cluster_oracle: args.no_cluster_oracle,
        cluster_cap: if args.thorough {
            None
        } else {
            Some(DEFAULT_CLUSTER_CAP)
        },
        premium_enabled: args.premium_key.is_some(),
    };
    attribute_graph(&store, &oracles, &mut graph, &attribution_opts).await;

    let metrics = compute_complexity(&graph);
    let estimate = compute_cost(&metrics);

    if args.json {
        let report = render_json(&graph, &metrics, &estimate);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::render_terminal(&graph, &metrics, &estimate);
    }

    Ok(())
}
