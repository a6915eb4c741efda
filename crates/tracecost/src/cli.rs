use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use tracecost_core::Direction;

fn parse_direction(s: &str) -> Result<Direction, String> {
    Direction::from_str(s)
}

/// TraceCost — estimate the forensic cost of tracing a Bitcoin address or
/// transaction through the public ledger.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Bitcoin address (1..., 3..., bc1...) or transaction ID (64-char hex).
    pub target: String,

    /// Max BFS hops to traverse.
    #[arg(long, short = 'd', default_value_t = 5,
          value_parser = clap::value_parser!(u64).range(1..=20))]
    pub depth: u64,

    /// Max transaction nodes to visit.
    #[arg(long, short = 'n', default_value_t = 500,
          value_parser = clap::value_parser!(u64).range(10..=5000))]
    pub node_limit: u64,

    /// Traversal direction: forward, backward, or both.
    #[arg(long, default_value = "forward", value_parser = parse_direction)]
    pub direction: Direction,

    /// Output as JSON instead of the terminal report.
    #[arg(long)]
    pub json: bool,

    /// Query all unattributed addresses via the cluster oracle instead of
    /// capping at 200 (slower, more accurate).
    #[arg(long)]
    pub thorough: bool,

    /// Skip cluster-oracle queries (faster, local attribution only).
    #[arg(long)]
    pub no_cluster_oracle: bool,

    /// Premium oracle API key (enables Tier 3 attribution).
    #[arg(long, env = "TRACECOST_PREMIUM_KEY")]
    pub premium_key: Option<String>,

    /// Primary Esplora-compatible API base URL.
    #[arg(long, default_value = "https://mempool.space/api")]
    pub primary_url: String,

    /// Fallback Esplora-compatible API base URL.
    #[arg(long, default_value = "https://blockstream.info/api")]
    pub fallback_url: String,

    /// Path to the prebuilt entity index.
    #[arg(long, default_value = "data/known_entities.db")]
    pub entity_db: PathBuf,

    /// Path to the JSON entity document used when the index is absent.
    #[arg(long, default_value = "data/known_entities.json")]
    pub entity_json: PathBuf,
}
