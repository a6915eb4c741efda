//! Core library for **TraceCost** — a Bitcoin forensic cost estimator.
//!
//! Given a target address or transaction, this crate traverses the public
//! transaction graph via a rate-limited Esplora provider pair, attributes
//! addresses to known entities through a three-tier pipeline, computes
//! graph-complexity metrics (including CoinJoin detection), and translates
//! them into tiered dollar cost estimates with a privacy-floor rating.
//!
//! The pipeline is linear: resolve → traverse → attribute → measure → cost
//! → emit. Traversal and attribution are concurrent and I/O-bound; the
//! metric and cost stages are pure functions of the in-memory graph. The
//! provider seam ([`provider::TxProvider`]) can be backed by HTTP or a mock.

pub mod attribution;
pub mod complexity;
pub mod cost;
pub mod error;
pub mod graph;
pub mod limiter;
pub mod provider;
pub mod report;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

pub use error::CoreError;
pub use types::{Direction, GraphResult, TraversalLimits};
