//! Forensic cost estimation model.
//!
//! Translates [`ComplexityMetrics`] into analyst time and dollar estimates
//! across three tiers, then classifies the economic privacy floor. Pure and
//! deterministic: every constant below is part of the model's contract.

use crate::complexity::ComplexityMetrics;

// ==============================================================================
// Model Constants
// ==============================================================================

struct TierDef {
    name: &'static str,
    rate: f64,
    tooling: f64,
}

const TIERS: [TierDef; 3] = [
    TierDef {
        name: "Mid-level analyst",
        rate: 200.0,
        tooling: 0.0,
    },
    TierDef {
        name: "Senior specialist",
        rate: 450.0,
        tooling: 150.0,
    },
    TierDef {
        name: "Litigation expert",
        rate: 1000.0,
        tooling: 150.0,
    },
];

/// Base minutes per hop keyed by attribution-rate thresholds, descending.
/// First threshold the rate exceeds wins.
const BASE_TIME_THRESHOLDS: [(f64, f64); 4] =
    [(0.7, 12.0), (0.4, 45.0), (0.1, 180.0), (0.0, 480.0)];

const MIXING_MULTIPLIER: f64 = 3.5;
const TAPROOT_THRESHOLD: f64 = 0.5;
const TAPROOT_MULTIPLIER: f64 = 1.4;
const UNRESOLVED_HOURS_EACH: f64 = 8.0;

/// The high estimate is the base scaled by this factor, plus unresolved time.
const HIGH_ESTIMATE_FACTOR: f64 = 1.6;

/// Privacy floor dollar thresholds over the senior-tier midpoint, ascending.
const FLOOR_THRESHOLDS: [(f64, PrivacyFloor); 4] = [
    (500.0, PrivacyFloor::Traceable),
    (5_000.0, PrivacyFloor::Costly),
    (50_000.0, PrivacyFloor::Expensive),
    (500_000.0, PrivacyFloor::HighFloor),
];

const MINIMUM_CASE_THRESHOLD: f64 = 5_000.0;

// ==============================================================================
// Result Types
// ==============================================================================

/// Five-level classification of tracing economic viability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyFloor {
    /// Under $500.
    Traceable,
    /// $500 – $5,000.
    Costly,
    /// $5,000 – $50,000.
    Expensive,
    /// $50,000 – $500,000.
    HighFloor,
    /// Over $500,000.
    Impractical,
}

impl PrivacyFloor {
    pub fn label(self) -> &'static str {
        match self {
            Self::Traceable => "TRACEABLE",
            Self::Costly => "COSTLY",
            Self::Expensive => "EXPENSIVE",
            Self::HighFloor => "HIGH FLOOR",
            Self::Impractical => "IMPRACTICAL",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Traceable => "\u{1F534}",
            Self::Costly => "\u{1F7E1}",
            Self::Expensive => "\u{1F7E0}",
            Self::HighFloor => "\u{1F7E2}",
            Self::Impractical => "\u{1F7E3}",
        }
    }
}

impl std::fmt::Display for PrivacyFloor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Traceable => write!(f, "traceable"),
            Self::Costly => write!(f, "costly"),
            Self::Expensive => write!(f, "expensive"),
            Self::HighFloor => write!(f, "high_floor"),
            Self::Impractical => write!(f, "impractical"),
        }
    }
}

/// How much weight the estimate carries, graded from attribution coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Moderate,
    Low,
    VeryLow,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Moderate => write!(f, "moderate"),
            Self::Low => write!(f, "low"),
            Self::VeryLow => write!(f, "very low"),
        }
    }
}

/// Cost estimate for a single analyst tier.
#[derive(Debug, Clone)]
pub struct TierEstimate {
    pub tier_name: &'static str,
    pub hourly_rate: f64,
    pub tooling_overhead: f64,
    pub hours_low: f64,
    pub hours_high: f64,
    pub total_low: f64,
    pub total_high: f64,
}

/// Complete cost estimation result.
#[derive(Debug, Clone)]
pub struct CostEstimate {
    /// Mid-level, senior, expert — always in this order.
    pub tiers: Vec<TierEstimate>,
    pub base_hours_per_hop: f64,
    pub total_hops: usize,
    pub mixing_multiplier: f64,
    pub branching_multiplier: f64,
    pub taproot_multiplier: f64,
    pub fan_in_multiplier: f64,
    pub unresolved_hours: f64,
    pub privacy_floor: PrivacyFloor,
    pub privacy_floor_summary: String,
    pub confidence: Confidence,
    pub confidence_note: Option<String>,
    pub minimum_case_threshold_note: Option<String>,
}

// ==============================================================================
// Cost Computation
// ==============================================================================

/// Estimate forensic tracing cost from graph complexity metrics.
pub fn compute_cost(metrics: &ComplexityMetrics) -> CostEstimate {
    // Dormant or empty graph: nothing to trace.
    if metrics.max_depth == 0 && metrics.node_count <= 1 {
        return zero_cost_estimate();
    }

    let base_minutes = base_minutes_per_hop(metrics.attribution_rate);
    let base_hours_per_hop = base_minutes / 60.0;

    let mixing_mult = if metrics.coinjoin_detected {
        MIXING_MULTIPLIER
    } else {
        1.0
    };
    let branching_mult = if metrics.avg_branch_factor > 5.0 {
        metrics.avg_branch_factor / 5.0
    } else {
        1.0
    };
    let taproot_mult = if metrics.taproot_ratio > TAPROOT_THRESHOLD {
        TAPROOT_MULTIPLIER
    } else {
        1.0
    };
    // Uncapped: 79 inputs really is ~16x the work of 5.
    let fan_in_mult = if metrics.avg_fan_in > 5.0 {
        metrics.avg_fan_in / 5.0
    } else {
        1.0
    };

    let effective_mult = mixing_mult * branching_mult * taproot_mult * fan_in_mult;

    let total_hops = metrics.max_depth.max(1);
    let base_total = base_hours_per_hop * total_hops as f64 * effective_mult;
    let unresolved_hours = metrics.unresolved_paths as f64 * UNRESOLVED_HOURS_EACH;

    let hours_low = base_total;
    let hours_high = base_total * HIGH_ESTIMATE_FACTOR + unresolved_hours;

    let tiers: Vec<TierEstimate> = TIERS
        .iter()
        .map(|tier| {
            let effective_rate = tier.rate + tier.tooling;
            TierEstimate {
                tier_name: tier.name,
                hourly_rate: tier.rate,
                tooling_overhead: tier.tooling,
                hours_low: round1(hours_low),
                hours_high: round1(hours_high),
                total_low: (hours_low * effective_rate).round(),
                total_high: (hours_high * effective_rate).round(),
            }
        })
        .collect();

    // Floor classification keys on the senior specialist tier.
    let senior = &tiers[1];
    let reference_cost = (senior.total_low + senior.total_high) / 2.0;
    let privacy_floor = classify_floor(reference_cost);
    let privacy_floor_summary = floor_summary(privacy_floor, senior);

    let coverage_rate = metrics.attribution_rate;
    let mut confidence = if coverage_rate >= 0.7 && metrics.unresolved_paths == 0 {
        Confidence::High
    } else if coverage_rate >= 0.4 {
        Confidence::Moderate
    } else if coverage_rate >= 0.1 {
        Confidence::Low
    } else {
        Confidence::VeryLow
    };

    // With every source fully consulted, low attribution means genuinely
    // unknown addresses, not incomplete checking: floor at moderate.
    if metrics.sources_exhausted
        && matches!(confidence, Confidence::Low | Confidence::VeryLow)
    {
        confidence = Confidence::Moderate;
    }

    let confidence_note = if coverage_rate < 0.4 && metrics.total_addresses > 0 {
        let attributed = metrics.attributed_addresses;
        let total = metrics.total_addresses;
        let pct = format!("{:.0}%", coverage_rate * 100.0);
        Some(if metrics.sources_exhausted {
            format!(
                "Only {pct} of addresses attributed ({attributed}/{total}). \
                 Unattributed addresses may include unlabeled exchange or \
                 service nodes. Add --premium-key for better bech32/taproot \
                 coverage."
            )
        } else {
            format!(
                "Only {pct} of addresses attributed ({attributed}/{total}). \
                 Cost estimate may be significantly overstated if unattributed \
                 addresses include exchange or service nodes. Run with \
                 --thorough to check all addresses."
            )
        })
    } else {
        None
    };

    let minimum_case_threshold_note = if senior.total_high < MINIMUM_CASE_THRESHOLD {
        Some(format!(
            "Most forensic firms require a minimum ${} investigation value \
             before taking a case.",
            format_usd(MINIMUM_CASE_THRESHOLD)
        ))
    } else {
        None
    };

    CostEstimate {
        tiers,
        base_hours_per_hop,
        total_hops,
        mixing_multiplier: mixing_mult,
        branching_multiplier: round2(branching_mult),
        taproot_multiplier: taproot_mult,
        fan_in_multiplier: round2(fan_in_mult),
        unresolved_hours,
        privacy_floor,
        privacy_floor_summary,
        confidence,
        confidence_note,
        minimum_case_threshold_note,
    }
}

/// All-zero estimate for graphs with no outgoing activity.
fn zero_cost_estimate() -> CostEstimate {
    let tiers = TIERS
        .iter()
        .map(|tier| TierEstimate {
            tier_name: tier.name,
            hourly_rate: tier.rate,
            tooling_overhead: tier.tooling,
            hours_low: 0.0,
            hours_high: 0.0,
            total_low: 0.0,
            total_high: 0.0,
        })
        .collect();

    CostEstimate {
        tiers,
        base_hours_per_hop: 0.0,
        total_hops: 0,
        mixing_multiplier: 1.0,
        branching_multiplier: 1.0,
        taproot_multiplier: 1.0,
        fan_in_multiplier: 1.0,
        unresolved_hours: 0.0,
        privacy_floor: PrivacyFloor::Traceable,
        privacy_floor_summary:
            "No tracing required \u{2014} single node with no outgoing activity.".to_owned(),
        confidence: Confidence::High,
        confidence_note: None,
        minimum_case_threshold_note: None,
    }
}

// ==============================================================================
// Helpers
// ==============================================================================

/// Base minutes per hop for a given attribution rate. The comparison is
/// strict, so a rate of exactly 0.0 lands on the final 8-hour bracket.
fn base_minutes_per_hop(attribution_rate: f64) -> f64 {
    for (threshold, minutes) in BASE_TIME_THRESHOLDS {
        if attribution_rate > threshold {
            return minutes;
        }
    }
    BASE_TIME_THRESHOLDS[BASE_TIME_THRESHOLDS.len() - 1].1
}

fn classify_floor(reference_cost_usd: f64) -> PrivacyFloor {
    for (threshold, floor) in FLOOR_THRESHOLDS {
        if reference_cost_usd < threshold {
            return floor;
        }
    }
    PrivacyFloor::Impractical
}

fn floor_summary(floor: PrivacyFloor, senior: &TierEstimate) -> String {
    let cost_range = format!(
        "${}\u{2013}${}",
        format_usd(senior.total_low),
        format_usd(senior.total_high)
    );
    match floor {
        PrivacyFloor::Traceable => format!(
            "{cost_range} for senior analyst. Any motivated party can afford this trace."
        ),
        PrivacyFloor::Costly => format!(
            "{cost_range} for senior analyst. Viable for law enforcement, \
             out of reach for most private actors."
        ),
        PrivacyFloor::Expensive => format!(
            "{cost_range} for senior analyst. Requires significant financial \
             motivation. Out of reach for most private actors."
        ),
        PrivacyFloor::HighFloor => format!(
            "{cost_range} for senior analyst. Only justified by very large \
             amounts at stake."
        ),
        PrivacyFloor::Impractical => format!(
            "{cost_range} for senior analyst. Economically invisible to all \
             but nation-state actors."
        ),
    }
}

/// Whole-dollar formatting with thousands separators ("12,800").
pub fn format_usd(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if whole < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ==============================================================================
// Tests
// ==============================================================================
