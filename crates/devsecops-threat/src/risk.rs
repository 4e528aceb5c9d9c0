//! Impact x likelihood risk matrix

use devsecops_core::{Level, RiskBucket};

/// Bucket the risk of a threat from its impact and likelihood.
///
/// Levels weigh info = 1 .. critical = 5; the product is bucketed as
/// critical (>= 20), high (>= 12), medium (>= 6) or low.
pub fn compute_risk(impact: Level, likelihood: Level) -> RiskBucket {
    RiskBucket::from_product(impact.score() * likelihood.score())
}

/// Like [`compute_risk`], for free-form level labels.
///
/// Unrecognised labels weigh as medium.
pub fn compute_risk_from_labels(impact: &str, likelihood: &str) -> RiskBucket {
    let weight = |label: &str| label.parse::<Level>().map(|level| level.score()).unwrap_or(Level::Medium.score());
    RiskBucket::from_product(weight(impact) * weight(likelihood))
}
