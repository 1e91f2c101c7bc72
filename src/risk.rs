//! Risk bucketing of the good-credit probability

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bound (inclusive) of the LOW risk bucket
pub const LOW_RISK_THRESHOLD: f64 = 0.7;
/// Lower bound (inclusive) of the MEDIUM risk bucket
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.4;

/// Discrete risk level derived from `p(good credit)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// `p >= 0.7` → LOW, `0.4 <= p < 0.7` → MEDIUM, otherwise HIGH
    pub fn classify(probability_good: f64) -> Self {
        if probability_good >= LOW_RISK_THRESHOLD {
            RiskLevel::Low
        } else if probability_good >= MEDIUM_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
