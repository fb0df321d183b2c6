//! Similarity → confidence tier.
//!
//! One threshold pair is used everywhere: above 0.8 is `high`, above 0.6
//! is `medium`, everything else (including NaN) is `low`. The score is
//! reported next to the tier, never replaced by it.

use std::fmt;

use serde::Serialize;

pub const DEFAULT_HIGH_THRESHOLD: f64 = 0.8;
pub const DEFAULT_MEDIUM_THRESHOLD: f64 = 0.6;

/// Discrete confidence level, ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Portuguese display label used in rendered answers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "alta",
            Self::Medium => "média",
            Self::Low => "baixa",
        }
    }

    /// Letter grade: A, B or C.
    pub fn grade(&self) -> char {
        match self {
            Self::High => 'A',
            Self::Medium => 'B',
            Self::Low => 'C',
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict lower bounds for the `high` and `medium` tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: DEFAULT_HIGH_THRESHOLD,
            medium: DEFAULT_MEDIUM_THRESHOLD,
        }
    }
}

impl ConfidenceThresholds {
    /// Grade a score. Total: NaN and out-of-range values fall through to
    /// the comparisons like any other float.
    pub fn classify(&self, score: f64) -> ConfidenceTier {
        if score > self.high {
            ConfidenceTier::High
        } else if score > self.medium {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

/// Grade a score with the default 0.8 / 0.6 thresholds.
pub fn classify(score: f64) -> ConfidenceTier {
    ConfidenceThresholds::default().classify(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scores() {
        assert_eq!(classify(0.85), ConfidenceTier::High);
        assert_eq!(classify(0.65), ConfidenceTier::Medium);
        assert_eq!(classify(0.3), ConfidenceTier::Low);
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        assert_eq!(classify(0.8), ConfidenceTier::Medium);
        assert_eq!(classify(0.6), ConfidenceTier::Low);
        assert_eq!(classify(0.8000001), ConfidenceTier::High);
        assert_eq!(classify(0.6000001), ConfidenceTier::Medium);
    }

    #[test]
    fn test_nan_is_low() {
        assert_eq!(classify(f64::NAN), ConfidenceTier::Low);
    }

    #[test]
    fn test_monotonic_over_unit_interval() {
        let mut previous = classify(0.0);
        for i in 1..=1000 {
            let tier = classify(i as f64 / 1000.0);
            assert!(tier >= previous, "tier dropped at {}", i);
            assert_eq!(tier, classify(i as f64 / 1000.0));
            previous = tier;
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(ConfidenceTier::High.label(), "alta");
        assert_eq!(ConfidenceTier::Medium.grade(), 'B');
        assert_eq!(ConfidenceTier::Low.to_string(), "low");
        assert_eq!(serde_json::to_string(&ConfidenceTier::Medium).unwrap(), "\"medium\"");
    }
}
