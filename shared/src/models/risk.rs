//! Risk score and interpretation models

use serde::{Deserialize, Serialize};

/// Aphid infestation risk, always within [0, 1]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(transparent)]
pub struct RiskScore(f64);

impl RiskScore {
    /// Clamp a raw predictor output into [0, 1]. NaN maps to 0.
    pub fn clamped(raw: f64) -> Self {
        if raw.is_nan() {
            return RiskScore(0.0);
        }
        RiskScore(raw.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Value rounded to two decimals for display
    pub fn rounded(&self) -> f64 {
        (self.0 * 100.0).round() / 100.0
    }

    pub fn level(&self) -> RiskLevel {
        RiskLevel::from_score(self.0)
    }
}

/// Risk band shown to growers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// score < 0.3
    Low,
    /// 0.3 <= score < 0.6
    Moderate,
    /// score >= 0.6
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            RiskLevel::Low
        } else if score < 0.6 {
            RiskLevel::Moderate
        } else {
            RiskLevel::High
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Favorable conditions for crop growth",
            RiskLevel::Moderate => "Monitor crop health regularly",
            RiskLevel::High => "Consider preventive measures",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low Risk"),
            RiskLevel::Moderate => write!(f, "Moderate Risk"),
            RiskLevel::High => write!(f, "High Risk"),
        }
    }
}

/// Recommended follow-up actions for a score
pub fn recommended_actions(score: f64) -> Vec<&'static str> {
    if score > 0.5 {
        vec![
            "Increase monitoring frequency",
            "Consider biological controls",
            "Check for early signs of infestation",
            "Implement integrated pest management strategies",
        ]
    } else if score > 0.3 {
        vec![
            "Maintain regular monitoring schedule",
            "Watch for environmental changes",
        ]
    } else {
        Vec::new()
    }
}
