use super::super::domain::RiskLevel;
use super::config::ScoringConfig;

/// Score cut-offs shared with the dashboard so both sides classify identically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    pub high: f64,
    pub moderate: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: 0.7,
            moderate: 0.4,
        }
    }
}

impl From<&ScoringConfig> for RiskThresholds {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            high: config.high_risk_threshold,
            moderate: config.moderate_risk_threshold,
        }
    }
}

impl RiskThresholds {
    pub fn classify(&self, risk_score: f64) -> RiskLevel {
        if risk_score >= self.high {
            RiskLevel::High
        } else if risk_score >= self.moderate {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

impl RiskLevel {
    /// Classify with the default thresholds.
    pub fn from_score(risk_score: f64) -> Self {
        RiskThresholds::default().classify(risk_score)
    }
}
