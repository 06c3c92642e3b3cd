mod config;
mod policy;
mod rules;

pub use config::ScoringConfig;
pub use policy::RiskThresholds;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::{Mother, RiskFactor, RiskLevel};
use super::validation::ValidatedVitals;
use rules::{score_factors, MAX_POINTS};

/// Stateless evaluator that applies the weighted factor table to a mother and her vitals.
#[derive(Debug, Clone, Default)]
pub struct RiskScoringEngine {
    config: ScoringConfig,
    thresholds: RiskThresholds,
}

impl RiskScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        let thresholds = RiskThresholds::from(&config);
        Self { config, thresholds }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn thresholds(&self) -> RiskThresholds {
        self.thresholds
    }

    /// Pure function of its inputs: identical arguments always give identical results.
    pub fn score(&self, mother: &Mother, vitals: &ValidatedVitals) -> RiskScore {
        let (components, points) = score_factors(mother, vitals.vitals(), &self.config);
        let risk_score = f64::from(points) / f64::from(MAX_POINTS);
        let risk_factors = components.iter().map(|component| component.factor).collect();

        RiskScore {
            risk_score,
            risk_level: self.thresholds.classify(risk_score),
            risk_factors,
            components,
        }
    }
}

/// Discrete contribution to a risk score, kept for audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: RiskFactor,
    pub points: u16,
    pub notes: String,
}

impl ScoreComponent {
    pub fn contribution(&self) -> f64 {
        f64::from(self.points) / f64::from(MAX_POINTS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_factors: BTreeSet<RiskFactor>,
    pub components: Vec<ScoreComponent>,
}
