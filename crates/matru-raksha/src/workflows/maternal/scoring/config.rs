use serde::{Deserialize, Serialize};

/// Factor weights expressed in points per mille of the total score.
///
/// The highest tier of each factor is that factor's weight; the defaults sum to 1000 so a
/// mother hitting every factor at its most severe tier scores exactly 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub age_points: u16,
    pub bmi_points: u16,
    pub overweight_points: u16,
    pub hypertension_points: u16,
    pub severe_hypertension_points: u16,
    pub mild_anemia_points: u16,
    pub moderate_anemia_points: u16,
    pub severe_anemia_points: u16,
    pub obstetric_history_points: u16,
    pub glucose_points: u16,
    pub high_risk_threshold: f64,
    pub moderate_risk_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            age_points: 150,
            bmi_points: 100,
            overweight_points: 50,
            hypertension_points: 200,
            severe_hypertension_points: 300,
            mild_anemia_points: 100,
            moderate_anemia_points: 180,
            severe_anemia_points: 250,
            obstetric_history_points: 100,
            glucose_points: 100,
            high_risk_threshold: 0.7,
            moderate_risk_threshold: 0.4,
        }
    }
}
