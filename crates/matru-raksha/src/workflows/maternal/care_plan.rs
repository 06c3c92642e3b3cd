use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::{DietaryPreference, Language, RiskFactor, RiskLevel, Symptom, Trimester};

/// Follow-up guidance derived from an assessment. Regenerated on demand, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarePlan {
    pub next_checkup_in_days: u32,
    pub actions: Vec<String>,
    pub nutrition_key: String,
    pub medication_key: String,
    pub language: Language,
    pub trimester: Trimester,
}

/// Everything the generator can take into account beyond the risk level.
#[derive(Debug, Clone)]
pub struct CarePlanInputs {
    pub risk_level: RiskLevel,
    pub trimester: Option<Trimester>,
    pub language: Language,
    pub diet: DietaryPreference,
    pub risk_factors: BTreeSet<RiskFactor>,
    pub emergency: bool,
    pub warning_signs: Vec<Symptom>,
}

/// Template used when the gestational week is unknown or out of range.
const DEFAULT_TRIMESTER: Trimester = Trimester::Second;

#[derive(Debug, Clone, Copy, Default)]
pub struct CarePlanGenerator;

impl CarePlanGenerator {
    pub fn generate(
        &self,
        risk_level: RiskLevel,
        trimester: Option<Trimester>,
        language: Language,
    ) -> CarePlan {
        self.generate_for(&CarePlanInputs {
            risk_level,
            trimester,
            language,
            diet: DietaryPreference::default(),
            risk_factors: BTreeSet::new(),
            emergency: false,
            warning_signs: Vec::new(),
        })
    }

    pub fn generate_for(&self, inputs: &CarePlanInputs) -> CarePlan {
        let risk_level = inputs.risk_level;
        let trimester = inputs.trimester.unwrap_or(DEFAULT_TRIMESTER);

        let mut actions = Vec::new();
        if inputs.emergency {
            actions.push("Call ambulance (108) and escort her to the nearest hospital".to_string());
        }
        actions.extend(level_actions(risk_level).iter().map(ToString::to_string));
        for factor in &inputs.risk_factors {
            if let Some(action) = factor_action(*factor) {
                actions.push(action.to_string());
            }
        }
        for symptom in &inputs.warning_signs {
            actions.push(format!(
                "Monitor {} and report if it worsens",
                symptom.name().replace('_', " ")
            ));
        }

        CarePlan {
            next_checkup_in_days: checkup_interval(risk_level),
            actions,
            nutrition_key: format!("nutrition.{}.{}", trimester.key(), inputs.diet.key()),
            medication_key: medication_key(trimester, &inputs.risk_factors).to_string(),
            language: inputs.language,
            trimester,
        }
    }
}

pub fn checkup_interval(risk_level: RiskLevel) -> u32 {
    match risk_level {
        RiskLevel::High => 7,
        RiskLevel::Moderate => 14,
        RiskLevel::Low => 28,
    }
}

fn level_actions(risk_level: RiskLevel) -> &'static [&'static str] {
    match risk_level {
        RiskLevel::High => &[
            "Urgent referral to the district hospital",
            "Specialist consultation within 24 hours",
            "Consider admission for observation",
        ],
        RiskLevel::Moderate => &[
            "Antenatal checkup at the primary health centre within 2 weeks",
            "ASHA home visit to review vitals",
        ],
        RiskLevel::Low => &[
            "Continue routine antenatal checkups",
            "Maintain a balanced diet and daily rest",
        ],
    }
}

fn factor_action(factor: RiskFactor) -> Option<&'static str> {
    match factor {
        RiskFactor::BloodPressure => Some("Recheck blood pressure and test urine for protein"),
        RiskFactor::Hemoglobin => Some("Repeat hemoglobin test and review iron intake"),
        RiskFactor::Glucose => Some("Arrange an oral glucose tolerance test"),
        RiskFactor::Bmi => Some("Refer for nutrition counselling"),
        RiskFactor::Age | RiskFactor::ObstetricHistory => None,
    }
}

fn medication_key(trimester: Trimester, risk_factors: &BTreeSet<RiskFactor>) -> &'static str {
    if risk_factors.contains(&RiskFactor::Hemoglobin) {
        return "medication.therapeutic_iron";
    }
    if risk_factors.contains(&RiskFactor::BloodPressure) {
        return "medication.bp_review";
    }

    match trimester {
        Trimester::First => "medication.folic_acid",
        Trimester::Second | Trimester::Third => "medication.iron_calcium",
    }
}
