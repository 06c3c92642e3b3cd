//! Red-flag detection that runs alongside routine scoring.
//!
//! A finding always escalates the assessment to HIGH, whatever the numeric score says.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::{EmergencyTrigger, RiskLevel, Symptom, SymptomFlags};

const CALL_AMBULANCE: &str = "Call ambulance immediately (108)";

/// Result of a triggered evaluation, before it is persisted as an `EmergencyEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyFinding {
    pub triggers: BTreeSet<EmergencyTrigger>,
    pub severity: RiskLevel,
    pub immediate_actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmergencyEvaluator;

impl EmergencyEvaluator {
    pub fn evaluate(&self, symptoms: &SymptomFlags) -> Option<EmergencyFinding> {
        let triggers = red_flags(symptoms);
        if triggers.is_empty() {
            return None;
        }

        let mut immediate_actions = vec![CALL_AMBULANCE.to_string()];
        for trigger in &triggers {
            for action in protocol(*trigger) {
                if !immediate_actions.iter().any(|existing| existing == action) {
                    immediate_actions.push((*action).to_string());
                }
            }
        }

        Some(EmergencyFinding {
            triggers,
            severity: RiskLevel::High,
            immediate_actions,
        })
    }

    /// Reported symptoms that do not escalate on their own but deserve monitoring.
    pub fn warning_signs(&self, symptoms: &SymptomFlags) -> Vec<Symptom> {
        symptoms
            .reported
            .iter()
            .copied()
            .filter(|symptom| {
                matches!(
                    symptom,
                    Symptom::SevereHeadache
                        | Symptom::AbdominalPain
                        | Symptom::VisionChanges
                        | Symptom::Dizziness
                )
            })
            .collect()
    }
}

fn red_flags(symptoms: &SymptomFlags) -> BTreeSet<EmergencyTrigger> {
    let mut triggers = BTreeSet::new();

    if symptoms.reports(Symptom::SevereBleeding) {
        triggers.insert(EmergencyTrigger::SevereBleeding);
    }
    if symptoms.reports(Symptom::Unconsciousness) {
        triggers.insert(EmergencyTrigger::Unconsciousness);
    }
    if symptoms.reports(Symptom::Seizures) {
        triggers.insert(EmergencyTrigger::Seizures);
    }
    if symptoms.vaginal_bleeding {
        triggers.insert(EmergencyTrigger::VaginalBleeding);
    }

    let vision_changes = symptoms.vision_changes || symptoms.reports(Symptom::VisionChanges);
    if symptoms.epigastric_pain && vision_changes {
        triggers.insert(EmergencyTrigger::EpigastricPainWithVisionChanges);
    }

    triggers
}

fn protocol(trigger: EmergencyTrigger) -> &'static [&'static str] {
    match trigger {
        EmergencyTrigger::SevereBleeding | EmergencyTrigger::VaginalBleeding => &[
            "Lie down with legs elevated",
            "Do not insert anything into the vagina",
            "Keep track of blood loss",
        ],
        EmergencyTrigger::Unconsciousness => &[
            "Turn her onto her left side",
            "Do not give anything by mouth",
        ],
        EmergencyTrigger::Seizures => &[
            "Turn her onto her left side",
            "Clear the area around her and do not restrain her",
            "Do not give anything by mouth",
        ],
        EmergencyTrigger::EpigastricPainWithVisionChanges => &[
            "Check blood pressure immediately",
            "Go to the hospital emergency ward",
            "Monitor for seizures",
        ],
    }
}
