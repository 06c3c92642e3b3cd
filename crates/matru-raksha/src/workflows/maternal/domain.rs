use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::ScoreComponent;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of a registered mother, the aggregate root of every care record.
    MotherId
);
record_id!(AssessmentId);
record_id!(TaskId);
record_id!(EmergencyId);

/// Languages supported by the outbound notification templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Mr,
    Hi,
}

impl Language {
    pub const fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Mr => "mr",
            Language::Hi => "hi",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietaryPreference {
    #[default]
    Vegetarian,
    NonVegetarian,
}

impl DietaryPreference {
    pub const fn key(self) -> &'static str {
        match self {
            DietaryPreference::Vegetarian => "vegetarian",
            DietaryPreference::NonVegetarian => "non_vegetarian",
        }
    }
}

/// Caller supplied profile used for registration and explicit profile updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotherRegistration {
    pub name: String,
    pub phone: String,
    pub age: u8,
    pub gravida: u8,
    pub parity: u8,
    pub bmi: f64,
    pub location: String,
    #[serde(default)]
    pub preferred_language: Language,
    #[serde(default)]
    pub notification_address: Option<String>,
    #[serde(default)]
    pub dietary_preference: Option<DietaryPreference>,
}

/// Registered mother with the static and slow-changing attributes used by scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mother {
    pub id: MotherId,
    pub name: String,
    pub phone: String,
    pub age: u8,
    pub gravida: u8,
    pub parity: u8,
    pub bmi: f64,
    pub location: String,
    pub preferred_language: Language,
    pub notification_address: Option<String>,
    pub dietary_preference: Option<DietaryPreference>,
    pub registered_at: DateTime<Utc>,
}

/// Gestational week assumed at the first antenatal registration.
const WEEK_AT_REGISTRATION: i64 = 8;

impl Mother {
    pub fn from_registration(
        id: MotherId,
        registration: MotherRegistration,
        registered_at: DateTime<Utc>,
    ) -> Self {
        let MotherRegistration {
            name,
            phone,
            age,
            gravida,
            parity,
            bmi,
            location,
            preferred_language,
            notification_address,
            dietary_preference,
        } = registration;

        Self {
            id,
            name,
            phone,
            age,
            gravida,
            parity,
            bmi,
            location,
            preferred_language,
            notification_address: normalize_address(notification_address),
            dietary_preference,
            registered_at,
        }
    }

    /// Replace every caller-owned field; identity and registration time are preserved.
    pub fn apply(&mut self, registration: MotherRegistration) {
        let MotherRegistration {
            name,
            phone,
            age,
            gravida,
            parity,
            bmi,
            location,
            preferred_language,
            notification_address,
            dietary_preference,
        } = registration;

        self.name = name;
        self.phone = phone;
        self.age = age;
        self.gravida = gravida;
        self.parity = parity;
        self.bmi = bmi;
        self.location = location;
        self.preferred_language = preferred_language;
        self.notification_address = normalize_address(notification_address);
        self.dietary_preference = dietary_preference;
    }

    /// Estimate the gestational week from the registration date when no week was reported.
    pub fn estimated_gestational_week(&self, as_of: DateTime<Utc>) -> u32 {
        let days = (as_of - self.registered_at).num_days().max(0);
        (WEEK_AT_REGISTRATION + days / 7).clamp(0, i64::from(u32::MAX)) as u32
    }
}

fn normalize_address(address: Option<String>) -> Option<String> {
    address
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Raw clinical measurements; each one may be omitted by the caller. Readings are signed so
/// implausible values reach the validator instead of failing to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vitals {
    pub systolic_bp: Option<i32>,
    pub diastolic_bp: Option<i32>,
    pub heart_rate: Option<i32>,
    pub blood_glucose: Option<f64>,
    pub hemoglobin: Option<f64>,
}

/// Fixed vocabulary of symptoms a mother or ASHA worker can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symptom {
    SevereBleeding,
    Unconsciousness,
    Seizures,
    SevereHeadache,
    AbdominalPain,
    VisionChanges,
    Dizziness,
    MildPain,
}

impl Symptom {
    pub const fn name(self) -> &'static str {
        match self {
            Symptom::SevereBleeding => "severe_bleeding",
            Symptom::Unconsciousness => "unconsciousness",
            Symptom::Seizures => "seizures",
            Symptom::SevereHeadache => "severe_headache",
            Symptom::AbdominalPain => "abdominal_pain",
            Symptom::VisionChanges => "vision_changes",
            Symptom::Dizziness => "dizziness",
            Symptom::MildPain => "mild_pain",
        }
    }
}

/// Clinical findings recorded with an assessment plus any reported symptoms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymptomFlags {
    pub proteinuria: bool,
    pub edema: bool,
    pub headache: bool,
    pub vision_changes: bool,
    pub epigastric_pain: bool,
    pub vaginal_bleeding: bool,
    pub reported: BTreeSet<Symptom>,
}

impl SymptomFlags {
    pub fn reports(&self, symptom: Symptom) -> bool {
        self.reported.contains(&symptom)
    }

    pub fn with_reported(mut self, symptom: Symptom) -> Self {
        self.reported.insert(symptom);
        self
    }
}

/// Discretized output of the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
        }
    }
}

/// Closed set of weighted factors considered by the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Age,
    Bmi,
    BloodPressure,
    Hemoglobin,
    ObstetricHistory,
    Glucose,
}

impl RiskFactor {
    pub const fn name(self) -> &'static str {
        match self {
            RiskFactor::Age => "age",
            RiskFactor::Bmi => "bmi",
            RiskFactor::BloodPressure => "blood_pressure",
            RiskFactor::Hemoglobin => "hemoglobin",
            RiskFactor::ObstetricHistory => "obstetric_history",
            RiskFactor::Glucose => "glucose",
        }
    }
}

/// One clinical snapshot. Never edited; a new snapshot is a new assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub mother_id: MotherId,
    pub vitals: Vitals,
    pub symptoms: SymptomFlags,
    pub gestational_week: Option<u32>,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_factors: BTreeSet<RiskFactor>,
    pub components: Vec<ScoreComponent>,
    pub emergency_override: bool,
    pub created_at: DateTime<Utc>,
}

/// Red-flag findings that escalate an assessment regardless of its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyTrigger {
    SevereBleeding,
    Unconsciousness,
    Seizures,
    VaginalBleeding,
    EpigastricPainWithVisionChanges,
}

impl EmergencyTrigger {
    pub const fn name(self) -> &'static str {
        match self {
            EmergencyTrigger::SevereBleeding => "severe_bleeding",
            EmergencyTrigger::Unconsciousness => "unconsciousness",
            EmergencyTrigger::Seizures => "seizures",
            EmergencyTrigger::VaginalBleeding => "vaginal_bleeding",
            EmergencyTrigger::EpigastricPainWithVisionChanges => {
                "epigastric_pain_with_vision_changes"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyEvent {
    pub id: EmergencyId,
    pub assessment_id: AssessmentId,
    pub mother_id: MotherId,
    pub triggers: BTreeSet<EmergencyTrigger>,
    pub severity: RiskLevel,
    pub immediate_actions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Pregnancy period used to select care plan templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trimester {
    First,
    Second,
    Third,
}

impl Trimester {
    /// Weeks 1-13, 14-27 and 28-42; anything else is treated as unknown.
    pub fn from_week(week: u32) -> Option<Self> {
        match week {
            1..=13 => Some(Trimester::First),
            14..=27 => Some(Trimester::Second),
            28..=42 => Some(Trimester::Third),
            _ => None,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Trimester::First => "first_trimester",
            Trimester::Second => "second_trimester",
            Trimester::Third => "third_trimester",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const fn label(self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
}

/// Follow-up work for the ASHA worker covering the mother's area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AshaTask {
    pub id: TaskId,
    pub mother_id: MotherId,
    pub assessment_id: Option<AssessmentId>,
    pub emergency_id: Option<EmergencyId>,
    pub priority: TaskPriority,
    pub description: String,
    pub due_in_days: u32,
    pub due_at: DateTime<Utc>,
    pub visit_checklist: Vec<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AshaTask {
    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }
}

/// Input for a single assessment submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub mother_id: MotherId,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub symptoms: SymptomFlags,
    #[serde(default)]
    pub gestational_week: Option<u32>,
}

/// Findings recorded by an ASHA worker at a home visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AshaVisitReport {
    pub mother_id: MotherId,
    /// Task the visit fulfils. When omitted, every task pending at the time of the visit closes.
    #[serde(default)]
    pub task_id: Option<TaskId>,
    pub asha_worker_id: String,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub symptoms: SymptomFlags,
    #[serde(default)]
    pub gestational_week: Option<u32>,
    #[serde(default)]
    pub observations: String,
}
