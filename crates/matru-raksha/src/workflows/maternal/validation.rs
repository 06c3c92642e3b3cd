use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{MotherRegistration, Vitals};

/// Measurement names as they appear on the wire and in violation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalField {
    SystolicBp,
    DiastolicBp,
    HeartRate,
    BloodGlucose,
    Hemoglobin,
}

impl VitalField {
    pub const fn name(self) -> &'static str {
        match self {
            VitalField::SystolicBp => "systolic_bp",
            VitalField::DiastolicBp => "diastolic_bp",
            VitalField::HeartRate => "heart_rate",
            VitalField::BloodGlucose => "blood_glucose",
            VitalField::Hemoglobin => "hemoglobin",
        }
    }
}

/// Inclusive plausibility range for a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalRange {
    pub min: f64,
    pub max: f64,
}

impl VitalRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn check(&self, field: VitalField, value: f64) -> Option<VitalsViolation> {
        let bound = if !value.is_finite() {
            ViolatedBound::NotFinite
        } else if value < self.min {
            ViolatedBound::Minimum { min: self.min }
        } else if value > self.max {
            ViolatedBound::Maximum { max: self.max }
        } else {
            return None;
        };

        Some(VitalsViolation {
            field,
            value,
            bound,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolatedBound {
    Minimum { min: f64 },
    Maximum { max: f64 },
    NotFinite,
}

/// A single out-of-range measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalsViolation {
    pub field: VitalField,
    pub value: f64,
    pub bound: ViolatedBound,
}

impl fmt::Display for VitalsViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bound {
            ViolatedBound::Minimum { min } => {
                write!(f, "{} {} is below minimum {}", self.field.name(), self.value, min)
            }
            ViolatedBound::Maximum { max } => {
                write!(f, "{} {} exceeds maximum {}", self.field.name(), self.value, max)
            }
            ViolatedBound::NotFinite => write!(f, "{} is not a finite number", self.field.name()),
        }
    }
}

/// Every violation found in a submission; the whole submission is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("vitals rejected: {}", describe(.violations))]
pub struct VitalsRejection {
    pub violations: Vec<VitalsViolation>,
}

impl VitalsRejection {
    pub fn names(&self, field: VitalField) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.field == field)
    }
}

fn describe(violations: &[VitalsViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Vitals that passed the plausibility checks. Only the validator constructs this type, so the
/// scoring engine never reads unchecked measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedVitals {
    vitals: Vitals,
    advisories: Vec<String>,
}

impl ValidatedVitals {
    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    /// Non-blocking notes, such as a heart rate outside the usual range.
    pub fn advisories(&self) -> &[String] {
        &self.advisories
    }
}

const SYSTOLIC_RANGE: VitalRange = VitalRange::new(60.0, 200.0);
const DIASTOLIC_RANGE: VitalRange = VitalRange::new(40.0, 130.0);
const GLUCOSE_RANGE: VitalRange = VitalRange::new(40.0, 400.0);
const HEMOGLOBIN_RANGE: VitalRange = VitalRange::new(5.0, 20.0);
const HEART_RATE_ADVISORY_RANGE: VitalRange = VitalRange::new(40.0, 200.0);

/// Stateless plausibility checker applied before any field reaches scoring.
#[derive(Debug, Clone)]
pub struct VitalsValidator {
    systolic: VitalRange,
    diastolic: VitalRange,
    glucose: VitalRange,
    hemoglobin: VitalRange,
    heart_rate_advisory: VitalRange,
}

impl Default for VitalsValidator {
    fn default() -> Self {
        Self {
            systolic: SYSTOLIC_RANGE,
            diastolic: DIASTOLIC_RANGE,
            glucose: GLUCOSE_RANGE,
            hemoglobin: HEMOGLOBIN_RANGE,
            heart_rate_advisory: HEART_RATE_ADVISORY_RANGE,
        }
    }
}

impl VitalsValidator {
    pub fn validate(&self, vitals: &Vitals) -> Result<ValidatedVitals, VitalsRejection> {
        let checks = [
            (
                VitalField::SystolicBp,
                vitals.systolic_bp.map(f64::from),
                &self.systolic,
            ),
            (
                VitalField::DiastolicBp,
                vitals.diastolic_bp.map(f64::from),
                &self.diastolic,
            ),
            (VitalField::BloodGlucose, vitals.blood_glucose, &self.glucose),
            (VitalField::Hemoglobin, vitals.hemoglobin, &self.hemoglobin),
        ];

        let violations: Vec<VitalsViolation> = checks
            .into_iter()
            .filter_map(|(field, value, range)| value.and_then(|value| range.check(field, value)))
            .collect();

        if !violations.is_empty() {
            return Err(VitalsRejection { violations });
        }

        let advisories = vitals
            .heart_rate
            .and_then(|rate| {
                self.heart_rate_advisory
                    .check(VitalField::HeartRate, f64::from(rate))
            })
            .map(|note| vec![format!("advisory: {note}")])
            .unwrap_or_default();

        Ok(ValidatedVitals {
            vitals: *vitals,
            advisories,
        })
    }
}

/// Registration problems detected before a mother is stored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileViolation {
    #[error("name must not be empty")]
    MissingName,
    #[error("phone number must contain at least 10 digits")]
    InvalidPhone,
    #[error("age {0} is outside the supported range 15-50")]
    AgeOutOfRange(u8),
    #[error("gravida must be at least 1")]
    InvalidGravida,
    #[error("parity {parity} cannot exceed gravida {gravida}")]
    ParityExceedsGravida { gravida: u8, parity: u8 },
    #[error("bmi {0} is outside the plausible range 10-50")]
    BmiOutOfRange(f64),
    #[error("location must not be empty")]
    MissingLocation,
}

const MIN_PHONE_DIGITS: usize = 10;
const MIN_AGE: u8 = 15;
const MAX_AGE: u8 = 50;
const MIN_BMI: f64 = 10.0;
const MAX_BMI: f64 = 50.0;

/// Intake checks for mother profiles.
pub fn validate_registration(registration: &MotherRegistration) -> Result<(), ProfileViolation> {
    if registration.name.trim().is_empty() {
        return Err(ProfileViolation::MissingName);
    }

    let digits = registration
        .phone
        .chars()
        .filter(|ch| ch.is_ascii_digit())
        .count();
    if digits < MIN_PHONE_DIGITS {
        return Err(ProfileViolation::InvalidPhone);
    }

    if !(MIN_AGE..=MAX_AGE).contains(&registration.age) {
        return Err(ProfileViolation::AgeOutOfRange(registration.age));
    }

    if registration.gravida == 0 {
        return Err(ProfileViolation::InvalidGravida);
    }

    if registration.parity > registration.gravida {
        return Err(ProfileViolation::ParityExceedsGravida {
            gravida: registration.gravida,
            parity: registration.parity,
        });
    }

    if !registration.bmi.is_finite() || !(MIN_BMI..=MAX_BMI).contains(&registration.bmi) {
        return Err(ProfileViolation::BmiOutOfRange(registration.bmi));
    }

    if registration.location.trim().is_empty() {
        return Err(ProfileViolation::MissingLocation);
    }

    Ok(())
}
