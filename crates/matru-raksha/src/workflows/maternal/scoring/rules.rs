use super::super::domain::{Mother, RiskFactor, Vitals};
use super::config::ScoringConfig;
use super::ScoreComponent;

const TEEN_AGE_BELOW: u8 = 18;
const ADVANCED_AGE_ABOVE: u8 = 35;

const UNDERWEIGHT_BMI_BELOW: f64 = 18.5;
const OVERWEIGHT_BMI_FROM: f64 = 25.0;
const OBESE_BMI_FROM: f64 = 30.0;

const HYPERTENSIVE_SYSTOLIC: i32 = 140;
const HYPERTENSIVE_DIASTOLIC: i32 = 90;
const SEVERE_SYSTOLIC: i32 = 160;
const SEVERE_DIASTOLIC: i32 = 110;

const ANEMIA_BELOW: f64 = 11.0;
const MODERATE_ANEMIA_BELOW: f64 = 9.0;
const SEVERE_ANEMIA_BELOW: f64 = 7.0;

const GRAND_MULTIPARA_GRAVIDA: u8 = 4;
const OLDER_PRIMIGRAVIDA_AGE_ABOVE: u8 = 30;

const GESTATIONAL_DIABETES_GLUCOSE: f64 = 140.0;

/// Points corresponding to a score of 1.0.
pub(crate) const MAX_POINTS: u16 = 1000;

/// Evaluate every factor and return the contributing components with their clamped total.
pub(crate) fn score_factors(
    mother: &Mother,
    vitals: &Vitals,
    config: &ScoringConfig,
) -> (Vec<ScoreComponent>, u16) {
    let components: Vec<ScoreComponent> = [
        age_factor(mother, config),
        bmi_factor(mother, config),
        blood_pressure_factor(vitals, config),
        hemoglobin_factor(vitals, config),
        obstetric_history_factor(mother, config),
        glucose_factor(vitals, config),
    ]
    .into_iter()
    .flatten()
    .filter(|component| component.points > 0)
    .collect();

    let total = components
        .iter()
        .fold(0u16, |total, component| total.saturating_add(component.points))
        .min(MAX_POINTS);

    (components, total)
}

fn component(factor: RiskFactor, points: u16, weight: u16, notes: String) -> ScoreComponent {
    ScoreComponent {
        factor,
        points: points.min(weight),
        notes,
    }
}

fn age_factor(mother: &Mother, config: &ScoringConfig) -> Option<ScoreComponent> {
    let notes = if mother.age < TEEN_AGE_BELOW {
        format!("teenage pregnancy (age {})", mother.age)
    } else if mother.age > ADVANCED_AGE_ABOVE {
        format!("advanced maternal age (age {})", mother.age)
    } else {
        return None;
    };

    Some(component(
        RiskFactor::Age,
        config.age_points,
        config.age_points,
        notes,
    ))
}

fn bmi_factor(mother: &Mother, config: &ScoringConfig) -> Option<ScoreComponent> {
    let bmi = mother.bmi;
    let (points, notes) = if bmi < UNDERWEIGHT_BMI_BELOW {
        (config.bmi_points, format!("underweight (bmi {bmi:.1})"))
    } else if bmi >= OBESE_BMI_FROM {
        (config.bmi_points, format!("obese (bmi {bmi:.1})"))
    } else if bmi >= OVERWEIGHT_BMI_FROM {
        (config.overweight_points, format!("overweight (bmi {bmi:.1})"))
    } else {
        return None;
    };

    Some(component(RiskFactor::Bmi, points, config.bmi_points, notes))
}

fn blood_pressure_factor(vitals: &Vitals, config: &ScoringConfig) -> Option<ScoreComponent> {
    let systolic = vitals.systolic_bp;
    let diastolic = vitals.diastolic_bp;
    if systolic.is_none() && diastolic.is_none() {
        return None;
    }

    let reading = format!(
        "{}/{} mmHg",
        systolic.map_or_else(|| "?".to_string(), |value| value.to_string()),
        diastolic.map_or_else(|| "?".to_string(), |value| value.to_string()),
    );

    let at_least = |value: Option<i32>, threshold: i32| value.is_some_and(|v| v >= threshold);

    let (points, notes) = if at_least(systolic, SEVERE_SYSTOLIC)
        || at_least(diastolic, SEVERE_DIASTOLIC)
    {
        (
            config.severe_hypertension_points,
            format!("severe hypertension ({reading})"),
        )
    } else if at_least(systolic, HYPERTENSIVE_SYSTOLIC)
        || at_least(diastolic, HYPERTENSIVE_DIASTOLIC)
    {
        (
            config.hypertension_points,
            format!("hypertension ({reading})"),
        )
    } else {
        return None;
    };

    Some(component(
        RiskFactor::BloodPressure,
        points,
        config.severe_hypertension_points,
        notes,
    ))
}

fn hemoglobin_factor(vitals: &Vitals, config: &ScoringConfig) -> Option<ScoreComponent> {
    let hemoglobin = vitals.hemoglobin?;

    let (points, notes) = if hemoglobin < SEVERE_ANEMIA_BELOW {
        (
            config.severe_anemia_points,
            format!("severe anemia (hb {hemoglobin:.1} g/dL)"),
        )
    } else if hemoglobin < MODERATE_ANEMIA_BELOW {
        (
            config.moderate_anemia_points,
            format!("moderate anemia (hb {hemoglobin:.1} g/dL)"),
        )
    } else if hemoglobin < ANEMIA_BELOW {
        (
            config.mild_anemia_points,
            format!("mild anemia (hb {hemoglobin:.1} g/dL)"),
        )
    } else {
        return None;
    };

    Some(component(
        RiskFactor::Hemoglobin,
        points,
        config.severe_anemia_points,
        notes,
    ))
}

fn obstetric_history_factor(mother: &Mother, config: &ScoringConfig) -> Option<ScoreComponent> {
    let notes = if mother.gravida >= GRAND_MULTIPARA_GRAVIDA {
        format!("grand multipara (gravida {})", mother.gravida)
    } else if mother.parity == 0 && mother.age > OLDER_PRIMIGRAVIDA_AGE_ABOVE {
        format!("older primigravida (age {}, parity 0)", mother.age)
    } else {
        return None;
    };

    Some(component(
        RiskFactor::ObstetricHistory,
        config.obstetric_history_points,
        config.obstetric_history_points,
        notes,
    ))
}

fn glucose_factor(vitals: &Vitals, config: &ScoringConfig) -> Option<ScoreComponent> {
    let glucose = vitals.blood_glucose?;
    if glucose < GESTATIONAL_DIABETES_GLUCOSE {
        return None;
    }

    Some(component(
        RiskFactor::Glucose,
        config.glucose_points,
        config.glucose_points,
        format!("glucose {glucose:.0} mg/dL in gestational diabetes range"),
    ))
}
