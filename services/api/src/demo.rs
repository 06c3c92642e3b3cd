use crate::infra::{default_scoring_config, parse_symptom, InMemoryCareStore, LoggingNotifier};
use chrono::{Duration, Utc};
use clap::Args;
use matru_raksha::error::AppError;
use matru_raksha::workflows::maternal::{
    AssessmentOutcome, AssessmentRequest, BatchOutcome, Language, MaternalCareService,
    MotherRegistration, Symptom, SymptomFlags, Vitals,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Mother's age in years
    #[arg(long)]
    pub(crate) age: u8,
    /// Body mass index
    #[arg(long, default_value_t = 22.0)]
    pub(crate) bmi: f64,
    /// Pregnancies including the current one
    #[arg(long, default_value_t = 1)]
    pub(crate) gravida: u8,
    /// Prior live births
    #[arg(long, default_value_t = 0)]
    pub(crate) parity: u8,
    #[arg(long)]
    pub(crate) systolic: Option<i32>,
    #[arg(long)]
    pub(crate) diastolic: Option<i32>,
    #[arg(long)]
    pub(crate) heart_rate: Option<i32>,
    /// Blood glucose in mg/dL
    #[arg(long)]
    pub(crate) glucose: Option<f64>,
    /// Hemoglobin in g/dL
    #[arg(long)]
    pub(crate) hemoglobin: Option<f64>,
    /// Gestational week, estimated from registration when omitted
    #[arg(long)]
    pub(crate) week: Option<u32>,
    /// Reported symptom (repeatable), e.g. --symptom severe_bleeding
    #[arg(long = "symptom", value_parser = parse_symptom)]
    pub(crate) symptoms: Vec<Symptom>,
    #[arg(long)]
    pub(crate) vaginal_bleeding: bool,
    #[arg(long)]
    pub(crate) epigastric_pain: bool,
    #[arg(long)]
    pub(crate) vision_changes: bool,
    /// Print the full outcome as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

const MAX_DAYS_LATER: i64 = 3650;

#[derive(Args, Debug, Default)]
pub(crate) struct BatchDemoArgs {
    /// Days between the seeded assessments and the batch run (at most ten years)
    #[arg(
        long,
        default_value_t = 7,
        value_parser = clap::value_parser!(i64).range(0..=MAX_DAYS_LATER)
    )]
    pub(crate) days_later: i64,
}

fn offline_service() -> MaternalCareService<InMemoryCareStore, LoggingNotifier> {
    MaternalCareService::new(
        Arc::new(InMemoryCareStore::default()),
        Arc::new(LoggingNotifier::default()),
        default_scoring_config(),
    )
}

fn walk_in_registration(age: u8, bmi: f64, gravida: u8, parity: u8) -> MotherRegistration {
    MotherRegistration {
        name: "Walk-in patient".to_string(),
        phone: "0000000000".to_string(),
        age,
        gravida,
        parity,
        bmi,
        location: "Offline clinic".to_string(),
        preferred_language: Language::En,
        notification_address: None,
        dietary_preference: None,
    }
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let service = offline_service();
    let now = Utc::now();
    let mother = service.register_mother(
        walk_in_registration(args.age, args.bmi, args.gravida, args.parity),
        now,
    )?;

    let mut symptoms = SymptomFlags {
        vaginal_bleeding: args.vaginal_bleeding,
        epigastric_pain: args.epigastric_pain,
        vision_changes: args.vision_changes,
        ..SymptomFlags::default()
    };
    symptoms.reported.extend(args.symptoms);

    let outcome = service.assess_risk(
        AssessmentRequest {
            mother_id: mother.id,
            vitals: Vitals {
                systolic_bp: args.systolic,
                diastolic_bp: args.diastolic,
                heart_rate: args.heart_rate,
                blood_glucose: args.glucose,
                hemoglobin: args.hemoglobin,
            },
            symptoms,
            gestational_week: args.week,
        },
        now,
    )?;

    if args.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Outcome payload unavailable: {err}"),
        }
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

fn print_outcome(outcome: &AssessmentOutcome) {
    println!(
        "Risk: {} (score {:.2})",
        outcome.risk_level.label(),
        outcome.risk_score
    );
    if outcome.risk_factors.is_empty() {
        println!("Contributing factors: none");
    } else {
        println!("Contributing factors:");
        for component in &outcome.assessment.components {
            println!(
                "  - {:<18} +{:.2}  {}",
                component.factor.name(),
                component.contribution(),
                component.notes
            );
        }
    }

    if let Some(event) = &outcome.emergency {
        println!("EMERGENCY ({} triggers)", event.triggers.len());
        for action in &event.immediate_actions {
            println!("  ! {action}");
        }
    }

    println!(
        "Care plan: next checkup in {} days, {} / {}",
        outcome.care_plan.next_checkup_in_days,
        outcome.care_plan.nutrition_key,
        outcome.care_plan.medication_key
    );
    for action in &outcome.care_plan.actions {
        println!("  * {action}");
    }

    if outcome.dispatched_tasks.is_empty() {
        println!("ASHA tasks: none (routine schedule)");
    } else {
        println!("ASHA tasks:");
        for task in &outcome.dispatched_tasks {
            println!(
                "  [{}] {} (due in {} days)",
                task.priority.label(),
                task.description,
                task.due_in_days
            );
        }
    }

    for note in &outcome.advisories {
        println!("Note: {note}");
    }
}

pub(crate) fn run_batch_demo(args: BatchDemoArgs) -> Result<(), AppError> {
    let service = offline_service();
    let seeded_at = Utc::now() - Duration::days(args.days_later.clamp(0, MAX_DAYS_LATER));

    let cohort = [
        (
            walk_in_registration(26, 21.5, 2, 1),
            Vitals {
                systolic_bp: Some(112),
                diastolic_bp: Some(74),
                hemoglobin: Some(12.1),
                ..Vitals::default()
            },
        ),
        (
            walk_in_registration(17, 19.0, 1, 0),
            Vitals {
                systolic_bp: Some(145),
                diastolic_bp: Some(95),
                blood_glucose: Some(110.0),
                hemoglobin: Some(10.0),
                ..Vitals::default()
            },
        ),
        (
            walk_in_registration(38, 31.0, 4, 3),
            Vitals {
                systolic_bp: Some(164),
                diastolic_bp: Some(104),
                blood_glucose: Some(150.0),
                hemoglobin: Some(8.2),
                ..Vitals::default()
            },
        ),
    ];

    for (registration, vitals) in cohort {
        let mother = service.register_mother(registration, seeded_at)?;
        service.assess_risk(
            AssessmentRequest {
                mother_id: mother.id,
                vitals,
                symptoms: SymptomFlags::default(),
                gestational_week: Some(20),
            },
            seeded_at,
        )?;
    }
    service.register_mother(walk_in_registration(30, 23.0, 1, 0), seeded_at)?;

    let items = service.run_batch_assessment(Utc::now())?;
    println!("Batch re-assessment ({} mothers)", items.len());
    for item in &items {
        match &item.outcome {
            BatchOutcome::Assessed {
                risk_level,
                risk_score,
                dispatched_tasks,
                ..
            } => println!(
                "  {}: {} ({:.2}), {} task(s)",
                item.mother_id,
                risk_level.label(),
                risk_score,
                dispatched_tasks
            ),
            BatchOutcome::Skipped { reason } => println!("  {}: skipped, {reason}", item.mother_id),
            BatchOutcome::Failed { error } => println!("  {}: failed, {error}", item.mother_id),
        }
    }

    let summary = service.dashboard()?;
    println!(
        "Dashboard: {} low / {} moderate / {} high, {} pending task(s)",
        summary.risk_distribution.low,
        summary.risk_distribution.moderate,
        summary.risk_distribution.high,
        summary.pending_tasks
    );
    Ok(())
}
