use std::sync::Arc;

use chrono::Duration;

use super::common::*;
use crate::workflows::maternal::domain::{
    AshaVisitReport, MotherId, MotherRegistration, RiskFactor, RiskLevel, Symptom, SymptomFlags,
    TaskId, TaskPriority, TaskStatus, Trimester, Vitals,
};
use crate::workflows::maternal::repository::{CareRecordStore, RecipientRef, RepositoryError};
use crate::workflows::maternal::scoring::ScoringConfig;
use crate::workflows::maternal::service::{
    BatchOutcome, PipelineStage, SideEffect, EMERGENCY_ALERT_TEMPLATE,
    MILESTONE_REMINDER_TEMPLATE, RISK_ALERT_TEMPLATE, TASK_ASSIGNED_TEMPLATE,
    VISIT_CONFIRMATION_TEMPLATE,
};
use crate::workflows::maternal::validation::{ProfileViolation, VitalField};
use crate::workflows::maternal::{MaternalCareError, MaternalCareService};

#[test]
fn register_stores_a_normalized_profile() {
    let (service, store, _) = build_service();
    let mut registration = registration();
    registration.notification_address = Some("  chat-77  ".to_string());

    let mother = service
        .register_mother(registration, now())
        .expect("registration succeeds");

    assert!(mother.id.0.starts_with("mother-"));
    assert_eq!(mother.notification_address.as_deref(), Some("chat-77"));
    assert_eq!(mother.registered_at, now());
    assert_eq!(
        store.get_mother(&mother.id).expect("lookup"),
        Some(mother.clone())
    );
}

#[test]
fn register_rejects_invalid_profiles() {
    let (service, store, _) = build_service();
    let registration = MotherRegistration {
        age: 13,
        ..registration()
    };

    match service.register_mother(registration, now()) {
        Err(MaternalCareError::Registration(ProfileViolation::AgeOutOfRange(13))) => {}
        other => panic!("expected age violation, got {other:?}"),
    }
    assert!(store.list_mothers().expect("list").is_empty());
}

#[test]
fn update_mother_replaces_profile_but_keeps_identity() {
    let (service, _, _) = build_service();
    let mother = service
        .register_mother(registration(), now())
        .expect("registered");

    let updated = service
        .update_mother(
            &mother.id,
            MotherRegistration {
                bmi: 24.0,
                notification_address: Some(" ".to_string()),
                ..registration()
            },
        )
        .expect("update succeeds");

    assert_eq!(updated.id, mother.id);
    assert_eq!(updated.registered_at, mother.registered_at);
    assert_eq!(updated.bmi, 24.0);
    assert_eq!(updated.notification_address, None);
    assert_eq!(service.get_mother(&mother.id).expect("fetch"), updated);
}

#[test]
fn unknown_mother_is_not_found_and_nothing_is_stored() {
    let (service, store, _) = build_service();
    let missing = MotherId("mother-missing".to_string());

    match service.assess_risk(request(&missing, normal_vitals()), now()) {
        Err(MaternalCareError::UnknownMother(id)) => assert_eq!(id, missing),
        other => panic!("expected unknown mother, got {other:?}"),
    }
    assert_eq!(store.assessment_count(), 0);
    assert!(matches!(
        service.update_mother(&missing, registration()),
        Err(MaternalCareError::UnknownMother(_))
    ));
}

#[test]
fn out_of_range_vitals_are_rejected_without_persisting() {
    let (service, store, notifier) = build_service();
    let mother = service
        .register_mother(registration(), now())
        .expect("registered");
    let vitals = Vitals {
        systolic_bp: Some(250),
        ..normal_vitals()
    };

    match service.assess_risk(request(&mother.id, vitals), now()) {
        Err(MaternalCareError::Validation(rejection)) => {
            assert!(rejection.names(VitalField::SystolicBp));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(store.assessment_count(), 0);
    assert_eq!(store.task_count(), 0);
    assert!(notifier.sent().is_empty());
}

#[test]
fn low_risk_assessment_dispatches_nothing() {
    let (service, store, notifier) = build_service();
    let mother = service
        .register_mother(registration(), now())
        .expect("registered");

    let outcome = service
        .assess_risk(request(&mother.id, normal_vitals()), now())
        .expect("assessment succeeds");

    assert_eq!(outcome.risk_level, RiskLevel::Low);
    assert!(outcome.dispatched_tasks.is_empty());
    assert_eq!(outcome.care_plan.next_checkup_in_days, 28);
    assert_eq!(store.assessment_count(), 1);
    assert!(notifier.sent().is_empty());
    assert_eq!(
        outcome.stages,
        vec![
            PipelineStage::Received,
            PipelineStage::Validated,
            PipelineStage::RoutineScored,
            PipelineStage::PlanGenerated,
            PipelineStage::TasksDispatched,
            PipelineStage::Notified,
            PipelineStage::Done,
        ]
    );
}

#[test]
fn end_to_end_fixture_is_moderate_with_one_medium_task() {
    let (service, store, notifier) = build_service();
    let mother = service
        .register_mother(teen_registration(), now())
        .expect("registered");

    let outcome = service
        .assess_risk(request(&mother.id, fixture_vitals()), now())
        .expect("assessment succeeds");

    assert_eq!(outcome.risk_score, 0.45);
    assert_eq!(outcome.risk_level, RiskLevel::Moderate);
    assert!(outcome.risk_factors.contains(&RiskFactor::Age));
    assert!(outcome.risk_factors.contains(&RiskFactor::BloodPressure));
    assert!(outcome.risk_factors.contains(&RiskFactor::Hemoglobin));
    assert!(!outcome.assessment.emergency_override);

    assert_eq!(outcome.dispatched_tasks.len(), 1);
    let task = &outcome.dispatched_tasks[0];
    assert_eq!(task.priority, TaskPriority::Medium);
    assert_eq!(task.due_in_days, 7);
    assert_eq!(task.due_at, now() + Duration::days(7));
    assert_eq!(task.assessment_id.as_ref(), Some(&outcome.assessment_id));
    assert_eq!(store.task_count(), 1);

    assert_eq!(outcome.care_plan.trimester, Trimester::Second);
    assert_eq!(outcome.care_plan.medication_key, "medication.therapeutic_iron");

    assert_eq!(
        notifier.templates(),
        vec![
            RISK_ALERT_TEMPLATE.to_string(),
            TASK_ASSIGNED_TEMPLATE.to_string()
        ]
    );
    let sent = notifier.sent();
    assert_eq!(sent[0].recipient, RecipientRef::Mother("chat-4411".to_string()));
    assert_eq!(sent[0].payload.get("risk_score").map(String::as_str), Some("0.45"));
    assert_eq!(
        sent[1].recipient,
        RecipientRef::AshaDesk("Haveli, Pune".to_string())
    );
}

#[test]
fn high_risk_assessment_schedules_visit_within_a_day() {
    let (service, _, _) = build_service();
    let mother = service
        .register_mother(older_registration(), now())
        .expect("registered");

    let outcome = service
        .assess_risk(request(&mother.id, high_risk_vitals()), now())
        .expect("assessment succeeds");

    assert_eq!(outcome.risk_level, RiskLevel::High);
    assert_eq!(outcome.care_plan.next_checkup_in_days, 7);
    assert_eq!(outcome.dispatched_tasks.len(), 1);
    assert_eq!(outcome.dispatched_tasks[0].priority, TaskPriority::High);
    assert_eq!(outcome.dispatched_tasks[0].due_in_days, 1);
}

#[test]
fn severe_bleeding_overrides_a_low_score() {
    let (service, store, notifier) = build_service();
    let mother = service
        .register_mother(registration(), now())
        .expect("registered");
    let mut request = request(&mother.id, normal_vitals());
    request.symptoms = SymptomFlags::default().with_reported(Symptom::SevereBleeding);

    let outcome = service
        .assess_risk(request, now())
        .expect("assessment succeeds");

    assert_eq!(outcome.risk_score, 0.0);
    assert_eq!(outcome.risk_level, RiskLevel::High);
    assert!(outcome.assessment.emergency_override);
    assert!(outcome.stages.contains(&PipelineStage::EmergencyEscalated));
    assert!(!outcome.stages.contains(&PipelineStage::RoutineScored));

    assert_eq!(outcome.dispatched_tasks.len(), 1);
    let task = &outcome.dispatched_tasks[0];
    assert_eq!(task.priority, TaskPriority::High);
    assert_eq!(task.due_in_days, 0);

    let event = outcome.emergency.as_ref().expect("emergency recorded");
    assert_eq!(event.severity, RiskLevel::High);
    assert_eq!(task.emergency_id.as_ref(), Some(&event.id));
    assert_eq!(store.emergency_count(), 1);
    assert!(outcome.care_plan.actions[0].contains("Call ambulance"));

    let templates = notifier.templates();
    assert_eq!(
        templates
            .iter()
            .filter(|template| *template == EMERGENCY_ALERT_TEMPLATE)
            .count(),
        2
    );
    assert!(!templates.iter().any(|template| template == RISK_ALERT_TEMPLATE));
}

#[test]
fn emergency_override_holds_regardless_of_score() {
    let (service, _, _) = build_service();
    for (registration, vitals) in [
        (registration(), normal_vitals()),
        (teen_registration(), fixture_vitals()),
        (older_registration(), high_risk_vitals()),
    ] {
        let mother = service
            .register_mother(registration, now())
            .expect("registered");
        let mut request = request(&mother.id, vitals);
        request.symptoms = SymptomFlags::default().with_reported(Symptom::SevereBleeding);

        let outcome = service.assess_risk(request, now()).expect("assessed");

        assert_eq!(outcome.risk_level, RiskLevel::High);
        assert_eq!(outcome.dispatched_tasks.len(), 1);
        assert_eq!(outcome.dispatched_tasks[0].priority, TaskPriority::High);
    }
}

#[test]
fn notification_failures_do_not_invalidate_the_result() {
    let store = Arc::new(MemoryStore::default());
    let service = MaternalCareService::new(
        store.clone(),
        Arc::new(OfflineNotifier),
        ScoringConfig::default(),
    );
    let mother = service
        .register_mother(teen_registration(), now())
        .expect("registered");

    let outcome = service
        .assess_risk(request(&mother.id, fixture_vitals()), now())
        .expect("assessment still succeeds");

    assert_eq!(outcome.risk_level, RiskLevel::Moderate);
    assert_eq!(outcome.dispatched_tasks.len(), 1);
    assert_eq!(outcome.side_effect_failures.len(), 2);
    assert!(outcome
        .side_effect_failures
        .iter()
        .all(|failure| failure.effect == SideEffect::Notify));
    assert_eq!(store.assessment_count(), 1);
    assert_eq!(store.task_count(), 1);
}

#[test]
fn task_write_failures_are_reported_not_fatal() {
    let (service, store, notifier) = build_service_with(MemoryStore::failing(FailOn::Tasks));
    let mother = service
        .register_mother(teen_registration(), now())
        .expect("registered");

    let outcome = service
        .assess_risk(request(&mother.id, fixture_vitals()), now())
        .expect("assessment succeeds");

    assert!(outcome.dispatched_tasks.is_empty());
    assert_eq!(outcome.side_effect_failures.len(), 1);
    assert_eq!(outcome.side_effect_failures[0].effect, SideEffect::PersistTask);
    assert_eq!(store.assessment_count(), 1);
    assert_eq!(notifier.templates(), vec![RISK_ALERT_TEMPLATE.to_string()]);
}

#[test]
fn emergency_write_failures_are_reported_not_fatal() {
    let (service, store, _) = build_service_with(MemoryStore::failing(FailOn::Emergencies));
    let mother = service
        .register_mother(registration(), now())
        .expect("registered");
    let mut request = request(&mother.id, normal_vitals());
    request.symptoms.vaginal_bleeding = true;

    let outcome = service.assess_risk(request, now()).expect("assessed");

    assert_eq!(outcome.risk_level, RiskLevel::High);
    assert_eq!(
        outcome.side_effect_failures[0].effect,
        SideEffect::PersistEmergency
    );
    assert_eq!(store.emergency_count(), 0);
    assert_eq!(outcome.dispatched_tasks.len(), 1);
}

#[test]
fn assessment_write_failure_is_fatal() {
    let (service, store, notifier) =
        build_service_with(MemoryStore::failing(FailOn::Assessments));
    let mother = service
        .register_mother(teen_registration(), now())
        .expect("registered");

    match service.assess_risk(request(&mother.id, fixture_vitals()), now()) {
        Err(MaternalCareError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository failure, got {other:?}"),
    }
    assert_eq!(store.task_count(), 0);
    assert!(notifier.sent().is_empty());
}

#[test]
fn stored_assessment_rescoring_reproduces_the_result() {
    let (service, store, _) = build_service();
    let mother = service
        .register_mother(teen_registration(), now())
        .expect("registered");
    let outcome = service
        .assess_risk(request(&mother.id, fixture_vitals()), now())
        .expect("assessed");

    let stored = store
        .get_assessment(&outcome.assessment_id)
        .expect("lookup")
        .expect("stored");
    let rescored = service.engine().score(&mother, &validated(stored.vitals));

    assert_eq!(rescored.risk_score.to_bits(), stored.risk_score.to_bits());
    assert_eq!(rescored.risk_level, stored.risk_level);
    assert_eq!(rescored.risk_factors, stored.risk_factors);
}

#[test]
fn heart_rate_advisories_are_returned() {
    let (service, _, _) = build_service();
    let mother = service
        .register_mother(registration(), now())
        .expect("registered");
    let vitals = Vitals {
        heart_rate: Some(35),
        ..normal_vitals()
    };

    let outcome = service
        .assess_risk(request(&mother.id, vitals), now())
        .expect("assessed");

    assert_eq!(outcome.advisories.len(), 1);
}

#[test]
fn missing_gestational_week_is_estimated_from_registration() {
    let (service, _, _) = build_service();
    let mother = service
        .register_mother(registration(), now())
        .expect("registered");
    let mut request = request(&mother.id, normal_vitals());
    request.gestational_week = None;

    let early = service
        .assess_risk(request.clone(), now())
        .expect("assessed");
    let later = service
        .assess_risk(request, now() + Duration::weeks(22))
        .expect("assessed");

    assert_eq!(early.care_plan.trimester, Trimester::First);
    assert_eq!(later.care_plan.trimester, Trimester::Third);
}

#[test]
fn care_plan_is_regenerated_from_a_stored_assessment() {
    let (service, _, _) = build_service();
    let mother = service
        .register_mother(teen_registration(), now())
        .expect("registered");
    let outcome = service
        .assess_risk(request(&mother.id, fixture_vitals()), now())
        .expect("assessed");

    let plan = service
        .care_plan_for(&outcome.assessment_id)
        .expect("plan regenerated");

    assert_eq!(plan, outcome.care_plan);
}

#[test]
fn batch_rescores_latest_vitals_and_skips_unassessed_mothers() {
    let (service, store, _) = build_service();
    let assessed = service
        .register_mother(teen_registration(), now())
        .expect("registered");
    let unassessed = service
        .register_mother(registration(), now())
        .expect("registered");

    let mut first = request(&assessed.id, normal_vitals());
    first.symptoms = SymptomFlags::default().with_reported(Symptom::Seizures);
    service.assess_risk(first, now()).expect("assessed");
    service
        .assess_risk(
            request(&assessed.id, fixture_vitals()),
            now() + Duration::days(1),
        )
        .expect("assessed");

    let items = service
        .run_batch_assessment(now() + Duration::days(7))
        .expect("batch runs");

    assert_eq!(items.len(), 2);
    let assessed_item = items
        .iter()
        .find(|item| item.mother_id == assessed.id)
        .expect("assessed mother present");
    match &assessed_item.outcome {
        BatchOutcome::Assessed {
            risk_level,
            risk_score,
            dispatched_tasks,
            ..
        } => {
            assert_eq!(*risk_level, RiskLevel::Moderate);
            assert_eq!(*risk_score, 0.45);
            assert_eq!(*dispatched_tasks, 1);
        }
        other => panic!("expected assessed outcome, got {other:?}"),
    }

    let skipped = items
        .iter()
        .find(|item| item.mother_id == unassessed.id)
        .expect("unassessed mother present");
    assert!(matches!(skipped.outcome, BatchOutcome::Skipped { .. }));

    let history = service.assessments_for(&assessed.id).expect("history");
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].gestational_week, Some(20));
    assert_eq!(store.assessment_count(), 3);
}

#[test]
fn batch_fails_fast_when_mothers_cannot_be_listed() {
    let service = MaternalCareService::new(
        Arc::new(UnavailableStore),
        Arc::new(MemoryNotifier::default()),
        ScoringConfig::default(),
    );

    assert!(matches!(
        service.run_batch_assessment(now()),
        Err(MaternalCareError::Repository(RepositoryError::Unavailable(_)))
    ));
}

#[test]
fn completing_a_task_is_recorded_once() {
    let (service, _, _) = build_service();
    let mother = service
        .register_mother(teen_registration(), now())
        .expect("registered");
    let outcome = service
        .assess_risk(request(&mother.id, fixture_vitals()), now())
        .expect("assessed");
    let task_id = outcome.dispatched_tasks[0].id.clone();

    let completed = service
        .complete_task(&task_id, now() + Duration::days(2))
        .expect("completed");
    assert_eq!(completed.status, TaskStatus::Completed);
    assert_eq!(completed.completed_at, Some(now() + Duration::days(2)));

    assert!(matches!(
        service.complete_task(&task_id, now()),
        Err(MaternalCareError::TaskAlreadyCompleted(_))
    ));
    assert!(matches!(
        service.complete_task(&TaskId("task-missing".to_string()), now()),
        Err(MaternalCareError::UnknownTask(_))
    ));

    let tasks = service.tasks_for(&mother.id).expect("tasks");
    assert_eq!(tasks.len(), 1);
    assert!(!tasks[0].is_pending());
}

#[test]
fn dashboard_counts_latest_levels_and_task_states() {
    let (service, _, _) = build_service();
    let low = service
        .register_mother(registration(), now())
        .expect("registered");
    let moderate = service
        .register_mother(teen_registration(), now())
        .expect("registered");
    service
        .register_mother(older_registration(), now())
        .expect("registered");

    service
        .assess_risk(request(&low.id, normal_vitals()), now())
        .expect("assessed");
    let mut urgent = request(&moderate.id, normal_vitals());
    urgent.symptoms = SymptomFlags::default().with_reported(Symptom::Unconsciousness);
    let emergency = service.assess_risk(urgent, now()).expect("assessed");
    service
        .assess_risk(
            request(&moderate.id, fixture_vitals()),
            now() + Duration::hours(6),
        )
        .expect("assessed");
    service
        .complete_task(&emergency.dispatched_tasks[0].id, now())
        .expect("completed");

    let summary = service.dashboard().expect("dashboard");

    assert_eq!(summary.total_mothers, 3);
    assert_eq!(summary.assessed_mothers, 2);
    assert_eq!(summary.risk_distribution.low, 1);
    assert_eq!(summary.risk_distribution.moderate, 1);
    assert_eq!(summary.risk_distribution.high, 0);
    assert_eq!(summary.emergencies, 1);
    assert_eq!(summary.pending_tasks, 1);
    assert_eq!(summary.completed_tasks, 1);
}

#[test]
fn status_codes_follow_error_kinds() {
    use axum::http::StatusCode;

    assert_eq!(
        MaternalCareError::UnknownMother(MotherId("m".to_string())).status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        MaternalCareError::TaskAlreadyCompleted(TaskId("t".to_string())).status_code(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        MaternalCareError::Registration(ProfileViolation::MissingName).status_code(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        MaternalCareError::Repository(RepositoryError::Unavailable("x".to_string()))
            .status_code(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[test]
fn batch_orders_mothers_by_registration_time() {
    let (service, store, _) = build_service();
    let mut earlier = mother(registration());
    earlier.id = MotherId("mother-1000000".to_string());
    let mut later = mother(registration());
    later.id = MotherId("mother-999999".to_string());
    later.registered_at = now() + Duration::days(1);
    store.create_mother(later).expect("stored");
    store.create_mother(earlier).expect("stored");

    let items = service
        .run_batch_assessment(now() + Duration::days(7))
        .expect("batch runs");

    let order: Vec<&str> = items.iter().map(|item| item.mother_id.0.as_str()).collect();
    assert_eq!(order, vec!["mother-1000000", "mother-999999"]);
}

#[test]
fn milestone_reminders_follow_the_current_week() {
    let (service, _, notifier) = build_service();
    let reported = service
        .register_mother(registration(), now())
        .expect("registered");
    service
        .assess_risk(request(&reported.id, normal_vitals()), now())
        .expect("assessed");
    let estimated = service
        .register_mother(registration(), now())
        .expect("registered");
    service
        .register_mother(
            MotherRegistration {
                notification_address: None,
                ..registration()
            },
            now(),
        )
        .expect("registered");
    let between = service
        .register_mother(registration(), now())
        .expect("registered");
    let mut week_21 = request(&between.id, normal_vitals());
    week_21.gestational_week = Some(21);
    service.assess_risk(week_21, now()).expect("assessed");

    let reminders = service
        .run_milestone_reminders(now() + Duration::weeks(4))
        .expect("reminders run");

    assert_eq!(reminders.len(), 2);
    assert_eq!(reminders[0].mother_id, reported.id);
    assert_eq!(reminders[0].week, 24);
    assert_eq!(reminders[0].milestone, "glucose_screening");
    assert_eq!(reminders[1].mother_id, estimated.id);
    assert_eq!(reminders[1].week, 12);
    assert_eq!(reminders[1].milestone, "first_trimester_screening");
    assert!(reminders.iter().all(|reminder| reminder.delivered));

    let sent: Vec<_> = notifier
        .sent()
        .into_iter()
        .filter(|notification| notification.template_key == MILESTONE_REMINDER_TEMPLATE)
        .collect();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[0].recipient,
        RecipientRef::Mother("chat-4411".to_string())
    );
    assert_eq!(sent[0].payload["week"], "24");
}

#[test]
fn undelivered_reminders_are_reported() {
    let service = MaternalCareService::new(
        Arc::new(MemoryStore::default()),
        Arc::new(OfflineNotifier),
        ScoringConfig::default(),
    );
    let mother = service
        .register_mother(registration(), now())
        .expect("registered");
    service
        .assess_risk(request(&mother.id, normal_vitals()), now())
        .expect("assessed");

    let reminders = service.run_milestone_reminders(now()).expect("reminders run");

    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].milestone, "anatomy_scan");
    assert!(!reminders[0].delivered);
    assert!(reminders[0]
        .error
        .as_deref()
        .is_some_and(|error| error.contains("bot token revoked")));
}

fn visit(mother_id: &MotherId, task_id: Option<TaskId>, vitals: Vitals) -> AshaVisitReport {
    AshaVisitReport {
        mother_id: mother_id.clone(),
        task_id,
        asha_worker_id: "asha-017".to_string(),
        vitals,
        symptoms: SymptomFlags::default(),
        gestational_week: Some(24),
        observations: "Mild swelling in both feet".to_string(),
    }
}

#[test]
fn visit_report_reassesses_and_closes_pending_tasks() {
    let (service, _, notifier) = build_service();
    let mother = service
        .register_mother(teen_registration(), now())
        .expect("registered");
    let first = service
        .assess_risk(request(&mother.id, fixture_vitals()), now())
        .expect("assessed");
    let routine_task = first.dispatched_tasks[0].id.clone();

    let outcome = service
        .record_visit(
            visit(&mother.id, None, high_risk_vitals()),
            now() + Duration::days(3),
        )
        .expect("visit recorded");

    assert_eq!(outcome.asha_worker_id, "asha-017");
    assert_eq!(outcome.completed_tasks, vec![routine_task.clone()]);
    assert_eq!(outcome.assessment.risk_level, RiskLevel::High);
    assert_eq!(outcome.assessment.dispatched_tasks.len(), 1);
    assert!(outcome.assessment.side_effect_failures.is_empty());

    let tasks = service.tasks_for(&mother.id).expect("tasks");
    assert_eq!(tasks.len(), 2);
    let closed = tasks
        .iter()
        .find(|task| task.id == routine_task)
        .expect("routine task kept");
    assert_eq!(closed.status, TaskStatus::Completed);
    assert_eq!(closed.completed_at, Some(now() + Duration::days(3)));
    assert_eq!(tasks.iter().filter(|task| task.is_pending()).count(), 1);
    assert_eq!(service.assessments_for(&mother.id).expect("history").len(), 2);

    let confirmation = notifier
        .sent()
        .into_iter()
        .find(|notification| notification.template_key == VISIT_CONFIRMATION_TEMPLATE)
        .expect("confirmation sent");
    assert_eq!(confirmation.payload["blood_pressure"], "170/112");
    assert_eq!(confirmation.payload["observations"], "Mild swelling in both feet");
    assert_eq!(confirmation.payload["risk_level"], "HIGH");
}

#[test]
fn visit_report_rejects_foreign_closed_or_implausible_input() {
    let (service, store, _) = build_service();
    let visited = service
        .register_mother(teen_registration(), now())
        .expect("registered");
    let other = service
        .register_mother(registration(), now())
        .expect("registered");
    let outcome = service
        .assess_risk(request(&visited.id, fixture_vitals()), now())
        .expect("assessed");
    let task_id = outcome.dispatched_tasks[0].id.clone();

    assert!(matches!(
        service.record_visit(
            visit(&other.id, Some(task_id.clone()), normal_vitals()),
            now()
        ),
        Err(MaternalCareError::UnknownTask(_))
    ));

    let implausible = Vitals {
        systolic_bp: Some(-5),
        ..normal_vitals()
    };
    assert!(matches!(
        service.record_visit(visit(&visited.id, Some(task_id.clone()), implausible), now()),
        Err(MaternalCareError::Validation(_))
    ));
    assert!(service.tasks_for(&visited.id).expect("tasks")[0].is_pending());

    service.complete_task(&task_id, now()).expect("completed");
    assert!(matches!(
        service.record_visit(visit(&visited.id, Some(task_id), normal_vitals()), now()),
        Err(MaternalCareError::TaskAlreadyCompleted(_))
    ));
    assert_eq!(store.assessment_count(), 1);
}
