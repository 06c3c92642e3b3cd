use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::care_plan::{CarePlan, CarePlanGenerator, CarePlanInputs};
use super::dispatch::{AshaTaskDispatcher, DispatchContext};
use super::domain::{
    AshaTask, AshaVisitReport, Assessment, AssessmentId, AssessmentRequest, EmergencyEvent,
    EmergencyId, EmergencyTrigger, Mother, MotherId, MotherRegistration, RiskFactor, RiskLevel,
    SymptomFlags, TaskId, TaskStatus, Trimester,
};
use super::emergency::EmergencyEvaluator;
use super::reminders::{milestone_for_week, MilestoneReminder};
use super::repository::{
    CareRecordStore, Notification, NotificationSender, RecipientRef, RepositoryError,
};
use super::scoring::{RiskScoringEngine, ScoringConfig};
use super::validation::{validate_registration, ProfileViolation, VitalsRejection, VitalsValidator};

static MOTHER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static EMERGENCY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_mother_id() -> MotherId {
    let id = MOTHER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    MotherId(format!("mother-{id:06}"))
}

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("assessment-{id:06}"))
}

fn next_emergency_id() -> EmergencyId {
    let id = EMERGENCY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EmergencyId(format!("emergency-{id:06}"))
}

pub const RISK_ALERT_TEMPLATE: &str = "risk_alert";
pub const EMERGENCY_ALERT_TEMPLATE: &str = "emergency_alert";
pub const TASK_ASSIGNED_TEMPLATE: &str = "asha_task_assigned";
pub const MILESTONE_REMINDER_TEMPLATE: &str = "milestone_reminder";
pub const VISIT_CONFIRMATION_TEMPLATE: &str = "asha_visit_confirmation";

/// Steps an assessment submission moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Received,
    Validated,
    RoutineScored,
    EmergencyEscalated,
    PlanGenerated,
    TasksDispatched,
    Notified,
    Done,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    PersistEmergency,
    PersistTask,
    CompleteTask,
    Notify,
}

/// A collaborator call that failed after the assessment itself was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideEffectFailure {
    pub effect: SideEffect,
    pub detail: String,
}

/// Result of a single submission returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentOutcome {
    pub assessment_id: AssessmentId,
    pub mother_id: MotherId,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_factors: BTreeSet<RiskFactor>,
    pub emergency: Option<EmergencyEvent>,
    pub care_plan: CarePlan,
    pub dispatched_tasks: Vec<AshaTask>,
    pub advisories: Vec<String>,
    pub stages: Vec<PipelineStage>,
    pub side_effect_failures: Vec<SideEffectFailure>,
    #[serde(skip)]
    pub assessment: Assessment,
}

/// Result of an ASHA visit report: the tasks it closed and the reassessment it triggered.
#[derive(Debug, Clone, Serialize)]
pub struct VisitOutcome {
    pub mother_id: MotherId,
    pub asha_worker_id: String,
    pub completed_tasks: Vec<TaskId>,
    pub assessment: AssessmentOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Assessed {
        assessment_id: AssessmentId,
        risk_score: f64,
        risk_level: RiskLevel,
        dispatched_tasks: usize,
        side_effect_failures: usize,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub mother_id: MotherId,
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RiskDistribution {
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
}

/// Aggregate counts over the latest assessment of every mother.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_mothers: usize,
    pub assessed_mothers: usize,
    pub risk_distribution: RiskDistribution,
    pub emergencies: usize,
    pub pending_tasks: usize,
    pub completed_tasks: usize,
}

/// Orchestrates validation, scoring, emergency escalation, care planning, dispatch and
/// notification for each submission.
pub struct MaternalCareService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    validator: VitalsValidator,
    engine: Arc<RiskScoringEngine>,
    emergencies: EmergencyEvaluator,
    care_plans: CarePlanGenerator,
    dispatcher: AshaTaskDispatcher<S>,
}

impl<S, N> MaternalCareService<S, N>
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, config: ScoringConfig) -> Self {
        let dispatcher = AshaTaskDispatcher::new(store.clone());
        Self {
            store,
            notifier,
            validator: VitalsValidator::default(),
            engine: Arc::new(RiskScoringEngine::new(config)),
            emergencies: EmergencyEvaluator,
            care_plans: CarePlanGenerator,
            dispatcher,
        }
    }

    pub fn engine(&self) -> &RiskScoringEngine {
        &self.engine
    }

    pub fn register_mother(
        &self,
        registration: MotherRegistration,
        now: DateTime<Utc>,
    ) -> Result<Mother, MaternalCareError> {
        validate_registration(&registration)?;
        let mother = Mother::from_registration(next_mother_id(), registration, now);
        let stored = self.store.create_mother(mother)?;
        info!(mother_id = %stored.id, location = %stored.location, "mother registered");
        Ok(stored)
    }

    pub fn update_mother(
        &self,
        id: &MotherId,
        registration: MotherRegistration,
    ) -> Result<Mother, MaternalCareError> {
        validate_registration(&registration)?;
        let mut mother = self.require_mother(id)?;
        mother.apply(registration);
        self.store.update_mother(mother.clone())?;
        info!(mother_id = %mother.id, "mother profile updated");
        Ok(mother)
    }

    pub fn get_mother(&self, id: &MotherId) -> Result<Mother, MaternalCareError> {
        self.require_mother(id)
    }

    /// Run the full pipeline for one submission. Only a failed assessment write is fatal once
    /// validation has passed; later collaborator failures are reported in the outcome.
    pub fn assess_risk(
        &self,
        request: AssessmentRequest,
        now: DateTime<Utc>,
    ) -> Result<AssessmentOutcome, MaternalCareError> {
        let mut stages = vec![PipelineStage::Received];
        let mother = self.require_mother(&request.mother_id)?;

        let validated = match self.validator.validate(&request.vitals) {
            Ok(validated) => validated,
            Err(rejection) => {
                warn!(
                    mother_id = %mother.id,
                    stage = ?PipelineStage::Rejected,
                    violations = rejection.violations.len(),
                    "assessment rejected"
                );
                return Err(rejection.into());
            }
        };
        stages.push(PipelineStage::Validated);

        let score = self.engine.score(&mother, &validated);
        let finding = self.emergencies.evaluate(&request.symptoms);
        let risk_level = if finding.is_some() {
            stages.push(PipelineStage::EmergencyEscalated);
            RiskLevel::High
        } else {
            stages.push(PipelineStage::RoutineScored);
            score.risk_level
        };

        let assessment = Assessment {
            id: next_assessment_id(),
            mother_id: mother.id.clone(),
            vitals: *validated.vitals(),
            symptoms: request.symptoms.clone(),
            gestational_week: request.gestational_week,
            risk_score: score.risk_score,
            risk_level,
            risk_factors: score.risk_factors.clone(),
            components: score.components.clone(),
            emergency_override: finding.is_some(),
            created_at: now,
        };
        let assessment = self.store.create_assessment(assessment)?;

        let mut side_effect_failures = Vec::new();

        let emergency = finding.map(|finding| EmergencyEvent {
            id: next_emergency_id(),
            assessment_id: assessment.id.clone(),
            mother_id: mother.id.clone(),
            triggers: finding.triggers,
            severity: finding.severity,
            immediate_actions: finding.immediate_actions,
            created_at: now,
        });
        if let Some(event) = &emergency {
            warn!(
                mother_id = %mother.id,
                emergency_id = %event.id,
                triggers = %join_triggers(&event.triggers),
                "emergency escalated"
            );
            if let Err(error) = self.store.create_emergency(event.clone()) {
                warn!(emergency_id = %event.id, %error, "failed to persist emergency event");
                side_effect_failures.push(SideEffectFailure {
                    effect: SideEffect::PersistEmergency,
                    detail: error.to_string(),
                });
            }
        }

        let week = request
            .gestational_week
            .unwrap_or_else(|| mother.estimated_gestational_week(now));
        let care_plan = self.care_plans.generate_for(&CarePlanInputs {
            risk_level,
            trimester: Trimester::from_week(week),
            language: mother.preferred_language,
            diet: mother.dietary_preference.unwrap_or_default(),
            risk_factors: assessment.risk_factors.clone(),
            emergency: emergency.is_some(),
            warning_signs: self.emergencies.warning_signs(&request.symptoms),
        });
        stages.push(PipelineStage::PlanGenerated);

        let report = self.dispatcher.dispatch(DispatchContext {
            mother: &mother,
            assessment_id: Some(&assessment.id),
            emergency_id: emergency.as_ref().map(|event| &event.id),
            risk_level,
            risk_factors: &assessment.risk_factors,
            now,
        });
        for (task, error) in &report.failures {
            warn!(task_id = %task.id, %error, "failed to persist ASHA task");
            side_effect_failures.push(SideEffectFailure {
                effect: SideEffect::PersistTask,
                detail: format!("{}: {error}", task.id),
            });
        }
        stages.push(PipelineStage::TasksDispatched);

        for notification in
            notifications_for(&mother, &assessment, emergency.as_ref(), &care_plan, &report.tasks)
        {
            let template = notification.template_key.clone();
            if let Err(error) = self.notifier.send(notification) {
                warn!(mother_id = %mother.id, template = %template, %error, "notification failed");
                side_effect_failures.push(SideEffectFailure {
                    effect: SideEffect::Notify,
                    detail: format!("{template}: {error}"),
                });
            }
        }
        stages.push(PipelineStage::Notified);
        stages.push(PipelineStage::Done);

        info!(
            mother_id = %mother.id,
            assessment_id = %assessment.id,
            risk_score = assessment.risk_score,
            risk_level = assessment.risk_level.label(),
            tasks = report.tasks.len(),
            failures = side_effect_failures.len(),
            "assessment completed"
        );

        Ok(AssessmentOutcome {
            assessment_id: assessment.id.clone(),
            mother_id: mother.id,
            risk_score: assessment.risk_score,
            risk_level: assessment.risk_level,
            risk_factors: assessment.risk_factors.clone(),
            emergency,
            care_plan,
            dispatched_tasks: report.tasks,
            advisories: validated.advisories().to_vec(),
            stages,
            side_effect_failures,
            assessment,
        })
    }

    /// Re-score every mother from her latest stored vitals. Symptoms are not carried forward
    /// and mothers without any assessment are skipped. One mother's failure does not stop
    /// the run.
    pub fn run_batch_assessment(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<BatchItem>, MaternalCareError> {
        let mut mothers = self.store.list_mothers()?;
        mothers.sort_by(registration_order);
        info!(mothers = mothers.len(), %as_of, "batch assessment started");

        let items: Vec<BatchItem> = mothers
            .into_iter()
            .map(|mother| BatchItem {
                outcome: self.batch_outcome(&mother, as_of),
                mother_id: mother.id,
            })
            .collect();

        let assessed = items
            .iter()
            .filter(|item| matches!(item.outcome, BatchOutcome::Assessed { .. }))
            .count();
        info!(assessed, total = items.len(), "batch assessment finished");
        Ok(items)
    }

    fn batch_outcome(&self, mother: &Mother, as_of: DateTime<Utc>) -> BatchOutcome {
        let latest = match self.store.assessments_by_mother(&mother.id) {
            Ok(assessments) => assessments.into_iter().max_by_key(|a| a.created_at),
            Err(error) => {
                warn!(mother_id = %mother.id, %error, "batch lookup failed");
                return BatchOutcome::Failed {
                    error: error.to_string(),
                };
            }
        };

        let Some(latest) = latest else {
            return BatchOutcome::Skipped {
                reason: "no prior assessment".to_string(),
            };
        };

        let gestational_week = carried_week(&latest, as_of);

        let request = AssessmentRequest {
            mother_id: mother.id.clone(),
            vitals: latest.vitals,
            symptoms: SymptomFlags::default(),
            gestational_week,
        };

        match self.assess_risk(request, as_of) {
            Ok(outcome) => BatchOutcome::Assessed {
                assessment_id: outcome.assessment_id,
                risk_score: outcome.risk_score,
                risk_level: outcome.risk_level,
                dispatched_tasks: outcome.dispatched_tasks.len(),
                side_effect_failures: outcome.side_effect_failures.len(),
            },
            Err(error) => {
                warn!(mother_id = %mother.id, %error, "batch assessment failed");
                BatchOutcome::Failed {
                    error: error.to_string(),
                }
            }
        }
    }

    /// Send a reminder to every reachable mother whose current gestational week is a milestone.
    /// The week comes from her latest reported week, carried forward, or else from registration.
    pub fn run_milestone_reminders(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<MilestoneReminder>, MaternalCareError> {
        let mut mothers = self.store.list_mothers()?;
        mothers.sort_by(registration_order);

        let mut reminders = Vec::new();
        for mother in &mothers {
            let Some(address) = mother.notification_address.clone() else {
                continue;
            };
            let week = match self.current_week(mother, as_of) {
                Ok(week) => week,
                Err(error) => {
                    warn!(mother_id = %mother.id, %error, "milestone lookup failed");
                    continue;
                }
            };
            let Some(milestone) = milestone_for_week(week) else {
                continue;
            };

            let mut payload = base_payload(mother);
            payload.insert("week".to_string(), week.to_string());
            payload.insert("milestone".to_string(), milestone.key.to_string());
            payload.insert("description".to_string(), milestone.description.to_string());

            let result = self.notifier.send(notification(
                RecipientRef::Mother(address),
                MILESTONE_REMINDER_TEMPLATE,
                mother,
                payload,
            ));
            if let Err(error) = &result {
                warn!(mother_id = %mother.id, week, %error, "milestone reminder failed");
            }
            reminders.push(MilestoneReminder {
                mother_id: mother.id.clone(),
                week,
                milestone: milestone.key.to_string(),
                delivered: result.is_ok(),
                error: result.err().map(|error| error.to_string()),
            });
        }

        let delivered = reminders.iter().filter(|reminder| reminder.delivered).count();
        info!(delivered, attempted = reminders.len(), "milestone reminders finished");
        Ok(reminders)
    }

    /// Record an ASHA home visit. The reported vitals go through the full assessment pipeline;
    /// the visited tasks close only once that assessment is stored.
    pub fn record_visit(
        &self,
        report: AshaVisitReport,
        now: DateTime<Utc>,
    ) -> Result<VisitOutcome, MaternalCareError> {
        let mother = self.require_mother(&report.mother_id)?;

        let visited: Vec<AshaTask> = match &report.task_id {
            Some(task_id) => {
                let task = self
                    .store
                    .get_task(task_id)?
                    .filter(|task| task.mother_id == mother.id)
                    .ok_or_else(|| MaternalCareError::UnknownTask(task_id.clone()))?;
                if !task.is_pending() {
                    return Err(MaternalCareError::TaskAlreadyCompleted(task_id.clone()));
                }
                vec![task]
            }
            None => self
                .store
                .tasks_by_mother(&mother.id)?
                .into_iter()
                .filter(AshaTask::is_pending)
                .collect(),
        };

        let mut assessment = self.assess_risk(
            AssessmentRequest {
                mother_id: mother.id.clone(),
                vitals: report.vitals,
                symptoms: report.symptoms.clone(),
                gestational_week: report.gestational_week,
            },
            now,
        )?;

        let mut completed_tasks = Vec::new();
        for mut task in visited {
            task.status = TaskStatus::Completed;
            task.completed_at = Some(now);
            match self.store.update_task(task.clone()) {
                Ok(()) => completed_tasks.push(task.id),
                Err(error) => {
                    warn!(task_id = %task.id, %error, "failed to close visited task");
                    assessment.side_effect_failures.push(SideEffectFailure {
                        effect: SideEffect::CompleteTask,
                        detail: format!("{}: {error}", task.id),
                    });
                }
            }
        }

        if let Some(address) = mother.notification_address.clone() {
            let mut payload = base_payload(&mother);
            payload.insert("visit_date".to_string(), now.date_naive().to_string());
            payload.insert("asha_worker_id".to_string(), report.asha_worker_id.clone());
            payload.insert(
                "blood_pressure".to_string(),
                format!(
                    "{}/{}",
                    reading(report.vitals.systolic_bp),
                    reading(report.vitals.diastolic_bp)
                ),
            );
            payload.insert("observations".to_string(), report.observations.clone());
            payload.insert(
                "risk_level".to_string(),
                assessment.risk_level.label().to_string(),
            );
            payload.insert(
                "next_checkup_in_days".to_string(),
                assessment.care_plan.next_checkup_in_days.to_string(),
            );

            if let Err(error) = self.notifier.send(notification(
                RecipientRef::Mother(address),
                VISIT_CONFIRMATION_TEMPLATE,
                &mother,
                payload,
            )) {
                warn!(mother_id = %mother.id, %error, "visit confirmation failed");
                assessment.side_effect_failures.push(SideEffectFailure {
                    effect: SideEffect::Notify,
                    detail: format!("{VISIT_CONFIRMATION_TEMPLATE}: {error}"),
                });
            }
        }

        info!(
            mother_id = %mother.id,
            asha_worker_id = %report.asha_worker_id,
            completed = completed_tasks.len(),
            risk_level = assessment.risk_level.label(),
            "ASHA visit recorded"
        );

        Ok(VisitOutcome {
            mother_id: mother.id,
            asha_worker_id: report.asha_worker_id,
            completed_tasks,
            assessment,
        })
    }

    pub fn assessments_for(&self, id: &MotherId) -> Result<Vec<Assessment>, MaternalCareError> {
        self.require_mother(id)?;
        Ok(self.store.assessments_by_mother(id)?)
    }

    pub fn emergencies_for(
        &self,
        id: &MotherId,
    ) -> Result<Vec<EmergencyEvent>, MaternalCareError> {
        self.require_mother(id)?;
        Ok(self.store.emergencies_by_mother(id)?)
    }

    pub fn tasks_for(&self, id: &MotherId) -> Result<Vec<AshaTask>, MaternalCareError> {
        self.require_mother(id)?;
        Ok(self.store.tasks_by_mother(id)?)
    }

    /// Regenerate the care plan of a stored assessment.
    pub fn care_plan_for(&self, id: &AssessmentId) -> Result<CarePlan, MaternalCareError> {
        let assessment = self
            .store
            .get_assessment(id)?
            .ok_or_else(|| MaternalCareError::UnknownAssessment(id.clone()))?;
        let mother = self.require_mother(&assessment.mother_id)?;
        let week = assessment
            .gestational_week
            .unwrap_or_else(|| mother.estimated_gestational_week(assessment.created_at));

        Ok(self.care_plans.generate_for(&CarePlanInputs {
            risk_level: assessment.risk_level,
            trimester: Trimester::from_week(week),
            language: mother.preferred_language,
            diet: mother.dietary_preference.unwrap_or_default(),
            risk_factors: assessment.risk_factors.clone(),
            emergency: assessment.emergency_override,
            warning_signs: self.emergencies.warning_signs(&assessment.symptoms),
        }))
    }

    pub fn complete_task(
        &self,
        id: &TaskId,
        now: DateTime<Utc>,
    ) -> Result<AshaTask, MaternalCareError> {
        let mut task = self
            .store
            .get_task(id)?
            .ok_or_else(|| MaternalCareError::UnknownTask(id.clone()))?;
        if !task.is_pending() {
            return Err(MaternalCareError::TaskAlreadyCompleted(id.clone()));
        }

        task.status = TaskStatus::Completed;
        task.completed_at = Some(now);
        self.store.update_task(task.clone())?;
        info!(task_id = %task.id, mother_id = %task.mother_id, "ASHA task completed");
        Ok(task)
    }

    pub fn dashboard(&self) -> Result<DashboardSummary, MaternalCareError> {
        let mothers = self.store.list_mothers()?;
        let mut summary = DashboardSummary {
            total_mothers: mothers.len(),
            ..DashboardSummary::default()
        };

        for mother in &mothers {
            let latest = self
                .store
                .assessments_by_mother(&mother.id)?
                .into_iter()
                .max_by_key(|assessment| assessment.created_at);
            if let Some(latest) = latest {
                summary.assessed_mothers += 1;
                match latest.risk_level {
                    RiskLevel::Low => summary.risk_distribution.low += 1,
                    RiskLevel::Moderate => summary.risk_distribution.moderate += 1,
                    RiskLevel::High => summary.risk_distribution.high += 1,
                }
            }

            summary.emergencies += self.store.emergencies_by_mother(&mother.id)?.len();
            for task in self.store.tasks_by_mother(&mother.id)? {
                if task.is_pending() {
                    summary.pending_tasks += 1;
                } else {
                    summary.completed_tasks += 1;
                }
            }
        }

        Ok(summary)
    }

    fn require_mother(&self, id: &MotherId) -> Result<Mother, MaternalCareError> {
        self.store
            .get_mother(id)?
            .ok_or_else(|| MaternalCareError::UnknownMother(id.clone()))
    }

    fn current_week(&self, mother: &Mother, as_of: DateTime<Utc>) -> Result<u32, RepositoryError> {
        let latest = self
            .store
            .assessments_by_mother(&mother.id)?
            .into_iter()
            .max_by_key(|assessment| assessment.created_at);
        Ok(latest
            .and_then(|assessment| carried_week(&assessment, as_of))
            .unwrap_or_else(|| mother.estimated_gestational_week(as_of)))
    }
}

/// Registration time, then id. Ids alone stop sorting numerically past the padded width.
fn registration_order(left: &Mother, right: &Mother) -> std::cmp::Ordering {
    left.registered_at
        .cmp(&right.registered_at)
        .then_with(|| left.id.cmp(&right.id))
}

/// The reported week of an assessment, advanced by the whole weeks elapsed since.
fn carried_week(assessment: &Assessment, as_of: DateTime<Utc>) -> Option<u32> {
    assessment.gestational_week.map(|week| {
        let elapsed_weeks = (as_of - assessment.created_at).num_weeks().max(0);
        week.saturating_add(u32::try_from(elapsed_weeks).unwrap_or(u32::MAX))
    })
}

fn reading(value: Option<i32>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}

fn join_triggers(triggers: &BTreeSet<EmergencyTrigger>) -> String {
    triggers
        .iter()
        .map(|trigger| trigger.name())
        .collect::<Vec<_>>()
        .join(",")
}

fn notifications_for(
    mother: &Mother,
    assessment: &Assessment,
    emergency: Option<&EmergencyEvent>,
    care_plan: &CarePlan,
    tasks: &[AshaTask],
) -> Vec<Notification> {
    let mut notifications = Vec::new();
    let desk = RecipientRef::AshaDesk(mother.location.clone());
    let own_address = mother.notification_address.clone().map(RecipientRef::Mother);

    if let Some(event) = emergency {
        let mut payload = base_payload(mother);
        payload.insert("triggers".to_string(), join_triggers(&event.triggers));
        payload.insert("phone".to_string(), mother.phone.clone());
        payload.insert("location".to_string(), mother.location.clone());
        payload.insert(
            "immediate_actions".to_string(),
            event.immediate_actions.join("; "),
        );

        if let Some(recipient) = own_address.clone() {
            notifications.push(notification(
                recipient,
                EMERGENCY_ALERT_TEMPLATE,
                mother,
                payload.clone(),
            ));
        }
        notifications.push(notification(
            desk.clone(),
            EMERGENCY_ALERT_TEMPLATE,
            mother,
            payload,
        ));
    } else if assessment.risk_level != RiskLevel::Low {
        if let Some(recipient) = own_address {
            let mut payload = base_payload(mother);
            payload.insert(
                "risk_level".to_string(),
                assessment.risk_level.label().to_string(),
            );
            payload.insert(
                "risk_score".to_string(),
                format!("{:.2}", assessment.risk_score),
            );
            payload.insert(
                "risk_factors".to_string(),
                assessment
                    .risk_factors
                    .iter()
                    .map(|factor| factor.name())
                    .collect::<Vec<_>>()
                    .join(","),
            );
            payload.insert(
                "next_checkup_in_days".to_string(),
                care_plan.next_checkup_in_days.to_string(),
            );
            notifications.push(notification(recipient, RISK_ALERT_TEMPLATE, mother, payload));
        }
    }

    for task in tasks {
        let mut payload = base_payload(mother);
        payload.insert("task_id".to_string(), task.id.to_string());
        payload.insert("priority".to_string(), task.priority.label().to_string());
        payload.insert("description".to_string(), task.description.clone());
        payload.insert("due_in_days".to_string(), task.due_in_days.to_string());
        notifications.push(notification(
            desk.clone(),
            TASK_ASSIGNED_TEMPLATE,
            mother,
            payload,
        ));
    }

    notifications
}

fn base_payload(mother: &Mother) -> BTreeMap<String, String> {
    let mut payload = BTreeMap::new();
    payload.insert("mother_name".to_string(), mother.name.clone());
    payload.insert(
        "language".to_string(),
        mother.preferred_language.code().to_string(),
    );
    payload
}

fn notification(
    recipient: RecipientRef,
    template: &str,
    mother: &Mother,
    payload: BTreeMap<String, String>,
) -> Notification {
    Notification {
        recipient,
        template_key: template.to_string(),
        mother_id: mother.id.clone(),
        payload,
    }
}

/// Error raised by the maternal care service.
#[derive(Debug, thiserror::Error)]
pub enum MaternalCareError {
    #[error(transparent)]
    Validation(#[from] VitalsRejection),
    #[error(transparent)]
    Registration(#[from] ProfileViolation),
    #[error("mother {0} not found")]
    UnknownMother(MotherId),
    #[error("assessment {0} not found")]
    UnknownAssessment(AssessmentId),
    #[error("task {0} not found")]
    UnknownTask(TaskId),
    #[error("task {0} is already completed")]
    TaskAlreadyCompleted(TaskId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl MaternalCareError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MaternalCareError::Validation(_) | MaternalCareError::Registration(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            MaternalCareError::UnknownMother(_)
            | MaternalCareError::UnknownAssessment(_)
            | MaternalCareError::UnknownTask(_)
            | MaternalCareError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            MaternalCareError::TaskAlreadyCompleted(_)
            | MaternalCareError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            MaternalCareError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}
