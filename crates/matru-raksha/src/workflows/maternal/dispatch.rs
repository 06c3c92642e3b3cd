use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::domain::{
    AshaTask, AssessmentId, EmergencyId, Mother, RiskFactor, RiskLevel, TaskId, TaskPriority,
    TaskStatus,
};
use super::repository::{CareRecordStore, RepositoryError};

static TASK_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    let id = TASK_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    TaskId(format!("task-{id:06}"))
}

/// What the dispatcher decided for one assessment, before ids and timestamps are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPlan {
    pub priority: TaskPriority,
    pub description: String,
    pub due_in_days: u32,
    pub visit_checklist: Vec<String>,
}

/// Task policy. An emergency replaces the routine HIGH visit, so at most one task is planned.
pub fn plan_tasks(
    mother: &Mother,
    risk_level: RiskLevel,
    emergency: bool,
    risk_factors: &BTreeSet<RiskFactor>,
) -> Vec<TaskPlan> {
    let (priority, description, due_in_days) = if emergency {
        (
            TaskPriority::High,
            format!(
                "Immediate visit: emergency reported for {} in {}",
                mother.name, mother.location
            ),
            0,
        )
    } else {
        match risk_level {
            RiskLevel::High => (
                TaskPriority::High,
                format!("High-risk visit for {} within 24 hours", mother.name),
                1,
            ),
            RiskLevel::Moderate => (
                TaskPriority::Medium,
                format!("Follow-up visit for {} within 7 days", mother.name),
                7,
            ),
            RiskLevel::Low => return Vec::new(),
        }
    };

    vec![TaskPlan {
        priority,
        description,
        due_in_days,
        visit_checklist: visit_checklist(emergency, risk_factors),
    }]
}

fn visit_checklist(emergency: bool, risk_factors: &BTreeSet<RiskFactor>) -> Vec<String> {
    let mut checklist = Vec::new();
    if emergency {
        checklist.push("Confirm ambulance (108) has been called".to_string());
    }
    checklist.push("Record blood pressure and pulse".to_string());
    for factor in risk_factors {
        let item = match factor {
            RiskFactor::Age => "Confirm the mother is registered for institutional delivery",
            RiskFactor::Bmi => "Record weight and discuss diet",
            RiskFactor::BloodPressure => "Check for swelling, headache and blurred vision",
            RiskFactor::Hemoglobin => "Confirm iron-folic acid tablets are being taken",
            RiskFactor::ObstetricHistory => "Review previous pregnancy outcomes",
            RiskFactor::Glucose => "Confirm glucose test appointment",
        };
        checklist.push(item.to_string());
    }
    checklist
}

/// Links a dispatched task back to what caused it.
#[derive(Debug, Clone)]
pub struct DispatchContext<'a> {
    pub mother: &'a Mother,
    pub assessment_id: Option<&'a AssessmentId>,
    pub emergency_id: Option<&'a EmergencyId>,
    pub risk_level: RiskLevel,
    pub risk_factors: &'a BTreeSet<RiskFactor>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    pub tasks: Vec<AshaTask>,
    /// Tasks that were decided but could not be persisted.
    #[serde(skip)]
    pub failures: Vec<(AshaTask, RepositoryError)>,
}

/// Turns task plans into persisted ASHA tasks.
pub struct AshaTaskDispatcher<S> {
    store: Arc<S>,
}

impl<S> AshaTaskDispatcher<S>
where
    S: CareRecordStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn dispatch(&self, context: DispatchContext<'_>) -> DispatchReport {
        let emergency = context.emergency_id.is_some();
        let plans = plan_tasks(
            context.mother,
            context.risk_level,
            emergency,
            context.risk_factors,
        );

        let mut report = DispatchReport::default();
        for plan in plans {
            let task = AshaTask {
                id: next_task_id(),
                mother_id: context.mother.id.clone(),
                assessment_id: context.assessment_id.cloned(),
                emergency_id: context.emergency_id.cloned(),
                priority: plan.priority,
                description: plan.description,
                due_in_days: plan.due_in_days,
                due_at: context.now + Duration::days(i64::from(plan.due_in_days)),
                visit_checklist: plan.visit_checklist,
                status: TaskStatus::Pending,
                created_at: context.now,
                completed_at: None,
            };

            match self.store.create_task(task.clone()) {
                Ok(stored) => report.tasks.push(stored),
                Err(error) => report.failures.push((task, error)),
            }
        }
        report
    }
}
