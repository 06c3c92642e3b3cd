//! Maternal risk assessment and ASHA care coordination.
//!
//! Submissions flow through the vitals validator, the scoring engine and the emergency
//! evaluator, then into care planning, task dispatch and notification. Persistence and
//! messaging are collaborators behind the traits in [`repository`].

pub mod care_plan;
pub mod dispatch;
pub mod domain;
pub mod emergency;
pub mod reminders;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use care_plan::{CarePlan, CarePlanGenerator, CarePlanInputs};
pub use dispatch::{AshaTaskDispatcher, DispatchContext, DispatchReport, TaskPlan};
pub use domain::{
    AshaTask, AshaVisitReport, Assessment, AssessmentId, AssessmentRequest, DietaryPreference,
    EmergencyEvent, EmergencyId, EmergencyTrigger, Language, Mother, MotherId, MotherRegistration,
    RiskFactor, RiskLevel, Symptom, SymptomFlags, TaskId, TaskPriority, TaskStatus, Trimester,
    Vitals,
};
pub use emergency::{EmergencyEvaluator, EmergencyFinding};
pub use repository::{
    CareRecordStore, Notification, NotificationError, NotificationSender, RecipientRef,
    RepositoryError,
};
pub use reminders::{milestone_for_week, Milestone, MilestoneReminder, MILESTONES};
pub use router::care_router;
pub use scoring::{RiskScore, RiskScoringEngine, RiskThresholds, ScoreComponent, ScoringConfig};
pub use service::{
    AssessmentOutcome, BatchItem, BatchOutcome, DashboardSummary, MaternalCareError,
    MaternalCareService, PipelineStage, RiskDistribution, SideEffect, SideEffectFailure,
    VisitOutcome,
};
pub use validation::{
    validate_registration, ProfileViolation, ValidatedVitals, VitalField, VitalsRejection,
    VitalsValidator, VitalsViolation,
};
