use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::maternal::domain::{
    AshaTask, Assessment, AssessmentId, AssessmentRequest, EmergencyEvent, Language, Mother,
    MotherId, MotherRegistration, SymptomFlags, TaskId, Vitals,
};
use crate::workflows::maternal::repository::{
    CareRecordStore, Notification, NotificationError, NotificationSender, RepositoryError,
};
use crate::workflows::maternal::scoring::ScoringConfig;
use crate::workflows::maternal::validation::{ValidatedVitals, VitalsValidator};
use crate::workflows::maternal::{care_router, MaternalCareService};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn registration() -> MotherRegistration {
    MotherRegistration {
        name: "Sunita Patil".to_string(),
        phone: "+91 98765 43210".to_string(),
        age: 28,
        gravida: 1,
        parity: 1,
        bmi: 22.0,
        location: "Haveli, Pune".to_string(),
        preferred_language: Language::Mr,
        notification_address: Some("chat-4411".to_string()),
        dietary_preference: None,
    }
}

/// Profile used by the documented end-to-end fixture.
pub(super) fn teen_registration() -> MotherRegistration {
    MotherRegistration {
        name: "Pooja Jadhav".to_string(),
        age: 17,
        bmi: 19.0,
        gravida: 1,
        parity: 0,
        ..registration()
    }
}

/// Profile that lands exactly on the HIGH threshold with [`high_risk_vitals`].
pub(super) fn older_registration() -> MotherRegistration {
    MotherRegistration {
        name: "Meena Shinde".to_string(),
        age: 38,
        gravida: 2,
        parity: 1,
        ..registration()
    }
}

pub(super) fn normal_vitals() -> Vitals {
    Vitals {
        systolic_bp: Some(118),
        diastolic_bp: Some(76),
        heart_rate: Some(82),
        blood_glucose: Some(90.0),
        hemoglobin: Some(12.0),
    }
}

pub(super) fn fixture_vitals() -> Vitals {
    Vitals {
        systolic_bp: Some(145),
        diastolic_bp: Some(95),
        heart_rate: Some(88),
        blood_glucose: Some(110.0),
        hemoglobin: Some(10.0),
    }
}

pub(super) fn high_risk_vitals() -> Vitals {
    Vitals {
        systolic_bp: Some(170),
        diastolic_bp: Some(112),
        heart_rate: Some(96),
        blood_glucose: Some(95.0),
        hemoglobin: Some(6.5),
    }
}

pub(super) fn mother(registration: MotherRegistration) -> Mother {
    Mother::from_registration(MotherId("mother-fixture".to_string()), registration, now())
}

pub(super) fn validated(vitals: Vitals) -> ValidatedVitals {
    VitalsValidator::default()
        .validate(&vitals)
        .expect("fixture vitals are plausible")
}

pub(super) fn request(mother_id: &MotherId, vitals: Vitals) -> AssessmentRequest {
    AssessmentRequest {
        mother_id: mother_id.clone(),
        vitals,
        symptoms: SymptomFlags::default(),
        gestational_week: Some(20),
    }
}

pub(super) fn build_service() -> (
    MaternalCareService<MemoryStore, MemoryNotifier>,
    Arc<MemoryStore>,
    Arc<MemoryNotifier>,
) {
    build_service_with(MemoryStore::default())
}

pub(super) fn build_service_with(
    store: MemoryStore,
) -> (
    MaternalCareService<MemoryStore, MemoryNotifier>,
    Arc<MemoryStore>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(store);
    let notifier = Arc::new(MemoryNotifier::default());
    let service = MaternalCareService::new(store.clone(), notifier.clone(), ScoringConfig::default());
    (service, store, notifier)
}

/// Write that the in-memory store should refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FailOn {
    Assessments,
    Emergencies,
    Tasks,
}

#[derive(Default)]
struct Records {
    mothers: BTreeMap<MotherId, Mother>,
    assessments: Vec<Assessment>,
    emergencies: Vec<EmergencyEvent>,
    tasks: BTreeMap<TaskId, AshaTask>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    records: Arc<Mutex<Records>>,
    fail_on: Option<FailOn>,
}

impl MemoryStore {
    pub(super) fn failing(fail_on: FailOn) -> Self {
        Self {
            fail_on: Some(fail_on),
            ..Self::default()
        }
    }

    pub(super) fn assessment_count(&self) -> usize {
        self.lock().assessments.len()
    }

    pub(super) fn emergency_count(&self) -> usize {
        self.lock().emergencies.len()
    }

    pub(super) fn task_count(&self) -> usize {
        self.lock().tasks.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Records> {
        self.records.lock().expect("store mutex poisoned")
    }

    fn refuse(&self, write: FailOn) -> Result<(), RepositoryError> {
        if self.fail_on == Some(write) {
            return Err(RepositoryError::Unavailable("disk full".to_string()));
        }
        Ok(())
    }
}

impl CareRecordStore for MemoryStore {
    fn create_mother(&self, mother: Mother) -> Result<Mother, RepositoryError> {
        let mut records = self.lock();
        if records.mothers.contains_key(&mother.id) {
            return Err(RepositoryError::Conflict);
        }
        records.mothers.insert(mother.id.clone(), mother.clone());
        Ok(mother)
    }

    fn update_mother(&self, mother: Mother) -> Result<(), RepositoryError> {
        let mut records = self.lock();
        match records.mothers.get_mut(&mother.id) {
            Some(existing) => {
                *existing = mother;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn get_mother(&self, id: &MotherId) -> Result<Option<Mother>, RepositoryError> {
        Ok(self.lock().mothers.get(id).cloned())
    }

    fn list_mothers(&self) -> Result<Vec<Mother>, RepositoryError> {
        Ok(self.lock().mothers.values().cloned().collect())
    }

    fn create_assessment(&self, assessment: Assessment) -> Result<Assessment, RepositoryError> {
        self.refuse(FailOn::Assessments)?;
        self.lock().assessments.push(assessment.clone());
        Ok(assessment)
    }

    fn get_assessment(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        Ok(self
            .lock()
            .assessments
            .iter()
            .find(|assessment| &assessment.id == id)
            .cloned())
    }

    fn assessments_by_mother(&self, id: &MotherId) -> Result<Vec<Assessment>, RepositoryError> {
        Ok(self
            .lock()
            .assessments
            .iter()
            .filter(|assessment| &assessment.mother_id == id)
            .cloned()
            .collect())
    }

    fn create_emergency(&self, event: EmergencyEvent) -> Result<EmergencyEvent, RepositoryError> {
        self.refuse(FailOn::Emergencies)?;
        self.lock().emergencies.push(event.clone());
        Ok(event)
    }

    fn emergencies_by_mother(
        &self,
        id: &MotherId,
    ) -> Result<Vec<EmergencyEvent>, RepositoryError> {
        Ok(self
            .lock()
            .emergencies
            .iter()
            .filter(|event| &event.mother_id == id)
            .cloned()
            .collect())
    }

    fn create_task(&self, task: AshaTask) -> Result<AshaTask, RepositoryError> {
        self.refuse(FailOn::Tasks)?;
        self.lock().tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    fn get_task(&self, id: &TaskId) -> Result<Option<AshaTask>, RepositoryError> {
        Ok(self.lock().tasks.get(id).cloned())
    }

    fn update_task(&self, task: AshaTask) -> Result<(), RepositoryError> {
        self.lock().tasks.insert(task.id.clone(), task);
        Ok(())
    }

    fn tasks_by_mother(&self, id: &MotherId) -> Result<Vec<AshaTask>, RepositoryError> {
        let mut tasks: Vec<AshaTask> = self
            .lock()
            .tasks
            .values()
            .filter(|task| &task.mother_id == id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.created_at);
        Ok(tasks)
    }
}

pub(super) struct UnavailableStore;

impl CareRecordStore for UnavailableStore {
    fn create_mother(&self, _mother: Mother) -> Result<Mother, RepositoryError> {
        Err(offline())
    }

    fn update_mother(&self, _mother: Mother) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn get_mother(&self, _id: &MotherId) -> Result<Option<Mother>, RepositoryError> {
        Err(offline())
    }

    fn list_mothers(&self) -> Result<Vec<Mother>, RepositoryError> {
        Err(offline())
    }

    fn create_assessment(&self, _assessment: Assessment) -> Result<Assessment, RepositoryError> {
        Err(offline())
    }

    fn get_assessment(&self, _id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        Err(offline())
    }

    fn assessments_by_mother(&self, _id: &MotherId) -> Result<Vec<Assessment>, RepositoryError> {
        Err(offline())
    }

    fn create_emergency(&self, _event: EmergencyEvent) -> Result<EmergencyEvent, RepositoryError> {
        Err(offline())
    }

    fn emergencies_by_mother(
        &self,
        _id: &MotherId,
    ) -> Result<Vec<EmergencyEvent>, RepositoryError> {
        Err(offline())
    }

    fn create_task(&self, _task: AshaTask) -> Result<AshaTask, RepositoryError> {
        Err(offline())
    }

    fn get_task(&self, _id: &TaskId) -> Result<Option<AshaTask>, RepositoryError> {
        Err(offline())
    }

    fn update_task(&self, _task: AshaTask) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn tasks_by_mother(&self, _id: &MotherId) -> Result<Vec<AshaTask>, RepositoryError> {
        Err(offline())
    }
}

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub(super) fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }

    pub(super) fn templates(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|notification| notification.template_key)
            .collect()
    }
}

impl NotificationSender for MemoryNotifier {
    fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct OfflineNotifier;

impl NotificationSender for OfflineNotifier {
    fn send(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("bot token revoked".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: MaternalCareService<MemoryStore, MemoryNotifier>,
) -> axum::Router {
    care_router(Arc::new(service))
}
