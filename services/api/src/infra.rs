use matru_raksha::workflows::maternal::{
    AshaTask, Assessment, AssessmentId, CareRecordStore, EmergencyEvent, Mother, MotherId,
    Notification, NotificationError, NotificationSender, RepositoryError, ScoringConfig, Symptom,
    TaskId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct CareRecords {
    mothers: HashMap<MotherId, Mother>,
    assessments: Vec<Assessment>,
    emergencies: Vec<EmergencyEvent>,
    tasks: HashMap<TaskId, AshaTask>,
}

/// Process-local record store used until a database adapter is wired in.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCareStore {
    records: Arc<Mutex<CareRecords>>,
}

impl InMemoryCareStore {
    fn lock(&self) -> Result<MutexGuard<'_, CareRecords>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("record store mutex poisoned".to_string()))
    }
}

impl CareRecordStore for InMemoryCareStore {
    fn create_mother(&self, mother: Mother) -> Result<Mother, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.mothers.contains_key(&mother.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.mothers.insert(mother.id.clone(), mother.clone());
        Ok(mother)
    }

    fn update_mother(&self, mother: Mother) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if guard.mothers.contains_key(&mother.id) {
            guard.mothers.insert(mother.id.clone(), mother);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn get_mother(&self, id: &MotherId) -> Result<Option<Mother>, RepositoryError> {
        Ok(self.lock()?.mothers.get(id).cloned())
    }

    fn list_mothers(&self) -> Result<Vec<Mother>, RepositoryError> {
        Ok(self.lock()?.mothers.values().cloned().collect())
    }

    fn create_assessment(&self, assessment: Assessment) -> Result<Assessment, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.assessments.iter().any(|existing| existing.id == assessment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.assessments.push(assessment.clone());
        Ok(assessment)
    }

    fn get_assessment(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        Ok(self
            .lock()?
            .assessments
            .iter()
            .find(|assessment| &assessment.id == id)
            .cloned())
    }

    fn assessments_by_mother(&self, id: &MotherId) -> Result<Vec<Assessment>, RepositoryError> {
        Ok(self
            .lock()?
            .assessments
            .iter()
            .filter(|assessment| &assessment.mother_id == id)
            .cloned()
            .collect())
    }

    fn create_emergency(&self, event: EmergencyEvent) -> Result<EmergencyEvent, RepositoryError> {
        self.lock()?.emergencies.push(event.clone());
        Ok(event)
    }

    fn emergencies_by_mother(
        &self,
        id: &MotherId,
    ) -> Result<Vec<EmergencyEvent>, RepositoryError> {
        Ok(self
            .lock()?
            .emergencies
            .iter()
            .filter(|event| &event.mother_id == id)
            .cloned()
            .collect())
    }

    fn create_task(&self, task: AshaTask) -> Result<AshaTask, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.tasks.contains_key(&task.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    fn get_task(&self, id: &TaskId) -> Result<Option<AshaTask>, RepositoryError> {
        Ok(self.lock()?.tasks.get(id).cloned())
    }

    fn update_task(&self, task: AshaTask) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if guard.tasks.contains_key(&task.id) {
            guard.tasks.insert(task.id.clone(), task);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn tasks_by_mother(&self, id: &MotherId) -> Result<Vec<AshaTask>, RepositoryError> {
        let mut tasks: Vec<AshaTask> = self
            .lock()?
            .tasks
            .values()
            .filter(|task| &task.mother_id == id)
            .cloned()
            .collect();
        tasks.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(tasks)
    }
}

/// Stand-in for the messaging bot: logs every notification and keeps a copy.
#[derive(Default, Clone)]
pub(crate) struct LoggingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl LoggingNotifier {
    pub(crate) fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl NotificationSender for LoggingNotifier {
    fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        info!(
            template = %notification.template_key,
            mother_id = %notification.mother_id,
            recipient = ?notification.recipient,
            "notification dispatched"
        );
        self.sent
            .lock()
            .map_err(|_| NotificationError::Transport("outbox mutex poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}

pub(crate) fn default_scoring_config() -> ScoringConfig {
    ScoringConfig::default()
}

pub(crate) fn parse_symptom(raw: &str) -> Result<Symptom, String> {
    let name = raw.trim().to_ascii_lowercase().replace('-', "_");
    serde_json::from_value(Value::String(name))
        .map_err(|_| format!("unknown symptom '{raw}' (expected e.g. severe_bleeding, dizziness)"))
}
