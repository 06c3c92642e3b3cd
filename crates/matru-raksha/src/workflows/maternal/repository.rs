use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    AshaTask, Assessment, AssessmentId, EmergencyEvent, Mother, MotherId, TaskId,
};

/// Record store collaborator. Every write is a single-record operation; no transactions are
/// assumed across calls.
pub trait CareRecordStore: Send + Sync {
    fn create_mother(&self, mother: Mother) -> Result<Mother, RepositoryError>;
    fn update_mother(&self, mother: Mother) -> Result<(), RepositoryError>;
    fn get_mother(&self, id: &MotherId) -> Result<Option<Mother>, RepositoryError>;
    fn list_mothers(&self) -> Result<Vec<Mother>, RepositoryError>;

    fn create_assessment(&self, assessment: Assessment) -> Result<Assessment, RepositoryError>;
    fn get_assessment(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError>;
    /// Assessments for a mother, oldest first.
    fn assessments_by_mother(&self, id: &MotherId) -> Result<Vec<Assessment>, RepositoryError>;

    fn create_emergency(&self, event: EmergencyEvent) -> Result<EmergencyEvent, RepositoryError>;
    fn emergencies_by_mother(&self, id: &MotherId)
        -> Result<Vec<EmergencyEvent>, RepositoryError>;

    fn create_task(&self, task: AshaTask) -> Result<AshaTask, RepositoryError>;
    fn get_task(&self, id: &TaskId) -> Result<Option<AshaTask>, RepositoryError>;
    fn update_task(&self, task: AshaTask) -> Result<(), RepositoryError>;
    /// Tasks for a mother, oldest first.
    fn tasks_by_mother(&self, id: &MotherId) -> Result<Vec<AshaTask>, RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Who a notification is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "address", rename_all = "snake_case")]
pub enum RecipientRef {
    /// The mother's own messaging address (chat id).
    Mother(String),
    /// The ASHA desk responsible for a location.
    AshaDesk(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: RecipientRef,
    pub template_key: String,
    pub mother_id: MotherId,
    pub payload: BTreeMap<String, String>,
}

/// Outbound messaging collaborator. No retry contract; failures are reported to the caller.
pub trait NotificationSender: Send + Sync {
    fn send(&self, notification: Notification) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("recipient rejected the message: {0}")]
    Rejected(String),
}
