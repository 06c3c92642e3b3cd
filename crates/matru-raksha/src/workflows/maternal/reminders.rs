use serde::Serialize;

use super::domain::MotherId;

/// A gestational week that warrants a reminder to the mother.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub week: u32,
    pub key: &'static str,
    pub description: &'static str,
}

pub const MILESTONES: &[Milestone] = &[
    Milestone {
        week: 12,
        key: "first_trimester_screening",
        description: "First trimester screening",
    },
    Milestone {
        week: 20,
        key: "anatomy_scan",
        description: "Anatomy scan (mid-pregnancy ultrasound)",
    },
    Milestone {
        week: 24,
        key: "glucose_screening",
        description: "Glucose screening test",
    },
    Milestone {
        week: 28,
        key: "third_trimester",
        description: "Third trimester begins",
    },
    Milestone {
        week: 32,
        key: "growth_scan",
        description: "Growth scan",
    },
    Milestone {
        week: 36,
        key: "birth_plan",
        description: "Group B strep test and birth plan discussion",
    },
    Milestone {
        week: 37,
        key: "full_term",
        description: "Full term: the baby can arrive any time",
    },
    Milestone {
        week: 40,
        key: "due_date",
        description: "Due date week",
    },
];

pub fn milestone_for_week(week: u32) -> Option<&'static Milestone> {
    MILESTONES.iter().find(|milestone| milestone.week == week)
}

/// One reminder attempt made by a reminder run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneReminder {
    pub mother_id: MotherId,
    pub week: u32,
    pub milestone: String,
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
