//! Progress reporting: per-goal progress as reported by the service, and the
//! dashboard summary derived locally from the cached goal list.

use serde::{Deserialize, Serialize};

use crate::goal::Goal;
use crate::types::ProgressStatus;

/// Milestone counts for one goal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneCounts {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
}

impl MilestoneCounts {
    pub fn of(goal: &Goal) -> Self {
        let total = goal.milestones.len();
        let completed = goal.completed_milestones();
        let in_progress = goal
            .milestones
            .iter()
            .filter(|m| m.status == ProgressStatus::InProgress)
            .count();
        Self {
            total,
            completed,
            in_progress,
            not_started: total - completed - in_progress,
        }
    }
}

/// Response of `GET /goals/{id}/progress`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub status: ProgressStatus,
    #[serde(default)]
    pub milestones: MilestoneCounts,
    #[serde(default = "default_week")]
    pub current_week: u32,
}

fn default_week() -> u32 {
    1
}

impl GoalProgress {
    /// Progress computed from a locally cached goal
    pub fn of(goal: &Goal) -> Self {
        Self {
            progress: goal.progress_percent,
            status: goal.status,
            milestones: MilestoneCounts::of(goal),
            current_week: goal.current_week,
        }
    }
}

/// Aggregate figures for the dashboard header
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_goals: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub not_started: usize,
    /// Mean of `progress_percent` across goals, 0.0 when there are none
    pub average_progress: f64,
    pub milestones_completed: usize,
    pub milestones_total: usize,
}

impl DashboardSummary {
    pub fn from_goals(goals: &[Goal]) -> Self {
        let mut summary = DashboardSummary {
            total_goals: goals.len(),
            ..Default::default()
        };

        let mut progress_sum = 0u64;
        for goal in goals {
            match goal.status {
                ProgressStatus::NotStarted => summary.not_started += 1,
                ProgressStatus::InProgress => summary.in_progress += 1,
                ProgressStatus::Completed => summary.completed += 1,
            }
            progress_sum += u64::from(goal.progress_percent);
            summary.milestones_completed += goal.completed_milestones();
            summary.milestones_total += goal.milestones.len();
        }

        if !goals.is_empty() {
            summary.average_progress = progress_sum as f64 / goals.len() as f64;
        }

        summary
    }
}
