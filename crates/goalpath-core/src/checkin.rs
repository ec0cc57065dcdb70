//! Weekly check-ins

use serde::{Deserialize, Serialize};

use crate::error::{GoalError, Result};
use crate::goal::GoalId;

/// Self-reported confidence level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "very_low" => Ok(Confidence::VeryLow),
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            "very_high" => Ok(Confidence::VeryHigh),
            other => Err(format!("unknown confidence level '{}'", other)),
        }
    }
}

/// A weekly progress report for one goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub goal_id: GoalId,
    pub progress_notes: String,
    /// Weeks of the milestones completed since the last check-in
    #[serde(default)]
    pub completed_milestones: Vec<u32>,
    #[serde(default)]
    pub challenges: String,
    #[serde(default)]
    pub next_steps: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_spent: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl CheckIn {
    pub fn new(goal_id: GoalId, progress_notes: impl Into<String>) -> Self {
        Self {
            goal_id,
            progress_notes: progress_notes.into(),
            completed_milestones: Vec::new(),
            challenges: String::new(),
            next_steps: String::new(),
            hours_spent: None,
            confidence: None,
        }
    }

    pub fn with_completed(mut self, weeks: Vec<u32>) -> Self {
        self.completed_milestones = weeks;
        self
    }

    pub fn with_challenges(mut self, challenges: impl Into<String>) -> Self {
        self.challenges = challenges.into();
        self
    }

    pub fn with_next_steps(mut self, next_steps: impl Into<String>) -> Self {
        self.next_steps = next_steps.into();
        self
    }

    pub fn with_hours(mut self, hours: f32) -> Self {
        self.hours_spent = Some(hours);
        self
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.progress_notes.trim().is_empty() {
            return Err(GoalError::validation("progress_notes", "must not be empty"));
        }
        if let Some(hours) = self.hours_spent {
            if !hours.is_finite() || hours < 0.0 {
                return Err(GoalError::validation(
                    "hours_spent",
                    "must be a non-negative number",
                ));
            }
        }
        if self.completed_milestones.contains(&0) {
            return Err(GoalError::validation(
                "completed_milestones",
                "weeks start at 1",
            ));
        }
        Ok(())
    }
}
