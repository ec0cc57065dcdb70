//! Goal data structures and operations
//!
//! A [`Goal`] is the canonical, server-owned record. The client never invents
//! ids or progress values: it sends a [`GoalDraft`] or [`GoalPatch`] and keeps
//! whatever the goal service answers.
//!
//! # Invariants
//!
//! - `milestones` are sorted by `week` (enforced by [`Goal::normalize`])
//! - `progress_percent` is derived from the completed-milestone ratio

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GoalError, Result};
use crate::timeline;
use crate::types::{Complexity, ProgressStatus};

/// Shortest allowed goal duration, in weeks
pub const MIN_DURATION_WEEKS: u32 = 1;

/// Longest allowed goal duration, in weeks
pub const MAX_DURATION_WEEKS: u32 = 52;

/// Maximum title length accepted by the goal service
pub const MAX_TITLE_LEN: usize = 100;

/// Maximum description length accepted by the goal service
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Opaque, server-assigned goal identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(pub String);

impl GoalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GoalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for GoalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A dated sub-objective within a goal's timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Week number (1-based)
    pub week: u32,

    /// Short learning objective
    pub objective: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: ProgressStatus,

    /// Resources suggested by the journey generator, if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

impl Milestone {
    pub fn new(week: u32, objective: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            week,
            objective: objective.into(),
            description: description.into(),
            status: ProgressStatus::NotStarted,
            resources: Vec::new(),
        }
    }
}

fn first_week() -> u32 {
    1
}

/// A goal as stored by the goal service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    #[serde(rename = "_id", alias = "id")]
    pub id: GoalId,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub category: String,

    #[serde(default)]
    pub complexity: Complexity,

    #[serde(rename = "duration")]
    pub duration_weeks: u32,

    #[serde(default)]
    pub status: ProgressStatus,

    /// Completion percentage in [0, 100]
    #[serde(rename = "progress", default)]
    pub progress_percent: u8,

    #[serde(default)]
    pub milestones: Vec<Milestone>,

    #[serde(default = "first_week")]
    pub current_week: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Creation time as reported by the server (format is server-defined)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Goal {
    /// Restore the sorted-milestones invariant.
    ///
    /// The sort is stable, so milestones sharing a week keep their server order.
    pub fn normalize(mut self) -> Self {
        self.milestones.sort_by_key(|m| m.week);
        self
    }

    pub fn completed_milestones(&self) -> usize {
        self.milestones
            .iter()
            .filter(|m| m.status.is_completed())
            .count()
    }

    /// `completed / total * 100`, rounded to the nearest integer
    pub fn computed_progress(&self) -> u8 {
        let total = self.milestones.len();
        if total == 0 {
            return 0;
        }
        let ratio = self.completed_milestones() as f64 / total as f64;
        (ratio * 100.0).round() as u8
    }

    /// Recompute `progress_percent` and `status` from the milestones
    pub fn recompute_progress(&mut self) {
        self.progress_percent = self.computed_progress();
        self.status = ProgressStatus::from_progress(self.progress_percent);
    }

    pub fn milestone(&self, week: u32) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.week == week)
    }

    /// Set the status of the milestone for `week` and re-derive progress.
    ///
    /// Returns `false` (and changes nothing) when no milestone has that week.
    pub fn apply_milestone_status(&mut self, week: u32, status: ProgressStatus) -> bool {
        let Some(milestone) = self.milestones.iter_mut().find(|m| m.week == week) else {
            return false;
        };
        milestone.status = status;
        self.current_week = week;
        self.recompute_progress();
        true
    }
}

/// How the draft's milestones are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimelineKind {
    /// Five default phases derived from the duration
    #[default]
    AiSuggested,
    /// Milestones supplied by the user
    Custom,
}

/// Payload for creating a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalDraft {
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub complexity: Complexity,
    #[serde(rename = "duration")]
    pub duration_weeks: u32,
    #[serde(rename = "timelineType", default)]
    pub timeline: TimelineKind,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

impl GoalDraft {
    /// Create a builder for fluent draft construction
    pub fn builder() -> GoalDraftBuilder {
        GoalDraftBuilder::default()
    }

    /// Check required fields before anything is sent
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;

        if self.category.trim().is_empty() {
            return Err(GoalError::validation("category", "must not be empty"));
        }

        validate_description(&self.description)?;
        validate_duration(self.duration_weeks)?;

        if self.timeline == TimelineKind::Custom {
            if let Some(m) = self.milestones.iter().find(|m| m.week == 0) {
                return Err(GoalError::validation(
                    "milestones",
                    format!("milestone '{}' has week 0", m.objective),
                ));
            }
            if let Some(m) = self.milestones.iter().find(|m| m.objective.trim().is_empty()) {
                return Err(GoalError::validation(
                    "milestones",
                    format!("milestone for week {} has no objective", m.week),
                ));
            }
        }

        Ok(())
    }

    /// Fill in the suggested timeline (for AI-suggested drafts) and sort milestones.
    pub fn with_timeline(mut self) -> Self {
        if self.timeline == TimelineKind::AiSuggested {
            self.milestones = timeline::generate_ai_milestones(
                &self.category,
                self.complexity,
                self.duration_weeks,
            );
        }
        self.milestones.sort_by_key(|m| m.week);
        self
    }
}

/// Builder for constructing drafts fluently
#[derive(Debug, Default)]
pub struct GoalDraftBuilder {
    title: String,
    category: String,
    description: String,
    complexity: Complexity,
    duration_weeks: Option<u32>,
    milestones: Vec<Milestone>,
    timeline: TimelineKind,
}

impl GoalDraftBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    /// Set the duration; when unset the suggested duration is used
    pub fn duration_weeks(mut self, weeks: u32) -> Self {
        self.duration_weeks = Some(weeks);
        self
    }

    /// Add a custom milestone (switches the draft to a custom timeline)
    pub fn add_milestone(mut self, milestone: Milestone) -> Self {
        self.milestones.push(milestone);
        self.timeline = TimelineKind::Custom;
        self
    }

    /// Build the draft
    ///
    /// # Errors
    ///
    /// Returns `Err` if validation fails.
    pub fn build(self) -> Result<GoalDraft> {
        let duration_weeks = self
            .duration_weeks
            .unwrap_or_else(|| timeline::suggest_duration(self.complexity, &self.category));

        let draft = GoalDraft {
            title: self.title,
            category: self.category,
            description: self.description,
            complexity: self.complexity,
            duration_weeks,
            timeline: self.timeline,
            milestones: self.milestones,
        };

        draft.validate()?;

        Ok(draft)
    }
}

/// Partial goal update; unset fields are left untouched by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    #[serde(rename = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_weeks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProgressStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_week: Option<u32>,
}

impl GoalPatch {
    pub fn is_empty(&self) -> bool {
        *self == GoalPatch::default()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(category) = &self.category {
            if category.trim().is_empty() {
                return Err(GoalError::validation("category", "must not be empty"));
            }
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(weeks) = self.duration_weeks {
            validate_duration(weeks)?;
        }
        if self.current_week == Some(0) {
            return Err(GoalError::validation("current_week", "must be at least 1"));
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(GoalError::validation("title", "must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(GoalError::validation(
            "title",
            format!("must be at most {} characters", MAX_TITLE_LEN),
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(GoalError::validation(
            "description",
            format!("must be at most {} characters", MAX_DESCRIPTION_LEN),
        ));
    }
    Ok(())
}

fn validate_duration(weeks: u32) -> Result<()> {
    if !(MIN_DURATION_WEEKS..=MAX_DURATION_WEEKS).contains(&weeks) {
        return Err(GoalError::validation(
            "duration",
            format!(
                "must be between {} and {} weeks, got {}",
                MIN_DURATION_WEEKS, MAX_DURATION_WEEKS, weeks
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn goal_with_milestones(total: u32, completed: &[u32]) -> Goal {
        let milestones = (1..=total)
            .map(|week| {
                let mut m = Milestone::new(week, format!("Week {}", week), "");
                if completed.contains(&week) {
                    m.status = ProgressStatus::Completed;
                }
                m
            })
            .collect();
        Goal {
            id: GoalId::from("g1"),
            title: "Learn Rust".to_string(),
            description: String::new(),
            category: "Education & Learning".to_string(),
            complexity: Complexity::Intermediate,
            duration_weeks: total,
            status: ProgressStatus::NotStarted,
            progress_percent: 0,
            milestones,
            current_week: 1,
            user_id: None,
            created_at: None,
        }
    }

    #[test]
    fn test_goal_deserializes_server_shape() {
        let goal: Goal = serde_json::from_value(json!({
            "_id": "65a1f0",
            "title": "Learn Python Programming",
            "description": "Master Python fundamentals",
            "category": "Education & Learning",
            "complexity": "intermediate",
            "duration": 12,
            "progress": 45,
            "status": "in_progress",
            "current_week": 5,
            "user_id": "u1",
            "milestones": [
                { "week": 2, "objective": "Data Structures", "status": "completed" },
                { "week": 1, "objective": "Python Basics", "dependencies": [], "resources": ["docs"] }
            ],
            "created_at": "2024-01-15T10:00:00"
        }))
        .unwrap();

        assert_eq!(goal.id, GoalId::from("65a1f0"));
        assert_eq!(goal.duration_weeks, 12);
        assert_eq!(goal.progress_percent, 45);
        assert_eq!(goal.milestones[1].status, ProgressStatus::NotStarted);

        let goal = goal.normalize();
        assert_eq!(goal.milestones[0].week, 1);
        assert_eq!(goal.milestones[0].resources, vec!["docs".to_string()]);
    }

    #[test]
    fn test_goal_accepts_plain_id() {
        let goal: Goal = serde_json::from_value(json!({
            "id": "abc",
            "title": "T",
            "category": "Other",
            "duration": 4
        }))
        .unwrap();
        assert_eq!(goal.id.as_str(), "abc");
        assert_eq!(goal.current_week, 1);
        assert!(goal.milestones.is_empty());
    }

    #[test]
    fn test_progress_rounds_to_nearest() {
        let goal = goal_with_milestones(3, &[1]);
        assert_eq!(goal.computed_progress(), 33);
        let goal = goal_with_milestones(3, &[1, 2]);
        assert_eq!(goal.computed_progress(), 67);
        let goal = goal_with_milestones(0, &[]);
        assert_eq!(goal.computed_progress(), 0);
    }

    #[test]
    fn test_apply_milestone_status_recomputes() {
        let mut goal = goal_with_milestones(10, &[1, 2, 4, 5]);
        assert!(goal.apply_milestone_status(3, ProgressStatus::Completed));
        assert_eq!(goal.progress_percent, 50);
        assert_eq!(goal.status, ProgressStatus::InProgress);
        assert_eq!(goal.current_week, 3);
    }

    #[test]
    fn test_apply_milestone_status_all_completed() {
        let mut goal = goal_with_milestones(2, &[1]);
        assert!(goal.apply_milestone_status(2, ProgressStatus::Completed));
        assert_eq!(goal.progress_percent, 100);
        assert_eq!(goal.status, ProgressStatus::Completed);
    }

    #[test]
    fn test_apply_milestone_status_unknown_week() {
        let mut goal = goal_with_milestones(4, &[]);
        let before = goal.clone();
        assert!(!goal.apply_milestone_status(9, ProgressStatus::Completed));
        assert_eq!(goal, before);
    }

    #[test]
    fn test_draft_builder_uses_suggested_duration() {
        let draft = GoalDraft::builder()
            .title("Run a 10k")
            .category("Health & Fitness")
            .complexity(Complexity::Beginner)
            .build()
            .unwrap();
        assert_eq!(draft.duration_weeks, 4);
        assert_eq!(draft.timeline, TimelineKind::AiSuggested);
    }

    #[test]
    fn test_draft_validation() {
        let err = GoalDraft::builder()
            .title("   ")
            .category("Other")
            .duration_weeks(4)
            .build()
            .unwrap_err();
        assert!(matches!(err, GoalError::Validation { field: "title", .. }));

        let err = GoalDraft::builder()
            .title("Learn Go")
            .category("")
            .duration_weeks(4)
            .build()
            .unwrap_err();
        assert!(matches!(err, GoalError::Validation { field: "category", .. }));

        for weeks in [0, 53] {
            let err = GoalDraft::builder()
                .title("Learn Go")
                .category("Other")
                .duration_weeks(weeks)
                .build()
                .unwrap_err();
            assert!(matches!(err, GoalError::Validation { field: "duration", .. }));
        }
    }

    #[test]
    fn test_custom_draft_keeps_milestones_sorted() {
        let draft = GoalDraft::builder()
            .title("Budget")
            .category("Financial Goals")
            .duration_weeks(8)
            .add_milestone(Milestone::new(4, "Track spending", ""))
            .add_milestone(Milestone::new(1, "List accounts", ""))
            .build()
            .unwrap()
            .with_timeline();
        assert_eq!(draft.timeline, TimelineKind::Custom);
        let weeks: Vec<u32> = draft.milestones.iter().map(|m| m.week).collect();
        assert_eq!(weeks, vec![1, 4]);
    }

    #[test]
    fn test_draft_wire_format() {
        let draft = GoalDraft::builder()
            .title("Learn Go")
            .category("Education & Learning")
            .complexity(Complexity::Beginner)
            .duration_weeks(6)
            .build()
            .unwrap()
            .with_timeline();
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["duration"], 6);
        assert_eq!(value["timelineType"], "ai-suggested");
        assert_eq!(value["milestones"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = GoalPatch {
            title: Some("New title".to_string()),
            duration_weeks: Some(10),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({ "title": "New title", "duration": 10 }));
        assert!(GoalPatch::default().is_empty());
    }

    #[test]
    fn test_patch_validation() {
        let patch = GoalPatch {
            duration_weeks: Some(60),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = GoalPatch {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
