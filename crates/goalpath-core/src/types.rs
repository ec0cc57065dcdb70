//! Core types for GoalPath
//!
//! This module defines the small value types shared by goals and milestones:
//! - Progress status
//! - Complexity level
//! - Timestamps

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress status shared by goals and milestones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    /// Status implied by a progress percentage
    pub fn from_progress(progress: u8) -> Self {
        match progress {
            0 => ProgressStatus::NotStarted,
            p if p >= 100 => ProgressStatus::Completed,
            _ => ProgressStatus::InProgress,
        }
    }

    pub fn is_completed(self) -> bool {
        matches!(self, ProgressStatus::Completed)
    }

    /// Wire name, as sent to the goal service
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not_started",
            ProgressStatus::InProgress => "in_progress",
            ProgressStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProgressStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "not_started" => Ok(ProgressStatus::NotStarted),
            "in_progress" => Ok(ProgressStatus::InProgress),
            "completed" => Ok(ProgressStatus::Completed),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Goal complexity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Complexity {
    pub const ALL: [Complexity; 3] = [
        Complexity::Beginner,
        Complexity::Intermediate,
        Complexity::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Complexity::Beginner => "beginner",
            Complexity::Intermediate => "intermediate",
            Complexity::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Complexity::Beginner),
            "intermediate" => Ok(Complexity::Intermediate),
            "advanced" => Ok(Complexity::Advanced),
            other => Err(format!("unknown complexity '{}'", other)),
        }
    }
}

/// Timestamp type alias
pub type Timestamp = DateTime<Utc>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_progress() {
        assert_eq!(ProgressStatus::from_progress(0), ProgressStatus::NotStarted);
        assert_eq!(ProgressStatus::from_progress(50), ProgressStatus::InProgress);
        assert_eq!(ProgressStatus::from_progress(100), ProgressStatus::Completed);
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&ProgressStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: ProgressStatus = serde_json::from_str("\"not_started\"").unwrap();
        assert_eq!(parsed, ProgressStatus::NotStarted);
    }

    #[test]
    fn test_parse_from_cli_input() {
        assert_eq!("In-Progress".parse::<ProgressStatus>(), Ok(ProgressStatus::InProgress));
        assert_eq!("ADVANCED".parse::<Complexity>(), Ok(Complexity::Advanced));
        assert!("expert".parse::<Complexity>().is_err());
    }
}
