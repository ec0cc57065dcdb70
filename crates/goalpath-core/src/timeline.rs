//! Suggested timelines for new goals
//!
//! Both functions here are pure: same inputs, same output, no I/O. The
//! "AI-suggested" timeline is a deterministic schedule, not a model inference.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::goal::Milestone;
use crate::types::Complexity;

/// Number of phases in a suggested timeline
pub const PHASE_COUNT: u32 = 5;

/// Phase objectives and descriptions, in order
const PHASES: [(&str, &str); PHASE_COUNT as usize] = [
    (
        "Research & Planning",
        "Gather resources and create a study plan",
    ),
    (
        "Foundation Building",
        "Learn the basic concepts and fundamentals",
    ),
    (
        "Practical Application",
        "Start applying knowledge through projects",
    ),
    ("Advanced Topics", "Dive deeper into complex areas"),
    (
        "Review & Mastery",
        "Solidify knowledge and prepare for next steps",
    ),
];

/// Goal category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    CareerDevelopment,
    EducationAndLearning,
    HealthAndFitness,
    FinancialGoals,
    PersonalDevelopment,
    Relationships,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::CareerDevelopment,
        Category::EducationAndLearning,
        Category::HealthAndFitness,
        Category::FinancialGoals,
        Category::PersonalDevelopment,
        Category::Relationships,
        Category::Other,
    ];

    /// Display label, as stored in `Goal::category`
    pub fn label(self) -> &'static str {
        match self {
            Category::CareerDevelopment => "Career Development",
            Category::EducationAndLearning => "Education & Learning",
            Category::HealthAndFitness => "Health & Fitness",
            Category::FinancialGoals => "Financial Goals",
            Category::PersonalDevelopment => "Personal Development",
            Category::Relationships => "Relationships",
            Category::Other => "Other",
        }
    }

    /// Resolve a label; anything unrecognized maps to [`Category::Other`]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
            .unwrap_or(Category::Other)
    }

    fn column(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Suggested weeks, indexed by complexity row and [`Category`] column
const DURATION_TABLE: [[u32; 7]; 3] = [
    // Career, Education, Health, Financial, Personal, Relationships, Other
    [8, 6, 4, 12, 8, 6, 8],
    [12, 8, 6, 24, 12, 8, 12],
    [24, 16, 12, 52, 24, 12, 16],
];

/// Suggested duration in weeks for a complexity/category pair.
///
/// Unknown categories fall back to the "Other" row entry.
pub fn suggest_duration(complexity: Complexity, category: &str) -> u32 {
    let row = match complexity {
        Complexity::Beginner => 0,
        Complexity::Intermediate => 1,
        Complexity::Advanced => 2,
    };
    DURATION_TABLE[row][Category::from_label(category).column()]
}

/// Week for phase `index` (1-based): `max(1, round(index * duration / 5))`.
fn phase_week(index: u32, duration_weeks: u32) -> u32 {
    // Integer form of round-half-up, widened so any u32 duration fits.
    let phases = u64::from(PHASE_COUNT);
    let scaled = 2 * u64::from(index) * u64::from(duration_weeks) + phases;
    // index <= PHASE_COUNT, so the week never exceeds the duration
    u32::try_from(scaled / (2 * phases))
        .unwrap_or(duration_weeks)
        .max(1)
}

/// Default five-phase milestone schedule for a new goal.
///
/// Category and complexity are accepted so callers pass the full goal
/// context; the schedule itself depends only on the duration.
pub fn generate_ai_milestones(
    _category: &str,
    _complexity: Complexity,
    duration_weeks: u32,
) -> Vec<Milestone> {
    PHASES
        .iter()
        .zip(1..=PHASE_COUNT)
        .map(|((objective, description), index)| {
            Milestone::new(phase_week(index, duration_weeks), *objective, *description)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProgressStatus;
    use proptest::prelude::*;

    #[test]
    fn test_suggest_duration_table() {
        assert_eq!(suggest_duration(Complexity::Beginner, "Health & Fitness"), 4);
        assert_eq!(suggest_duration(Complexity::Advanced, "Financial Goals"), 52);
        assert_eq!(
            suggest_duration(Complexity::Intermediate, "Education & Learning"),
            8
        );
    }

    #[test]
    fn test_suggest_duration_unknown_category_uses_other_row() {
        for complexity in Complexity::ALL {
            assert_eq!(
                suggest_duration(complexity, "Underwater Basket Weaving"),
                suggest_duration(complexity, "Other")
            );
        }
        assert_eq!(suggest_duration(Complexity::Advanced, ""), 16);
    }

    #[test]
    fn test_category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), category);
        }
        assert_eq!(Category::from_label("health & fitness"), Category::HealthAndFitness);
    }

    #[test]
    fn test_six_week_timeline() {
        let milestones =
            generate_ai_milestones("Education & Learning", Complexity::Beginner, 6);
        let weeks: Vec<u32> = milestones.iter().map(|m| m.week).collect();
        assert_eq!(weeks, vec![1, 2, 4, 5, 6]);
        assert_eq!(milestones[0].objective, "Research & Planning");
        assert_eq!(milestones[4].objective, "Review & Mastery");
        assert!(milestones
            .iter()
            .all(|m| m.status == ProgressStatus::NotStarted));
    }

    #[test]
    fn test_short_durations_floor_at_week_one() {
        let weeks: Vec<u32> = generate_ai_milestones("Other", Complexity::Beginner, 1)
            .iter()
            .map(|m| m.week)
            .collect();
        assert_eq!(weeks, vec![1, 1, 1, 1, 1]);

        let weeks: Vec<u32> = generate_ai_milestones("Other", Complexity::Beginner, 2)
            .iter()
            .map(|m| m.week)
            .collect();
        // 0.4, 0.8, 1.2, 1.6, 2.0
        assert_eq!(weeks, vec![1, 1, 1, 2, 2]);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate_ai_milestones("Relationships", Complexity::Advanced, 12);
        let b = generate_ai_milestones("Relationships", Complexity::Advanced, 12);
        assert_eq!(a, b);
    }

    #[test]
    fn test_huge_duration_does_not_overflow() {
        let weeks: Vec<u32> = generate_ai_milestones("Other", Complexity::Advanced, u32::MAX)
            .iter()
            .map(|m| m.week)
            .collect();
        assert_eq!(weeks.len(), 5);
        assert!(weeks.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(weeks[4], u32::MAX);
        assert_eq!(weeks[0], 858_993_459);
    }

    proptest! {
        #[test]
        fn prop_five_non_decreasing_weeks(
            duration in 1u32..=52,
            complexity in prop::sample::select(Complexity::ALL.to_vec()),
            category in prop::sample::select(Category::ALL.to_vec()),
        ) {
            let milestones = generate_ai_milestones(category.label(), complexity, duration);
            prop_assert_eq!(milestones.len(), 5);
            prop_assert!(milestones.iter().all(|m| m.week >= 1));
            prop_assert!(milestones.windows(2).all(|w| w[0].week <= w[1].week));
            prop_assert_eq!(milestones[4].week, duration);
        }
    }
}
