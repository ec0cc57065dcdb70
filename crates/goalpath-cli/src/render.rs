//! Terminal output

use colored::Colorize;

use goalpath_core::{
    generate_ai_milestones, suggest_duration, Category, Complexity, Credentials,
    DashboardSummary, Goal, GoalId, GoalProgress, ProgressStatus,
};

fn status_label(status: ProgressStatus) -> colored::ColoredString {
    match status {
        ProgressStatus::NotStarted => status.as_str().dimmed(),
        ProgressStatus::InProgress => status.as_str().yellow(),
        ProgressStatus::Completed => status.as_str().green(),
    }
}

/// Ten-cell progress bar
fn bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) / 10;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(10 - filled))
}

pub(crate) fn signed_in(credentials: &Credentials) {
    match &credentials.user {
        Some(user) => println!("Signed in as {} <{}>", user.name.bold(), user.email),
        None => println!("Signed in."),
    }
}

pub(crate) fn goal_table(goals: &[Goal]) {
    if goals.is_empty() {
        println!("No goals yet. Create one with `goalpath goals create`.");
        return;
    }
    for goal in goals {
        println!(
            "{:<26} {} {:>3}%  {:<12} {}",
            goal.id.as_str().dimmed(),
            bar(goal.progress_percent),
            goal.progress_percent,
            status_label(goal.status),
            goal.title.bold()
        );
    }
}

pub(crate) fn goal_detail(goal: &Goal) {
    println!("{}", goal.title.bold());
    println!(
        "  {} | {} | {} weeks | week {}",
        goal.category, goal.complexity, goal.duration_weeks, goal.current_week
    );
    if !goal.description.is_empty() {
        println!("  {}", goal.description);
    }
    println!(
        "  {} {}% {}",
        bar(goal.progress_percent),
        goal.progress_percent,
        status_label(goal.status)
    );
    for milestone in &goal.milestones {
        println!(
            "  week {:>2}  {:<12} {}",
            milestone.week,
            status_label(milestone.status),
            milestone.objective
        );
    }
}

pub(crate) fn progress(id: &GoalId, progress: &GoalProgress) {
    println!(
        "{}: {} {}% {}",
        id,
        bar(progress.progress),
        progress.progress,
        status_label(progress.status)
    );
    let m = &progress.milestones;
    println!(
        "  milestones: {} completed, {} in progress, {} not started ({} total)",
        m.completed, m.in_progress, m.not_started, m.total
    );
    println!("  current week: {}", progress.current_week);
}

pub(crate) fn summary(summary: &DashboardSummary) {
    println!("Goals:       {}", summary.total_goals);
    println!("In progress: {}", summary.in_progress);
    println!("Completed:   {}", summary.completed);
    println!("Not started: {}", summary.not_started);
    println!("Average:     {:.1}%", summary.average_progress);
    println!(
        "Milestones:  {}/{}",
        summary.milestones_completed, summary.milestones_total
    );
}

pub(crate) fn suggestion(complexity: Complexity, category: &str) {
    let resolved = Category::from_label(category);
    let weeks = suggest_duration(complexity, category);
    println!(
        "{} goal in {}: {} weeks",
        complexity,
        resolved.label().bold(),
        weeks
    );
    for milestone in generate_ai_milestones(category, complexity, weeks) {
        println!("  week {:>2}  {}", milestone.week, milestone.objective);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar() {
        assert_eq!(bar(0), "[..........]");
        assert_eq!(bar(45), "[####......]");
        assert_eq!(bar(100), "[##########]");
        assert_eq!(bar(250), "[##########]");
    }
}
