//! Progress engine: derived progress and status for the Project -> Step -> Task graph.
//!
//! Everything here is a pure function of its inputs plus `now`.
//!
//! Rules:
//! - step progress = round(100 * completed tasks / tasks), or 100/0 from the
//!   manual flag when the step has no tasks
//! - project progress = round(mean(step progress)), every step weighted equally
//! - status: completed > overdue > in-progress > not-started
//!
//! All rounding is half-up on the final percentage, done in integer arithmetic.

use chrono::{DateTime, Utc};

use crate::project::{Project, ProjectStatus};
use crate::step::Step;

/// round(100 * num / den), half-up. `den` must be non-zero.
fn percent_half_up(num: u64, den: u64) -> u8 {
    let pct = (200 * num + den) / (2 * den);
    pct.min(100) as u8
}

pub fn step_progress(step: &Step) -> u8 {
    if step.tasks.is_empty() {
        return if step.completed { 100 } else { 0 };
    }
    percent_half_up(step.completed_tasks() as u64, step.tasks.len() as u64)
}

/// Unweighted mean of step progress, rounded once at the end.
pub fn project_progress(project: &Project) -> u8 {
    if project.steps.is_empty() {
        return 0;
    }
    let sum: u64 = project.steps.iter().map(|s| step_progress(s) as u64).sum();
    let n = project.steps.len() as u64;
    // sum / n is already a percentage; round it half-up.
    ((2 * sum + n) / (2 * n)).min(100) as u8
}

/// Status from the project's current `progress`, its target date and leaf flags.
///
/// A single completed task promotes the project to in-progress even when the
/// aggregate progress still rounds to 0.
pub fn project_status(project: &Project, now: DateTime<Utc>) -> ProjectStatus {
    if project.progress >= 100 {
        ProjectStatus::Completed
    } else if now > project.target_date {
        ProjectStatus::Overdue
    } else if project.progress > 0 || project.has_any_completion() {
        ProjectStatus::InProgress
    } else {
        ProjectStatus::NotStarted
    }
}

/// Re-derive `completed` from tasks. Steps without tasks keep their manual flag.
///
/// `completed_at` is stamped only on the incomplete -> complete transition and
/// cleared on the way back; a no-op recompute leaves it alone.
pub fn sync_step_completion(mut step: Step, now: DateTime<Utc>) -> Step {
    if step.tasks.is_empty() {
        return step;
    }
    let all_done = step.tasks.iter().all(|t| t.completed);
    match (step.completed, all_done) {
        (false, true) => {
            step.completed = true;
            step.completed_at = Some(now);
        }
        (true, false) => {
            step.completed = false;
            step.completed_at = None;
        }
        _ => {}
    }
    step
}

/// Restore every derived field on `project`. Run after each mutation.
///
/// Idempotent for a fixed `now`.
pub fn recalculate(mut project: Project, now: DateTime<Utc>) -> Project {
    project.steps = project
        .steps
        .into_iter()
        .map(|s| {
            let mut s = sync_step_completion(s, now);
            s.progress = step_progress(&s);
            s
        })
        .collect();
    project.progress = project_progress(&project);
    project.status = project_status(&project, now);
    project
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{Category, NewProject};
    use crate::step::ProjectLabel;
    use crate::task::Task;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn label() -> ProjectLabel {
        ProjectLabel {
            project_id: "p1".into(),
            project_title: "Maths".into(),
        }
    }

    fn step_with(done: usize, total: usize) -> Step {
        let mut s = Step::new("s1", label(), "Chapitre 1");
        for i in 0..total {
            let t = Task::new(format!("t{i}"), "s1", format!("exercice {i}"));
            s.tasks.push(if i < done { t.complete(now()) } else { t });
        }
        s
    }

    fn project(target: DateTime<Utc>, steps: Vec<Step>) -> Project {
        let mut p = NewProject::new("Maths", Category::Learning, target).into_project("p1", now());
        p.steps = steps;
        p
    }

    #[test]
    fn step_progress_rounds_half_up() {
        assert_eq!(step_progress(&step_with(2, 3)), 67);
        assert_eq!(step_progress(&step_with(1, 3)), 33);
        assert_eq!(step_progress(&step_with(1, 8)), 13); // 12.5
        assert_eq!(step_progress(&step_with(0, 4)), 0);
        assert_eq!(step_progress(&step_with(4, 4)), 100);
    }

    #[test]
    fn empty_step_follows_manual_flag() {
        let mut s = step_with(0, 0);
        assert_eq!(step_progress(&s), 0);
        s.completed = true;
        assert_eq!(step_progress(&s), 100);
    }

    #[test]
    fn project_progress_is_unweighted_mean() {
        let p = project(now() + Duration::days(30), vec![step_with(1, 1), step_with(1, 4)]);
        // (100 + 25) / 2 = 62.5
        assert_eq!(project_progress(&p), 63);
        assert_eq!(project_progress(&project(now(), vec![])), 0);
    }

    #[test]
    fn completed_wins_over_overdue() {
        let mut p = project(now() - Duration::days(1), vec![step_with(2, 2)]);
        p.progress = project_progress(&p);
        assert_eq!(project_status(&p, now()), ProjectStatus::Completed);
    }

    #[test]
    fn past_target_without_completion_is_overdue() {
        let p = project(now() - Duration::days(1), vec![step_with(0, 2)]);
        assert_eq!(project_status(&p, now()), ProjectStatus::Overdue);
    }

    #[test]
    fn untouched_project_is_not_started() {
        let p = project(now() + Duration::days(1), vec![step_with(0, 2)]);
        assert_eq!(project_status(&p, now()), ProjectStatus::NotStarted);
    }

    #[test]
    fn one_completed_task_promotes_to_in_progress_at_zero_progress() {
        // 1 of 300 tasks rounds to 0%, but a leaf is done.
        let p = recalculate(project(now() + Duration::days(1), vec![step_with(1, 300)]), now());
        assert_eq!(p.progress, 0);
        assert_eq!(p.status, ProjectStatus::InProgress);
    }

    #[test]
    fn sync_stamps_only_on_transition() {
        let earlier = now() - Duration::hours(3);
        let s = sync_step_completion(step_with(2, 2), earlier);
        assert!(s.completed);
        assert_eq!(s.completed_at, Some(earlier));

        // recompute later: unchanged
        let s = sync_step_completion(s, now());
        assert_eq!(s.completed_at, Some(earlier));

        // reopen a task: cleared
        let mut s = s;
        s.tasks[0].toggle(now());
        let s = sync_step_completion(s, now());
        assert!(!s.completed);
        assert_eq!(s.completed_at, None);
    }

    #[test]
    fn sync_leaves_taskless_step_alone() {
        let mut s = step_with(0, 0);
        s.toggle(now());
        let synced = sync_step_completion(s.clone(), now() + Duration::hours(1));
        assert_eq!(synced, s);
    }

    #[test]
    fn recalculate_is_idempotent() {
        let steps = vec![step_with(2, 3), step_with(0, 0), step_with(1, 1)];
        let p = project(now() + Duration::days(5), steps);
        let once = recalculate(p, now());
        let twice = recalculate(once.clone(), now());
        assert_eq!(once, twice);
        assert_eq!(once.steps[0].progress, 67);
        assert!(once.steps[2].completed);
        // (67 + 0 + 100) / 3 = 55.67
        assert_eq!(once.progress, 56);
    }
}
