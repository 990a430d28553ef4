//! Plain-text rendering for terminal output.

use cartable_core::{Project, ProjectStats, format_local_date};

fn check(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

pub fn project_line(p: &Project, tz: &str) -> String {
    format!(
        "{} | {:<11} | {:>3}% | {} | {} | due {}",
        p.id,
        p.status.as_str(),
        p.progress,
        p.category.as_str(),
        p.title,
        format_local_date(p.target_date, tz)
    )
}

pub fn project_tree(p: &Project, tz: &str) -> String {
    let mut out = format!(
        "{} [{}] {}%\n  id: {}\n  target: {}\n",
        p.title,
        p.status,
        p.progress,
        p.id,
        format_local_date(p.target_date, tz)
    );
    if !p.description.is_empty() {
        out.push_str(&format!("  {}\n", p.description));
    }
    if p.steps.is_empty() {
        out.push_str("  (no steps yet)\n");
    }
    for s in &p.steps {
        out.push_str(&format!(
            "  {} {} ({}%)  {}\n",
            check(s.completed),
            s.title,
            s.progress,
            s.id
        ));
        for t in &s.tasks {
            out.push_str(&format!(
                "      {} {} !{}  {}\n",
                check(t.completed),
                t.title,
                t.priority.as_str(),
                t.id
            ));
        }
    }
    out
}

pub fn stats_block(s: &ProjectStats) -> String {
    format!(
        "Projects: {}\n  completed:   {}\n  in progress: {}\n  overdue:     {}\n  \
         not started: {}\n",
        s.total, s.completed, s.in_progress, s.overdue, s.not_started
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartable_core::{Category, NewProject, NewStep, Portfolio};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn tree_lists_steps_and_tasks() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        let pf = Portfolio::new().create_project(
            NewProject::new("Guitare", Category::Personal, now + Duration::days(3)),
            now,
        );
        let pid = pf.get(0).unwrap().id.clone();
        let pf = pf.add_step(&pid, NewStep::new("Accords"), now + Duration::milliseconds(1));
        let sid = pf.get(0).unwrap().steps[0].id.clone();
        let pf = pf.add_task(&pid, &sid, "Do majeur", now + Duration::milliseconds(2));

        let tree = project_tree(pf.get(0).unwrap(), "UTC");
        assert!(tree.starts_with("Guitare [not-started] 0%"));
        assert!(tree.contains("[ ] Accords (0%)"));
        assert!(tree.contains("[ ] Do majeur !medium"));
        assert!(project_line(pf.get(0).unwrap(), "UTC").contains("due 2026-01-08"));
    }

    #[test]
    fn stats_block_lists_every_bucket() {
        let s = ProjectStats {
            total: 4,
            completed: 1,
            in_progress: 1,
            overdue: 1,
            not_started: 1,
        };
        let out = stats_block(&s);
        assert!(out.starts_with("Projects: 4"));
        assert_eq!(out.lines().count(), 5);
    }
}
