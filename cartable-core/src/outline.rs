//! Markdown outline import: one file describes one project.
//!
//! ```text
//! # Bac de français
//! category: learning
//! priority: high
//! target: 2026-06-15
//!
//! ## Lectures
//! - [x] Candide
//! - [ ] Les Fleurs du mal !high
//!
//! ## [x] Inscription
//! ```
//!
//! Metadata lines (`key: value`) are read until the first `##` heading.
//! A `## [x] ...` heading marks a step done by hand (only meaningful when the
//! step has no tasks).

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use regex::Regex;

use crate::portfolio::generate_id;
use crate::project::{Category, NewProject, Project};
use crate::step::Step;
use crate::task::{Priority, Task};
use crate::time::parse_target_date;

#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutline {
    pub title: String,
    pub completed: bool,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutline {
    pub title: String,
    pub completed: bool,
    pub tasks: Vec<TaskOutline>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectOutline {
    pub project: NewProject,
    pub steps: Vec<StepOutline>,
}

fn is_checked(mark: &str) -> bool {
    mark.eq_ignore_ascii_case("x")
}

/// Parse an outline. Dates without an offset are read in `tz`.
pub fn parse_outline(md: &str, tz: &str) -> Result<ProjectOutline> {
    let title_re = Regex::new(r"^#\s+(.+)$")?;
    let step_re = Regex::new(r"^##\s+(?:\[([ xX])\]\s+)?(.+)$")?;
    let task_re = Regex::new(r"^[-*]\s+\[([ xX])\]\s+(.+?)(?:\s+!(\w+))?$")?;
    let meta_re = Regex::new(r"^([A-Za-z_]+):\s*(.*)$")?;

    let mut title: Option<String> = None;
    let mut description = String::new();
    let mut category: Option<Category> = None;
    let mut priority = Priority::Medium;
    let mut target: Option<DateTime<Utc>> = None;
    let mut steps: Vec<StepOutline> = Vec::new();

    for (n, line) in md.lines().enumerate() {
        let lineno = n + 1;
        let l = line.trim();
        if l.is_empty() {
            continue;
        }

        if let Some(c) = step_re.captures(l) {
            steps.push(StepOutline {
                title: c[2].trim().to_string(),
                completed: c.get(1).is_some_and(|m| is_checked(m.as_str())),
                tasks: Vec::new(),
            });
            continue;
        }

        if let Some(c) = title_re.captures(l) {
            if title.is_some() {
                bail!("line {lineno}: outline describes more than one project");
            }
            title = Some(c[1].trim().to_string());
            continue;
        }

        if let Some(c) = task_re.captures(l) {
            let step = steps
                .last_mut()
                .ok_or_else(|| anyhow!("line {lineno}: task appears before any `##` step"))?;
            let priority = match c.get(3) {
                Some(p) => Priority::parse(p.as_str())
                    .ok_or_else(|| anyhow!("line {lineno}: unknown priority `{}`", p.as_str()))?,
                None => Priority::Medium,
            };
            step.tasks.push(TaskOutline {
                title: c[2].trim().to_string(),
                completed: is_checked(&c[1]),
                priority,
            });
            continue;
        }

        if steps.is_empty() {
            if let Some(c) = meta_re.captures(l) {
                let value = c[2].trim();
                match c[1].to_lowercase().as_str() {
                    "category" => {
                        category = Some(Category::parse(value).ok_or_else(|| {
                            anyhow!("line {lineno}: unknown category `{value}`")
                        })?)
                    }
                    "priority" => {
                        priority = Priority::parse(value)
                            .ok_or_else(|| anyhow!("line {lineno}: unknown priority `{value}`"))?
                    }
                    "target" | "target_date" | "due" => {
                        target = Some(
                            parse_target_date(value, tz)
                                .with_context(|| format!("line {lineno}: target date"))?,
                        )
                    }
                    "description" => description = value.to_string(),
                    // unknown keys are ignored
                    _ => {}
                }
            }
        }
    }

    let title = title.ok_or_else(|| anyhow!("outline has no `# title` line"))?;
    let target = target.ok_or_else(|| anyhow!("outline has no `target:` date"))?;
    let category = category.unwrap_or(Category::Personal);

    Ok(ProjectOutline {
        project: NewProject::new(title, category, target)
            .with_description(description)
            .with_priority(priority),
        steps,
    })
}

impl ProjectOutline {
    /// Build the project graph with deterministic child ids.
    ///
    /// Not recalculated; hand the result to `Portfolio::insert_project`.
    pub fn into_project(self, now: DateTime<Utc>) -> Project {
        let mut project = self.project.into_project(generate_id("project", now), now);
        let label = project.label();

        for (i, so) in self.steps.into_iter().enumerate() {
            let step_id = format!("{}-s{}", project.id, i + 1);
            let mut step = Step::new(step_id.clone(), label.clone(), so.title);
            if so.completed {
                step.toggle(now);
            }
            for (j, to) in so.tasks.into_iter().enumerate() {
                let task = Task::new(format!("{step_id}-t{}", j + 1), step_id.as_str(), to.title)
                    .with_priority(to.priority);
                step.tasks.push(if to.completed { task.complete(now) } else { task });
            }
            project.steps.push(step);
        }
        project
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"
# Bac de français
category: learning
priority: high
target: 2026-06-15
description: Préparer l'oral

## Lectures
- [x] Candide
- [ ] Les Fleurs du mal !high

## [x] Inscription
"#;

    #[test]
    fn parses_metadata_steps_and_tasks() {
        let o = parse_outline(SAMPLE, "UTC").unwrap();
        assert_eq!(o.project.title, "Bac de français");
        assert_eq!(o.project.category, Category::Learning);
        assert_eq!(o.project.priority, Priority::High);
        assert_eq!(o.project.description, "Préparer l'oral");
        assert_eq!(o.project.target_date, Utc.with_ymd_and_hms(2026, 6, 15, 0, 0, 0).unwrap());

        assert_eq!(o.steps.len(), 2);
        assert_eq!(o.steps[0].tasks.len(), 2);
        assert!(o.steps[0].tasks[0].completed);
        assert_eq!(o.steps[0].tasks[1].title, "Les Fleurs du mal");
        assert_eq!(o.steps[0].tasks[1].priority, Priority::High);
        assert!(o.steps[1].completed);
        assert!(o.steps[1].tasks.is_empty());
    }

    #[test]
    fn into_project_assigns_nested_ids_and_stamps() {
        let now = Utc.timestamp_millis_opt(1_770_000_000_000).unwrap();
        let p = parse_outline(SAMPLE, "UTC").unwrap().into_project(now);
        assert_eq!(p.id, "project-1770000000000");
        assert_eq!(p.steps[0].id, "project-1770000000000-s1");
        assert_eq!(p.steps[0].tasks[1].id, "project-1770000000000-s1-t2");
        assert_eq!(p.steps[0].tasks[1].step_id, p.steps[0].id);
        assert_eq!(p.steps[0].tasks[0].completed_at, Some(now));
        assert_eq!(p.steps[1].completed_at, Some(now));
        assert_eq!(p.steps[1].project.project_title, "Bac de français");
    }

    #[test]
    fn rejects_task_before_step() {
        let err = parse_outline("# X\ntarget: 2026-01-01\n- [ ] stray\n", "UTC").unwrap_err();
        assert!(err.to_string().contains("before any"));
    }

    #[test]
    fn rejects_missing_target_and_bad_category() {
        assert!(parse_outline("# X\n## a\n", "UTC").is_err());
        assert!(parse_outline("# X\ncategory: sports\ntarget: 2026-01-01\n", "UTC").is_err());
    }

    #[test]
    fn unknown_task_priority_is_an_error() {
        let md = "# X\ntarget: 2026-01-01\n## a\n- [ ] t !urgent\n";
        assert!(parse_outline(md, "UTC").is_err());
    }
}
