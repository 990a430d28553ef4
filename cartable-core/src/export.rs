//! CSV export: one row per task, flattened with its step and project.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::portfolio::Portfolio;
use crate::project::ProjectStatus;
use crate::task::Priority;

#[derive(Debug, Serialize)]
struct TaskRow<'a> {
    project_id: &'a str,
    project_title: &'a str,
    project_status: ProjectStatus,
    project_progress: u8,
    step_id: &'a str,
    step_title: &'a str,
    step_progress: u8,
    task_id: Option<&'a str>,
    task_title: Option<&'a str>,
    priority: Option<Priority>,
    completed: Option<bool>,
    completed_at: Option<DateTime<Utc>>,
    due_date: Option<DateTime<Utc>>,
}

/// Write every task as a CSV row. Steps without tasks get one row with the
/// task columns left empty. Returns the number of data rows written.
pub fn write_tasks_csv<W: Write>(portfolio: &Portfolio, writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut rows = 0usize;

    for project in portfolio.iter() {
        for step in &project.steps {
            let base = TaskRow {
                project_id: &project.id,
                project_title: &project.title,
                project_status: project.status,
                project_progress: project.progress,
                step_id: &step.id,
                step_title: &step.title,
                step_progress: step.progress,
                task_id: None,
                task_title: None,
                priority: None,
                completed: None,
                completed_at: None,
                due_date: None,
            };

            if step.tasks.is_empty() {
                wtr.serialize(&base).context("write csv row")?;
                rows += 1;
                continue;
            }

            for task in &step.tasks {
                let row = TaskRow {
                    task_id: Some(&task.id),
                    task_title: Some(&task.title),
                    priority: Some(task.priority),
                    completed: Some(task.completed),
                    completed_at: task.completed_at,
                    due_date: task.due_date,
                    ..base
                };
                wtr.serialize(&row).context("write csv row")?;
                rows += 1;
            }
        }
    }

    wtr.flush().context("flush csv")?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{Category, NewProject};
    use crate::step::NewStep;
    use chrono::{Duration, TimeZone};

    #[test]
    fn writes_header_task_rows_and_empty_steps() {
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 0).unwrap();
        let pf = Portfolio::new().create_project(
            NewProject::new("Stage", Category::Career, now + Duration::days(10)),
            now,
        );
        let pid = pf.get(0).unwrap().id.clone();
        let pf = pf
            .add_step(&pid, NewStep::new("CV"), now + Duration::milliseconds(1))
            .add_step(&pid, NewStep::new("Lettres"), now + Duration::milliseconds(2));
        let sid = pf.get(0).unwrap().steps[0].id.clone();
        let pf = pf.add_task(&pid, &sid, "Relire", now + Duration::milliseconds(3));

        let mut buf = Vec::new();
        let rows = write_tasks_csv(&pf, &mut buf).unwrap();
        assert_eq!(rows, 2);

        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("project_id,project_title,project_status"));
        assert!(lines[1].contains("Relire"));
        assert!(lines[1].contains("not-started"));
        assert!(lines[2].contains("Lettres"));
        assert!(lines[2].ends_with(",,,,,"));
    }
}
