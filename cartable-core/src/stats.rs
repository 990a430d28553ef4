//! Aggregate status counts over a project collection.

use serde::{Deserialize, Serialize};

use crate::project::{Project, ProjectStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub overdue: usize,
    pub not_started: usize,
}

/// Single pass over the stored `status` of each project.
pub fn project_stats<'a>(projects: impl IntoIterator<Item = &'a Project>) -> ProjectStats {
    projects
        .into_iter()
        .fold(ProjectStats::default(), |mut acc, p| {
            acc.total += 1;
            match p.status {
                ProjectStatus::Completed => acc.completed += 1,
                ProjectStatus::InProgress => acc.in_progress += 1,
                ProjectStatus::Overdue => acc.overdue += 1,
                ProjectStatus::NotStarted => acc.not_started += 1,
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{Category, NewProject};
    use chrono::{TimeZone, Utc};

    fn with_status(id: &str, status: ProjectStatus) -> Project {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut p = NewProject::new(id, Category::Personal, at).into_project(id, at);
        p.status = status;
        p
    }

    #[test]
    fn tallies_each_status() {
        let projects = vec![
            with_status("a", ProjectStatus::Completed),
            with_status("b", ProjectStatus::InProgress),
            with_status("c", ProjectStatus::InProgress),
            with_status("d", ProjectStatus::Overdue),
            with_status("e", ProjectStatus::NotStarted),
        ];
        let stats = project_stats(&projects);
        assert_eq!(
            stats,
            ProjectStats {
                total: 5,
                completed: 1,
                in_progress: 2,
                overdue: 1,
                not_started: 1,
            }
        );
    }

    #[test]
    fn empty_collection_is_all_zero() {
        assert_eq!(project_stats(&Vec::<Project>::new()), ProjectStats::default());
    }
}
