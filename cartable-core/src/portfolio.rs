//! Portfolio: an immutable snapshot of the project collection, plus the
//! mutation operations of the progress engine.
//!
//! Every mutation takes `&self` and returns a new `Portfolio`:
//! - on a lookup miss the returned value shares storage with the input
//!   (`Portfolio::ptr_eq` holds), nothing is rebuilt
//! - on a hit exactly one `Arc<Project>` is replaced (and recalculated); all
//!   other entries are the same `Arc`s as before, so callers can find the
//!   changed project with `Arc::ptr_eq`
//!
//! Lookups go through an id index (project/step/task id -> position) instead
//! of scanning the nested graph. The index is rebuilt on load and extended in
//! place by add/create operations; toggles reuse it unchanged.
//!
//! Single-threaded by contract: two mutations issued against the same stale
//! snapshot each produce their own result and the caller decides which wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::progress::recalculate;
use crate::project::{NewProject, Project};
use crate::stats::{ProjectStats, project_stats};
use crate::step::{NewStep, Step};
use crate::task::{Priority, Task};

/// `"<tag>-<unix millis>"`. Monotonic, but two ids minted in the same
/// millisecond collide.
pub fn generate_id(tag: &str, now: DateTime<Utc>) -> String {
    format!("{tag}-{}", now.timestamp_millis())
}

#[derive(Debug, Clone, Default)]
struct IdIndex {
    projects: HashMap<String, usize>,
    steps: HashMap<String, usize>,
    tasks: HashMap<String, usize>,
}

// Duplicate ids resolve to the lowest position, same as a front-to-back scan.
fn insert_min(map: &mut HashMap<String, usize>, id: &str, pos: usize) {
    map.entry(id.to_string())
        .and_modify(|p| *p = (*p).min(pos))
        .or_insert(pos);
}

impl IdIndex {
    fn build(projects: &[Arc<Project>]) -> Self {
        let mut idx = Self::default();
        for (pos, p) in projects.iter().enumerate() {
            idx.add_project(pos, p);
        }
        idx
    }

    fn add_project(&mut self, pos: usize, project: &Project) {
        insert_min(&mut self.projects, &project.id, pos);
        for step in &project.steps {
            self.add_step(pos, step);
        }
    }

    fn add_step(&mut self, pos: usize, step: &Step) {
        insert_min(&mut self.steps, &step.id, pos);
        for task in &step.tasks {
            insert_min(&mut self.tasks, &task.id, pos);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Portfolio {
    projects: Arc<[Arc<Project>]>,
    index: Arc<IdIndex>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Project>> {
        self.projects.iter()
    }

    pub fn get(&self, pos: usize) -> Option<&Arc<Project>> {
        self.projects.get(pos)
    }

    /// True when both snapshots are the very same collection.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.projects, &b.projects)
    }

    pub fn project(&self, project_id: &str) -> Option<&Arc<Project>> {
        let pos = *self.index.projects.get(project_id)?;
        self.projects.get(pos)
    }

    pub fn find_step(&self, step_id: &str) -> Option<(&Project, &Step)> {
        let project = self.projects.get(*self.index.steps.get(step_id)?)?;
        let step = project.steps.iter().find(|s| s.id == step_id)?;
        Some((project.as_ref(), step))
    }

    pub fn find_task(&self, task_id: &str) -> Option<(&Project, &Step, &Task)> {
        let project = self.projects.get(*self.index.tasks.get(task_id)?)?;
        project.steps.iter().find_map(|s| {
            s.tasks
                .iter()
                .find(|t| t.id == task_id)
                .map(|t| (project.as_ref(), s, t))
        })
    }

    pub fn stats(&self) -> ProjectStats {
        project_stats(self.projects.iter().map(|p| p.as_ref()))
    }

    /// Flip the manual completion flag of a step.
    ///
    /// Only sticks for steps without tasks; otherwise recalculation
    /// immediately re-derives it from the tasks.
    pub fn toggle_step(&self, step_id: &str, now: DateTime<Utc>) -> Portfolio {
        let Some(&pos) = self.index.steps.get(step_id) else {
            debug!(step_id, "toggle_step: no matching step");
            return self.clone();
        };
        debug!(step_id, "toggle_step");
        self.replace_at(pos, Arc::clone(&self.index), now, |project| {
            if let Some(step) = project.steps.iter_mut().find(|s| s.id == step_id) {
                step.toggle(now);
            }
        })
    }

    pub fn toggle_task(&self, task_id: &str, now: DateTime<Utc>) -> Portfolio {
        let Some(&pos) = self.index.tasks.get(task_id) else {
            debug!(task_id, "toggle_task: no matching task");
            return self.clone();
        };
        debug!(task_id, "toggle_task");
        self.replace_at(pos, Arc::clone(&self.index), now, |project| {
            if let Some(task) = project
                .steps
                .iter_mut()
                .flat_map(|s| s.tasks.iter_mut())
                .find(|t| t.id == task_id)
            {
                task.toggle(now);
            }
        })
    }

    /// Append a fresh task (medium priority, trimmed title) to a step.
    ///
    /// An unknown project leaves the portfolio untouched. An unknown step under
    /// a known project appends nothing, but the project is still recalculated
    /// and replaced.
    pub fn add_task(
        &self,
        project_id: &str,
        step_id: &str,
        title: &str,
        now: DateTime<Utc>,
    ) -> Portfolio {
        let Some(&pos) = self.index.projects.get(project_id) else {
            debug!(project_id, "add_task: no matching project");
            return self.clone();
        };

        let task = Task::new(generate_id("task", now), step_id, title.trim())
            .with_priority(Priority::Medium);
        let has_step = self.projects[pos].steps.iter().any(|s| s.id == step_id);
        let index = if has_step {
            let mut index = IdIndex::clone(&self.index);
            insert_min(&mut index.tasks, &task.id, pos);
            Arc::new(index)
        } else {
            debug!(project_id, step_id, "add_task: no matching step, nothing appended");
            Arc::clone(&self.index)
        };

        debug!(project_id, step_id, task_id = %task.id, "add_task");
        self.replace_at(pos, index, now, |project| {
            if let Some(step) = project.steps.iter_mut().find(|s| s.id == step_id) {
                step.tasks.push(task);
            }
        })
    }

    pub fn add_step(&self, project_id: &str, data: NewStep, now: DateTime<Utc>) -> Portfolio {
        let Some(&pos) = self.index.projects.get(project_id) else {
            debug!(project_id, "add_step: no matching project");
            return self.clone();
        };

        let step = data.into_step(generate_id("step", now), self.projects[pos].label());
        let mut index = IdIndex::clone(&self.index);
        index.add_step(pos, &step);

        debug!(project_id, step_id = %step.id, "add_step");
        self.replace_at(pos, Arc::new(index), now, |project| {
            project.steps.push(step);
        })
    }

    /// Always appends a new, empty project with progress 0.
    ///
    /// The new project goes through `recalculate` like any other, so its status
    /// is `NotStarted`, or `Overdue` when `target_date` is already before `now`.
    pub fn create_project(&self, data: NewProject, now: DateTime<Utc>) -> Portfolio {
        let project = data.into_project(generate_id("project", now), now);
        self.insert_project(project, now)
    }

    /// Append an already built project graph, recalculating it first.
    pub fn insert_project(&self, project: Project, now: DateTime<Utc>) -> Portfolio {
        let project = recalculate(project, now);
        let pos = self.projects.len();

        let mut index = IdIndex::clone(&self.index);
        index.add_project(pos, &project);

        debug!(project_id = %project.id, steps = project.steps.len(), "insert_project");
        let mut projects = self.projects.to_vec();
        projects.push(Arc::new(project));
        Portfolio {
            projects: projects.into(),
            index: Arc::new(index),
        }
    }

    /// Recalculate every project against `now`.
    ///
    /// Status depends on the clock, so a project can turn overdue without any
    /// edit. Only projects whose derived fields changed are replaced.
    pub fn refresh(&self, now: DateTime<Utc>) -> Portfolio {
        let mut changed = 0usize;
        let projects: Vec<Arc<Project>> = self
            .projects
            .iter()
            .map(|p| {
                let next = recalculate(Project::clone(p), now);
                if next == **p {
                    Arc::clone(p)
                } else {
                    changed += 1;
                    Arc::new(next)
                }
            })
            .collect();

        if changed == 0 {
            return self.clone();
        }
        debug!(changed, "refresh");
        Portfolio {
            projects: projects.into(),
            index: Arc::clone(&self.index),
        }
    }

    fn replace_at(
        &self,
        pos: usize,
        index: Arc<IdIndex>,
        now: DateTime<Utc>,
        edit: impl FnOnce(&mut Project),
    ) -> Portfolio {
        let mut project = Project::clone(&self.projects[pos]);
        edit(&mut project);

        let mut projects = self.projects.to_vec();
        projects[pos] = Arc::new(recalculate(project, now));
        Portfolio {
            projects: projects.into(),
            index,
        }
    }
}

impl From<Vec<Project>> for Portfolio {
    fn from(projects: Vec<Project>) -> Self {
        let projects: Arc<[Arc<Project>]> = projects.into_iter().map(Arc::new).collect();
        let index = Arc::new(IdIndex::build(&projects));
        Self { projects, index }
    }
}

// Persisted as a plain array of projects.
impl Serialize for Portfolio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.projects.iter().map(|p| p.as_ref()))
    }
}

impl<'de> Deserialize<'de> for Portfolio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Project>::deserialize(deserializer).map(Portfolio::from)
    }
}
