//! cartable-core: project / step / task progress engine for the Cartable planner

pub mod export;
pub mod outline;
pub mod portfolio;
pub mod progress;
pub mod project;
pub mod stats;
pub mod step;
pub mod task;
pub mod time;

pub use export::write_tasks_csv;
pub use outline::{ProjectOutline, StepOutline, TaskOutline, parse_outline};
pub use portfolio::{Portfolio, generate_id};
pub use progress::{
    project_progress, project_status, recalculate, step_progress, sync_step_completion,
};
pub use project::{Category, NewProject, Project, ProjectStatus};
pub use stats::{ProjectStats, project_stats};
pub use step::{NewStep, ProjectLabel, Step};
pub use task::{Priority, Task};
pub use time::{format_local_date, parse_target_date};
