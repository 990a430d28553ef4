use anyhow::{Context, Result, bail};
use cartable_core::{
    Category, NewProject, NewStep, Portfolio, Priority, parse_outline, parse_target_date,
    write_tasks_csv,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod render;
mod state;
mod store;

#[derive(Parser, Debug)]
#[command(
    name = "cartable",
    version,
    about = "Cartable: projects, steps and tasks with derived progress"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config.toml to the cartable home
    Init,

    /// Project commands
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },

    /// Step commands
    Step {
        #[command(subcommand)]
        command: StepCommand,
    },

    /// Task commands
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Count projects by status
    Stats,

    /// Recompute every project's status against the current time
    Refresh,

    /// Create a project from a markdown outline
    Import {
        /// Outline file (`# title`, `key: value` lines, `## step`, `- [ ] task`)
        path: PathBuf,
    },

    /// Export every task as CSV
    Export {
        #[arg(long)]
        csv: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// Create an empty project
    Create {
        #[arg(long)]
        title: String,
        /// career | learning | health | personal | financial
        #[arg(long)]
        category: String,
        /// Target date: YYYY-MM-DD [HH:MM] in the configured timezone
        #[arg(long)]
        target: String,
        /// low | medium | high (default: medium)
        #[arg(long, default_value = "medium")]
        priority: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// One line per project
    List,

    /// Print a project's steps and tasks
    Show { id: String },
}

#[derive(Subcommand, Debug)]
enum StepCommand {
    /// Append a step to a project
    Add {
        #[arg(long)]
        project: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Due date: YYYY-MM-DD [HH:MM]
        #[arg(long)]
        due: Option<String>,
        #[arg(long, default_value = "medium")]
        priority: String,
    },

    /// Flip a step's completion (steps without tasks only)
    Toggle { id: String },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Append a task to a step
    Add {
        #[arg(long)]
        project: String,
        #[arg(long)]
        step: String,
        #[arg(long)]
        title: String,
    },

    /// Flip a task's completion
    Toggle { id: String },
}

/// Initialize tracing to stderr; RUST_LOG wins over the configured filter.
fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_priority(s: &str) -> Result<Priority> {
    Priority::parse(s).with_context(|| format!("unknown priority `{s}` (low|medium|high)"))
}

fn parse_category(s: &str) -> Result<Category> {
    Category::parse(s).with_context(|| {
        format!("unknown category `{s}` (career|learning|health|personal|financial)")
    })
}

/// True when `step_id` is one of the steps owned by `project_id`.
fn step_in_project(pf: &Portfolio, project_id: &str, step_id: &str) -> bool {
    pf.project(project_id).is_some_and(|p| p.step(step_id).is_some())
}

/// Persist `after` unless the engine handed back the input untouched.
async fn commit(data: &Path, before: &Portfolio, after: &Portfolio) -> Result<bool> {
    if Portfolio::ptr_eq(before, after) {
        println!("Nothing changed (unknown id?)");
        return Ok(false);
    }
    store::save(data, after).await?;
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config()?;
    init_tracing(&cfg.log.filter);

    let home = state::ensure_cartable_home()?;
    let data = cfg.data_path(&home);
    let tz = cfg.general.timezone.as_str();
    tracing::debug!(data = %data.display(), tz, "starting");

    match cli.command {
        Command::Init => {
            config::init_config()?;
        }

        Command::Project { command } => match command {
            ProjectCommand::Create {
                title,
                category,
                target,
                priority,
                description,
            } => {
                let title = title.trim();
                if title.is_empty() {
                    bail!("--title must not be empty");
                }
                let data_in = NewProject::new(
                    title,
                    parse_category(&category)?,
                    parse_target_date(&target, tz)?,
                )
                .with_priority(parse_priority(&priority)?)
                .with_description(description);

                let before = store::load(&data).await?;
                let after = before.create_project(data_in, Utc::now());
                if commit(&data, &before, &after).await? {
                    if let Some(p) = after.iter().last() {
                        println!("Created {}", render::project_line(p, tz));
                    }
                }
            }
            ProjectCommand::List => {
                let pf = store::load(&data).await?;
                if pf.is_empty() {
                    println!("No projects yet. Run: cartable project create --help");
                }
                for p in pf.iter() {
                    println!("{}", render::project_line(p, tz));
                }
            }
            ProjectCommand::Show { id } => {
                let pf = store::load(&data).await?;
                let Some(p) = pf.project(&id) else {
                    bail!("no project with id {id}");
                };
                print!("{}", render::project_tree(p, tz));
            }
        },

        Command::Step { command } => match command {
            StepCommand::Add {
                project,
                title,
                description,
                due,
                priority,
            } => {
                let step = NewStep {
                    title,
                    description,
                    due_date: due.map(|d| parse_target_date(&d, tz)).transpose()?,
                    priority: parse_priority(&priority)?,
                };
                let before = store::load(&data).await?;
                let after = before.add_step(&project, step, Utc::now());
                if commit(&data, &before, &after).await? {
                    if let Some(p) = after.project(&project) {
                        print!("{}", render::project_tree(p, tz));
                    }
                }
            }
            StepCommand::Toggle { id } => {
                let before = store::load(&data).await?;
                let after = before.toggle_step(&id, Utc::now());
                if commit(&data, &before, &after).await? {
                    if let Some((p, s)) = after.find_step(&id) {
                        if !s.tasks.is_empty() {
                            println!("Step has tasks; its completion follows them.");
                        }
                        println!("{}", render::project_line(p, tz));
                    }
                }
            }
        },

        Command::Task { command } => match command {
            TaskCommand::Add {
                project,
                step,
                title,
            } => {
                let before = store::load(&data).await?;
                if !step_in_project(&before, &project, &step) {
                    tracing::warn!(project_id = %project, step_id = %step, "step not in project");
                    println!("Nothing changed (step {step} is not in project {project})");
                    return Ok(());
                }
                let after = before.add_task(&project, &step, &title, Utc::now());
                if commit(&data, &before, &after).await? {
                    if let Some(p) = after.project(&project) {
                        print!("{}", render::project_tree(p, tz));
                    }
                }
            }
            TaskCommand::Toggle { id } => {
                let before = store::load(&data).await?;
                let after = before.toggle_task(&id, Utc::now());
                if commit(&data, &before, &after).await? {
                    if let Some((p, _, t)) = after.find_task(&id) {
                        let verb = if t.completed { "Completed" } else { "Reopened" };
                        println!("{verb} {}", t.title);
                        println!("{}", render::project_line(p, tz));
                    }
                }
            }
        },

        Command::Stats => {
            let pf = store::load(&data).await?;
            print!("{}", render::stats_block(&pf.stats()));
        }

        Command::Refresh => {
            let before = store::load(&data).await?;
            let after = before.refresh(Utc::now());
            if Portfolio::ptr_eq(&before, &after) {
                println!("All statuses up to date");
            } else {
                store::save(&data, &after).await?;
                print!("{}", render::stats_block(&after.stats()));
            }
        }

        Command::Import { path } => {
            let md = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("read {}", path.display()))?;
            let outline =
                parse_outline(&md, tz).with_context(|| format!("parsing {}", path.display()))?;
            let now = Utc::now();
            let before = store::load(&data).await?;
            let after = before.insert_project(outline.into_project(now), now);
            store::save(&data, &after).await?;
            if let Some(p) = after.iter().last() {
                print!("{}", render::project_tree(p, tz));
            }
        }

        Command::Export { csv } => {
            let pf = store::load(&data).await?;
            let file = std::fs::File::create(&csv)
                .with_context(|| format!("create {}", csv.display()))?;
            let rows = write_tasks_csv(&pf, file)?;
            println!("Wrote {} rows to {}", rows, csv.display());
        }
    }

    Ok(())
}
