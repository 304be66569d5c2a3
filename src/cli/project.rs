//! todocal project command implementation

use serde::Serialize;

use crate::cli::{open_session, view, Globals};
use crate::error::Result;
use crate::model::{EntityId, Priority, Project};
use crate::output::{emit_success, HumanOutput};
use crate::store::DeleteSummary;

/// Options for `todocal project new`
pub struct NewOptions {
    pub name: String,
    pub priority: String,
    pub globals: Globals,
}

/// Options for `todocal project rm`
pub struct RmOptions {
    pub id: EntityId,
    pub yes: bool,
    pub globals: Globals,
}

/// Options for `todocal project rename`
pub struct RenameOptions {
    pub id: EntityId,
    pub name: String,
    pub globals: Globals,
}

#[derive(Serialize)]
struct ProjectReport {
    position: usize,
    project: Project,
}

#[derive(Serialize)]
struct ProjectListReport<'a> {
    projects: Vec<ProjectReportRef<'a>>,
}

#[derive(Serialize)]
struct ProjectReportRef<'a> {
    position: usize,
    #[serde(flatten)]
    project: &'a Project,
}

#[derive(Serialize)]
struct ProjectRmReport {
    id: EntityId,
    name: String,
    #[serde(flatten)]
    summary: DeleteSummary,
}

#[derive(Serialize)]
struct ProjectRenameReport {
    id: EntityId,
    old_name: String,
    new_name: String,
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let priority: Priority = options.priority.parse()?;
    let mut session = open_session(options.globals.data_dir.clone())?;
    let project = session.store_mut().create_project(&options.name, priority)?;
    session.flush()?;

    let position = session.store().project_position(project.id).unwrap_or(0);
    let mut human = HumanOutput::new(format!("Project created: {}", project.name));
    human.push_summary("id", project.id.to_string());
    human.push_summary("number", position.to_string());
    human.push_summary("priority", project.priority.to_string());

    emit_success(
        options.globals.output(),
        "project new",
        &ProjectReport { position, project },
        Some(&human),
    )
}

pub fn run_list(globals: Globals) -> Result<()> {
    let session = open_session(globals.data_dir.clone())?;
    let store = session.store();

    let report = ProjectListReport {
        projects: store
            .projects()
            .iter()
            .enumerate()
            .map(|(index, project)| ProjectReportRef {
                position: index + 1,
                project,
            })
            .collect(),
    };

    let header = if report.projects.is_empty() {
        "No projects".to_string()
    } else {
        format!("Projects ({})", report.projects.len())
    };
    let mut human = HumanOutput::new(header);
    for line in view::project_lines(store, globals.color) {
        human.push_detail(line);
    }

    emit_success(globals.output(), "project list", &report, Some(&human))
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let mut session = open_session(options.globals.data_dir.clone())?;
    let name = session
        .store()
        .project(options.id)
        .map(|project| project.name.clone());
    let summary = session
        .store_mut()
        .delete_project(options.id, options.yes)?;
    session.flush()?;

    let name = name.unwrap_or_default();
    let mut human = HumanOutput::new(format!("Project deleted: {name}"));
    human.push_summary("tasks removed", summary.removed_tasks.to_string());
    human.push_summary("calendar entries removed", summary.removed_entries.to_string());

    emit_success(
        options.globals.output(),
        "project rm",
        &ProjectRmReport {
            id: options.id,
            name,
            summary,
        },
        Some(&human),
    )
}

pub fn run_rename(options: RenameOptions) -> Result<()> {
    let mut session = open_session(options.globals.data_dir.clone())?;
    let old_name = session
        .store()
        .project(options.id)
        .map(|project| project.name.clone())
        .unwrap_or_default();
    session
        .store_mut()
        .rename_project(options.id, &options.name)?;
    session.flush()?;

    let new_name = session
        .store()
        .project(options.id)
        .map(|project| project.name.clone())
        .unwrap_or_default();
    let human = HumanOutput::new(format!("Project renamed: {old_name} -> {new_name}"));

    emit_success(
        options.globals.output(),
        "project rename",
        &ProjectRenameReport {
            id: options.id,
            old_name,
            new_name,
        },
        Some(&human),
    )
}
