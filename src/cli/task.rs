//! todocal task command implementation
//!
//! Also hosts `todocal priority`, which resolves its id against projects
//! first and tasks second.

use serde::Serialize;

use crate::cli::{open_session, view, Globals};
use crate::error::Result;
use crate::model::{CalendarEntry, EntityId, Priority, RepeatType, Task};
use crate::output::{emit_success, HumanOutput};
use crate::store::{DeleteSummary, EntityKind, ProjectBranch};

/// Options for `todocal task new`
pub struct NewOptions {
    pub parent: EntityId,
    pub name: String,
    pub priority: String,
    pub repeat: String,
    pub globals: Globals,
}

/// Options for `todocal task rm`
pub struct RmOptions {
    pub id: EntityId,
    pub yes: bool,
    pub globals: Globals,
}

/// Options for `todocal task rename`
pub struct RenameOptions {
    pub id: EntityId,
    pub name: String,
    pub globals: Globals,
}

/// Options for `todocal task repeat`
pub struct RepeatOptions {
    pub id: EntityId,
    pub repeat: String,
    pub globals: Globals,
}

/// Options for `todocal priority`
pub struct PriorityOptions {
    pub id: EntityId,
    pub priority: String,
    pub globals: Globals,
}

#[derive(Serialize)]
struct TaskListReport<'a> {
    sort_order: String,
    projects: Vec<ProjectBranch<'a>>,
}

#[derive(Serialize)]
struct TaskDoneReport {
    task: Task,
    entry: CalendarEntry,
}

#[derive(Serialize)]
struct TaskRmReport {
    id: EntityId,
    name: String,
    #[serde(flatten)]
    summary: DeleteSummary,
}

#[derive(Serialize)]
struct TaskRenameReport {
    id: EntityId,
    old_name: String,
    new_name: String,
}

#[derive(Serialize)]
struct PriorityReport {
    id: EntityId,
    kind: EntityKind,
    priority: Priority,
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let priority: Priority = options.priority.parse()?;
    let repeat: RepeatType = options.repeat.parse()?;
    let mut session = open_session(options.globals.data_dir.clone())?;
    let task = session
        .store_mut()
        .create_task(options.parent, &options.name, priority, repeat)?;
    session.flush()?;

    let position = session
        .store()
        .project_position(task.project_id)
        .unwrap_or(0);
    let mut human = HumanOutput::new(format!("Task created: {}", task.name));
    human.push_summary("id", task.id.to_string());
    human.push_summary("project", task.project_name.clone());
    human.push_summary("level", task.level.to_string());
    human.push_detail(view::task_line(position, &task, options.globals.color));
    if task.repeat_type.is_repeating() {
        human.push_warning("repeat type is recorded but completions are not rescheduled");
    }

    emit_success(options.globals.output(), "task new", &task, Some(&human))
}

pub fn run_list(globals: Globals) -> Result<()> {
    let session = open_session(globals.data_dir.clone())?;
    let order = session.config().sort_order;
    let store = session.store();

    let report = TaskListReport {
        sort_order: order.to_string(),
        projects: store.list_active_tree_sorted(order),
    };

    let open: usize = store.tasks().iter().filter(|task| task.is_active()).count();
    let header = if report.projects.is_empty() {
        "No projects".to_string()
    } else {
        format!("Open tasks ({open})")
    };
    let mut human = HumanOutput::new(header);
    for line in view::tree_lines(store, order, globals.color) {
        human.push_detail(line);
    }

    emit_success(globals.output(), "task list", &report, Some(&human))
}

pub fn run_done(globals: Globals, id: EntityId) -> Result<()> {
    let mut session = open_session(globals.data_dir.clone())?;
    let (task, entry) = session.store_mut().complete_task(id)?;
    session.flush()?;

    let mut human = HumanOutput::new(format!("Task completed: {}", task.name));
    human.push_summary("date", entry.date.to_string());
    human.push_summary("week", entry.week.to_string());

    emit_success(
        globals.output(),
        "task done",
        &TaskDoneReport { task, entry },
        Some(&human),
    )
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let mut session = open_session(options.globals.data_dir.clone())?;
    let name = session
        .store()
        .task(options.id)
        .map(|task| task.name.clone())
        .unwrap_or_default();
    let summary = session.store_mut().delete_task(options.id, options.yes)?;
    session.flush()?;

    let mut human = HumanOutput::new(format!("Task deleted: {name}"));
    human.push_summary("tasks removed", summary.removed_tasks.to_string());
    human.push_summary("calendar entries removed", summary.removed_entries.to_string());

    emit_success(
        options.globals.output(),
        "task rm",
        &TaskRmReport {
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
        .task(options.id)
        .map(|task| task.name.clone())
        .unwrap_or_default();
    session.store_mut().rename_task(options.id, &options.name)?;
    session.flush()?;

    let new_name = session
        .store()
        .task(options.id)
        .map(|task| task.name.clone())
        .unwrap_or_default();
    let human = HumanOutput::new(format!("Task renamed: {old_name} -> {new_name}"));

    emit_success(
        options.globals.output(),
        "task rename",
        &TaskRenameReport {
            id: options.id,
            old_name,
            new_name,
        },
        Some(&human),
    )
}

pub fn run_repeat(options: RepeatOptions) -> Result<()> {
    let repeat: RepeatType = options.repeat.parse()?;
    let mut session = open_session(options.globals.data_dir.clone())?;
    session.store_mut().set_repeat_type(options.id, repeat)?;
    session.flush()?;

    let human = HumanOutput::new(format!("Repeat set to {repeat} for task {}", options.id));

    #[derive(Serialize)]
    struct RepeatReport {
        id: EntityId,
        repeat_type: RepeatType,
    }

    emit_success(
        options.globals.output(),
        "task repeat",
        &RepeatReport {
            id: options.id,
            repeat_type: repeat,
        },
        Some(&human),
    )
}

pub fn run_priority(options: PriorityOptions) -> Result<()> {
    let priority: Priority = options.priority.parse()?;
    let mut session = open_session(options.globals.data_dir.clone())?;
    let kind = session.store_mut().set_priority(options.id, priority)?;
    session.flush()?;

    let human = HumanOutput::new(format!(
        "Priority set to {priority} for {kind} {}",
        options.id
    ));

    emit_success(
        options.globals.output(),
        "priority",
        &PriorityReport {
            id: options.id,
            kind,
            priority,
        },
        Some(&human),
    )
}
