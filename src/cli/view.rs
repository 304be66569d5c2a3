//! Plain-text views shared by the menu and the subcommands.

use crate::model::{Project, Task};
use crate::output::paint_priority;
use crate::store::{ProjectBranch, SortOrder, TaskBranch, TodoStore};

const INDENT: &str = "  ";

/// `[position] (id:N)   name  (priority)`
pub fn project_line(position: usize, project: &Project, color: bool) -> String {
    let line = format!(
        "[{position}] (id:{})   {}  ({})",
        project.id, project.name, project.priority
    );
    paint_priority(&line, project.priority, color)
}

/// `[position.task_id] (id:N)   name`, indented by depth.
pub fn task_line(position: usize, task: &Task, color: bool) -> String {
    let indent = INDENT.repeat(task.level as usize);
    let mut line = format!(
        "{indent}[{position}.{}] (id:{})   {}",
        task.task_id, task.id, task.name
    );
    if task.repeat_type.is_repeating() {
        line.push_str(&format!("  ({})", task.repeat_type));
    }
    paint_priority(&line, task.priority, color)
}

pub fn project_lines(store: &TodoStore, color: bool) -> Vec<String> {
    store
        .projects()
        .iter()
        .enumerate()
        .map(|(index, project)| project_line(index + 1, project, color))
        .collect()
}

/// Active forest flattened depth-first.
pub fn tree_lines(store: &TodoStore, order: SortOrder, color: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for branch in store.list_active_tree_sorted(order) {
        push_project(&mut lines, &branch, color);
    }
    lines
}

fn push_project(lines: &mut Vec<String>, branch: &ProjectBranch<'_>, color: bool) {
    lines.push(project_line(branch.position, branch.project, color));
    for task in &branch.tasks {
        push_task(lines, branch.position, task, color);
    }
}

fn push_task(lines: &mut Vec<String>, position: usize, branch: &TaskBranch<'_>, color: bool) {
    lines.push(task_line(position, branch.task, color));
    for child in &branch.children {
        push_task(lines, position, child, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, RepeatType};
    use crate::store::Clock;
    use chrono::NaiveDate;

    fn store() -> TodoStore {
        let mut store = TodoStore::new(Clock::Fixed(NaiveDate::from_ymd_opt(2024, 6, 4).unwrap()));
        let p = store.create_project("Launch", Priority::High).unwrap();
        let a = store
            .create_task(p.id, "Design", Priority::Low, RepeatType::None)
            .unwrap();
        store
            .create_task(a.id, "Mockups", Priority::Medium, RepeatType::Weekly)
            .unwrap();
        store
            .create_task(p.id, "Ship", Priority::High, RepeatType::None)
            .unwrap();
        store
    }

    #[test]
    fn tree_lines_indent_by_level() {
        let lines = tree_lines(&store(), SortOrder::Insertion, false);
        assert_eq!(
            lines,
            vec![
                "[1] (id:1)   Launch  (high)",
                "  [1.1] (id:2)   Design",
                "    [1.1] (id:3)   Mockups  (weekly)",
                "  [1.2] (id:4)   Ship",
            ]
        );
    }

    #[test]
    fn priority_order_moves_high_siblings_first() {
        let lines = tree_lines(&store(), SortOrder::Priority, false);
        assert_eq!(lines[1], "  [1.2] (id:4)   Ship");
        assert_eq!(lines[2], "  [1.1] (id:2)   Design");
    }

    #[test]
    fn project_lines_are_numbered() {
        assert_eq!(
            project_lines(&store(), false),
            vec!["[1] (id:1)   Launch  (high)"]
        );
    }
}
