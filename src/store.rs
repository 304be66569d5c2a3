//! In-memory project/task hierarchy.
//!
//! Projects and tasks live in flat vectors in creation order. Tree shape is
//! recovered by filtering on `parent_id` / `project_id`; nothing holds pointers
//! between records.
//!
//! # Invariants
//! - Ids are unique across projects and tasks and only ever grow.
//! - A level-1 task has no `parent_id`; any other task sits one level below
//!   its parent.
//! - `Task::project_name` always equals the owning project's name.
//! - Completed tasks never become parents and are hidden from active listings.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::CalendarLog;
use crate::error::{Error, Result};
use crate::ids::next_id;
use crate::model::{
    normalize_name, CalendarEntry, EntityId, Priority, Project, RepeatType, Task,
};

/// Source of "today" for created and completed dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(self) -> NaiveDate {
        match self {
            Clock::System => Local::now().date_naive(),
            Clock::Fixed(date) => date,
        }
    }
}

/// Sibling ordering for active task listings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most urgent first, creation order within a priority.
    #[default]
    Priority,
    /// Creation order.
    Insertion,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Priority => "priority",
            SortOrder::Insertion => "insertion",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "priority" => Ok(SortOrder::Priority),
            "insertion" => Ok(SortOrder::Insertion),
            other => Err(Error::Validation(format!(
                "invalid sort order '{other}' (expected priority|insertion)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Project => f.write_str("project"),
            EntityKind::Task => f.write_str("task"),
        }
    }
}

/// Whole-state image used at the load/save boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub calendar: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct DeleteSummary {
    pub removed_tasks: usize,
    pub removed_entries: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectBranch<'a> {
    /// 1-based position of the project in the collection.
    pub position: usize,
    pub project: &'a Project,
    pub tasks: Vec<TaskBranch<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskBranch<'a> {
    pub task: &'a Task,
    pub children: Vec<TaskBranch<'a>>,
}

#[derive(Debug, Clone, Default)]
pub struct TodoStore {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    calendar: CalendarLog,
    clock: Clock,
}

impl TodoStore {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }

    pub fn from_snapshot(snapshot: Snapshot, clock: Clock) -> Self {
        let mut store = Self::new(clock);
        store.replace(snapshot);
        store
    }

    /// Replace the whole state, e.g. after loading from disk.
    pub fn replace(&mut self, snapshot: Snapshot) {
        debug!(
            projects = snapshot.projects.len(),
            tasks = snapshot.tasks.len(),
            entries = snapshot.calendar.len(),
            "replacing store state"
        );
        self.projects = snapshot.projects;
        self.tasks = snapshot.tasks;
        self.calendar = CalendarLog::new(snapshot.calendar);
    }

    /// Copy of the whole state for saving.
    pub fn export(&self) -> Snapshot {
        Snapshot {
            projects: self.projects.clone(),
            tasks: self.tasks.clone(),
            calendar: self.calendar.entries().to_vec(),
        }
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn calendar(&self) -> &CalendarLog {
        &self.calendar
    }

    pub fn project(&self, id: EntityId) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub fn task(&self, id: EntityId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn project_position(&self, id: EntityId) -> Option<usize> {
        self.projects
            .iter()
            .position(|project| project.id == id)
            .map(|index| index + 1)
    }

    pub fn next_id(&self) -> EntityId {
        next_id(&self.projects, &self.tasks)
    }

    // =========================================================================
    // Creation
    // =========================================================================

    pub fn create_project(&mut self, name: &str, priority: Priority) -> Result<Project> {
        let name = normalize_name(name, "project")?;
        let project = Project {
            id: self.next_id(),
            name,
            priority,
            created_date: self.clock.today(),
        };
        debug!(id = project.id, name = %project.name, "project created");
        self.projects.push(project.clone());
        Ok(project)
    }

    /// Create a task under a project or an incomplete task.
    pub fn create_task(
        &mut self,
        parent_id: EntityId,
        name: &str,
        priority: Priority,
        repeat_type: RepeatType,
    ) -> Result<Task> {
        let (project, parent_task) = self.resolve_parent(parent_id)?;
        let name = normalize_name(name, "task")?;

        let (level, parent) = match parent_task {
            Some(parent) => (parent.level + 1, Some(parent.id)),
            None => (1, None),
        };
        let task_id = self.next_sibling_seq(project.id, parent);

        let task = Task {
            id: self.next_id(),
            project_id: project.id,
            project_name: project.name.clone(),
            task_id,
            name,
            level,
            priority,
            repeat_type,
            created_date: self.clock.today(),
            completed_date: None,
            parent_id: parent,
        };
        debug!(
            id = task.id,
            project_id = task.project_id,
            parent_id = ?task.parent_id,
            level = task.level,
            "task created"
        );
        self.tasks.push(task.clone());
        Ok(task)
    }

    fn resolve_parent(&self, parent_id: EntityId) -> Result<(&Project, Option<&Task>)> {
        if let Some(project) = self.project(parent_id) {
            return Ok((project, None));
        }
        let parent = self
            .tasks
            .iter()
            .find(|task| task.id == parent_id && task.is_active())
            .ok_or_else(|| {
                Error::NotFound(format!("no project or open task with id {parent_id}"))
            })?;
        let project = self.project(parent.project_id).ok_or_else(|| {
            Error::NotFound(format!(
                "project {} of task {} does not exist",
                parent.project_id, parent.id
            ))
        })?;
        Ok((project, Some(parent)))
    }

    fn next_sibling_seq(&self, project_id: EntityId, parent_id: Option<EntityId>) -> u32 {
        self.tasks
            .iter()
            .filter(|task| match parent_id {
                Some(parent) => task.parent_id == Some(parent),
                None => task.project_id == project_id && task.parent_id.is_none(),
            })
            .map(|task| task.task_id)
            .max()
            .unwrap_or(0)
            + 1
    }

    // =========================================================================
    // Completion
    // =========================================================================

    pub fn complete_task(&mut self, id: EntityId) -> Result<(Task, CalendarEntry)> {
        let today = self.clock.today();
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id && task.is_active())
            .ok_or_else(|| Error::NotFound(format!("no open task with id {id}")))?;
        task.completed_date = Some(today);
        let task = task.clone();
        let entry = self
            .calendar
            .record_completion(today, &task.name, &task.project_name);
        debug!(id, date = %today, week = %entry.week, "task completed");
        Ok((task, entry))
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Delete a project with all of its tasks.
    ///
    /// Returns [`Error::ConfirmationRequired`] without touching anything when the
    /// project owns tasks and `cascade_confirmed` is false.
    pub fn delete_project(
        &mut self,
        id: EntityId,
        cascade_confirmed: bool,
    ) -> Result<DeleteSummary> {
        let project = self
            .project(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("no project with id {id}")))?;
        let owned = self.tasks.iter().filter(|task| task.project_id == id).count();
        if owned > 0 && !cascade_confirmed {
            return Err(Error::ConfirmationRequired {
                target: format!("project '{}'", project.name),
                count: owned,
            });
        }

        self.tasks.retain(|task| task.project_id != id);
        let removed_entries = self.calendar.purge_project(&project.name);
        self.projects.retain(|candidate| candidate.id != id);
        debug!(id, removed_tasks = owned, removed_entries, "project deleted");
        Ok(DeleteSummary {
            removed_tasks: owned,
            removed_entries,
        })
    }

    /// Delete a task and its whole subtree.
    ///
    /// Returns [`Error::ConfirmationRequired`] carrying the descendant count when
    /// the task has children and `cascade_confirmed` is false.
    pub fn delete_task(&mut self, id: EntityId, cascade_confirmed: bool) -> Result<DeleteSummary> {
        let task = self
            .task(id)
            .ok_or_else(|| Error::NotFound(format!("no task with id {id}")))?;
        let mut doomed = self.descendants_post_order(id);
        if !doomed.is_empty() && !cascade_confirmed {
            return Err(Error::ConfirmationRequired {
                target: format!("task '{}'", task.name),
                count: doomed.len(),
            });
        }
        doomed.push(id);

        let mut summary = DeleteSummary::default();
        for doomed_id in doomed {
            let Some(index) = self.tasks.iter().position(|task| task.id == doomed_id) else {
                continue;
            };
            let removed = self.tasks.remove(index);
            summary.removed_tasks += 1;
            summary.removed_entries += self.calendar.purge_task(&removed.name);
        }
        debug!(
            id,
            removed_tasks = summary.removed_tasks,
            removed_entries = summary.removed_entries,
            "task deleted"
        );
        Ok(summary)
    }

    /// All descendants of `id`, deepest first, excluding `id` itself.
    fn descendants_post_order(&self, id: EntityId) -> Vec<EntityId> {
        let mut order = Vec::new();
        let mut visited = HashSet::from([id]);
        self.collect_descendants(id, &mut visited, &mut order);
        order
    }

    fn collect_descendants(
        &self,
        id: EntityId,
        visited: &mut HashSet<EntityId>,
        order: &mut Vec<EntityId>,
    ) {
        let children: Vec<EntityId> = self
            .tasks
            .iter()
            .filter(|task| task.parent_id == Some(id))
            .map(|task| task.id)
            .collect();
        for child in children {
            // Hand-edited files can contain parent cycles.
            if !visited.insert(child) {
                continue;
            }
            self.collect_descendants(child, visited, order);
            order.push(child);
        }
    }

    // =========================================================================
    // Edits
    // =========================================================================

    pub fn rename_project(&mut self, id: EntityId, new_name: &str) -> Result<()> {
        let new_name = normalize_name(new_name, "project")?;
        let project = self
            .projects
            .iter_mut()
            .find(|project| project.id == id)
            .ok_or_else(|| Error::NotFound(format!("no project with id {id}")))?;
        let old_name = std::mem::replace(&mut project.name, new_name.clone());

        for task in self.tasks.iter_mut().filter(|task| task.project_id == id) {
            task.project_name = new_name.clone();
        }
        let entries = self.calendar.rename_project(&old_name, &new_name);
        debug!(id, old = %old_name, new = %new_name, entries, "project renamed");
        Ok(())
    }

    pub fn rename_task(&mut self, id: EntityId, new_name: &str) -> Result<()> {
        let new_name = normalize_name(new_name, "task")?;
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| Error::NotFound(format!("no task with id {id}")))?;
        let old_name = std::mem::replace(&mut task.name, new_name.clone());
        let entries = self.calendar.rename_task(&old_name, &new_name);
        debug!(id, old = %old_name, new = %new_name, entries, "task renamed");
        Ok(())
    }

    /// Rename whichever entity owns `id`, projects first.
    pub fn rename(&mut self, id: EntityId, new_name: &str) -> Result<EntityKind> {
        if self.project(id).is_some() {
            self.rename_project(id, new_name)?;
            Ok(EntityKind::Project)
        } else if self.task(id).is_some() {
            self.rename_task(id, new_name)?;
            Ok(EntityKind::Task)
        } else {
            Err(Error::NotFound(format!("no project or task with id {id}")))
        }
    }

    /// Set the priority of a project or task (completed tasks included).
    pub fn set_priority(&mut self, id: EntityId, priority: Priority) -> Result<EntityKind> {
        if let Some(project) = self.projects.iter_mut().find(|project| project.id == id) {
            project.priority = priority;
            debug!(id, %priority, "project priority changed");
            return Ok(EntityKind::Project);
        }
        if let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) {
            task.priority = priority;
            debug!(id, %priority, "task priority changed");
            return Ok(EntityKind::Task);
        }
        Err(Error::NotFound(format!("no project or task with id {id}")))
    }

    pub fn set_repeat_type(&mut self, id: EntityId, repeat_type: RepeatType) -> Result<()> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| Error::NotFound(format!("no task with id {id}")))?;
        task.repeat_type = repeat_type;
        debug!(id, %repeat_type, "task repeat changed");
        Ok(())
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Active forest in collection order.
    pub fn list_active_tree(&self) -> Vec<ProjectBranch<'_>> {
        self.list_active_tree_sorted(SortOrder::Insertion)
    }

    /// Active forest with siblings ordered by `order` at every level.
    pub fn list_active_tree_sorted(&self, order: SortOrder) -> Vec<ProjectBranch<'_>> {
        self.projects
            .iter()
            .enumerate()
            .map(|(index, project)| {
                let roots = self
                    .tasks
                    .iter()
                    .filter(|task| {
                        task.project_id == project.id
                            && task.parent_id.is_none()
                            && task.is_active()
                    })
                    .collect();
                ProjectBranch {
                    position: index + 1,
                    project,
                    tasks: self.branches(roots, order),
                }
            })
            .collect()
    }

    fn branches<'a>(&'a self, mut tasks: Vec<&'a Task>, order: SortOrder) -> Vec<TaskBranch<'a>> {
        if order == SortOrder::Priority {
            tasks.sort_by_key(|task| task.priority.rank());
        }
        tasks
            .into_iter()
            .map(|task| {
                let children = self
                    .tasks
                    .iter()
                    .filter(|child| child.parent_id == Some(task.id) && child.is_active())
                    .collect();
                TaskBranch {
                    task,
                    children: self.branches(children, order),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::build_month_report;

    fn day() -> NaiveDate {
        // A Tuesday.
        NaiveDate::from_ymd_opt(2024, 6, 4).unwrap()
    }

    fn store() -> TodoStore {
        TodoStore::new(Clock::Fixed(day()))
    }

    fn flatten<'a>(branches: &'a [TaskBranch<'a>], out: &mut Vec<&'a str>) {
        for branch in branches {
            out.push(branch.task.name.as_str());
            flatten(&branch.children, out);
        }
    }

    #[test]
    fn ids_are_shared_between_projects_and_tasks() {
        let mut store = store();
        let project = store.create_project("Launch", Priority::High).unwrap();
        let task = store
            .create_task(project.id, "Design", Priority::Medium, RepeatType::None)
            .unwrap();
        let other = store.create_project("Other", Priority::Low).unwrap();
        assert_eq!((project.id, task.id, other.id), (1, 2, 3));
        assert_eq!(store.next_id(), 4);
        assert_eq!(project.created_date, day());
    }

    #[test]
    fn task_levels_follow_parents() {
        let mut store = store();
        let project = store.create_project("P", Priority::Medium).unwrap();
        let root = store
            .create_task(project.id, "root", Priority::Medium, RepeatType::None)
            .unwrap();
        let child = store
            .create_task(root.id, "child", Priority::Medium, RepeatType::Daily)
            .unwrap();
        let grandchild = store
            .create_task(child.id, "grandchild", Priority::Low, RepeatType::None)
            .unwrap();

        assert_eq!((root.level, root.parent_id), (1, None));
        assert_eq!((child.level, child.parent_id), (2, Some(root.id)));
        assert_eq!((grandchild.level, grandchild.parent_id), (3, Some(child.id)));
        assert_eq!(grandchild.project_id, project.id);
        assert_eq!(grandchild.project_name, "P");
        assert_eq!(child.repeat_type, RepeatType::Daily);
    }

    #[test]
    fn completed_task_cannot_be_a_parent() {
        let mut store = store();
        let project = store.create_project("P", Priority::Medium).unwrap();
        let task = store
            .create_task(project.id, "t", Priority::Medium, RepeatType::None)
            .unwrap();
        store
            .create_task(task.id, "ok", Priority::Medium, RepeatType::None)
            .unwrap();
        store.complete_task(task.id).unwrap();
        let err = store
            .create_task(task.id, "late", Priority::Medium, RepeatType::None)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(matches!(
            store.create_task(999, "x", Priority::Medium, RepeatType::None),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut store = store();
        assert!(matches!(
            store.create_project("", Priority::High),
            Err(Error::Validation(_))
        ));
        let project = store.create_project("P", Priority::High).unwrap();
        assert!(matches!(
            store.create_task(project.id, "  ", Priority::High, RepeatType::None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.rename_project(project.id, ""),
            Err(Error::Validation(_))
        ));
        assert_eq!(store.tasks().len(), 0);
    }

    #[test]
    fn sibling_sequence_is_not_reused_after_delete() {
        let mut store = store();
        let project = store.create_project("P", Priority::Medium).unwrap();
        let ids: Vec<EntityId> = ["a", "b", "c"]
            .iter()
            .map(|name| {
                store
                    .create_task(project.id, name, Priority::Medium, RepeatType::None)
                    .unwrap()
                    .id
            })
            .collect();
        let seqs: Vec<u32> = store.tasks().iter().map(|task| task.task_id).collect();
        assert_eq!(seqs, vec![1, 2, 3]);

        store.delete_task(ids[1], false).unwrap();
        let next = store
            .create_task(project.id, "d", Priority::Medium, RepeatType::None)
            .unwrap();
        assert_eq!(next.task_id, 4);
    }

    #[test]
    fn sibling_sequence_is_scoped_per_parent() {
        let mut store = store();
        let p1 = store.create_project("P1", Priority::Medium).unwrap();
        let p2 = store.create_project("P2", Priority::Medium).unwrap();
        let a = store
            .create_task(p1.id, "a", Priority::Medium, RepeatType::None)
            .unwrap();
        let b = store
            .create_task(p2.id, "b", Priority::Medium, RepeatType::None)
            .unwrap();
        let a1 = store
            .create_task(a.id, "a1", Priority::Medium, RepeatType::None)
            .unwrap();
        let a2 = store
            .create_task(a.id, "a2", Priority::Medium, RepeatType::None)
            .unwrap();
        assert_eq!(a.task_id, 1);
        assert_eq!(b.task_id, 1);
        assert_eq!((a1.task_id, a2.task_id), (1, 2));
    }

    #[test]
    fn completing_twice_fails_and_records_once() {
        let mut store = store();
        let project = store.create_project("Launch", Priority::High).unwrap();
        let task = store
            .create_task(project.id, "Design", Priority::Medium, RepeatType::None)
            .unwrap();
        let (done, entry) = store.complete_task(task.id).unwrap();
        assert_eq!(done.completed_date, Some(day()));
        assert_eq!(entry.completed_task, "Design");
        assert_eq!(entry.project_name, "Launch");
        assert!(matches!(store.complete_task(task.id), Err(Error::NotFound(_))));
        assert_eq!(store.calendar().len(), 1);
    }

    #[test]
    fn project_rename_propagates_to_tasks_and_calendar() {
        let mut store = store();
        let project = store.create_project("Launch", Priority::High).unwrap();
        let root = store
            .create_task(project.id, "Design", Priority::Medium, RepeatType::None)
            .unwrap();
        let child = store
            .create_task(root.id, "Sketch", Priority::Medium, RepeatType::None)
            .unwrap();
        store.complete_task(child.id).unwrap();

        store.rename_project(project.id, "Liftoff").unwrap();
        assert!(store.tasks().iter().all(|task| task.project_name == "Liftoff"));
        assert_eq!(store.calendar().entries()[0].project_name, "Liftoff");
    }

    #[test]
    fn task_rename_propagates_to_calendar() {
        let mut store = store();
        let project = store.create_project("Launch", Priority::High).unwrap();
        let task = store
            .create_task(project.id, "Design", Priority::Medium, RepeatType::None)
            .unwrap();
        store.complete_task(task.id).unwrap();
        assert_eq!(store.rename(task.id, "Mockups").unwrap(), EntityKind::Task);
        assert_eq!(store.task(task.id).unwrap().name, "Mockups");
        assert_eq!(store.calendar().entries()[0].completed_task, "Mockups");
        assert!(matches!(store.rename(77, "x"), Err(Error::NotFound(_))));
    }

    #[test]
    fn delete_task_requires_confirmation_for_subtree() {
        let mut store = store();
        let project = store.create_project("P", Priority::Medium).unwrap();
        let root = store
            .create_task(project.id, "root", Priority::Medium, RepeatType::None)
            .unwrap();
        let child = store
            .create_task(root.id, "child", Priority::Medium, RepeatType::None)
            .unwrap();
        let grandchild = store
            .create_task(child.id, "grandchild", Priority::Medium, RepeatType::None)
            .unwrap();
        let sibling = store
            .create_task(root.id, "sibling", Priority::Medium, RepeatType::None)
            .unwrap();
        store.complete_task(grandchild.id).unwrap();

        let before = store.export();
        let err = store.delete_task(root.id, false).unwrap_err();
        assert_eq!(err.confirmation_count(), Some(3));
        assert_eq!(store.export(), before);

        let summary = store.delete_task(root.id, true).unwrap();
        assert_eq!(summary.removed_tasks, 4);
        assert_eq!(summary.removed_entries, 1);
        for id in [root.id, child.id, grandchild.id, sibling.id] {
            assert!(store.task(id).is_none());
        }
        assert!(store.calendar().is_empty());
    }

    #[test]
    fn delete_leaf_task_purges_its_history() {
        let mut store = store();
        let project = store.create_project("P", Priority::Medium).unwrap();
        let task = store
            .create_task(project.id, "leaf", Priority::Medium, RepeatType::None)
            .unwrap();
        store.complete_task(task.id).unwrap();
        let summary = store.delete_task(task.id, false).unwrap();
        assert_eq!(summary.removed_tasks, 1);
        assert!(store.calendar().is_empty());
        assert!(matches!(store.delete_task(task.id, true), Err(Error::NotFound(_))));
    }

    #[test]
    fn delete_project_cascades_after_confirmation() {
        let mut store = store();
        let project = store.create_project("Launch", Priority::High).unwrap();
        let keep = store.create_project("Keep", Priority::High).unwrap();
        let task = store
            .create_task(project.id, "Design", Priority::Medium, RepeatType::None)
            .unwrap();
        store
            .create_task(task.id, "Sketch", Priority::Medium, RepeatType::None)
            .unwrap();
        let kept = store
            .create_task(keep.id, "Stay", Priority::Medium, RepeatType::None)
            .unwrap();
        store.complete_task(task.id).unwrap();
        store.complete_task(kept.id).unwrap();

        let err = store.delete_project(project.id, false).unwrap_err();
        assert_eq!(err.confirmation_count(), Some(2));
        assert_eq!(store.projects().len(), 2);

        let summary = store.delete_project(project.id, true).unwrap();
        assert_eq!(summary.removed_tasks, 2);
        assert_eq!(summary.removed_entries, 1);
        assert!(store.project(project.id).is_none());
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.calendar().entries()[0].project_name, "Keep");
    }

    #[test]
    fn empty_project_deletes_without_confirmation() {
        let mut store = store();
        let project = store.create_project("Empty", Priority::Low).unwrap();
        store.delete_project(project.id, false).unwrap();
        assert!(store.projects().is_empty());
        assert!(matches!(
            store.delete_project(project.id, false),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn priority_and_repeat_reach_completed_tasks() {
        let mut store = store();
        let project = store.create_project("P", Priority::Medium).unwrap();
        let task = store
            .create_task(project.id, "t", Priority::Medium, RepeatType::None)
            .unwrap();
        store.complete_task(task.id).unwrap();

        assert_eq!(
            store.set_priority(project.id, Priority::Low).unwrap(),
            EntityKind::Project
        );
        assert_eq!(
            store.set_priority(task.id, Priority::High).unwrap(),
            EntityKind::Task
        );
        store.set_repeat_type(task.id, RepeatType::Monthly).unwrap();
        assert_eq!(store.task(task.id).unwrap().priority, Priority::High);
        assert_eq!(store.task(task.id).unwrap().repeat_type, RepeatType::Monthly);
        assert!(matches!(
            store.set_repeat_type(project.id, RepeatType::Daily),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.set_priority(42, Priority::Low),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn active_tree_is_depth_first_in_collection_order() {
        let mut store = store();
        let p = store.create_project("P", Priority::Medium).unwrap();
        let q = store.create_project("Q", Priority::Medium).unwrap();
        let a = store
            .create_task(p.id, "a", Priority::Low, RepeatType::None)
            .unwrap();
        let b = store
            .create_task(p.id, "b", Priority::High, RepeatType::None)
            .unwrap();
        store
            .create_task(a.id, "a1", Priority::Medium, RepeatType::None)
            .unwrap();
        let a2 = store
            .create_task(a.id, "a2", Priority::Medium, RepeatType::None)
            .unwrap();
        store
            .create_task(a2.id, "a2x", Priority::Medium, RepeatType::None)
            .unwrap();
        store
            .create_task(q.id, "q1", Priority::Medium, RepeatType::None)
            .unwrap();
        store.complete_task(b.id).unwrap();

        let tree = store.list_active_tree();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].position, 1);
        let mut names = Vec::new();
        flatten(&tree[0].tasks, &mut names);
        assert_eq!(names, vec!["a", "a1", "a2", "a2x"]);
        let mut names = Vec::new();
        flatten(&tree[1].tasks, &mut names);
        assert_eq!(names, vec!["q1"]);
    }

    #[test]
    fn priority_order_sorts_siblings_stably() {
        let mut store = store();
        let p = store.create_project("P", Priority::Medium).unwrap();
        for (name, priority) in [
            ("low", Priority::Low),
            ("high-1", Priority::High),
            ("medium", Priority::Medium),
            ("high-2", Priority::High),
        ] {
            store
                .create_task(p.id, name, priority, RepeatType::None)
                .unwrap();
        }
        let tree = store.list_active_tree_sorted(SortOrder::Priority);
        let mut names = Vec::new();
        flatten(&tree[0].tasks, &mut names);
        assert_eq!(names, vec!["high-1", "high-2", "medium", "low"]);
    }

    #[test]
    fn export_and_replace_round_trip() {
        let mut store = store();
        let p = store.create_project("P", Priority::Medium).unwrap();
        let t = store
            .create_task(p.id, "t", Priority::Medium, RepeatType::None)
            .unwrap();
        store.complete_task(t.id).unwrap();
        let snapshot = store.export();

        let restored = TodoStore::from_snapshot(snapshot.clone(), Clock::Fixed(day()));
        assert_eq!(restored.export(), snapshot);
        assert_eq!(restored.next_id(), 3);
    }

    #[test]
    fn completion_shows_up_in_month_report() {
        let mut store = store();
        let project = store.create_project("Launch", Priority::High).unwrap();
        let task = store
            .create_task(project.id, "Design", Priority::Medium, RepeatType::None)
            .unwrap();
        store.complete_task(task.id).unwrap();

        let report = build_month_report(2024, 6, store.calendar().entries()).unwrap();
        for group in &report.groups {
            if group.contains(day()) {
                assert_eq!(group.pairs.len(), 1);
                assert_eq!(group.pairs[0].task, "Design");
                assert_eq!(group.pairs[0].project, "Launch");
            } else {
                assert!(group.pairs.iter().all(|pair| pair.is_placeholder()));
            }
        }
    }
}
