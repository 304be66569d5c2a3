//! Global id allocation across projects and tasks.

use crate::model::{EntityId, Project, Task};

/// Next free id: one past the largest project or task id, or 1 when empty.
///
/// Derived from the collections on every call so hand-edited data files still
/// yield a safe value.
pub fn next_id(projects: &[Project], tasks: &[Task]) -> EntityId {
    projects
        .iter()
        .map(|project| project.id)
        .chain(tasks.iter().map(|task| task.id))
        .max()
        .map_or(1, |max| max + 1)
}
