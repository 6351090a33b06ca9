use crate::domain::column::{Column, ColumnId};
use crate::domain::task::{Task, TaskId};
use crate::error::{RecmanError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Kanban board state.
///
/// Tasks are stored once, keyed by id; columns hold ordered references.
/// Every referenced id has a task and every task is referenced by exactly
/// one column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub tasks: HashMap<TaskId, Task>,
    pub columns: Vec<Column>,
}

impl Board {
    /// Creates an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a board with one empty column per title
    pub fn with_columns<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tasks: HashMap::new(),
            columns: titles
                .into_iter()
                .map(|title| Column::new(ColumnId::generate(), title.into()))
                .collect(),
        }
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|col| &col.id == id)
    }

    pub fn column_mut(&mut self, id: &ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|col| &col.id == id)
    }

    pub fn column_index(&self, id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|col| &col.id == id)
    }

    /// Gets the column currently holding a task
    pub fn column_of_task(&self, task_id: &TaskId) -> Option<&Column> {
        self.columns.iter().find(|col| col.contains(task_id))
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    pub fn contains_task(&self, id: &TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    /// Tasks of a column in display order
    pub fn tasks_in<'a>(&'a self, column: &'a Column) -> impl Iterator<Item = &'a Task> + 'a {
        column.task_ids.iter().filter_map(move |id| self.tasks.get(id))
    }

    /// Removes every reference to a task from every column
    pub fn detach_task(&mut self, task_id: &TaskId) {
        for column in &mut self.columns {
            column.task_ids.retain(|id| id != task_id);
        }
    }

    /// Verifies the reference invariant, reporting the first violation found
    pub fn check_integrity(&self) -> Result<()> {
        for (key, task) in &self.tasks {
            if key != &task.id {
                return Err(RecmanError::BoardIntegrity(format!(
                    "task stored under '{}' has id '{}'",
                    key, task.id
                )));
            }
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            for id in &column.task_ids {
                if !self.tasks.contains_key(id) {
                    return Err(RecmanError::BoardIntegrity(format!(
                        "column '{}' references unknown task '{}'",
                        column.id, id
                    )));
                }
                if !seen.insert(id) {
                    return Err(RecmanError::BoardIntegrity(format!(
                        "task '{}' is referenced more than once",
                        id
                    )));
                }
            }
        }

        if let Some(orphan) = self.tasks.keys().find(|id| !seen.contains(id)) {
            return Err(RecmanError::BoardIntegrity(format!(
                "task '{}' is not in any column",
                orphan
            )));
        }

        Ok(())
    }

    /// Repairs a board that breaks the reference invariant and returns the
    /// number of repairs made.
    ///
    /// Dangling and duplicate references are dropped. Orphaned tasks are
    /// appended to the first column, oldest first, or dropped when the board
    /// has no columns.
    pub fn reconcile(&mut self) -> usize {
        let mut repairs = 0;

        for (key, task) in self.tasks.iter_mut() {
            if &task.id != key {
                task.id = key.clone();
                repairs += 1;
            }
        }

        let mut seen: HashSet<TaskId> = HashSet::new();
        for column in &mut self.columns {
            let before = column.task_ids.len();
            let tasks = &self.tasks;
            column
                .task_ids
                .retain(|id| tasks.contains_key(id) && seen.insert(id.clone()));
            repairs += before - column.task_ids.len();
        }

        let mut orphans: Vec<&Task> = self
            .tasks
            .values()
            .filter(|task| !seen.contains(&task.id))
            .collect();
        if orphans.is_empty() {
            return repairs;
        }
        orphans.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        let orphan_ids: Vec<TaskId> = orphans.into_iter().map(|task| task.id.clone()).collect();
        repairs += orphan_ids.len();

        match self.columns.first_mut() {
            Some(first) => first.task_ids.extend(orphan_ids),
            None => {
                for id in &orphan_ids {
                    self.tasks.remove(id);
                }
            }
        }

        repairs
    }
}
