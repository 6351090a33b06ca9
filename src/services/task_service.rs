use crate::{
    domain::{ColumnId, Task, TaskId, TaskStatus},
    error::{RecmanError, Result},
    services::normalize_text,
    store::BoardStore,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Task mutations: add, edit, toggle, move and the bulk variants
#[derive(Clone)]
pub struct TaskService {
    store: Arc<BoardStore>,
}

impl TaskService {
    pub fn new(store: Arc<BoardStore>) -> Self {
        Self { store }
    }

    /// Appends a new active task to a column and returns its id
    pub async fn add_task(&self, column_id: &ColumnId, text: &str) -> Result<TaskId> {
        let text = normalize_text(text)?;

        let task_id = self
            .store
            .update(|board| {
                let column = board
                    .column_mut(column_id)
                    .ok_or_else(|| RecmanError::ColumnNotFound(column_id.to_string()))?;

                let task = Task::new(TaskId::generate(), text);
                let task_id = task.id.clone();
                column.task_ids.push(task_id.clone());
                board.tasks.insert(task_id.clone(), task);
                Ok(task_id)
            })
            .await?;

        tracing::debug!(%task_id, %column_id, "added task");
        Ok(task_id)
    }

    pub async fn remove_task(&self, task_id: &TaskId) -> Result<()> {
        self.store
            .update(|board| {
                if board.tasks.remove(task_id).is_none() {
                    return Err(RecmanError::TaskNotFound(task_id.to_string()));
                }
                board.detach_task(task_id);
                Ok(())
            })
            .await?;

        tracing::debug!(%task_id, "removed task");
        Ok(())
    }

    /// Replaces a task's text
    pub async fn update_task(&self, task_id: &TaskId, text: &str) -> Result<()> {
        let text = normalize_text(text)?;

        self.store
            .update(|board| {
                let task = board
                    .task_mut(task_id)
                    .ok_or_else(|| RecmanError::TaskNotFound(task_id.to_string()))?;
                task.set_text(text);
                Ok(())
            })
            .await
    }

    /// Flips a task between active and completed, returning the new status
    pub async fn toggle_status(&self, task_id: &TaskId) -> Result<TaskStatus> {
        self.store
            .update(|board| {
                let task = board
                    .task_mut(task_id)
                    .ok_or_else(|| RecmanError::TaskNotFound(task_id.to_string()))?;
                task.toggle_status();
                Ok(task.status)
            })
            .await
    }

    /// Moves a task into a column.
    ///
    /// The task is taken out of its current column first, then inserted at
    /// `index` in the target (appended when `index` is `None` or past the
    /// end). Moving within the same column reorders it.
    pub async fn move_task(
        &self,
        task_id: &TaskId,
        to_column_id: &ColumnId,
        index: Option<usize>,
    ) -> Result<()> {
        self.store
            .update(|board| {
                if !board.contains_task(task_id) {
                    return Err(RecmanError::TaskNotFound(task_id.to_string()));
                }
                let target = board
                    .column_index(to_column_id)
                    .ok_or_else(|| RecmanError::ColumnNotFound(to_column_id.to_string()))?;

                board.detach_task(task_id);
                board.columns[target].insert_task(task_id.clone(), index);
                Ok(())
            })
            .await?;

        tracing::debug!(%task_id, %to_column_id, ?index, "moved task");
        Ok(())
    }

    /// Deletes every listed task that exists; returns how many were deleted
    pub async fn bulk_delete(&self, task_ids: &[TaskId]) -> Result<usize> {
        let removed = self
            .store
            .update(|board| {
                let doomed: HashSet<&TaskId> = task_ids
                    .iter()
                    .filter(|id| board.tasks.remove(*id).is_some())
                    .collect();

                for column in &mut board.columns {
                    column.task_ids.retain(|id| !doomed.contains(id));
                }
                Ok(doomed.len())
            })
            .await?;

        tracing::debug!(requested = task_ids.len(), removed, "bulk deleted tasks");
        Ok(removed)
    }

    /// Sets the status of every listed task that exists; returns how many were found
    pub async fn bulk_set_status(&self, task_ids: &[TaskId], status: TaskStatus) -> Result<usize> {
        self.store
            .update(|board| {
                let mut updated = 0;
                for id in task_ids {
                    if let Some(task) = board.task_mut(id) {
                        task.set_status(status);
                        updated += 1;
                    }
                }
                Ok(updated)
            })
            .await
    }

    /// Moves the listed tasks to the end of a column, in the given order.
    ///
    /// Unknown and repeated ids are skipped. Returns how many tasks moved.
    pub async fn bulk_move(&self, task_ids: &[TaskId], to_column_id: &ColumnId) -> Result<usize> {
        let moved = self
            .store
            .update(|board| {
                let target = board
                    .column_index(to_column_id)
                    .ok_or_else(|| RecmanError::ColumnNotFound(to_column_id.to_string()))?;

                let mut seen = HashSet::new();
                let moving: Vec<TaskId> = task_ids
                    .iter()
                    .filter(|id| board.contains_task(id) && seen.insert(*id))
                    .cloned()
                    .collect();

                let moving_set: HashSet<&TaskId> = moving.iter().collect();
                for column in &mut board.columns {
                    column.task_ids.retain(|id| !moving_set.contains(id));
                }
                board.columns[target]
                    .task_ids
                    .extend(moving.iter().cloned());
                Ok(moving.len())
            })
            .await?;

        tracing::debug!(moved, %to_column_id, "bulk moved tasks");
        Ok(moved)
    }
}
