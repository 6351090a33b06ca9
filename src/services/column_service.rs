use crate::{
    domain::{Column, ColumnId},
    error::{RecmanError, Result},
    services::normalize_text,
    store::BoardStore,
};
use std::sync::Arc;

/// Column mutations: add, remove, rename and reorder
#[derive(Clone)]
pub struct ColumnService {
    store: Arc<BoardStore>,
}

impl ColumnService {
    pub fn new(store: Arc<BoardStore>) -> Self {
        Self { store }
    }

    /// Appends an empty column and returns its id
    pub async fn add_column(&self, title: &str) -> Result<ColumnId> {
        let title = normalize_text(title)?;

        let column_id = self
            .store
            .update(|board| {
                let column = Column::new(ColumnId::generate(), title);
                let column_id = column.id.clone();
                board.columns.push(column);
                Ok(column_id)
            })
            .await?;

        tracing::debug!(%column_id, "added column");
        Ok(column_id)
    }

    /// Removes a column together with every task it holds
    pub async fn remove_column(&self, column_id: &ColumnId) -> Result<()> {
        let removed_tasks = self
            .store
            .update(|board| {
                let index = board
                    .column_index(column_id)
                    .ok_or_else(|| RecmanError::ColumnNotFound(column_id.to_string()))?;

                let column = board.columns.remove(index);
                for task_id in &column.task_ids {
                    board.tasks.remove(task_id);
                }
                Ok(column.task_ids.len())
            })
            .await?;

        tracing::debug!(%column_id, removed_tasks, "removed column");
        Ok(())
    }

    pub async fn rename_column(&self, column_id: &ColumnId, title: &str) -> Result<()> {
        let title = normalize_text(title)?;

        self.store
            .update(|board| {
                let column = board
                    .column_mut(column_id)
                    .ok_or_else(|| RecmanError::ColumnNotFound(column_id.to_string()))?;
                column.title = title;
                Ok(())
            })
            .await
    }

    /// Moves a column to `to_index`; indexes past the end move it last
    pub async fn move_column(&self, column_id: &ColumnId, to_index: usize) -> Result<()> {
        self.store
            .update(|board| {
                let from = board
                    .column_index(column_id)
                    .ok_or_else(|| RecmanError::ColumnNotFound(column_id.to_string()))?;

                let column = board.columns.remove(from);
                let to = to_index.min(board.columns.len());
                board.columns.insert(to, column);
                Ok(())
            })
            .await?;

        tracing::debug!(%column_id, to_index, "moved column");
        Ok(())
    }
}
