//! Per-view state that is not part of the board: search query, status
//! filter, active column and task selection.

use crate::{
    domain::{visible_task_ids, Board, ColumnId, FilterValue, TaskId, TaskStatus},
    error::Result,
    services::TaskService,
};

/// Selected task ids, kept in the order they were selected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<TaskId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the task, or deselects it when already selected
    pub fn toggle(&mut self, task_id: &TaskId) {
        match self.ids.iter().position(|id| id == task_id) {
            Some(pos) => {
                self.ids.remove(pos);
            }
            None => self.ids.push(task_id.clone()),
        }
    }

    /// Adds every id to the selection; ids already selected stay put
    pub fn select_all<'a>(&mut self, task_ids: impl IntoIterator<Item = &'a TaskId>) {
        for id in task_ids {
            if !self.is_selected(id) {
                self.ids.push(id.clone());
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, task_id: &TaskId) -> bool {
        self.ids.contains(task_id)
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[TaskId] {
        &self.ids
    }

    /// Drops ids whose task no longer exists on the board
    pub fn retain_existing(&mut self, board: &Board) {
        self.ids.retain(|id| board.contains_task(id));
    }
}

/// An action applied to every selected task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    Delete,
    Complete,
    MarkActive,
    MoveTo(ColumnId),
}

impl BulkAction {
    /// Runs the action over the selection and clears it on success.
    /// Returns how many tasks were affected.
    pub async fn apply(&self, tasks: &TaskService, selection: &mut Selection) -> Result<usize> {
        let ids = selection.ids();
        let affected = match self {
            Self::Delete => tasks.bulk_delete(ids).await?,
            Self::Complete => tasks.bulk_set_status(ids, TaskStatus::Completed).await?,
            Self::MarkActive => tasks.bulk_set_status(ids, TaskStatus::Active).await?,
            Self::MoveTo(column_id) => tasks.bulk_move(ids, column_id).await?,
        };

        selection.clear();
        Ok(affected)
    }
}

/// What one viewer of the board currently sees
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub query: String,
    pub filter: FilterValue,
    pub selection: Selection,
    active_column: Option<ColumnId>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active_column(&mut self, column_id: Option<ColumnId>) {
        self.active_column = column_id;
    }

    /// The chosen column when it still exists, otherwise the first column
    pub fn active_column_id(&self, board: &Board) -> Option<ColumnId> {
        self.active_column
            .as_ref()
            .and_then(|id| board.column(id))
            .or_else(|| board.columns.first())
            .map(|column| column.id.clone())
    }

    /// Ids a column shows under the current filter and query
    pub fn visible_task_ids(&self, board: &Board, column_id: &ColumnId) -> Vec<TaskId> {
        visible_task_ids(board, column_id, self.filter, &self.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{col, two_column_store};
    use std::str::FromStr;

    fn id(s: &str) -> TaskId {
        TaskId::from_str(s).unwrap()
    }

    #[test]
    fn test_toggle_selection() {
        let mut selection = Selection::new();

        selection.toggle(&id("t-1"));
        assert!(selection.is_selected(&id("t-1")));
        assert_eq!(selection.count(), 1);

        selection.toggle(&id("t-1"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_all_adds_without_duplicates() {
        let mut selection = Selection::new();
        selection.toggle(&id("t-2"));

        selection.select_all(&[id("t-1"), id("t-2"), id("t-3")]);

        assert_eq!(selection.ids(), &[id("t-2"), id("t-1"), id("t-3")]);
    }

    #[test]
    fn test_clear_selection() {
        let mut selection = Selection::new();
        selection.select_all(&[id("t-1"), id("t-2")]);

        selection.clear();

        assert_eq!(selection.count(), 0);
    }

    #[tokio::test]
    async fn test_retain_existing() {
        let store = two_column_store();
        let tasks = TaskService::new(store.clone());
        let kept = tasks.add_task(&col("col-1"), "kept").await.unwrap();
        let mut selection = Selection::new();
        selection.select_all(&[kept.clone(), id("ghost")]);

        selection.retain_existing(&store.board());

        assert_eq!(selection.ids(), &[kept]);
    }

    #[tokio::test]
    async fn test_bulk_complete_clears_selection() {
        let store = two_column_store();
        let tasks = TaskService::new(store.clone());
        let t1 = tasks.add_task(&col("col-1"), "t1").await.unwrap();
        let t2 = tasks.add_task(&col("col-2"), "t2").await.unwrap();
        let mut selection = Selection::new();
        selection.select_all(&[t1.clone(), t2.clone()]);

        let affected = BulkAction::Complete
            .apply(&tasks, &mut selection)
            .await
            .unwrap();

        assert_eq!(affected, 2);
        assert!(selection.is_empty());
        let board = store.board();
        assert!(board.task(&t1).unwrap().is_completed());
        assert!(board.task(&t2).unwrap().is_completed());

        selection.select_all(&[t1.clone()]);
        BulkAction::MarkActive
            .apply(&tasks, &mut selection)
            .await
            .unwrap();
        assert!(!store.board().task(&t1).unwrap().is_completed());
    }

    #[tokio::test]
    async fn test_bulk_move_follows_selection_order() {
        let store = two_column_store();
        let tasks = TaskService::new(store.clone());
        let t1 = tasks.add_task(&col("col-1"), "t1").await.unwrap();
        let t2 = tasks.add_task(&col("col-1"), "t2").await.unwrap();
        let mut selection = Selection::new();
        selection.toggle(&t2);
        selection.toggle(&t1);

        BulkAction::MoveTo(col("col-2"))
            .apply(&tasks, &mut selection)
            .await
            .unwrap();

        assert_eq!(store.board().columns[1].task_ids, vec![t2, t1]);
    }

    #[tokio::test]
    async fn test_failed_bulk_action_keeps_selection() {
        let store = two_column_store();
        let tasks = TaskService::new(store.clone());
        let t1 = tasks.add_task(&col("col-1"), "t1").await.unwrap();
        let mut selection = Selection::new();
        selection.toggle(&t1);

        let result = BulkAction::MoveTo(col("no-col"))
            .apply(&tasks, &mut selection)
            .await;

        assert!(result.is_err());
        assert_eq!(selection.count(), 1);
    }

    #[tokio::test]
    async fn test_bulk_delete() {
        let store = two_column_store();
        let tasks = TaskService::new(store.clone());
        let t1 = tasks.add_task(&col("col-1"), "t1").await.unwrap();
        let mut selection = Selection::new();
        selection.toggle(&t1);

        BulkAction::Delete.apply(&tasks, &mut selection).await.unwrap();

        assert!(store.board().tasks.is_empty());
    }

    #[test]
    fn test_active_column_falls_back_to_first() {
        let board = Board::with_columns(["A", "B"]);
        let mut view = ViewState::new();

        assert_eq!(view.active_column_id(&board), Some(board.columns[0].id.clone()));

        view.set_active_column(Some(board.columns[1].id.clone()));
        assert_eq!(view.active_column_id(&board), Some(board.columns[1].id.clone()));

        view.set_active_column(Some(col("deleted")));
        assert_eq!(view.active_column_id(&board), Some(board.columns[0].id.clone()));

        assert_eq!(view.active_column_id(&Board::new()), None);
    }

    #[tokio::test]
    async fn test_visible_task_ids_uses_view_filter_and_query() {
        let store = two_column_store();
        let tasks = TaskService::new(store.clone());
        let milk = tasks.add_task(&col("col-1"), "Buy milk").await.unwrap();
        let bread = tasks.add_task(&col("col-1"), "Buy bread").await.unwrap();
        tasks.toggle_status(&bread).await.unwrap();

        let mut view = ViewState::new();
        view.query = "buy".to_string();
        view.filter = FilterValue::Status(TaskStatus::Active);

        assert_eq!(view.visible_task_ids(&store.board(), &col("col-1")), vec![milk]);
    }
}
