use crate::{
    domain::{filter_task_ids, search_task_ids, FilterValue, TaskId},
    store::BoardStore,
};
use std::sync::Arc;

/// Status filtering against the store's current board
#[derive(Clone)]
pub struct FilterService {
    store: Arc<BoardStore>,
}

impl FilterService {
    pub fn new(store: Arc<BoardStore>) -> Self {
        Self { store }
    }

    pub fn filter(&self, task_ids: &[TaskId], filter: FilterValue) -> Vec<TaskId> {
        filter_task_ids(&self.store.board(), task_ids, filter)
    }
}

/// Text search against the store's current board
#[derive(Clone)]
pub struct SearchService {
    store: Arc<BoardStore>,
}

impl SearchService {
    pub fn new(store: Arc<BoardStore>) -> Self {
        Self { store }
    }

    pub fn search(&self, task_ids: &[TaskId], query: &str) -> Vec<TaskId> {
        search_task_ids(&self.store.board(), task_ids, query)
    }
}
