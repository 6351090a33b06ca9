use crate::{
    domain::Board,
    error::{RecmanError, Result},
    storage::{decode_board, BoardRepository},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process key/value storage holding the board as a JSON string,
/// the way the web client keeps it in browser-local storage
pub struct MemoryRepository {
    key: String,
    items: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryRepository {
    pub const DEFAULT_KEY: &'static str = "recman-board";

    pub fn new() -> Self {
        Self::with_key(Self::DEFAULT_KEY)
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            items: Mutex::new(HashMap::new()),
            quota: None,
        }
    }

    /// Limits the size in bytes of a stored value; larger saves fail
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads a raw stored value
    pub fn get_item(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Writes a raw value, bypassing board encoding
    pub fn set_item(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock().insert(key.into(), value.into());
    }

    pub fn remove_item(&self, key: &str) -> Option<String> {
        self.lock().remove(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds whole values
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BoardRepository for MemoryRepository {
    async fn load(&self) -> Board {
        match self.get_item(&self.key) {
            Some(contents) => decode_board(&contents, &self.key),
            None => Board::new(),
        }
    }

    async fn save(&self, board: &Board) -> Result<()> {
        let json = serde_json::to_string(board)?;

        if let Some(quota) = self.quota {
            if json.len() > quota {
                return Err(RecmanError::StorageError(format!(
                    "quota exceeded: {} bytes over a limit of {}",
                    json.len(),
                    quota
                )));
            }
        }

        self.set_item(self.key.clone(), json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, ColumnId, Task, TaskId};
    use std::str::FromStr;

    fn valid_board() -> Board {
        let task_id = TaskId::from_str("t-1").unwrap();
        let mut column = Column::new(ColumnId::from_str("col-1").unwrap(), "Col".to_string());
        column.task_ids.push(task_id.clone());

        let mut board = Board::new();
        board
            .tasks
            .insert(task_id.clone(), Task::new(task_id, "task".to_string()));
        board.columns.push(column);
        board
    }

    #[tokio::test]
    async fn test_load_empty_storage() {
        let repo = MemoryRepository::new();
        assert_eq!(repo.load().await, Board::new());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let repo = MemoryRepository::new();
        let board = valid_board();

        repo.save(&board).await.unwrap();

        assert_eq!(repo.load().await, board);
        let raw = repo.get_item(MemoryRepository::DEFAULT_KEY).unwrap();
        assert_eq!(raw, serde_json::to_string(&board).unwrap());
    }

    #[tokio::test]
    async fn test_load_invalid_json() {
        let repo = MemoryRepository::new();
        repo.set_item(MemoryRepository::DEFAULT_KEY, "not json{{{");

        assert_eq!(repo.load().await, Board::new());
    }

    #[tokio::test]
    async fn test_custom_key_is_isolated() {
        let repo = MemoryRepository::with_key("other-board");
        repo.set_item(MemoryRepository::DEFAULT_KEY, "not json{{{");
        let board = valid_board();

        repo.save(&board).await.unwrap();

        assert_eq!(repo.key(), "other-board");
        assert_eq!(repo.load().await, board);
        assert_eq!(
            repo.get_item(MemoryRepository::DEFAULT_KEY).as_deref(),
            Some("not json{{{")
        );
    }

    #[tokio::test]
    async fn test_save_over_quota_fails() {
        let repo = MemoryRepository::new().with_quota(8);

        let result = repo.save(&valid_board()).await;

        assert!(matches!(result, Err(RecmanError::StorageError(_))));
        assert!(repo.get_item(MemoryRepository::DEFAULT_KEY).is_none());
    }
}
