use crate::domain::task::TaskId;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Opaque identifier for a column
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct ColumnId(String);

impl ColumnId {
    /// Generates a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ColumnId {
    type Err = crate::error::RecmanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(crate::error::RecmanError::InvalidId(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl TryFrom<String> for ColumnId {
    type Error = crate::error::RecmanError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered bucket of task references. Order of `task_ids` is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub task_ids: Vec<TaskId>,
}

impl Column {
    pub fn new(id: ColumnId, title: String) -> Self {
        Self {
            id,
            title,
            task_ids: Vec::new(),
        }
    }

    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.task_ids.contains(task_id)
    }

    pub fn position_of(&self, task_id: &TaskId) -> Option<usize> {
        self.task_ids.iter().position(|id| id == task_id)
    }

    /// Removes a task reference, returning whether it was present
    pub fn remove_task(&mut self, task_id: &TaskId) -> bool {
        match self.position_of(task_id) {
            Some(pos) => {
                self.task_ids.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Inserts a task reference at `index`, or appends when `index` is
    /// `None` or past the end
    pub fn insert_task(&mut self, task_id: TaskId, index: Option<usize>) {
        match index {
            Some(i) if i < self.task_ids.len() => self.task_ids.insert(i, task_id),
            _ => self.task_ids.push(task_id),
        }
    }

    pub fn len(&self) -> usize {
        self.task_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.task_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> TaskId {
        TaskId::from_str(s).unwrap()
    }

    #[test]
    fn test_column_id_parsing() {
        assert_eq!(ColumnId::from_str("col-1").unwrap().as_str(), "col-1");
        assert!(ColumnId::from_str("").is_err());
    }

    #[test]
    fn test_new_column_is_empty() {
        let column = Column::new(ColumnId::generate(), "To Do".to_string());
        assert!(column.is_empty());
        assert_eq!(column.title, "To Do");
    }

    #[test]
    fn test_insert_task_at_index() {
        let mut column = Column::new(ColumnId::generate(), "To Do".to_string());
        column.insert_task(id("a"), None);
        column.insert_task(id("b"), None);
        column.insert_task(id("c"), Some(0));

        assert_eq!(column.task_ids, vec![id("c"), id("a"), id("b")]);
    }

    #[test]
    fn test_insert_task_past_end_appends() {
        let mut column = Column::new(ColumnId::generate(), "To Do".to_string());
        column.insert_task(id("a"), None);
        column.insert_task(id("b"), Some(10));

        assert_eq!(column.task_ids, vec![id("a"), id("b")]);
    }

    #[test]
    fn test_remove_task() {
        let mut column = Column::new(ColumnId::generate(), "To Do".to_string());
        column.insert_task(id("a"), None);

        assert!(column.remove_task(&id("a")));
        assert!(!column.remove_task(&id("a")));
        assert!(column.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_blank_ids() {
        assert!(serde_json::from_str::<Column>(r#"{ "id": "  ", "title": "Col" }"#).is_err());
        assert!(serde_json::from_str::<Column>(
            r#"{ "id": "col-1", "title": "Col", "taskIds": [""] }"#
        )
        .is_err());
    }

    #[test]
    fn test_missing_task_ids_deserialize_as_empty() {
        let column: Column = serde_json::from_str(r#"{ "id": "col-1", "title": "Col" }"#).unwrap();
        assert!(column.task_ids.is_empty());
    }
}
