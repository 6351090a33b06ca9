//! Command-style services. Each mutation computes a new board from the
//! store's current one and hands it back to the store.

use crate::error::{RecmanError, Result};

pub mod column_service;
pub mod query_service;
pub mod task_service;

pub use column_service::ColumnService;
pub use query_service::{FilterService, SearchService};
pub use task_service::TaskService;

/// Trims user-entered text, rejecting blank input
pub(crate) fn normalize_text(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RecmanError::EmptyText);
    }
    Ok(trimmed.to_string())
}
