//! # Recman Core
//!
//! Board state, commands and persistence for the Recman kanban board.
//!
//! The board is a normalized record: tasks keyed by id, columns holding
//! ordered task ids. A [`BoardStore`] owns the current board and notifies
//! subscribers; services compute a new board for every mutation and hand it
//! to the store, which saves it through a [`BoardRepository`].

pub mod config;
pub mod dnd;
pub mod domain;
pub mod error;
pub mod services;
pub mod session;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use dnd::{DragSource, DropEvent, DropMonitor, DropOutcome, DropTarget};
pub use domain::{Board, Column, ColumnId, FilterValue, Task, TaskId, TaskStatus};
pub use error::{RecmanError, Result};
pub use services::{ColumnService, FilterService, SearchService, TaskService};
pub use session::{BulkAction, Selection, ViewState};
pub use storage::{BoardRepository, FileRepository, MemoryRepository};
pub use store::{BoardStore, Subscription};
