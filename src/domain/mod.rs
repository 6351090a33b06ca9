pub mod board;
pub mod column;
pub mod query;
pub mod task;

pub use board::Board;
pub use column::{Column, ColumnId};
pub use query::{
    filter_task_ids, highlight_segments, search_task_ids, visible_task_ids, FilterValue, Segment,
};
pub use task::{Task, TaskId, TaskStatus};
