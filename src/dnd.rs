//! Drop reconciliation: turns a finished drag gesture into a store mutation.
//!
//! Gesture recognition belongs to the front end. It reports what was dragged
//! and the drop targets under the pointer, innermost first.

use crate::{
    domain::{ColumnId, TaskId},
    error::Result,
    services::{ColumnService, TaskService},
};

/// What the user was dragging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    Task { task_id: TaskId },
    Column { column_id: ColumnId },
}

/// Data attached to a drop target.
///
/// Task drop targets carry `column_id` and optionally the `index` within
/// the column; column drop targets carry `column_index`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropTarget {
    pub column_id: Option<ColumnId>,
    pub index: Option<usize>,
    pub column_index: Option<usize>,
}

impl DropTarget {
    /// A slot inside a column; `None` drops at the end
    pub fn in_column(column_id: ColumnId, index: Option<usize>) -> Self {
        Self {
            column_id: Some(column_id),
            index,
            column_index: None,
        }
    }

    /// A position in the column strip
    pub fn column_slot(column_index: usize) -> Self {
        Self {
            column_index: Some(column_index),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent {
    pub source: DragSource,
    pub targets: Vec<DropTarget>,
}

/// What a drop did to the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Ignored,
    TaskMoved {
        task_id: TaskId,
        column_id: ColumnId,
        index: Option<usize>,
    },
    ColumnMoved {
        column_id: ColumnId,
        index: usize,
    },
}

/// Routes drop events to the task and column services
#[derive(Clone)]
pub struct DropMonitor {
    tasks: TaskService,
    columns: ColumnService,
}

impl DropMonitor {
    pub fn new(tasks: TaskService, columns: ColumnService) -> Self {
        Self { tasks, columns }
    }

    /// Applies a drop. Only the innermost target is considered; drops that
    /// lack the data their source needs are ignored.
    pub async fn on_drop(&self, event: DropEvent) -> Result<DropOutcome> {
        let Some(target) = event.targets.into_iter().next() else {
            tracing::trace!("drop outside any target");
            return Ok(DropOutcome::Ignored);
        };

        match event.source {
            DragSource::Task { task_id } => {
                let Some(column_id) = target.column_id else {
                    return Ok(DropOutcome::Ignored);
                };
                self.tasks
                    .move_task(&task_id, &column_id, target.index)
                    .await?;
                Ok(DropOutcome::TaskMoved {
                    task_id,
                    column_id,
                    index: target.index,
                })
            }
            DragSource::Column { column_id } => {
                let Some(index) = target.column_index else {
                    return Ok(DropOutcome::Ignored);
                };
                self.columns.move_column(&column_id, index).await?;
                Ok(DropOutcome::ColumnMoved { column_id, index })
            }
        }
    }
}
