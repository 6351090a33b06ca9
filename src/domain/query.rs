use crate::domain::board::Board;
use crate::domain::column::ColumnId;
use crate::domain::task::{TaskId, TaskStatus};
use std::fmt;
use std::str::FromStr;

/// Status filter applied to a list of task ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterValue {
    #[default]
    All,
    Status(TaskStatus),
}

impl FilterValue {
    pub fn accepts(&self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Status(wanted) => *wanted == status,
        }
    }
}

impl FromStr for FilterValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        TaskStatus::from_str(s)
            .map(Self::Status)
            .map_err(|_| format!("Invalid filter '{}'. Valid filters: all, active, completed", s))
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Status(status) => write!(f, "{}", status),
        }
    }
}

/// Keeps the ids whose task matches the filter, preserving order.
///
/// `FilterValue::All` returns the ids untouched; otherwise ids without a
/// task on the board are dropped.
pub fn filter_task_ids(board: &Board, task_ids: &[TaskId], filter: FilterValue) -> Vec<TaskId> {
    if filter == FilterValue::All {
        return task_ids.to_vec();
    }

    task_ids
        .iter()
        .filter(|id| {
            board
                .task(id)
                .map(|task| filter.accepts(task.status))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Keeps the ids whose task text contains the query, ignoring case.
///
/// A blank query returns the ids untouched.
pub fn search_task_ids(board: &Board, task_ids: &[TaskId], query: &str) -> Vec<TaskId> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return task_ids.to_vec();
    }

    let lower_query = trimmed.to_lowercase();
    task_ids
        .iter()
        .filter(|id| {
            board
                .task(id)
                .map(|task| task.matches(&lower_query))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Ids of the tasks a column shows in display order, with both the status
/// filter and the search query applied
pub fn visible_task_ids(
    board: &Board,
    column_id: &ColumnId,
    filter: FilterValue,
    query: &str,
) -> Vec<TaskId> {
    let Some(column) = board.column(column_id) else {
        return Vec::new();
    };

    let known: Vec<TaskId> = column
        .task_ids
        .iter()
        .filter(|id| board.contains_task(id))
        .cloned()
        .collect();
    let filtered = filter_task_ids(board, &known, filter);
    search_task_ids(board, &filtered, query)
}

/// A run of text, flagged when it is the part matching a search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

/// Splits `text` around the first case-insensitive occurrence of `query`.
///
/// A blank query or no match yields the whole text as a single unmatched
/// segment. Empty leading or trailing segments are omitted.
pub fn highlight_segments<'a>(text: &'a str, query: &str) -> Vec<Segment<'a>> {
    let plain = vec![Segment {
        text,
        matched: false,
    }];

    let trimmed = query.trim();
    if trimmed.is_empty() {
        return plain;
    }

    let Some((start, end)) = find_case_insensitive(text, trimmed) else {
        return plain;
    };

    let mut segments = Vec::with_capacity(3);
    if start > 0 {
        segments.push(Segment {
            text: &text[..start],
            matched: false,
        });
    }
    segments.push(Segment {
        text: &text[start..end],
        matched: true,
    });
    if end < text.len() {
        segments.push(Segment {
            text: &text[end..],
            matched: false,
        });
    }
    segments
}

/// Byte range of the first case-insensitive match, on char boundaries of
/// the original text. A match must cover whole characters, so a needle
/// that ends partway through a multi-char lowercase form does not match there.
fn find_case_insensitive(text: &str, needle: &str) -> Option<(usize, usize)> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();

    let starts = text.char_indices().map(|(i, _)| i);
    for start in starts {
        let mut pending = needle.iter();
        let mut end = start;
        let mut matched = true;

        'chars: for (offset, ch) in text[start..].char_indices() {
            for lower in ch.to_lowercase() {
                match pending.next() {
                    Some(expected) if *expected == lower => {}
                    // Mismatch, or the needle ends inside this character
                    _ => {
                        matched = false;
                        break 'chars;
                    }
                }
            }
            end = start + offset + ch.len_utf8();
            if pending.len() == 0 {
                break;
            }
        }

        if matched && pending.len() == 0 {
            return Some((start, end));
        }
    }
    None
}
