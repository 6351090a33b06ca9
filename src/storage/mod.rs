use crate::{domain::Board, error::Result};
use async_trait::async_trait;

pub mod file_storage;
pub mod memory_storage;

pub use file_storage::FileRepository;
pub use memory_storage::MemoryRepository;

/// Persistence for the whole board.
///
/// Loading never fails: missing data yields an empty board, unreadable or
/// malformed data is logged and also yields an empty board.
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Loads the persisted board
    async fn load(&self) -> Board;

    /// Saves the board, replacing whatever was stored before
    async fn save(&self, board: &Board) -> Result<()>;
}

/// Decodes a stored board, repairing reference problems.
///
/// Returns an empty board when the data is not a board at all.
pub(crate) fn decode_board(contents: &str, source: &str) -> Board {
    let mut board: Board = match serde_json::from_str(contents) {
        Ok(board) => board,
        Err(error) => {
            tracing::warn!(%source, %error, "invalid board data in storage, returning empty board");
            return Board::new();
        }
    };

    let repairs = board.reconcile();
    if repairs > 0 {
        tracing::warn!(%source, repairs, "repaired inconsistent board references");
    }
    board
}
