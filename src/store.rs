//! The board store: single owner of the current board.
//!
//! Every mutation produces a whole new board (copy-on-write). The store
//! swaps it in, saves it through the repository and notifies subscribers.

use crate::{
    domain::Board,
    error::Result,
    storage::BoardRepository,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

/// Callback invoked with the new board after every change
pub type Listener = Arc<dyn Fn(&Board) + Send + Sync>;

type ListenerMap = Mutex<HashMap<u64, Listener>>;

pub struct BoardStore {
    repository: Arc<dyn BoardRepository>,
    board: RwLock<Arc<Board>>,
    write_lock: tokio::sync::Mutex<()>,
    listeners: Arc<ListenerMap>,
    next_listener_id: AtomicU64,
}

impl BoardStore {
    /// Creates a store holding the repository's persisted board
    pub async fn open(repository: Arc<dyn BoardRepository>) -> Self {
        let board = repository.load().await;
        tracing::debug!(
            columns = board.columns.len(),
            tasks = board.tasks.len(),
            "loaded board"
        );
        Self::with_board(repository, board)
    }

    /// Creates a store around an already loaded board
    pub fn with_board(repository: Arc<dyn BoardRepository>, board: Board) -> Self {
        Self {
            repository,
            board: RwLock::new(Arc::new(board)),
            write_lock: tokio::sync::Mutex::new(()),
            listeners: Arc::new(Mutex::new(HashMap::new())),
            next_listener_id: AtomicU64::new(0),
        }
    }

    /// Current board snapshot. Snapshots never change after they are handed out.
    pub fn board(&self) -> Arc<Board> {
        self.board
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replaces the board wholesale
    pub async fn set(&self, next: Board) {
        let _guard = self.write_lock.lock().await;
        self.replace(next).await;
    }

    /// Applies `f` to a copy of the current board.
    ///
    /// On success the copy replaces the board; on error the board is left
    /// untouched and no listener runs. Updates are applied one at a time.
    pub async fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Board) -> Result<T>,
    {
        let _guard = self.write_lock.lock().await;

        let mut next = Board::clone(&self.board());
        let value = f(&mut next)?;
        debug_assert!(
            next.check_integrity().is_ok(),
            "board update broke integrity: {:?}",
            next.check_integrity()
        );

        self.replace(next).await;
        Ok(value)
    }

    async fn replace(&self, next: Board) {
        let next = Arc::new(next);
        {
            let mut current = self
                .board
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *current = Arc::clone(&next);
        }

        // Saving is best effort; the in-memory board stays authoritative
        if let Err(error) = self.repository.save(&next).await {
            tracing::error!(%error, "failed to save board to storage");
        }

        self.notify(&next);
    }

    fn notify(&self, board: &Board) {
        let listeners: Vec<Listener> = lock_listeners(&self.listeners)
            .values()
            .cloned()
            .collect();

        for listener in listeners {
            listener(board);
        }
    }

    /// Registers a listener; it stays registered until the returned
    /// subscription is dropped
    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Board) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        lock_listeners(&self.listeners).insert(id, Arc::new(listener));

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        lock_listeners(&self.listeners).len()
    }
}

fn lock_listeners(listeners: &ListenerMap) -> std::sync::MutexGuard<'_, HashMap<u64, Listener>> {
    listeners
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle returned by [`BoardStore::subscribe`]
pub struct Subscription {
    id: u64,
    listeners: Weak<ListenerMap>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Removes the listener now
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock_listeners(&listeners).remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, ColumnId};
    use crate::error::RecmanError;
    use crate::storage::MemoryRepository;
    use std::sync::atomic::AtomicUsize;

    fn store_with(repo: Arc<MemoryRepository>) -> BoardStore {
        BoardStore::with_board(repo, Board::with_columns(["To Do"]))
    }

    #[tokio::test]
    async fn test_open_loads_persisted_board() {
        let repo = Arc::new(MemoryRepository::new());
        let board = Board::with_columns(["To Do", "Done"]);
        repo.save(&board).await.unwrap();

        let store = BoardStore::open(repo).await;

        assert_eq!(*store.board(), board);
    }

    #[tokio::test]
    async fn test_set_replaces_and_persists() {
        let repo = Arc::new(MemoryRepository::new());
        let store = store_with(repo.clone());
        let next = Board::with_columns(["A", "B"]);

        store.set(next.clone()).await;

        assert_eq!(*store.board(), next);
        assert_eq!(repo.load().await, next);
    }

    #[tokio::test]
    async fn test_snapshots_are_immutable() {
        let store = store_with(Arc::new(MemoryRepository::new()));
        let before = store.board();

        store
            .update(|board| {
                board
                    .columns
                    .push(Column::new(ColumnId::generate(), "New".to_string()));
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(before.columns.len(), 1);
        assert_eq!(store.board().columns.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_board_untouched() {
        let store = store_with(Arc::new(MemoryRepository::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let _sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let before = store.board();

        let result: Result<()> = store
            .update(|board| {
                board.columns.clear();
                Err(RecmanError::ColumnNotFound("col".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.board(), before);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_listeners_notified_with_new_board() {
        let store = store_with(Arc::new(MemoryRepository::new()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = store.subscribe(move |board| {
            sink.lock().unwrap().push(board.columns.len());
        });

        store.set(Board::with_columns(["A", "B", "C"])).await;

        assert_eq!(*seen.lock().unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_notifications() {
        let store = store_with(Arc::new(MemoryRepository::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        store.set(Board::new()).await;
        assert_eq!(store.listener_count(), 1);

        sub.unsubscribe();
        store.set(Board::new()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_save_failure_is_not_fatal() {
        let repo = Arc::new(MemoryRepository::new().with_quota(4));
        let store = store_with(repo.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let _sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let next = Board::with_columns(["Only"]);

        store.set(next.clone()).await;

        assert_eq!(*store.board(), next);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(repo.get_item(MemoryRepository::DEFAULT_KEY).is_none());
    }
}
