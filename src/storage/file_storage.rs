use crate::{
    config::Config,
    domain::Board,
    error::{RecmanError, Result},
    storage::{decode_board, BoardRepository},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based board storage under a project's `.recman` directory
pub struct FileRepository {
    root_path: PathBuf,
    config: Config,
}

impl FileRepository {
    const RECMAN_DIR: &'static str = ".recman";

    /// Creates a new FileRepository for the given project root with default settings
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self::with_config(project_root, Config::default())
    }

    pub fn with_config(project_root: impl AsRef<Path>, config: Config) -> Self {
        Self {
            root_path: Self::recman_dir(project_root),
            config,
        }
    }

    /// Opens the repository, reading `.recman/config.toml` when present
    pub async fn open(project_root: impl AsRef<Path>) -> Result<Self> {
        let project_root = project_root.as_ref();
        let config = Config::load(Self::config_path(project_root)).await?;
        Ok(Self::with_config(project_root, config))
    }

    pub fn recman_dir(project_root: impl AsRef<Path>) -> PathBuf {
        project_root.as_ref().join(Self::RECMAN_DIR)
    }

    pub fn config_path(project_root: impl AsRef<Path>) -> PathBuf {
        Self::recman_dir(project_root).join(Config::FILE_NAME)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn board_file(&self) -> PathBuf {
        self.root_path.join(&self.config.storage.board_file)
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    /// Creates the `.recman` directory and seeds a board with the
    /// configured default columns when none exists yet
    pub async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        if !self.board_file().exists() {
            let board = Board::with_columns(self.config.board.default_columns.iter().cloned());
            self.save(&board).await?;
            tracing::info!(path = %self.board_file().display(), "initialized board");
        }

        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.board_file().exists()
    }

    /// Loads the board, failing instead of falling back to an empty board
    /// when the project has not been initialized
    pub async fn load_initialized(&self) -> Result<Board> {
        if !self.is_initialized().await {
            return Err(RecmanError::ProjectNotInitialized);
        }
        Ok(self.load().await)
    }
}

#[async_trait]
impl BoardRepository for FileRepository {
    async fn load(&self) -> Board {
        let board_file = self.board_file();

        if !board_file.exists() {
            return Board::new();
        }

        match fs::read_to_string(&board_file).await {
            Ok(contents) => decode_board(&contents, &board_file.display().to_string()),
            Err(error) => {
                tracing::error!(path = %board_file.display(), %error, "failed to load board from storage");
                Board::new()
            }
        }
    }

    async fn save(&self, board: &Board) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(board)?;
        let board_file = self.board_file();

        // Readers never observe a partially written board
        let tmp_file = board_file.with_extension("json.tmp");
        fs::write(&tmp_file, json).await?;
        fs::rename(&tmp_file, &board_file).await?;

        Ok(())
    }
}
