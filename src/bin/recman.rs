use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use recman_core::{
    domain::highlight_segments, Board, BoardStore, BulkAction, ColumnId, ColumnService,
    DragSource, DropEvent, DropMonitor, DropOutcome, DropTarget, FileRepository, FilterValue,
    Selection, Subscription, TaskId, TaskService, ViewState,
};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "recman", version, about = "A kanban board in your terminal")]
struct Cli {
    /// Project root holding the .recman directory
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create .recman with a default board
    Init,
    /// Print the board
    Show {
        /// all, active or completed
        #[arg(long, default_value = "all")]
        filter: FilterValue,
        /// Only show tasks containing this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Manage columns
    Column {
        #[command(subcommand)]
        action: ColumnCommand,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        action: TaskCommand,
    },
    /// Apply one action to several tasks
    Bulk {
        #[command(subcommand)]
        action: BulkCommand,
    },
}

/// Columns are referenced by id, title or 1-based position
#[derive(Subcommand, Debug)]
enum ColumnCommand {
    Add { title: Vec<String> },
    Rm { column: String },
    Rename { column: String, title: Vec<String> },
    /// Move a column to a 1-based position
    Move { column: String, position: usize },
}

/// Tasks are referenced by id or a unique id prefix
#[derive(Subcommand, Debug)]
enum TaskCommand {
    Add { column: String, text: Vec<String> },
    Rm { task: String },
    Edit { task: String, text: Vec<String> },
    Toggle { task: String },
    Move {
        task: String,
        column: String,
        /// 1-based position inside the target column
        #[arg(long)]
        position: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
enum BulkCommand {
    Delete { tasks: Vec<String> },
    Complete { tasks: Vec<String> },
    Activate { tasks: Vec<String> },
    Move { column: String, tasks: Vec<String> },
}

/// Everything a mutating command needs; the board is re-rendered after each change
struct App {
    store: Arc<BoardStore>,
    tasks: TaskService,
    columns: ColumnService,
    monitor: DropMonitor,
    _render: Subscription,
}

impl App {
    fn new(store: Arc<BoardStore>) -> Self {
        let render_on_change = store.subscribe(|board| print!("{}", render(board, &ViewState::new())));
        let tasks = TaskService::new(store.clone());
        let columns = ColumnService::new(store.clone());
        let monitor = DropMonitor::new(tasks.clone(), columns.clone());

        Self {
            store,
            tasks,
            columns,
            monitor,
            _render: render_on_change,
        }
    }
}

async fn open_store(repository: FileRepository) -> Result<Arc<BoardStore>> {
    let board = repository.load_initialized().await?;
    Ok(Arc::new(BoardStore::with_board(Arc::new(repository), board)))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let repository = FileRepository::open(&cli.root)
        .await
        .context("failed to read configuration")?;

    match cli.command {
        Command::Init => {
            repository.initialize().await?;
            println!("Initialized board at {}", repository.board_file().display());
            Ok(())
        }
        Command::Show { filter, search } => {
            let store = open_store(repository).await?;
            let mut view = ViewState::new();
            view.query = search.unwrap_or_default();
            view.filter = filter;
            print!("{}", render(&store.board(), &view));
            Ok(())
        }
        Command::Column { action } => {
            let app = App::new(open_store(repository).await?);
            run_column(action, &app).await
        }
        Command::Task { action } => {
            let app = App::new(open_store(repository).await?);
            run_task(action, &app).await
        }
        Command::Bulk { action } => {
            let app = App::new(open_store(repository).await?);
            run_bulk(action, &app).await
        }
    }
}

async fn run_column(action: ColumnCommand, app: &App) -> Result<()> {
    let board = app.store.board();
    match action {
        ColumnCommand::Add { title } => {
            app.columns.add_column(&title.join(" ")).await?;
        }
        ColumnCommand::Rm { column } => {
            let column_id = resolve_column(&board, &column)?;
            app.columns.remove_column(&column_id).await?;
        }
        ColumnCommand::Rename { column, title } => {
            let column_id = resolve_column(&board, &column)?;
            app.columns.rename_column(&column_id, &title.join(" ")).await?;
        }
        ColumnCommand::Move { column, position } => {
            let column_id = resolve_column(&board, &column)?;
            let outcome = app
                .monitor
                .on_drop(DropEvent {
                    source: DragSource::Column { column_id },
                    targets: vec![DropTarget::column_slot(to_index(position)?)],
                })
                .await?;
            ensure_applied(outcome)?;
        }
    }
    Ok(())
}

async fn run_task(action: TaskCommand, app: &App) -> Result<()> {
    let board = app.store.board();
    match action {
        TaskCommand::Add { column, text } => {
            let column_id = resolve_column(&board, &column)?;
            app.tasks.add_task(&column_id, &text.join(" ")).await?;
        }
        TaskCommand::Rm { task } => {
            let task_id = resolve_task(&board, &task)?;
            app.tasks.remove_task(&task_id).await?;
        }
        TaskCommand::Edit { task, text } => {
            let task_id = resolve_task(&board, &task)?;
            app.tasks.update_task(&task_id, &text.join(" ")).await?;
        }
        TaskCommand::Toggle { task } => {
            let task_id = resolve_task(&board, &task)?;
            app.tasks.toggle_status(&task_id).await?;
        }
        TaskCommand::Move {
            task,
            column,
            position,
        } => {
            let task_id = resolve_task(&board, &task)?;
            let column_id = resolve_column(&board, &column)?;
            let index = position.map(to_index).transpose()?;
            let outcome = app
                .monitor
                .on_drop(DropEvent {
                    source: DragSource::Task { task_id },
                    targets: vec![DropTarget::in_column(column_id, index)],
                })
                .await?;
            ensure_applied(outcome)?;
        }
    }
    Ok(())
}

async fn run_bulk(action: BulkCommand, app: &App) -> Result<()> {
    let board = app.store.board();
    let (bulk, refs) = match action {
        BulkCommand::Delete { tasks } => (BulkAction::Delete, tasks),
        BulkCommand::Complete { tasks } => (BulkAction::Complete, tasks),
        BulkCommand::Activate { tasks } => (BulkAction::MarkActive, tasks),
        BulkCommand::Move { column, tasks } => {
            (BulkAction::MoveTo(resolve_column(&board, &column)?), tasks)
        }
    };

    let mut selection = Selection::new();
    for reference in &refs {
        let task_id = resolve_task(&board, reference)?;
        if !selection.is_selected(&task_id) {
            selection.toggle(&task_id);
        }
    }
    if selection.is_empty() {
        bail!("no tasks given");
    }

    let affected = bulk.apply(&app.tasks, &mut selection).await?;
    tracing::info!(affected, action = ?bulk, "bulk action applied");
    Ok(())
}

fn to_index(position: usize) -> Result<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| anyhow!("positions start at 1"))
}

fn ensure_applied(outcome: DropOutcome) -> Result<()> {
    match outcome {
        DropOutcome::Ignored => bail!("nothing to move"),
        _ => Ok(()),
    }
}

/// Finds a column by id, case-insensitive title, or 1-based position
fn resolve_column(board: &Board, reference: &str) -> Result<ColumnId> {
    let reference = reference.trim();

    if let Some(column) = board.columns.iter().find(|c| c.id.as_str() == reference) {
        return Ok(column.id.clone());
    }

    let by_title: Vec<&ColumnId> = board
        .columns
        .iter()
        .filter(|c| c.title.eq_ignore_ascii_case(reference))
        .map(|c| &c.id)
        .collect();
    match by_title.as_slice() {
        [id] => return Ok((*id).clone()),
        [] => {}
        _ => bail!("several columns are titled '{}', use the id", reference),
    }

    if let Ok(position) = reference.parse::<usize>() {
        if let Some(column) = position.checked_sub(1).and_then(|i| board.columns.get(i)) {
            return Ok(column.id.clone());
        }
    }

    Err(anyhow!("column not found: {}", reference))
}

/// Finds a task by full id or unique id prefix
fn resolve_task(board: &Board, reference: &str) -> Result<TaskId> {
    let reference = reference.trim();
    if reference.is_empty() {
        bail!("task reference must not be blank");
    }
    let matches: Vec<&TaskId> = board
        .tasks
        .keys()
        .filter(|id| id.as_str().starts_with(reference))
        .collect();

    if let Some(exact) = matches.iter().find(|id| id.as_str() == reference) {
        return Ok((*exact).clone());
    }
    match matches.as_slice() {
        [id] => Ok((*id).clone()),
        [] => Err(anyhow!("task not found: {}", reference)),
        _ => Err(anyhow!("task id prefix '{}' is ambiguous", reference)),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn render(board: &Board, view: &ViewState) -> String {
    let mut out = String::new();

    if board.columns.is_empty() {
        out.push_str("(no columns)\n");
        return out;
    }

    for (position, column) in board.columns.iter().enumerate() {
        let visible = view.visible_task_ids(board, &column.id);
        let _ = writeln!(
            out,
            "{}. {} [{}] ({}/{})",
            position + 1,
            column.title,
            short_id(column.id.as_str()),
            visible.len(),
            column.len()
        );

        for task in visible.iter().filter_map(|id| board.task(id)) {
            let mark = if task.is_completed() { "x" } else { " " };
            let text: String = highlight_segments(&task.text, &view.query)
                .into_iter()
                .map(|segment| {
                    if segment.matched {
                        format!("*{}*", segment.text)
                    } else {
                        segment.text.to_string()
                    }
                })
                .collect();
            let _ = writeln!(out, "   [{}] {}  {}", mark, text, short_id(task.id.as_str()));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use recman_core::Task;
    use std::str::FromStr;

    fn board_with(ids: &[&str]) -> Board {
        let mut board = Board::with_columns(["To Do"]);
        for id in ids {
            let task_id = TaskId::from_str(id).unwrap();
            board.columns[0].task_ids.push(task_id.clone());
            board
                .tasks
                .insert(task_id.clone(), Task::new(task_id, format!("task {}", id)));
        }
        board
    }

    #[test]
    fn test_resolve_task_rejects_blank_reference() {
        let board = board_with(&["abc123"]);

        assert!(resolve_task(&board, "").is_err());
        assert!(resolve_task(&board, "   ").is_err());
    }

    #[test]
    fn test_resolve_task_by_prefix() {
        let board = board_with(&["abc123", "abd456"]);

        assert_eq!(resolve_task(&board, "abc").unwrap().as_str(), "abc123");
        assert_eq!(resolve_task(&board, " abd456 ").unwrap().as_str(), "abd456");
        assert!(resolve_task(&board, "ab").is_err());
        assert!(resolve_task(&board, "zzz").is_err());
    }

    #[test]
    fn test_resolve_column_by_title_and_position() {
        let board = Board::with_columns(["To Do", "Done"]);

        assert_eq!(resolve_column(&board, "done").unwrap(), board.columns[1].id);
        assert_eq!(resolve_column(&board, "1").unwrap(), board.columns[0].id);
        assert!(resolve_column(&board, "3").is_err());
    }
}
