//! Command-line host for the note board.
//!
//! # Responsibility
//! - Resolve configuration (environment, then flags).
//! - Mount the board, run at most one user action, print the rendered view.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use noteboard_core::db::open_db;
use noteboard_core::{
    init_logging, AuthorJoinKey, BoardConfig, BoardService, NoteBoard, SeedPolicy,
    SqliteBoardRepository,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "noteboard", version, about = "Notes, authors and upvotes for one list")]
struct Cli {
    /// List to show (NOTEBOARD_LIST_ID)
    #[arg(long, global = true)]
    list: Option<String>,

    /// Current user id (NOTEBOARD_USER_ID)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Database file (NOTEBOARD_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Note field joined against people: author_id or authorId
    #[arg(long, global = true)]
    join_key: Option<AuthorJoinKey>,

    /// Baseline seeding: once or every_render
    #[arg(long, global = true)]
    seed_policy: Option<SeedPolicy>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the board
    Show,
    /// Add a note as the current user
    Add { text: String },
    /// Replace a note's text; omitted or blank text keeps it
    Edit { note_id: String, text: Option<String> },
    /// Delete a note
    Delete { note_id: String },
    /// Upvote a note as the current user
    Upvote { note_id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = BoardConfig::from_env()?;
    if let Some(list) = cli.list {
        config.list_id = list;
    }
    if let Some(user) = cli.user {
        config.user_id = user;
    }
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(join_key) = cli.join_key {
        config.join_key = join_key;
    }
    if let Some(seed_policy) = cli.seed_policy {
        config.seed_policy = seed_policy;
    }

    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(config.log_level, log_dir).map_err(anyhow::Error::msg)?;
    }

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }
    let mut conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;
    let repo = SqliteBoardRepository::try_new(&mut conn)?;
    let mut board = NoteBoard::new(BoardService::new(repo), config.props(), config.options());
    board.mount()?;

    match cli.command.unwrap_or(Command::Show) {
        Command::Show => {}
        Command::Add { text } => {
            board.set_draft(text);
            if board.submit_draft()?.is_none() {
                eprintln!(
                    "no person `{}` exists; note not added",
                    board.props().current_user_id
                );
            }
        }
        Command::Edit { note_id, text } => {
            board.begin_edit(&note_id)?;
            if let Some(text) = text {
                board.update_edit_draft(text);
            }
            board.submit_edit()?;
        }
        Command::Delete { note_id } => board.delete(&note_id)?,
        Command::Upvote { note_id } => {
            board.upvote(&note_id)?;
        }
    }

    let view = board.render()?;
    info!(
        "event=cli_render module=cli status=ok list_id={} cards={}",
        board.props().list_id,
        view.cards.len()
    );
    print!("{view}");
    Ok(())
}
