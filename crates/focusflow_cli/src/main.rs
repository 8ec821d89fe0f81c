//! FocusFlow command-line host.
//!
//! # Responsibility
//! - Drive the core store from one-shot commands.
//! - Flush the pending save before exit.

use clap::{Parser, Subcommand};
use focusflow_core::{
    default_log_level, filter_notes, init_logging, resolve_category, KeyValueStore, NoteFilter,
    NotePatch, RichTextController, SaveOutcome, SqliteKeyValueStore, Store,
};
use std::error::Error;
use std::path::{Path, PathBuf};

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "focusflow", about = "Local-first notes and todos")]
struct Args {
    /// SQLite database file holding the app state
    #[arg(long, default_value = "focusflow.db")]
    db: PathBuf,
    /// Directory for rotated log files; logging is off when omitted
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error
    #[arg(long, default_value_t = default_log_level().to_string())]
    log_level: String,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List notes
    Notes,
    /// Create a note
    NoteAdd {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Replace a note body
    NoteEdit {
        id: String,
        #[arg(long)]
        html: String,
    },
    /// Set a note's font size (clamped) and family
    NoteFont {
        id: String,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        family: Option<String>,
    },
    NoteDelete {
        id: String,
    },
    /// List todos
    Todos,
    TodoAdd {
        text: String,
        #[arg(long)]
        category: Option<String>,
    },
    TodoToggle {
        id: String,
    },
    TodoDelete {
        id: String,
    },
    /// Reorder todos; every existing id exactly once
    TodoReorder {
        ids: Vec<String>,
    },
    /// List categories
    Categories,
    CategoryAdd {
        name: String,
        color: String,
    },
    /// Write a note as plain text
    Export {
        id: String,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Search note titles and bodies
    Search {
        query: String,
        #[arg(long)]
        category: Option<String>,
    },
}

fn main() -> CliResult<()> {
    let args = Args::parse();
    if let Some(log_dir) = &args.log_dir {
        init_logging(&args.log_level, absolute(log_dir)?)?;
    }

    let mut store = Store::new(SqliteKeyValueStore::open(&args.db)?);
    let source = store.load();
    log::info!("event=cli_start module=cli status=ok source={source:?}");

    let result = run(&mut store, args.command);
    if store.flush() == SaveOutcome::Failed {
        if let Some(err) = store.last_save_error() {
            eprintln!("save failed: {err}");
        }
    }
    result
}

fn run<S: KeyValueStore>(store: &mut Store<S>, command: Cmd) -> CliResult<()> {
    match command {
        Cmd::Notes => {
            for note in &store.data().notes {
                let category = resolve_category(store.data(), note)
                    .map_or("-", |category| category.name.as_str());
                println!("{}\t{}\t{}", note.id, category, note.display_title());
            }
        }
        Cmd::NoteAdd { title, category } => {
            let id = store.add_note_in_category(category.as_deref());
            if let Some(title) = title {
                store.update_note(&id, NotePatch::title(title));
            }
            println!("{id}");
        }
        Cmd::NoteEdit { id, html } => {
            ensure(store.update_note(&id, NotePatch::content(html)), "note", &id)?;
        }
        Cmd::NoteFont { id, size, family } => {
            let note = store.data().note(&id).cloned().ok_or_else(|| not_found("note", &id))?;
            let mut controller = RichTextController::new();
            controller.switch_note(&note);
            if let Some(size) = size {
                if let Some(applied) = controller.handle_font_size_input(&size, &mut *store) {
                    println!("size={applied}");
                }
            }
            if let Some(family) = family {
                controller.handle_font_family_change(&family, &mut *store);
            }
        }
        Cmd::NoteDelete { id } => ensure(store.delete_note(&id), "note", &id)?,
        Cmd::Todos => {
            for todo in &store.data().todos {
                let mark = if todo.completed { "x" } else { " " };
                println!("{}\t[{}] {}", todo.id, mark, todo.text);
            }
        }
        Cmd::TodoAdd { text, category } => println!("{}", store.add_todo(text, category)),
        Cmd::TodoToggle { id } => ensure(store.toggle_todo(&id), "todo", &id)?,
        Cmd::TodoDelete { id } => ensure(store.delete_todo(&id), "todo", &id)?,
        Cmd::TodoReorder { ids } => store.reorder_todos_by_id(&ids)?,
        Cmd::Categories => {
            for category in &store.data().categories {
                println!("{}\t{}\t{}", category.id, category.color, category.name);
            }
        }
        Cmd::CategoryAdd { name, color } => println!("{}", store.add_category(name, color)),
        Cmd::Export { id, out } => {
            let note = store.data().note(&id).ok_or_else(|| not_found("note", &id))?;
            let mut controller = RichTextController::new();
            controller.switch_note(note);
            let export = controller
                .export()
                .ok_or_else(|| not_found("note", &id))?;
            let path = export.write_to_dir(&out)?;
            println!("{}", path.display());
        }
        Cmd::Search { query, category } => {
            let mut filter = NoteFilter::all().matching(query);
            if let Some(category) = category {
                filter = filter.in_category(category);
            }
            for note in filter_notes(&store.data().notes, &filter) {
                println!("{}\t{}", note.id, note.display_title());
            }
        }
    }
    Ok(())
}

fn ensure(found: bool, kind: &str, id: &str) -> CliResult<()> {
    if found {
        Ok(())
    } else {
        Err(not_found(kind, id))
    }
}

fn not_found(kind: &str, id: &str) -> Box<dyn Error> {
    format!("{kind} `{id}` not found").into()
}

fn absolute(path: &Path) -> CliResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
