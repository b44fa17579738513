//! Command-line note browser.
//!
//! Loads a markdown vault, restores pins and filters from the last session,
//! applies the requested command and prints the resulting view.

mod cli;
mod config;
mod vault;

use anyhow::{bail, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use note_view::{
    parse_instant, Autosave, DateFilter, DocRef, FilterPatch, JsonFileSnapshotStore, NoteStore,
    RefreshOutcome, SnapshotStore, SortDirection,
};

use cli::{Cli, Command, ListArgs};
use config::BrowserConfig;
use vault::VaultLoader;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so the listing on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => BrowserConfig::load_from(path)?,
        None => BrowserConfig::load(),
    };
    let vault_dir = cli.vault.clone().unwrap_or_else(|| config.vault_dir.clone());
    let loader = Arc::new(VaultLoader::new(vault_dir, config.preview_lines));
    let store = NoteStore::new(loader, &config.engine);

    let persistence = &config.engine.persistence;
    let autosave = if persistence.enabled {
        let snapshots = Arc::new(JsonFileSnapshotStore::new(config.snapshot_path()));
        store.hydrate(snapshots.read().await.as_ref());
        (!cli.no_save).then(|| Autosave::spawn(store.clone(), snapshots, persistence.debounce()))
    } else {
        None
    };

    let outcome = store.refresh().await;
    let result = match outcome {
        RefreshOutcome::Loaded(_) => run(&store, cli.command.unwrap_or_default()),
        RefreshOutcome::Failed(message) => Err(anyhow::anyhow!(message)),
    };

    if let Some(autosave) = autosave {
        autosave.shutdown().await;
    }
    result
}

fn run(store: &NoteStore, command: Command) -> Result<()> {
    match command {
        Command::List(args) => {
            apply_list_args(store, args)?;
            print_view(store);
        }
        Command::Clear => {
            store.clear_filters();
            print_view(store);
        }
        Command::Pin { id } => {
            if !store.is_pinned(&id) {
                store.toggle_pin(&id);
            }
            warn_if_unknown(store, &id);
            print_view(store);
        }
        Command::Unpin { id } => {
            if store.is_pinned(&id) {
                store.toggle_pin(&id);
            }
            print_view(store);
        }
        Command::Toggle { id } => {
            let pinned = store.toggle_pin(&id);
            println!("{} {}", if pinned { "pinned" } else { "unpinned" }, id);
        }
        Command::Tags => {
            for tag in store.available_tags().iter() {
                println!("{}", tag);
            }
        }
        Command::Folders => {
            for folder in store.available_folders().iter() {
                println!("{}", folder);
            }
        }
    }
    Ok(())
}

fn apply_list_args(store: &NoteStore, args: ListArgs) -> Result<()> {
    let mut patch = FilterPatch::new();
    if !args.tag.is_empty() {
        patch = patch.tags(args.tag);
    }
    if !args.folder.is_empty() {
        patch = patch.folders(args.folder);
    }
    if let Some(name) = args.name {
        patch = patch.filename(name);
    }
    match (args.within, args.after) {
        (Some(_), Some(_)) => bail!("--within and --after cannot be combined"),
        (Some(days), None) => patch = patch.date(DateFilter::WithinDays(days)),
        (None, Some(after)) => match parse_instant(&after) {
            Some(instant) => patch = patch.date(DateFilter::After(instant)),
            None => bail!("Invalid date for --after: {}", after),
        },
        (None, None) => {}
    }
    if patch != FilterPatch::default() {
        store.set_filters(patch);
    }

    if let Some(key) = args.sort {
        store.set_sort_key(key);
    }
    if args.asc {
        store.set_sort_direction(SortDirection::Ascending);
    } else if args.desc {
        store.set_sort_direction(SortDirection::Descending);
    }
    Ok(())
}

fn warn_if_unknown(store: &NoteStore, id: &str) {
    if !store.documents().iter().any(|d| d.id == id) {
        tracing::warn!(id, "pinned a note that is not in the vault");
    }
}

fn print_view(store: &NoteStore) {
    let view = store.view();
    let pinned = store.pinned();
    for doc in view.iter() {
        println!("{}", format_row(doc, pinned.contains(&doc.id)));
    }
    if let Some(error) = store.error() {
        eprintln!("{}", error);
    }
}

fn format_row(doc: &DocRef, pinned: bool) -> String {
    let marker = if pinned { '*' } else { ' ' };
    let mut row = format!("{} {}  {}", marker, doc.modified.format("%Y-%m-%d %H:%M"), doc.id);
    if !doc.tags.is_empty() {
        let tags: Vec<_> = doc.tags.iter().map(|t| format!("#{}", t)).collect();
        row.push_str("  ");
        row.push_str(&tags.join(" "));
    }
    if !doc.preview.is_empty() {
        row.push_str("\n    ");
        row.push_str(&doc.preview);
    }
    row
}
