use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "note-browser")]
#[command(about = "Filter, sort and pin notes in a markdown vault")]
#[command(version)]
pub struct Cli {
    /// Vault directory (overrides the configured one)
    #[arg(short, long)]
    pub vault: Option<PathBuf>,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Do not write pins and filters back to disk
    #[arg(long)]
    pub no_save: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the view, optionally changing filters and sort first
    List(ListArgs),

    /// Reset all filters
    Clear,

    /// Pin a note so it is always listed first
    Pin { id: String },

    /// Remove a pin
    Unpin { id: String },

    /// Flip a note's pin
    Toggle { id: String },

    /// List every tag in the vault
    Tags,

    /// List every folder in the vault
    Folders,
}

impl Default for Command {
    fn default() -> Self {
        Self::List(ListArgs::default())
    }
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ListArgs {
    /// Keep notes carrying any of these tags
    #[arg(short, long)]
    pub tag: Vec<String>,

    /// Keep notes directly inside any of these folders
    #[arg(short, long)]
    pub folder: Vec<String>,

    /// Keep notes whose title or path contains this text
    #[arg(short, long)]
    pub name: Option<String>,

    /// Keep notes modified within this many days
    #[arg(long)]
    pub within: Option<i64>,

    /// Keep notes modified at or after this date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub after: Option<String>,

    /// Sort key: "mtime" or a front-matter field
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Sort ascending
    #[arg(long, conflicts_with = "desc")]
    pub asc: bool,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}
