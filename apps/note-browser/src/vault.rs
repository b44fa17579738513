//! Markdown vault loader.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use note_view::{Document, DocumentLoader, LoadError};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Loads every `*.md` file below a directory.
///
/// Hidden files and directories are skipped. Identifiers are paths relative
/// to the vault root with `/` separators.
pub struct VaultLoader {
    root: PathBuf,
    preview_lines: usize,
}

impl VaultLoader {
    pub fn new(root: impl Into<PathBuf>, preview_lines: usize) -> Self {
        Self {
            root: root.into(),
            preview_lines,
        }
    }
}

#[async_trait]
impl DocumentLoader for VaultLoader {
    async fn load_all(&self) -> Result<Vec<Document>, LoadError> {
        let root = self.root.clone();
        let preview_lines = self.preview_lines;
        tokio::task::spawn_blocking(move || scan_vault(&root, preview_lines))
            .await
            .map_err(|e| LoadError::Unavailable(format!("vault scan aborted: {}", e)))?
    }
}

fn scan_vault(root: &Path, preview_lines: usize) -> Result<Vec<Document>, LoadError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(LoadError::Malformed(format!(
                "vault path is not a directory: {}",
                root.display()
            )))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(LoadError::Unavailable(format!(
                "vault not found: {}",
                root.display()
            )))
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            return Err(LoadError::PermissionDenied(root.display().to_string()))
        }
        Err(e) => return Err(e.into()),
    }

    let mut documents = scan_dir(root, preview_lines);
    documents.sort_by(|a, b| a.id.cmp(&b.id));
    tracing::debug!(root = %root.display(), count = documents.len(), "scanned vault");
    Ok(documents)
}

/// Symlinks are not followed, so a link back into the vault cannot repeat notes.
fn scan_dir(root: &Path, preview_lines: usize) -> Vec<Document> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        // The root itself may live under a hidden directory.
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    let mut documents = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable vault entry");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "md") {
            continue;
        }
        match read_note(root, path, preview_lines) {
            Ok(doc) => documents.push(doc),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable note"),
        }
    }
    documents
}

fn read_note(root: &Path, path: &Path, preview_lines: usize) -> io::Result<Document> {
    let content = fs::read_to_string(path)?;
    let modified: DateTime<Utc> = fs::metadata(path)?.modified()?.into();

    let relative = path.strip_prefix(root).unwrap_or(path);
    let id = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    let (front_matter, body) = split_front_matter(&content);
    let mut doc = Document::new(id, modified).with_preview(preview(body, preview_lines));

    if let Some(metadata) = front_matter.and_then(|yaml| parse_front_matter(yaml, path)) {
        doc = doc.with_tags(front_matter_tags(&metadata));
        doc.metadata = Some(metadata);
    }
    Ok(doc)
}

/// Split `---` delimited front matter from the body.
fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    // No closing delimiter: treat the whole file as body.
    (None, content)
}

fn parse_front_matter(yaml: &str, path: &Path) -> Option<Map<String, Value>> {
    if yaml.trim().is_empty() {
        return None;
    }
    let parsed = serde_yaml::from_str::<serde_yaml::Value>(yaml)
        .map_err(|e| e.to_string())
        .and_then(|v| serde_json::to_value(v).map_err(|e| e.to_string()));

    match parsed {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring invalid front matter");
            None
        }
    }
}

/// Tags from a `tags` list or a comma separated string. A leading `#` is dropped.
fn front_matter_tags(metadata: &Map<String, Value>) -> Vec<String> {
    let raw: Vec<&str> = match metadata.get("tags") {
        Some(Value::String(s)) => s.split(',').collect(),
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    raw.into_iter()
        .map(|t| t.trim().trim_start_matches('#'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn preview(body: &str, lines: usize) -> String {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(lines)
        .collect::<Vec<_>>()
        .join(" ")
}
