//! Open documents, keyed by URI.
//!
//! The store map is only write-locked to add or remove documents. Each
//! document guards its own `(text, version)` pair, so edits to one document
//! never block readers of another.

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use ropey::{Rope, RopeSlice};
use tokio::sync::RwLock;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};
use tracing::debug;

use crate::lsp::error::LspError;
use crate::lsp::resolve::normalize;

#[derive(Debug)]
struct TextState {
    text: Rope,
    version: i32,
}

#[derive(Debug)]
pub struct Document {
    uri: Url,
    path: PathBuf,
    state: RwLock<TextState>,
}

/// A consistent view of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub uri: Url,
    pub path: PathBuf,
    pub text: String,
    pub version: i32,
}

impl Document {
    pub fn new(uri: Url, text: String, version: i32) -> Result<Self, LspError> {
        let path = uri
            .to_file_path()
            .map_err(|_| LspError::UnsupportedUri(uri.clone()))?;

        Ok(Self {
            path: normalize(&path),
            uri,
            state: RwLock::new(TextState {
                text: Rope::from_str(&text),
                version,
            }),
        })
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Reads text and version under one shared lock.
    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.read().await;
        Snapshot {
            uri: self.uri.clone(),
            path: self.path.clone(),
            text: state.text.to_string(),
            version: state.version,
        }
    }

    pub async fn version(&self) -> i32 {
        self.state.read().await.version
    }

    /// Applies content changes in order and records the new version.
    pub async fn apply_changes(&self, version: i32, changes: Vec<TextDocumentContentChangeEvent>) {
        let mut state = self.state.write().await;
        for change in changes {
            match change.range {
                Some(range) => {
                    let start = char_at(&state.text, range.start);
                    let end = char_at(&state.text, range.end).max(start);
                    state.text.remove(start..end);
                    state.text.insert(start, &change.text);
                }
                None => state.text = Rope::from_str(&change.text),
            }
        }
        state.version = version;
    }
}

/// Char index of a protocol position. Columns count UTF-16 code units and
/// stop before the line terminator; lines past the end map to the end.
fn char_at(text: &Rope, position: Position) -> usize {
    let line = position.line as usize;
    if line >= text.len_lines() {
        return text.len_chars();
    }

    let content = text.line(line);
    let length = content_length(content);
    let units = (position.character as usize).min(content.char_to_utf16_cu(length));
    text.line_to_char(line) + content.utf16_cu_to_char(units)
}

/// Chars in a line, excluding `\n`, `\r\n` or `\r`
fn content_length(line: RopeSlice) -> usize {
    let mut length = line.len_chars();
    while length > 0 && matches!(line.char(length - 1), '\n' | '\r') {
        length -= 1;
    }
    length
}

#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: RwLock<IndexMap<Url, Arc<Document>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn open(&self, uri: Url, text: String, version: i32) -> Result<Arc<Document>, LspError> {
        let document = Arc::new(Document::new(uri.clone(), text, version)?);
        debug!(%uri, version, "Opening document");
        self.documents
            .write()
            .await
            .insert(uri, Arc::clone(&document));
        Ok(document)
    }

    pub async fn change(
        &self,
        uri: &Url,
        version: i32,
        changes: Vec<TextDocumentContentChangeEvent>,
    ) -> Result<Arc<Document>, LspError> {
        let document = self.get(uri).await?;
        document.apply_changes(version, changes).await;
        Ok(document)
    }

    pub async fn close(&self, uri: &Url) -> Option<Arc<Document>> {
        self.documents.write().await.shift_remove(uri)
    }

    pub async fn get(&self, uri: &Url) -> Result<Arc<Document>, LspError> {
        self.documents
            .read()
            .await
            .get(uri)
            .cloned()
            .ok_or_else(|| LspError::DocumentNotOpen(uri.clone()))
    }

    /// Every open document, in the order they were opened
    pub async fn all(&self) -> Vec<Arc<Document>> {
        self.documents.read().await.values().cloned().collect()
    }
}
