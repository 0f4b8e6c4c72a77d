use thiserror::Error;

pub mod tree;

pub const INDEX_HTML: &str = "index.html";
pub const STYLE_CSS: &str = "style.css";
pub const SCRIPT_JS: &str = "script.js";

const STARTER_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>My AI Website</title>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
</head>
<body>
  <h1>Welcome to the AI Website Builder</h1>
  <p>Describe what you want to build in the chat!</p>
</body>
</html>"#;

const STARTER_CSS: &str = "body { margin: 0; padding: 20px; font-family: sans-serif; }";

const STARTER_JS: &str = "// JavaScript code here";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },
    #[error("file already exists: {0}")]
    AlreadyExists(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Html,
    Css,
    JavaScript,
    Text,
}

impl FileKind {
    pub fn from_path(path: &str) -> Self {
        let lowered = path.to_ascii_lowercase();
        if lowered.ends_with(".html") || lowered.ends_with(".htm") {
            Self::Html
        } else if lowered.ends_with(".css") {
            Self::Css
        } else if lowered.ends_with(".js") {
            Self::JavaScript
        } else {
            Self::Text
        }
    }

    pub fn language(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::JavaScript => "javascript",
            Self::Text => "text",
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::Css => "CSS",
            Self::JavaScript => "JS",
            Self::Text => "TXT",
        }
    }
}

/// In-memory project files, kept in insertion order.
///
/// Folders do not exist as entries; they are implied by `/`-separated path
/// prefixes (see [`tree::build`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStore {
    entries: Vec<FileEntry>,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starter() -> Self {
        let mut store = Self::new();
        store.set(INDEX_HTML, STARTER_HTML);
        store.set(STYLE_CSS, STARTER_CSS);
        store.set(SCRIPT_JS, STARTER_JS);
        store
    }

    pub fn get(&self, path: &str) -> Result<&str, StoreError> {
        self.position(path)
            .map(|index| self.entries[index].content.as_str())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    /// Empty string for missing files, for callers that treat absence as blank.
    pub fn get_or_empty(&self, path: &str) -> &str {
        self.get(path).unwrap_or("")
    }

    /// Replaces the content of `path` in place, or appends a new entry.
    pub fn set(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into();
        let content = content.into();
        match self.position(&path) {
            Some(index) => self.entries[index].content = content,
            None => self.entries.push(FileEntry { path, content }),
        }
    }

    /// Adds an empty file at a user-supplied path.
    pub fn create(&mut self, raw_path: &str) -> Result<String, StoreError> {
        let path = normalize_path(raw_path)?;
        if self.contains(&path) {
            return Err(StoreError::AlreadyExists(path));
        }
        self.entries.push(FileEntry {
            path: path.clone(),
            content: String::new(),
        });
        Ok(path)
    }

    pub fn list(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.path.as_str()).collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.position(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, path: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.path == path)
    }
}

fn normalize_path(raw: &str) -> Result<String, StoreError> {
    let invalid = |reason| StoreError::InvalidPath {
        path: raw.to_string(),
        reason,
    };

    let mut path = raw.trim();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        return Err(invalid("path is empty"));
    }
    if path.ends_with('/') {
        return Err(invalid("path names a folder"));
    }
    if path.contains('\\') {
        return Err(invalid("use '/' as the separator"));
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(invalid("empty path segment"));
        }
        if segment == "." || segment == ".." {
            return Err(invalid("relative segments are not allowed"));
        }
    }

    Ok(path.to_string())
}
